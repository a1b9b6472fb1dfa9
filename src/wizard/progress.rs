use super::controller::WizardController;
use super::inputs::FormInputs;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Completed,
    Error,
    Current,
    Pending,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Error => "error",
            Self::Current => "current",
            Self::Pending => "pending",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done as f64 / total as f64) * 100.0).round() as u8
}

impl<S, I> WizardController<S, I>
where
    S: KeyValueStore,
    I: FormInputs,
{
    fn is_field_complete(&self, field: &str) -> bool {
        let filled = self
            .inputs()
            .value(field)
            .is_some_and(|value| !value.is_empty());
        filled && !self.errors().contains_key(field)
    }

    /// Share of the current step's fields that are filled and error-free.
    pub fn step_progress(&self) -> u8 {
        let Some(step) = self.current_step_definition() else {
            return 100;
        };
        let done = step
            .fields
            .iter()
            .filter(|field| self.is_field_complete(field))
            .count();
        percent(done, step.fields.len())
    }

    /// Share of all required fields that are filled and error-free.
    pub fn overall_progress(&self) -> u8 {
        let required = self.definition().required_fields();
        let done = required
            .iter()
            .filter(|field| self.is_field_complete(field))
            .count();
        percent(done, required.len())
    }

    /// Position of the current step within the wizard.
    pub fn position_progress(&self) -> u8 {
        percent(self.current_step(), self.total_steps())
    }

    pub fn step_status(&self, step: usize) -> StepStatus {
        let current = self.current_step();
        if step < current {
            if self.is_step_valid(step) {
                StepStatus::Completed
            } else {
                StepStatus::Error
            }
        } else if step == current {
            StepStatus::Current
        } else {
            StepStatus::Pending
        }
    }

    pub fn is_first_step(&self) -> bool {
        self.current_step() == 1
    }

    pub fn is_last_step(&self) -> bool {
        self.current_step() == self.total_steps()
    }
}
