use crate::validation::{default_rule_configs, RuleConfig};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepDefinition {
    pub index: usize,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    /// Every field shown on the step, in display order.
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub required: BTreeSet<String>,
}

impl StepDefinition {
    fn new(index: usize, title: &str, subtitle: &str, fields: &[&str], required: &[&str]) -> Self {
        Self {
            index,
            title: title.to_string(),
            subtitle: subtitle.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            required: required.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Required fields in display order.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .map(String::as_str)
            .filter(|field| self.required.contains(*field))
    }
}

/// Steps and field rules that parameterize one wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardDefinition {
    pub steps: Vec<StepDefinition>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
}

impl Default for WizardDefinition {
    fn default() -> Self {
        Self::startup()
    }
}

impl WizardDefinition {
    /// The five-step "create startup" flow.
    pub fn startup() -> Self {
        Self {
            steps: vec![
                StepDefinition::new(
                    1,
                    "Basic information",
                    "Tell us about your startup",
                    &["company_name", "tagline", "founded_date", "description"],
                    &["company_name", "tagline", "description"],
                ),
                StepDefinition::new(
                    2,
                    "Branding & media",
                    "Your brand image",
                    &["logo", "cover_image", "website", "demo_url", "pitch_deck_url"],
                    &[],
                ),
                StepDefinition::new(
                    3,
                    "Industry & business",
                    "Define your market",
                    &[
                        "industry",
                        "sub_industry",
                        "stage",
                        "employees_count",
                        "business_model",
                    ],
                    &["industry", "business_model"],
                ),
                StepDefinition::new(
                    4,
                    "Thesis & metrics",
                    "Your value proposition",
                    &[
                        "problem_statement",
                        "solution_description",
                        "market_size",
                        "competitive_advantage",
                        "monthly_revenue",
                        "funding_amount",
                        "seeking_amount",
                    ],
                    &[],
                ),
                StepDefinition::new(5, "Final review", "Confirm your information", &[], &[]),
            ],
            rules: default_rule_configs(),
        }
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn step(&self, index: usize) -> Option<&StepDefinition> {
        index.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    pub fn is_required(&self, field: &str) -> bool {
        self.steps.iter().any(|step| step.required.contains(field))
    }

    /// All required fields across steps, in step then display order.
    pub fn required_fields(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(StepDefinition::required_fields)
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.steps.is_empty() {
            return Err("wizard must define at least one step".to_string());
        }
        let mut seen = BTreeSet::new();
        for (position, step) in self.steps.iter().enumerate() {
            if step.index != position + 1 {
                return Err(format!(
                    "step at position {} has index {}; steps must be numbered 1..={}",
                    position + 1,
                    step.index,
                    self.steps.len()
                ));
            }
            for field in &step.fields {
                if field.trim().is_empty() {
                    return Err(format!("step {} lists an empty field name", step.index));
                }
                if !seen.insert(field.as_str()) {
                    return Err(format!(
                        "field `{field}` appears on more than one step (again on step {})",
                        step.index
                    ));
                }
            }
            if let Some(missing) = step
                .required
                .iter()
                .find(|field| !step.fields.iter().any(|listed| listed == *field))
            {
                return Err(format!(
                    "step {} requires `{missing}` but does not list it in fields",
                    step.index
                ));
            }
        }
        for (field, rule) in &self.rules {
            rule.validate()
                .map_err(|err| format!("rule for `{field}`: {err}"))?;
        }
        Ok(())
    }
}
