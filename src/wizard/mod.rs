//! Multi-step form wizard: step gating, per-field errors, draft snapshots
//! and submission.

pub mod autosave;
pub mod controller;
pub mod definition;
pub mod error;
pub mod inputs;
pub mod progress;
pub mod state;

pub use autosave::{AutosaveSchedule, DEFAULT_AUTOSAVE_INTERVAL};
pub use controller::{
    SubmitOutcome, WizardController, DEFAULT_SNAPSHOT_MAX_AGE, MAX_UPLOAD_BYTES,
};
pub use definition::{StepDefinition, WizardDefinition};
pub use error::WizardError;
pub use inputs::{FormInputs, InMemoryForm};
pub use progress::StepStatus;
pub use state::{Snapshot, WizardState, SNAPSHOT_KEY};
