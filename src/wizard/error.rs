use crate::storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("invalid wizard definition: {0}")]
    Definition(String),
    #[error("please complete all required fields ({})", fields.join(", "))]
    Validation { fields: Vec<String> },
    #[error("a submission is already in progress")]
    SubmitInProgress,
    #[error("server rejected the submission with status {status}")]
    Server { status: u16 },
    #[error("submission failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to encode wizard snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

impl WizardError {
    /// Errors after which the same form can simply be submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server { .. } | Self::Transport(_))
    }
}
