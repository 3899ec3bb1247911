use thiserror::Error;

/// Why a workflow ended without reaching its last step.
///
/// A run that simply runs out of actionable items is not an error; it
/// resolves to `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("Workflow step failed: {0}")]
    StepFailed(String),

    #[error("Workflow was cancelled")]
    Cancelled,

    #[error("Workflow step panicked: {0}")]
    Panicked(String),
}

impl WorkflowError {
    pub fn step_failed(message: impl Into<String>) -> Self {
        Self::StepFailed(message.into())
    }
}
