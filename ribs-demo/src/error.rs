use ribs::BundleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Saved state is unreadable: {0}")]
    State(#[from] BundleError),

    #[error("Failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}
