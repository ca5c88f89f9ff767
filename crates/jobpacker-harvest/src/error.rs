use jobpacker_core::ConfigError;
use thiserror::Error;

/// Errors that abort a whole harvest. Board failures never surface here;
/// they are reported through each board's outcome.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("harvest cancelled")]
    Cancelled,
}
