//! Crate-level error that names the step a run failed in.

use crate::config::ConfigError;
use crate::generate::GenerationError;
use crate::history::StorageError;
use crate::normalize::ValidationError;
use crate::notify::DeliveryError;

/// Any failure that aborts a run.
///
/// Each variant wraps the error of one pipeline step; the display prefix
/// names that step so the process exit message says where the run stopped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("history store: {0}")]
    Storage(#[from] StorageError),

    #[error("generation: {0}")]
    Generation(#[from] GenerationError),

    #[error("validation: {0}")]
    Validation(#[from] ValidationError),

    #[error("delivery: {0}")]
    Delivery(#[from] DeliveryError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_step() {
        let err: Error = ConfigError::Missing("OPENAI_API_KEY").into();
        assert_eq!(
            err.to_string(),
            "configuration: missing required env var: OPENAI_API_KEY"
        );

        let err: Error = DeliveryError::Status {
            status: 401,
            body: "unauthorized".into(),
        }
        .into();
        assert!(err.to_string().starts_with("delivery: "));
        assert!(err.to_string().contains("401"));
    }
}
