use cryptodesk_core::CoreError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] cryptodesk_core::ValidationError),

    #[error("{0}")]
    AllProvidersFailed(CoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Config(CoreError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::AllProvidersFailed(_) => 3,
            Self::Serialization(_) => 4,
            Self::Config(_) => 5,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(error) => Self::Validation(error),
            CoreError::Serialization(error) => Self::Serialization(error),
            CoreError::Config(_) => Self::Config(error),
            CoreError::AllWrappersFailed { .. } => Self::AllProvidersFailed(error),
        }
    }
}
