use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid --param '{0}': expected KEY=VALUE")]
    InvalidParam(String),

    #[error(transparent)]
    Pagination(#[from] marketgate_core::PaginationError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidParam(_) | Self::Pagination(_) => 2,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
