use thiserror::Error;

#[derive(Debug, Error)]
pub enum QpError {
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("Not positive definite: {0}")]
    NotPositiveDefinite(String),

    #[error("Non-finite input: {0}")]
    NonFinite(String),

    #[error("Active set mismatch: {0}")]
    ActiveSetMismatch(String),

    #[error("Infeasible problem: {0}")]
    Infeasible(String),

    #[error("Convergence failed: {0}")]
    ConvergenceFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<serde_json::Error> for QpError {
    fn from(err: serde_json::Error) -> Self {
        QpError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for QpError {
    fn from(err: std::io::Error) -> Self {
        QpError::IoError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QpError>;
