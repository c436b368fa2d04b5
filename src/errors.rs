use thiserror::Error;

use crate::core::validation::ValidationError;

/// Error type that captures ledger, storage, and runtime failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("migration error: {message}")]
    Migration { message: String },
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("another instance is already running (pid {pid})")]
    InstanceLocked { pid: u32 },
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
