// src/error/types.rs
use crate::domain::DomainError;
use rusqlite::ErrorCode;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error("Pool error: {0}")]
    Pool(String),

    #[error("Invalid model: {0}")]
    InvalidModel(#[from] DomainError),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("No data: {0}")]
    NoData(String),

    #[error("Duplicate natural key: {0}")]
    Duplicate(String),

    #[error("Operation timed out: {0}")]
    Timeout(String),

    #[error("Document store error: {0}")]
    Document(String),

    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Interrupts from the deadline handler and lock contention surface as
/// timeouts, unique constraint hits as duplicates.
impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        let failure = match &err {
            rusqlite::Error::SqliteFailure(code, message) => {
                Some((code.code, code.extended_code, message.clone()))
            }
            _ => None,
        };

        match failure {
            Some((
                ErrorCode::OperationInterrupted | ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked,
                _,
                _,
            )) => AppError::Timeout(err.to_string()),
            Some((ErrorCode::ConstraintViolation, extended, message))
                if extended == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                AppError::Duplicate(message.unwrap_or_else(|| err.to_string()))
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<chrono::ParseError> for AppError {
    fn from(err: chrono::ParseError) -> Self {
        AppError::Other(format!("Date parse error: {}", err))
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        AppError::Pool(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
