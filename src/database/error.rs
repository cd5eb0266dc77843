use thiserror::Error;

use super::statement::StatementError;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Record not found")]
    NotFound,

    #[error("Record already exists")]
    Duplicated,

    #[error(transparent)]
    Statement(#[from] StatementError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub fn validation(message: impl Into<String>) -> Self {
        RepositoryError::Validation(message.into())
    }

    /// Classify a failed write, translating unique violations.
    pub fn from_write(err: sqlx::Error) -> Self {
        if is_unique_violation(&err) {
            RepositoryError::Duplicated
        } else {
            RepositoryError::Database(err)
        }
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    const PG_UNIQUE: &str = "23505";

    let Some(db_error) = err.as_database_error() else {
        return false;
    };
    if db_error.is_unique_violation() {
        return true;
    }
    db_error.code().as_deref() == Some(PG_UNIQUE)
}
