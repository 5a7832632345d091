use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    /// A unique constraint rejected the write (duplicate identification code).
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),

    /// A filter or lookup named a column the record does not declare.
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                RepoError::UniqueViolation(db_err.message().to_string())
            }
            other => RepoError::Database(other),
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;
