//! Content repository error types.

use thiserror::Error;

/// Errors from reading the host content repository.
#[derive(Debug, Clone, Error)]
pub enum ContentRepositoryError {
    /// Failed to reach the repository.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A query against the repository failed.
    #[error("Query error: {0}")]
    QueryError(String),

    /// A stored row could not be converted into a content type.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

impl ContentRepositoryError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a query error.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::QueryError(msg.into())
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeError(msg.into())
    }
}

impl From<sqlx::Error> for ContentRepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::ConnectionError(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::DecodeError(err.to_string())
            }
            other => Self::QueryError(other.to_string()),
        }
    }
}
