/// Domain error taxonomy
///
/// Every service operation returns `Result<T, ServiceError>`. The variants map
/// one-to-one onto the HTTP failure classes of the API:
///
/// - `Validation` → 400 (malformed or semantically invalid input)
/// - `Permission` → 403 (authenticated but not allowed)
/// - `NotFound` → 404 (missing entity, or entity under the wrong parent)
/// - `Database` → 500
///
/// Authentication failures never reach this layer; they are rejected by the
/// API's bearer-token middleware.

use crate::auth::authorization::AuthzError;

/// Result alias used by the service layer
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by board, task and comment operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input is malformed or violates a business rule
    #[error("{0}")]
    Validation(String),

    /// Caller is not allowed to perform the operation
    #[error("{0}")]
    Permission(String),

    /// Referenced entity does not exist or is not under the expected parent
    #[error("{0}")]
    NotFound(String),

    /// Underlying store failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl ServiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ServiceError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ServiceError::NotFound(msg.into())
    }

    /// Short machine-readable kind, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Permission(_) => "permission",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Database(_) => "database",
        }
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::DatabaseError(e) => ServiceError::Database(e),
            other => ServiceError::Permission(other.to_string()),
        }
    }
}
