//! Service-level error taxonomy. The HTTP layer maps each variant to a
//! status code; services never touch HTTP types directly.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing entity → 404
    #[error("{0}")]
    NotFound(String),

    /// Validation failure → 400
    #[error("{0}")]
    BadRequest(String),

    /// State conflict (e.g. double-resolve) → 409
    #[error("{0}")]
    Conflict(String),

    /// Credential failure → 401
    #[error("{0}")]
    Unauthorized(String),

    /// Role/ownership mismatch → 403
    #[error("{0}")]
    Forbidden(String),

    /// Anything unexpected from a store → 500
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
