use models::ratings::RatingError;
use sea_orm::DbErr;
use thiserror::Error;

/// Error taxonomy for the core operations. Validation and not-found are
/// raised before any mutation; a duplicate active pair is never an error
/// (it resolves to an in-place update).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Also returned for kind-specific role mismatches on a target, so a
    /// caller cannot distinguish "wrong role" from "no such user".
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl From<RatingError> for ServiceError {
    fn from(err: RatingError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ServiceError::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound(_))
    }
}
