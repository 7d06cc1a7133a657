use std::collections::BTreeMap;

/// Raised by storage adapters when a write breaks a table constraint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConstraintViolation {
    #[error("{0} already exists.")]
    Unique(String),
    #[error("The related {0} does not exist.")]
    ForeignKey(String),
    #[error("{0} is invalid.")]
    InvalidValue(String),
}

/// Error surface of every use case. Presentation maps each variant to a status.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),
    #[error("Something went wrong. Please try again later.")]
    Internal(#[source] anyhow::Error),
}

impl ServiceError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ConstraintViolation>() {
            Some(v @ ConstraintViolation::Unique(_)) => Self::Conflict(v.to_string()),
            Some(v) => Self::BadRequest(v.to_string()),
            None => Self::Internal(err),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_becomes_conflict() {
        let err: ServiceError = anyhow::Error::new(ConstraintViolation::Unique("email".into())).into();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == "email already exists."));
    }

    #[test]
    fn foreign_key_violation_becomes_bad_request() {
        let err: ServiceError = anyhow::Error::new(ConstraintViolation::ForeignKey("car".into())).into();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn other_errors_stay_internal() {
        let err: ServiceError = anyhow::anyhow!("connection reset").into();
        assert!(matches!(err, ServiceError::Internal(_)));
        assert_eq!(err.to_string(), "Something went wrong. Please try again later.");
    }
}
