use kunai_rfc::rfc::dav::core::Precondition;
use kunai_rfc::rfc::dav::parse::{ParseError, ParseErrorKind};
use kunai_store::StoreError;
use thiserror::Error;

/// Service layer errors, one variant per client-visible outcome
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous collection: {0}")]
    AmbiguousCollection(String),

    #[error("Invalid sync token: {0}")]
    InvalidSyncToken(String),

    #[error("Forbidden: {reason}")]
    Forbidden {
        reason: String,
        precondition: Option<Precondition>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Request body exceeds {limit} bytes")]
    RequestTooLarge { limit: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            precondition: None,
        }
    }

    #[must_use]
    pub fn unsupported_report(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            precondition: Some(Precondition::SupportedReport),
        }
    }

    #[must_use]
    pub fn read_only(reason: impl Into<String>) -> Self {
        Self::Forbidden {
            reason: reason.into(),
            precondition: Some(Precondition::NeedPrivileges),
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::AmbiguousCollection(_) => 409,
            Self::InvalidSyncToken(_) | Self::Forbidden { .. } => 403,
            Self::BadRequest(_) => 400,
            Self::RequestTooLarge { .. } => 413,
            Self::Internal(_) => 500,
        }
    }

    /// Precondition element to report in a `DAV:error` body, if any.
    #[must_use]
    pub const fn precondition(&self) -> Option<Precondition> {
        match self {
            Self::InvalidSyncToken(_) => Some(Precondition::ValidSyncToken),
            Self::Forbidden { precondition, .. } => *precondition,
            _ => None,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CollectionNotFound(id) => Self::NotFound(format!("collection {id}")),
            StoreError::CoreError(e) => Self::BadRequest(e.to_string()),
            StoreError::Unavailable(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<ParseError> for ServiceError {
    fn from(err: ParseError) -> Self {
        match err.kind {
            ParseErrorKind::UnsupportedReport => Self::unsupported_report(err.message),
            _ => Self::BadRequest(err.to_string()),
        }
    }
}

impl From<kunai_core::error::CoreError> for ServiceError {
    fn from(err: kunai_core::error::CoreError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
