use thiserror::Error;

/// Application-level errors (HTTP layer)
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    ServiceError(#[from] kunai_service::error::ServiceError),

    #[error(transparent)]
    StoreError(#[from] kunai_store::StoreError),

    #[error(transparent)]
    RfcError(#[from] kunai_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::ServiceError(e) => e.status_code(),
            Self::CoreError(kunai_core::error::CoreError::InvalidIdentifier(_)) => 400,
            Self::StoreError(_) | Self::RfcError(_) | Self::CoreError(_) => 500,
        }
    }
}

impl From<kunai_rfc::rfc::dav::build::BuildError> for AppError {
    fn from(err: kunai_rfc::rfc::dav::build::BuildError) -> Self {
        Self::RfcError(err.into())
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
