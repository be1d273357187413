use thiserror::Error;

use crate::rfc::dav::build::BuildError;

/// Errors from protocol parsing and serialization.
#[derive(Error, Debug)]
pub enum RfcError {
    #[error("Invalid request body: {0}")]
    Xml(#[from] crate::rfc::dav::parse::ParseError),

    #[error("Invalid calendar or contact data: {0}")]
    Content(#[from] crate::rfc::ical::ParseError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),
}

pub type RfcResult<T> = std::result::Result<T, RfcError>;
