//! `WebDAV` XML serialization.

mod error;
mod multistatus;

pub use error::serialize_error;
pub use multistatus::serialize_multistatus;

/// Failure while writing XML output.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("I/O error while writing XML: {0}")]
    Io(#[from] std::io::Error),

    #[error("Generated invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type BuildResult<T> = Result<T, BuildError>;
