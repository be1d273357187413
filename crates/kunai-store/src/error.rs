use thiserror::Error;

/// Storage layer errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Collection not found: id={0}")]
    CollectionNotFound(u64),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
