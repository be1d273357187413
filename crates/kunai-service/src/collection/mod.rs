//! The collection capability the report dispatcher is written against.
//!
//! Stored calendars and address books read through the [`DavStore`]; the
//! birthday calendar is computed from the owner's address books on load.

mod birthday;
mod stored;

pub use birthday::BirthdayCalendar;
pub use stored::StoredCollection;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kunai_store::{Collection as CollectionRecord, DavStore, PutOutcome, Resource, Tombstone};

use crate::error::ServiceResult;

/// ## Summary
/// Read access to one collection's members and change history.
///
/// Implementations hand out a consistent view for the duration of a
/// request: resources carry their `last_modified`, deletions surface as
/// tombstones until the retention horizon passes them.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Metadata, including the current `CTag`.
    fn record(&self) -> &CollectionRecord;

    /// ## Errors
    /// Returns an error if the backing store fails.
    async fn resources(&self) -> ServiceResult<Vec<Resource>>;

    /// ## Errors
    /// Returns an error if the backing store fails.
    async fn resource(&self, name: &str) -> ServiceResult<Option<Resource>>;

    /// ## Summary
    /// Deletions recorded strictly after `since`.
    ///
    /// ## Errors
    /// Returns an error if the backing store fails.
    async fn tombstones_since(&self, since: DateTime<Utc>) -> ServiceResult<Vec<Tombstone>>;

    /// ## Errors
    /// Returns an error if the backing store fails.
    async fn retention_horizon(&self) -> ServiceResult<DateTime<Utc>>;

    /// ## Errors
    /// Returns `Forbidden` for read-only collections, or a store error.
    async fn put(&self, name: &str, body: String) -> ServiceResult<PutOutcome>;

    /// ## Errors
    /// Returns `Forbidden` for read-only collections, or a store error.
    async fn delete(&self, name: &str) -> ServiceResult<bool>;
}

/// ## Summary
/// Opens the stored collection behind a record.
#[must_use]
pub fn stored(store: std::sync::Arc<dyn DavStore>, record: CollectionRecord) -> Box<dyn Collection> {
    Box::new(StoredCollection::new(store, record))
}
