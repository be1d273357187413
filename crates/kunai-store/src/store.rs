//! The storage interface read by the query engine.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kunai_core::types::CollectionKind;

use crate::error::StoreResult;
use crate::model::{Collection, NewCollection, Principal, PutOutcome, Resource, Tombstone};

/// ## Summary
/// Read and write access to principals, collections, resources and tombstones.
///
/// Implementations must hand out strictly increasing `last_modified` and
/// `deleted_at` timestamps within a collection, so that a watermark taken
/// from them orders every later change after it.
#[async_trait]
pub trait DavStore: Send + Sync {
    /// ## Summary
    /// Looks up a principal by its URL slug.
    ///
    /// ## Errors
    /// Returns an error if the backing store is unavailable.
    async fn principal(&self, name: &str) -> StoreResult<Option<Principal>>;

    /// ## Summary
    /// Lists the collections of one kind in a user's home.
    ///
    /// ## Errors
    /// Returns an error if the backing store is unavailable.
    async fn collections(&self, owner: &str, kind: CollectionKind)
    -> StoreResult<Vec<Collection>>;

    /// ## Summary
    /// Finds collections by slug in a user's home.
    ///
    /// More than one result means the slug is ambiguous.
    ///
    /// ## Errors
    /// Returns an error if the backing store is unavailable.
    async fn find_collections(
        &self,
        owner: &str,
        kind: CollectionKind,
        slug: &str,
    ) -> StoreResult<Vec<Collection>>;

    /// ## Errors
    /// Returns an error if the backing store is unavailable.
    async fn collection(&self, id: u64) -> StoreResult<Option<Collection>>;

    /// ## Summary
    /// Lists the live resources of a collection, ordered by name.
    ///
    /// ## Errors
    /// Returns `StoreError::CollectionNotFound` for an unknown collection.
    async fn resources(&self, collection_id: u64) -> StoreResult<Vec<Resource>>;

    /// ## Errors
    /// Returns `StoreError::CollectionNotFound` for an unknown collection.
    async fn resource(&self, collection_id: u64, name: &str) -> StoreResult<Option<Resource>>;

    /// ## Summary
    /// Returns tombstones with `deleted_at` strictly after `since`.
    ///
    /// ## Errors
    /// Returns `StoreError::CollectionNotFound` for an unknown collection.
    async fn tombstones_since(
        &self,
        collection_id: u64,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Tombstone>>;

    /// ## Summary
    /// The oldest instant for which tombstones are guaranteed complete.
    ///
    /// ## Errors
    /// Returns `StoreError::CollectionNotFound` for an unknown collection.
    async fn retention_horizon(&self, collection_id: u64) -> StoreResult<DateTime<Utc>>;

    /// ## Errors
    /// Returns an error if the slug is invalid or the store is unavailable.
    async fn create_collection(&self, new: NewCollection) -> StoreResult<Collection>;

    /// ## Summary
    /// Creates or replaces a resource, clearing any tombstone for its name.
    ///
    /// ## Errors
    /// Returns `StoreError::CollectionNotFound` for an unknown collection.
    async fn put_resource(
        &self,
        collection_id: u64,
        name: &str,
        body: String,
    ) -> StoreResult<PutOutcome>;

    /// ## Summary
    /// Deletes a resource and records a tombstone for it.
    ///
    /// Returns `false` if there was nothing to delete.
    ///
    /// ## Errors
    /// Returns `StoreError::CollectionNotFound` for an unknown collection.
    async fn delete_resource(&self, collection_id: u64, name: &str) -> StoreResult<bool>;
}
