//! In-process [`DavStore`] backed by a `tokio` read-write lock.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kunai_core::types::{CollectionKind, validate_slug};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::etag::{generate_ctag, generate_etag};
use crate::model::{Collection, NewCollection, Principal, PutOutcome, Resource, Tombstone};
use crate::store::DavStore;

#[derive(Debug)]
struct CollectionState {
    collection: Collection,
    resources: BTreeMap<String, Resource>,
    tombstones: Vec<Tombstone>,
    horizon: DateTime<Utc>,
}

impl CollectionState {
    fn refresh_ctag(&mut self, now: DateTime<Utc>) {
        self.collection.ctag = generate_ctag(
            self.resources
                .values()
                .map(|r| (r.name.as_str(), r.etag.as_str())),
        );
        self.collection.updated_at = now;
    }
}

#[derive(Debug, Default)]
struct State {
    principals: BTreeMap<String, Principal>,
    collections: BTreeMap<u64, CollectionState>,
    next_id: u64,
    last_tick: Option<DateTime<Utc>>,
}

impl State {
    /// Microsecond clock that never repeats or runs backwards.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = DateTime::from_timestamp_micros(Utc::now().timestamp_micros())
            .unwrap_or_else(Utc::now);
        let next = match self.last_tick {
            Some(last) if now <= last => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn collection_mut(&mut self, id: u64) -> StoreResult<&mut CollectionState> {
        self.collections
            .get_mut(&id)
            .ok_or(StoreError::CollectionNotFound(id))
    }

    fn collection(&self, id: u64) -> StoreResult<&CollectionState> {
        self.collections
            .get(&id)
            .ok_or(StoreError::CollectionNotFound(id))
    }
}

/// ## Summary
/// A [`DavStore`] holding everything in memory.
///
/// Used by tests and single-process deployments; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ## Summary
    /// Registers a principal, replacing any existing one with the same name.
    ///
    /// ## Errors
    /// Returns an error if the name is not a valid path segment.
    pub async fn add_principal(&self, principal: Principal) -> StoreResult<()> {
        validate_slug(&principal.name)?;
        let mut state = self.state.write().await;
        state.principals.insert(principal.name.clone(), principal);
        Ok(())
    }

    /// ## Summary
    /// Drops tombstones deleted at or before `cutoff`.
    ///
    /// A collection's retention horizon moves up to the newest tombstone
    /// removed from it, so tokens that never saw that deletion stop being
    /// accepted. Collections that lost no tombstone keep their horizon.
    ///
    /// Returns the number of tombstones removed.
    pub async fn purge_tombstones(&self, cutoff: DateTime<Utc>) -> usize {
        let mut state = self.state.write().await;
        let mut removed = 0;
        for entry in state.collections.values_mut() {
            let newest_purged = entry
                .tombstones
                .iter()
                .filter(|t| t.deleted_at <= cutoff)
                .map(|t| t.deleted_at)
                .max();
            let Some(newest_purged) = newest_purged else {
                continue;
            };

            let before = entry.tombstones.len();
            entry.tombstones.retain(|t| t.deleted_at > cutoff);
            removed += before - entry.tombstones.len();
            entry.horizon = entry.horizon.max(newest_purged);
        }
        tracing::debug!(removed, %cutoff, "Purged tombstones");
        removed
    }
}

#[async_trait]
impl DavStore for MemoryStore {
    async fn principal(&self, name: &str) -> StoreResult<Option<Principal>> {
        Ok(self.state.read().await.principals.get(name).cloned())
    }

    async fn collections(
        &self,
        owner: &str,
        kind: CollectionKind,
    ) -> StoreResult<Vec<Collection>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .values()
            .map(|c| &c.collection)
            .filter(|c| c.owner == owner && c.kind == kind)
            .cloned()
            .collect())
    }

    async fn find_collections(
        &self,
        owner: &str,
        kind: CollectionKind,
        slug: &str,
    ) -> StoreResult<Vec<Collection>> {
        let state = self.state.read().await;
        Ok(state
            .collections
            .values()
            .map(|c| &c.collection)
            .filter(|c| c.owner == owner && c.kind == kind && c.slug == slug)
            .cloned()
            .collect())
    }

    async fn collection(&self, id: u64) -> StoreResult<Option<Collection>> {
        let state = self.state.read().await;
        Ok(state.collections.get(&id).map(|c| c.collection.clone()))
    }

    async fn resources(&self, collection_id: u64) -> StoreResult<Vec<Resource>> {
        let state = self.state.read().await;
        Ok(state
            .collection(collection_id)?
            .resources
            .values()
            .cloned()
            .collect())
    }

    async fn resource(&self, collection_id: u64, name: &str) -> StoreResult<Option<Resource>> {
        let state = self.state.read().await;
        Ok(state
            .collection(collection_id)?
            .resources
            .get(name)
            .cloned())
    }

    async fn tombstones_since(
        &self,
        collection_id: u64,
        since: DateTime<Utc>,
    ) -> StoreResult<Vec<Tombstone>> {
        let state = self.state.read().await;
        Ok(state
            .collection(collection_id)?
            .tombstones
            .iter()
            .filter(|t| t.deleted_at > since)
            .cloned()
            .collect())
    }

    async fn retention_horizon(&self, collection_id: u64) -> StoreResult<DateTime<Utc>> {
        let state = self.state.read().await;
        Ok(state.collection(collection_id)?.horizon)
    }

    #[tracing::instrument(skip(self, new), fields(owner = %new.owner, slug = %new.slug))]
    async fn create_collection(&self, new: NewCollection) -> StoreResult<Collection> {
        validate_slug(&new.owner)?;
        validate_slug(&new.slug)?;

        let mut state = self.state.write().await;
        let now = state.tick();
        state.next_id += 1;
        let id = state.next_id;

        let collection = Collection {
            id,
            owner: new.owner,
            slug: new.slug,
            kind: new.kind,
            display_name: new.display_name,
            description: new.description,
            timezone: new.timezone,
            access: new.access,
            ctag: generate_ctag([]),
            updated_at: now,
        };
        state.collections.insert(
            id,
            CollectionState {
                collection: collection.clone(),
                resources: BTreeMap::new(),
                tombstones: Vec::new(),
                horizon: now,
            },
        );

        tracing::debug!(id, "Collection created");
        Ok(collection)
    }

    #[tracing::instrument(skip(self, body), fields(bytes = body.len()))]
    async fn put_resource(
        &self,
        collection_id: u64,
        name: &str,
        body: String,
    ) -> StoreResult<PutOutcome> {
        validate_slug(name)?;

        let mut state = self.state.write().await;
        let now = state.tick();
        let entry = state.collection_mut(collection_id)?;

        let resource = Resource {
            collection_id,
            name: name.to_string(),
            etag: generate_etag(body.as_bytes()),
            body,
            last_modified: now,
        };
        let created = entry
            .resources
            .insert(name.to_string(), resource.clone())
            .is_none();
        entry.tombstones.retain(|t| t.name != name);
        entry.refresh_ctag(now);

        tracing::debug!(created, etag = %resource.etag, "Resource stored");
        Ok(PutOutcome { resource, created })
    }

    #[tracing::instrument(skip(self))]
    async fn delete_resource(&self, collection_id: u64, name: &str) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let now = state.tick();
        let entry = state.collection_mut(collection_id)?;

        if entry.resources.remove(name).is_none() {
            return Ok(false);
        }
        entry.tombstones.push(Tombstone {
            collection_id,
            name: name.to_string(),
            deleted_at: now,
        });
        entry.refresh_ctag(now);

        tracing::debug!("Resource deleted");
        Ok(true)
    }
}
