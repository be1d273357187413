use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kunai_store::{Collection as CollectionRecord, DavStore, PutOutcome, Resource, Tombstone};

use super::Collection;
use crate::error::{ServiceError, ServiceResult};

/// A calendar or address book held by the store.
pub struct StoredCollection {
    store: Arc<dyn DavStore>,
    record: CollectionRecord,
}

impl StoredCollection {
    #[must_use]
    pub fn new(store: Arc<dyn DavStore>, record: CollectionRecord) -> Self {
        Self { store, record }
    }

    fn ensure_writable(&self) -> ServiceResult<()> {
        if self.record.access.can_write() {
            Ok(())
        } else {
            Err(ServiceError::read_only(format!(
                "collection {} is shared read-only",
                self.record.slug
            )))
        }
    }
}

#[async_trait]
impl Collection for StoredCollection {
    fn record(&self) -> &CollectionRecord {
        &self.record
    }

    async fn resources(&self) -> ServiceResult<Vec<Resource>> {
        Ok(self.store.resources(self.record.id).await?)
    }

    async fn resource(&self, name: &str) -> ServiceResult<Option<Resource>> {
        Ok(self.store.resource(self.record.id, name).await?)
    }

    async fn tombstones_since(&self, since: DateTime<Utc>) -> ServiceResult<Vec<Tombstone>> {
        Ok(self.store.tombstones_since(self.record.id, since).await?)
    }

    async fn retention_horizon(&self) -> ServiceResult<DateTime<Utc>> {
        Ok(self.store.retention_horizon(self.record.id).await?)
    }

    async fn put(&self, name: &str, body: String) -> ServiceResult<PutOutcome> {
        self.ensure_writable()?;
        Ok(self.store.put_resource(self.record.id, name, body).await?)
    }

    async fn delete(&self, name: &str) -> ServiceResult<bool> {
        self.ensure_writable()?;
        Ok(self.store.delete_resource(self.record.id, name).await?)
    }
}
