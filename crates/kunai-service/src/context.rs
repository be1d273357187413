//! Per-request state shared by the DAV services.

use std::sync::Arc;

use kunai_core::config::Settings;
use kunai_core::constants::BIRTHDAY_CALENDAR_SLUG;
use kunai_store::{DavStore, Principal};

use crate::collection::{self, BirthdayCalendar, Collection};
use crate::error::{ServiceError, ServiceResult};
use crate::path::{DavPath, HomeKind};
use crate::sync::SyncTokenCodec;

/// ## Summary
/// The authenticated user plus the store and settings a request runs against.
///
/// Cheap to clone; built once per request by the HTTP layer.
#[derive(Clone)]
pub struct DavContext {
    pub store: Arc<dyn DavStore>,
    pub settings: Arc<Settings>,
    pub user: Principal,
}

impl DavContext {
    #[must_use]
    pub fn new(store: Arc<dyn DavStore>, settings: Arc<Settings>, user: Principal) -> Self {
        Self {
            store,
            settings,
            user,
        }
    }

    /// ## Summary
    /// Rejects paths that belong to another principal.
    ///
    /// ## Errors
    /// Returns `Forbidden` when the path's user is not the authenticated one.
    pub fn authorize(&self, path: &DavPath) -> ServiceResult<()> {
        if path.user() == self.user.name {
            Ok(())
        } else {
            tracing::debug!(user = %self.user.name, target = %path, "Cross-principal access denied");
            Err(ServiceError::forbidden(format!(
                "{} may not access {}",
                self.user.name,
                path.href()
            )))
        }
    }

    #[must_use]
    pub fn token_codec(&self) -> SyncTokenCodec {
        SyncTokenCodec::new(self.settings.sync.token_salt.clone())
    }

    /// ## Summary
    /// Resolves `slug` in `owner`'s home to exactly one collection.
    ///
    /// The birthday slug in a calendar home opens the generated birthday
    /// calendar.
    ///
    /// ## Errors
    /// Returns `NotFound` when nothing matches, `AmbiguousCollection` when
    /// more than one collection does, or a store error.
    #[tracing::instrument(skip(self))]
    pub async fn open_collection(
        &self,
        home: HomeKind,
        owner: &str,
        slug: &str,
    ) -> ServiceResult<Box<dyn Collection>> {
        let mut matches = self
            .store
            .find_collections(owner, home.stored_kind(), slug)
            .await?;
        let birthdays = home == HomeKind::Calendar && slug == BIRTHDAY_CALENDAR_SLUG;

        match (matches.len(), birthdays) {
            (0, true) => Ok(Box::new(
                BirthdayCalendar::load(self.store.clone(), owner).await?,
            )),
            (0, false) => Err(ServiceError::NotFound(DavPath::collection_href(
                home, owner, slug,
            ))),
            (1, false) => {
                let record = matches.remove(0);
                Ok(collection::stored(self.store.clone(), record))
            }
            (count, _) => {
                tracing::warn!(owner, slug, count, "Collection slug is ambiguous");
                Err(ServiceError::AmbiguousCollection(DavPath::collection_href(
                    home, owner, slug,
                )))
            }
        }
    }

    /// ## Summary
    /// Every collection in `owner`'s home, the birthday calendar last.
    ///
    /// ## Errors
    /// Returns an error if the store fails.
    pub async fn home_collections(
        &self,
        home: HomeKind,
        owner: &str,
    ) -> ServiceResult<Vec<Box<dyn Collection>>> {
        let mut collections: Vec<Box<dyn Collection>> = self
            .store
            .collections(owner, home.stored_kind())
            .await?
            .into_iter()
            .map(|record| collection::stored(self.store.clone(), record))
            .collect();

        if home == HomeKind::Calendar
            && !collections
                .iter()
                .any(|c| c.record().slug == BIRTHDAY_CALENDAR_SLUG)
        {
            collections.push(Box::new(
                BirthdayCalendar::load(self.store.clone(), owner).await?,
            ));
        }
        Ok(collections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kunai_core::types::CollectionKind;
    use kunai_store::{MemoryStore, NewCollection};

    fn context(store: Arc<MemoryStore>) -> DavContext {
        DavContext::new(
            store,
            Arc::new(Settings::for_single_user("alice")),
            Principal {
                name: "alice".into(),
                display_name: "Alice".into(),
                email: Some("alice@example.com".into()),
            },
        )
    }

    #[test]
    fn other_users_are_forbidden() {
        let ctx = context(Arc::new(MemoryStore::new()));
        let own = DavPath::parse("/api/dav/cal/alice/work/").unwrap();
        let other = DavPath::parse("/api/dav/cal/bob/work/").unwrap();
        assert!(ctx.authorize(&own).is_ok());
        assert_eq!(ctx.authorize(&other).unwrap_err().status_code(), 403);
    }

    #[test_log::test(tokio::test)]
    async fn resolves_stored_and_birthday_calendars() {
        let store = Arc::new(MemoryStore::new());
        store
            .create_collection(NewCollection::new("alice", "work", CollectionKind::Calendar))
            .await
            .unwrap();
        let ctx = context(store);

        let work = ctx
            .open_collection(HomeKind::Calendar, "alice", "work")
            .await
            .unwrap();
        assert_eq!(work.record().kind, CollectionKind::Calendar);

        let birthdays = ctx
            .open_collection(HomeKind::Calendar, "alice", "birthdays")
            .await
            .unwrap();
        assert_eq!(birthdays.record().kind, CollectionKind::Birthdays);

        let missing = ctx
            .open_collection(HomeKind::Calendar, "alice", "nope")
            .await
            .err()
            .unwrap();
        assert_eq!(missing.status_code(), 404);

        let homes = ctx.home_collections(HomeKind::Calendar, "alice").await.unwrap();
        assert_eq!(homes.len(), 2);
    }

    #[test_log::test(tokio::test)]
    async fn duplicate_slugs_conflict() {
        let store = Arc::new(MemoryStore::new());
        for _ in 0..2 {
            store
                .create_collection(NewCollection::new(
                    "alice",
                    "friends",
                    CollectionKind::Addressbook,
                ))
                .await
                .unwrap();
        }
        store
            .create_collection(NewCollection::new(
                "alice",
                "birthdays",
                CollectionKind::Calendar,
            ))
            .await
            .unwrap();
        let ctx = context(store);

        for (home, slug) in [
            (HomeKind::Addressbook, "friends"),
            (HomeKind::Calendar, "birthdays"),
        ] {
            let err = ctx.open_collection(home, "alice", slug).await.err().unwrap();
            assert_eq!(err.status_code(), 409);
        }
    }
}
