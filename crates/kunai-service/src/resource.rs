//! GET, HEAD, PUT and DELETE on calendar objects and vCards.

use kunai_core::constants::{CALENDAR_CONTENT_TYPE, MAX_RESOURCE_SIZE, VCARD_CONTENT_TYPE};
use kunai_rfc::rfc::ical::parse_calendar;
use kunai_rfc::rfc::vcard::parse_vcards;
use kunai_store::{PutOutcome, Resource};

use crate::collection::Collection;
use crate::context::DavContext;
use crate::error::{ServiceError, ServiceResult};
use crate::path::{DavPath, HomeKind};

/// A resource ready to be served.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub resource: Resource,
    pub content_type: &'static str,
}

/// Collection and member name behind a resource path.
async fn open_member(
    ctx: &DavContext,
    path: &DavPath,
) -> ServiceResult<(HomeKind, Box<dyn Collection>, String)> {
    ctx.authorize(path)?;
    let DavPath::Resource {
        home,
        user,
        slug,
        name,
    } = path
    else {
        return Err(ServiceError::forbidden(format!(
            "{} is not a calendar object or vCard",
            path.href()
        )));
    };
    let collection = ctx.open_collection(*home, user, slug).await?;
    Ok((*home, collection, name.clone()))
}

/// ## Summary
/// Loads a resource for GET or HEAD.
///
/// ## Errors
/// Returns `NotFound` when it does not exist, `Forbidden` for collection
/// paths or another principal's path, or a store error.
#[tracing::instrument(skip_all, fields(target = %path))]
pub async fn get_resource(ctx: &DavContext, path: &DavPath) -> ServiceResult<FetchedResource> {
    let (home, collection, name) = open_member(ctx, path).await?;
    let resource = collection
        .resource(&name)
        .await?
        .ok_or_else(|| ServiceError::NotFound(path.href()))?;
    Ok(FetchedResource {
        resource,
        content_type: match home {
            HomeKind::Calendar => CALENDAR_CONTENT_TYPE,
            HomeKind::Addressbook => VCARD_CONTENT_TYPE,
        },
    })
}

/// ## Summary
/// Stores a calendar object or vCard after checking it parses.
///
/// ## Errors
/// Returns `RequestTooLarge` above the advertised maximum resource size,
/// `BadRequest` for an unparsable body, `Forbidden` for read-only
/// collections, or a store error.
#[tracing::instrument(skip_all, fields(target = %path, bytes = body.len()))]
pub async fn put_resource(
    ctx: &DavContext,
    path: &DavPath,
    body: String,
) -> ServiceResult<PutOutcome> {
    let (home, collection, name) = open_member(ctx, path).await?;

    if u64::try_from(body.len()).unwrap_or(u64::MAX) > MAX_RESOURCE_SIZE {
        return Err(ServiceError::RequestTooLarge {
            limit: MAX_RESOURCE_SIZE,
        });
    }

    let valid = match home {
        HomeKind::Calendar => parse_calendar(&body).map(|_| ()),
        HomeKind::Addressbook => parse_vcards(&body).map(|_| ()),
    };
    if let Err(e) = valid {
        return Err(ServiceError::BadRequest(format!("invalid body for {name}: {e}")));
    }

    let outcome = collection.put(&name, body).await?;
    tracing::info!(created = outcome.created, etag = %outcome.resource.etag, "Resource written");
    Ok(outcome)
}

/// ## Summary
/// Deletes a resource, leaving a tombstone for sync.
///
/// ## Errors
/// Returns `NotFound` when it does not exist, `Forbidden` for read-only
/// collections, or a store error.
#[tracing::instrument(skip_all, fields(target = %path))]
pub async fn delete_resource(ctx: &DavContext, path: &DavPath) -> ServiceResult<()> {
    let (_, collection, name) = open_member(ctx, path).await?;
    if collection.delete(&name).await? {
        tracing::info!("Resource deleted");
        Ok(())
    } else {
        Err(ServiceError::NotFound(path.href()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kunai_core::config::Settings;
    use kunai_core::types::CollectionKind;
    use kunai_rfc::rfc::dav::core::Precondition;
    use kunai_store::{DavStore, MemoryStore, NewCollection, Principal};

    use super::*;

    const EVENT: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\nBEGIN:VEVENT\r\nUID:1\r\nDTSTART:20240101T090000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    async fn context() -> DavContext {
        let store = Arc::new(MemoryStore::new());
        store
            .create_collection(NewCollection::new("alice", "work", CollectionKind::Calendar))
            .await
            .unwrap();
        store
            .create_collection(
                NewCollection::new("alice", "team", CollectionKind::Calendar).read_only(),
            )
            .await
            .unwrap();
        DavContext::new(
            store,
            Arc::new(Settings::for_single_user("alice")),
            Principal {
                name: "alice".into(),
                display_name: "Alice".into(),
                email: None,
            },
        )
    }

    fn path(p: &str) -> DavPath {
        DavPath::parse(p).unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn put_get_delete() {
        let ctx = context().await;
        let target = path("/api/dav/cal/alice/work/standup.ics");

        let outcome = put_resource(&ctx, &target, EVENT.to_string()).await.unwrap();
        assert!(outcome.created);

        let fetched = get_resource(&ctx, &target).await.unwrap();
        assert_eq!(fetched.resource.body, EVENT);
        assert_eq!(fetched.resource.etag, outcome.resource.etag);
        assert_eq!(fetched.content_type, CALENDAR_CONTENT_TYPE);

        delete_resource(&ctx, &target).await.unwrap();
        assert_eq!(get_resource(&ctx, &target).await.unwrap_err().status_code(), 404);
        assert_eq!(delete_resource(&ctx, &target).await.unwrap_err().status_code(), 404);
    }

    #[test_log::test(tokio::test)]
    async fn invalid_bodies_are_rejected() {
        let ctx = context().await;
        let err = put_resource(&ctx, &path("/api/dav/cal/alice/work/x.ics"), "not ical".into())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test_log::test(tokio::test)]
    async fn read_only_collections_refuse_writes() {
        let ctx = context().await;
        for target in [
            "/api/dav/cal/alice/team/x.ics",
            "/api/dav/cal/alice/birthdays/x.ics",
        ] {
            let err = put_resource(&ctx, &path(target), EVENT.to_string())
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 403);
            assert_eq!(err.precondition(), Some(Precondition::NeedPrivileges));
        }
    }

    #[test_log::test(tokio::test)]
    async fn collections_are_not_resources() {
        let ctx = context().await;
        let err = get_resource(&ctx, &path("/api/dav/cal/alice/work/"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
