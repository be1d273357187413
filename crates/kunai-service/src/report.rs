//! REPORT dispatch.
//!
//! Every report is collection-scoped except `expand-property`, which may also
//! target a principal or home. Calendar reports are refused on address books
//! and the reverse.

use futures::future::BoxFuture;
use kunai_rfc::rfc::dav::core::{
    AddressbookQuery, CalendarQuery, ExpandProperty, ExpandPropertyItem, FreeBusyQuery, Href,
    Multiget, Multistatus, PropertyName, PropertyValue, PropstatResponse, QName, ReportRequest,
    ReportScope, ReportType, Status, SyncCollection, dav_props,
};
use kunai_rfc::rfc::ical::expand::TimeZoneResolver;
use kunai_rfc::rfc::ical::{Component, parse_calendar};
use kunai_rfc::rfc::vcard::parse_vcards;
use kunai_store::Resource;

use crate::collection::Collection;
use crate::context::DavContext;
use crate::error::{ServiceError, ServiceResult};
use crate::filter::{calendar_matches, card_matches};
use crate::freebusy::free_busy;
use crate::path::{DavPath, HomeKind};
use crate::props::Target;
use crate::resolve::Resolved;
use crate::sync::{Change, SyncToken, current_watermark, diff, resolve_token};

/// What a REPORT produced.
#[derive(Debug)]
pub enum ReportOutcome {
    /// A 207 multistatus.
    Multistatus(Multistatus),
    /// A `free-busy-query` answer: a `text/calendar` body served with 200.
    Calendar(String),
}

/// ## Summary
/// Runs a parsed REPORT against `path`.
///
/// ## Errors
/// Returns `Forbidden` when the report does not apply to the target (a
/// resource, or a collection of the other kind), `InvalidSyncToken` for a
/// rejected `sync-collection` token, `NotFound`/`AmbiguousCollection` from
/// collection resolution, or a store error.
#[tracing::instrument(skip_all, fields(report = request.report_type.name(), target = %path))]
pub async fn execute_report(
    ctx: &DavContext,
    path: &DavPath,
    request: &ReportRequest,
) -> ServiceResult<ReportOutcome> {
    ctx.authorize(path)?;

    let report_type = &request.report_type;
    if let DavPath::Resource { .. } = path {
        return Err(ServiceError::unsupported_report(format!(
            "{} is not a collection",
            path.href()
        )));
    }

    if let ReportType::ExpandProperty(expand) = report_type {
        return expand_property(ctx, path, expand)
            .await
            .map(ReportOutcome::Multistatus);
    }

    let DavPath::Collection { home, user, slug } = path else {
        return Err(ServiceError::unsupported_report(format!(
            "{} is not supported on {}",
            report_type.name(),
            path.href()
        )));
    };

    let allowed = match report_type.scope() {
        ReportScope::Calendar => *home == HomeKind::Calendar,
        ReportScope::Addressbook => *home == HomeKind::Addressbook,
        ReportScope::AnyCollection => true,
    };
    if !allowed {
        return Err(ServiceError::unsupported_report(format!(
            "{} is not supported on {}",
            report_type.name(),
            path.href()
        )));
    }

    let collection = ctx.open_collection(*home, user, slug).await?;
    let report = CollectionReport {
        ctx,
        collection: collection.as_ref(),
        href: Href::new(path.href()),
        properties: requested_properties(request),
    };

    let outcome = match report_type {
        ReportType::CalendarQuery(query) => ReportOutcome::Multistatus(report.calendar_query(query).await?),
        ReportType::AddressbookQuery(query) => {
            ReportOutcome::Multistatus(report.addressbook_query(query).await?)
        }
        ReportType::CalendarMultiget(multiget) | ReportType::AddressbookMultiget(multiget) => {
            ReportOutcome::Multistatus(report.multiget(multiget).await?)
        }
        ReportType::SyncCollection(sync) => ReportOutcome::Multistatus(report.sync_collection(sync).await?),
        ReportType::FreeBusyQuery(query) => ReportOutcome::Calendar(report.free_busy(query).await?),
        ReportType::ExpandProperty(_) => {
            return Err(ServiceError::Internal(
                "expand-property reached collection dispatch".to_string(),
            ));
        }
    };
    Ok(outcome)
}

/// Properties to report per resource; `getetag` when the body names none.
fn requested_properties(request: &ReportRequest) -> Vec<PropertyName> {
    if request.properties.is_empty() {
        vec![PropertyName::Simple(QName::dav(dav_props::GETETAG))]
    } else {
        request.properties.clone()
    }
}

/// One report against one resolved collection.
struct CollectionReport<'a> {
    ctx: &'a DavContext,
    collection: &'a dyn Collection,
    href: Href,
    properties: Vec<PropertyName>,
}

impl CollectionReport<'_> {
    fn resource_response(&self, href: impl Into<Href>, resource: &Resource) -> PropstatResponse {
        let record = self.collection.record();
        Target::Resource {
            kind: record.kind,
            access: record.access,
            resource,
        }
        .respond_with(href, &self.ctx.user.name, &self.properties)
    }

    /// Responses for `matched`, cut to `limit` with a 507 entry when truncated.
    fn limited(&self, mut matched: Vec<Resource>, limit: Option<u32>) -> Multistatus {
        let truncated = match limit.map(|l| usize::try_from(l).unwrap_or(usize::MAX)) {
            Some(limit) if matched.len() > limit => {
                matched.truncate(limit);
                true
            }
            _ => false,
        };

        let mut multistatus = Multistatus::new();
        for resource in &matched {
            multistatus.add_response(self.resource_response(self.href.join(&resource.name), resource));
        }
        if truncated {
            multistatus.add_response(self.truncation_notice());
        }
        multistatus
    }

    fn truncation_notice(&self) -> PropstatResponse {
        PropstatResponse::status(self.href.clone(), Status::InsufficientStorage)
            .with_description("Result set truncated by the requested limit")
    }

    async fn calendar_query(&self, query: &CalendarQuery) -> ServiceResult<Multistatus> {
        let resources = self.collection.resources().await?;
        let total = resources.len();
        let mut resolver = TimeZoneResolver::default();

        let matched: Vec<Resource> = resources
            .into_iter()
            .filter(|resource| {
                parse_stored_calendar(resource)
                    .is_some_and(|calendar| calendar_matches(&calendar, &query.filter, &mut resolver))
            })
            .collect();

        tracing::debug!(total, matched = matched.len(), "Evaluated calendar-query filter");
        Ok(self.limited(matched, query.limit))
    }

    async fn addressbook_query(&self, query: &AddressbookQuery) -> ServiceResult<Multistatus> {
        let resources = self.collection.resources().await?;
        let total = resources.len();

        let matched: Vec<Resource> = resources
            .into_iter()
            .filter(|resource| match parse_vcards(&resource.body) {
                Ok(cards) => cards.iter().any(|card| card_matches(card, &query.filter)),
                Err(e) => {
                    tracing::warn!(resource = %resource.name, error = %e, "Skipping unparsable vCard");
                    false
                }
            })
            .collect();

        tracing::debug!(total, matched = matched.len(), "Evaluated addressbook-query filter");
        Ok(self.limited(matched, query.limit))
    }

    async fn multiget(&self, multiget: &Multiget) -> ServiceResult<Multistatus> {
        let mut multistatus = Multistatus::new();
        for href in &multiget.hrefs {
            let resource = match self.member_name(href) {
                Some(name) => self.collection.resource(&name).await?,
                None => None,
            };
            multistatus.add_response(match resource {
                Some(resource) => self.resource_response(href.clone(), &resource),
                None => PropstatResponse::not_found(href.clone()),
            });
        }
        Ok(multistatus)
    }

    /// Resource name `href` points at, when it is a member of this collection.
    fn member_name(&self, href: &Href) -> Option<String> {
        let record = self.collection.record();
        match DavPath::parse(href.as_str()) {
            Ok(DavPath::Resource {
                home,
                user,
                slug,
                name,
            }) if home.stored_kind().is_calendar() == record.kind.is_calendar()
                && user == record.owner
                && slug == record.slug =>
            {
                Some(name)
            }
            _ => None,
        }
    }

    async fn sync_collection(&self, sync: &SyncCollection) -> ServiceResult<Multistatus> {
        let codec = self.ctx.token_codec();
        let resources = self.collection.resources().await?;
        let current = current_watermark(self.collection, &resources).await?;
        let since = resolve_token(&codec, self.collection, current, &sync.sync_token).await?;

        let mut changes = diff(self.collection, resources, since).await?;
        if let Some(limit) = sync.limit {
            changes = changes.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        let mut multistatus = Multistatus::new();
        for change in &changes.changes {
            let href = self.href.join(change.name());
            multistatus.add_response(match change {
                Change::Upsert(resource) => self.resource_response(href, resource),
                Change::Deleted { .. } => PropstatResponse::not_found(href),
            });
        }
        if changes.truncated {
            multistatus.add_response(self.truncation_notice());
        }

        let record = self.collection.record();
        multistatus.set_sync_token(codec.encode(&SyncToken {
            kind: record.kind,
            collection_id: record.id,
            watermark: changes.watermark,
        }));

        tracing::debug!(
            initial = since.is_none(),
            changes = changes.changes.len(),
            truncated = changes.truncated,
            "Computed sync-collection changes"
        );
        Ok(multistatus)
    }

    async fn free_busy(&self, query: &FreeBusyQuery) -> ServiceResult<String> {
        let calendars: Vec<Component> = self
            .collection
            .resources()
            .await?
            .iter()
            .filter_map(parse_stored_calendar)
            .collect();
        Ok(free_busy(
            &calendars,
            query.time_range.as_ref(),
            self.ctx.settings.freebusy.merge_periods,
        ))
    }
}

fn parse_stored_calendar(resource: &Resource) -> Option<Component> {
    match parse_calendar(&resource.body) {
        Ok(calendar) => Some(calendar),
        Err(e) => {
            tracing::warn!(resource = %resource.name, error = %e, "Skipping unparsable calendar object");
            None
        }
    }
}

/// ## Summary
/// `DAV:expand-property` (RFC 3253 §3.8) on a principal, home or collection.
///
/// Properties holding hrefs are replaced by the responses for the resources
/// they point at, recursively per the request tree. Hrefs outside this
/// user's DAV space are reported as 404 responses.
async fn expand_property(
    ctx: &DavContext,
    path: &DavPath,
    expand: &ExpandProperty,
) -> ServiceResult<Multistatus> {
    let mut multistatus = Multistatus::new();
    multistatus.add_response(expand_response(ctx, path.clone(), &expand.properties).await?);
    Ok(multistatus)
}

fn expand_response<'a>(
    ctx: &'a DavContext,
    path: DavPath,
    items: &'a [ExpandPropertyItem],
) -> BoxFuture<'a, ServiceResult<PropstatResponse>> {
    Box::pin(async move {
        let resolved = Resolved::load(ctx, &path).await?;
        let target = resolved.target();

        let mut properties = Vec::with_capacity(items.len());
        for item in items {
            let mut property =
                target.property(&PropertyName::Simple(item.name.clone()), &ctx.user.name);

            let hrefs: Vec<String> = property
                .value
                .as_ref()
                .map(|value| value.hrefs().into_iter().map(str::to_string).collect())
                .unwrap_or_default();

            if !item.properties.is_empty() && !hrefs.is_empty() {
                let mut nested = Vec::with_capacity(hrefs.len());
                for href in hrefs {
                    let expanded = match DavPath::parse(&href) {
                        Ok(next) if ctx.authorize(&next).is_ok() => {
                            match expand_response(ctx, next, &item.properties).await {
                                Ok(response) => Some(response),
                                Err(ServiceError::NotFound(_)) => None,
                                Err(e) => return Err(e),
                            }
                        }
                        _ => None,
                    };
                    nested.push(expanded.unwrap_or_else(|| PropstatResponse::not_found(href)));
                }
                property.value = Some(PropertyValue::Expanded(nested));
            }
            properties.push(property);
        }

        Ok(PropstatResponse::from_properties(path.href(), properties))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use kunai_core::config::Settings;
    use kunai_core::types::CollectionKind;
    use kunai_rfc::rfc::dav::core::{
        AddressbookFilter, CompFilter, FilterTest, Precondition, PropFilter, ResponseBody,
        SyncLevel, TextMatch, TimeRange, caldav_props,
    };
    use kunai_store::{DavStore, MemoryStore, NewCollection, Principal};

    use super::*;

    fn event(uid: &str, start: &str, end: &str) -> String {
        format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\nBEGIN:VEVENT\r\nUID:{uid}\r\nDTSTART:{start}\r\nDTEND:{end}\r\nSUMMARY:{uid}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n"
        )
    }

    fn card(uid: &str, name: &str) -> String {
        format!("BEGIN:VCARD\r\nVERSION:4.0\r\nUID:{uid}\r\nFN:{name}\r\nEND:VCARD\r\n")
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        ctx: DavContext,
        calendar: u64,
        book: u64,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let calendar = store
            .create_collection(NewCollection::new("alice", "work", CollectionKind::Calendar))
            .await
            .unwrap()
            .id;
        let book = store
            .create_collection(NewCollection::new(
                "alice",
                "friends",
                CollectionKind::Addressbook,
            ))
            .await
            .unwrap()
            .id;

        store
            .put_resource(calendar, "jan.ics", event("jan", "20240101T090000Z", "20240101T100000Z"))
            .await
            .unwrap();
        store
            .put_resource(calendar, "feb.ics", event("feb", "20240201T090000Z", "20240201T100000Z"))
            .await
            .unwrap();
        store
            .put_resource(book, "jane.vcf", card("jane", "Jane Doe"))
            .await
            .unwrap();
        store
            .put_resource(book, "bob.vcf", card("bob", "Bob Smith"))
            .await
            .unwrap();

        let ctx = DavContext::new(
            store.clone(),
            Arc::new(Settings::for_single_user("alice")),
            Principal {
                name: "alice".into(),
                display_name: "Alice".into(),
                email: Some("alice@example.com".into()),
            },
        );
        Fixture {
            store,
            ctx,
            calendar,
            book,
        }
    }

    fn path(p: &str) -> DavPath {
        DavPath::parse(p).unwrap()
    }

    async fn multistatus(ctx: &DavContext, target: &str, report_type: ReportType) -> Multistatus {
        let request = ReportRequest::new(report_type, Vec::new());
        match execute_report(ctx, &path(target), &request).await.unwrap() {
            ReportOutcome::Multistatus(ms) => ms,
            ReportOutcome::Calendar(_) => panic!("expected multistatus"),
        }
    }

    fn hrefs(ms: &Multistatus) -> Vec<&str> {
        ms.responses.iter().map(|r| r.href.as_str()).collect()
    }

    fn day(d: u32, m: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, m, d, 0, 0, 0).unwrap()
    }

    #[test_log::test(tokio::test)]
    async fn calendar_query_by_time_range() {
        let f = fixture().await;
        let filter = CompFilter::new("VCALENDAR").with_comp_filter(
            CompFilter::new("VEVENT").with_time_range(TimeRange::new(day(1, 1), day(2, 1))),
        );
        let ms = multistatus(
            &f.ctx,
            "/api/dav/cal/alice/work/",
            ReportType::CalendarQuery(CalendarQuery {
                filter,
                timezone: None,
                limit: None,
            }),
        )
        .await;
        assert_eq!(hrefs(&ms), vec!["/api/dav/cal/alice/work/jan.ics"]);
    }

    #[test_log::test(tokio::test)]
    async fn query_limit_adds_507() {
        let f = fixture().await;
        let mut query = CalendarQuery::all();
        query.limit = Some(1);
        let ms = multistatus(&f.ctx, "/api/dav/cal/alice/work/", ReportType::CalendarQuery(query)).await;
        assert_eq!(ms.responses.len(), 2);
        assert_eq!(
            ms.responses[1].resource_status(),
            Some(Status::InsufficientStorage)
        );
        assert_eq!(ms.responses[1].href.as_str(), "/api/dav/cal/alice/work/");
    }

    #[test_log::test(tokio::test)]
    async fn addressbook_query_matches_text() {
        let f = fixture().await;
        let filter = AddressbookFilter {
            test: FilterTest::AnyOf,
            prop_filters: vec![PropFilter::new("FN").with_text_match(TextMatch::contains("jane"))],
        };
        let ms = multistatus(
            &f.ctx,
            "/api/dav/card/alice/friends/",
            ReportType::AddressbookQuery(AddressbookQuery {
                filter,
                limit: None,
            }),
        )
        .await;
        assert_eq!(hrefs(&ms), vec!["/api/dav/card/alice/friends/jane.vcf"]);
    }

    #[test_log::test(tokio::test)]
    async fn multiget_reports_missing_hrefs() {
        let f = fixture().await;
        let request = ReportRequest::new(
            ReportType::CalendarMultiget(Multiget {
                hrefs: vec![
                    Href::new("/api/dav/cal/alice/work/jan.ics"),
                    Href::new("/api/dav/cal/alice/work/gone.ics"),
                    Href::new("/api/dav/cal/alice/other/jan.ics"),
                ],
            }),
            vec![PropertyName::CalendarData(Default::default())],
        );
        let ReportOutcome::Multistatus(ms) =
            execute_report(&f.ctx, &path("/api/dav/cal/alice/work/"), &request)
                .await
                .unwrap()
        else {
            panic!("expected multistatus");
        };

        assert_eq!(ms.responses.len(), 3);
        let ResponseBody::Propstats(found) = &ms.responses[0].body else {
            panic!("expected propstats");
        };
        assert_eq!(found[0].status, Status::Ok);
        assert_eq!(
            found[0].properties[0].name,
            QName::caldav(caldav_props::CALENDAR_DATA)
        );
        assert_eq!(ms.responses[1].resource_status(), Some(Status::NotFound));
        assert_eq!(ms.responses[2].resource_status(), Some(Status::NotFound));
    }

    #[test_log::test(tokio::test)]
    async fn sync_initial_then_incremental() {
        let f = fixture().await;
        f.store
            .put_resource(f.calendar, "old.ics", event("old", "20240301T090000Z", "20240301T100000Z"))
            .await
            .unwrap();
        f.store.delete_resource(f.calendar, "old.ics").await.unwrap();

        let sync = |token: &str| {
            ReportType::SyncCollection(SyncCollection {
                sync_token: token.to_string(),
                sync_level: SyncLevel::One,
                limit: None,
            })
        };

        let first = multistatus(&f.ctx, "/api/dav/cal/alice/work/", sync("")).await;
        assert_eq!(first.responses.len(), 2);
        assert!(first.responses.iter().all(|r| r.resource_status().is_none()));
        let token = first.sync_token.clone().unwrap();

        let second = multistatus(&f.ctx, "/api/dav/cal/alice/work/", sync(&token)).await;
        assert!(second.responses.is_empty());

        f.store.delete_resource(f.calendar, "jan.ics").await.unwrap();
        let third = multistatus(&f.ctx, "/api/dav/cal/alice/work/", sync(&token)).await;
        assert_eq!(hrefs(&third), vec!["/api/dav/cal/alice/work/jan.ics"]);
        assert_eq!(third.responses[0].resource_status(), Some(Status::NotFound));
        assert_ne!(third.sync_token, Some(token));
    }

    #[test_log::test(tokio::test)]
    async fn sync_token_from_another_collection_is_rejected() {
        let f = fixture().await;
        let book = multistatus(
            &f.ctx,
            "/api/dav/card/alice/friends/",
            ReportType::SyncCollection(SyncCollection {
                sync_token: String::new(),
                sync_level: SyncLevel::One,
                limit: None,
            }),
        )
        .await;

        let request = ReportRequest::new(
            ReportType::SyncCollection(SyncCollection {
                sync_token: book.sync_token.unwrap(),
                sync_level: SyncLevel::One,
                limit: None,
            }),
            Vec::new(),
        );
        let err = execute_report(&f.ctx, &path("/api/dav/cal/alice/work/"), &request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.precondition(), Some(Precondition::ValidSyncToken));
    }

    #[test_log::test(tokio::test)]
    async fn report_on_resource_is_forbidden() {
        let f = fixture().await;
        for report_type in [
            ReportType::CalendarQuery(CalendarQuery::all()),
            ReportType::SyncCollection(SyncCollection {
                sync_token: String::new(),
                sync_level: SyncLevel::One,
                limit: None,
            }),
            ReportType::ExpandProperty(ExpandProperty {
                properties: Vec::new(),
            }),
        ] {
            let request = ReportRequest::new(report_type, Vec::new());
            let err = execute_report(&f.ctx, &path("/api/dav/cal/alice/work/jan.ics"), &request)
                .await
                .unwrap_err();
            assert_eq!(err.status_code(), 403);
        }
    }

    #[test_log::test(tokio::test)]
    async fn cross_kind_reports_are_forbidden() {
        let f = fixture().await;
        let request = ReportRequest::new(ReportType::CalendarQuery(CalendarQuery::all()), Vec::new());
        let err = execute_report(&f.ctx, &path("/api/dav/card/alice/friends/"), &request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.precondition(), Some(Precondition::SupportedReport));

        let request = ReportRequest::new(
            ReportType::AddressbookMultiget(Multiget { hrefs: Vec::new() }),
            Vec::new(),
        );
        let err = execute_report(&f.ctx, &path("/api/dav/cal/alice/work/"), &request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test_log::test(tokio::test)]
    async fn free_busy_returns_calendar_body() {
        let f = fixture().await;
        let request = ReportRequest::new(
            ReportType::FreeBusyQuery(FreeBusyQuery {
                time_range: Some(TimeRange::new(day(1, 1), day(2, 1))),
            }),
            Vec::new(),
        );
        let ReportOutcome::Calendar(body) =
            execute_report(&f.ctx, &path("/api/dav/cal/alice/work/"), &request)
                .await
                .unwrap()
        else {
            panic!("expected calendar body");
        };
        assert!(body.contains("BEGIN:VFREEBUSY"));
        assert!(body.contains("FREEBUSY:20240101T090000Z/20240101T100000Z"));
        assert!(!body.contains("20240201"));
    }

    #[test_log::test(tokio::test)]
    async fn expand_property_follows_home_sets() {
        let f = fixture().await;
        let request = ReportRequest::new(
            ReportType::ExpandProperty(ExpandProperty {
                properties: vec![ExpandPropertyItem {
                    name: QName::caldav(caldav_props::CALENDAR_HOME_SET),
                    properties: vec![ExpandPropertyItem {
                        name: QName::dav(dav_props::OWNER),
                        properties: Vec::new(),
                    }],
                }],
            }),
            Vec::new(),
        );
        let ReportOutcome::Multistatus(ms) =
            execute_report(&f.ctx, &path("/api/dav/principal/alice/"), &request)
                .await
                .unwrap()
        else {
            panic!("expected multistatus");
        };

        let ResponseBody::Propstats(propstats) = &ms.responses[0].body else {
            panic!("expected propstats");
        };
        let Some(PropertyValue::Expanded(nested)) = &propstats[0].properties[0].value else {
            panic!("expected expanded value");
        };
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].href.as_str(), "/api/dav/cal/alice/");
    }

    #[test_log::test(tokio::test)]
    async fn birthday_calendar_answers_queries() {
        let f = fixture().await;
        f.store
            .put_resource(
                f.book,
                "ann.vcf",
                "BEGIN:VCARD\r\nVERSION:4.0\r\nUID:ann\r\nFN:Ann\r\nBDAY:19850704\r\nEND:VCARD\r\n".into(),
            )
            .await
            .unwrap();

        let filter = CompFilter::new("VCALENDAR").with_comp_filter(
            CompFilter::new("VEVENT").with_time_range(TimeRange::new(day(1, 7), day(10, 7))),
        );
        let ms = multistatus(
            &f.ctx,
            "/api/dav/cal/alice/birthdays/",
            ReportType::CalendarQuery(CalendarQuery {
                filter,
                timezone: None,
                limit: None,
            }),
        )
        .await;
        assert_eq!(hrefs(&ms), vec!["/api/dav/cal/alice/birthdays/friends-ann.ics"]);
    }

    #[test_log::test(tokio::test)]
    async fn other_users_collections_are_forbidden() {
        let f = fixture().await;
        let request = ReportRequest::new(ReportType::CalendarQuery(CalendarQuery::all()), Vec::new());
        let err = execute_report(&f.ctx, &path("/api/dav/cal/bob/work/"), &request)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
