//! Response assembly: property values for principals, homes, collections and
//! resources, and the propstat blocks built from them.

use kunai_core::constants::{
    ADDRESSBOOK_REPORTS, CALENDAR_CONTENT_TYPE, CALENDAR_REPORTS, MAX_ATTENDEES_PER_INSTANCE,
    MAX_DATE_TIME, MAX_INSTANCES, MAX_RESOURCE_SIZE, MIN_DATE_TIME, SUPPORTED_CALENDAR_COMPONENTS,
    VCARD_CONTENT_TYPE,
};
use kunai_core::types::{AccessMode, CollectionKind};
use kunai_rfc::rfc::dav::core::{
    AddressDataRequest, CALDAV_NS, CARDDAV_NS, CS_NS, CalendarDataRequest, DAV_NS, DavProperty,
    Href, PropertyName, PropertyValue, PropfindType, PropstatResponse, QName, caldav_props,
    carddav_props, cs_props, dav_props,
};
use kunai_rfc::rfc::ical::project_calendar_data;
use kunai_rfc::rfc::vcard::project_address_data;
use kunai_store::{Principal, Resource};

use crate::collection::Collection;
use crate::path::{DavPath, HomeKind};

/// Something a multistatus response can describe.
pub enum Target<'a> {
    Principal(&'a Principal),
    Home {
        owner: &'a str,
    },
    Collection {
        collection: &'a dyn Collection,
        /// Token for the collection's current state.
        sync_token: &'a str,
    },
    Resource {
        kind: CollectionKind,
        access: AccessMode,
        resource: &'a Resource,
    },
}

impl Target<'_> {
    /// ## Summary
    /// Builds the response for `href` under a PROPFIND request mode.
    ///
    /// `allprop` lists every defined property that has a value; properties
    /// named in `include`, and every property of a `prop` request, that
    /// have no value go into a 404 propstat.
    #[must_use]
    pub fn respond(
        &self,
        href: impl Into<Href>,
        current_user: &str,
        request: &PropfindType,
    ) -> PropstatResponse {
        match request {
            PropfindType::PropName => {
                let mut names = self.defined_names();
                if let Self::Resource { kind, .. } = self {
                    names.push(data_name(*kind));
                }
                PropstatResponse::ok(href, names.into_iter().map(DavProperty::marker).collect())
            }
            PropfindType::AllProp { include } => {
                let defined = self.defined_names();
                let mut properties: Vec<DavProperty> = defined
                    .iter()
                    .filter_map(|name| {
                        self.simple_value(name, current_user)
                            .map(|value| DavProperty::new(name.clone(), value))
                    })
                    .collect();
                properties.extend(
                    include
                        .iter()
                        .filter(|name| !defined.contains(&name.qname()))
                        .map(|name| self.property(name, current_user)),
                );
                PropstatResponse::from_properties(href, properties)
            }
            PropfindType::Prop(names) => self.respond_with(href, current_user, names),
        }
    }

    /// Builds the response for an explicit property list, as REPORTs do.
    #[must_use]
    pub fn respond_with(
        &self,
        href: impl Into<Href>,
        current_user: &str,
        names: &[PropertyName],
    ) -> PropstatResponse {
        PropstatResponse::from_properties(
            href,
            names
                .iter()
                .map(|name| self.property(name, current_user))
                .collect(),
        )
    }

    /// One property, without a value when it is unknown or unset here.
    #[must_use]
    pub fn property(&self, name: &PropertyName, current_user: &str) -> DavProperty {
        DavProperty {
            name: name.qname(),
            value: self.value(name, current_user),
        }
    }

    fn value(&self, name: &PropertyName, current_user: &str) -> Option<PropertyValue> {
        match name {
            PropertyName::CalendarData(request) => self.calendar_data(request),
            PropertyName::AddressData(request) => self.address_data(request),
            PropertyName::Simple(qname) => self.simple_value(qname, current_user),
        }
    }

    fn simple_value(&self, name: &QName, current_user: &str) -> Option<PropertyValue> {
        if name.is(DAV_NS, dav_props::CURRENT_USER_PRINCIPAL) {
            return Some(PropertyValue::Href(DavPath::principal_href(current_user)));
        }
        match self {
            Self::Principal(principal) => principal_value(principal, name),
            Self::Home { owner } => home_value(owner, name),
            Self::Collection {
                collection,
                sync_token,
            } => collection_value(*collection, sync_token, name),
            Self::Resource {
                kind,
                access,
                resource,
            } => {
                if name.is(CALDAV_NS, caldav_props::CALENDAR_DATA) {
                    self.calendar_data(&CalendarDataRequest::full())
                } else if name.is(CARDDAV_NS, carddav_props::ADDRESS_DATA) {
                    self.address_data(&AddressDataRequest::full())
                } else {
                    resource_value(*kind, *access, resource, name)
                }
            }
        }
    }

    /// Properties `allprop` and `propname` report.
    fn defined_names(&self) -> Vec<QName> {
        let common = [
            QName::dav(dav_props::RESOURCETYPE),
            QName::dav(dav_props::CURRENT_USER_PRINCIPAL),
        ];
        let specific: Vec<QName> = match self {
            Self::Principal(_) => vec![
                QName::dav(dav_props::DISPLAYNAME),
                QName::dav(dav_props::PRINCIPAL_URL),
                QName::caldav(caldav_props::CALENDAR_HOME_SET),
                QName::carddav(carddav_props::ADDRESSBOOK_HOME_SET),
                QName::caldav(caldav_props::CALENDAR_USER_ADDRESS_SET),
                QName::dav(dav_props::SUPPORTED_REPORT_SET),
            ],
            Self::Home { .. } => vec![
                QName::dav(dav_props::OWNER),
                QName::dav(dav_props::CURRENT_USER_PRIVILEGE_SET),
                QName::dav(dav_props::SUPPORTED_REPORT_SET),
            ],
            Self::Collection { collection, .. } => {
                let mut names = vec![
                    QName::dav(dav_props::DISPLAYNAME),
                    QName::dav(dav_props::OWNER),
                    QName::dav(dav_props::SYNC_TOKEN),
                    QName::cs(cs_props::GETCTAG),
                    QName::dav(dav_props::GETLASTMODIFIED),
                    QName::dav(dav_props::SUPPORTED_REPORT_SET),
                    QName::dav(dav_props::CURRENT_USER_PRIVILEGE_SET),
                ];
                if collection.record().kind.is_calendar() {
                    names.extend([
                        QName::caldav(caldav_props::CALENDAR_DESCRIPTION),
                        QName::caldav(caldav_props::CALENDAR_TIMEZONE),
                        QName::caldav(caldav_props::SUPPORTED_CALENDAR_COMPONENT_SET),
                        QName::caldav(caldav_props::SUPPORTED_CALENDAR_DATA),
                        QName::caldav(caldav_props::MAX_RESOURCE_SIZE),
                        QName::caldav(caldav_props::MIN_DATE_TIME),
                        QName::caldav(caldav_props::MAX_DATE_TIME),
                        QName::caldav(caldav_props::MAX_INSTANCES),
                        QName::caldav(caldav_props::MAX_ATTENDEES_PER_INSTANCE),
                    ]);
                } else {
                    names.extend([
                        QName::carddav(carddav_props::ADDRESSBOOK_DESCRIPTION),
                        QName::carddav(carddav_props::SUPPORTED_ADDRESS_DATA),
                        QName::carddav(carddav_props::MAX_RESOURCE_SIZE),
                    ]);
                }
                names
            }
            Self::Resource { .. } => vec![
                QName::dav(dav_props::GETETAG),
                QName::dav(dav_props::GETCONTENTTYPE),
                QName::dav(dav_props::GETCONTENTLENGTH),
                QName::dav(dav_props::GETLASTMODIFIED),
                QName::dav(dav_props::CURRENT_USER_PRIVILEGE_SET),
            ],
        };
        common.into_iter().chain(specific).collect()
    }

    fn calendar_data(&self, request: &CalendarDataRequest) -> Option<PropertyValue> {
        let Self::Resource { kind, resource, .. } = self else {
            return None;
        };
        if !kind.is_calendar() || !accepts(request.content_type.as_deref(), "text/calendar") {
            return None;
        }
        match project_calendar_data(&resource.body, request) {
            Ok(text) => Some(PropertyValue::ContentData(text)),
            Err(e) => {
                tracing::warn!(resource = %resource.name, error = %e, "Calendar data projection failed");
                None
            }
        }
    }

    fn address_data(&self, request: &AddressDataRequest) -> Option<PropertyValue> {
        let Self::Resource { kind, resource, .. } = self else {
            return None;
        };
        if *kind != CollectionKind::Addressbook
            || !accepts(request.content_type.as_deref(), "text/vcard")
        {
            return None;
        }
        match project_address_data(&resource.body, request) {
            Ok(text) => Some(PropertyValue::ContentData(text)),
            Err(e) => {
                tracing::warn!(resource = %resource.name, error = %e, "Address data projection failed");
                None
            }
        }
    }
}

fn accepts(requested: Option<&str>, supported: &str) -> bool {
    requested.is_none_or(|ct| ct.eq_ignore_ascii_case(supported))
}

fn data_name(kind: CollectionKind) -> QName {
    if kind.is_calendar() {
        QName::caldav(caldav_props::CALENDAR_DATA)
    } else {
        QName::carddav(carddav_props::ADDRESS_DATA)
    }
}

fn principal_value(principal: &Principal, name: &QName) -> Option<PropertyValue> {
    let own_href = DavPath::principal_href(&principal.name);
    match (name.namespace_uri(), name.local_name()) {
        (DAV_NS, dav_props::RESOURCETYPE) => Some(PropertyValue::ResourceType(vec![
            QName::dav("collection"),
            QName::dav("principal"),
        ])),
        (DAV_NS, dav_props::DISPLAYNAME) => Some(PropertyValue::Text(principal.display_name.clone())),
        (DAV_NS, dav_props::PRINCIPAL_URL) => Some(PropertyValue::Href(own_href)),
        (CALDAV_NS, caldav_props::CALENDAR_HOME_SET) => Some(PropertyValue::Href(
            DavPath::home_href(HomeKind::Calendar, &principal.name),
        )),
        (CARDDAV_NS, carddav_props::ADDRESSBOOK_HOME_SET) => Some(PropertyValue::Href(
            DavPath::home_href(HomeKind::Addressbook, &principal.name),
        )),
        (CALDAV_NS, caldav_props::CALENDAR_USER_ADDRESS_SET) => principal
            .email
            .as_ref()
            .map(|email| PropertyValue::HrefSet(vec![format!("mailto:{email}"), own_href])),
        (DAV_NS, dav_props::SUPPORTED_REPORT_SET) => Some(PropertyValue::SupportedReports(vec![
            QName::dav("expand-property"),
        ])),
        _ => None,
    }
}

fn home_value(owner: &str, name: &QName) -> Option<PropertyValue> {
    match (name.namespace_uri(), name.local_name()) {
        (DAV_NS, dav_props::RESOURCETYPE) => {
            Some(PropertyValue::ResourceType(vec![QName::dav("collection")]))
        }
        (DAV_NS, dav_props::OWNER) => Some(PropertyValue::Href(DavPath::principal_href(owner))),
        (DAV_NS, dav_props::CURRENT_USER_PRIVILEGE_SET) => {
            Some(PropertyValue::Privileges(privileges(AccessMode::ReadOnly)))
        }
        (DAV_NS, dav_props::SUPPORTED_REPORT_SET) => Some(PropertyValue::SupportedReports(vec![
            QName::dav("expand-property"),
        ])),
        _ => None,
    }
}

fn collection_value(
    collection: &dyn Collection,
    sync_token: &str,
    name: &QName,
) -> Option<PropertyValue> {
    let record = collection.record();
    let calendar = record.kind.is_calendar();
    match (name.namespace_uri(), name.local_name()) {
        (DAV_NS, dav_props::RESOURCETYPE) => Some(PropertyValue::ResourceType(vec![
            QName::dav("collection"),
            if calendar {
                QName::caldav("calendar")
            } else {
                QName::carddav("addressbook")
            },
        ])),
        (DAV_NS, dav_props::DISPLAYNAME) => record.display_name.clone().map(PropertyValue::Text),
        (DAV_NS, dav_props::OWNER) => {
            Some(PropertyValue::Href(DavPath::principal_href(&record.owner)))
        }
        (DAV_NS, dav_props::SYNC_TOKEN) => Some(PropertyValue::Text(sync_token.to_string())),
        (CS_NS, cs_props::GETCTAG) => Some(PropertyValue::Text(record.ctag.clone())),
        (DAV_NS, dav_props::GETLASTMODIFIED) => Some(PropertyValue::DateTime(record.updated_at)),
        (DAV_NS, dav_props::SUPPORTED_REPORT_SET) => {
            let reports: &[&'static str] = if calendar {
                &CALENDAR_REPORTS
            } else {
                &ADDRESSBOOK_REPORTS
            };
            Some(PropertyValue::SupportedReports(
                reports.iter().copied().map(report_name).collect(),
            ))
        }
        (DAV_NS, dav_props::CURRENT_USER_PRIVILEGE_SET) => {
            Some(PropertyValue::Privileges(privileges(record.access)))
        }
        (CALDAV_NS, caldav_props::CALENDAR_DESCRIPTION) if calendar => {
            record.description.clone().map(PropertyValue::Text)
        }
        (CARDDAV_NS, carddav_props::ADDRESSBOOK_DESCRIPTION) if !calendar => {
            record.description.clone().map(PropertyValue::Text)
        }
        _ if calendar => calendar_limit(record.timezone.as_deref(), name),
        (CARDDAV_NS, carddav_props::SUPPORTED_ADDRESS_DATA) => {
            Some(PropertyValue::SupportedData(vec![
                ("text/vcard".to_string(), "3.0".to_string()),
                ("text/vcard".to_string(), "4.0".to_string()),
            ]))
        }
        (CARDDAV_NS, carddav_props::MAX_RESOURCE_SIZE) => {
            i64::try_from(MAX_RESOURCE_SIZE).ok().map(PropertyValue::Integer)
        }
        _ => None,
    }
}

/// Calendar-only collection properties, including the fixed protocol limits.
fn calendar_limit(timezone: Option<&str>, name: &QName) -> Option<PropertyValue> {
    if name.namespace_uri() != CALDAV_NS {
        return None;
    }
    match name.local_name() {
        caldav_props::CALENDAR_TIMEZONE => timezone.map(|tz| PropertyValue::Text(tz.to_string())),
        caldav_props::SUPPORTED_CALENDAR_COMPONENT_SET => Some(PropertyValue::SupportedComponents(
            SUPPORTED_CALENDAR_COMPONENTS
                .iter()
                .map(ToString::to_string)
                .collect(),
        )),
        caldav_props::SUPPORTED_CALENDAR_DATA => Some(PropertyValue::SupportedData(vec![(
            "text/calendar".to_string(),
            "2.0".to_string(),
        )])),
        caldav_props::MAX_RESOURCE_SIZE => {
            i64::try_from(MAX_RESOURCE_SIZE).ok().map(PropertyValue::Integer)
        }
        caldav_props::MIN_DATE_TIME => Some(PropertyValue::Text(MIN_DATE_TIME.to_string())),
        caldav_props::MAX_DATE_TIME => Some(PropertyValue::Text(MAX_DATE_TIME.to_string())),
        caldav_props::MAX_INSTANCES => Some(PropertyValue::Integer(i64::from(MAX_INSTANCES))),
        caldav_props::MAX_ATTENDEES_PER_INSTANCE => Some(PropertyValue::Integer(i64::from(
            MAX_ATTENDEES_PER_INSTANCE,
        ))),
        _ => None,
    }
}

fn resource_value(
    kind: CollectionKind,
    access: AccessMode,
    resource: &Resource,
    name: &QName,
) -> Option<PropertyValue> {
    match (name.namespace_uri(), name.local_name()) {
        (DAV_NS, dav_props::RESOURCETYPE) => Some(PropertyValue::ResourceType(Vec::new())),
        (DAV_NS, dav_props::GETETAG) => Some(PropertyValue::Text(resource.etag.clone())),
        (DAV_NS, dav_props::GETCONTENTTYPE) => Some(PropertyValue::Text(
            if kind.is_calendar() {
                CALENDAR_CONTENT_TYPE
            } else {
                VCARD_CONTENT_TYPE
            }
            .to_string(),
        )),
        (DAV_NS, dav_props::GETCONTENTLENGTH) => i64::try_from(resource.body.len())
            .ok()
            .map(PropertyValue::Integer),
        (DAV_NS, dav_props::GETLASTMODIFIED) => Some(PropertyValue::DateTime(resource.last_modified)),
        (DAV_NS, dav_props::CURRENT_USER_PRIVILEGE_SET) => {
            Some(PropertyValue::Privileges(privileges(access)))
        }
        _ => None,
    }
}

/// `DAV:current-user-privilege-set` for an access mode.
#[must_use]
pub fn privileges(access: AccessMode) -> Vec<QName> {
    let mut granted = vec![QName::dav("read")];
    if access.can_write() {
        granted.extend([
            QName::dav("write"),
            QName::dav("write-content"),
            QName::dav("write-properties"),
            QName::dav("bind"),
            QName::dav("unbind"),
        ]);
    }
    granted.push(QName::dav("read-current-user-privilege-set"));
    granted
}

/// Qualified element name of a REPORT advertised in `supported-report-set`.
fn report_name(report: &'static str) -> QName {
    if report.starts_with("calendar-") || report == "free-busy-query" {
        QName::caldav(report)
    } else if report.starts_with("addressbook-") {
        QName::carddav(report)
    } else {
        QName::dav(report)
    }
}
