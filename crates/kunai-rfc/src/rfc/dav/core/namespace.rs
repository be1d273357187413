//! XML namespace and qualified name types.

use std::borrow::Cow;

/// `DAV:` namespace URI.
pub const DAV_NS: &str = "DAV:";

/// `CalDAV` namespace URI.
pub const CALDAV_NS: &str = "urn:ietf:params:xml:ns:caldav";

/// `CardDAV` namespace URI.
pub const CARDDAV_NS: &str = "urn:ietf:params:xml:ns:carddav";

/// `CalendarServer` (Apple) namespace URI.
pub const CS_NS: &str = "http://calendarserver.org/ns/";

/// An XML namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(pub Cow<'static, str>);

impl Namespace {
    /// `DAV:` namespace.
    pub const DAV: Self = Self(Cow::Borrowed(DAV_NS));

    /// `CalDAV` namespace.
    pub const CALDAV: Self = Self(Cow::Borrowed(CALDAV_NS));

    /// `CardDAV` namespace.
    pub const CARDDAV: Self = Self(Cow::Borrowed(CARDDAV_NS));

    /// `CalendarServer` namespace.
    pub const CS: Self = Self(Cow::Borrowed(CS_NS));

    /// Returns the namespace URI.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the fixed prefix used when serializing this namespace.
    #[must_use]
    pub fn default_prefix(&self) -> Option<&'static str> {
        match self.as_str() {
            DAV_NS => Some("D"),
            CALDAV_NS => Some("C"),
            CARDDAV_NS => Some("CR"),
            CS_NS => Some("CS"),
            _ => None,
        }
    }
}

impl From<&'static str> for Namespace {
    fn from(s: &'static str) -> Self {
        Self(Cow::Borrowed(s))
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        match s.as_str() {
            DAV_NS => Self::DAV,
            CALDAV_NS => Self::CALDAV,
            CARDDAV_NS => Self::CARDDAV,
            CS_NS => Self::CS,
            _ => Self(Cow::Owned(s)),
        }
    }
}

/// A qualified XML name (namespace + local name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// The namespace URI.
    pub namespace: Namespace,
    /// The local name.
    pub local_name: Cow<'static, str>,
}

impl QName {
    /// Creates a new qualified name.
    #[must_use]
    pub fn new(namespace: impl Into<Namespace>, local_name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
        }
    }

    /// Creates a `DAV:` qualified name.
    #[must_use]
    pub fn dav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::DAV, local_name)
    }

    /// Creates a `CalDAV` qualified name.
    #[must_use]
    pub fn caldav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::CALDAV, local_name)
    }

    /// Creates a `CardDAV` qualified name.
    #[must_use]
    pub fn carddav(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::CARDDAV, local_name)
    }

    /// Creates a `CalendarServer` qualified name.
    #[must_use]
    pub fn cs(local_name: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Namespace::CS, local_name)
    }

    /// Returns the local name.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Returns the namespace URI.
    #[must_use]
    pub fn namespace_uri(&self) -> &str {
        self.namespace.as_str()
    }

    /// Returns whether this name is `{ns}local`.
    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.namespace.as_str() == namespace && self.local_name == local_name
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{{}}}{}", self.namespace.as_str(), self.local_name)
    }
}

/// Common DAV property names.
pub mod dav_props {
    use super::QName;

    pub const RESOURCETYPE: &str = "resourcetype";
    pub const DISPLAYNAME: &str = "displayname";
    pub const GETCONTENTTYPE: &str = "getcontenttype";
    pub const GETCONTENTLENGTH: &str = "getcontentlength";
    pub const GETLASTMODIFIED: &str = "getlastmodified";
    pub const GETETAG: &str = "getetag";
    pub const CURRENT_USER_PRINCIPAL: &str = "current-user-principal";
    pub const CURRENT_USER_PRIVILEGE_SET: &str = "current-user-privilege-set";
    pub const PRINCIPAL_URL: &str = "principal-URL";
    pub const SUPPORTED_REPORT_SET: &str = "supported-report-set";
    pub const SYNC_TOKEN: &str = "sync-token";
    pub const OWNER: &str = "owner";

    #[must_use]
    pub fn getetag() -> QName {
        QName::dav(GETETAG)
    }
}

/// Common `CalDAV` property names.
pub mod caldav_props {
    pub const CALENDAR_HOME_SET: &str = "calendar-home-set";
    pub const CALENDAR_DESCRIPTION: &str = "calendar-description";
    pub const CALENDAR_TIMEZONE: &str = "calendar-timezone";
    pub const CALENDAR_USER_ADDRESS_SET: &str = "calendar-user-address-set";
    pub const SUPPORTED_CALENDAR_COMPONENT_SET: &str = "supported-calendar-component-set";
    pub const SUPPORTED_CALENDAR_DATA: &str = "supported-calendar-data";
    pub const MAX_RESOURCE_SIZE: &str = "max-resource-size";
    pub const MIN_DATE_TIME: &str = "min-date-time";
    pub const MAX_DATE_TIME: &str = "max-date-time";
    pub const MAX_INSTANCES: &str = "max-instances";
    pub const MAX_ATTENDEES_PER_INSTANCE: &str = "max-attendees-per-instance";
    pub const CALENDAR_DATA: &str = "calendar-data";
}

/// Common `CardDAV` property names.
pub mod carddav_props {
    pub const ADDRESSBOOK_HOME_SET: &str = "addressbook-home-set";
    pub const ADDRESSBOOK_DESCRIPTION: &str = "addressbook-description";
    pub const SUPPORTED_ADDRESS_DATA: &str = "supported-address-data";
    pub const MAX_RESOURCE_SIZE: &str = "max-resource-size";
    pub const ADDRESS_DATA: &str = "address-data";
}

/// `CalendarServer` property names.
pub mod cs_props {
    pub const GETCTAG: &str = "getctag";
}
