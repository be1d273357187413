//! DAV property types.

use super::multistatus::PropstatResponse;
use super::namespace::QName;
use super::partial_retrieval::{AddressDataRequest, CalendarDataRequest};

/// A property name (without value), with optional partial retrieval specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyName {
    /// Simple property name.
    Simple(QName),
    /// Calendar-data with optional partial retrieval.
    CalendarData(CalendarDataRequest),
    /// Address-data with optional partial retrieval.
    AddressData(AddressDataRequest),
}

impl PropertyName {
    /// Creates a new simple property name.
    #[must_use]
    pub fn new(qname: QName) -> Self {
        Self::Simple(qname)
    }

    /// Returns the qualified name.
    #[must_use]
    pub fn qname(&self) -> QName {
        match self {
            Self::Simple(qname) => qname.clone(),
            Self::CalendarData(_) => QName::caldav("calendar-data"),
            Self::AddressData(_) => QName::carddav("address-data"),
        }
    }
}

impl From<QName> for PropertyName {
    fn from(qname: QName) -> Self {
        Self::Simple(qname)
    }
}

/// A DAV property with name and optional value.
///
/// `value: None` means the property is unknown or unset on the resource and
/// belongs in a 404 propstat.
#[derive(Debug, Clone)]
pub struct DavProperty {
    /// The property name.
    pub name: QName,
    /// The property value (if known).
    pub value: Option<PropertyValue>,
}

impl DavProperty {
    /// Creates a property with no value (for 404 responses).
    #[must_use]
    pub fn not_found(name: QName) -> Self {
        Self { name, value: None }
    }

    #[must_use]
    pub fn new(name: QName, value: PropertyValue) -> Self {
        Self {
            name,
            value: Some(value),
        }
    }

    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: QName, value: impl Into<String>) -> Self {
        Self::new(name, PropertyValue::Text(value.into()))
    }

    /// Creates a property with an href value.
    #[must_use]
    pub fn href(name: QName, href: impl Into<String>) -> Self {
        Self::new(name, PropertyValue::Href(href.into()))
    }

    /// Creates a property with an integer value.
    #[must_use]
    pub fn integer(name: QName, value: i64) -> Self {
        Self::new(name, PropertyValue::Integer(value))
    }

    /// Creates a property whose presence alone carries meaning.
    #[must_use]
    pub fn marker(name: QName) -> Self {
        Self::new(name, PropertyValue::Marker)
    }
}

/// A property value.
///
/// `Marker` is distinct from `Text(String::new())`: a marker is an empty
/// element whose presence is the signal, text is data that happens to be short.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// Empty element.
    Marker,
    /// Text content.
    Text(String),
    /// Single href.
    Href(String),
    /// Multiple hrefs.
    HrefSet(Vec<String>),
    /// Integer value.
    Integer(i64),
    /// Date-time value, serialized as an HTTP date.
    DateTime(chrono::DateTime<chrono::Utc>),
    /// Resource types (collection, calendar, addressbook, etc.).
    ResourceType(Vec<QName>),
    /// Calendar/address data (large text).
    ContentData(String),
    /// Supported component set (VEVENT, VTODO, etc.).
    SupportedComponents(Vec<String>),
    /// Supported report set.
    SupportedReports(Vec<QName>),
    /// Supported media types as `(content-type, version)` pairs.
    SupportedData(Vec<(String, String)>),
    /// Privileges granted to the current user.
    Privileges(Vec<QName>),
    /// Nested responses produced by `expand-property`.
    Expanded(Vec<PropstatResponse>),
}

impl PropertyValue {
    /// Returns the value as text if applicable.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::ContentData(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the hrefs carried by this value, if any.
    #[must_use]
    pub fn hrefs(&self) -> Vec<&str> {
        match self {
            Self::Href(s) => vec![s.as_str()],
            Self::HrefSet(set) => set.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_text() {
        let prop = DavProperty::text(QName::dav("displayname"), "My Calendar");
        assert_eq!(prop.name.local_name(), "displayname");
        assert_eq!(prop.value.as_ref().and_then(PropertyValue::as_text), Some("My Calendar"));
    }

    #[test]
    fn marker_is_not_text() {
        let prop = DavProperty::marker(QName::dav("getetag"));
        assert!(matches!(prop.value, Some(PropertyValue::Marker)));
        assert!(prop.value.as_ref().and_then(PropertyValue::as_text).is_none());
    }

    #[test]
    fn hrefs_of_set() {
        let value = PropertyValue::HrefSet(vec!["/a/".into(), "/b/".into()]);
        assert_eq!(value.hrefs(), vec!["/a/", "/b/"]);
        assert!(PropertyValue::Integer(1).hrefs().is_empty());
    }

    #[test]
    fn calendar_data_qname() {
        let name = PropertyName::CalendarData(CalendarDataRequest::full());
        assert_eq!(name.qname(), QName::caldav("calendar-data"));
    }
}
