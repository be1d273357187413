/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const DAV_ROUTE_COMPONENT: &str = "dav";
pub const DAV_ROUTE_PREFIX: &str = const_str::concat!(API_ROUTE_PREFIX, "/", DAV_ROUTE_COMPONENT);

pub const CALDAV_ROUTE_COMPONENT: &str = "cal";
pub const CALDAV_ROUTE_PREFIX: &str =
    const_str::concat!(DAV_ROUTE_PREFIX, "/", CALDAV_ROUTE_COMPONENT);

pub const CARDDAV_ROUTE_COMPONENT: &str = "card";
pub const CARDDAV_ROUTE_PREFIX: &str =
    const_str::concat!(DAV_ROUTE_PREFIX, "/", CARDDAV_ROUTE_COMPONENT);

pub const PRINCIPAL_ROUTE_COMPONENT: &str = "principal";
pub const PRINCIPAL_ROUTE_PREFIX: &str =
    const_str::concat!(DAV_ROUTE_PREFIX, "/", PRINCIPAL_ROUTE_COMPONENT);

/// Slug of the generated birthday calendar inside every calendar home.
pub const BIRTHDAY_CALENDAR_SLUG: &str = "birthdays";

pub const ICS_EXTENSION: &str = ".ics";
pub const VCF_EXTENSION: &str = ".vcf";

/// `PRODID` emitted on calendar objects this server generates.
pub const PRODUCT_ID: &str = "-//Kunai//Kunai CalDAV Server//EN";

// CalDAV protocol limits advertised on every calendar collection (RFC 4791 §5.2).

/// `CALDAV:max-resource-size`, in octets.
pub const MAX_RESOURCE_SIZE: u64 = 10_485_760;
/// `CALDAV:min-date-time`
pub const MIN_DATE_TIME: &str = "19000101T000000Z";
/// `CALDAV:max-date-time`
pub const MAX_DATE_TIME: &str = "20991231T235959Z";
/// `CALDAV:max-instances`
pub const MAX_INSTANCES: u32 = 1000;
/// `CALDAV:max-attendees-per-instance`
pub const MAX_ATTENDEES_PER_INSTANCE: u32 = 100;

/// Components accepted in calendar collections.
pub const SUPPORTED_CALENDAR_COMPONENTS: [&str; 4] = ["VEVENT", "VTODO", "VJOURNAL", "VFREEBUSY"];

/// Reports available on calendar collections.
pub const CALENDAR_REPORTS: [&str; 5] = [
    "calendar-query",
    "calendar-multiget",
    "free-busy-query",
    "sync-collection",
    "expand-property",
];

/// Reports available on address book collections.
pub const ADDRESSBOOK_REPORTS: [&str; 4] = [
    "addressbook-query",
    "addressbook-multiget",
    "sync-collection",
    "expand-property",
];

/// Value of the `DAV` header on every response.
pub const DAV_COMPLIANCE_CLASSES: &str = "1, 3, calendar-access, addressbook";

/// Value of the `Allow` header on every response.
pub const ALLOWED_METHODS: &str = "OPTIONS, GET, HEAD, PUT, DELETE, PROPFIND, REPORT";

pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";
pub const VCARD_CONTENT_TYPE: &str = "text/vcard; charset=utf-8";
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_prefixes_compose() {
        assert_eq!(CALDAV_ROUTE_PREFIX, "/api/dav/cal");
        assert_eq!(CARDDAV_ROUTE_PREFIX, "/api/dav/card");
        assert_eq!(PRINCIPAL_ROUTE_PREFIX, "/api/dav/principal");
    }
}
