//! Precondition elements carried in `DAV:error` bodies.

use super::namespace::{CALDAV_NS, CARDDAV_NS, DAV_NS};

/// Preconditions this server reports (RFC 4918 §16, RFC 6578 §3.2, RFC 3253 §3.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// The sync token is malformed, for another collection, or expired.
    ValidSyncToken,
    /// The REPORT is not supported on the target.
    SupportedReport,
    /// Writes are not permitted on the collection.
    NeedPrivileges,
    /// `CALDAV:valid-filter`
    CalendarValidFilter,
    /// `CARDDAV:valid-filter`
    CardValidFilter,
}

impl Precondition {
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::ValidSyncToken | Self::SupportedReport | Self::NeedPrivileges => DAV_NS,
            Self::CalendarValidFilter => CALDAV_NS,
            Self::CardValidFilter => CARDDAV_NS,
        }
    }

    #[must_use]
    pub const fn element_name(self) -> &'static str {
        match self {
            Self::ValidSyncToken => "valid-sync-token",
            Self::SupportedReport => "supported-report",
            Self::NeedPrivileges => "need-privileges",
            Self::CalendarValidFilter | Self::CardValidFilter => "valid-filter",
        }
    }
}
