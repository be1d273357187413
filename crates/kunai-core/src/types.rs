use crate::constants::{CALDAV_ROUTE_PREFIX, CARDDAV_ROUTE_PREFIX, ICS_EXTENSION, VCF_EXTENSION};
use crate::error::{CoreError, CoreResult};

/// Kind of a DAV collection.
///
/// `Birthdays` is the generated, read-only calendar derived from contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    Calendar,
    Addressbook,
    Birthdays,
}

impl CollectionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Addressbook => "addressbook",
            Self::Birthdays => "birthdays",
        }
    }

    /// ## Summary
    /// Parses the tag produced by [`CollectionKind::as_str`].
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidIdentifier` for any other string.
    pub fn parse(value: &str) -> CoreResult<Self> {
        match value {
            "calendar" => Ok(Self::Calendar),
            "addressbook" => Ok(Self::Addressbook),
            "birthdays" => Ok(Self::Birthdays),
            other => Err(CoreError::InvalidIdentifier(format!(
                "unknown collection kind: {other}"
            ))),
        }
    }

    /// Whether resources of this collection are iCalendar objects.
    #[must_use]
    pub const fn is_calendar(self) -> bool {
        matches!(self, Self::Calendar | Self::Birthdays)
    }

    #[must_use]
    pub const fn route_prefix(self) -> &'static str {
        if self.is_calendar() {
            CALDAV_ROUTE_PREFIX
        } else {
            CARDDAV_ROUTE_PREFIX
        }
    }

    #[must_use]
    pub const fn resource_extension(self) -> &'static str {
        if self.is_calendar() {
            ICS_EXTENSION
        } else {
            VCF_EXTENSION
        }
    }
}

impl std::fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the current user may use a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessMode {
    /// Owner or editor.
    #[default]
    ReadWrite,
    /// Shared into the user's home without write access.
    ReadOnly,
}

impl AccessMode {
    #[must_use]
    pub const fn can_write(self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// ## Summary
/// Validates a path segment used as a principal, collection or resource slug.
///
/// ## Errors
/// Returns `CoreError::InvalidIdentifier` if the segment is empty, a dot
/// segment, or contains characters outside `[A-Za-z0-9._@+-]`.
pub fn validate_slug(segment: &str) -> CoreResult<()> {
    if segment.is_empty() || segment == "." || segment == ".." {
        return Err(CoreError::InvalidIdentifier(format!(
            "invalid path segment: {segment:?}"
        )));
    }

    if let Some(bad) = segment
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '@' | '+')))
    {
        return Err(CoreError::InvalidIdentifier(format!(
            "invalid character {bad:?} in path segment {segment:?}"
        )));
    }

    Ok(())
}
