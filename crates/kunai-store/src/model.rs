//! Records exchanged with the store.

use chrono::{DateTime, Utc};
use kunai_core::types::{AccessMode, CollectionKind};

/// An authenticated user's principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// URL slug, e.g. `alice`.
    pub name: String,
    pub display_name: String,
    pub email: Option<String>,
}

/// A stored calendar or address book as it appears in one user's home.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub id: u64,
    /// Principal whose home lists this collection.
    pub owner: String,
    pub slug: String,
    pub kind: CollectionKind,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// `VTIMEZONE` text; calendars only.
    pub timezone: Option<String>,
    pub access: AccessMode,
    pub ctag: String,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a collection.
#[derive(Debug, Clone)]
pub struct NewCollection {
    pub owner: String,
    pub slug: String,
    pub kind: CollectionKind,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub timezone: Option<String>,
    pub access: AccessMode,
}

impl NewCollection {
    #[must_use]
    pub fn new(owner: impl Into<String>, slug: impl Into<String>, kind: CollectionKind) -> Self {
        Self {
            owner: owner.into(),
            slug: slug.into(),
            kind,
            display_name: None,
            description: None,
            timezone: None,
            access: AccessMode::default(),
        }
    }

    #[must_use]
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.access = AccessMode::ReadOnly;
        self
    }
}

/// A calendar object or vCard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub collection_id: u64,
    /// Final path segment, e.g. `standup.ics`.
    pub name: String,
    pub body: String,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

/// Identity of a deleted resource, kept for the sync horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tombstone {
    pub collection_id: u64,
    pub name: String,
    pub deleted_at: DateTime<Utc>,
}

/// Result of a write.
#[derive(Debug, Clone)]
pub struct PutOutcome {
    pub resource: Resource,
    pub created: bool,
}
