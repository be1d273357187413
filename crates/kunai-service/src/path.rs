//! Request path classification.

use std::fmt;

use kunai_core::constants::{
    BIRTHDAY_CALENDAR_SLUG, CALDAV_ROUTE_COMPONENT, CARDDAV_ROUTE_COMPONENT, DAV_ROUTE_PREFIX,
    PRINCIPAL_ROUTE_COMPONENT, PRINCIPAL_ROUTE_PREFIX,
};
use kunai_core::types::{CollectionKind, validate_slug};
use kunai_rfc::rfc::dav::core::Href;

use crate::error::{ServiceError, ServiceResult};

/// Which home a path lives under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeKind {
    Calendar,
    Addressbook,
}

impl HomeKind {
    /// Kind of the stored collections in this home.
    #[must_use]
    pub const fn stored_kind(self) -> CollectionKind {
        match self {
            Self::Calendar => CollectionKind::Calendar,
            Self::Addressbook => CollectionKind::Addressbook,
        }
    }

    /// Kind of the collection `slug` names in this home.
    #[must_use]
    pub fn collection_kind(self, slug: &str) -> CollectionKind {
        match self {
            Self::Calendar if slug == BIRTHDAY_CALENDAR_SLUG => CollectionKind::Birthdays,
            _ => self.stored_kind(),
        }
    }

    #[must_use]
    pub const fn route_prefix(self) -> &'static str {
        self.stored_kind().route_prefix()
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        self.stored_kind().resource_extension()
    }
}

/// A classified DAV path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DavPath {
    /// `/api/dav/principal/{user}/`
    Principal { user: String },
    /// `/api/dav/cal/{user}/` or `/api/dav/card/{user}/`
    Home { home: HomeKind, user: String },
    /// `/api/dav/cal/{user}/{slug}/`
    Collection {
        home: HomeKind,
        user: String,
        slug: String,
    },
    /// `/api/dav/cal/{user}/{slug}/{name}.ics`
    Resource {
        home: HomeKind,
        user: String,
        slug: String,
        name: String,
    },
}

impl DavPath {
    /// ## Summary
    /// Classifies a request path or href.
    ///
    /// ## Errors
    /// Returns `NotFound` for paths outside the DAV tree, and `BadRequest`
    /// for missing segments, invalid identifiers, or a resource name with
    /// the wrong extension.
    pub fn parse(path: &str) -> ServiceResult<Self> {
        let decoded = Href::new(path).decode();
        let rest = decoded
            .strip_prefix(DAV_ROUTE_PREFIX)
            .and_then(|r| r.strip_prefix('/'))
            .ok_or_else(|| ServiceError::NotFound(format!("no DAV resource at {path}")))?;

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        let Some((&area, segments)) = segments.split_first() else {
            return Err(ServiceError::NotFound(format!("no DAV resource at {path}")));
        };

        for segment in segments {
            validate_slug(segment)?;
        }

        let home = match area {
            PRINCIPAL_ROUTE_COMPONENT => {
                return match segments {
                    [user] => Ok(Self::Principal {
                        user: (*user).to_string(),
                    }),
                    [] => Err(ServiceError::BadRequest("missing principal name".into())),
                    _ => Err(ServiceError::NotFound(format!("no DAV resource at {path}"))),
                };
            }
            CALDAV_ROUTE_COMPONENT => HomeKind::Calendar,
            CARDDAV_ROUTE_COMPONENT => HomeKind::Addressbook,
            _ => return Err(ServiceError::NotFound(format!("no DAV resource at {path}"))),
        };

        match segments {
            [] => Err(ServiceError::BadRequest("missing user segment".into())),
            [user] => Ok(Self::Home {
                home,
                user: (*user).to_string(),
            }),
            [user, slug] => Ok(Self::Collection {
                home,
                user: (*user).to_string(),
                slug: (*slug).to_string(),
            }),
            [user, slug, name] => {
                let stem = name.strip_suffix(home.extension()).unwrap_or_default();
                if stem.is_empty() {
                    return Err(ServiceError::BadRequest(format!(
                        "resource name must end in {}",
                        home.extension()
                    )));
                }
                Ok(Self::Resource {
                    home,
                    user: (*user).to_string(),
                    slug: (*slug).to_string(),
                    name: (*name).to_string(),
                })
            }
            _ => Err(ServiceError::NotFound(format!("no DAV resource at {path}"))),
        }
    }

    /// The principal that owns this path.
    #[must_use]
    pub fn user(&self) -> &str {
        match self {
            Self::Principal { user }
            | Self::Home { user, .. }
            | Self::Collection { user, .. }
            | Self::Resource { user, .. } => user,
        }
    }

    #[must_use]
    pub fn principal_href(user: &str) -> String {
        format!("{PRINCIPAL_ROUTE_PREFIX}/{user}/")
    }

    #[must_use]
    pub fn home_href(home: HomeKind, user: &str) -> String {
        format!("{}/{user}/", home.route_prefix())
    }

    #[must_use]
    pub fn collection_href(home: HomeKind, user: &str, slug: &str) -> String {
        format!("{}/{user}/{slug}/", home.route_prefix())
    }

    /// Canonical href of this path.
    #[must_use]
    pub fn href(&self) -> String {
        match self {
            Self::Principal { user } => Self::principal_href(user),
            Self::Home { home, user } => Self::home_href(*home, user),
            Self::Collection { home, user, slug } => Self::collection_href(*home, user, slug),
            Self::Resource {
                home,
                user,
                slug,
                name,
            } => format!("{}{name}", Self::collection_href(*home, user, slug)),
        }
    }
}

impl fmt::Display for DavPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}
