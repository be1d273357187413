//! Multistatus response types.

use super::href::Href;
use super::property::DavProperty;

/// A `DAV:multistatus` document.
#[derive(Debug, Clone, Default)]
pub struct Multistatus {
    pub responses: Vec<PropstatResponse>,
    pub description: Option<String>,
    /// Present on `sync-collection` responses.
    pub sync_token: Option<String>,
}

impl Multistatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response(&mut self, response: PropstatResponse) {
        self.responses.push(response);
    }

    pub fn set_sync_token(&mut self, token: impl Into<String>) {
        self.sync_token = Some(token.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }
}

/// One `DAV:response` element.
#[derive(Debug, Clone)]
pub struct PropstatResponse {
    pub href: Href,
    pub body: ResponseBody,
    pub description: Option<String>,
}

/// The two shapes RFC 4918 allows inside a `DAV:response`.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    /// Property blocks grouped by status.
    Propstats(Vec<Propstat>),
    /// A bare status for the whole resource (missing multiget hrefs, sync tombstones).
    Status(Status),
}

impl PropstatResponse {
    #[must_use]
    pub fn ok(href: impl Into<Href>, properties: Vec<DavProperty>) -> Self {
        Self::with_found_and_not_found(href, properties, Vec::new())
    }

    /// Splits into a 200 and a 404 propstat, dropping whichever is empty.
    ///
    /// A response with nothing found and nothing missing still carries an
    /// empty 200 propstat so it stays schema-valid.
    #[must_use]
    pub fn with_found_and_not_found(
        href: impl Into<Href>,
        found: Vec<DavProperty>,
        not_found: Vec<DavProperty>,
    ) -> Self {
        let mut propstats = Vec::new();

        if !found.is_empty() || not_found.is_empty() {
            propstats.push(Propstat::new(Status::Ok, found));
        }

        if !not_found.is_empty() {
            propstats.push(Propstat::new(Status::NotFound, not_found));
        }

        Self {
            href: href.into(),
            body: ResponseBody::Propstats(propstats),
            description: None,
        }
    }

    /// Partitions properties by whether they carry a value.
    #[must_use]
    pub fn from_properties(href: impl Into<Href>, properties: Vec<DavProperty>) -> Self {
        let (found, not_found): (Vec<_>, Vec<_>) =
            properties.into_iter().partition(|p| p.value.is_some());
        Self::with_found_and_not_found(href, found, not_found)
    }

    #[must_use]
    pub fn status(href: impl Into<Href>, status: Status) -> Self {
        Self {
            href: href.into(),
            body: ResponseBody::Status(status),
            description: None,
        }
    }

    #[must_use]
    pub fn not_found(href: impl Into<Href>) -> Self {
        Self::status(href, Status::NotFound)
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Status of the resource itself, if this is a bare-status response.
    #[must_use]
    pub fn resource_status(&self) -> Option<Status> {
        match &self.body {
            ResponseBody::Status(status) => Some(*status),
            ResponseBody::Propstats(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Propstat {
    pub status: Status,
    pub properties: Vec<DavProperty>,
}

impl Propstat {
    #[must_use]
    pub fn new(status: Status, properties: Vec<DavProperty>) -> Self {
        Self { status, properties }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Forbidden,
    NotFound,
    InsufficientStorage,
}

impl Status {
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::InsufficientStorage => 507,
        }
    }

    #[must_use]
    pub fn status_line(self) -> String {
        format!("HTTP/1.1 {} {}", self.code(), self.reason_phrase())
    }

    #[must_use]
    pub const fn reason_phrase(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::InsufficientStorage => "Insufficient Storage",
        }
    }
}
