//! REPORT request types.
//!
//! Filters are recursive variant types: a filter either tests for absence
//! (`is-not-defined`) or carries the predicates that must all hold.

use chrono::{DateTime, Utc};

use super::href::Href;
use super::property::PropertyName;
use super::namespace::QName;

/// A parsed REPORT body.
#[derive(Debug, Clone)]
pub struct ReportRequest {
    pub report_type: ReportType,
    /// Properties requested with `<D:prop>`.
    pub properties: Vec<PropertyName>,
}

impl ReportRequest {
    #[must_use]
    pub fn new(report_type: ReportType, properties: Vec<PropertyName>) -> Self {
        Self {
            report_type,
            properties,
        }
    }
}

#[derive(Debug, Clone)]
pub enum ReportType {
    CalendarQuery(CalendarQuery),
    CalendarMultiget(Multiget),
    FreeBusyQuery(FreeBusyQuery),
    AddressbookQuery(AddressbookQuery),
    AddressbookMultiget(Multiget),
    SyncCollection(SyncCollection),
    ExpandProperty(ExpandProperty),
}

/// Which collection kinds a report may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    Calendar,
    Addressbook,
    AnyCollection,
}

impl ReportType {
    /// Root element local name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CalendarQuery(_) => "calendar-query",
            Self::CalendarMultiget(_) => "calendar-multiget",
            Self::FreeBusyQuery(_) => "free-busy-query",
            Self::AddressbookQuery(_) => "addressbook-query",
            Self::AddressbookMultiget(_) => "addressbook-multiget",
            Self::SyncCollection(_) => "sync-collection",
            Self::ExpandProperty(_) => "expand-property",
        }
    }

    #[must_use]
    pub const fn scope(&self) -> ReportScope {
        match self {
            Self::CalendarQuery(_) | Self::CalendarMultiget(_) | Self::FreeBusyQuery(_) => {
                ReportScope::Calendar
            }
            Self::AddressbookQuery(_) | Self::AddressbookMultiget(_) => ReportScope::Addressbook,
            Self::SyncCollection(_) | Self::ExpandProperty(_) => ReportScope::AnyCollection,
        }
    }
}

/// `CALDAV:calendar-query` (RFC 4791 §7.8).
#[derive(Debug, Clone)]
pub struct CalendarQuery {
    /// Root component filter, normally `VCALENDAR`.
    pub filter: CompFilter,
    /// `CALDAV:timezone` used to interpret floating times.
    pub timezone: Option<String>,
    pub limit: Option<u32>,
}

impl CalendarQuery {
    /// A query matching every calendar object.
    #[must_use]
    pub fn all() -> Self {
        Self {
            filter: CompFilter::new("VCALENDAR"),
            timezone: None,
            limit: None,
        }
    }
}

/// `calendar-multiget` / `addressbook-multiget`.
#[derive(Debug, Clone)]
pub struct Multiget {
    pub hrefs: Vec<Href>,
}

/// `CALDAV:free-busy-query` (RFC 4791 §7.10).
#[derive(Debug, Clone)]
pub struct FreeBusyQuery {
    pub time_range: Option<TimeRange>,
}

/// `CARDDAV:addressbook-query` (RFC 6352 §8.6).
#[derive(Debug, Clone)]
pub struct AddressbookQuery {
    pub filter: AddressbookFilter,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct AddressbookFilter {
    pub test: FilterTest,
    pub prop_filters: Vec<PropFilter>,
}

impl AddressbookFilter {
    /// An empty filter matches every card.
    #[must_use]
    pub fn match_all() -> Self {
        Self {
            test: FilterTest::AnyOf,
            prop_filters: Vec::new(),
        }
    }
}

/// `test` attribute of CardDAV filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterTest {
    #[default]
    AnyOf,
    AllOf,
}

/// `DAV:sync-collection` (RFC 6578 §3.2).
#[derive(Debug, Clone)]
pub struct SyncCollection {
    /// Empty for an initial sync.
    pub sync_token: String,
    pub sync_level: SyncLevel,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncLevel {
    One,
    Infinite,
}

/// `DAV:expand-property` (RFC 3253 §3.8).
#[derive(Debug, Clone)]
pub struct ExpandProperty {
    pub properties: Vec<ExpandPropertyItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandPropertyItem {
    pub name: QName,
    /// Properties to report on each href the property points at.
    pub properties: Vec<ExpandPropertyItem>,
}

/// `CALDAV:comp-filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompFilter {
    pub name: String,
    pub test: CompFilterTest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompFilterTest {
    /// Matches when no component of this name exists.
    IsNotDefined,
    /// Matches when some component of this name satisfies every predicate.
    Matches {
        time_range: Option<TimeRangeFilter>,
        prop_filters: Vec<PropFilter>,
        comp_filters: Vec<CompFilter>,
    },
}

impl CompFilter {
    /// Bare component filter: matches on presence alone.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: CompFilterTest::Matches {
                time_range: None,
                prop_filters: Vec::new(),
                comp_filters: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn not_defined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: CompFilterTest::IsNotDefined,
        }
    }

    #[must_use]
    pub fn with_time_range(mut self, range: TimeRange) -> Self {
        if let CompFilterTest::Matches { time_range, .. } = &mut self.test {
            *time_range = Some(TimeRangeFilter::Valid(range));
        }
        self
    }

    #[must_use]
    pub fn with_prop_filter(mut self, filter: PropFilter) -> Self {
        if let CompFilterTest::Matches { prop_filters, .. } = &mut self.test {
            prop_filters.push(filter);
        }
        self
    }

    #[must_use]
    pub fn with_comp_filter(mut self, filter: CompFilter) -> Self {
        if let CompFilterTest::Matches { comp_filters, .. } = &mut self.test {
            comp_filters.push(filter);
        }
        self
    }
}

/// `CALDAV:prop-filter` / `CARDDAV:prop-filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropFilter {
    pub name: String,
    pub test: PropFilterTest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropFilterTest {
    IsNotDefined,
    Matches {
        time_range: Option<TimeRangeFilter>,
        /// CalDAV allows one text-match, CardDAV several combined by `test`.
        text_matches: Vec<TextMatch>,
        param_filters: Vec<ParamFilter>,
        test: FilterTest,
    },
}

impl PropFilter {
    /// Matches when the property is present.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: PropFilterTest::Matches {
                time_range: None,
                text_matches: Vec::new(),
                param_filters: Vec::new(),
                test: FilterTest::AllOf,
            },
        }
    }

    #[must_use]
    pub fn not_defined(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            test: PropFilterTest::IsNotDefined,
        }
    }

    #[must_use]
    pub fn with_text_match(mut self, text_match: TextMatch) -> Self {
        if let PropFilterTest::Matches { text_matches, .. } = &mut self.test {
            text_matches.push(text_match);
        }
        self
    }

    #[must_use]
    pub fn with_param_filter(mut self, filter: ParamFilter) -> Self {
        if let PropFilterTest::Matches { param_filters, .. } = &mut self.test {
            param_filters.push(filter);
        }
        self
    }
}

/// `param-filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamFilter {
    pub name: String,
    pub test: ParamFilterTest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamFilterTest {
    IsNotDefined,
    Matches { text_match: Option<TextMatch> },
}

/// `text-match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub value: String,
    /// `None` selects the default collation.
    pub collation: Option<String>,
    pub match_type: MatchType,
    pub negate: bool,
}

impl TextMatch {
    #[must_use]
    pub fn contains(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            collation: None,
            match_type: MatchType::Contains,
            negate: false,
        }
    }

    #[must_use]
    pub fn negate(mut self) -> Self {
        self.negate = true;
        self
    }

    #[must_use]
    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    #[must_use]
    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }
}

/// RFC 5689 / RFC 6352 `match-type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchType {
    Equals,
    #[default]
    Contains,
    StartsWith,
    EndsWith,
}

impl MatchType {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "equals" => Some(Self::Equals),
            "contains" => Some(Self::Contains),
            "starts-with" => Some(Self::StartsWith),
            "ends-with" => Some(Self::EndsWith),
            _ => None,
        }
    }
}

/// A half-open `[start, end)` interval; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// ## Summary
    /// Tests an instance `[start, end)` against this range (RFC 4791 §9.9).
    ///
    /// An instance with `start == end` is an instant: it overlaps when it
    /// lies in `[range.start, range.end)`.
    #[must_use]
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        let after_start = |t: DateTime<Utc>, inclusive: bool| {
            self.start
                .is_none_or(|s| if inclusive { s <= t } else { s < t })
        };
        let before_end = self.end.is_none_or(|e| e > start);

        if end <= start {
            after_start(start, true) && before_end
        } else {
            after_start(end, false) && before_end
        }
    }

    /// Whether `instant` falls in `[start, end)`.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.overlaps(instant, instant)
    }

    /// Whether both bounds are present.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// A time-range as received: malformed bounds are kept so the evaluator
/// can reject them without failing the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeRangeFilter {
    Valid(TimeRange),
    Malformed(String),
}
