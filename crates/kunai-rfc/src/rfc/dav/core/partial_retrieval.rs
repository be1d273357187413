//! Partial retrieval data structures for calendar-data and address-data.
//!
//! RFC 4791 §9.6 (calendar-data) and RFC 6352 §10.4 (address-data).

use super::report::TimeRange;

/// Which properties of a component survive projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropSelection {
    /// `<C:allprop/>`, or no `prop` children at all.
    All,
    /// Named properties only, matched case-insensitively.
    Only(Vec<String>),
}

/// Which child components survive projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompSelection {
    /// `<C:allcomp/>`, or no `comp` children at all.
    All,
    /// Named children only, each with its own nested selection.
    Only(Vec<ComponentSelection>),
}

/// A `<C:comp name="...">` selection node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSelection {
    pub name: String,
    pub props: PropSelection,
    pub comps: CompSelection,
}

impl ComponentSelection {
    /// A selection that keeps the named component in full.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: PropSelection::All,
            comps: CompSelection::All,
        }
    }

    #[must_use]
    pub fn with_prop(mut self, prop: impl Into<String>) -> Self {
        match &mut self.props {
            PropSelection::All => self.props = PropSelection::Only(vec![prop.into()]),
            PropSelection::Only(props) => props.push(prop.into()),
        }
        self
    }

    #[must_use]
    pub fn with_comp(mut self, comp: ComponentSelection) -> Self {
        match &mut self.comps {
            CompSelection::All => self.comps = CompSelection::Only(vec![comp]),
            CompSelection::Only(comps) => comps.push(comp),
        }
        self
    }

    /// Whether this node keeps everything beneath it.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.props == PropSelection::All && self.comps == CompSelection::All
    }
}

/// Recurrence handling requested inside `calendar-data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceDirective {
    /// `<C:expand>`: materialize instances within the window, in UTC.
    Expand(TimeRange),
    /// `<C:limit-recurrence-set>`: keep the master, drop overrides outside the window.
    LimitRecurrenceSet(TimeRange),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CalendarDataRequest {
    pub content_type: Option<String>,
    pub version: Option<String>,
    /// `None` returns the whole object.
    pub selection: Option<ComponentSelection>,
    pub recurrence: Option<RecurrenceDirective>,
}

impl CalendarDataRequest {
    #[must_use]
    pub fn full() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_selection(selection: ComponentSelection) -> Self {
        Self {
            selection: Some(selection),
            ..Self::default()
        }
    }

    /// Whether projection with this request returns the stored text verbatim.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.recurrence.is_none()
            && self.selection.as_ref().is_none_or(|sel| {
                sel.name.eq_ignore_ascii_case("VCALENDAR") && sel.is_unrestricted()
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDataRequest {
    pub content_type: Option<String>,
    pub version: Option<String>,
    pub props: PropSelection,
}

impl AddressDataRequest {
    #[must_use]
    pub fn full() -> Self {
        Self {
            content_type: None,
            version: None,
            props: PropSelection::All,
        }
    }

    #[must_use]
    pub fn with_props(props: Vec<String>) -> Self {
        Self {
            content_type: None,
            version: None,
            props: PropSelection::Only(props),
        }
    }
}

impl Default for AddressDataRequest {
    fn default() -> Self {
        Self::full()
    }
}
