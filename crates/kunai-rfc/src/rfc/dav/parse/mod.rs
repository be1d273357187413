//! `WebDAV` XML parsing.
//!
//! Bodies are first read into an owned element tree by the entity-safe
//! reader in [`xml`], then interpreted by the per-method parsers.

mod error;
mod propfind;
mod report;
pub mod xml;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use propfind::parse_propfind;
pub use report::parse_report;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::rfc::dav::core::{
    AddressDataRequest, CALDAV_NS, CARDDAV_NS, CalendarDataRequest, CompSelection,
    ComponentSelection, PropSelection, PropertyName, RecurrenceDirective, TimeRange,
    TimeRangeFilter,
};
use xml::XmlElement;

/// ## Summary
/// Parses an iCalendar UTC date-time (`YYYYMMDDTHHMMSSZ`) as used in
/// `time-range`, `expand` and `limit-recurrence-set` attributes.
///
/// ## Errors
/// Returns an invalid-value error for any other form.
pub fn parse_utc_datetime(value: &str) -> ParseResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y%m%dT%H%M%SZ")
        .map(|naive| naive.and_utc())
        .map_err(|e| ParseError::invalid_value(format!("invalid UTC date-time {value:?}: {e}")))
}

/// ## Summary
/// Parses a `time-range` element strictly: at least one bound, valid UTC
/// values, and `end > start`.
///
/// ## Errors
/// Returns an invalid-value error when any of those conditions fails.
pub(crate) fn parse_time_range(el: &XmlElement) -> ParseResult<TimeRange> {
    let start = el.attr("start").map(parse_utc_datetime).transpose()?;
    let end = el.attr("end").map(parse_utc_datetime).transpose()?;

    if start.is_none() && end.is_none() {
        return Err(ParseError::invalid_value(
            "time-range requires a start or end attribute",
        ));
    }

    if let (Some(s), Some(e)) = (start, end)
        && e <= s
    {
        return Err(ParseError::invalid_value(
            "time-range end must be after start",
        ));
    }

    Ok(TimeRange { start, end })
}

/// Like [`parse_time_range`], but a bad range is kept as `Malformed` so the
/// filter evaluator can fail closed for that predicate alone.
pub(crate) fn parse_time_range_filter(el: &XmlElement) -> TimeRangeFilter {
    match parse_time_range(el) {
        Ok(range) => TimeRangeFilter::Valid(range),
        Err(e) => {
            tracing::debug!(error = %e, "Keeping malformed time-range as non-matching");
            TimeRangeFilter::Malformed(e.message)
        }
    }
}

/// Parses the children of a `DAV:prop` element into property names.
pub(crate) fn parse_prop_names(prop: &XmlElement) -> ParseResult<Vec<PropertyName>> {
    prop.elements()
        .map(|el| {
            if el.is(CALDAV_NS, "calendar-data") {
                parse_calendar_data(el).map(PropertyName::CalendarData)
            } else if el.is(CARDDAV_NS, "address-data") {
                Ok(PropertyName::AddressData(parse_address_data(el)))
            } else {
                Ok(PropertyName::Simple(el.name.clone()))
            }
        })
        .collect()
}

fn parse_calendar_data(el: &XmlElement) -> ParseResult<CalendarDataRequest> {
    let mut request = CalendarDataRequest {
        content_type: el.attr("content-type").map(str::to_string),
        version: el.attr("version").map(str::to_string),
        selection: None,
        recurrence: None,
    };

    for child in el.elements() {
        if child.is(CALDAV_NS, "comp") {
            request.selection = Some(parse_comp_selection(child, CALDAV_NS)?);
        } else if child.is(CALDAV_NS, "expand") {
            request.recurrence = Some(RecurrenceDirective::Expand(parse_bounded_range(child)?));
        } else if child.is(CALDAV_NS, "limit-recurrence-set") {
            request.recurrence = Some(RecurrenceDirective::LimitRecurrenceSet(
                parse_bounded_range(child)?,
            ));
        } else {
            tracing::debug!(element = %child.name, "Ignoring calendar-data child");
        }
    }

    Ok(request)
}

fn parse_bounded_range(el: &XmlElement) -> ParseResult<TimeRange> {
    let range = parse_time_range(el)?;
    if !range.is_bounded() {
        return Err(ParseError::invalid_value(format!(
            "{} requires both start and end",
            el.name.local_name()
        )));
    }
    Ok(range)
}

fn parse_comp_selection(el: &XmlElement, ns: &str) -> ParseResult<ComponentSelection> {
    let name = el
        .attr("name")
        .ok_or_else(|| ParseError::missing_attribute("name"))?;

    let mut props = PropSelection::All;
    let mut comps = CompSelection::All;
    let mut named_props = Vec::new();
    let mut named_comps = Vec::new();

    for child in el.elements() {
        if child.is(ns, "prop") {
            let prop_name = child
                .attr("name")
                .ok_or_else(|| ParseError::missing_attribute("name"))?;
            named_props.push(prop_name.to_string());
        } else if child.is(ns, "comp") {
            named_comps.push(parse_comp_selection(child, ns)?);
        } else if child.is(ns, "allprop") || child.is(ns, "allcomp") {
            // Same as leaving the list empty.
        } else {
            return Err(ParseError::unexpected_element(child.name.local_name()));
        }
    }

    if !named_props.is_empty() {
        props = PropSelection::Only(named_props);
    }
    if !named_comps.is_empty() {
        comps = CompSelection::Only(named_comps);
    }

    Ok(ComponentSelection {
        name: name.to_string(),
        props,
        comps,
    })
}

fn parse_address_data(el: &XmlElement) -> AddressDataRequest {
    let named: Vec<String> = el
        .children_named(CARDDAV_NS, "prop")
        .filter_map(|p| p.attr("name").map(str::to_string))
        .collect();

    AddressDataRequest {
        content_type: el.attr("content-type").map(str::to_string),
        version: el.attr("version").map(str::to_string),
        props: if named.is_empty() {
            PropSelection::All
        } else {
            PropSelection::Only(named)
        },
    }
}
