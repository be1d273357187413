//! `CALDAV:calendar-data` projection (RFC 4791 §9.6).
//!
//! Projection works on the raw component tree. Kept lines are written back
//! byte-for-byte; only lines rewritten by recurrence expansion are generated.

use chrono::Duration;

use super::core::{Component, ContentLine, DateValue, Node, Parameter, parse_date_value};
use super::expand::{Instance, RecurrenceSet, TimeZoneResolver, event_duration};
use super::parse::{ParseResult, parse_calendar};
use crate::rfc::dav::core::{
    CalendarDataRequest, CompSelection, ComponentSelection, PropSelection, RecurrenceDirective,
    TimeRange,
};

/// Components that form recurrence sets.
const RECURRING_COMPONENTS: [&str; 3] = ["VEVENT", "VTODO", "VJOURNAL"];

/// `VCALENDAR` properties kept under any selection.
const MANDATORY_CALENDAR_PROPERTIES: [&str; 2] = ["VERSION", "PRODID"];

/// ## Summary
/// Projects a stored calendar object down to what `request` asks for.
///
/// An identity request returns `raw` unchanged. Otherwise recurrence
/// directives apply first, then the component/property selection.
///
/// ## Errors
/// Returns an error if `raw` is not a parseable iCalendar object.
pub fn project_calendar_data(raw: &str, request: &CalendarDataRequest) -> ParseResult<String> {
    if request.is_identity() {
        return Ok(raw.to_string());
    }

    let mut root = parse_calendar(raw)?;

    match &request.recurrence {
        Some(RecurrenceDirective::Expand(range)) => root = expand(&root, range),
        Some(RecurrenceDirective::LimitRecurrenceSet(range)) => {
            root = limit_recurrence_set(&root, range);
        }
        None => {}
    }

    if let Some(selection) = &request.selection {
        root = select(&root, selection, true);
    }

    Ok(root.to_text())
}

fn select(component: &Component, selection: &ComponentSelection, is_root: bool) -> Component {
    let mut out = component.empty_like();
    let name_matches = component.is(&selection.name);

    for node in &component.nodes {
        match node {
            Node::Property(line) => {
                let mandatory = is_root
                    && MANDATORY_CALENDAR_PROPERTIES
                        .iter()
                        .any(|name| line.is(name));
                let selected = name_matches
                    && match &selection.props {
                        PropSelection::All => true,
                        PropSelection::Only(names) => names.iter().any(|n| line.is(n)),
                    };
                if mandatory || selected {
                    out.push_property(line.clone());
                }
            }
            Node::Component(child) if name_matches => match &selection.comps {
                CompSelection::All => out.push_component(child.clone()),
                CompSelection::Only(children) => {
                    if let Some(child_sel) = children.iter().find(|s| child.is(&s.name)) {
                        out.push_component(select(child, child_sel, false));
                    }
                }
            },
            Node::Component(_) => {}
        }
    }

    out
}

/// Replaces recurring sets with one component per instance overlapping
/// `range`, with times in UTC. `VTIMEZONE` is dropped.
fn expand(root: &Component, range: &TimeRange) -> Component {
    let mut resolver = TimeZoneResolver::new();
    let mut out = root.empty_like();
    let mut done: Vec<&str> = Vec::new();

    for node in &root.nodes {
        match node {
            Node::Property(line) => out.push_property(line.clone()),
            Node::Component(child) if child.is("VTIMEZONE") => {}
            Node::Component(child)
                if RECURRING_COMPONENTS.iter().any(|n| child.is(n)) =>
            {
                if let Some(uid) = child.uid() {
                    if done.contains(&uid) {
                        continue;
                    }
                    done.push(uid);
                }
                let set = RecurrenceSet::group(root, &child.name)
                    .into_iter()
                    .find(|set| {
                        set.master
                            .into_iter()
                            .chain(set.overrides.iter().copied())
                            .any(|c| std::ptr::eq(c, child))
                    });
                let Some(set) = set else { continue };
                let recurring = set.is_recurring();

                for instance in set.instances(Some(range), &mut resolver) {
                    if recurring && !instance_overlaps(&instance, range, &mut resolver) {
                        continue;
                    }
                    out.push_component(render_instance(&instance, recurring, &mut resolver));
                }
            }
            Node::Component(child) => out.push_component(child.clone()),
        }
    }

    out
}

/// Keeps masters and drops overrides whose instance lies outside `range`.
fn limit_recurrence_set(root: &Component, range: &TimeRange) -> Component {
    let mut resolver = TimeZoneResolver::new();
    let mut out = root.empty_like();

    for node in &root.nodes {
        match node {
            Node::Component(child)
                if child.property("RECURRENCE-ID").is_some()
                    && RECURRING_COMPONENTS.iter().any(|n| child.is(n)) =>
            {
                let rid = child
                    .property("RECURRENCE-ID")
                    .and_then(|line| parse_date_value(line, &mut resolver));
                let start = child
                    .property("DTSTART")
                    .and_then(|line| parse_date_value(line, &mut resolver));
                let instance = Instance {
                    component: child,
                    start: start.or(rid),
                    recurrence_id: rid,
                };
                let rid_in_range = rid.is_some_and(|r| range.contains(r.to_utc()));
                if rid_in_range || instance_overlaps(&instance, range, &mut resolver) {
                    out.push_component(child.clone());
                }
            }
            _ => out.nodes.push(node.clone()),
        }
    }

    out
}

fn instance_overlaps(
    instance: &Instance<'_>,
    range: &TimeRange,
    resolver: &mut TimeZoneResolver,
) -> bool {
    let Some(start) = instance.start else {
        return false;
    };
    let start = start.to_utc();
    let end = start + event_duration(instance.component, resolver);
    range.overlaps(start, end)
}

/// Writes one instance with DTSTART/DTEND/DUE in UTC and a RECURRENCE-ID
/// directly after DTSTART.
fn render_instance(
    instance: &Instance<'_>,
    recurring: bool,
    resolver: &mut TimeZoneResolver,
) -> Component {
    let source = instance.component;
    let mut out = source.empty_like();
    let offset = instance.offset(resolver);

    for node in &source.nodes {
        let line = match node {
            Node::Property(line) => line,
            Node::Component(child) => {
                out.push_component(child.clone());
                continue;
            }
        };

        if line.is("RRULE") || line.is("RDATE") || line.is("EXDATE") || line.is("RECURRENCE-ID") {
            continue;
        }

        if line.is("DTSTART") {
            match instance.start {
                Some(start) => out.push_property(date_line("DTSTART", start)),
                None => out.push_property(line.clone()),
            }
            if recurring && let Some(rid) = instance.recurrence_id {
                out.push_property(date_line("RECURRENCE-ID", rid));
            }
            continue;
        }

        if line.is("DTEND") || line.is("DUE") {
            match parse_date_value(line, resolver) {
                Some(value) => out.push_property(date_line(&line.name, shift(value, offset))),
                None => out.push_property(line.clone()),
            }
            continue;
        }

        out.push_property(line.clone());
    }

    out
}

fn shift(value: DateValue, offset: Duration) -> DateValue {
    match value {
        DateValue::Date(date) => DateValue::Date(
            date.checked_add_signed(Duration::days(offset.num_days()))
                .unwrap_or(date),
        ),
        DateValue::DateTime(dt) => DateValue::DateTime(dt + offset),
    }
}

fn date_line(name: &str, value: DateValue) -> ContentLine {
    match value {
        DateValue::Date(date) => ContentLine::generated(
            name,
            vec![Parameter::new("VALUE", "DATE")],
            date.format("%Y%m%d").to_string(),
        ),
        DateValue::DateTime(dt) => {
            ContentLine::generated(name, Vec::new(), dt.format("%Y%m%dT%H%M%SZ").to_string())
        }
    }
}
