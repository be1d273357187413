//! Component time-range tests (RFC 4791 §9.9).

use chrono::{DateTime, Duration, Utc};
use kunai_rfc::rfc::dav::core::TimeRange;
use kunai_rfc::rfc::ical::core::{DateValue, parse_date_value, parse_duration, parse_period};
use kunai_rfc::rfc::ical::expand::{TimeZoneResolver, event_duration};
use kunai_rfc::rfc::ical::Component;

/// Start and end of the instance a nested component (VALARM) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Span {
    /// ## Summary
    /// Span of one instance of an event or to-do, used to anchor relative
    /// alarm triggers.
    #[must_use]
    pub fn of_instance(
        component: &Component,
        start: Option<DateValue>,
        resolver: &mut TimeZoneResolver,
    ) -> Option<Self> {
        let start = start.map(DateValue::to_utc).or_else(|| {
            component
                .property("DUE")
                .and_then(|line| parse_date_value(line, resolver))
                .map(DateValue::to_utc)
        })?;
        let end = start + event_duration(component, resolver).max(Duration::zero());
        Some(Self { start, end })
    }
}

/// Bounds with open ends replaced by the extremes of the calendar.
fn bounds(range: &TimeRange) -> (DateTime<Utc>, DateTime<Utc>) {
    (
        range.start.unwrap_or(DateTime::<Utc>::MIN_UTC),
        range.end.unwrap_or(DateTime::<Utc>::MAX_UTC),
    )
}

/// ## Summary
/// Whether one instance of `component`, starting at `start`, overlaps `range`.
///
/// `parent` is required for VALARM, whose triggers may be relative to the
/// enclosing event or to-do. Components without a defined rule never match.
#[must_use]
pub fn instance_overlaps(
    component: &Component,
    start: Option<DateValue>,
    range: &TimeRange,
    parent: Option<Span>,
    resolver: &mut TimeZoneResolver,
) -> bool {
    let name = component.name.to_ascii_uppercase();
    match name.as_str() {
        "VEVENT" => event_overlaps(component, start, range, resolver),
        "VTODO" => todo_overlaps(component, start, range, resolver),
        "VJOURNAL" => journal_overlaps(start, range),
        "VFREEBUSY" => freebusy_overlaps(component, range, resolver),
        "VALARM" => parent.is_some_and(|span| alarm_overlaps(component, span, range, resolver)),
        _ => {
            tracing::debug!(component = %component.name, "No time-range rule for component");
            false
        }
    }
}

fn event_overlaps(
    component: &Component,
    start: Option<DateValue>,
    range: &TimeRange,
    resolver: &mut TimeZoneResolver,
) -> bool {
    let Some(start) = start else {
        return false;
    };
    let start = start.to_utc();
    range.overlaps(start, start + event_duration(component, resolver))
}

fn todo_overlaps(
    component: &Component,
    start: Option<DateValue>,
    range: &TimeRange,
    resolver: &mut TimeZoneResolver,
) -> bool {
    let (s, e) = bounds(range);
    let date = |name: &str, resolver: &mut TimeZoneResolver| {
        component
            .property(name)
            .and_then(|line| parse_date_value(line, resolver))
            .map(DateValue::to_utc)
    };

    let own_start = date("DTSTART", resolver);
    let offset = match (start, own_start) {
        (Some(instance), Some(own)) => instance.to_utc() - own,
        _ => Duration::zero(),
    };
    let dtstart = start.map(DateValue::to_utc);
    let due = date("DUE", resolver).map(|d| d + offset);
    let duration = component
        .property("DURATION")
        .and_then(|line| parse_duration(&line.value));
    let completed = date("COMPLETED", resolver);
    let created = date("CREATED", resolver);

    match (dtstart, due, duration) {
        (Some(dtstart), _, Some(duration)) => {
            let end = dtstart + duration;
            s <= end && (e > dtstart || e >= end)
        }
        (Some(dtstart), Some(due), None) => (s < due || s <= dtstart) && (e > dtstart || e >= due),
        (Some(dtstart), None, None) => s <= dtstart && e > dtstart,
        (None, Some(due), _) => s < due && e >= due,
        (None, None, _) => match (completed, created) {
            (Some(completed), Some(created)) => {
                (s <= created || s <= completed) && (e >= created || e >= completed)
            }
            (Some(completed), None) => s <= completed && e >= completed,
            (None, Some(created)) => e > created,
            (None, None) => true,
        },
    }
}

fn journal_overlaps(start: Option<DateValue>, range: &TimeRange) -> bool {
    let (s, e) = bounds(range);
    match start {
        None => false,
        Some(DateValue::Date(date)) => {
            let begin = DateValue::Date(date).to_utc();
            s < begin + Duration::days(1) && e > begin
        }
        Some(DateValue::DateTime(at)) => s <= at && e > at,
    }
}

fn freebusy_overlaps(
    component: &Component,
    range: &TimeRange,
    resolver: &mut TimeZoneResolver,
) -> bool {
    let (s, e) = bounds(range);
    let date = |name: &str, resolver: &mut TimeZoneResolver| {
        component
            .property(name)
            .and_then(|line| parse_date_value(line, resolver))
            .map(DateValue::to_utc)
    };

    if let (Some(start), Some(end)) = (date("DTSTART", resolver), date("DTEND", resolver)) {
        return s <= end && e > start;
    }

    component.properties_named("FREEBUSY").any(|line| {
        line.value
            .split(',')
            .filter_map(|p| parse_period(p, resolver))
            .any(|p| s < p.end && e > p.start)
    })
}

fn alarm_overlaps(
    alarm: &Component,
    parent: Span,
    range: &TimeRange,
    resolver: &mut TimeZoneResolver,
) -> bool {
    let Some(first) = first_trigger(alarm, parent, resolver) else {
        return false;
    };

    let repeat = alarm
        .property("REPEAT")
        .and_then(|line| line.value.trim().parse::<u32>().ok())
        .unwrap_or(0);
    let interval = alarm
        .property("DURATION")
        .and_then(|line| parse_duration(&line.value));

    let mut triggers = vec![first];
    if let Some(interval) = interval {
        let mut at = first;
        for _ in 0..repeat {
            at += interval;
            triggers.push(at);
        }
    }

    triggers.into_iter().any(|t| range.contains(t))
}

fn first_trigger(
    alarm: &Component,
    parent: Span,
    resolver: &mut TimeZoneResolver,
) -> Option<DateTime<Utc>> {
    let trigger = alarm.property("TRIGGER")?;

    let absolute = trigger
        .param_value("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE-TIME"));
    if absolute {
        return parse_date_value(trigger, resolver).map(DateValue::to_utc);
    }

    let offset = parse_duration(&trigger.value)?;
    let anchor = if trigger
        .param_value("RELATED")
        .is_some_and(|v| v.eq_ignore_ascii_case("END"))
    {
        parent.end
    } else {
        parent.start
    };
    Some(anchor + offset)
}
