//! Free-busy aggregation (RFC 4791 §7.10).

use chrono::{DateTime, Utc};
use kunai_core::constants::PRODUCT_ID;
use kunai_rfc::rfc::dav::core::TimeRange;
use kunai_rfc::rfc::ical::core::{DateValue, Period, parse_period};
use kunai_rfc::rfc::ical::expand::{RecurrenceSet, TimeZoneResolver, event_duration};
use kunai_rfc::rfc::ical::{Component, ContentLine};

const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// ## Summary
/// Collects busy periods from calendar objects.
///
/// Events marked `TRANSP:TRANSPARENT` or `STATUS:CANCELLED` and zero-length
/// events contribute nothing. Recurring events are expanded within `range`
/// when one is given. `FREEBUSY` periods of stored `VFREEBUSY` components are
/// included unless typed `FBTYPE=FREE`. Periods are clipped to `range`.
#[must_use]
pub fn busy_periods(
    calendars: &[Component],
    range: Option<&TimeRange>,
    merge: bool,
) -> Vec<Period> {
    let mut resolver = TimeZoneResolver::default();
    let mut periods = Vec::new();

    for calendar in calendars {
        for set in RecurrenceSet::group(calendar, "VEVENT") {
            for instance in set.instances(range, &mut resolver) {
                if !is_busy(instance.component) {
                    continue;
                }
                let Some(start) = instance.start.map(DateValue::to_utc) else {
                    continue;
                };
                let end = start + event_duration(instance.component, &mut resolver);
                push_clipped(&mut periods, start, end, range);
            }
        }

        for freebusy in calendar.components_named("VFREEBUSY") {
            for line in freebusy.properties_named("FREEBUSY") {
                let free = line
                    .param_value("FBTYPE")
                    .is_some_and(|t| t.eq_ignore_ascii_case("FREE"));
                if free {
                    continue;
                }
                for period in line.value.split(',').filter_map(|p| parse_period(p, &mut resolver)) {
                    push_clipped(&mut periods, period.start, period.end, range);
                }
            }
        }
    }

    periods.sort_by_key(|p| (p.start, p.end));
    if merge {
        merge_periods(periods)
    } else {
        periods
    }
}

fn is_busy(event: &Component) -> bool {
    let transparent = event
        .property("TRANSP")
        .is_some_and(|l| l.value.trim().eq_ignore_ascii_case("TRANSPARENT"));
    let cancelled = event
        .property("STATUS")
        .is_some_and(|l| l.value.trim().eq_ignore_ascii_case("CANCELLED"));
    !(transparent || cancelled)
}

fn push_clipped(
    periods: &mut Vec<Period>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    range: Option<&TimeRange>,
) {
    if end <= start {
        return;
    }
    let (start, end) = match range {
        Some(range) => {
            if !range.overlaps(start, end) {
                return;
            }
            (
                range.start.map_or(start, |s| s.max(start)),
                range.end.map_or(end, |e| e.min(end)),
            )
        }
        None => (start, end),
    };
    periods.push(Period { start, end });
}

/// Merges overlapping and touching periods. Input must be sorted by start.
fn merge_periods(periods: Vec<Period>) -> Vec<Period> {
    let mut merged: Vec<Period> = Vec::with_capacity(periods.len());
    for period in periods {
        match merged.last_mut() {
            Some(last) if period.start <= last.end => last.end = last.end.max(period.end),
            _ => merged.push(period),
        }
    }
    merged
}

/// ## Summary
/// Renders a `VCALENDAR` holding one `VFREEBUSY`.
///
/// `DTSTART`/`DTEND` mirror the query range and are omitted for an open
/// bound. All busy periods go into a single `FREEBUSY` property.
#[must_use]
pub fn render_free_busy(
    periods: &[Period],
    range: Option<&TimeRange>,
    stamp: DateTime<Utc>,
    uid: &str,
) -> String {
    let line = |name: &str, value: String| ContentLine::generated(name, Vec::new(), value);

    let mut freebusy = Component::new("VFREEBUSY");
    freebusy.push_property(line("UID", uid.to_string()));
    freebusy.push_property(line("DTSTAMP", stamp.format(UTC_FORMAT).to_string()));
    if let Some(start) = range.and_then(|r| r.start) {
        freebusy.push_property(line("DTSTART", start.format(UTC_FORMAT).to_string()));
    }
    if let Some(end) = range.and_then(|r| r.end) {
        freebusy.push_property(line("DTEND", end.format(UTC_FORMAT).to_string()));
    }
    if !periods.is_empty() {
        let value = periods
            .iter()
            .map(|p| format!("{}/{}", p.start.format(UTC_FORMAT), p.end.format(UTC_FORMAT)))
            .collect::<Vec<_>>()
            .join(",");
        freebusy.push_property(line("FREEBUSY", value));
    }

    let mut calendar = Component::new("VCALENDAR");
    calendar.push_property(line("VERSION", "2.0".to_string()));
    calendar.push_property(line("PRODID", PRODUCT_ID.to_string()));
    calendar.push_component(freebusy);
    calendar.to_text()
}

/// ## Summary
/// Aggregates calendar objects into a free-busy response body.
#[must_use]
pub fn free_busy(calendars: &[Component], range: Option<&TimeRange>, merge: bool) -> String {
    let periods = busy_periods(calendars, range, merge);
    tracing::debug!(objects = calendars.len(), periods = periods.len(), "Aggregated free-busy");
    render_free_busy(
        &periods,
        range,
        Utc::now(),
        &uuid::Uuid::new_v4().to_string(),
    )
}
