//! Date, date-time, duration and period values (RFC 5545 §3.3).

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use super::content_line::ContentLine;
use crate::rfc::ical::expand::TimeZoneResolver;

/// A resolved DATE or DATE-TIME value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    /// All-day value; placed at midnight UTC when an instant is needed.
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
}

impl DateValue {
    #[must_use]
    pub fn is_date(self) -> bool {
        matches!(self, Self::Date(_))
    }

    #[must_use]
    pub fn to_utc(self) -> DateTime<Utc> {
        match self {
            Self::Date(date) => date.and_time(chrono::NaiveTime::MIN).and_utc(),
            Self::DateTime(dt) => dt,
        }
    }
}

/// One `FREEBUSY` period, resolved to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// ## Summary
/// Resolves a date or date-time property to a point in time.
///
/// Values ending in `Z` are UTC, a `TZID` parameter is resolved through
/// `resolver`, and floating values are read as UTC. Unknown time zones fall
/// back to UTC.
#[must_use]
pub fn parse_date_value(line: &ContentLine, resolver: &mut TimeZoneResolver) -> Option<DateValue> {
    let raw = line.value.trim();
    let first = raw.split(',').next()?.trim();

    let is_date = line
        .param_value("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (first.len() == 8 && !first.contains('T'));

    if is_date {
        return NaiveDate::parse_from_str(first, "%Y%m%d")
            .ok()
            .map(DateValue::Date);
    }

    parse_date_time(first, line.param_value("TZID"), resolver).map(DateValue::DateTime)
}

/// Resolves a single DATE-TIME string in the context of an optional `TZID`.
#[must_use]
pub fn parse_date_time(
    value: &str,
    tzid: Option<&str>,
    resolver: &mut TimeZoneResolver,
) -> Option<DateTime<Utc>> {
    if let Some(utc) = value.strip_suffix('Z') {
        return NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S")
            .ok()
            .map(|naive| naive.and_utc());
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    match tzid {
        Some(tzid) => match resolver.to_utc(naive, tzid) {
            Ok(dt) => Some(dt),
            Err(e) => {
                tracing::debug!(error = %e, tzid, "Treating unresolvable local time as UTC");
                Some(naive.and_utc())
            }
        },
        None => Some(naive.and_utc()),
    }
}

/// ## Summary
/// Parses a DURATION value such as `P1W`, `PT1H30M` or `-P1DT2H`.
#[must_use]
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();
    let (negative, rest) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };
    let rest = rest.strip_prefix('P')?;

    let mut total = Duration::zero();
    let mut number = String::new();
    let mut in_time = false;
    let mut saw_unit = false;

    for c in rest.chars() {
        match c {
            '0'..='9' => number.push(c),
            'T' if !in_time && number.is_empty() => in_time = true,
            'W' | 'D' | 'H' | 'M' | 'S' => {
                let n: i64 = number.parse().ok()?;
                number.clear();
                let part = match (c, in_time) {
                    ('W', false) => Duration::try_weeks(n)?,
                    ('D', false) => Duration::try_days(n)?,
                    ('H', true) => Duration::try_hours(n)?,
                    ('M', true) => Duration::try_minutes(n)?,
                    ('S', true) => Duration::try_seconds(n)?,
                    _ => return None,
                };
                total = total.checked_add(&part)?;
                saw_unit = true;
            }
            _ => return None,
        }
    }

    if !number.is_empty() || !saw_unit {
        return None;
    }

    Some(if negative { -total } else { total })
}

/// ## Summary
/// Parses a PERIOD value: `start/end` or `start/duration`, start in UTC.
#[must_use]
pub fn parse_period(value: &str, resolver: &mut TimeZoneResolver) -> Option<Period> {
    let (start, rest) = value.trim().split_once('/')?;
    let start = parse_date_time(start, None, resolver)?;
    let end = if rest.starts_with(['P', '+', '-']) {
        start.checked_add_signed(parse_duration(rest)?)?
    } else {
        parse_date_time(rest, None, resolver)?
    };
    Some(Period { start, end })
}
