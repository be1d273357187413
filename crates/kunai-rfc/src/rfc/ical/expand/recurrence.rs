//! Recurrence sets (RFC 5545 §3.8.5) expanded through the `rrule` crate.
//!
//! A recurrence set is every component sharing a UID inside one calendar
//! object: the master, which may carry RRULE/RDATE/EXDATE, plus overrides
//! identified by RECURRENCE-ID.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rrule::{RRule, Tz, Unvalidated};

use super::timezone::TimeZoneResolver;
use crate::rfc::dav::core::TimeRange;
use crate::rfc::ical::core::{Component, ContentLine, DateValue, parse_date_value, parse_duration};
use kunai_core::constants::MAX_INSTANCES;

/// One concrete instance of a recurrence set.
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    /// Component describing this instance: the master or an override.
    pub component: &'a Component,
    /// Start of this instance; `None` for components without DTSTART.
    pub start: Option<DateValue>,
    /// Set for instances of a recurring set.
    pub recurrence_id: Option<DateValue>,
}

impl Instance<'_> {
    /// Distance from the component's own DTSTART to this instance's start.
    #[must_use]
    pub fn offset(&self, resolver: &mut TimeZoneResolver) -> Duration {
        let own = self
            .component
            .property("DTSTART")
            .and_then(|line| parse_date_value(line, resolver));
        match (own, self.start) {
            (Some(own), Some(start)) => start.to_utc() - own.to_utc(),
            _ => Duration::zero(),
        }
    }
}

/// Master and overrides sharing one UID.
#[derive(Debug, Clone)]
pub struct RecurrenceSet<'a> {
    pub master: Option<&'a Component>,
    pub overrides: Vec<&'a Component>,
}

impl<'a> RecurrenceSet<'a> {
    /// ## Summary
    /// Groups the children of `parent` named `name` by UID, in document order.
    /// Components without a UID form a set of their own.
    #[must_use]
    pub fn group(parent: &'a Component, name: &str) -> Vec<Self> {
        let mut sets: Vec<(Option<&'a str>, Self)> = Vec::new();

        for comp in parent.components_named(name) {
            let uid = comp.uid();
            let is_override = comp.property("RECURRENCE-ID").is_some();
            let existing = uid.and_then(|uid| sets.iter().position(|(u, _)| *u == Some(uid)));

            match existing {
                Some(idx) if is_override => sets[idx].1.overrides.push(comp),
                Some(idx) if sets[idx].1.master.is_none() => sets[idx].1.master = Some(comp),
                _ => {
                    let set = if is_override {
                        Self {
                            master: None,
                            overrides: vec![comp],
                        }
                    } else {
                        Self {
                            master: Some(comp),
                            overrides: Vec::new(),
                        }
                    };
                    sets.push((uid, set));
                }
            }
        }

        sets.into_iter().map(|(_, set)| set).collect()
    }

    /// Whether the master carries RRULE or RDATE.
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        self.master.is_some_and(|m| {
            m.property("RRULE").is_some() || m.property("RDATE").is_some()
        }) || !self.overrides.is_empty()
    }

    /// ## Summary
    /// Materializes instances.
    ///
    /// Recurring masters are expanded only when a window is given, bounded by
    /// `CALDAV:max-instances`; without a window the base instance stands in
    /// for the series. Overrides replace the generated instance they name.
    /// Instances are not filtered by the window here: callers apply their own
    /// overlap rules.
    #[must_use]
    pub fn instances(
        &self,
        window: Option<&TimeRange>,
        resolver: &mut TimeZoneResolver,
    ) -> Vec<Instance<'a>> {
        let mut out = Vec::new();

        let override_ids: Vec<(DateTime<Utc>, &'a Component)> = self
            .overrides
            .iter()
            .filter_map(|ov| {
                let rid = ov
                    .property("RECURRENCE-ID")
                    .and_then(|line| parse_date_value(line, resolver))?;
                Some((rid.to_utc(), *ov))
            })
            .collect();

        if let Some(master) = self.master {
            let start = master
                .property("DTSTART")
                .and_then(|line| parse_date_value(line, resolver));
            let recurring = self.is_recurring();

            match (start, window) {
                (Some(start), Some(window)) if recurring => {
                    for occurrence in expand_master(master, start, window, resolver) {
                        if override_ids.iter().any(|(rid, _)| *rid == occurrence.to_utc()) {
                            continue;
                        }
                        out.push(Instance {
                            component: master,
                            start: Some(occurrence),
                            recurrence_id: Some(occurrence),
                        });
                    }
                }
                _ => {
                    let overridden = start.is_some_and(|s| {
                        override_ids.iter().any(|(rid, _)| *rid == s.to_utc())
                    });
                    if !overridden {
                        out.push(Instance {
                            component: master,
                            start,
                            recurrence_id: start.filter(|_| recurring),
                        });
                    }
                }
            }
        }

        for (rid, ov) in override_ids {
            let start = ov
                .property("DTSTART")
                .and_then(|line| parse_date_value(line, resolver));
            let rid_value = if start.is_some_and(DateValue::is_date) {
                DateValue::Date(rid.date_naive())
            } else {
                DateValue::DateTime(rid)
            };
            out.push(Instance {
                component: ov,
                start: start.or(Some(rid_value)),
                recurrence_id: Some(rid_value),
            });
        }

        out.sort_by_key(|i| i.start.map(DateValue::to_utc));
        out
    }
}

/// ## Summary
/// Length of a VEVENT instance: DTEND minus DTSTART, DURATION, one day for
/// all-day events, otherwise zero.
#[must_use]
pub fn event_duration(component: &Component, resolver: &mut TimeZoneResolver) -> Duration {
    let start = component
        .property("DTSTART")
        .and_then(|line| parse_date_value(line, resolver));
    let end_prop = if component.is("VTODO") { "DUE" } else { "DTEND" };

    if let (Some(start), Some(end)) = (
        start,
        component
            .property(end_prop)
            .and_then(|line| parse_date_value(line, resolver)),
    ) {
        return end.to_utc() - start.to_utc();
    }

    if let Some(duration) = component
        .property("DURATION")
        .and_then(|line| parse_duration(&line.value))
    {
        return duration;
    }

    if start.is_some_and(DateValue::is_date) {
        Duration::days(1)
    } else {
        Duration::zero()
    }
}

/// Occurrence starts of a recurring master, EXDATEs removed.
fn expand_master(
    master: &Component,
    start: DateValue,
    window: &TimeRange,
    resolver: &mut TimeZoneResolver,
) -> Vec<DateValue> {
    let span = event_duration(master, resolver);
    let mut starts: Vec<DateTime<Utc>> = vec![start.to_utc()];

    if let Some(rule) = master.property("RRULE")
        && let Some(dtstart) = master
            .property("DTSTART")
            .and_then(|line| rrule_start(line, resolver))
    {
        starts.extend(expand_rule(&rule.value, dtstart, span, window));
    }

    for rdate in master.properties_named("RDATE") {
        for part in rdate.value.split(',') {
            let single = ContentLine {
                value: part.split('/').next().unwrap_or(part).to_string(),
                ..rdate.clone()
            };
            if let Some(value) = parse_date_value(&single, resolver) {
                starts.push(value.to_utc());
            }
        }
    }

    let mut exdates = Vec::new();
    for exdate in master.properties_named("EXDATE") {
        for part in exdate.value.split(',') {
            let single = ContentLine {
                value: part.to_string(),
                ..exdate.clone()
            };
            if let Some(value) = parse_date_value(&single, resolver) {
                exdates.push(value.to_utc());
            }
        }
    }

    starts.sort_unstable();
    starts.dedup();
    starts.retain(|s| !exdates.contains(s));
    starts.truncate(MAX_INSTANCES as usize);

    starts
        .into_iter()
        .map(|s| {
            if start.is_date() {
                DateValue::Date(s.date_naive())
            } else {
                DateValue::DateTime(s)
            }
        })
        .collect()
}

/// Expands one RRULE between the window bounds.
fn expand_rule(
    rule_text: &str,
    dtstart: DateTime<Tz>,
    span: Duration,
    window: &TimeRange,
) -> Vec<DateTime<Utc>> {
    let normalized = normalize_until(rule_text, dtstart.timezone());
    let rule = match normalized.parse::<RRule<Unvalidated>>() {
        Ok(rule) => rule,
        Err(e) => {
            tracing::debug!(error = %e, rrule = %rule_text, "Ignoring unparsable RRULE");
            return Vec::new();
        }
    };

    let mut set = match rule.build(dtstart) {
        Ok(set) => set,
        Err(e) => {
            tracing::debug!(error = %e, rrule = %rule_text, "Ignoring invalid RRULE");
            return Vec::new();
        }
    };

    if let Some(start) = window.start {
        let earliest = start - span.max(Duration::zero()) - Duration::seconds(1);
        set = set.after(earliest.with_timezone(&Tz::UTC));
    }
    if let Some(end) = window.end {
        set = set.before(end.with_timezone(&Tz::UTC));
    }

    let limit = u16::try_from(MAX_INSTANCES).unwrap_or(u16::MAX);
    let result = set.all(limit);
    if result.limited {
        tracing::debug!(rrule = %rule_text, "Recurrence expansion hit the instance limit");
    }
    result
        .dates
        .into_iter()
        .map(|dt| dt.with_timezone(&Utc))
        .collect()
}

/// DTSTART in the zone the rule should be evaluated in, so wall-clock times
/// stay fixed across DST changes.
fn rrule_start(line: &ContentLine, resolver: &mut TimeZoneResolver) -> Option<DateTime<Tz>> {
    let value = line.value.trim();
    if value.len() == 8 {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return Some(
            date.and_time(chrono::NaiveTime::MIN)
                .and_utc()
                .with_timezone(&Tz::UTC),
        );
    }
    if let Some(utc) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(utc, "%Y%m%dT%H%M%S").ok()?;
        return Some(naive.and_utc().with_timezone(&Tz::UTC));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    if let Some(tzid) = line.param_value("TZID")
        && let Ok(tz) = resolver.resolve(tzid)
    {
        return Tz::Tz(tz).from_local_datetime(&naive).earliest();
    }
    Some(naive.and_utc().with_timezone(&Tz::UTC))
}

/// Rewrites a DATE or floating `UNTIL` as UTC in `tz`.
fn normalize_until(rule_text: &str, tz: Tz) -> String {
    rule_text
        .split(';')
        .map(|part| {
            let Some((key, value)) = part.split_once('=') else {
                return part.to_string();
            };
            if !key.trim().eq_ignore_ascii_case("UNTIL") || value.ends_with('Z') {
                return part.to_string();
            }
            let naive = if value.len() == 8 {
                NaiveDate::parse_from_str(value, "%Y%m%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(23, 59, 59))
            } else {
                NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()
            };
            naive
                .and_then(|n| tz.from_local_datetime(&n).earliest())
                .map_or_else(
                    || part.to_string(),
                    |dt| {
                        format!(
                            "UNTIL={}",
                            dt.with_timezone(&Utc).format("%Y%m%dT%H%M%SZ")
                        )
                    },
                )
        })
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::parse::parse_calendar;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn calendar(body: &str) -> Component {
        parse_calendar(&format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//T//EN\r\n{body}END:VCALENDAR\r\n"
        ))
        .unwrap()
    }

    fn starts(instances: &[Instance<'_>]) -> Vec<DateTime<Utc>> {
        instances
            .iter()
            .filter_map(|i| i.start.map(DateValue::to_utc))
            .collect()
    }

    #[test_log::test]
    fn daily_rule_within_window() {
        let cal = calendar(
            "BEGIN:VEVENT\r\nUID:d\r\nDTSTART:20240101T090000Z\r\nDTEND:20240101T100000Z\r\n\
RRULE:FREQ=DAILY;COUNT=10\r\nEND:VEVENT\r\n",
        );
        let sets = RecurrenceSet::group(&cal, "VEVENT");
        assert_eq!(sets.len(), 1);
        let window = TimeRange::new(utc(2024, 1, 3, 0), utc(2024, 1, 5, 0));
        let mut resolver = TimeZoneResolver::new();
        let got = starts(&sets[0].instances(Some(&window), &mut resolver));
        assert!(got.contains(&utc(2024, 1, 3, 9)));
        assert!(got.contains(&utc(2024, 1, 4, 9)));
        assert!(!got.contains(&utc(2024, 1, 6, 9)));
    }

    #[test_log::test]
    fn exdate_and_override() {
        let cal = calendar(
            "BEGIN:VEVENT\r\nUID:w\r\nDTSTART:20240101T090000Z\r\nDURATION:PT1H\r\n\
RRULE:FREQ=DAILY;COUNT=5\r\nEXDATE:20240102T090000Z\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:w\r\nRECURRENCE-ID:20240103T090000Z\r\nDTSTART:20240103T150000Z\r\n\
DURATION:PT1H\r\nEND:VEVENT\r\n",
        );
        let sets = RecurrenceSet::group(&cal, "VEVENT");
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].overrides.len(), 1);

        let window = TimeRange::new(utc(2024, 1, 1, 0), utc(2024, 1, 10, 0));
        let mut resolver = TimeZoneResolver::new();
        let instances = sets[0].instances(Some(&window), &mut resolver);
        let got = starts(&instances);
        assert!(!got.contains(&utc(2024, 1, 2, 9)));
        assert!(!got.contains(&utc(2024, 1, 3, 9)));
        assert!(got.contains(&utc(2024, 1, 3, 15)));
        assert_eq!(got.len(), 4);

        let moved = instances
            .iter()
            .find(|i| i.start.map(DateValue::to_utc) == Some(utc(2024, 1, 3, 15)))
            .unwrap();
        assert_eq!(moved.recurrence_id.map(DateValue::to_utc), Some(utc(2024, 1, 3, 9)));
        assert!(moved.component.property("RECURRENCE-ID").is_some());
    }

    #[test_log::test]
    fn zoned_rule_keeps_wall_clock_across_dst() {
        let cal = calendar(
            "BEGIN:VEVENT\r\nUID:z\r\nDTSTART;TZID=America/New_York:20260305T090000\r\n\
RRULE:FREQ=WEEKLY;COUNT=2\r\nEND:VEVENT\r\n",
        );
        let sets = RecurrenceSet::group(&cal, "VEVENT");
        let window = TimeRange::new(utc(2026, 3, 1, 0), utc(2026, 3, 20, 0));
        let mut resolver = TimeZoneResolver::new();
        let got = starts(&sets[0].instances(Some(&window), &mut resolver));
        assert_eq!(got, vec![utc(2026, 3, 5, 14), utc(2026, 3, 12, 13)]);
    }

    #[test_log::test]
    fn without_window_uses_base_instance() {
        let cal = calendar(
            "BEGIN:VEVENT\r\nUID:b\r\nDTSTART:20240101T090000Z\r\nRRULE:FREQ=DAILY\r\nEND:VEVENT\r\n",
        );
        let sets = RecurrenceSet::group(&cal, "VEVENT");
        let mut resolver = TimeZoneResolver::new();
        let got = starts(&sets[0].instances(None, &mut resolver));
        assert_eq!(got, vec![utc(2024, 1, 1, 9)]);
    }

    #[test_log::test]
    fn date_until_is_inclusive() {
        let cal = calendar(
            "BEGIN:VEVENT\r\nUID:u\r\nDTSTART;VALUE=DATE:20240101\r\n\
RRULE:FREQ=DAILY;UNTIL=20240103\r\nEND:VEVENT\r\n",
        );
        let sets = RecurrenceSet::group(&cal, "VEVENT");
        let window = TimeRange::new(utc(2023, 12, 1, 0), utc(2024, 2, 1, 0));
        let mut resolver = TimeZoneResolver::new();
        let instances = sets[0].instances(Some(&window), &mut resolver);
        assert_eq!(instances.len(), 3);
        assert!(instances.iter().all(|i| i.start.is_some_and(DateValue::is_date)));
    }

    #[test_log::test]
    fn event_durations() {
        let cal = calendar(
            "BEGIN:VEVENT\r\nUID:a\r\nDTSTART;VALUE=DATE:20240101\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:b\r\nDTSTART:20240101T090000Z\r\nDURATION:PT45M\r\nEND:VEVENT\r\n\
BEGIN:VEVENT\r\nUID:c\r\nDTSTART:20240101T090000Z\r\nEND:VEVENT\r\n",
        );
        let mut resolver = TimeZoneResolver::new();
        let durations: Vec<Duration> = cal
            .components_named("VEVENT")
            .map(|c| event_duration(c, &mut resolver))
            .collect();
        assert_eq!(
            durations,
            vec![Duration::days(1), Duration::minutes(45), Duration::zero()]
        );
    }
}
