//! `CALDAV:filter` evaluation (RFC 4791 §9.7).

use kunai_rfc::rfc::dav::core::{CompFilter, CompFilterTest, TimeRange, TimeRangeFilter};
use kunai_rfc::rfc::ical::core::parse_date_value;
use kunai_rfc::rfc::ical::expand::{Instance, RecurrenceSet, TimeZoneResolver};
use kunai_rfc::rfc::ical::Component;

use super::prop_filter_matches;
use super::time_range::{Span, instance_overlaps};

/// Components whose recurrence sets are expanded before testing.
const RECURRING_COMPONENTS: [&str; 3] = ["VEVENT", "VTODO", "VJOURNAL"];

/// ## Summary
/// Whether a calendar object satisfies a `calendar-query` filter.
///
/// The root filter names the object itself (normally `VCALENDAR`); a bare
/// root filter matches every object.
#[must_use]
pub fn calendar_matches(
    calendar: &Component,
    filter: &CompFilter,
    resolver: &mut TimeZoneResolver,
) -> bool {
    match &filter.test {
        CompFilterTest::IsNotDefined => !calendar.is(&filter.name),
        CompFilterTest::Matches {
            time_range,
            prop_filters,
            comp_filters,
        } => {
            if !calendar.is(&filter.name) {
                return false;
            }
            if time_range.is_some() {
                tracing::debug!(component = %filter.name, "Time-range on root component never matches");
                return false;
            }
            prop_filters
                .iter()
                .all(|pf| prop_filter_matches(calendar, pf, resolver))
                && comp_filters
                    .iter()
                    .all(|cf| comp_filter_matches(calendar, None, cf, resolver))
        }
    }
}

/// ## Summary
/// Evaluates a nested `comp-filter` against the children of `parent`.
///
/// Recurring components are tested per instance: a child matches when some
/// instance satisfies the time-range and every nested filter.
fn comp_filter_matches(
    parent: &Component,
    parent_span: Option<Span>,
    filter: &CompFilter,
    resolver: &mut TimeZoneResolver,
) -> bool {
    match &filter.test {
        CompFilterTest::IsNotDefined => parent.components_named(&filter.name).next().is_none(),
        CompFilterTest::Matches {
            time_range,
            prop_filters,
            comp_filters,
        } => {
            let range = match time_range {
                None => None,
                Some(TimeRangeFilter::Valid(range)) => Some(range),
                Some(TimeRangeFilter::Malformed(reason)) => {
                    tracing::debug!(%reason, "Malformed time-range never matches");
                    return false;
                }
            };

            candidates(parent, &filter.name, range, resolver)
                .into_iter()
                .any(|instance| {
                    let span = Span::of_instance(instance.component, instance.start, resolver);
                    range.is_none_or(|r| {
                        instance_overlaps(instance.component, instance.start, r, parent_span, resolver)
                    }) && prop_filters
                        .iter()
                        .all(|pf| prop_filter_matches(instance.component, pf, resolver))
                        && comp_filters
                            .iter()
                            .all(|cf| comp_filter_matches(instance.component, span, cf, resolver))
                })
        }
    }
}

/// Instances of the children named `name`, expanded within `range` when
/// the component type recurs.
fn candidates<'a>(
    parent: &'a Component,
    name: &str,
    range: Option<&TimeRange>,
    resolver: &mut TimeZoneResolver,
) -> Vec<Instance<'a>> {
    if RECURRING_COMPONENTS.iter().any(|c| c.eq_ignore_ascii_case(name)) {
        return RecurrenceSet::group(parent, name)
            .iter()
            .flat_map(|set| set.instances(range, resolver))
            .collect();
    }

    parent
        .components_named(name)
        .map(|component| Instance {
            component,
            start: component
                .property("DTSTART")
                .and_then(|line| parse_date_value(line, resolver)),
            recurrence_id: None,
        })
        .collect()
}
