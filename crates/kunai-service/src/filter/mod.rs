//! Filter evaluation for `calendar-query` and `addressbook-query`.
//!
//! Filters are evaluated in memory against parsed component trees. Every
//! predicate fails closed: a malformed time-range or an unknown collation
//! makes its predicate false without failing the request.

mod calendar;
mod card;
pub mod time_range;

pub use calendar::calendar_matches;
pub use card::card_matches;

use kunai_rfc::rfc::dav::core::{
    FilterTest, ParamFilter, ParamFilterTest, PropFilter, PropFilterTest, TimeRangeFilter,
};
use kunai_rfc::rfc::ical::core::{DateValue, parse_date_value};
use kunai_rfc::rfc::ical::expand::TimeZoneResolver;
use kunai_rfc::rfc::ical::{Component, ContentLine};

use crate::text_match::text_matches;

/// ## Summary
/// Evaluates a `prop-filter` against the properties of one component.
///
/// `is-not-defined` matches when no property of that name exists; otherwise
/// some property of that name must satisfy the filter's predicates, combined
/// by its `test` attribute.
pub(crate) fn prop_filter_matches(
    component: &Component,
    filter: &PropFilter,
    resolver: &mut TimeZoneResolver,
) -> bool {
    match &filter.test {
        PropFilterTest::IsNotDefined => component.property(&filter.name).is_none(),
        PropFilterTest::Matches {
            time_range,
            text_matches: texts,
            param_filters,
            test,
        } => component.properties_named(&filter.name).any(|line| {
            let mut outcomes = Vec::with_capacity(texts.len() + param_filters.len() + 1);
            if let Some(range) = time_range {
                outcomes.push(property_in_range(line, range, resolver));
            }
            let value = line.text_value();
            outcomes.extend(texts.iter().map(|tm| text_matches(&value, tm)));
            outcomes.extend(param_filters.iter().map(|pf| param_filter_matches(line, pf)));
            combine(*test, &outcomes)
        }),
    }
}

fn property_in_range(
    line: &ContentLine,
    range: &TimeRangeFilter,
    resolver: &mut TimeZoneResolver,
) -> bool {
    let TimeRangeFilter::Valid(range) = range else {
        return false;
    };
    parse_date_value(line, resolver)
        .map(DateValue::to_utc)
        .is_some_and(|at| range.contains(at))
}

fn param_filter_matches(line: &ContentLine, filter: &ParamFilter) -> bool {
    let param = line.param(&filter.name);
    match &filter.test {
        ParamFilterTest::IsNotDefined => param.is_none(),
        ParamFilterTest::Matches { text_match } => param.is_some_and(|p| {
            text_match
                .as_ref()
                .is_none_or(|tm| p.values.iter().any(|v| text_matches(v, tm)))
        }),
    }
}

/// Predicates of an empty filter always hold.
fn combine(test: FilterTest, outcomes: &[bool]) -> bool {
    match test {
        FilterTest::AllOf => outcomes.iter().all(|b| *b),
        FilterTest::AnyOf => outcomes.is_empty() || outcomes.iter().any(|b| *b),
    }
}
