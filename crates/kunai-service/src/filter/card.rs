//! `CARDDAV:filter` evaluation (RFC 6352 §10.5).

use kunai_rfc::rfc::dav::core::{AddressbookFilter, FilterTest};
use kunai_rfc::rfc::ical::expand::TimeZoneResolver;
use kunai_rfc::rfc::ical::Component;

use super::prop_filter_matches;

/// ## Summary
/// Whether a vCard satisfies an `addressbook-query` filter.
///
/// An empty filter matches every card; otherwise the prop-filters are
/// combined by the filter's `test` attribute.
#[must_use]
pub fn card_matches(card: &Component, filter: &AddressbookFilter) -> bool {
    if filter.prop_filters.is_empty() {
        return true;
    }

    let mut resolver = TimeZoneResolver::default();
    let mut results = filter
        .prop_filters
        .iter()
        .map(|pf| prop_filter_matches(card, pf, &mut resolver));

    match filter.test {
        FilterTest::AnyOf => results.any(|b| b),
        FilterTest::AllOf => results.all(|b| b),
    }
}
