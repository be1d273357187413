//! REPORT request parsing.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::xml::{XmlElement, parse_document};
use super::{parse_prop_names, parse_time_range, parse_time_range_filter};
use crate::rfc::dav::core::{
    AddressbookFilter, AddressbookQuery, CALDAV_NS, CARDDAV_NS, CalendarQuery, CompFilter,
    CompFilterTest, DAV_NS, ExpandProperty, ExpandPropertyItem, FilterTest, FreeBusyQuery, Href,
    MatchType, Multiget, Namespace, ParamFilter, ParamFilterTest, PropFilter, PropFilterTest,
    PropertyName, QName, ReportRequest, ReportType, SyncCollection, SyncLevel, TextMatch,
};

/// ## Summary
/// Parses a REPORT request body.
///
/// ## Errors
/// Returns an error if the XML is malformed or unsafe, a required element or
/// attribute is missing, or the root names a report this server does not
/// implement (`ParseErrorKind::UnsupportedReport`).
pub fn parse_report(xml: &[u8]) -> ParseResult<ReportRequest> {
    let root = parse_document(xml)?;
    let properties = requested_properties(&root)?;

    let report_type = if root.is(CALDAV_NS, "calendar-query") {
        ReportType::CalendarQuery(parse_calendar_query(&root)?)
    } else if root.is(CALDAV_NS, "calendar-multiget") {
        ReportType::CalendarMultiget(parse_multiget(&root))
    } else if root.is(CALDAV_NS, "free-busy-query") {
        ReportType::FreeBusyQuery(parse_free_busy_query(&root)?)
    } else if root.is(CARDDAV_NS, "addressbook-query") {
        ReportType::AddressbookQuery(parse_addressbook_query(&root)?)
    } else if root.is(CARDDAV_NS, "addressbook-multiget") {
        ReportType::AddressbookMultiget(parse_multiget(&root))
    } else if root.is(DAV_NS, "sync-collection") {
        ReportType::SyncCollection(parse_sync_collection(&root)?)
    } else if root.is(DAV_NS, "expand-property") {
        ReportType::ExpandProperty(ExpandProperty {
            properties: parse_expand_items(&root)?,
        })
    } else {
        return Err(ParseError::new(
            ParseErrorKind::UnsupportedReport,
            format!("unsupported report: {}", root.name),
        ));
    };

    Ok(ReportRequest::new(report_type, properties))
}

fn requested_properties(root: &XmlElement) -> ParseResult<Vec<PropertyName>> {
    match root.child(DAV_NS, "prop") {
        Some(prop) => parse_prop_names(prop),
        None => Ok(Vec::new()),
    }
}

fn parse_limit(root: &XmlElement, ns: &str) -> ParseResult<Option<u32>> {
    let Some(nresults) = root
        .child(ns, "limit")
        .and_then(|limit| limit.child(ns, "nresults"))
    else {
        return Ok(None);
    };

    let text = nresults.text();
    text.parse::<u32>()
        .map(Some)
        .map_err(|e| ParseError::invalid_value(format!("invalid nresults {text:?}: {e}")))
}

fn parse_calendar_query(root: &XmlElement) -> ParseResult<CalendarQuery> {
    let filter = match root.child(CALDAV_NS, "filter") {
        Some(filter) => {
            let mut comps = filter.children_named(CALDAV_NS, "comp-filter");
            let top = comps
                .next()
                .ok_or_else(|| ParseError::missing_element("comp-filter"))?;
            if comps.next().is_some() {
                return Err(ParseError::invalid_value(
                    "filter must contain exactly one comp-filter",
                ));
            }
            parse_comp_filter(top)?
        }
        None => CompFilter::new("VCALENDAR"),
    };

    Ok(CalendarQuery {
        filter,
        timezone: root
            .child(CALDAV_NS, "timezone")
            .map(XmlElement::text)
            .filter(|tz| !tz.is_empty()),
        limit: parse_limit(root, CALDAV_NS)?,
    })
}

fn parse_comp_filter(el: &XmlElement) -> ParseResult<CompFilter> {
    let name = required_name(el)?;

    if el.child(CALDAV_NS, "is-not-defined").is_some() {
        return Ok(CompFilter::not_defined(name));
    }

    Ok(CompFilter {
        name,
        test: CompFilterTest::Matches {
            time_range: el
                .child(CALDAV_NS, "time-range")
                .map(parse_time_range_filter),
            prop_filters: el
                .children_named(CALDAV_NS, "prop-filter")
                .map(|p| parse_prop_filter(p, CALDAV_NS))
                .collect::<ParseResult<_>>()?,
            comp_filters: el
                .children_named(CALDAV_NS, "comp-filter")
                .map(parse_comp_filter)
                .collect::<ParseResult<_>>()?,
        },
    })
}

fn parse_prop_filter(el: &XmlElement, ns: &str) -> ParseResult<PropFilter> {
    let name = required_name(el)?;

    if el.child(ns, "is-not-defined").is_some() {
        return Ok(PropFilter::not_defined(name));
    }

    // CalDAV prop-filters are conjunctions; CardDAV defaults to anyof.
    let default_test = if ns == CARDDAV_NS {
        FilterTest::AnyOf
    } else {
        FilterTest::AllOf
    };

    Ok(PropFilter {
        name,
        test: PropFilterTest::Matches {
            time_range: if ns == CALDAV_NS {
                el.child(ns, "time-range").map(parse_time_range_filter)
            } else {
                None
            },
            text_matches: el
                .children_named(ns, "text-match")
                .map(parse_text_match)
                .collect::<ParseResult<_>>()?,
            param_filters: el
                .children_named(ns, "param-filter")
                .map(|p| parse_param_filter(p, ns))
                .collect::<ParseResult<_>>()?,
            test: parse_filter_test(el)?.unwrap_or(default_test),
        },
    })
}

fn parse_param_filter(el: &XmlElement, ns: &str) -> ParseResult<ParamFilter> {
    let name = required_name(el)?;

    if el.child(ns, "is-not-defined").is_some() {
        return Ok(ParamFilter {
            name,
            test: ParamFilterTest::IsNotDefined,
        });
    }

    Ok(ParamFilter {
        name,
        test: ParamFilterTest::Matches {
            text_match: el.child(ns, "text-match").map(parse_text_match).transpose()?,
        },
    })
}

fn parse_text_match(el: &XmlElement) -> ParseResult<TextMatch> {
    let match_type = match el.attr("match-type") {
        Some(value) => MatchType::parse(value)
            .ok_or_else(|| ParseError::invalid_value(format!("invalid match-type: {value}")))?,
        None => MatchType::Contains,
    };

    let negate = match el.attr("negate-condition") {
        Some("yes" | "true") => true,
        Some("no" | "false") | None => false,
        Some(other) => {
            return Err(ParseError::invalid_value(format!(
                "invalid negate-condition: {other}"
            )));
        }
    };

    Ok(TextMatch {
        value: el.text(),
        collation: el.attr("collation").map(str::to_string),
        match_type,
        negate,
    })
}

fn parse_filter_test(el: &XmlElement) -> ParseResult<Option<FilterTest>> {
    match el.attr("test") {
        Some("anyof") => Ok(Some(FilterTest::AnyOf)),
        Some("allof") => Ok(Some(FilterTest::AllOf)),
        Some(other) => Err(ParseError::invalid_value(format!(
            "invalid filter test: {other}"
        ))),
        None => Ok(None),
    }
}

fn required_name(el: &XmlElement) -> ParseResult<String> {
    el.attr("name")
        .map(str::to_string)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::missing_attribute("name"))
}

fn parse_multiget(root: &XmlElement) -> Multiget {
    Multiget {
        hrefs: root
            .children_named(DAV_NS, "href")
            .map(|h| Href::new(h.text()))
            .filter(|h| !h.as_str().is_empty())
            .collect(),
    }
}

fn parse_free_busy_query(root: &XmlElement) -> ParseResult<FreeBusyQuery> {
    Ok(FreeBusyQuery {
        time_range: root
            .child(CALDAV_NS, "time-range")
            .map(parse_time_range)
            .transpose()?,
    })
}

fn parse_addressbook_query(root: &XmlElement) -> ParseResult<AddressbookQuery> {
    let filter = match root.child(CARDDAV_NS, "filter") {
        Some(filter) => AddressbookFilter {
            test: parse_filter_test(filter)?.unwrap_or_default(),
            prop_filters: filter
                .children_named(CARDDAV_NS, "prop-filter")
                .map(|p| parse_prop_filter(p, CARDDAV_NS))
                .collect::<ParseResult<_>>()?,
        },
        None => AddressbookFilter::match_all(),
    };

    Ok(AddressbookQuery {
        filter,
        limit: parse_limit(root, CARDDAV_NS)?,
    })
}

fn parse_sync_collection(root: &XmlElement) -> ParseResult<SyncCollection> {
    let sync_level = match root.child(DAV_NS, "sync-level").map(XmlElement::text) {
        None => SyncLevel::One,
        Some(level) if level == "1" => SyncLevel::One,
        Some(level) if level.eq_ignore_ascii_case("infinite") => SyncLevel::Infinite,
        Some(level) => {
            return Err(ParseError::invalid_value(format!(
                "invalid sync-level: {level}"
            )));
        }
    };

    Ok(SyncCollection {
        sync_token: root
            .child(DAV_NS, "sync-token")
            .map(XmlElement::text)
            .unwrap_or_default(),
        sync_level,
        limit: parse_limit(root, DAV_NS)?,
    })
}

fn parse_expand_items(el: &XmlElement) -> ParseResult<Vec<ExpandPropertyItem>> {
    el.children_named(DAV_NS, "property")
        .map(|property| {
            let name = required_name(property)?;
            let namespace = property
                .attr("namespace")
                .map_or(Namespace::DAV, |ns| Namespace::from(ns.to_string()));
            Ok(ExpandPropertyItem {
                name: QName::new(namespace, name),
                properties: parse_expand_items(property)?,
            })
        })
        .collect()
}
