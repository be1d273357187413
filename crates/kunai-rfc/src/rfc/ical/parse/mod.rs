//! Parsing of iCalendar and vCard text into component trees.

mod error;
mod lexer;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{LogicalLine, parse_content_line, split_lines};

use crate::rfc::ical::core::Component;

/// ## Summary
/// Parses every top-level component in `input`.
///
/// `BEGIN`/`END` keywords match case-insensitively; the component name is
/// kept as authored.
///
/// ## Errors
/// Returns an error for malformed content lines, unbalanced components, or
/// properties outside any component.
pub fn parse_components(input: &str) -> ParseResult<Vec<Component>> {
    let mut roots = Vec::new();
    let mut stack: Vec<Component> = Vec::new();
    let mut last_line = 0;

    for logical in split_lines(input) {
        last_line = logical.line_num;
        let line = parse_content_line(&logical)?;

        if line.is("BEGIN") && line.params.is_empty() {
            let mut component = Component::new(line.value.trim());
            component.begin = logical.raw;
            stack.push(component);
        } else if line.is("END") && line.params.is_empty() {
            let Some(mut done) = stack.pop() else {
                return Err(ParseError::new(
                    ParseErrorKind::UnbalancedComponent,
                    logical.line_num,
                    1,
                ));
            };
            if !done.is(line.value.trim()) {
                return Err(ParseError::new(
                    ParseErrorKind::UnbalancedComponent,
                    logical.line_num,
                    1,
                )
                .with_context(format!("expected END:{}", done.name)));
            }
            done.end = logical.raw;
            match stack.last_mut() {
                Some(parent) => parent.push_component(done),
                None => roots.push(done),
            }
        } else {
            let Some(current) = stack.last_mut() else {
                return Err(ParseError::new(
                    ParseErrorKind::PropertyOutsideComponent,
                    logical.line_num,
                    1,
                ));
            };
            current.push_property(line);
        }
    }

    if let Some(open) = stack.last() {
        return Err(
            ParseError::new(ParseErrorKind::UnterminatedComponent, last_line, 1)
                .with_context(open.name.clone()),
        );
    }

    Ok(roots)
}

/// ## Summary
/// Parses an iCalendar object with exactly one `VCALENDAR` root.
///
/// ## Errors
/// Returns an error when parsing fails or the root is missing.
pub fn parse_calendar(input: &str) -> ParseResult<Component> {
    parse_components(input)?
        .into_iter()
        .find(|root| root.is("VCALENDAR"))
        .ok_or_else(|| ParseError::new(ParseErrorKind::MissingRoot, 1, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//Test//EN\r\n\
begin:vevent\r\n\
UID:e1\r\n\
SUMMARY:Folded\r\n  summary\r\n\
BEGIN:VALARM\r\n\
TRIGGER:-PT15M\r\n\
END:VALARM\r\n\
end:vevent\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn builds_tree_and_round_trips() {
        let root = parse_calendar(SAMPLE).unwrap();
        assert!(root.is("VCALENDAR"));
        let event = root.components_named("VEVENT").next().unwrap();
        assert_eq!(event.name, "vevent");
        assert_eq!(event.uid(), Some("e1"));
        assert_eq!(event.property("SUMMARY").unwrap().value, "Folded summary");
        assert_eq!(event.components_named("VALARM").count(), 1);
        assert_eq!(root.to_text(), SAMPLE);
    }

    #[test]
    fn mismatched_end_is_an_error() {
        let err = parse_calendar("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\nEND:VTODO\r\nEND:VCALENDAR\r\n")
            .unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedComponent);
    }

    #[test]
    fn unterminated_is_an_error() {
        let err = parse_calendar("BEGIN:VCALENDAR\r\nVERSION:2.0\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedComponent);
    }

    #[test]
    fn stray_property_is_an_error() {
        let err = parse_components("VERSION:2.0\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::PropertyOutsideComponent);
    }

    #[test]
    fn missing_vcalendar_root() {
        let err = parse_calendar("BEGIN:VCARD\r\nFN:A\r\nEND:VCARD\r\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingRoot);
    }

    #[test]
    fn multiple_roots() {
        let roots = parse_components(
            "BEGIN:VCARD\nFN:A\nEND:VCARD\nBEGIN:VCARD\nFN:B\nEND:VCARD\n",
        )
        .unwrap();
        assert_eq!(roots.len(), 2);
    }
}
