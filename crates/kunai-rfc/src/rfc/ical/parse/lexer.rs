//! Content line lexer (RFC 5545 §3.1, RFC 6350 §3.3).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{ContentLine, Parameter};

/// A logical line: its unfolded text, the physical text it spans, and the
/// 1-based number of its first physical line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub line_num: usize,
    pub unfolded: String,
    pub raw: String,
}

/// ## Summary
/// Splits input into logical lines, merging folded continuations.
///
/// Handles both CRLF and bare LF line endings. A line starting with SP or
/// HTAB continues the previous one; unfolding drops the line break and that
/// single whitespace character. Blank lines are skipped.
#[must_use]
pub fn split_lines(input: &str) -> Vec<LogicalLine> {
    let mut lines: Vec<LogicalLine> = Vec::new();

    for (i, physical) in input.split('\n').enumerate() {
        let line = physical.strip_suffix('\r').unwrap_or(physical);
        if line.is_empty() {
            continue;
        }

        if let Some(continuation) = line.strip_prefix([' ', '\t'])
            && let Some(prev) = lines.last_mut()
        {
            prev.unfolded.push_str(continuation);
            prev.raw.push_str("\r\n");
            prev.raw.push_str(line);
            continue;
        }

        lines.push(LogicalLine {
            line_num: i + 1,
            unfolded: line.to_string(),
            raw: line.to_string(),
        });
    }

    lines
}

/// ## Summary
/// Parses a single unfolded content line.
///
/// Format: `name *(";" param) ":" value`. Group prefixes (`item1.EMAIL`)
/// are stripped from the name.
///
/// ## Errors
/// Returns an error if the line is malformed.
pub fn parse_content_line(logical: &LogicalLine) -> ParseResult<ContentLine> {
    let line = logical.unfolded.as_str();
    let line_num = logical.line_num;
    let mut chars = line.char_indices().peekable();
    let mut name_end = None;
    let mut at_colon = false;

    while let Some(&(i, c)) = chars.peek() {
        if c == ';' || c == ':' {
            name_end = Some(i);
            at_colon = c == ':';
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' && c != '.' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidPropertyName,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }

    let name_end = match name_end {
        Some(0) => {
            return Err(ParseError::new(
                ParseErrorKind::MissingPropertyName,
                line_num,
                1,
            ));
        }
        Some(end) => end,
        None => {
            return Err(ParseError::new(
                ParseErrorKind::MissingColon,
                line_num,
                line.len(),
            ));
        }
    };

    let full_name = &line[..name_end];
    let name = full_name
        .rsplit('.')
        .next()
        .unwrap_or(full_name)
        .to_ascii_uppercase();

    let mut params = Vec::new();
    while !at_colon {
        let (param, next_is_colon) = parse_parameter(&mut chars, line, line_num)?;
        params.push(param);
        at_colon = next_is_colon;
    }

    let value = chars
        .peek()
        .map_or("", |&(i, _)| &line[i..])
        .to_string();

    Ok(ContentLine {
        name,
        params,
        value,
        raw: logical.raw.clone(),
    })
}

type Chars<'a> = std::iter::Peekable<std::str::CharIndices<'a>>;

/// Parses one parameter; returns it and whether the value separator follows.
fn parse_parameter(
    chars: &mut Chars<'_>,
    line: &str,
    line_num: usize,
) -> ParseResult<(Parameter, bool)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    let mut name_end = start;
    while let Some(&(i, c)) = chars.peek() {
        if c == '=' {
            name_end = i;
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidParameter,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }

    if name_end == start {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            start + 1,
        ));
    }

    let param_name = &line[start..name_end];

    let mut values = Vec::new();
    loop {
        values.push(parse_param_value(chars, line, line_num)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((Parameter::with_values(param_name, values), false)),
            Some((_, ':')) => return Ok((Parameter::with_values(param_name, values), true)),
            Some((i, c)) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                        .with_context(format!("unexpected character '{c}'")),
                );
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    line.len(),
                ));
            }
        }
    }
}

/// Parses a parameter value, possibly quoted, decoding RFC 6868 carets.
fn parse_param_value(chars: &mut Chars<'_>, line: &str, line_num: usize) -> ParseResult<String> {
    let Some(&(start, first)) = chars.peek() else {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            line.len(),
        ));
    };

    let quoted = first == '"';
    if quoted {
        chars.next();
    }

    let mut value = String::new();
    while let Some(&(_, c)) = chars.peek() {
        if quoted && c == '"' {
            chars.next();
            return Ok(value);
        }
        if !quoted && matches!(c, ',' | ';' | ':') {
            return Ok(value);
        }
        chars.next();

        if c == '^' {
            match chars.peek().map(|&(_, next)| next) {
                Some('^') => value.push('^'),
                Some('n') => value.push('\n'),
                Some('\'') => value.push('"'),
                _ => {
                    value.push('^');
                    continue;
                }
            }
            chars.next();
        } else {
            value.push(c);
        }
    }

    if quoted {
        return Err(ParseError::new(
            ParseErrorKind::UnclosedQuote,
            line_num,
            start + 1,
        ));
    }
    Ok(value)
}
