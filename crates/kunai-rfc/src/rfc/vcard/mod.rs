//! vCard (RFC 6350) handling: `address-data` projection and birthdays.
//!
//! vCard shares the content-line grammar with iCalendar, so cards are parsed
//! into the same component tree.

use chrono::NaiveDate;

use crate::rfc::dav::core::{AddressDataRequest, PropSelection};
use crate::rfc::ical::{Component, ParseError, ParseErrorKind, ParseResult, parse_components};

/// Properties kept under any `address-data` selection.
const MANDATORY_PROPERTIES: [&str; 3] = ["VERSION", "FN", "UID"];

/// ## Summary
/// Parses every `VCARD` in `input`.
///
/// ## Errors
/// Returns an error for malformed text or when no card is present.
pub fn parse_vcards(input: &str) -> ParseResult<Vec<Component>> {
    let cards: Vec<Component> = parse_components(input)?
        .into_iter()
        .filter(|c| c.is("VCARD"))
        .collect();
    if cards.is_empty() {
        return Err(ParseError::new(ParseErrorKind::MissingRoot, 1, 1));
    }
    Ok(cards)
}

/// ## Summary
/// Restricts a stored vCard to the requested properties (RFC 6352 §10.4).
///
/// `BEGIN`/`END`, `VERSION`, `FN` and `UID` always survive. An unrestricted
/// request returns `raw` unchanged.
///
/// ## Errors
/// Returns an error if `raw` is not a parseable vCard.
pub fn project_address_data(raw: &str, request: &AddressDataRequest) -> ParseResult<String> {
    let PropSelection::Only(names) = &request.props else {
        return Ok(raw.to_string());
    };

    let mut out = String::with_capacity(raw.len());
    for card in parse_vcards(raw)? {
        let mut kept = card.empty_like();
        for line in card.properties() {
            let keep = MANDATORY_PROPERTIES.iter().any(|m| line.is(m))
                || names.iter().any(|n| line.is(n));
            if keep {
                kept.push_property(line.clone());
            }
        }
        kept.write_to(&mut out);
    }
    Ok(out)
}

/// A contact's birthday; the year is optional in vCard 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Birthday {
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
}

impl Birthday {
    /// Date of birth; yearless birthdays are placed in the leap year 1972.
    #[must_use]
    pub fn anchor_date(&self) -> Option<NaiveDate> {
        let year = self.year.unwrap_or(1972);
        NaiveDate::from_ymd_opt(year, self.month, self.day)
    }
}

/// ## Summary
/// Reads `BDAY` from a card. Accepts `YYYYMMDD`, `YYYY-MM-DD`, `--MMDD`,
/// `--MM-DD`, and date-times (the time is ignored). Text values are skipped.
#[must_use]
pub fn birthday(card: &Component) -> Option<Birthday> {
    let line = card.property("BDAY")?;
    if line
        .param_value("VALUE")
        .is_some_and(|v| v.eq_ignore_ascii_case("text"))
    {
        return None;
    }

    let value = line.value.trim();
    let date = value.split('T').next().unwrap_or(value);
    let (year, rest) = match date.strip_prefix("--") {
        Some(rest) => (None, rest.replace('-', "")),
        None => {
            let digits = date.replace('-', "");
            if digits.len() != 8 {
                return None;
            }
            (Some(digits[..4].parse::<i32>().ok()?), digits[4..].to_string())
        }
    };

    if rest.len() != 4 || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let month = rest[..2].parse().ok()?;
    let day = rest[2..].parse().ok()?;

    let birthday = Birthday { year, month, day };
    birthday.anchor_date().map(|_| birthday)
}
