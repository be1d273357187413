//! iCalendar (RFC 5545) handling.
//!
//! - `core`: component tree, content lines and value types
//! - `parse`: content-line lexer and tree builder
//! - `build`: line folding for generated output
//! - `expand`: time zones and recurrence sets
//! - `project`: `calendar-data` projection

pub mod build;
pub mod core;
pub mod expand;
pub mod parse;
mod project;

pub use core::{Component, ContentLine, DateValue, Node, Parameter};
pub use parse::{ParseError, ParseErrorKind, ParseResult, parse_calendar, parse_components};
pub use project::project_calendar_data;
