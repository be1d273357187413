//! iCalendar/vCard text parse errors.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    MissingPropertyName,
    InvalidPropertyName,
    InvalidParameter,
    UnclosedQuote,
    MissingColon,
    /// `END` without matching `BEGIN`, or a mismatched name.
    UnbalancedComponent,
    /// Input ended inside a component.
    UnterminatedComponent,
    /// A property line outside any component.
    PropertyOutsideComponent,
    /// No top-level component of the expected kind.
    MissingRoot,
}

impl ParseErrorKind {
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::MissingPropertyName => "missing property name",
            Self::InvalidPropertyName => "invalid character in property name",
            Self::InvalidParameter => "invalid parameter",
            Self::UnclosedQuote => "unclosed quoted parameter value",
            Self::MissingColon => "missing ':' separator",
            Self::UnbalancedComponent => "END does not match BEGIN",
            Self::UnterminatedComponent => "component not closed before end of input",
            Self::PropertyOutsideComponent => "property outside of any component",
            Self::MissingRoot => "missing top-level component",
        }
    }
}

/// Error with the 1-based physical line and column where it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub column: usize,
    pub context: Option<String>,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: ParseErrorKind, line: usize, column: usize) -> Self {
        Self {
            kind,
            line,
            column,
            context: None,
        }
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.line,
            self.column,
            self.kind.description()
        )?;
        if let Some(context) = &self.context {
            write!(f, " ({context})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

pub type ParseResult<T> = Result<T, ParseError>;
