//! Content lines (RFC 5545 §3.1).

use crate::rfc::ical::build::fold_line;

/// A property parameter with one or more values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    pub values: Vec<String>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// First value, which is the only one for most parameters.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// A logical content line together with the physical text it came from.
///
/// `raw` holds the line exactly as authored, folds included, without the
/// trailing line break. Projection writes `raw` back out so kept lines are
/// byte-identical to the stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Value after unfolding, before unescaping.
    pub value: String,
    pub raw: String,
}

impl ContentLine {
    /// ## Summary
    /// Builds a line that did not come from stored data. Its `raw` text is
    /// serialized and folded at 75 octets.
    #[must_use]
    pub fn generated(
        name: impl Into<String>,
        params: Vec<Parameter>,
        value: impl Into<String>,
    ) -> Self {
        let name = name.into().to_ascii_uppercase();
        let value = value.into();
        let mut logical = name.clone();
        for param in &params {
            logical.push(';');
            logical.push_str(&param.name);
            logical.push('=');
            let rendered: Vec<String> = param.values.iter().map(|v| quote_param(v)).collect();
            logical.push_str(&rendered.join(","));
        }
        logical.push(':');
        logical.push_str(&value);

        Self {
            name,
            params,
            value,
            raw: fold_line(&logical),
        }
    }

    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Parameter::value)
    }

    /// The value with TEXT escapes (RFC 5545 §3.3.11) resolved.
    #[must_use]
    pub fn text_value(&self) -> String {
        let mut out = String::with_capacity(self.value.len());
        let mut chars = self.value.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('n' | 'N') => out.push('\n'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        }
        out
    }
}

/// Quotes a parameter value when it contains separators, applying RFC 6868
/// caret encoding.
fn quote_param(value: &str) -> String {
    let encoded = value
        .replace('^', "^^")
        .replace('\n', "^n")
        .replace('"', "^'");
    if encoded.contains([':', ';', ',']) {
        format!("\"{encoded}\"")
    } else {
        encoded
    }
}
