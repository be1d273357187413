//! RFC 4790 collations for `text-match` evaluation.

use std::borrow::Cow;

use icu::casemap::CaseMapper;
use kunai_rfc::rfc::dav::core::{MatchType, TextMatch};

/// Collation named by a `text-match`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Casemap {
    /// Case-sensitive (i;octet).
    Octet,
    /// ASCII-only casemap (i;ascii-casemap).
    Ascii,
    /// Unicode casemap (i;unicode-casemap), the default.
    Unicode,
}

impl Casemap {
    /// Resolves a collation name; `None` for collations this server does not know.
    #[must_use]
    pub fn from_collation(collation: Option<&str>) -> Option<Self> {
        match collation {
            Some("i;octet") => Some(Self::Octet),
            Some("i;unicode-casemap") | None => Some(Self::Unicode),
            Some("i;ascii-casemap") => Some(Self::Ascii),
            Some(_) => None,
        }
    }

    /// ## Summary
    /// Folds text for comparison.
    ///
    /// `i;ascii-casemap` lowercases ASCII letters only, so `ß` stays `ß`;
    /// `i;unicode-casemap` applies full ICU case folding, so `ß` becomes `ss`.
    #[must_use]
    pub fn fold(self, text: &str) -> Cow<'_, str> {
        match self {
            Self::Octet => Cow::Borrowed(text),
            Self::Ascii => Cow::Owned(text.to_ascii_lowercase()),
            Self::Unicode => Cow::Owned(CaseMapper::new().fold_string(text).into_owned()),
        }
    }
}

/// ## Summary
/// Evaluates a `text-match` against one value.
///
/// An unknown collation never matches, even when negated.
#[must_use]
pub fn text_matches(text: &str, text_match: &TextMatch) -> bool {
    let Some(casemap) = Casemap::from_collation(text_match.collation.as_deref()) else {
        tracing::debug!(
            collation = ?text_match.collation,
            "Unsupported collation; treating text-match as non-matching"
        );
        return false;
    };

    let haystack = casemap.fold(text);
    let needle = casemap.fold(&text_match.value);

    let matched = match text_match.match_type {
        MatchType::Equals => haystack == needle,
        MatchType::Contains => haystack.contains(needle.as_ref()),
        MatchType::StartsWith => haystack.starts_with(needle.as_ref()),
        MatchType::EndsWith => haystack.ends_with(needle.as_ref()),
    };

    matched != text_match.negate
}
