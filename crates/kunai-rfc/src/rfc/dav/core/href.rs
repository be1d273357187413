//! DAV href type.

use std::fmt;

/// A `DAV:href` value: an absolute path on this server.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Href(pub String);

impl Href {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.0.ends_with('/')
    }

    /// Last path segment, ignoring a trailing slash.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        let path = self.0.trim_end_matches('/');
        path.rsplit('/').next().filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn join(&self, child: &str) -> Self {
        let child = child.trim_start_matches('/');
        if self.0.ends_with('/') {
            Self(format!("{}{child}", self.0))
        } else {
            Self(format!("{}/{child}", self.0))
        }
    }

    /// Percent-decoded path, with an absolute URL reduced to its path.
    #[must_use]
    pub fn decode(&self) -> String {
        let path = strip_origin(&self.0);
        percent_decode(path)
    }
}

impl fmt::Display for Href {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Href {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Href {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Clients may send `http://host/path` in multiget bodies.
fn strip_origin(value: &str) -> &str {
    let Some(rest) = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))
    else {
        return value;
    };
    rest.find('/').map_or("/", |i| &rest[i..])
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && let (Some(hi), Some(lo)) = (
                bytes.get(i + 1).and_then(|b| hex_value(*b)),
                bytes.get(i + 2).and_then(|b| hex_value(*b)),
            )
        {
            out.push(hi << 4 | lo);
            i += 3;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_adds_separator() {
        let base = Href::new("/api/dav/cal/alice/work/");
        assert_eq!(base.join("a.ics").as_str(), "/api/dav/cal/alice/work/a.ics");
        let base = Href::new("/api/dav/cal/alice/work");
        assert_eq!(base.join("/a.ics").as_str(), "/api/dav/cal/alice/work/a.ics");
    }

    #[test]
    fn name_ignores_trailing_slash() {
        assert_eq!(Href::new("/a/b/").name(), Some("b"));
        assert_eq!(Href::new("/a/b.ics").name(), Some("b.ics"));
        assert_eq!(Href::new("/").name(), None);
    }

    #[test]
    fn decode_handles_percent_and_origin() {
        assert_eq!(Href::new("/x/a%40b.ics").decode(), "/x/a@b.ics");
        assert_eq!(Href::new("https://dav.example.com/x/y.ics").decode(), "/x/y.ics");
        assert_eq!(Href::new("/x/100%").decode(), "/x/100%");
    }
}
