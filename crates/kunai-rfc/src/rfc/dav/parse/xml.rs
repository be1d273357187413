//! Entity-safe XML reader producing an owned element tree.
//!
//! Request bodies are untrusted. The reader never expands DTD-declared or
//! external entities: a `DOCTYPE` carrying entity declarations or external
//! identifiers is rejected, as is any reference to a non-built-in entity.
//! The five predefined entities and numeric character references are
//! decoded normally.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::error::{ParseError, ParseResult};
use crate::rfc::dav::core::{DAV_NS, Namespace, QName};

/// Maximum element nesting accepted from clients.
const MAX_DEPTH: usize = 64;

/// A parsed XML element with namespace-resolved name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: QName,
    /// Attributes keyed by local name.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

impl XmlElement {
    #[must_use]
    pub fn is(&self, namespace: &str, local_name: &str) -> bool {
        self.name.is(namespace, local_name)
    }

    #[must_use]
    pub fn attr(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == local_name)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(el) => Some(el),
            XmlNode::Text(_) => None,
        })
    }

    #[must_use]
    pub fn child(&self, namespace: &str, local_name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.is(namespace, local_name))
    }

    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        local_name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.elements().filter(move |el| el.is(namespace, local_name))
    }

    /// Concatenated direct text content, trimmed.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let XmlNode::Text(t) = node {
                out.push_str(t);
            }
        }
        out.trim().to_string()
    }
}

/// ## Summary
/// Parses an untrusted XML document into its root element.
///
/// ## Errors
/// Returns `ParseError` for malformed XML, unbalanced tags, excessive
/// nesting, entity declarations, or references to unknown entities.
pub fn parse_document(xml: &[u8]) -> ParseResult<XmlElement> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().expand_empty_elements = true;

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut scopes: Vec<Vec<(String, String)>> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if root.is_some() {
                    return Err(ParseError::xml("content after root element"));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(ParseError::invalid_value("XML nesting too deep"));
                }
                let (element, scope) = open_element(&e, &scopes)?;
                scopes.push(scope);
                stack.push(element);
            }
            Event::End(_) => {
                scopes.pop();
                let Some(done) = stack.pop() else {
                    return Err(ParseError::xml("unbalanced end tag"));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(XmlNode::Element(done)),
                    None => root = Some(done),
                }
            }
            Event::Text(t) => {
                let text = reader.decoder().decode(&t)?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(c) => {
                let text = reader.decoder().decode(&c)?;
                push_text(&mut stack, &text)?;
            }
            Event::GeneralRef(entity) => {
                let resolved = resolve_entity(&entity)?;
                push_text(&mut stack, &resolved)?;
            }
            Event::DocType(d) => {
                let decl = reader.decoder().decode(&d)?;
                reject_unsafe_doctype(&decl)?;
            }
            Event::Eof => break,
            Event::Empty(_) | Event::Decl(_) | Event::PI(_) | Event::Comment(_) => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(ParseError::xml("unexpected end of document"));
    }

    root.ok_or_else(|| ParseError::missing_element("document root"))
}

fn push_text(stack: &mut [XmlElement], text: &str) -> ParseResult<()> {
    match stack.last_mut() {
        Some(current) => {
            current.children.push(XmlNode::Text(text.to_string()));
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ParseError::xml("text outside root element")),
    }
}

fn resolve_entity(entity: &quick_xml::events::BytesRef<'_>) -> ParseResult<String> {
    let raw: &[u8] = entity;
    let builtin = match raw {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"apos" => Some('\''),
        b"quot" => Some('"'),
        _ => None,
    };
    if let Some(c) = builtin {
        return Ok(c.to_string());
    }

    match entity.resolve_char_ref() {
        Ok(Some(c)) if is_valid_xml_char(u32::from(c)) => Ok(c.to_string()),
        Ok(Some(_)) => Err(ParseError::invalid_value(
            "invalid XML numeric character reference",
        )),
        Ok(None) => {
            let name = String::from_utf8_lossy(raw);
            tracing::warn!(entity = %name, "Rejected reference to undeclared entity");
            Err(ParseError::forbidden_entity(format!(
                "entity &{name}; is not allowed"
            )))
        }
        Err(e) => Err(ParseError::invalid_value(format!(
            "invalid character reference: {e}"
        ))),
    }
}

/// A DOCTYPE is tolerated only when it cannot introduce entities.
fn reject_unsafe_doctype(decl: &str) -> ParseResult<()> {
    let upper = decl.to_ascii_uppercase();
    if upper.contains("<!ENTITY") || upper.contains("SYSTEM") || upper.contains("PUBLIC") {
        tracing::warn!("Rejected DOCTYPE with entity declaration or external identifier");
        return Err(ParseError::forbidden_entity(
            "DOCTYPE entity declarations are not allowed",
        ));
    }
    Ok(())
}

/// Resolves the element name against in-scope declarations, including
/// declarations made on the element itself.
fn open_element(
    e: &BytesStart<'_>,
    scopes: &[Vec<(String, String)>],
) -> ParseResult<(XmlElement, Vec<(String, String)>)> {
    let mut scope = Vec::new();
    let mut attributes = Vec::new();

    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|err| ParseError::forbidden_entity(err.to_string()))?
            .into_owned();

        if key == "xmlns" {
            scope.push((String::new(), value));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            scope.push((prefix.to_string(), value));
        } else {
            let local = key.rsplit(':').next().unwrap_or(key);
            attributes.push((local.to_string(), value));
        }
    }

    let raw = std::str::from_utf8(e.name().as_ref())?.to_string();
    let (prefix, local_name) = match raw.split_once(':') {
        Some((p, l)) => (p.to_string(), l.to_string()),
        None => (String::new(), raw),
    };

    let namespace = scope
        .iter()
        .rev()
        .chain(scopes.iter().rev().flat_map(|s| s.iter().rev()))
        .find(|(p, _)| *p == prefix)
        .map(|(_, ns)| ns.clone());

    let namespace = match namespace {
        Some(ns) => Namespace::from(ns),
        None if prefix.is_empty() => Namespace::from(DAV_NS),
        None => {
            return Err(ParseError::xml(format!("undeclared namespace prefix: {prefix}")));
        }
    };

    Ok((
        XmlElement {
            name: QName::new(namespace, local_name),
            attributes,
            children: Vec::new(),
        },
        scope,
    ))
}

#[must_use]
fn is_valid_xml_char(value: u32) -> bool {
    matches!(
        value,
        0x9 | 0xA | 0xD | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x0001_0000..=0x0010_FFFF
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::dav::core::CALDAV_NS;
    use crate::rfc::dav::parse::error::ParseErrorKind;

    #[test_log::test]
    fn resolves_prefixes_and_default_namespace() {
        let xml = br#"<D:propfind xmlns:D="DAV:" xmlns:C="urn:ietf:params:xml:ns:caldav">
            <D:prop><C:calendar-data/><getetag xmlns="DAV:"/></D:prop>
        </D:propfind>"#;
        let root = parse_document(xml).unwrap();
        assert!(root.is(DAV_NS, "propfind"));
        let prop = root.child(DAV_NS, "prop").unwrap();
        let names: Vec<_> = prop.elements().map(|e| e.name.clone()).collect();
        assert_eq!(
            names,
            vec![QName::caldav("calendar-data"), QName::dav("getetag")]
        );
        assert!(prop.child(CALDAV_NS, "calendar-data").is_some());
    }

    #[test_log::test]
    fn decodes_builtin_and_numeric_entities() {
        let xml = b"<D:href xmlns:D=\"DAV:\">/a/b&amp;c&#x41;&#66; d.ics</D:href>";
        let root = parse_document(xml).unwrap();
        assert_eq!(root.text(), "/a/b&cAB d.ics");
    }

    #[test_log::test]
    fn decodes_every_predefined_entity() {
        let xml = b"<D:href xmlns:D=\"DAV:\">&lt;&gt;&amp;&apos;&quot;</D:href>";
        let root = parse_document(xml).unwrap();
        assert_eq!(root.text(), "<>&'\"");
    }

    #[test_log::test]
    fn rejects_internal_entity_declaration() {
        let xml = br#"<?xml version="1.0"?>
<!DOCTYPE lolz [<!ENTITY lol "lol">]>
<D:propfind xmlns:D="DAV:"><D:prop>&lol;</D:prop></D:propfind>"#;
        let err = parse_document(xml).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ForbiddenEntity);
    }

    #[test_log::test]
    fn rejects_external_entity() {
        let xml = br#"<?xml version="1.0"?>
<!DOCTYPE foo [<!ENTITY xxe SYSTEM "file:///etc/passwd">]>
<D:href xmlns:D="DAV:">&xxe;</D:href>"#;
        let err = parse_document(xml).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ForbiddenEntity);
    }

    #[test_log::test]
    fn rejects_undeclared_entity_reference() {
        let xml = b"<D:href xmlns:D=\"DAV:\">&nbsp;</D:href>";
        let err = parse_document(xml).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ForbiddenEntity);
    }

    #[test_log::test]
    fn rejects_invalid_char_reference() {
        let xml = b"<D:href xmlns:D=\"DAV:\">&#0;</D:href>";
        assert!(parse_document(xml).is_err());
    }

    #[test_log::test]
    fn malformed_xml_is_an_error() {
        assert!(parse_document(b"<D:propfind xmlns:D=\"DAV:\"><D:prop>").is_err());
        assert!(parse_document(b"<a></b>").is_err());
        assert!(parse_document(b"").is_err());
        assert!(parse_document(b"<x:a/>").is_err());
    }

    #[test_log::test]
    fn rejects_deep_nesting() {
        let mut xml = String::new();
        for _ in 0..(MAX_DEPTH + 1) {
            xml.push_str("<a>");
        }
        for _ in 0..(MAX_DEPTH + 1) {
            xml.push_str("</a>");
        }
        assert!(parse_document(xml.as_bytes()).is_err());
    }

    #[test_log::test]
    fn attributes_use_local_names() {
        let xml = br#"<C:comp-filter xmlns:C="urn:ietf:params:xml:ns:caldav" name="VEVENT"/>"#;
        let root = parse_document(xml).unwrap();
        assert_eq!(root.attr("name"), Some("VEVENT"));
        assert_eq!(root.attr("missing"), None);
    }
}
