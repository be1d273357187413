//! `DAV:error` bodies (RFC 4918 §16).

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};

use super::BuildResult;
use super::multistatus::qualified_name;
use crate::rfc::dav::core::{DAV_NS, Precondition};

/// ## Summary
/// Serializes a precondition into a `DAV:error` document.
///
/// ## Errors
/// Returns an error if XML writing fails.
pub fn serialize_error(condition: Precondition) -> BuildResult<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut root = BytesStart::new("D:error");
    root.push_attribute(("xmlns:D", DAV_NS));
    writer.write_event(Event::Start(root))?;

    let (name, (xmlns, uri)) = qualified_name(condition.namespace(), condition.element_name());
    let mut elem = BytesStart::new(name.as_str());
    if condition.namespace() != DAV_NS {
        elem.push_attribute((xmlns.as_str(), uri));
    }
    writer.write_event(Event::Empty(elem))?;

    writer.write_event(Event::End(BytesEnd::new("D:error")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}
