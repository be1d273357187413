//! Multistatus XML serialization.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::BuildResult;
use crate::rfc::dav::core::{
    CALDAV_NS, CARDDAV_NS, CS_NS, DAV_NS, DavProperty, Multistatus, Namespace, PropertyValue,
    PropstatResponse, QName, ResponseBody,
};

/// Prefixes declared on the multistatus root.
const ROOT_NAMESPACES: [(&str, &str); 4] = [
    ("xmlns:D", DAV_NS),
    ("xmlns:C", CALDAV_NS),
    ("xmlns:CR", CARDDAV_NS),
    ("xmlns:CS", CS_NS),
];

/// Serializes a multistatus response to XML.
///
/// ## Summary
/// Converts a `Multistatus` response structure into `WebDAV` XML for the
/// response body. Text is escaped by the writer; properties in namespaces
/// without a fixed prefix carry their own `xmlns` declaration.
///
/// ## Errors
/// Returns an error if XML writing fails or the output is not valid UTF-8.
pub fn serialize_multistatus(multistatus: &Multistatus) -> BuildResult<String> {
    let mut writer = Writer::new(Vec::new());

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut elem = BytesStart::new("D:multistatus");
    for attr in ROOT_NAMESPACES {
        elem.push_attribute(attr);
    }
    writer.write_event(Event::Start(elem))?;

    for response in &multistatus.responses {
        write_response(&mut writer, response)?;
    }

    if let Some(ref desc) = multistatus.description {
        write_text_element(&mut writer, "D:responsedescription", desc)?;
    }

    if let Some(ref token) = multistatus.sync_token {
        write_text_element(&mut writer, "D:sync-token", token)?;
    }

    writer.write_event(Event::End(BytesEnd::new("D:multistatus")))?;

    let bytes = writer.into_inner();
    String::from_utf8(bytes).map_err(|e| {
        tracing::error!("Generated invalid UTF-8 in multistatus XML: {e}");
        e.into()
    })
}

/// Writes a single response element.
fn write_response<W: std::io::Write>(
    writer: &mut Writer<W>,
    response: &PropstatResponse,
) -> BuildResult<()> {
    writer.write_event(Event::Start(BytesStart::new("D:response")))?;

    write_text_element(writer, "D:href", response.href.as_str())?;

    match &response.body {
        ResponseBody::Propstats(propstats) => {
            for propstat in propstats {
                writer.write_event(Event::Start(BytesStart::new("D:propstat")))?;
                writer.write_event(Event::Start(BytesStart::new("D:prop")))?;

                for prop in &propstat.properties {
                    write_property(writer, prop)?;
                }

                writer.write_event(Event::End(BytesEnd::new("D:prop")))?;
                write_text_element(writer, "D:status", &propstat.status.status_line())?;
                writer.write_event(Event::End(BytesEnd::new("D:propstat")))?;
            }
        }
        ResponseBody::Status(status) => {
            write_text_element(writer, "D:status", &status.status_line())?;
        }
    }

    if let Some(ref desc) = response.description {
        write_text_element(writer, "D:responsedescription", desc)?;
    }

    writer.write_event(Event::End(BytesEnd::new("D:response")))?;

    Ok(())
}

/// Writes a property element.
fn write_property<W: std::io::Write>(writer: &mut Writer<W>, prop: &DavProperty) -> BuildResult<()> {
    let start = start_element(&prop.name);
    let elem_name = qualified_name(prop.name.namespace_uri(), prop.name.local_name()).0;

    match &prop.value {
        Some(PropertyValue::Text(text) | PropertyValue::ContentData(text)) => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        Some(PropertyValue::Integer(n)) => {
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(&n.to_string())))?;
        }
        Some(PropertyValue::DateTime(dt)) => {
            let formatted = dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
            writer.write_event(Event::Start(start))?;
            writer.write_event(Event::Text(BytesText::new(&formatted)))?;
        }
        Some(PropertyValue::Href(href)) => {
            writer.write_event(Event::Start(start))?;
            write_text_element(writer, "D:href", href)?;
        }
        Some(PropertyValue::HrefSet(hrefs)) => {
            writer.write_event(Event::Start(start))?;
            for href in hrefs {
                write_text_element(writer, "D:href", href)?;
            }
        }
        Some(PropertyValue::ResourceType(types)) => {
            writer.write_event(Event::Start(start))?;
            for rt in types {
                writer.write_event(Event::Empty(start_element(rt)))?;
            }
        }
        Some(PropertyValue::SupportedReports(reports)) => {
            writer.write_event(Event::Start(start))?;
            for report in reports {
                writer.write_event(Event::Start(BytesStart::new("D:supported-report")))?;
                writer.write_event(Event::Start(BytesStart::new("D:report")))?;
                writer.write_event(Event::Empty(start_element(report)))?;
                writer.write_event(Event::End(BytesEnd::new("D:report")))?;
                writer.write_event(Event::End(BytesEnd::new("D:supported-report")))?;
            }
        }
        Some(PropertyValue::SupportedComponents(components)) => {
            writer.write_event(Event::Start(start))?;
            for comp in components {
                let mut comp_elem = BytesStart::new("C:comp");
                comp_elem.push_attribute(("name", comp.as_str()));
                writer.write_event(Event::Empty(comp_elem))?;
            }
        }
        Some(PropertyValue::SupportedData(types)) => {
            let child = if prop.name.namespace_uri() == CARDDAV_NS {
                "CR:address-data-type"
            } else {
                "C:calendar-data"
            };
            writer.write_event(Event::Start(start))?;
            for (content_type, version) in types {
                let mut data = BytesStart::new(child);
                data.push_attribute(("content-type", content_type.as_str()));
                data.push_attribute(("version", version.as_str()));
                writer.write_event(Event::Empty(data))?;
            }
        }
        Some(PropertyValue::Privileges(privileges)) => {
            writer.write_event(Event::Start(start))?;
            for privilege in privileges {
                writer.write_event(Event::Start(BytesStart::new("D:privilege")))?;
                writer.write_event(Event::Empty(start_element(privilege)))?;
                writer.write_event(Event::End(BytesEnd::new("D:privilege")))?;
            }
        }
        Some(PropertyValue::Expanded(responses)) => {
            writer.write_event(Event::Start(start))?;
            for response in responses {
                write_response(writer, response)?;
            }
        }
        Some(PropertyValue::Marker) | None => {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
    }

    writer.write_event(Event::End(BytesEnd::new(elem_name.as_str())))?;
    Ok(())
}

/// Writes a simple text element.
fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    text: &str,
) -> BuildResult<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Opening tag for `name`, declaring its namespace inline when the root
/// does not.
fn start_element(name: &QName) -> BytesStart<'static> {
    let (elem_name, (xmlns, uri)) = qualified_name(name.namespace_uri(), name.local_name());
    let mut start = BytesStart::new(elem_name);
    if Namespace::from(uri.to_string()).default_prefix().is_none() {
        start.push_attribute((xmlns.as_str(), uri));
    }
    start
}

/// Prefixed element name plus the `xmlns` declaration binding its prefix.
pub(super) fn qualified_name<'a>(ns: &'a str, local_name: &str) -> (String, (String, &'a str)) {
    let prefix = Namespace::from(ns.to_string()).default_prefix().unwrap_or("X");
    (
        format!("{prefix}:{local_name}"),
        (format!("xmlns:{prefix}"), ns),
    )
}
