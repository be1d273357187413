//! PROPFIND request parsing.

use super::error::{ParseError, ParseResult};
use super::parse_prop_names;
use super::xml::parse_document;
use crate::rfc::dav::core::{DAV_NS, PropfindRequest, PropfindType};

/// ## Summary
/// Parses a PROPFIND request body.
///
/// An empty (or whitespace-only) body is an `allprop` request.
///
/// ## Errors
/// Returns an error if the XML is malformed, unsafe, or is not a
/// `DAV:propfind` document.
pub fn parse_propfind(xml: &[u8]) -> ParseResult<PropfindRequest> {
    if xml.iter().all(u8::is_ascii_whitespace) {
        return Ok(PropfindRequest::allprop());
    }

    let root = parse_document(xml)?;
    if !root.is(DAV_NS, "propfind") {
        return Err(ParseError::unexpected_element(root.name.local_name()));
    }

    if let Some(prop) = root.child(DAV_NS, "prop") {
        return Ok(PropfindRequest::prop(parse_prop_names(prop)?));
    }

    if root.child(DAV_NS, "propname").is_some() {
        return Ok(PropfindRequest::propname());
    }

    if root.child(DAV_NS, "allprop").is_some() {
        let include = match root.child(DAV_NS, "include") {
            Some(include) => parse_prop_names(include)?,
            None => Vec::new(),
        };
        return Ok(PropfindRequest {
            propfind_type: PropfindType::AllProp { include },
        });
    }

    // <propfind/> with no children
    Ok(PropfindRequest::allprop())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::dav::core::{PropertyName, QName};

    #[test]
    fn empty_body_is_allprop() {
        let req = parse_propfind(b"  \r\n").unwrap();
        assert!(matches!(req.propfind_type, PropfindType::AllProp { .. }));
    }

    #[test]
    fn prop_request() {
        let xml = br#"<?xml version="1.0" encoding="utf-8"?>
<D:propfind xmlns:D="DAV:" xmlns:CS="http://calendarserver.org/ns/">
  <D:prop><D:displayname/><D:getetag/><CS:getctag/></D:prop>
</D:propfind>"#;
        let req = parse_propfind(xml).unwrap();
        let PropfindType::Prop(props) = req.propfind_type else {
            panic!("expected prop");
        };
        assert_eq!(props.len(), 3);
        assert_eq!(props[2], PropertyName::Simple(QName::cs("getctag")));
    }

    #[test]
    fn propname_request() {
        let xml = br#"<propfind xmlns="DAV:"><propname/></propfind>"#;
        let req = parse_propfind(xml).unwrap();
        assert!(matches!(req.propfind_type, PropfindType::PropName));
    }

    #[test]
    fn allprop_with_include() {
        let xml = br#"<D:propfind xmlns:D="DAV:"><D:allprop/><D:include><D:sync-token/></D:include></D:propfind>"#;
        let req = parse_propfind(xml).unwrap();
        let PropfindType::AllProp { include } = req.propfind_type else {
            panic!("expected allprop");
        };
        assert_eq!(include.len(), 1);
    }

    #[test]
    fn wrong_root_is_error() {
        assert!(parse_propfind(br#"<D:foo xmlns:D="DAV:"/>"#).is_err());
    }
}
