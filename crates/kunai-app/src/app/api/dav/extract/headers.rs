use salvo::Request;

use kunai_rfc::rfc::dav::core::Depth;
use kunai_service::ServiceError;

/// ## Summary
/// Parses the `Depth` header, defaulting to `infinity` when absent.
///
/// ## Errors
/// Returns `BadRequest` for a value other than `0`, `1` or `infinity`.
pub fn parse_depth(req: &Request) -> Result<Depth, ServiceError> {
    let Some(value) = req.headers().get("Depth") else {
        return Ok(Depth::default());
    };
    value
        .to_str()
        .ok()
        .and_then(Depth::from_header)
        .ok_or_else(|| ServiceError::BadRequest(format!("invalid Depth header: {value:?}")))
}

#[cfg(test)]
mod tests {
    use salvo::http::HeaderValue;

    use super::*;

    fn with_depth(value: &'static str) -> Request {
        let mut req = Request::new();
        req.headers_mut()
            .insert("Depth", HeaderValue::from_static(value));
        req
    }

    #[test]
    fn depth_values() {
        assert_eq!(parse_depth(&Request::new()).unwrap(), Depth::Infinity);
        assert_eq!(parse_depth(&with_depth("0")).unwrap(), Depth::Zero);
        assert_eq!(parse_depth(&with_depth("1")).unwrap(), Depth::One);
        assert_eq!(parse_depth(&with_depth("Infinity")).unwrap(), Depth::Infinity);
        assert_eq!(parse_depth(&with_depth("2")).unwrap_err().status_code(), 400);
    }
}
