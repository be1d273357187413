use salvo::Response;
use salvo::http::StatusCode;

use super::set_header;
use crate::error::AppResult;
use kunai_core::constants::XML_CONTENT_TYPE;
use kunai_rfc::rfc::dav::build::serialize_multistatus;
use kunai_rfc::rfc::dav::core::Multistatus;

/// ## Summary
/// Serializes a multistatus and writes it as a 207 response.
///
/// ## Errors
/// Returns an error if serialization fails; nothing is written then.
pub fn write_multistatus(res: &mut Response, multistatus: &Multistatus) -> AppResult<()> {
    let xml = serialize_multistatus(multistatus)?;

    res.status_code(StatusCode::MULTI_STATUS);
    set_header(res, "Content-Type", XML_CONTENT_TYPE);
    if let Err(e) = res.write_body(xml) {
        tracing::warn!(error = %e, "Failed to write multistatus body");
    }
    Ok(())
}
