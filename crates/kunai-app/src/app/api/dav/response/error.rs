//! Error responses: `DAV:error` bodies for preconditions, plain text otherwise.

use salvo::Response;
use salvo::http::StatusCode;

use super::set_header;
use crate::error::AppError;
use kunai_core::constants::XML_CONTENT_TYPE;
use kunai_rfc::rfc::dav::build::serialize_error;

/// ## Summary
/// Writes `err` as an HTTP error response.
///
/// Errors naming a precondition (invalid sync token, unsupported report,
/// missing privileges) get an RFC 4918 §16 `DAV:error` body. Everything
/// else gets a short `text/plain` message; internal details stay in the log.
pub fn write_error(res: &mut Response, err: &AppError) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    res.status_code(status);

    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, status = %status, "Request rejected");
    }

    let precondition = match err {
        AppError::ServiceError(e) => e.precondition(),
        _ => None,
    };

    if let Some(condition) = precondition {
        match serialize_error(condition) {
            Ok(xml) => {
                set_header(res, "Content-Type", XML_CONTENT_TYPE);
                if let Err(e) = res.write_body(xml) {
                    tracing::warn!(error = %e, "Failed to write error body");
                }
                return;
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize DAV:error body"),
        }
    }

    let message = if status.is_server_error() {
        "Internal Server Error".to_string()
    } else {
        err.to_string()
    };
    set_header(res, "Content-Type", "text/plain; charset=utf-8");
    if let Err(e) = res.write_body(message) {
        tracing::warn!(error = %e, "Failed to write error body");
    }
}
