//! OPTIONS method handler for `WebDAV` resources.

use salvo::http::StatusCode;
use salvo::{Request, Response, handler};

use crate::app::api::dav::response::set_header;
use kunai_core::constants::{ALLOWED_METHODS, DAV_COMPLIANCE_CLASSES};

/// ## Summary
/// Handles OPTIONS requests for `WebDAV` resources.
///
/// Every path advertises the same verbs and compliance classes; OPTIONS
/// does not require authentication.
///
/// ## Side Effects
/// Sets the `Allow` and `DAV` headers on the response.
#[handler]
#[tracing::instrument(skip_all, fields(path = %req.uri().path()))]
pub async fn options(req: &mut Request, res: &mut Response) {
    tracing::info!("Handling OPTIONS request");

    set_header(res, "Allow", ALLOWED_METHODS);
    set_header(res, "DAV", DAV_COMPLIANCE_CLASSES);
    res.status_code(StatusCode::OK);

    tracing::debug!("OPTIONS response sent");
}
