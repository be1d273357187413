//! GET and HEAD method handlers for calendar objects and vCards.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::extract::context::dav_request;
use crate::app::api::dav::response::error::write_error;
use crate::app::api::dav::response::set_header;
use crate::error::AppResult;
use kunai_service::get_resource;

/// ## Summary
/// Handles GET requests: the resource body with its validators.
#[handler]
#[tracing::instrument(skip_all, fields(method = "GET", path = %req.uri().path()))]
pub async fn get(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling GET request");
    if let Err(e) = handle_get_or_head(req, res, depot, false).await {
        write_error(res, &e);
    }
}

/// ## Summary
/// Handles HEAD requests: GET without the body.
#[handler]
#[tracing::instrument(skip_all, fields(method = "HEAD", path = %req.uri().path()))]
pub async fn head(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling HEAD request");
    if let Err(e) = handle_get_or_head(req, res, depot, true).await {
        write_error(res, &e);
    }
}

/// ## Summary
/// Shared implementation for GET and HEAD handlers.
///
/// ## Side Effects
/// Sets `ETag`, `Content-Type` and `Last-Modified`; writes the body unless
/// `is_head`.
async fn handle_get_or_head(
    req: &Request,
    res: &mut Response,
    depot: &Depot,
    is_head: bool,
) -> AppResult<()> {
    let (ctx, path) = dav_request(req, depot)?;
    let fetched = get_resource(&ctx, &path).await?;
    let resource = fetched.resource;

    res.status_code(StatusCode::OK);
    set_header(res, "ETag", &resource.etag);
    set_header(res, "Content-Type", fetched.content_type);
    set_header(
        res,
        "Last-Modified",
        &resource
            .last_modified
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string(),
    );

    if is_head {
        set_header(res, "Content-Length", &resource.body.len().to_string());
    } else if let Err(e) = res.write_body(resource.body) {
        tracing::warn!(error = %e, "Failed to write resource body");
    }

    tracing::debug!(etag = %resource.etag, is_head, "Resource served");
    Ok(())
}
