//! PUT method handler for calendar objects and vCards.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::extract::body::read_text;
use crate::app::api::dav::extract::context::dav_request;
use crate::app::api::dav::response::error::write_error;
use crate::app::api::dav::response::set_header;
use crate::error::AppResult;
use kunai_service::put_resource;

/// ## Summary
/// Handles PUT requests.
///
/// Answers 201 for a new resource and 204 for a replaced one, with the new
/// `ETag` either way.
///
/// ## Errors
/// Responds 400 for unparsable content, 403 for read-only collections and
/// the birthday calendar, 404 for a missing collection, 413 for an
/// oversized body.
#[handler]
#[tracing::instrument(skip_all, fields(method = "PUT", path = %req.uri().path()))]
pub async fn put(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling PUT request");
    if let Err(e) = handle_put(req, res, depot).await {
        write_error(res, &e);
    }
}

async fn handle_put(req: &mut Request, res: &mut Response, depot: &Depot) -> AppResult<()> {
    let (ctx, path) = dav_request(req, depot)?;
    let body = read_text(req, ctx.settings.server.max_body_bytes).await?;
    let outcome = put_resource(&ctx, &path, body).await?;

    res.status_code(if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::NO_CONTENT
    });
    set_header(res, "ETag", &outcome.resource.etag);
    Ok(())
}
