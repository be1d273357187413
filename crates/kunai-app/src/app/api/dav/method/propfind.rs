//! PROPFIND method handler.

use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::extract::body::read_bounded;
use crate::app::api::dav::extract::context::dav_request;
use crate::app::api::dav::extract::headers::parse_depth;
use crate::app::api::dav::response::error::write_error;
use crate::app::api::dav::response::multistatus::write_multistatus;
use crate::error::AppResult;
use kunai_rfc::rfc::dav::core::PropfindRequest;
use kunai_rfc::rfc::dav::parse::parse_propfind;

/// ## Summary
/// Handles PROPFIND requests on principals, homes, collections and resources.
///
/// An empty or unparsable body is answered as `allprop`.
///
/// ## Errors
/// Responds 403 for another user's path, 404 for missing targets, 409 for
/// an ambiguous collection, 413 for an oversized body.
#[handler]
#[tracing::instrument(skip_all, fields(
    method = "PROPFIND",
    path = %req.uri().path()
))]
pub async fn propfind(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling PROPFIND request");
    if let Err(e) = handle_propfind(req, res, depot).await {
        write_error(res, &e);
    }
}

async fn handle_propfind(req: &mut Request, res: &mut Response, depot: &Depot) -> AppResult<()> {
    let (ctx, path) = dav_request(req, depot)?;
    let depth = parse_depth(req)?;
    tracing::debug!(depth = %depth, "Depth header parsed");

    let body = read_bounded(req, ctx.settings.server.max_body_bytes).await?;
    let request = parse_propfind(&body).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unparsable PROPFIND body, answering allprop");
        PropfindRequest::allprop()
    });

    let multistatus = kunai_service::propfind(&ctx, &path, depth, &request).await?;
    write_multistatus(res, &multistatus)
}
