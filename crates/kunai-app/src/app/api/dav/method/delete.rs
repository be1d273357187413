//! DELETE method handler for calendar objects and vCards.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::extract::context::dav_request;
use crate::app::api::dav::response::error::write_error;
use crate::error::AppResult;
use kunai_service::delete_resource;

/// ## Summary
/// Handles DELETE requests; the resource leaves a tombstone for sync.
///
/// ## Errors
/// Responds 403 for read-only collections, 404 for missing resources.
#[handler]
#[tracing::instrument(skip_all, fields(method = "DELETE", path = %req.uri().path()))]
pub async fn delete(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling DELETE request");
    if let Err(e) = handle_delete(req, res, depot).await {
        write_error(res, &e);
    }
}

async fn handle_delete(req: &Request, res: &mut Response, depot: &Depot) -> AppResult<()> {
    let (ctx, path) = dav_request(req, depot)?;
    delete_resource(&ctx, &path).await?;
    res.status_code(StatusCode::NO_CONTENT);
    Ok(())
}
