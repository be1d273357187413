//! REPORT method handler.

use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use crate::app::api::dav::extract::body::read_bounded;
use crate::app::api::dav::extract::context::dav_request;
use crate::app::api::dav::response::error::write_error;
use crate::app::api::dav::response::multistatus::write_multistatus;
use crate::app::api::dav::response::set_header;
use crate::error::AppResult;
use kunai_core::constants::CALENDAR_CONTENT_TYPE;
use kunai_rfc::rfc::dav::parse::parse_report;
use kunai_service::{ReportOutcome, ServiceError, execute_report};

/// ## Summary
/// Handles REPORT requests.
///
/// Every report answers 207 Multi-Status except `free-busy-query`, which
/// answers 200 with a `text/calendar` body.
///
/// ## Errors
/// Responds 400 for a malformed body, 403 for reports on a resource or on
/// the wrong kind of collection and for invalid sync tokens, 404 for a
/// missing collection, 409 for an ambiguous one, 413 for an oversized body.
#[handler]
#[tracing::instrument(skip_all, fields(
    method = "REPORT",
    path = %req.uri().path()
))]
pub async fn report(req: &mut Request, res: &mut Response, depot: &Depot) {
    tracing::info!("Handling REPORT request");
    if let Err(e) = handle_report(req, res, depot).await {
        write_error(res, &e);
    }
}

async fn handle_report(req: &mut Request, res: &mut Response, depot: &Depot) -> AppResult<()> {
    let (ctx, path) = dav_request(req, depot)?;
    let body = read_bounded(req, ctx.settings.server.max_body_bytes).await?;
    let request = parse_report(&body).map_err(ServiceError::from)?;
    tracing::debug!(report = request.report_type.name(), "REPORT request parsed");

    match execute_report(&ctx, &path, &request).await? {
        ReportOutcome::Multistatus(multistatus) => write_multistatus(res, &multistatus),
        ReportOutcome::Calendar(text) => {
            res.status_code(StatusCode::OK);
            set_header(res, "Content-Type", CALENDAR_CONTENT_TYPE);
            if let Err(e) = res.write_body(text) {
                tracing::warn!(error = %e, "Failed to write free-busy body");
            }
            Ok(())
        }
    }
}
