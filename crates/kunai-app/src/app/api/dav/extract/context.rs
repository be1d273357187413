use salvo::{Depot, Request};

use crate::config::get_config_from_depot;
use crate::error::AppResult;
use crate::middleware::auth::get_principal_from_depot;
use crate::store_handler::get_store_from_depot;
use kunai_service::{DavContext, DavPath};

/// ## Summary
/// Builds the service context and classifies the request path.
///
/// ## Errors
/// Returns an error if a hoop did not run, or `NotFound`/`BadRequest` for
/// paths outside the DAV namespace.
pub fn dav_request(req: &Request, depot: &Depot) -> AppResult<(DavContext, DavPath)> {
    let path = DavPath::parse(req.uri().path())?;
    let ctx = DavContext::new(
        get_store_from_depot(depot)?,
        get_config_from_depot(depot)?,
        get_principal_from_depot(depot)?,
    );
    Ok((ctx, path))
}
