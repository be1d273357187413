mod dav;

use salvo::Router;

use crate::middleware::auth::AuthMiddleware;

// Re-export route constants from core
pub use kunai_core::constants::{
    API_ROUTE_COMPONENT, API_ROUTE_PREFIX, CALDAV_ROUTE_PREFIX, CARDDAV_ROUTE_PREFIX,
    DAV_ROUTE_COMPONENT, DAV_ROUTE_PREFIX, PRINCIPAL_ROUTE_PREFIX,
};

/// ## Summary
/// Constructs the API router: authentication, then the DAV method handlers.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .push(Router::with_path(DAV_ROUTE_COMPONENT).push(dav::routes()))
}
