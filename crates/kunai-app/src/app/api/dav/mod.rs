// WebDAV, CalDAV and CardDAV over one path space.
//
// Handlers stay glue: path and header extraction, bounded bodies, and
// response writing. The query engine lives in kunai-service.

use salvo::Router;

pub mod extract;
pub mod method;
pub mod response;

#[must_use]
pub fn routes() -> Router {
    Router::with_path("{**rest}")
        .options(method::options::options)
        .get(method::get_head::get)
        .head(method::get_head::head)
        .put(method::put::put)
        .delete(method::delete::delete)
        .push(
            // PROPFIND method
            Router::new()
                .filter_fn(|req, _| req.method().as_str() == "PROPFIND")
                .goal(method::propfind::propfind),
        )
        .push(
            // REPORT method
            Router::new()
                .filter_fn(|req, _| req.method().as_str() == "REPORT")
                .goal(method::report::report),
        )
}
