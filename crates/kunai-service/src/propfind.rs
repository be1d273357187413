//! PROPFIND (RFC 4918 §9.1).

use kunai_rfc::rfc::dav::core::{Depth, Href, Multistatus, PropfindRequest};

use crate::context::DavContext;
use crate::error::ServiceResult;
use crate::path::DavPath;
use crate::props::Target;
use crate::resolve::Resolved;
use crate::sync::current_token;

/// ## Summary
/// Answers a PROPFIND on `path`.
///
/// Depth 0 describes the target only. Depth 1 adds the collections of a
/// home (the birthday calendar included) or the members of a collection.
/// Collections do not nest, so `infinity` behaves like 1.
///
/// ## Errors
/// Returns `Forbidden` for another principal's path, `NotFound` or
/// `AmbiguousCollection` from resolution, or a store error.
#[tracing::instrument(skip_all, fields(target = %path, depth = %depth))]
pub async fn propfind(
    ctx: &DavContext,
    path: &DavPath,
    depth: Depth,
    request: &PropfindRequest,
) -> ServiceResult<Multistatus> {
    ctx.authorize(path)?;
    let user = ctx.user.name.as_str();
    let mode = &request.propfind_type;

    let resolved = Resolved::load(ctx, path).await?;
    let mut multistatus = Multistatus::new();
    multistatus.add_response(resolved.target().respond(path.href(), user, mode));

    if !depth.includes_children() {
        return Ok(multistatus);
    }

    match (&resolved, path) {
        (Resolved::Home { owner }, DavPath::Home { home, .. }) => {
            let codec = ctx.token_codec();
            for collection in ctx.home_collections(*home, owner).await? {
                let resources = collection.resources().await?;
                let sync_token = current_token(&codec, collection.as_ref(), &resources).await?;
                let href = DavPath::collection_href(*home, owner, &collection.record().slug);
                let target = Target::Collection {
                    collection: collection.as_ref(),
                    sync_token: &sync_token,
                };
                multistatus.add_response(target.respond(href, user, mode));
            }
        }
        (
            Resolved::Collection {
                collection,
                resources,
                ..
            },
            _,
        ) => {
            let base = Href::new(path.href());
            let record = collection.record();
            for resource in resources {
                let target = Target::Resource {
                    kind: record.kind,
                    access: record.access,
                    resource,
                };
                multistatus.add_response(target.respond(base.join(&resource.name), user, mode));
            }
        }
        _ => {}
    }

    tracing::debug!(responses = multistatus.responses.len(), "PROPFIND answered");
    Ok(multistatus)
}
