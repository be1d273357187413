//! Loading what a path names.

use kunai_store::{Principal, Resource};

use crate::collection::Collection;
use crate::context::DavContext;
use crate::error::{ServiceError, ServiceResult};
use crate::path::DavPath;
use crate::props::Target;
use crate::sync::current_token;

/// The data behind a [`DavPath`], loaded for one request.
pub enum Resolved {
    Principal(Principal),
    Home {
        owner: String,
    },
    Collection {
        collection: Box<dyn Collection>,
        resources: Vec<Resource>,
        sync_token: String,
    },
    Resource {
        collection: Box<dyn Collection>,
        resource: Resource,
    },
}

impl Resolved {
    /// ## Summary
    /// Loads the principal, home, collection or resource `path` names.
    ///
    /// The caller authorizes the path first.
    ///
    /// ## Errors
    /// Returns `NotFound` when the collection or resource does not exist,
    /// `AmbiguousCollection` for a duplicated slug, or a store error.
    pub async fn load(ctx: &DavContext, path: &DavPath) -> ServiceResult<Self> {
        match path {
            DavPath::Principal { user } => Ok(Self::Principal(
                ctx.store
                    .principal(user)
                    .await?
                    .unwrap_or_else(|| ctx.user.clone()),
            )),
            DavPath::Home { user, .. } => Ok(Self::Home {
                owner: user.clone(),
            }),
            DavPath::Collection { home, user, slug } => {
                let collection = ctx.open_collection(*home, user, slug).await?;
                let resources = collection.resources().await?;
                let sync_token =
                    current_token(&ctx.token_codec(), collection.as_ref(), &resources).await?;
                Ok(Self::Collection {
                    collection,
                    resources,
                    sync_token,
                })
            }
            DavPath::Resource {
                home,
                user,
                slug,
                name,
            } => {
                let collection = ctx.open_collection(*home, user, slug).await?;
                let resource = collection
                    .resource(name)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(path.href()))?;
                Ok(Self::Resource {
                    collection,
                    resource,
                })
            }
        }
    }

    /// Borrowed view for the response assembler.
    #[must_use]
    pub fn target(&self) -> Target<'_> {
        match self {
            Self::Principal(principal) => Target::Principal(principal),
            Self::Home { owner } => Target::Home { owner },
            Self::Collection {
                collection,
                sync_token,
                ..
            } => Target::Collection {
                collection: collection.as_ref(),
                sync_token,
            },
            Self::Resource {
                collection,
                resource,
            } => Target::Resource {
                kind: collection.record().kind,
                access: collection.record().access,
                resource,
            },
        }
    }
}
