use salvo::Depot;
use salvo::http::{Method, StatusCode};
use tracing::error;

use crate::config::{AuthMethod, Settings, get_config_from_depot};
use crate::error::AppResult;
use crate::store_handler::get_store_from_depot;
use kunai_core::error::CoreError;
use kunai_core::types::validate_slug;
use kunai_store::{DavStore, Principal};

/// Depot key under which the authenticated [`Principal`] is stored.
pub const AUTHENTICATED_PRINCIPAL: &str = "authenticated_principal";

/// ## Summary
/// Resolves the principal a request acts as.
///
/// Single-user mode always yields the configured user. Proxy mode trusts the
/// configured header; `Ok(None)` means the header is absent.
///
/// ## Errors
/// Returns an error when the auth section for the selected method is
/// missing, the asserted name is not a valid path segment, or the store
/// lookup fails.
pub async fn authenticate(
    req: &salvo::Request,
    settings: &Settings,
    store: &dyn DavStore,
) -> AppResult<Option<Principal>> {
    let (name, email) = match settings.auth.method {
        AuthMethod::SingleUser => {
            let user = settings.auth.single_user.as_ref().ok_or_else(|| {
                CoreError::InvalidConfiguration("Single user config is missing".to_string())
            })?;
            (user.name.clone(), Some(user.email.clone()))
        }
        AuthMethod::Proxy => {
            let header = settings.auth.proxy.as_ref().ok_or_else(|| {
                CoreError::InvalidConfiguration("Proxy auth header is missing".to_string())
            })?;
            let asserted = req
                .headers()
                .get(header.header.as_str())
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty());
            match asserted {
                Some(name) => (name.to_string(), None),
                None => return Ok(None),
            }
        }
    };

    validate_slug(&name)?;

    if let Some(principal) = store.principal(&name).await? {
        return Ok(Some(principal));
    }
    Ok(Some(Principal {
        display_name: name.clone(),
        name,
        email,
    }))
}

/// ## Summary
/// Retrieves the authenticated principal from the depot.
///
/// ## Errors
/// Returns an error if the auth middleware did not run.
pub fn get_principal_from_depot(depot: &Depot) -> AppResult<Principal> {
    depot
        .get::<Principal>(AUTHENTICATED_PRINCIPAL)
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Principal not found in depot").into())
}

/// ## Summary
/// Authentication middleware that authenticates the request and stores the principal in the depot.
/// OPTIONS requests pass through unauthenticated.
///
/// ## Side Effects
/// Inserts the authenticated principal into the depot under [`AUTHENTICATED_PRINCIPAL`].
///
/// ## Errors
/// Responds 401 when proxy authentication is configured and the header is
/// absent, 400 for an invalid user name, and 500 for missing configuration.
#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        tracing::trace!("Authenticating request");

        if req.method() == Method::OPTIONS {
            return;
        }

        let (config, store) = match (get_config_from_depot(depot), get_store_from_depot(depot)) {
            (Ok(config), Ok(store)) => (config, store),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = ?e, "Failed to get config or store from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                ctrl.skip_rest();
                return;
            }
        };

        match authenticate(req, &config, store.as_ref()).await {
            Ok(Some(principal)) => {
                tracing::debug!(user = %principal.name, "User authenticated successfully");
                depot.insert(AUTHENTICATED_PRINCIPAL, principal);
            }
            Ok(None) => {
                tracing::debug!("No authenticated user asserted by proxy");
                res.status_code(StatusCode::UNAUTHORIZED);
                ctrl.skip_rest();
            }
            Err(e) => {
                error!(error = ?e, "Authentication failed with error");
                res.status_code(
                    StatusCode::from_u16(e.status_code())
                        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                );
                ctrl.skip_rest();
            }
        }
    }
}

/// ## Summary
/// Middleware handler for authentication.
/// Use this as a handler in routes to protect them with authentication.
pub struct AuthMiddleware;
