use salvo::Depot;
use uuid::Uuid;

use almanac_core::config::{AuthMethod, Settings};

use crate::depot::{AUTHENTICATED_USER, get_config_from_depot};
use crate::error::{AppError, AppResult};

/// ## Summary
/// Resolves the caller's user id from the configured identity method.
///
/// - `single_user`: the configured owner, for every request.
/// - `proxy`: the UUID a trusted reverse proxy put in the configured header.
///
/// ## Errors
/// Returns `Unauthorized` if the proxy header is missing or not a UUID, and a
/// configuration error if `single_user` has no owner.
pub fn resolve_user(req: &salvo::Request, settings: &Settings) -> AppResult<Uuid> {
    match settings.auth.method {
        AuthMethod::SingleUser => Ok(settings.auth.single_user_id()?),
        AuthMethod::Proxy => {
            let header = settings.auth.proxy_header();
            let Some(value) = req.header::<String>(header) else {
                tracing::debug!(header, "Identity header missing");
                return Err(AppError::Unauthorized);
            };
            Uuid::parse_str(value.trim()).map_err(|err| {
                tracing::debug!(header, error = %err, "Identity header is not a user id");
                AppError::Unauthorized
            })
        }
    }
}

/// ## Summary
/// Authentication middleware that identifies the caller and stores their user id
/// in the depot under `AUTHENTICATED_USER`.
///
/// ## Errors
/// Responds 401 if the caller cannot be identified and 500 if settings are missing.
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

        let user = get_config_from_depot(depot).and_then(|settings| resolve_user(req, &settings));

        match user {
            Ok(user_id) => {
                tracing::debug!(user_id = %user_id, "User authenticated");
                depot.insert(AUTHENTICATED_USER, user_id);
            }
            Err(err) => {
                err.render(res);
                ctrl.skip_rest();
            }
        }
    }
}

/// ## Summary
/// Middleware handler for authentication.
/// Use this as a hoop on routes that act on behalf of a user.
pub struct AuthMiddleware;
