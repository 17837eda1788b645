//! Per-request state carried in the salvo `Depot`.

use std::sync::Arc;

use almanac_core::config::Settings;
use almanac_core::error::CoreError;
use almanac_db::db::DbProvider;
use salvo::async_trait;
use uuid::Uuid;

use crate::error::AppResult;

/// Depot key under which the auth middleware stores the caller's user id.
pub const AUTHENTICATED_USER: &str = "authenticated_user";

/// Injects the database provider and settings into every request's depot.
pub struct StateHandler<T: DbProvider + Clone> {
    pub provider: T,
    pub settings: Arc<Settings>,
}

#[async_trait]
impl<T: DbProvider + Clone + 'static> salvo::Handler for StateHandler<T> {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        let provider: Arc<dyn DbProvider + Send + Sync> = Arc::new(self.provider.clone());
        depot.inject(provider);
        depot.inject(Arc::clone(&self.settings));
    }
}

/// ## Summary
/// Retrieves the database provider injected by `StateHandler`.
///
/// ## Errors
/// Returns an error if no provider was injected for this request.
pub fn get_db_from_depot(
    depot: &salvo::Depot,
) -> AppResult<Arc<dyn DbProvider + Send + Sync + 'static>> {
    depot
        .obtain::<Arc<dyn DbProvider + Send + Sync>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Database provider not found in depot").into())
}

/// ## Summary
/// Retrieves the settings injected by `StateHandler`.
///
/// ## Errors
/// Returns an error if no settings were injected for this request.
pub fn get_config_from_depot(depot: &salvo::Depot) -> AppResult<Arc<Settings>> {
    depot
        .obtain::<Arc<Settings>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Configuration not found in depot").into())
}

/// ## Summary
/// Returns the user id the auth middleware resolved for this request.
///
/// ## Errors
/// Returns an error if the route is not behind the auth middleware.
pub fn get_user_from_depot(depot: &salvo::Depot) -> AppResult<Uuid> {
    depot
        .get::<Uuid>(AUTHENTICATED_USER)
        .copied()
        .map_err(|_err| CoreError::InvariantViolation("Authenticated user not found in depot").into())
}
