use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use almanac_core::types::Window;
use almanac_service::candidate::DbCandidateSource;
use almanac_service::error::ServiceError;
use almanac_service::event::Event;
use almanac_service::resolver::OccurrenceResolver;

use super::{instant_param, respond};
use crate::depot::{get_config_from_depot, get_db_from_depot, get_user_from_depot};
use crate::error::AppResult;

/// ## Summary
/// GET /api/events?start=&end= - Every occurrence of the caller's events inside
/// the inclusive window, sorted by start.
///
/// ## Errors
/// Returns HTTP 400 if a bound is missing, malformed, or `start` is after `end`.
/// Returns HTTP 503 if the events cannot be loaded.
#[handler]
pub async fn list_events(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match list(req, depot).await {
        Ok(occurrences) => respond(
            res,
            StatusCode::OK,
            "Events retrieved successfully",
            occurrences,
        ),
        Err(err) => err.render(res),
    }
}

async fn list(req: &Request, depot: &Depot) -> AppResult<Vec<Event>> {
    let user_id = get_user_from_depot(depot)?;
    let start = instant_param(req, "start")?;
    let end = instant_param(req, "end")?;
    let window = Window::new(start, end).map_err(ServiceError::from)?;

    tracing::debug!(user_id = %user_id, window = %window, "Resolving occurrences");

    let settings = get_config_from_depot(depot)?;
    let resolver = OccurrenceResolver::new(
        DbCandidateSource::new(get_db_from_depot(depot)?),
        settings.expansion,
    );

    Ok(resolver
        .resolve(user_id, window.start(), window.end())
        .await?)
}
