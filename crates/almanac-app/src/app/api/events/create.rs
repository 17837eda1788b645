use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use almanac_service::event::Event;
use almanac_service::event::service::{EventInput, create_event as create};

use super::respond;
use crate::depot::{get_db_from_depot, get_user_from_depot};
use crate::error::{AppError, AppResult};

/// ## Summary
/// POST /api/events - Creates an event owned by the caller.
///
/// ## Side Effects
/// Inserts a `calendar_event` row.
///
/// ## Errors
/// Returns HTTP 400 for a malformed or invalid body.
/// Returns HTTP 503 if the database is unavailable.
#[handler]
pub async fn create_event(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match handle_create(req, depot).await {
        Ok(event) => respond(
            res,
            StatusCode::CREATED,
            "Event created successfully",
            event,
        ),
        Err(err) => err.render(res),
    }
}

async fn handle_create(req: &mut Request, depot: &Depot) -> AppResult<Event> {
    let user_id = get_user_from_depot(depot)?;
    let input: EventInput = req.parse_json().await.map_err(|err| {
        tracing::debug!(error = ?err, "Failed to parse event body");
        AppError::BadRequest("Invalid request body".to_string())
    })?;
    // Rejected before checkout so a bad body is a 400 even with storage down.
    input.validate()?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(create(&mut conn, user_id, &input).await?)
}
