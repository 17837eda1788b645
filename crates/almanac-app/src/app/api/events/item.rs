use salvo::http::StatusCode;
use salvo::{Depot, Request, Response, handler};

use almanac_service::event::Event;
use almanac_service::event::service::{self as event_service, EventInput};

use super::{event_id_param, respond};
use crate::depot::{get_db_from_depot, get_user_from_depot};
use crate::error::{AppError, AppResult};

/// ## Summary
/// GET /api/events/{id} - Returns one of the caller's event templates.
///
/// ## Errors
/// Returns HTTP 404 if the event does not exist and 403 if another user owns it.
#[handler]
pub async fn get_event(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match fetch(req, depot).await {
        Ok(event) => respond(
            res,
            StatusCode::OK,
            "Event retrieved successfully",
            event,
        ),
        Err(err) => err.render(res),
    }
}

/// ## Summary
/// PUT /api/events/{id} - Replaces the contents of one of the caller's events.
///
/// ## Errors
/// Returns HTTP 400 for an invalid body, 404 if the event does not exist and
/// 403 if another user owns it.
#[handler]
pub async fn update_event(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match update(req, depot).await {
        Ok(event) => respond(res, StatusCode::OK, "Event updated successfully", event),
        Err(err) => err.render(res),
    }
}

/// ## Summary
/// DELETE /api/events/{id} - Soft-deletes one of the caller's events.
///
/// ## Errors
/// Returns HTTP 404 if the event does not exist and 403 if another user owns it.
#[handler]
pub async fn delete_event(req: &mut Request, depot: &mut Depot, res: &mut Response) {
    match delete(req, depot).await {
        Ok(()) => respond(
            res,
            StatusCode::OK,
            "Event deleted successfully",
            serde_json::Value::Null,
        ),
        Err(err) => err.render(res),
    }
}

async fn fetch(req: &Request, depot: &Depot) -> AppResult<Event> {
    let user_id = get_user_from_depot(depot)?;
    let event_id = event_id_param(req)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(event_service::get_event(&mut conn, user_id, event_id).await?)
}

async fn update(req: &mut Request, depot: &Depot) -> AppResult<Event> {
    let user_id = get_user_from_depot(depot)?;
    let event_id = event_id_param(req)?;
    let input: EventInput = req.parse_json().await.map_err(|err| {
        tracing::debug!(error = ?err, "Failed to parse event body");
        AppError::BadRequest("Invalid request body".to_string())
    })?;
    // Rejected before checkout so a bad body is a 400 even with storage down.
    input.validate()?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(event_service::update_event(&mut conn, user_id, event_id, &input).await?)
}

async fn delete(req: &Request, depot: &Depot) -> AppResult<()> {
    let user_id = get_user_from_depot(depot)?;
    let event_id = event_id_param(req)?;

    let provider = get_db_from_depot(depot)?;
    let mut conn = provider.get_connection().await?;

    Ok(event_service::delete_event(&mut conn, user_id, event_id).await?)
}
