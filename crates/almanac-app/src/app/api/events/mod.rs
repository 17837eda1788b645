//! `/api/events`: occurrence queries and template CRUD.

mod create;
mod item;
mod list;

use chrono::{DateTime, Utc};
use salvo::http::StatusCode;
use salvo::writing::Json;
use salvo::{Request, Response, Router};
use serde::Serialize;
use uuid::Uuid;

use almanac_core::constants::EVENTS_ROUTE_COMPONENT;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthMiddleware;

/// Success body: a human-readable message plus the payload.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: &'static str,
    pub data: T,
}

fn respond<T: Serialize + Send + 'static>(
    res: &mut Response,
    status: StatusCode,
    message: &'static str,
    data: T,
) {
    res.status_code(status);
    res.render(Json(ApiResponse { message, data }));
}

/// ## Summary
/// Reads a required RFC 3339 query parameter as a UTC instant.
///
/// ## Errors
/// Returns `BadRequest` if the parameter is missing or malformed.
fn instant_param(req: &Request, name: &str) -> AppResult<DateTime<Utc>> {
    let raw = req
        .query::<String>(name)
        .ok_or_else(|| AppError::BadRequest(format!("{name} query parameter is required")))?;

    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| AppError::BadRequest(format!("{name} must be an RFC 3339 timestamp: {err}")))
}

/// ## Summary
/// Reads the `{id}` path segment as an event id.
///
/// ## Errors
/// Returns `BadRequest` if the segment is not a UUID.
fn event_id_param(req: &Request) -> AppResult<Uuid> {
    let raw = req.param::<String>("id").unwrap_or_default();
    Uuid::parse_str(&raw).map_err(|_err| AppError::BadRequest(format!("invalid event id '{raw}'")))
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path(EVENTS_ROUTE_COMPONENT)
        .hoop(AuthMiddleware)
        .get(list::list_events)
        .post(create::create_event)
        .push(
            Router::with_path("{id}")
                .get(item::get_event)
                .put(item::update_event)
                .delete(item::delete_event),
        )
}
