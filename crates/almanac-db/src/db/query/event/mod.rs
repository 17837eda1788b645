//! Query composition for `calendar_event`.

use almanac_core::types::Window;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::db::connection::DbConnection;
use crate::db::enums::RecurrenceFrequency;
use crate::db::schema::calendar_event;
use crate::model::event::{CalendarEvent, CalendarEventChangeset, NewCalendarEvent};

/// ## Summary
/// Returns the candidate-selection query for a user's window.
///
/// Selects the union of:
/// - one-off templates whose `[start_date, end_date]` overlaps the window
///   (starts inside, ends inside, or spans it; bounds inclusive), and
/// - every recurring template of the user, whatever its own dates, because a
///   later occurrence may land in the window even when the first does not.
///
/// Soft-deleted templates are excluded. Rows are ordered by `start_date`.
#[must_use]
pub fn candidates(user_id: Uuid, window: &Window) -> calendar_event::BoxedQuery<'static, Pg> {
    let (start, end) = (window.start(), window.end());

    let one_off_in_window = calendar_event::recurrence_frequency
        .eq(RecurrenceFrequency::None)
        .and(
            calendar_event::start_date
                .between(start, end)
                .or(calendar_event::end_date.between(start, end))
                .or(calendar_event::start_date
                    .le(start)
                    .and(calendar_event::end_date.ge(end))),
        );
    let recurring = calendar_event::recurrence_frequency.ne(RecurrenceFrequency::None);

    calendar_event::table
        .into_boxed()
        .filter(calendar_event::user_id.eq(user_id))
        .filter(calendar_event::deleted_at.is_null())
        .filter(one_off_in_window.or(recurring))
        .order(calendar_event::start_date.asc())
}

/// ## Summary
/// Loads the candidate templates for a user's window query.
///
/// ## Errors
/// Returns an error if the database operation fails.
#[tracing::instrument(skip(conn, window), fields(window = %window))]
pub async fn find_candidates(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    window: &Window,
) -> QueryResult<Vec<CalendarEvent>> {
    let rows = candidates(user_id, window)
        .select(CalendarEvent::as_select())
        .load::<CalendarEvent>(conn)
        .await?;

    tracing::debug!(count = rows.len(), "Loaded candidate templates");
    Ok(rows)
}

/// ## Summary
/// Finds a template by id, ignoring soft-deleted rows.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn find_by_id(
    conn: &mut DbConnection<'_>,
    id: Uuid,
) -> QueryResult<Option<CalendarEvent>> {
    calendar_event::table
        .filter(calendar_event::id.eq(id))
        .filter(calendar_event::deleted_at.is_null())
        .select(CalendarEvent::as_select())
        .first::<CalendarEvent>(conn)
        .await
        .optional()
}

/// ## Summary
/// Inserts a template and returns the stored row.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn insert(
    conn: &mut DbConnection<'_>,
    event: &NewCalendarEvent<'_>,
) -> QueryResult<CalendarEvent> {
    diesel::insert_into(calendar_event::table)
        .values(event)
        .returning(CalendarEvent::as_returning())
        .get_result(conn)
        .await
}

/// ## Summary
/// Replaces a live template's mutable columns.
///
/// Returns `None` if no live row has that id.
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn update(
    conn: &mut DbConnection<'_>,
    id: Uuid,
    changes: &CalendarEventChangeset<'_>,
) -> QueryResult<Option<CalendarEvent>> {
    diesel::update(
        calendar_event::table
            .filter(calendar_event::id.eq(id))
            .filter(calendar_event::deleted_at.is_null()),
    )
    .set(changes)
    .returning(CalendarEvent::as_returning())
    .get_result(conn)
    .await
    .optional()
}

/// ## Summary
/// Soft-deletes a template by stamping `deleted_at`.
///
/// Returns the number of rows affected (0 if already deleted or missing).
///
/// ## Errors
/// Returns an error if the database operation fails.
pub async fn soft_delete(conn: &mut DbConnection<'_>, id: Uuid) -> QueryResult<usize> {
    diesel::update(
        calendar_event::table
            .filter(calendar_event::id.eq(id))
            .filter(calendar_event::deleted_at.is_null()),
    )
    .set(calendar_event::deleted_at.eq(Some(chrono::Utc::now())))
    .execute(conn)
    .await
}
