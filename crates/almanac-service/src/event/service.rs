//! Event template lifecycle: create, read, update and soft-delete.

use almanac_db::db::connection::DbConnection;
use almanac_db::db::enums::RecurrenceFrequency;
use almanac_db::db::query::event as event_query;
use almanac_db::model::event::{CalendarEventChangeset, NewCalendarEvent};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::Event;
use crate::error::{ServiceError, ServiceResult};
use crate::recurrence::{Recurrence, RecurrenceFields};

/// Client-supplied template contents for create and update.
#[derive(Debug, Clone, Deserialize)]
pub struct EventInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(flatten)]
    pub recurrence: RecurrenceFields,
}

fn invalid(msg: impl Into<String>) -> ServiceError {
    ServiceError::ValidationError(msg.into())
}

fn check_range(name: &str, value: Option<u32>, min: u32, max: u32) -> ServiceResult<()> {
    if value.is_some_and(|v| !(min..=max).contains(&v)) {
        return Err(invalid(format!("{name} must be between {min} and {max}")));
    }
    Ok(())
}

impl EventInput {
    /// ## Summary
    /// Validates the input and returns its recurrence in typed form.
    ///
    /// Recurrence columns are only checked when the frequency is recurring; a
    /// one-off event drops them.
    ///
    /// ## Errors
    /// Returns `ServiceError::ValidationError` if the title is blank, the event
    /// ends before it starts, a recurrence value is out of range, or a monthly
    /// rule mixes day-of-month with week-of-month targeting.
    pub fn validate(&self) -> ServiceResult<Recurrence> {
        if self.title.trim().is_empty() {
            return Err(invalid("title must not be empty"));
        }
        if self.end_date < self.start_date {
            return Err(invalid("end_date must not be before start_date"));
        }

        let fields = &self.recurrence;
        if !fields.recurrence_frequency.is_recurring() {
            return Ok(Recurrence::default());
        }

        let max = i32::MAX.unsigned_abs();
        check_range("recurrence_interval", fields.recurrence_interval, 1, max)?;
        check_range("recurrence_count", fields.recurrence_count, 1, max)?;
        check_range("recurrence_day_of_month", fields.recurrence_day_of_month, 1, 31)?;
        check_range("recurrence_week_of_month", fields.recurrence_week_of_month, 1, 5)?;
        check_range("recurrence_day_of_week", fields.recurrence_day_of_week, 0, 6)?;
        if fields.recurrence_days.iter().flatten().any(|day| *day > 6) {
            return Err(invalid("recurrence_days must only contain 0 through 6"));
        }

        if fields.recurrence_frequency == RecurrenceFrequency::Monthly {
            if fields.recurrence_day_of_month.is_some()
                && fields.recurrence_week_of_month.is_some()
            {
                return Err(invalid(
                    "recurrence_day_of_month and recurrence_week_of_month are mutually exclusive",
                ));
            }
            if fields.recurrence_week_of_month.is_some() != fields.recurrence_day_of_week.is_some()
            {
                return Err(invalid(
                    "recurrence_week_of_month and recurrence_day_of_week must be set together",
                ));
            }
        }

        Ok(Recurrence::from_fields(fields))
    }
}

/// Recurrence values converted to their column types.
struct RecurrenceColumns {
    frequency: RecurrenceFrequency,
    interval: Option<i32>,
    days: Option<Vec<i16>>,
    day_of_month: Option<i32>,
    week_of_month: Option<i32>,
    day_of_week: Option<i32>,
    end_date: Option<DateTime<Utc>>,
    count: Option<i32>,
}

fn to_column(name: &str, value: Option<u32>) -> ServiceResult<Option<i32>> {
    value
        .map(i32::try_from)
        .transpose()
        .map_err(|err| invalid(format!("{name} is out of range: {err}")))
}

impl RecurrenceColumns {
    fn new(recurrence: &Recurrence) -> ServiceResult<Self> {
        let fields = recurrence.to_fields();
        let days = fields
            .recurrence_days
            .map(|days| {
                days.into_iter()
                    .map(i16::try_from)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()
            .map_err(|err| invalid(format!("recurrence_days is out of range: {err}")))?;

        Ok(Self {
            frequency: fields.recurrence_frequency,
            interval: to_column("recurrence_interval", fields.recurrence_interval)?,
            days,
            day_of_month: to_column("recurrence_day_of_month", fields.recurrence_day_of_month)?,
            week_of_month: to_column("recurrence_week_of_month", fields.recurrence_week_of_month)?,
            day_of_week: to_column("recurrence_day_of_week", fields.recurrence_day_of_week)?,
            end_date: fields.recurrence_end_date,
            count: to_column("recurrence_count", fields.recurrence_count)?,
        })
    }
}

/// ## Summary
/// Creates a template owned by `user_id`.
///
/// The recurrence is stored in normalized form: only the columns meaningful for
/// the frequency are written.
///
/// ## Errors
/// Returns `ValidationError` for invalid input and `StorageUnavailable` if the
/// insert fails.
#[tracing::instrument(skip(conn, input))]
pub async fn create_event(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    input: &EventInput,
) -> ServiceResult<Event> {
    let recurrence = input.validate()?;
    let columns = RecurrenceColumns::new(&recurrence)?;

    let new_event = NewCalendarEvent {
        id: Uuid::now_v7(),
        user_id,
        title: input.title.trim(),
        description: input.description.as_deref(),
        location: input.location.as_deref(),
        color: input.color.as_deref(),
        is_all_day: input.is_all_day,
        start_date: input.start_date,
        end_date: input.end_date,
        recurrence_frequency: columns.frequency,
        recurrence_interval: columns.interval,
        recurrence_days: columns.days,
        recurrence_day_of_month: columns.day_of_month,
        recurrence_week_of_month: columns.week_of_month,
        recurrence_day_of_week: columns.day_of_week,
        recurrence_end_date: columns.end_date,
        recurrence_count: columns.count,
    };

    let row = event_query::insert(conn, &new_event).await?;
    tracing::info!(event_id = %row.id, frequency = %row.recurrence_frequency, "Event created");

    Ok(Event::from(row))
}

/// ## Summary
/// Loads a live template and checks that `user_id` owns it.
///
/// ## Errors
/// Returns `NotFound` if no live template has that id, `Forbidden` if another
/// user owns it, and `StorageUnavailable` if the lookup fails.
#[tracing::instrument(skip(conn))]
pub async fn get_event(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    event_id: Uuid,
) -> ServiceResult<Event> {
    let Some(row) = event_query::find_by_id(conn, event_id).await? else {
        return Err(ServiceError::NotFound(format!("event {event_id}")));
    };

    if row.user_id != user_id {
        tracing::warn!(owner = %row.user_id, "Event belongs to another user");
        return Err(ServiceError::Forbidden(format!("event {event_id}")));
    }

    Ok(Event::from(row))
}

/// ## Summary
/// Replaces the contents of a template owned by `user_id`.
///
/// ## Errors
/// Returns `ValidationError`, `NotFound` or `Forbidden` as for create and get,
/// and `StorageUnavailable` if the update fails.
#[tracing::instrument(skip(conn, input))]
pub async fn update_event(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    event_id: Uuid,
    input: &EventInput,
) -> ServiceResult<Event> {
    let recurrence = input.validate()?;
    let columns = RecurrenceColumns::new(&recurrence)?;

    get_event(conn, user_id, event_id).await?;

    let changes = CalendarEventChangeset {
        title: input.title.trim(),
        description: input.description.as_deref(),
        location: input.location.as_deref(),
        color: input.color.as_deref(),
        is_all_day: input.is_all_day,
        start_date: input.start_date,
        end_date: input.end_date,
        recurrence_frequency: columns.frequency,
        recurrence_interval: columns.interval,
        recurrence_days: columns.days,
        recurrence_day_of_month: columns.day_of_month,
        recurrence_week_of_month: columns.week_of_month,
        recurrence_day_of_week: columns.day_of_week,
        recurrence_end_date: columns.end_date,
        recurrence_count: columns.count,
        updated_at: Utc::now(),
    };

    let row = event_query::update(conn, event_id, &changes)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event {event_id}")))?;
    tracing::info!("Event updated");

    Ok(Event::from(row))
}

/// ## Summary
/// Soft-deletes a template owned by `user_id`. Its occurrences disappear from
/// every later window query.
///
/// ## Errors
/// Returns `NotFound` or `Forbidden` as for get, and `StorageUnavailable` if
/// the update fails.
#[tracing::instrument(skip(conn))]
pub async fn delete_event(
    conn: &mut DbConnection<'_>,
    user_id: Uuid,
    event_id: Uuid,
) -> ServiceResult<()> {
    get_event(conn, user_id, event_id).await?;

    let affected = event_query::soft_delete(conn, event_id).await?;
    if affected == 0 {
        return Err(ServiceError::NotFound(format!("event {event_id}")));
    }
    tracing::info!("Event deleted");

    Ok(())
}
