//! Models for the `calendar_event` table.

use chrono::{DateTime, Utc};
use diesel::{pg::Pg, prelude::*};

use crate::db::{enums::RecurrenceFrequency, schema};

/// Persisted event template, one-off or recurring.
///
/// Recurrence parameters are stored flat; interpretation happens in the service layer.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = schema::calendar_event)]
#[diesel(check_for_backend(Pg))]
pub struct CalendarEvent {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub is_all_day: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub recurrence_frequency: RecurrenceFrequency,
    pub recurrence_interval: Option<i32>,
    /// Weekday numbers, 0 = Sunday through 6 = Saturday.
    pub recurrence_days: Option<Vec<i16>>,
    pub recurrence_day_of_month: Option<i32>,
    pub recurrence_week_of_month: Option<i32>,
    pub recurrence_day_of_week: Option<i32>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub recurrence_count: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Insert struct for creating new event templates
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::calendar_event)]
pub struct NewCalendarEvent<'a> {
    pub id: uuid::Uuid,
    pub user_id: uuid::Uuid,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub color: Option<&'a str>,
    pub is_all_day: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub recurrence_frequency: RecurrenceFrequency,
    pub recurrence_interval: Option<i32>,
    pub recurrence_days: Option<Vec<i16>>,
    pub recurrence_day_of_month: Option<i32>,
    pub recurrence_week_of_month: Option<i32>,
    pub recurrence_day_of_week: Option<i32>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub recurrence_count: Option<i32>,
}

/// Full replacement of a template's mutable columns.
///
/// `None` clears the column rather than leaving it untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = schema::calendar_event)]
#[diesel(treat_none_as_null = true)]
pub struct CalendarEventChangeset<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub location: Option<&'a str>,
    pub color: Option<&'a str>,
    pub is_all_day: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub recurrence_frequency: RecurrenceFrequency,
    pub recurrence_interval: Option<i32>,
    pub recurrence_days: Option<Vec<i16>>,
    pub recurrence_day_of_month: Option<i32>,
    pub recurrence_week_of_month: Option<i32>,
    pub recurrence_day_of_week: Option<i32>,
    pub recurrence_end_date: Option<DateTime<Utc>>,
    pub recurrence_count: Option<i32>,
    pub updated_at: DateTime<Utc>,
}
