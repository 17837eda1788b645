//! Event templates and their occurrences.

pub mod service;

use almanac_core::types::Window;
use almanac_db::model::event::CalendarEvent;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::recurrence::{OccurrenceSpan, Recurrence, RecurrenceFields, occurrence_spans};

/// An event template, or one occurrence of it.
///
/// Occurrences are copies of their template with `start_date` and `end_date`
/// replaced; every other field, the id included, is the template's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub is_all_day: bool,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub recurrence: Recurrence,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// ## Summary
    /// Returns a copy of this template placed at `span`.
    #[must_use]
    pub fn at(&self, span: OccurrenceSpan) -> Self {
        Self {
            start_date: span.start,
            end_date: span.end,
            ..self.clone()
        }
    }

    /// ## Summary
    /// Expands this template into its occurrences inside `window`, generating at
    /// most `safety_cap` cursors.
    #[must_use]
    pub fn occurrences(&self, window: &Window, safety_cap: u32) -> Vec<Self> {
        occurrence_spans(
            self.start_date,
            self.end_date,
            &self.recurrence,
            window,
            safety_cap,
        )
        .into_iter()
        .map(|span| self.at(span))
        .collect()
    }
}

fn column_to_u32(value: Option<i32>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

impl From<CalendarEvent> for Event {
    fn from(row: CalendarEvent) -> Self {
        let fields = RecurrenceFields {
            recurrence_frequency: row.recurrence_frequency,
            recurrence_interval: column_to_u32(row.recurrence_interval),
            recurrence_days: row.recurrence_days.map(|days| {
                days.into_iter()
                    .filter_map(|day| u32::try_from(day).ok())
                    .collect()
            }),
            recurrence_day_of_month: column_to_u32(row.recurrence_day_of_month),
            recurrence_week_of_month: column_to_u32(row.recurrence_week_of_month),
            recurrence_day_of_week: column_to_u32(row.recurrence_day_of_week),
            recurrence_end_date: row.recurrence_end_date,
            recurrence_count: column_to_u32(row.recurrence_count),
        };

        Self {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            location: row.location,
            color: row.color,
            is_all_day: row.is_all_day,
            start_date: row.start_date,
            end_date: row.end_date,
            recurrence: Recurrence::from_fields(&fields),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Wire shape: the template columns with recurrence flattened back to its fields.
#[derive(Serialize)]
struct EventView<'a> {
    id: Uuid,
    user_id: Uuid,
    title: &'a str,
    description: Option<&'a str>,
    location: Option<&'a str>,
    color: Option<&'a str>,
    is_all_day: bool,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    #[serde(flatten)]
    recurrence: RecurrenceFields,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Serialize for Event {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EventView {
            id: self.id,
            user_id: self.user_id,
            title: &self.title,
            description: self.description.as_deref(),
            location: self.location.as_deref(),
            color: self.color.as_deref(),
            is_all_day: self.is_all_day,
            start_date: self.start_date,
            end_date: self.end_date,
            recurrence: self.recurrence.to_fields(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}
