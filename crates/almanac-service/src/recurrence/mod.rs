//! Recurrence rules, stepping and per-template expansion.

pub mod generator;
pub mod rule;
pub mod step;

pub use generator::{OccurrenceSpan, occurrence_spans};
pub use rule::{
    Recurrence, RecurrenceBounds, RecurrenceFields, RecurrenceRule, WeekdaySet,
    weekday_from_number,
};
pub use step::nth_weekday_of_month;
