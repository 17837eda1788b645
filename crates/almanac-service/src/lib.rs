//! Event occurrence resolution: recurrence rules, expansion and the event service.

pub mod candidate;
pub mod error;
pub mod event;
pub mod recurrence;
pub mod resolver;
