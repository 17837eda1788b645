//! PostgreSQL storage for calendar event templates.

pub mod db;
pub mod error;
pub mod model;
