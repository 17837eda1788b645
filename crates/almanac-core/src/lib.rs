//! Shared configuration, errors and time types for the Almanac workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
