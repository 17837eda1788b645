pub mod app;
pub mod depot;
pub mod error;
pub mod middleware;
