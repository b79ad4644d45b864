// src/lib.rs

pub mod analytics;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

// Re-export specific items for convenience if needed
pub use analytics::compute_analytics;
pub use routes::create_router;
