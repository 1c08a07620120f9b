//! # Handoff API
//!
//! HTTP handlers, router, and response mapping for the pending-session
//! endpoints.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
