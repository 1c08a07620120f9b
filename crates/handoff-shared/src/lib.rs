//! # Handoff Shared
//!
//! Shared configuration, telemetry, wire types, and constants for the
//! session-handoff application.

pub mod config;
pub mod constants;
pub mod telemetry;
pub mod types;

pub use types::*;
