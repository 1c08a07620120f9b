//! # Handoff Infrastructure
//!
//! Pending-session repository implementations (adapters): PostgreSQL for
//! production, in-memory for tests and local development.

pub mod database;
pub mod memory;

pub use database::{create_pool, run_migrations, PgPendingSessionRepository};
pub use memory::MemoryPendingSessionRepository;
