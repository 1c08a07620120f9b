pub mod handoff_service;

pub use handoff_service::{HandoffService, MaterializeOutcome};
