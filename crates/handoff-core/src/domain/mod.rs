pub mod pending_session;

pub use pending_session::PendingSession;
