pub mod pending_session_repo_impl;

pub use pending_session_repo_impl::PgPendingSessionRepository;
