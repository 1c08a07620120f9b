//! Pending session repository trait (port)

use async_trait::async_trait;

use crate::domain::PendingSession;
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PendingSessionRepository: Send + Sync {
    /// Insert a new record, logically expiring any live record for the
    /// same device first. Exactly one live record per device afterward.
    async fn create(&self, session: &PendingSession) -> Result<PendingSession, DomainError>;

    /// The live record for a device, if any. Expired or consumed records
    /// are absent, not errors.
    async fn find_live_by_device(
        &self,
        device_id: &str,
    ) -> Result<Option<PendingSession>, DomainError>;

    /// Atomically mark a record consumed and return it. Concurrent calls
    /// for the same handle resolve to exactly one winner; losers observe
    /// `DomainError::AlreadyConsumed`.
    async fn consume(&self, session_handle: &str) -> Result<PendingSession, DomainError>;

    /// Delete records past their expiry plus the retention window.
    /// Returns the number of rows removed.
    async fn purge_expired(&self, retention_seconds: i64) -> Result<u64, DomainError>;
}
