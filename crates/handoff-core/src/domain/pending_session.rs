// ============================================================================
// Handoff Core - Pending Session Entity
// File: crates/handoff-core/src/domain/pending_session.rs
// Description: Short-lived record bridging browser login to app pickup
// ============================================================================

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Pending session entity
///
/// Created by the OAuth callback handler after identity verification,
/// consumed exactly once when a client materializes the session. At most
/// one unconsumed, unexpired record exists per device; a newer login
/// supersedes any earlier one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PendingSession {
    pub id: Uuid,

    #[validate(length(min = 8, max = 128, message = "Device id must be between 8 and 128 characters"))]
    pub device_id: String,

    /// Opaque token identifying this record; embedded in deep links.
    /// Distinct from the final app session id.
    pub session_handle: String,

    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,

    /// Set exactly once on consumption, never cleared.
    pub consumed_at: Option<DateTime<Utc>>,
}

impl PendingSession {
    pub fn new(
        device_id: String,
        user_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<Self, validator::ValidationErrors> {
        let now = Utc::now();
        let session = Self {
            id: Uuid::new_v4(),
            device_id: device_id.trim().to_string(),
            session_handle: handoff_security::handle::generate_session_handle(),
            user_id,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_seconds),
            consumed_at: None,
        };

        session.validate()?;
        Ok(session)
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Unconsumed and unexpired; the only state lookup may return.
    pub fn is_live(&self) -> bool {
        !self.is_consumed() && !self.is_expired()
    }

    /// Cut the record's lifetime short so a newer login for the same
    /// device supersedes it.
    pub fn expire_now(&mut self) {
        self.expires_at = Utc::now();
    }

    pub fn mark_consumed(&mut self) {
        self.consumed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_live() {
        let session = PendingSession::new("device-12345".to_string(), Uuid::new_v4(), 300).unwrap();
        assert!(session.is_live());
        assert!(!session.is_consumed());
        assert_eq!(session.session_handle.len(), 64);
    }

    #[test]
    fn test_short_device_id_rejected() {
        let result = PendingSession::new("abc".to_string(), Uuid::new_v4(), 300);
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_ttl_is_expired() {
        let session = PendingSession::new("device-12345".to_string(), Uuid::new_v4(), 0).unwrap();
        assert!(session.is_expired());
        assert!(!session.is_live());
    }

    #[test]
    fn test_consumed_session_is_not_live() {
        let mut session =
            PendingSession::new("device-12345".to_string(), Uuid::new_v4(), 300).unwrap();
        session.mark_consumed();
        assert!(session.is_consumed());
        assert!(!session.is_live());
    }

    #[test]
    fn test_expire_now_kills_live_session() {
        let mut session =
            PendingSession::new("device-12345".to_string(), Uuid::new_v4(), 300).unwrap();
        session.expire_now();
        assert!(!session.is_live());
        assert!(!session.is_consumed());
    }
}
