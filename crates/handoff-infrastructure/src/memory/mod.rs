//! In-memory pending session repository
//!
//! Implements the same contract as the PostgreSQL adapter without a
//! database. Used by handler tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use handoff_core::domain::PendingSession;
use handoff_core::error::DomainError;
use handoff_core::repositories::PendingSessionRepository;

#[derive(Default)]
pub struct MemoryPendingSessionRepository {
    // Keyed by session handle; the single lock is what makes consume
    // linearizable here.
    sessions: Mutex<HashMap<String, PendingSession>>,
}

impl MemoryPendingSessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingSessionRepository for MemoryPendingSessionRepository {
    async fn create(&self, session: &PendingSession) -> Result<PendingSession, DomainError> {
        let mut sessions = self.sessions.lock().await;

        for existing in sessions.values_mut() {
            if existing.device_id == session.device_id && existing.is_live() {
                existing.expire_now();
            }
        }

        sessions.insert(session.session_handle.clone(), session.clone());
        Ok(session.clone())
    }

    async fn find_live_by_device(
        &self,
        device_id: &str,
    ) -> Result<Option<PendingSession>, DomainError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .values()
            .filter(|s| s.device_id == device_id && s.is_live())
            .max_by_key(|s| s.created_at)
            .cloned())
    }

    async fn consume(&self, session_handle: &str) -> Result<PendingSession, DomainError> {
        let mut sessions = self.sessions.lock().await;

        let session = sessions
            .get_mut(session_handle)
            .ok_or(DomainError::PendingSessionNotFound)?;

        if session.is_consumed() {
            return Err(DomainError::AlreadyConsumed);
        }
        if session.is_expired() {
            return Err(DomainError::PendingSessionExpired);
        }

        session.mark_consumed();
        Ok(session.clone())
    }

    async fn purge_expired(&self, retention_seconds: i64) -> Result<u64, DomainError> {
        let cutoff = Utc::now() - Duration::seconds(retention_seconds);
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at >= cutoff);
        Ok((before - sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use uuid::Uuid;

    fn pending(device_id: &str, ttl_seconds: i64) -> PendingSession {
        PendingSession::new(device_id.to_string(), Uuid::new_v4(), ttl_seconds).unwrap()
    }

    #[tokio::test]
    async fn test_consume_succeeds_once() {
        let repo = MemoryPendingSessionRepository::new();
        let session = pending("device-12345", 300);
        repo.create(&session).await.unwrap();

        let consumed = repo.consume(&session.session_handle).await.unwrap();
        assert!(consumed.is_consumed());

        let second = repo.consume(&session.session_handle).await;
        assert!(matches!(second, Err(DomainError::AlreadyConsumed)));
    }

    #[tokio::test]
    async fn test_create_supersedes_previous_record() {
        let repo = MemoryPendingSessionRepository::new();
        let first = pending("device-12345", 300);
        let second = pending("device-12345", 300);

        repo.create(&first).await.unwrap();
        repo.create(&second).await.unwrap();

        let live = repo.find_live_by_device("device-12345").await.unwrap();
        assert_eq!(
            live.map(|s| s.session_handle),
            Some(second.session_handle.clone())
        );

        // The superseded record is logically expired, not merely hidden.
        let result = repo.consume(&first.session_handle).await;
        assert!(matches!(result, Err(DomainError::PendingSessionExpired)));
    }

    #[tokio::test]
    async fn test_expired_record_is_absent_and_unconsumable() {
        let repo = MemoryPendingSessionRepository::new();
        let session = pending("device-12345", 0);
        repo.create(&session).await.unwrap();

        let live = repo.find_live_by_device("device-12345").await.unwrap();
        assert!(live.is_none());

        let result = repo.consume(&session.session_handle).await;
        assert!(matches!(result, Err(DomainError::PendingSessionExpired)));
    }

    #[tokio::test]
    async fn test_unknown_handle_is_not_found() {
        let repo = MemoryPendingSessionRepository::new();
        let result = repo.consume("no-such-handle").await;
        assert!(matches!(result, Err(DomainError::PendingSessionNotFound)));
    }

    #[tokio::test]
    async fn test_purge_removes_only_records_past_retention() {
        let repo = MemoryPendingSessionRepository::new();
        let expired = pending("device-12345", 0);
        let live = pending("device-67890", 300);
        repo.create(&expired).await.unwrap();
        repo.create(&live).await.unwrap();

        let purged = repo.purge_expired(0).await.unwrap();
        assert_eq!(purged, 1);

        let remaining = repo.find_live_by_device("device-67890").await.unwrap();
        assert!(remaining.is_some());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_consume_has_exactly_one_winner() {
        let repo = Arc::new(MemoryPendingSessionRepository::new());
        let session = pending("device-12345", 300);
        repo.create(&session).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            let handle = session.session_handle.clone();
            handles.push(tokio::spawn(
                async move { repo.consume(&handle).await },
            ));
        }

        let mut winners = 0;
        let mut losers = 0;
        for task in handles {
            match task.await.unwrap() {
                Ok(_) => winners += 1,
                Err(DomainError::AlreadyConsumed) => losers += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(losers, 7);
    }
}
