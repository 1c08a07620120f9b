// ============================================================================
// Handoff Core - Session Handoff Service
// File: crates/handoff-core/src/services/handoff_service.rs
// ============================================================================
//! Pending-session creation, lookup, and materialization into the standard
//! app session.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use handoff_security::session::{AppSession, SessionService};

use crate::domain::PendingSession;
use crate::error::DomainError;
use crate::repositories::PendingSessionRepository;

/// Result of a materialization attempt.
#[derive(Debug)]
pub enum MaterializeOutcome {
    /// This caller won the consume race; session credentials attached.
    Completed(AppSession),
    /// Another trigger path already completed the handoff for this login.
    /// Not a failure.
    AlreadyConsumed,
}

/// Session handoff service bridging browser-side identity verification and
/// app-side session pickup.
pub struct HandoffService<R: PendingSessionRepository> {
    repo: Arc<R>,
    sessions: SessionService,
    pending_ttl_seconds: i64,
}

impl<R: PendingSessionRepository> HandoffService<R> {
    pub fn new(repo: Arc<R>, sessions: SessionService, pending_ttl_seconds: i64) -> Self {
        Self {
            repo,
            sessions,
            pending_ttl_seconds,
        }
    }

    /// Record a freshly verified login as a pending session.
    ///
    /// Called by the identity-provider callback handler after token
    /// verification. Any earlier live record for the device is superseded.
    pub async fn begin_handoff(
        &self,
        device_id: &str,
        user_id: Uuid,
    ) -> Result<PendingSession, DomainError> {
        let session = PendingSession::new(device_id.to_string(), user_id, self.pending_ttl_seconds)
            .map_err(|e| DomainError::ValidationError(e.to_string()))?;

        let created = self.repo.create(&session).await?;

        info!("Created pending session for device: {}", created.device_id);
        Ok(created)
    }

    /// The live pending session for a device, if one exists.
    pub async fn pending_for_device(
        &self,
        device_id: &str,
    ) -> Result<Option<PendingSession>, DomainError> {
        self.repo.find_live_by_device(device_id).await
    }

    /// Consume a pending session and issue the standard app session.
    ///
    /// `AlreadyConsumed` from the store means the deep-link path and the
    /// poller raced and the other one won; surfaced as a no-op outcome.
    pub async fn materialize(
        &self,
        session_handle: &str,
    ) -> Result<MaterializeOutcome, DomainError> {
        let pending = match self.repo.consume(session_handle).await {
            Ok(pending) => pending,
            Err(DomainError::AlreadyConsumed) => {
                debug!("Pending session already consumed by the other trigger path");
                return Ok(MaterializeOutcome::AlreadyConsumed);
            }
            Err(DomainError::PendingSessionNotFound) => {
                warn!("Consume requested for unknown session handle");
                return Err(DomainError::PendingSessionNotFound);
            }
            Err(e) => return Err(e),
        };

        let app_session = self
            .sessions
            .issue(&pending.user_id)
            .map_err(|e| DomainError::TokenGenerationError(e.to_string()))?;

        info!("Materialized app session for user: {}", pending.user_id);
        Ok(MaterializeOutcome::Completed(app_session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::MockPendingSessionRepository;

    fn service(repo: MockPendingSessionRepository) -> HandoffService<MockPendingSessionRepository> {
        HandoffService::new(
            Arc::new(repo),
            SessionService::new("test-secret".to_string(), 900, 3600),
            300,
        )
    }

    fn pending_fixture(user_id: Uuid) -> PendingSession {
        PendingSession::new("device-12345".to_string(), user_id, 300).unwrap()
    }

    #[tokio::test]
    async fn test_begin_handoff_creates_live_record() {
        let mut repo = MockPendingSessionRepository::new();
        repo.expect_create().returning(|s| Ok(s.clone()));

        let created = service(repo)
            .begin_handoff("device-12345", Uuid::new_v4())
            .await
            .unwrap();

        assert!(created.is_live());
        assert_eq!(created.session_handle.len(), 64);
        assert!(created.expires_at > created.created_at);
    }

    #[tokio::test]
    async fn test_begin_handoff_rejects_short_device_id() {
        let mut repo = MockPendingSessionRepository::new();
        repo.expect_create().times(0);

        let result = service(repo).begin_handoff("abc", Uuid::new_v4()).await;

        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_materialize_issues_session_for_pending_user() {
        let user_id = Uuid::new_v4();
        let pending = pending_fixture(user_id);
        let handle = pending.session_handle.clone();
        let expected_handle = handle.clone();

        let mut repo = MockPendingSessionRepository::new();
        repo.expect_consume()
            .withf(move |h| h == expected_handle)
            .returning(move |_| Ok(pending.clone()));

        let outcome = service(repo).materialize(&handle).await;

        match outcome {
            Ok(MaterializeOutcome::Completed(session)) => {
                assert_eq!(session.user_id, user_id);
                assert!(!session.access_token.is_empty());
                assert!(!session.refresh_token.is_empty());
            }
            other => panic!("expected Completed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_materialize_already_consumed_is_noop() {
        let mut repo = MockPendingSessionRepository::new();
        repo.expect_consume()
            .returning(|_| Err(DomainError::AlreadyConsumed));

        let outcome = service(repo).materialize("some-handle").await.unwrap();

        assert!(matches!(outcome, MaterializeOutcome::AlreadyConsumed));
    }

    #[tokio::test]
    async fn test_materialize_expired_propagates() {
        let mut repo = MockPendingSessionRepository::new();
        repo.expect_consume()
            .returning(|_| Err(DomainError::PendingSessionExpired));

        let result = service(repo).materialize("some-handle").await;

        assert!(matches!(result, Err(DomainError::PendingSessionExpired)));
    }

    #[tokio::test]
    async fn test_materialize_not_found_propagates() {
        let mut repo = MockPendingSessionRepository::new();
        repo.expect_consume()
            .returning(|_| Err(DomainError::PendingSessionNotFound));

        let result = service(repo).materialize("forged-handle").await;

        assert!(matches!(result, Err(DomainError::PendingSessionNotFound)));
    }
}
