// ============================================================================
// Handoff Infrastructure - PostgreSQL Pending Session Repository
// File: crates/handoff-infrastructure/src/database/postgres/pending_session_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::{error, info};
use uuid::Uuid;

use handoff_core::domain::PendingSession;
use handoff_core::error::DomainError;
use handoff_core::repositories::PendingSessionRepository;

pub struct PgPendingSessionRepository {
    pool: PgPool,
}

impl PgPendingSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal row type for SQLx mapping
#[derive(Debug, FromRow)]
struct PendingSessionRow {
    pub id: Uuid,
    pub device_id: String,
    pub session_handle: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
}

impl From<PendingSessionRow> for PendingSession {
    fn from(row: PendingSessionRow) -> Self {
        PendingSession {
            id: row.id,
            device_id: row.device_id,
            session_handle: row.session_handle,
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
            consumed_at: row.consumed_at,
        }
    }
}

#[async_trait]
impl PendingSessionRepository for PgPendingSessionRepository {
    async fn create(&self, session: &PendingSession) -> Result<PendingSession, DomainError> {
        info!(
            "Creating pending session for device: {}",
            session.device_id
        );

        let mut tx = self.pool.begin().await.map_err(|e: sqlx::Error| {
            error!("Database error starting transaction: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        // Supersede: any live record for this device stops being visible
        // to lookup and consume from this point on.
        sqlx::query(
            r#"
            UPDATE pending_sessions
            SET expires_at = NOW()
            WHERE device_id = $1 AND consumed_at IS NULL AND expires_at > NOW()
            "#,
        )
        .bind(&session.device_id)
        .execute(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error superseding pending sessions: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        let row: PendingSessionRow = sqlx::query_as(
            r#"
            INSERT INTO pending_sessions (
                id, device_id, session_handle, user_id,
                created_at, expires_at, consumed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING
                id, device_id, session_handle, user_id,
                created_at, expires_at, consumed_at
            "#,
        )
        .bind(session.id)
        .bind(&session.device_id)
        .bind(&session.session_handle)
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.consumed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error creating pending session: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        tx.commit().await.map_err(|e: sqlx::Error| {
            error!("Database error committing transaction: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.into())
    }

    async fn find_live_by_device(
        &self,
        device_id: &str,
    ) -> Result<Option<PendingSession>, DomainError> {
        let row: Option<PendingSessionRow> = sqlx::query_as(
            r#"
            SELECT
                id, device_id, session_handle, user_id,
                created_at, expires_at, consumed_at
            FROM pending_sessions
            WHERE device_id = $1 AND consumed_at IS NULL AND expires_at > NOW()
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(device_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error finding pending session by device: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(row.map(|r| r.into()))
    }

    async fn consume(&self, session_handle: &str) -> Result<PendingSession, DomainError> {
        // Conditional update: concurrent callers for the same handle
        // resolve to exactly one winner.
        let row: Option<PendingSessionRow> = sqlx::query_as(
            r#"
            UPDATE pending_sessions
            SET consumed_at = NOW()
            WHERE session_handle = $1 AND consumed_at IS NULL AND expires_at > NOW()
            RETURNING
                id, device_id, session_handle, user_id,
                created_at, expires_at, consumed_at
            "#,
        )
        .bind(session_handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error consuming pending session: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        if let Some(row) = row {
            return Ok(row.into());
        }

        // Losing callers are told why they lost.
        let existing: Option<PendingSessionRow> = sqlx::query_as(
            r#"
            SELECT
                id, device_id, session_handle, user_id,
                created_at, expires_at, consumed_at
            FROM pending_sessions
            WHERE session_handle = $1
            "#,
        )
        .bind(session_handle)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error classifying consume failure: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        match existing {
            None => Err(DomainError::PendingSessionNotFound),
            Some(row) if row.consumed_at.is_some() => Err(DomainError::AlreadyConsumed),
            Some(_) => Err(DomainError::PendingSessionExpired),
        }
    }

    async fn purge_expired(&self, retention_seconds: i64) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM pending_sessions
            WHERE expires_at < NOW() - make_interval(secs => $1)
            "#,
        )
        .bind(retention_seconds as f64)
        .execute(&self.pool)
        .await
        .map_err(|e: sqlx::Error| {
            error!("Database error purging pending sessions: {}", e);
            DomainError::DatabaseError(e.to_string())
        })?;

        Ok(result.rows_affected())
    }
}
