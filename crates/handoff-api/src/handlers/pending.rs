// ============================================================================
// Handoff API - Pending Session Handlers
// File: crates/handoff-api/src/handlers/pending.rs
// ============================================================================
//! Pending-session endpoints: create, lookup, consume

use axum::extract::State;
use axum::Json;
use tracing::{debug, warn};
use validator::Validate;

use handoff_core::error::DomainError;
use handoff_core::repositories::PendingSessionRepository;
use handoff_core::services::MaterializeOutcome;
use handoff_shared::types::{
    AppSessionDto, ConsumeRequest, ConsumeResponse, CreatePendingRequest, CreatePendingResponse,
    LookupRequest, LookupResponse,
};

use crate::error::ApiError;
use crate::state::AppState;

/// Create handler - POST /auth/pending/create
///
/// Internal endpoint: the identity-provider callback handler calls this
/// once the provider token has been verified.
pub async fn create_pending<R: PendingSessionRepository>(
    State(state): State<AppState<R>>,
    Json(payload): Json<CreatePendingRequest>,
) -> Result<Json<CreatePendingResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let pending = state
        .service
        .begin_handoff(&payload.device_id, payload.user_id)
        .await?;

    Ok(Json(CreatePendingResponse {
        session_handle: pending.session_handle,
        expires_at: pending.expires_at,
    }))
}

/// Lookup handler - POST /auth/pending/lookup
///
/// "Not found" is a normal `found: false` response, never an error status.
pub async fn lookup_pending<R: PendingSessionRepository>(
    State(state): State<AppState<R>>,
    Json(payload): Json<LookupRequest>,
) -> Result<Json<LookupResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let pending = state.service.pending_for_device(&payload.device_id).await?;

    let response = match pending {
        Some(pending) => LookupResponse {
            found: true,
            session_handle: Some(pending.session_handle),
            user_id: Some(pending.user_id),
        },
        None => LookupResponse::not_found(),
    };

    Ok(Json(response))
}

/// Consume handler - POST /auth/pending/consume
///
/// All four protocol outcomes ride HTTP 200; the `status` field is the
/// discriminant. Transport-level problems (bad payload, server faults)
/// use error statuses instead.
pub async fn consume_pending<R: PendingSessionRepository>(
    State(state): State<AppState<R>>,
    Json(payload): Json<ConsumeRequest>,
) -> Result<Json<ConsumeResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    match state.service.materialize(&payload.session_handle).await {
        Ok(MaterializeOutcome::Completed(session)) => {
            Ok(Json(ConsumeResponse::ok(AppSessionDto {
                session_id: session.session_id,
                user_id: session.user_id,
                access_token: session.access_token,
                refresh_token: session.refresh_token,
                expires_at: session.expires_at,
            })))
        }
        Ok(MaterializeOutcome::AlreadyConsumed) => {
            debug!("Consume lost the race for this handle");
            Ok(Json(ConsumeResponse::already_consumed()))
        }
        Err(DomainError::PendingSessionExpired) => Ok(Json(ConsumeResponse::expired())),
        Err(DomainError::PendingSessionNotFound) => {
            warn!("Consume requested for a handle that never existed");
            Ok(Json(ConsumeResponse::not_found()))
        }
        Err(e) => Err(e.into()),
    }
}
