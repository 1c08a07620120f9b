//! Router assembly

use axum::routing::{get, post};
use axum::Router;

use handoff_core::repositories::PendingSessionRepository;
use handoff_shared::constants::{
    ROUTE_PENDING_CONSUME, ROUTE_PENDING_CREATE, ROUTE_PENDING_LOOKUP,
};

use crate::handlers::{health, pending};
use crate::state::AppState;

pub fn router<R: PendingSessionRepository + 'static>(state: AppState<R>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route(ROUTE_PENDING_CREATE, post(pending::create_pending::<R>))
        .route(ROUTE_PENDING_LOOKUP, post(pending::lookup_pending::<R>))
        .route(ROUTE_PENDING_CONSUME, post(pending::consume_pending::<R>))
        .with_state(state)
}
