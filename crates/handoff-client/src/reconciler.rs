// ============================================================================
// Handoff Client - Session Reconciler
// File: crates/handoff-client/src/reconciler.rs
// ============================================================================
//! Reconciliation state machine for picking up a pending session.
//!
//! Two trigger paths feed the same processing funnel: the OS-delivered
//! launch URL and the foreground-gated poller. Whichever fires first wins;
//! the idempotency guard short-circuits the other before it touches the
//! network, and the server's atomic consume arbitrates anything the guard
//! misses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use handoff_shared::constants::{DEFAULT_LOOKUP_MAX_ATTEMPTS, DEFAULT_LOOKUP_RETRY_DELAY_MS};
use handoff_shared::types::{AppSessionDto, ConsumeStatus};

use crate::clock::Sleeper;
use crate::deep_link::parse_deep_link;
use crate::device::DeviceIdentity;
use crate::guard::ProcessedSessionGuard;
use crate::storage::{KeyValueStore, StorageError};
use crate::transport::HandoffTransport;

/// Bounded-retry settings for the foreground poller.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_LOOKUP_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(DEFAULT_LOOKUP_RETRY_DELAY_MS),
        }
    }
}

/// Outcome of one trigger (launch URL or foreground event), surfaced to
/// the embedding shell.
#[derive(Debug, Clone)]
pub enum HandoffOutcome {
    /// Nothing materialized on this trigger: no login is in progress, or
    /// its callback has not landed yet. The next trigger tries again.
    Pending,
    /// The handoff completed here; credentials attached.
    Complete(AppSessionDto),
    /// This handle was already handled, by an earlier launch or by the
    /// other trigger path. Invisible to the user.
    AlreadyHandled,
    /// The pending session outlived its TTL; prompt a fresh sign-in.
    Expired,
    /// Correctness signal (forged handle, storage fault, network failure
    /// on consume); fall back to the login screen.
    Failed(String),
}

impl HandoffOutcome {
    /// Event name emitted to the WebView layer.
    pub fn as_event(&self) -> &'static str {
        match self {
            HandoffOutcome::Pending => "handoff_pending",
            HandoffOutcome::Complete(_) => "handoff_complete",
            HandoffOutcome::AlreadyHandled => "handoff_noop",
            HandoffOutcome::Expired => "handoff_expired",
            HandoffOutcome::Failed(_) => "handoff_error",
        }
    }
}

pub struct SessionReconciler {
    transport: Arc<dyn HandoffTransport>,
    guard: ProcessedSessionGuard,
    device: DeviceIdentity,
    sleeper: Arc<dyn Sleeper>,
    config: PollConfig,
    // Bumped on every foreground event; in-flight poll sequences notice
    // and abandon themselves instead of stacking.
    poll_generation: AtomicU64,
}

impl SessionReconciler {
    pub fn new(
        transport: Arc<dyn HandoffTransport>,
        store: Arc<dyn KeyValueStore>,
        sleeper: Arc<dyn Sleeper>,
        config: PollConfig,
    ) -> Self {
        Self {
            transport,
            guard: ProcessedSessionGuard::new(Arc::clone(&store)),
            device: DeviceIdentity::new(store),
            sleeper,
            config,
            poll_generation: AtomicU64::new(0),
        }
    }

    /// Feed the OS-delivered launch URL through the funnel.
    ///
    /// Unrelated URLs are silently ignored; the OS redelivers the last
    /// launch URL on every relaunch, so an already-handled callback is a
    /// quiet no-op.
    pub async fn handle_launch_url(&self, raw_url: &str) -> HandoffOutcome {
        match parse_deep_link(raw_url) {
            Some(request) => self.process_handle(&request.session_handle).await,
            None => HandoffOutcome::Pending,
        }
    }

    /// React to a foreground transition (launch, resume, visibility).
    ///
    /// Polls the server for a pending session with a bounded number of
    /// fixed-delay attempts, bridging the race where the browser's OAuth
    /// callback is still in flight when the app resumes. Running out of
    /// attempts is the normal "no login in progress" case, not an error.
    pub async fn on_foreground(&self) -> HandoffOutcome {
        let generation = self.poll_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let device_id = match self.device.device_id() {
            Ok(id) => id,
            Err(e) => {
                warn!("Device identity unavailable: {}", e);
                return HandoffOutcome::Failed(e.to_string());
            }
        };

        for attempt in 1..=self.config.max_attempts {
            if self.superseded(generation) {
                debug!("Poll sequence superseded by a newer foreground event");
                return HandoffOutcome::Pending;
            }

            match self.transport.lookup(&device_id).await {
                Ok(response) if response.found => match response.session_handle {
                    Some(handle) => return self.process_handle(&handle).await,
                    None => warn!("Lookup reported found without a session handle"),
                },
                Ok(_) => {
                    debug!(
                        "No pending session (attempt {}/{})",
                        attempt, self.config.max_attempts
                    );
                }
                // Transient failures spend retry budget like a miss.
                Err(e) => {
                    debug!(
                        "Lookup failed (attempt {}/{}): {}",
                        attempt, self.config.max_attempts, e
                    );
                }
            }

            if attempt < self.config.max_attempts {
                self.sleeper.sleep(self.config.retry_delay).await;
                if self.superseded(generation) {
                    debug!("Poll sequence superseded while sleeping");
                    return HandoffOutcome::Pending;
                }
            }
        }

        debug!("Poll budget exhausted; no login in progress");
        HandoffOutcome::Pending
    }

    /// Clear the processed marker. Logout only; session expiry never
    /// touches it.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.guard.clear()
    }

    async fn process_handle(&self, session_handle: &str) -> HandoffOutcome {
        match self.guard.should_process(session_handle) {
            Ok(true) => {}
            Ok(false) => {
                debug!("Session handle already handled on this device");
                return HandoffOutcome::AlreadyHandled;
            }
            Err(e) => return HandoffOutcome::Failed(e.to_string()),
        }

        // The marker goes down before the request goes out: a relaunch
        // mid-flight must not re-process this handle.
        if let Err(e) = self.guard.mark_processing(session_handle) {
            return HandoffOutcome::Failed(e.to_string());
        }

        match self.transport.consume(session_handle).await {
            Ok(response) => match response.status {
                ConsumeStatus::Ok => match response.app_session {
                    Some(session) => {
                        info!("Session handoff complete for user: {}", session.user_id);
                        HandoffOutcome::Complete(session)
                    }
                    None => {
                        warn!("Consume returned ok without session credentials");
                        HandoffOutcome::Failed("missing app session in consume response".into())
                    }
                },
                ConsumeStatus::AlreadyConsumed => {
                    debug!("Handoff already completed by the other trigger path");
                    HandoffOutcome::AlreadyHandled
                }
                ConsumeStatus::Expired => {
                    info!("Pending session expired before pickup");
                    HandoffOutcome::Expired
                }
                ConsumeStatus::NotFound => {
                    warn!("Server does not know this session handle");
                    HandoffOutcome::Failed("unknown session handle".into())
                }
            },
            Err(e) => {
                warn!("Consume request failed: {}", e);
                HandoffOutcome::Failed(e.to_string())
            }
        }
    }

    fn superseded(&self, generation: u64) -> bool {
        self.poll_generation.load(Ordering::SeqCst) != generation
    }
}
