//! # Handoff Client
//!
//! Client half of the session-handoff protocol: deep-link parsing,
//! foreground-gated reconciliation polling, and durable idempotent
//! processing of pending sessions.
//!
//! The embedding shell wires up a [`storage::KeyValueStore`] backed by its
//! durable storage, a [`transport::HandoffTransport`] pointed at the API,
//! and forwards OS launch-URL and foreground events to the
//! [`SessionReconciler`]:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use handoff_client::clock::TokioSleeper;
//! use handoff_client::storage::MemoryKeyValueStore;
//! use handoff_client::transport::HttpHandoffTransport;
//! use handoff_client::{PollConfig, SessionReconciler};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = HttpHandoffTransport::with_default_timeout("https://api.fittrack.example")?;
//! let reconciler = SessionReconciler::new(
//!     Arc::new(transport),
//!     Arc::new(MemoryKeyValueStore::new()),
//!     Arc::new(TokioSleeper),
//!     PollConfig::default(),
//! );
//!
//! let outcome = reconciler.on_foreground().await;
//! println!("{}", outcome.as_event());
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod deep_link;
pub mod device;
pub mod guard;
pub mod reconciler;
pub mod storage;
pub mod transport;

pub use reconciler::{HandoffOutcome, PollConfig, SessionReconciler};
