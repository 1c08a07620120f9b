//! Auth-callback deep-link parsing
//!
//! The OS hands the app the last launch URL on every launch, and it hands
//! it over again on subsequent relaunches until a new link overwrites it.
//! Parsing is therefore side-effect free and makes no attempt to
//! deduplicate; unrelated URLs yield `None`, never an error.

use tracing::debug;
use url::Url;
use uuid::Uuid;

use handoff_shared::constants::{
    DEEP_LINK_HANDLE_PARAM, DEEP_LINK_HOST, DEEP_LINK_PATH, DEEP_LINK_SCHEME, DEEP_LINK_USER_PARAM,
};

/// Parsed auth-callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandoffRequest {
    pub session_handle: String,
    /// Diagnostic only; the server is the source of truth for the user,
    /// never the URL's claim.
    pub user_id_hint: Option<Uuid>,
}

/// Extract a handoff request from a launch URL, if it is one.
pub fn parse_deep_link(raw: &str) -> Option<SessionHandoffRequest> {
    let url = Url::parse(raw).ok()?;

    if url.scheme() != DEEP_LINK_SCHEME
        || url.host_str() != Some(DEEP_LINK_HOST)
        || url.path() != DEEP_LINK_PATH
    {
        return None;
    }

    let mut session_handle = None;
    let mut user_id_hint = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            k if k == DEEP_LINK_HANDLE_PARAM => session_handle = Some(value.into_owned()),
            k if k == DEEP_LINK_USER_PARAM => user_id_hint = Uuid::parse_str(&value).ok(),
            _ => {}
        }
    }

    let session_handle = session_handle.filter(|h| !h.is_empty())?;

    debug!("Parsed auth callback deep link");
    Some(SessionHandoffRequest {
        session_handle,
        user_id_hint,
    })
}
