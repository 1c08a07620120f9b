//! Application-wide constants

/// Application scheme the OS routes to the installed app.
pub const DEEP_LINK_SCHEME: &str = "fittrack";
/// Host marker of the auth callback deep link.
pub const DEEP_LINK_HOST: &str = "auth";
/// Path marker of the auth callback deep link.
pub const DEEP_LINK_PATH: &str = "/callback";
pub const DEEP_LINK_HANDLE_PARAM: &str = "session_handle";
pub const DEEP_LINK_USER_PARAM: &str = "user_id";

pub const ROUTE_PENDING_CREATE: &str = "/auth/pending/create";
pub const ROUTE_PENDING_LOOKUP: &str = "/auth/pending/lookup";
pub const ROUTE_PENDING_CONSUME: &str = "/auth/pending/consume";

/// Durable client storage key for the per-install device identifier.
pub const DEVICE_ID_STORAGE_KEY: &str = "handoff.device_id";
/// Durable client storage key for the last materialized session handle.
pub const PROCESSED_SESSION_STORAGE_KEY: &str = "handoff.processed_session";

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";
pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 900;
pub const DEFAULT_REFRESH_TOKEN_EXPIRY: i64 = 604_800;

/// Pending sessions bridge a single login attempt: minutes, not hours.
pub const DEFAULT_PENDING_TTL_SECONDS: i64 = 300;
pub const DEFAULT_RETENTION_SECONDS: i64 = 3_600;
pub const DEFAULT_SWEEP_INTERVAL_SECONDS: u64 = 60;

pub const DEFAULT_LOOKUP_MAX_ATTEMPTS: u32 = 6;
pub const DEFAULT_LOOKUP_RETRY_DELAY_MS: u64 = 2_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;
