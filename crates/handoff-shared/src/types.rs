//! Wire types shared by the server API and the client transport.
//!
//! Both sides of the protocol deserialize from the same definitions, so the
//! JSON bodies cannot drift apart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePendingRequest {
    #[validate(length(min = 8, max = 128, message = "deviceId must be between 8 and 128 characters"))]
    pub device_id: String,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePendingResponse {
    pub session_handle: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    #[validate(length(min = 8, max = 128, message = "deviceId must be between 8 and 128 characters"))]
    pub device_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_handle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

impl LookupResponse {
    pub fn not_found() -> Self {
        Self {
            found: false,
            session_handle: None,
            user_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeRequest {
    #[validate(length(min = 16, max = 128, message = "sessionHandle has an unexpected length"))]
    pub session_handle: String,
}

/// Protocol outcome of a consume call. All four ride HTTP 200; this field
/// is the discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumeStatus {
    Ok,
    AlreadyConsumed,
    Expired,
    NotFound,
}

/// Credentials of the standard authenticated app session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSessionDto {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumeResponse {
    pub status: ConsumeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_session: Option<AppSessionDto>,
}

impl ConsumeResponse {
    pub fn ok(app_session: AppSessionDto) -> Self {
        Self {
            status: ConsumeStatus::Ok,
            app_session: Some(app_session),
        }
    }

    pub fn already_consumed() -> Self {
        Self {
            status: ConsumeStatus::AlreadyConsumed,
            app_session: None,
        }
    }

    pub fn expired() -> Self {
        Self {
            status: ConsumeStatus::Expired,
            app_session: None,
        }
    }

    pub fn not_found() -> Self {
        Self {
            status: ConsumeStatus::NotFound,
            app_session: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_status_wire_names() {
        let json = serde_json::to_string(&ConsumeResponse::already_consumed()).unwrap();
        assert_eq!(json, r#"{"status":"already_consumed"}"#);

        let json = serde_json::to_string(&ConsumeResponse::not_found()).unwrap();
        assert_eq!(json, r#"{"status":"not_found"}"#);
    }

    #[test]
    fn test_request_fields_are_camel_case() {
        let request = LookupRequest {
            device_id: "device-12345".to_string(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"deviceId":"device-12345"}"#);
    }

    #[test]
    fn test_device_id_length_bounds() {
        let short = LookupRequest {
            device_id: "abc".to_string(),
        };
        assert!(short.validate().is_err());

        let valid = LookupRequest {
            device_id: "device-12345".to_string(),
        };
        assert!(valid.validate().is_ok());
    }
}
