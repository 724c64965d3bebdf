//! Authority client seam and the externally defined access payload.
//!
//! # Purpose
//! The authority service owns the wire shape; this module mirrors it
//! for decoding and defines the async seam the resolver fetches
//! through. An HTTP implementation is shipped; tests substitute mocks.
//!
//! # Key invariants
//! - `success: false` and transport-level failures are equivalent to
//!   the resolver; both collapse into the deny-all failure path.
//! - Payload maps are passed through verbatim for non-privileged
//!   roles; no local widening happens here or anywhere downstream.
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use vital_access::Quota;

#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("authority unreachable: {0}")]
    Transport(String),
    #[error("authority returned status {0}")]
    Status(u16),
    #[error("authority response malformed: {0}")]
    Decode(String),
}

pub type AuthorityResult<T> = Result<T, AuthorityError>;

/// Wire shape returned by the authority's access endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessPayload {
    pub success: bool,
    #[serde(default)]
    pub user: Option<PayloadUser>,
    #[serde(default)]
    pub permissions: HashMap<String, bool>,
    #[serde(default)]
    pub dashboard_features: HashMap<String, bool>,
    #[serde(default)]
    pub quota: Option<Quota>,
}

/// User object inside the payload. The role arrives as a raw string
/// and is parsed against the closed enumeration by the resolver so an
/// unknown role surfaces as a malformed payload, not a panic.
#[derive(Debug, Clone, Deserialize)]
pub struct PayloadUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Fetch the access payload for the presented bearer token.
    async fn fetch_access(&self, token: &str) -> AuthorityResult<AccessPayload>;
}

/// HTTP authority client hitting `GET {base}/v1/access/me`.
#[derive(Clone)]
pub struct HttpAuthorityClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuthorityClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AuthorityResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AuthorityError::Transport(err.to_string()))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl AuthorityClient for HttpAuthorityClient {
    async fn fetch_access(&self, token: &str) -> AuthorityResult<AccessPayload> {
        let url = format!("{}/v1/access/me", self.base_url);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|err| AuthorityError::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(AuthorityError::Status(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|err| AuthorityError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_decodes_full_shape() {
        let json = r#"{
            "success": true,
            "user": {"id": "u1", "email": "doc@vital.example", "role": "doctor"},
            "permissions": {"can_view_reports": true},
            "dashboard_features": {"telemedicine_module": true},
            "quota": {"enabled": true, "reset_period": "daily", "per_role_max": {"doctor": 5}}
        }"#;
        let payload: AccessPayload = serde_json::from_str(json).expect("decode");
        assert!(payload.success);
        let user = payload.user.expect("user");
        assert_eq!(user.role, "doctor");
        assert_eq!(payload.permissions.get("can_view_reports"), Some(&true));
        assert!(payload.quota.expect("quota").enabled);
    }

    #[test]
    fn payload_tolerates_missing_optional_sections() {
        let json = r#"{"success": false}"#;
        let payload: AccessPayload = serde_json::from_str(json).expect("decode");
        assert!(!payload.success);
        assert!(payload.user.is_none());
        assert!(payload.permissions.is_empty());
        assert!(payload.dashboard_features.is_empty());
        assert!(payload.quota.is_none());
    }

    #[test]
    fn error_display_variants() {
        let errors = vec![
            AuthorityError::Transport("connection refused".to_string()),
            AuthorityError::Status(503),
            AuthorityError::Decode("missing field".to_string()),
        ];
        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
