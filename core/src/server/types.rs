//! Request and response bodies

use crate::types::FieldFilter;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/dicom-metadata`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataRequest {
    /// Source identifier, "bucket/key"
    #[serde(default)]
    pub path: Option<String>,

    /// Keys to keep; absent means all
    #[serde(default)]
    pub fields: Option<FieldFilter>,
}

/// Body of `POST /api/auth/callback`
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackRequest {
    #[serde(default)]
    pub code: String,
}

/// Body of `POST /api/auth/logout`
#[derive(Debug, Clone, Deserialize)]
pub struct LogoutRequest {
    pub session_id: String,
}

/// Query of `GET /mock-idp/authorize`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizeQuery {
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub login_url: String,
}

/// Error body shared by every endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_request_optional_fields() {
        let req: MetadataRequest = serde_json::from_str(r#"{"path": "bucket/a.dcm"}"#).unwrap();
        assert_eq!(req.path.as_deref(), Some("bucket/a.dcm"));
        assert!(req.fields.is_none());

        let req: MetadataRequest =
            serde_json::from_str(r#"{"path": "bucket/a.dcm", "fields": ["PatientID"]}"#).unwrap();
        assert_eq!(req.fields, Some(FieldFilter::new(["PatientID"])));

        let req: MetadataRequest = serde_json::from_str("{}").unwrap();
        assert!(req.path.is_none());
    }

    #[test]
    fn test_null_fields_mean_no_filter() {
        let req: MetadataRequest =
            serde_json::from_str(r#"{"path": "bucket/a.dcm", "fields": null}"#).unwrap();
        assert!(req.fields.is_none());
    }

    #[test]
    fn test_login_response_uses_camel_case() {
        let json = serde_json::to_string(&LoginResponse {
            login_url: "http://x".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"loginUrl":"http://x"}"#);
    }
}
