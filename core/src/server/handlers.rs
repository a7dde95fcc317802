//! Route handlers

use super::types::{
    AuthorizeQuery, CallbackRequest, ErrorResponse, HealthResponse, LoginResponse, LogoutRequest,
    MetadataRequest,
};
use super::AppState;
use crate::api::MetadataExtractor;
use crate::auth::{UserInfo, MOCK_AUTH_CODE};
use crate::error::{AuthError, ExtractionError};
use crate::types::MetadataMap;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, info, warn};
use url::Url;

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "The server is running",
    })
}

/// `GET /api/common-fields`
pub async fn common_fields() -> Json<&'static [&'static str]> {
    Json(MetadataExtractor::common_fields())
}

/// `POST /api/dicom-metadata`
pub async fn dicom_metadata(
    State(state): State<AppState>,
    payload: Result<Json<MetadataRequest>, JsonRejection>,
) -> Result<Json<MetadataMap>, ApiError> {
    let Json(request) = payload?;

    let path = match request.path.as_deref() {
        Some(path) if !path.is_empty() => path,
        _ => {
            return Err(ExtractionError::InvalidInput("Missing 'path' parameter".to_string()).into())
        }
    };

    info!("Metadata requested for {}", path);
    let metadata = state
        .extractor
        .extract(path, request.fields.as_ref())
        .await?;
    Ok(Json(metadata))
}

/// `GET /api/auth/login`
pub async fn login(State(state): State<AppState>) -> Json<LoginResponse> {
    Json(LoginResponse {
        login_url: state.auth.login_url(),
    })
}

/// `POST /api/auth/callback`
pub async fn auth_callback(
    State(state): State<AppState>,
    payload: Result<Json<CallbackRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = payload?;
    let session = state.auth.handle_callback(&request.code)?;
    Ok(Json(session).into_response())
}

/// `GET /api/auth/session/{session_id}`
pub async fn session_user(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<UserInfo>, ApiError> {
    state
        .auth
        .user_for_session(&session_id)
        .map(Json)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Unknown session"))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(state): State<AppState>,
    payload: Result<Json<LogoutRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    state.auth.logout(&request.session_id);
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /mock-idp/authorize`
///
/// Stands in for the provider's consent page: immediately sends the browser
/// back to the frontend with the accepted code.
pub async fn mock_idp_authorize(
    State(state): State<AppState>,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Response, ApiError> {
    let mut location = Url::parse(&state.frontend_callback_url).map_err(|e| {
        ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Invalid frontend callback URL: {}", e),
        )
    })?;
    location
        .query_pairs_mut()
        .append_pair("code", MOCK_AUTH_CODE)
        .append_pair("state", &query.state);

    Ok((StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response())
}

/// Error response carrying `{"error": "..."}`
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// HTTP status for each extraction error kind
pub fn status_for(err: &ExtractionError) -> StatusCode {
    match err {
        ExtractionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ExtractionError::NotFound(_) => StatusCode::NOT_FOUND,
        ExtractionError::DecodeFailure(_) => StatusCode::BAD_REQUEST,
        ExtractionError::BackendFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ExtractionError> for ApiError {
    fn from(err: ExtractionError) -> Self {
        Self::new(status_for(&err), err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("{}: {}", self.status, self.message);
        } else {
            warn!("{}: {}", self.status, self.message);
        }
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ExtractionError::InvalidInput(String::new())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ExtractionError::NotFound(String::new())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&ExtractionError::DecodeFailure(String::new())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&ExtractionError::BackendFailure(String::new())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
