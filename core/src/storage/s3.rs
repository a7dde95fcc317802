use super::{ObjectLocation, ObjectStream, StorageBackend};
use crate::config::S3Settings;
use crate::error::{ExtractionError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::Client;
use log::{debug, error};

/// Error codes S3 uses for a missing object
const NOT_FOUND_CODES: [&str; 3] = ["NoSuchKey", "NotFound", "404"];

/// Backend reading "bucket/key" objects from S3 or an S3-compatible store
#[derive(Debug, Clone)]
pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from settings
    ///
    /// Expects settings already merged with their secrets file (see
    /// [`S3Settings::resolve`]). Static credentials are used when both key
    /// parts are present; otherwise the default AWS provider chain applies.
    pub async fn from_settings(settings: &S3Settings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        if settings.has_static_credentials() {
            debug!("Using static S3 credentials");
            loader = loader.credentials_provider(Credentials::new(
                settings.access_key_id.clone().unwrap_or_default(),
                settings.secret_access_key.clone().unwrap_or_default(),
                settings.session_token.clone(),
                None,
                "dicometa",
            ));
        } else {
            debug!("No static S3 credentials, using the default provider chain");
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style)
            .build();

        Self::new(Client::from_conf(s3_config))
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn fetch(&self, identifier: &str) -> Result<ObjectStream> {
        let location = ObjectLocation::parse(identifier).map_err(|_| {
            ExtractionError::InvalidInput(format!(
                "Invalid S3 path format. Expected 'bucket/key', got '{}'",
                identifier
            ))
        })?;
        debug!("S3 bucket: {}, key: {}", location.container, location.key);

        let response = self
            .client
            .get_object()
            .bucket(&location.container)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| classify_error(identifier, e))?;

        let body = response.body.collect().await.map_err(|e| {
            error!("Failed to read S3 object body for {}: {}", identifier, e);
            ExtractionError::BackendFailure(format!("Error downloading from S3: {}", e))
        })?;

        Ok(ObjectStream::from_bytes(identifier, body.to_vec()))
    }
}

/// Maps a GetObject failure onto the error taxonomy
fn classify_error(identifier: &str, err: SdkError<GetObjectError>) -> ExtractionError {
    let code = err.as_service_error().and_then(|e| e.code());
    let status = err.raw_response().map(|r| r.status().as_u16());

    if is_not_found(code, status) {
        ExtractionError::NotFound(format!("S3 key not found: {}", identifier))
    } else {
        let message = format!("S3 error: {}", DisplayErrorContext(&err));
        error!("Fetching {} failed: {}", identifier, message);
        ExtractionError::BackendFailure(message)
    }
}

/// Decides "object missing" from the service error code
///
/// The HTTP status is only consulted when the service sent no code, so a
/// missing bucket (404 with "NoSuchBucket") stays a backend failure.
fn is_not_found(code: Option<&str>, status: Option<u16>) -> bool {
    match code {
        Some(code) => NOT_FOUND_CODES.contains(&code),
        None => status == Some(404),
    }
}
