use std::path::PathBuf;
use thiserror::Error;

/// Result type for metadata extraction operations
pub type Result<T, E = ExtractionError> = std::result::Result<T, E>;

/// Error kinds surfaced by the extraction pipeline
///
/// Every component fails with the most specific kind it can determine.
/// The message is meant for humans; callers branch on the variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// Malformed identifier or missing request field
    #[error("{0}")]
    InvalidInput(String),

    /// Object absent at the backend
    #[error("{0}")]
    NotFound(String),

    /// Transport, permission, throttling or any other backend error
    #[error("{0}")]
    BackendFailure(String),

    /// The fetched object is not valid DICOM
    #[error("{0}")]
    DecodeFailure(String),
}

impl ExtractionError {
    /// Short, stable name of the error kind, used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionError::InvalidInput(_) => "invalid_input",
            ExtractionError::NotFound(_) => "not_found",
            ExtractionError::BackendFailure(_) => "backend_failure",
            ExtractionError::DecodeFailure(_) => "decode_failure",
        }
    }

    /// Whether the failure is caused by the request or the object rather than
    /// the infrastructure
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ExtractionError::BackendFailure(_))
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for ExtractionError {
    fn from(e: dicom_object::ReadError) -> Self {
        ExtractionError::DecodeFailure(format!("Invalid DICOM data: {}", e))
    }
}

/// Errors raised while loading the process configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for the expected shape
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration values are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors raised by the mock login flow
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The identity provider rejected the authorization code
    #[error("Invalid mock code")]
    InvalidCode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = ExtractionError::NotFound("S3 key not found: bucket/missing.dcm".to_string());
        assert_eq!(err.to_string(), "S3 key not found: bucket/missing.dcm");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ExtractionError::InvalidInput(String::new()).kind(), "invalid_input");
        assert_eq!(ExtractionError::NotFound(String::new()).kind(), "not_found");
        assert_eq!(
            ExtractionError::BackendFailure(String::new()).kind(),
            "backend_failure"
        );
        assert_eq!(
            ExtractionError::DecodeFailure(String::new()).kind(),
            "decode_failure"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(ExtractionError::InvalidInput(String::new()).is_client_error());
        assert!(ExtractionError::NotFound(String::new()).is_client_error());
        assert!(ExtractionError::DecodeFailure(String::new()).is_client_error());
        assert!(!ExtractionError::BackendFailure(String::new()).is_client_error());
    }

    #[test]
    fn test_config_error_mentions_path() {
        let err = ConfigError::Io {
            path: PathBuf::from("/etc/dicometa.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.to_string().contains("/etc/dicometa.json"));
    }
}
