//! Storage backends that resolve source identifiers to DICOM bytes
//!
//! A deployment wires exactly one backend, chosen from [`BackendSettings`]
//! at start-up. Identifiers from requests only ever address objects inside
//! that backend.

mod filesystem;
mod s3;

pub use filesystem::FilesystemBackend;
pub use s3::S3Backend;

use crate::config::BackendSettings;
use crate::error::{ConfigError, ExtractionError, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::fmt;
use std::io::{Cursor, Read};
use std::sync::Arc;

/// A source of DICOM objects
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Fetches the object named by `identifier`
    ///
    /// # Errors
    ///
    /// - [`ExtractionError::InvalidInput`] if the identifier is malformed,
    ///   raised before any I/O
    /// - [`ExtractionError::NotFound`] if the object does not exist
    /// - [`ExtractionError::BackendFailure`] for any other failure
    async fn fetch(&self, identifier: &str) -> Result<ObjectStream>;
}

/// Builds the backend described by the configuration
pub async fn connect(
    settings: &BackendSettings,
) -> std::result::Result<Arc<dyn StorageBackend>, ConfigError> {
    let backend: Arc<dyn StorageBackend> = match settings {
        BackendSettings::S3(s3) => Arc::new(S3Backend::from_settings(&s3.resolve()?).await),
        BackendSettings::Filesystem(fs) => Arc::new(FilesystemBackend::new(&fs.root)?),
    };
    info!("Using {} storage backend", backend.name());
    Ok(backend)
}

/// Container and key parsed from a source identifier
///
/// The identifier is split at its first '/', so keys may contain further
/// slashes: "bucket/folder/file.dcm" has key "folder/file.dcm".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub container: String,
    pub key: String,
}

impl ObjectLocation {
    /// Parses a "bucket/key" identifier
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::InvalidInput`] when either part is missing
    /// or empty.
    pub fn parse(identifier: &str) -> Result<Self> {
        match identifier.split_once('/') {
            Some((container, key)) if !container.is_empty() && !key.is_empty() => Ok(Self {
                container: container.to_string(),
                key: key.to_string(),
            }),
            _ => Err(ExtractionError::InvalidInput(format!(
                "Invalid path format. Expected 'bucket/key', got '{}'",
                identifier
            ))),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Byte stream of one fetched object
///
/// Owned by exactly one extraction; dropping it releases the underlying
/// buffer or file handle.
pub struct ObjectStream {
    identifier: String,
    reader: Box<dyn Read + Send>,
}

impl ObjectStream {
    /// Wraps any reader
    pub fn new(identifier: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        Self {
            identifier: identifier.into(),
            reader: Box::new(reader),
        }
    }

    /// Wraps an in-memory object body
    pub fn from_bytes(identifier: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(identifier, Cursor::new(bytes))
    }

    /// Identifier the stream was fetched for
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl Read for ObjectStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Drop for ObjectStream {
    fn drop(&mut self) {
        debug!("Released object stream for {}", self.identifier);
    }
}

impl fmt::Debug for ObjectStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStream")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
