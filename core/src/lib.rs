//! Extracts DICOM metadata from objects held in S3-compatible storage or a
//! local directory and projects it to JSON.
//!
//! The pipeline is [`storage`] (fetch bytes) → [`decode`] (parse records) →
//! [`projection`] (filter and normalize), composed by [`MetadataExtractor`].

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod decode;
pub mod error;
pub mod projection;
pub mod server;
pub mod storage;
pub mod types;

pub use api::MetadataExtractor;
pub use cli::report::TextReport;
pub use error::{AuthError, ConfigError, ExtractionError, Result};
pub use storage::{FilesystemBackend, ObjectLocation, ObjectStream, S3Backend, StorageBackend};
pub use types::*;
