use super::{ObjectLocation, ObjectStream, StorageBackend};
use crate::error::{ConfigError, ExtractionError, Result};
use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Backend serving objects from a local directory tree
///
/// "container/key" resolves to `<root>/container/key`. Keys that would
/// leave the root are rejected.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Creates a backend rooted at an existing directory
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `root` is not a directory.
    pub fn new(root: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "filesystem root {} is not a directory",
                root.display()
            )));
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a location to a path below the root
    fn resolve(&self, location: &ObjectLocation, identifier: &str) -> Result<PathBuf> {
        let relative = Path::new(&location.container).join(&location.key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(ExtractionError::InvalidInput(format!(
                "Invalid path '{}': only plain 'bucket/key' names are allowed",
                identifier
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    fn name(&self) -> &'static str {
        "filesystem"
    }

    async fn fetch(&self, identifier: &str) -> Result<ObjectStream> {
        let location = ObjectLocation::parse(identifier)?;
        let path = self.resolve(&location, identifier)?;
        debug!("Opening {}", path.display());

        let file = tokio::fs::File::open(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                ExtractionError::NotFound(format!("File not found: {}", identifier))
            }
            _ => ExtractionError::BackendFailure(format!(
                "Error reading {}: {}",
                identifier, e
            )),
        })?;

        let metadata = file.metadata().await.map_err(|e| {
            ExtractionError::BackendFailure(format!("Error reading {}: {}", identifier, e))
        })?;
        if !metadata.is_file() {
            return Err(ExtractionError::NotFound(format!(
                "File not found: {}",
                identifier
            )));
        }

        Ok(ObjectStream::new(identifier, file.into_std().await))
    }
}
