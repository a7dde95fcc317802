pub mod report;

use crate::config::{AppConfig, BackendSettings, FilesystemSettings, S3Settings};
use crate::error::ConfigError;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for dicometa
#[derive(Parser, Debug)]
#[command(name = "dicometa")]
#[command(about = "DICOM metadata extraction from object storage")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// JSON configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub backend: BackendArgs,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract metadata of one object
    Extract {
        /// Object identifier, "bucket/key"
        #[arg(value_name = "PATH")]
        path: String,

        /// Comma-separated keywords to keep
        #[arg(long, value_name = "A,B,...")]
        fields: Option<String>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List commonly requested keywords
    Fields {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the HTTP server
    Serve {
        /// Address to listen on, overrides the configuration
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<String>,
    },
}

/// Backend overrides applied on top of the configuration file
#[derive(Args, Debug, Default, Clone)]
pub struct BackendArgs {
    /// Storage backend
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// Root directory of the filesystem backend
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// S3 region
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// S3 endpoint URL
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Legacy secrets.json with S3 region and credentials
    #[arg(long, global = true, value_name = "FILE")]
    pub secrets: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    S3,
    Filesystem,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON format
    Json,
}

impl BackendArgs {
    /// Applies the overrides to `config`
    ///
    /// `--root` alone selects the filesystem backend.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the filesystem backend ends up
    /// without a root, or when S3 options are given for it.
    pub fn apply(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
        let kind = self.backend.or_else(|| {
            self.root.as_ref().map(|_| BackendKind::Filesystem)
        });

        match kind {
            Some(BackendKind::Filesystem) => {
                let root = match (&self.root, &config.backend) {
                    (Some(root), _) => root.clone(),
                    (None, BackendSettings::Filesystem(fs)) => fs.root.clone(),
                    (None, _) => {
                        return Err(ConfigError::Invalid(
                            "--root is required for the filesystem backend".to_string(),
                        ))
                    }
                };
                config.backend = BackendSettings::Filesystem(FilesystemSettings { root });
            }
            Some(BackendKind::S3) => {
                if !matches!(config.backend, BackendSettings::S3(_)) {
                    config.backend = BackendSettings::S3(S3Settings::default());
                }
            }
            None => {}
        }

        match &mut config.backend {
            BackendSettings::S3(s3) => {
                if let Some(region) = &self.region {
                    s3.region = Some(region.clone());
                }
                if let Some(endpoint) = &self.endpoint {
                    s3.endpoint = Some(endpoint.clone());
                }
                if let Some(secrets) = &self.secrets {
                    s3.secrets_file = Some(secrets.clone());
                }
            }
            BackendSettings::Filesystem(_) => {
                if self.region.is_some() || self.endpoint.is_some() || self.secrets.is_some() {
                    return Err(ConfigError::Invalid(
                        "--region, --endpoint and --secrets only apply to the s3 backend"
                            .to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}
