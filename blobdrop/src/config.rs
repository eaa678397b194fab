//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `blobdrop.yaml` but can be specified via `-f` flag or `BLOBDROP_CONFIG`
//! environment variable.
//!
//! ## Loading Priority
//!
//! Configuration sources are merged in the following order (later sources override earlier ones):
//!
//! 1. **YAML config file** - Base configuration (default: `blobdrop.yaml`)
//! 2. **Environment variables** - Variables prefixed with `BLOBDROP_` override YAML values
//! 3. **AZURE_STORAGE_ACCOUNT / AZURE_STORAGE_SAS_TOKEN** - Special case: override
//!    `storage.account_name` and `storage.sas_token` if set
//!
//! For nested config values, use double underscores in environment variables. For example,
//! `BLOBDROP_STORAGE__CONTAINER_NAME=uploads` sets the `storage.container_name` field.
//!
//! ## Example
//!
//! ```yaml
//! storage:
//!   account_name: mystorageaccount
//!   container_name: uploads
//!   sas_token: "sv=2022-11-02&ss=b&srt=o&sp=cw&se=2026-12-31T00:00:00Z&sig=..."
//! upload:
//!   timeout: 30s
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use blobdrop::config::{Args, Config};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let args = Args::parse();
//! let config = Config::load(&args)?;
//!
//! println!("Uploading into {}/{}", config.storage.account_name, config.storage.container_name);
//! # Ok(())
//! # }
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use url::Url;

use crate::errors::Error;

/// Upload a local file into an Azure Blob Storage container through a SAS URL
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "BLOBDROP_CONFIG", default_value = "blobdrop.yaml")]
    pub config: String,

    /// Validate configuration and exit without uploading anything.
    #[arg(long)]
    pub validate: bool,

    /// Open the uploaded blob in the default browser once the upload succeeds
    #[arg(long)]
    pub open: bool,

    /// File to upload
    #[arg(required_unless_present = "validate")]
    pub file: Option<PathBuf>,
}

/// Main application configuration.
///
/// All fields have defaults so a partial YAML file is accepted; [`Config::validate`]
/// rejects the combinations that cannot produce a working upload.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Where uploads go
    pub storage: StorageConfig,
    /// HTTP behaviour of the upload request
    pub upload: UploadConfig,
    /// Notification channel settings
    pub notifications: NotificationsConfig,
    /// Enable OpenTelemetry OTLP export for distributed tracing
    pub enable_otel_export: bool,
}

/// Storage account, container and credential.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Storage account name (the `{account}` in `{account}.blob.core.windows.net`)
    pub account_name: String,
    /// Target container
    pub container_name: String,
    /// Pre-generated SAS token, with or without the leading `?`
    pub sas_token: String,
    /// Optional blob service endpoint replacing `https://{account}.blob.core.windows.net`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Url>,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("account_name", &self.account_name)
            .field("container_name", &self.container_name)
            .field("sas_token", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadConfig {
    /// Whole-request timeout. Unset means the HTTP client's default (no timeout).
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Buffered notifications per subscriber before the slowest one starts lagging
    pub channel_capacity: usize,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { channel_capacity: 16 }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.storage.account_name.trim().is_empty() {
            return Err(Error::Config {
                message: "storage.account_name is not configured. Set BLOBDROP_STORAGE__ACCOUNT_NAME or add it to the config file."
                    .to_string(),
            });
        }

        if self.storage.container_name.trim().is_empty() {
            return Err(Error::Config {
                message: "storage.container_name is not configured. Set BLOBDROP_STORAGE__CONTAINER_NAME or add it to the config file."
                    .to_string(),
            });
        }

        if self.storage.sas_token.trim_start_matches('?').trim().is_empty() {
            return Err(Error::Config {
                message: "storage.sas_token is not configured. Set AZURE_STORAGE_SAS_TOKEN or add it to the config file.".to_string(),
            });
        }

        if self.notifications.channel_capacity == 0 {
            return Err(Error::Config {
                message: "notifications.channel_capacity cannot be 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables can override specific values
            .merge(Env::prefixed("BLOBDROP_").ignore(&["CONFIG"]).split("__"))
            // Conventional Azure variable names
            .merge(
                Env::raw()
                    .only(&["AZURE_STORAGE_ACCOUNT"])
                    .map(|_| "storage.account_name".into()),
            )
            .merge(
                Env::raw()
                    .only(&["AZURE_STORAGE_SAS_TOKEN"])
                    .map(|_| "storage.sas_token".into()),
            )
    }
}
