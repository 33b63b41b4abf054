//! Configuration types for taskboard

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, path::PathBuf};
use utoipa::ToSchema;

/// Main configuration
///
/// Every field has a default, so an empty JSON object is a valid config.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// REST API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Metadata store settings
    #[serde(default)]
    pub metadata: MetadataConfig,
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults. The loaded config is
    /// validated before it is returned.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            message: format!("cannot read {}: {}", path.display(), e),
            key: None,
        })?;
        let config: Config = serde_json::from_str(&content).map_err(|e| Error::Config {
            message: format!("invalid config file {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot reject on its own
    pub fn validate(&self) -> Result<()> {
        if self.metadata.path.as_os_str().is_empty() {
            return Err(Error::Config {
                message: "metadata store path must not be empty".to_string(),
                key: Some("metadata.path".to_string()),
            });
        }
        Ok(())
    }
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:5244)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,

    /// Log every request through a tracing span (default: true)
    #[serde(default = "default_true")]
    pub request_tracing: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
            request_tracing: true,
        }
    }
}

/// Metadata store configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MetadataConfig {
    /// Backing file (default: "data/metadata.csv")
    #[serde(default = "default_metadata_path")]
    #[schema(value_type = String)]
    pub path: PathBuf,

    /// File format (None = infer from the file extension)
    #[serde(default)]
    pub format: Option<StoreFormat>,
}

impl MetadataConfig {
    /// Format in effect: the configured one, or the one implied by the
    /// file extension (`.json` → JSON, anything else → CSV)
    pub fn effective_format(&self) -> StoreFormat {
        self.format
            .unwrap_or_else(|| StoreFormat::from_path(&self.path))
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            path: default_metadata_path(),
            format: None,
        }
    }
}

/// On-disk format of the metadata store
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    /// Headerless CSV: file name, file path, then auxiliary columns
    #[default]
    Csv,
    /// A JSON array of objects
    Json,
}

impl StoreFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => StoreFormat::Json,
            _ => StoreFormat::Csv,
        }
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5244))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_metadata_path() -> PathBuf {
    PathBuf::from("data/metadata.csv")
}

fn default_true() -> bool {
    true
}
