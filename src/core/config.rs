//! TOML configuration: analytics backend, capture queue policy, logging.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::errors::{DcapError, Result};

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub capture: CaptureConfig,
    pub log: LogConfig,
}

/// `[app]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub analytics: AnalyticsSection,
}

/// `[app.analytics]` table. Each backend is optional; absent means disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSection {
    pub azure: Option<AzureConfig>,
}

/// `[app.analytics.azure]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureConfig {
    pub connection_string: String,
}

impl AzureConfig {
    /// The `InstrumentationKey=` component of the connection string, if any.
    #[must_use]
    pub fn instrumentation_key(&self) -> Option<&str> {
        self.connection_string
            .split(';')
            .filter_map(|part| part.split_once('='))
            .find(|(key, _)| key.trim().eq_ignore_ascii_case("InstrumentationKey"))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }
}

/// `[capture]` table: deferral and backlog policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Hold hits until the user identity resolves.
    pub defer: bool,
    /// Upper bound on buffered hits while deferred. `None` is unbounded.
    pub max_backlog: Option<usize>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            defer: true,
            max_backlog: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// `[log]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl AppConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(DcapError::MissingConfig {
                    path: path.to_path_buf(),
                });
            }
            Err(err) => return Err(DcapError::io(path, err)),
        };
        Self::from_toml_str(&raw)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(azure) = &self.app.analytics.azure {
            if azure.connection_string.trim().is_empty() {
                return Err(DcapError::InvalidConfig {
                    details: "app.analytics.azure.connectionString must not be empty".to_string(),
                });
            }
        }
        if self.capture.max_backlog == Some(0) {
            return Err(DcapError::InvalidConfig {
                details: "capture.max_backlog must be at least 1 (omit it for unbounded)"
                    .to_string(),
            });
        }
        if self.log.level.trim().is_empty() {
            return Err(DcapError::InvalidConfig {
                details: "log.level must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
