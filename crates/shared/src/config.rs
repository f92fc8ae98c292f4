//! Configuration types for the directory service

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, ServiceError};

/// Coherence mode as written in configuration files
///
/// Every replica of a deployment must be configured with the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoherenceSetting {
    #[default]
    SelfVersioning,
    PushInvalidation,
}

/// Local cache settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Turn the per-process cache on or off
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub mode: CoherenceSetting,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: CoherenceSetting::default(),
        }
    }
}

/// Telemetry queue settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryConfig {
    /// Events buffered before new ones are dropped
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestConfig {
    /// Per-request budget for store and shared-cache calls
    #[serde(default)]
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingConfig {
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

/// Top-level service configuration (directory.yaml / directory.json)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,

    #[serde(default)]
    pub audit: AuditConfig,

    #[serde(default)]
    pub request: RequestConfig,

    #[serde(default)]
    pub listing: ListingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML or JSON file, chosen by extension
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            Some("json") => Self::from_json_str(&content)?,
            _ => {
                return Err(ServiceError::Config(format!(
                    "unsupported config file '{}': expected .yaml, .yml or .json",
                    path.display()
                )))
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Reject values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.telemetry.queue_capacity == 0 {
            return Err(ServiceError::Config(
                "telemetry.queueCapacity must be at least 1".to_string(),
            ));
        }
        if self.listing.default_limit == 0 {
            return Err(ServiceError::Config(
                "listing.defaultLimit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_deadline(&self) -> Option<Duration> {
        self.request.deadline_ms.map(Duration::from_millis)
    }
}

fn default_true() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_max_entries() -> usize {
    10_000
}

fn default_limit() -> usize {
    20
}
