/*!
 * Configuration types for medex
 */

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::error::{ExportError, Result};

/// Environment variable prefix for config overrides
const ENV_PREFIX: &str = "MEDEX_";

/// Main configuration for an export run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Cloud subscription identifier
    #[serde(default)]
    pub subscription_id: String,

    /// Resource group containing the media account
    #[serde(default)]
    pub resource_group: String,

    /// Media account name
    #[serde(default)]
    pub account_name: String,

    /// AAD tenant for token acquisition
    #[serde(default)]
    pub aad_tenant_id: String,

    /// AAD application (client) identifier
    #[serde(default)]
    pub aad_client_id: String,

    /// AAD application secret
    #[serde(default)]
    pub aad_secret: String,

    /// Audience (resource) the token is requested for
    #[serde(default = "default_arm_aad_audience")]
    pub arm_aad_audience: Url,

    /// AAD authority endpoint
    #[serde(default = "default_aad_endpoint")]
    pub aad_endpoint: Url,

    /// Management (catalog) API endpoint
    #[serde(default = "default_arm_endpoint")]
    pub arm_endpoint: Url,

    /// Account region (informational)
    #[serde(default)]
    pub region: String,

    /// Per-asset failure handling
    #[serde(default)]
    pub error_policy: ErrorPolicy,

    /// Manifest extraction strategy
    #[serde(default)]
    pub manifest_mode: ManifestMode,

    /// Write a header row to the CSV output
    #[serde(default)]
    pub csv_header: bool,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            subscription_id: String::new(),
            resource_group: String::new(),
            account_name: String::new(),
            aad_tenant_id: String::new(),
            aad_client_id: String::new(),
            aad_secret: String::new(),
            arm_aad_audience: default_arm_aad_audience(),
            aad_endpoint: default_aad_endpoint(),
            arm_endpoint: default_arm_endpoint(),
            region: String::new(),
            error_policy: ErrorPolicy::default(),
            manifest_mode: ManifestMode::default(),
            csv_header: false,
            log_level: LogLevel::default(),
            verbose: false,
        }
    }
}

/// Per-asset failure handling determines behavior when one asset cannot be exported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Log the failure, skip the asset, continue the run
    #[default]
    Tolerant,

    /// Abort the run on the first failure; no output file is written
    Strict,
}

/// Manifest extraction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ManifestMode {
    /// Third path segment of the first streaming path ("a1.ism")
    #[default]
    Extracted,

    /// First streaming path, verbatim
    RawPath,
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

// Default value functions for serde
fn default_arm_aad_audience() -> Url {
    Url::parse("https://management.core.windows.net/").unwrap()
}

fn default_aad_endpoint() -> Url {
    Url::parse("https://login.microsoftonline.com/").unwrap()
}

fn default_arm_endpoint() -> Url {
    Url::parse("https://management.azure.com/").unwrap()
}

impl ExportConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ExportError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: ExportConfig = toml::from_str(&contents).map_err(|e| {
            ExportError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    /// Apply MEDEX_* environment variable overrides on top of file values
    ///
    /// String keys map directly (MEDEX_ACCOUNT_NAME -> account_name); URL keys
    /// must parse or the override is rejected as a config error.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        for (field, slot) in [
            ("SUBSCRIPTION_ID", &mut self.subscription_id),
            ("RESOURCE_GROUP", &mut self.resource_group),
            ("ACCOUNT_NAME", &mut self.account_name),
            ("AAD_TENANT_ID", &mut self.aad_tenant_id),
            ("AAD_CLIENT_ID", &mut self.aad_client_id),
            ("AAD_SECRET", &mut self.aad_secret),
            ("REGION", &mut self.region),
        ] {
            if let Ok(value) = std::env::var(format!("{}{}", ENV_PREFIX, field)) {
                *slot = value;
            }
        }

        for (field, slot) in [
            ("ARM_AAD_AUDIENCE", &mut self.arm_aad_audience),
            ("AAD_ENDPOINT", &mut self.aad_endpoint),
            ("ARM_ENDPOINT", &mut self.arm_endpoint),
        ] {
            let key = format!("{}{}", ENV_PREFIX, field);
            if let Ok(value) = std::env::var(&key) {
                *slot = Url::parse(&value)
                    .map_err(|e| ExportError::Config(format!("Invalid URL in {}: {}", key, e)))?;
            }
        }

        Ok(())
    }

    /// Validate that the account and credential fields needed for a run are present
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("subscription_id", &self.subscription_id),
            ("resource_group", &self.resource_group),
            ("account_name", &self.account_name),
            ("aad_tenant_id", &self.aad_tenant_id),
            ("aad_client_id", &self.aad_client_id),
            ("aad_secret", &self.aad_secret),
        ] {
            if value.is_empty() {
                return Err(ExportError::Config(format!("{} is required", name)));
            }
        }
        Ok(())
    }
}
