//! Chronoscope configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChronoscopeConfig {
    /// HTTP gateway settings.
    pub server: ServerConfig,
    /// Temporal query evaluation.
    pub temporal: TemporalConfig,
    /// Container index resources.
    pub index: IndexConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    pub port: u16,
    /// Directory served as the root container.
    pub root: PathBuf,
    /// Public URL of the root container. Resource identifiers are built from it.
    pub base_url: String,
}

/// What to do when one member of a temporal container cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MemberFailurePolicy {
    /// Fail the whole request with the member's error.
    #[default]
    FailFast,
    /// Log the member and evaluate the query over the others.
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalConfig {
    /// Upper bound on members read per request. Extra members are ignored.
    pub max_members: usize,
    pub member_failure: MemberFailurePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub enabled: bool,
    /// Name of the index resource inside a container.
    pub name: String,
    /// Media range the client's top preference must match.
    pub media_range: String,
}

// ============================================================
// Defaults
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 3000,
            root: PathBuf::from("."),
            base_url: "http://localhost:3000/".into(),
        }
    }
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            max_members: 100,
            member_failure: MemberFailurePolicy::FailFast,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name: "index.html".into(),
            media_range: "text/html".into(),
        }
    }
}

// ============================================================
// Loading
// ============================================================

impl ChronoscopeConfig {
    /// Load config from a TOML file, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    /// Write the current config as TOML (for generating a default config file).
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Base URL with exactly one trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}/", self.server.base_url.trim_end_matches('/'))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
