//! Gateway configuration.
//!
//! Loaded from a YAML file; every field has a sensible default so an empty
//! file (or no file at all) yields a runnable configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Base URL of the OpenAI-compatible upstream.
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,

    /// Upstream request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Capacity of the bounded audit ring.
    #[serde(default = "default_audit_capacity")]
    pub audit_capacity: usize,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_upstream_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_audit_capacity() -> usize {
    crate::audit::AUDIT_CAPACITY
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            upstream_url: default_upstream_url(),
            timeout_ms: default_timeout_ms(),
            audit_capacity: default_audit_capacity(),
        }
    }
}

/// Load configuration from a YAML file.
pub fn load_config(path: &Path) -> anyhow::Result<GatewayConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: GatewayConfig = serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
