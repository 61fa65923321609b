//! Optional TOML configuration file.
//!
//! ```toml
//! [aws]
//! region = "eu-west-1"
//! max_retries = 3
//!
//! [resolver]
//! record_types = ["A", "CNAME"]
//! tie_break = "lowest-name"
//!
//! [reconciler]
//! ttl = 120
//! poll_interval_secs = 10
//! timeout_secs = 900
//! ```
//!
//! Every table and key is optional. Command-line flags win over file values.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use dns_topology_core::{ReconcilerConfig, ResolverConfig};

pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub aws: AwsSection,
    pub resolver: ResolverConfig,
    pub reconciler: ReconcilerConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AwsSection {
    pub region: Option<String>,
    pub max_retries: Option<u32>,
}

impl FileConfig {
    /// Read `path`, or fall back to defaults when no file was given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
