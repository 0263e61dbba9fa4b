// src/config.rs
// =============================================================================
// Run configuration.
//
// Sources, lowest to highest precedence:
// 1. built-in defaults (5 concurrent probes, 2 second timeout, urls.txt)
// 2. a TOML file passed with --config, `[probe]` table
// 3. command-line flags
//
// Example file:
//
//   [probe]
//   max_concurrency = 10
//   request_timeout_secs = 1.5
//   input = "targets.txt"
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MAX_CONCURRENCY: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
pub const DEFAULT_INPUT: &str = "urls.txt";

// Upper bound to avoid accidentally opening thousands of sockets
const MAX_CONCURRENCY_LIMIT: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    pub max_concurrency: usize,
    pub request_timeout: Duration,
    pub input: PathBuf,
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: DEFAULT_TIMEOUT,
            input: PathBuf::from(DEFAULT_INPUT),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    probe: ProbeSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProbeSection {
    max_concurrency: Option<usize>,
    request_timeout_secs: Option<f64>,
    input: Option<PathBuf>,
    user_agent: Option<String>,
}

impl ProbeConfig {
    /// Defaults overlaid with the `[probe]` table of a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(s).context("invalid config file")?;
        let mut config = Self::default();
        let section = file.probe;

        if let Some(n) = section.max_concurrency {
            config.max_concurrency = n;
        }
        if let Some(secs) = section.request_timeout_secs {
            config.request_timeout = duration_from_secs(secs)?;
        }
        if let Some(input) = section.input {
            config.input = input;
        }
        if let Some(agent) = section.user_agent {
            config.user_agent = agent;
        }

        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&s).with_context(|| format!("in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 || self.max_concurrency > MAX_CONCURRENCY_LIMIT {
            bail!(
                "max concurrency must be between 1 and {}, got {}",
                MAX_CONCURRENCY_LIMIT,
                self.max_concurrency
            );
        }
        if self.request_timeout.is_zero() {
            bail!("request timeout must be greater than zero");
        }
        Ok(())
    }
}

pub fn duration_from_secs(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("invalid timeout: {} seconds", secs))
}
