// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Usage:
//   link-prober [INPUT] [--concurrency N] [--timeout SECS] [--json]
//               [--config FILE] [--verbose]
//
// Every flag is optional. Values given here win over the config file, which
// wins over the built-in defaults (see config.rs).
// =============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use crate::config::{duration_from_secs, ProbeConfig};

#[derive(Parser, Debug)]
#[command(
    name = "link-prober",
    version,
    about = "Probe a list of URLs concurrently and report which ones are alive",
    long_about = "link-prober reads one target per line ([METHOD] URL, method defaults to HEAD), \
                  sends one request per target with a bounded number in flight, and prints each \
                  result as soon as it completes. Lines starting with '#' are ignored."
)]
pub struct Cli {
    /// File with one target per line (default: urls.txt)
    pub input: Option<PathBuf>,

    /// Maximum number of requests in flight at once (default: 5)
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds, fractions allowed (default: 2)
    #[arg(short = 't', long)]
    pub timeout: Option<f64>,

    /// TOML config file with a [probe] table
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output one JSON object per result instead of text blocks
    #[arg(long)]
    pub json: bool,

    /// Show debug logs
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Builds the run configuration: defaults, then config file, then flags.
    pub fn to_config(&self) -> Result<ProbeConfig> {
        let mut config = match &self.config {
            Some(path) => ProbeConfig::load(path)?,
            None => ProbeConfig::default(),
        };

        if let Some(input) = &self.input {
            config.input = input.clone();
        }
        if let Some(n) = self.concurrency {
            config.max_concurrency = n;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout = duration_from_secs(secs)?;
        }

        config.validate()?;
        Ok(config)
    }
}
