//! Configuration management for the CLI
//!
//! Defaults come from an optional `~/.config/kubectl-consolidation/config.json`
//! overlaid with `KUBECTL_CONSOLIDATION_*` environment variables. Command-line
//! flags override both.

use crate::output::OutputFormat;
use crate::Cli;
use anyhow::{Context, Result};
use consolidation_lib::collector::DEFAULT_MAX_WORKERS;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default report timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

const ENV_PREFIX: &str = "KUBECTL_CONSOLIDATION";

/// CLI configuration as read from file and environment
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Default output format
    pub output: Option<OutputFormat>,
    /// Suppress table headers by default
    pub no_headers: Option<bool>,
    /// Report timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// Nodes processed concurrently
    pub max_workers: Option<usize>,
}

impl Config {
    /// Load configuration from the default file location and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path().as_deref())
    }

    /// Load configuration from `path` (if it exists) and the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    /// Get the configuration file path
    fn config_path() -> Option<PathBuf> {
        dirs_next::home_dir().map(|home| {
            home.join(".config")
                .join("kubectl-consolidation")
                .join("config.json")
        })
    }
}

/// Effective settings after layering flags over configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output: OutputFormat,
    pub no_headers: bool,
    pub request_timeout_secs: u64,
    pub max_workers: usize,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &Config) -> Self {
        Self {
            output: cli.output.or(config.output).unwrap_or_default(),
            no_headers: cli.no_headers || config.no_headers.unwrap_or(false),
            request_timeout_secs: cli
                .request_timeout
                .or(config.request_timeout_secs)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_workers: config.max_workers.unwrap_or(DEFAULT_MAX_WORKERS),
        }
    }
}
