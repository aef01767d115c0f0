//! Configuration for the pool autoscaler plugin

use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::dispatch::LifecycleHook;

pub const ENABLED_POOLS: &str = "EnabledPools";
pub const ENABLED_GROUPS: &str = "EnabledGroups";
pub const ENVIRONMENT_URL: &str = "EnvironmentUrl";
pub const ENVIRONMENT_KEY: &str = "EnvironmentKey";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read plugin config {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("Plugin config {path} is not a JSON object of strings: {message}")]
    ParseFailed { path: String, message: String },
}

/// Key/value accessor for plugin configuration entries
pub trait ConfigSource: Send + Sync {
    fn config_entry(&self, key: &str) -> Option<String>;

    fn config_entry_with_default(&self, key: &str, default: &str) -> String {
        self.config_entry(key).unwrap_or_else(|| default.to_string())
    }
}

/// Plugin configuration entries keyed by name (`EnabledPools`, `EnvironmentUrl`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PluginConfig {
    entries: BTreeMap<String, String>,
}

impl PluginConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load entries from a JSON object of string values
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn with_entry(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }
}

impl ConfigSource for PluginConfig {
    fn config_entry(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

/// Split a semicolon-separated config list, dropping blank entries
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Command-line configuration for the pool autoscaler binary
#[derive(Debug, Clone, Parser)]
#[command(name = "farm-pool-autoscaler")]
#[command(about = "Delivers a job lifecycle event to the pool autoscaler and requests nodes")]
pub struct Config {
    /// Lifecycle event to deliver
    #[arg(long, value_enum)]
    pub event: LifecycleHook,

    /// Id of the job that triggered the event
    #[arg(long)]
    pub job_id: String,

    /// Path to the job repository snapshot
    #[arg(long, env = "FARM_REPOSITORY_FILE", default_value = ".farm/repository.json")]
    pub repository: PathBuf,

    /// JSON file with plugin configuration entries
    #[arg(long, env = "PLUGIN_CONFIG_FILE")]
    pub plugin_config: Option<PathBuf>,

    /// Semicolon-separated pools to autoscale (overrides EnabledPools)
    #[arg(long, env)]
    pub enabled_pools: Option<String>,

    /// Semicolon-separated groups to autoscale (overrides EnabledGroups)
    #[arg(long, env)]
    pub enabled_groups: Option<String>,

    /// Base URL of the pool scaling endpoint (overrides EnvironmentUrl)
    #[arg(long, env)]
    pub environment_url: Option<String>,

    /// Basic auth token for the scaling endpoint (overrides EnvironmentKey)
    #[arg(long, env, hide_env_values = true)]
    pub environment_key: Option<String>,

    /// Dry-run mode (log only, no scale calls)
    #[arg(long, env)]
    pub dry_run: bool,

    /// Output logs in JSON format
    #[arg(long, env)]
    pub log_json: bool,
}

impl Config {
    /// Parse configuration from command-line args and environment variables
    pub fn parse_config() -> Self {
        Config::parse()
    }

    /// Plugin entries from `--plugin-config`, with flag/env overrides applied
    pub fn plugin_config(&self) -> Result<PluginConfig, ConfigError> {
        let mut config = match &self.plugin_config {
            Some(path) => PluginConfig::from_file(path.clone())?,
            None => PluginConfig::new(),
        };

        let overrides = [
            (ENABLED_POOLS, &self.enabled_pools),
            (ENABLED_GROUPS, &self.enabled_groups),
            (ENVIRONMENT_URL, &self.environment_url),
            (ENVIRONMENT_KEY, &self.environment_key),
        ];
        for (key, value) in overrides {
            if let Some(value) = value {
                config.set(key, value.clone());
            }
        }

        Ok(config)
    }
}
