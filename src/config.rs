//! Configuration types for traffic-advisor.
//!
//! Config is loaded once at startup from a TOML file and validated before the
//! server opens its port. Invalid configs are rejected with a clear error
//! rather than silently falling back to defaults. Every section is optional;
//! an empty file yields the documented defaults.
//!
//! # Example
//! ```toml
//! [server]
//! port = 8090
//!
//! [monitor]
//! rate_limit_threshold = 80
//! prediction_window_ms = 60000
//! api_url              = "https://api.example.com/"
//! api_key_env          = "ADVISOR_API_KEY"
//!
//! [refactor]
//! rules = ["performance", "idiom", "async"]
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Top-level advisor configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    /// Traffic risk predictor settings.
    #[serde(default)]
    pub monitor: MonitorConfig,

    /// Source refactor advisor settings.
    #[serde(default)]
    pub refactor: RefactorConfig,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&content).context("parsing config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let monitor = &self.monitor;
        anyhow::ensure!(
            monitor.prediction_window_ms > 0,
            "monitor.prediction_window_ms must be greater than zero"
        );
        anyhow::ensure!(
            monitor.rate_limit_threshold.is_finite()
                && monitor.rate_limit_threshold > 0.0
                && monitor.rate_limit_threshold <= 100.0,
            "monitor.rate_limit_threshold must be in (0, 100], got {}",
            monitor.rate_limit_threshold
        );
        if let Some(url) = &monitor.api_url {
            anyhow::ensure!(!url.trim().is_empty(), "monitor.api_url must not be empty when set");
        }
        Ok(())
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listen port (default: 8090).
    #[serde(default = "defaults::port")]
    pub port: u16,

    /// Log level override (also controlled by `RUST_LOG` env var).
    #[serde(default)]
    pub log_level: Option<String>,

    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: defaults::port(),
            log_level: None,
            log_format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line, for log shippers.
    Json,
}

/// Settings for the traffic risk predictor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// Percentage of the rate limit that may be consumed before
    /// `rate_limit_approaching` is raised (default: 80).
    ///
    /// The signal fires when `remaining < limit × threshold / 100`.
    #[serde(default = "defaults::rate_limit_threshold")]
    pub rate_limit_threshold: f64,

    /// How long observations stay eligible for analysis, in ms (default: 60 000).
    #[serde(default = "defaults::prediction_window_ms")]
    pub prediction_window_ms: u64,

    /// Base URL of a load-balanced API, offered as an alternative endpoint.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Environment variable whose value is the upstream API key.
    ///
    /// Reserved: prediction never reads it. Only its presence is reported.
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rate_limit_threshold: defaults::rate_limit_threshold(),
            prediction_window_ms: defaults::prediction_window_ms(),
            api_url: None,
            api_key_env: None,
        }
    }
}

impl MonitorConfig {
    /// Resolve the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .filter(|key| !key.is_empty())
    }

    /// Whether an API key is available, without exposing its value.
    pub fn has_api_key_configured(&self) -> bool {
        self.api_key().is_some()
    }
}

/// Settings for the source refactor advisor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefactorConfig {
    /// Language of the scanned source. Informational; all rules target
    /// JavaScript-family syntax.
    #[serde(default)]
    pub target_language: TargetLanguage,

    /// Rule sets to run, in any order (default: all).
    #[serde(default = "defaults::rules")]
    pub rules: Vec<RuleSet>,
}

impl Default for RefactorConfig {
    fn default() -> Self {
        Self {
            target_language: TargetLanguage::default(),
            rules: defaults::rules(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetLanguage {
    #[default]
    Javascript,
    Typescript,
}

/// A family of refactor rules.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// DOM queries in loops, repeated calls.
    Performance,
    /// Modern language idioms.
    Idiom,
    /// Promise chains and parallelism.
    Async,
}

impl std::fmt::Display for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Performance => "performance",
            Self::Idiom => "idiom",
            Self::Async => "async",
        })
    }
}

mod defaults {
    use super::RuleSet;

    pub fn port() -> u16 { 8090 }
    pub fn rate_limit_threshold() -> f64 { 80.0 }
    pub fn prediction_window_ms() -> u64 { 60_000 }
    pub fn rules() -> Vec<RuleSet> {
        vec![RuleSet::Performance, RuleSet::Idiom, RuleSet::Async]
    }
}
