// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj.toml` loading and flag overrides.
//!
//! The file is optional. Every value has a default, and command-line flags
//! win over the file. The resolved [`Settings`] are plain data handed to the
//! orchestrator; nothing here is global.

use pj_adapters::{EncodingGateway, DEFAULT_PROMPT};
use pj_core::ScaleBounds;
use pj_engine::{AggregatorConfig, BatchConfig, BatchError, ConfidenceWeights, RetryPolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "pj.toml";

pub const DEFAULT_API_KEY_ENV: &str = "PJ_API_KEY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error(transparent)]
    Batch(#[from] BatchError),
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// On-disk shape of `pj.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub batch: BatchSection,
    pub retry: RetrySection,
    pub scale: ScaleSection,
    pub aggregate: AggregateSection,
    pub judge: JudgeSection,
    pub encoding: EncodingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchSection {
    pub worker_limit: Option<usize>,
    pub checkpoint_interval: Option<usize>,
    pub item_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySection {
    pub max_retries: Option<u32>,
    pub delays_secs: Option<Vec<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleSection {
    pub min: f64,
    pub max: f64,
}

impl Default for ScaleSection {
    fn default() -> Self {
        Self {
            min: ScaleBounds::LIKERT_5.min,
            max: ScaleBounds::LIKERT_5.max,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AggregateSection {
    pub dimensions: Option<Vec<String>>,
    pub confidence_weights: Option<ConfidenceWeights>,
    pub missing_evidence_factor: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Http,
    Command,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JudgeSection {
    pub backend: Backend,
    pub endpoint: String,
    pub model: String,
    pub api_key_env: String,
    pub prompt_file: Option<PathBuf>,
    pub command: Option<String>,
    pub args: Vec<String>,
    pub temperature: f32,
}

impl Default for JudgeSection {
    fn default() -> Self {
        Self {
            backend: Backend::Http,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            prompt_file: None,
            command: None,
            args: Vec::new(),
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingSection {
    pub primary: String,
    pub fallbacks: Vec<String>,
    pub detect: bool,
}

impl Default for EncodingSection {
    fn default() -> Self {
        Self {
            primary: "utf-8".to_string(),
            fallbacks: vec!["gb18030".to_string(), "big5".to_string()],
            detect: true,
        }
    }
}

/// Values taken from command-line flags
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub workers: Option<usize>,
    pub checkpoint_interval: Option<usize>,
    pub max_retries: Option<u32>,
}

/// Judge backend settings after resolution
#[derive(Debug, Clone, PartialEq)]
pub enum JudgeSettings {
    Http {
        endpoint: String,
        model: String,
        api_key_env: String,
        prompt: String,
        temperature: f32,
    },
    Command {
        program: String,
        args: Vec<String>,
    },
}

/// Fully resolved configuration for one invocation
#[derive(Debug)]
pub struct Settings {
    pub batch: BatchConfig,
    pub judge: JudgeSettings,
    pub gateway: EncodingGateway,
}

impl ConfigFile {
    /// Load `path`, or `./pj.toml` if it exists, or the defaults.
    ///
    /// An explicit path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let file = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(file)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply flag overrides and validate.
    pub fn resolve(self, overrides: &Overrides) -> Result<Settings, ConfigError> {
        let scale = ScaleBounds::new(self.scale.min, self.scale.max)
            .map_err(|e| ConfigError::invalid("scale", e.to_string()))?;

        let mut aggregate = AggregatorConfig {
            scale,
            ..AggregatorConfig::default()
        };
        if let Some(dimensions) = self.aggregate.dimensions {
            if dimensions.is_empty() {
                return Err(ConfigError::invalid(
                    "aggregate.dimensions",
                    "at least one dimension is required",
                ));
            }
            aggregate.dimensions = dimensions
                .iter()
                .map(|d| d.trim().to_lowercase())
                .collect();
        }
        if let Some(weights) = self.aggregate.confidence_weights {
            aggregate.confidence_weights = weights;
        }
        if let Some(factor) = self.aggregate.missing_evidence_factor {
            if !(0.0..=1.0).contains(&factor) {
                return Err(ConfigError::invalid(
                    "aggregate.missing_evidence_factor",
                    format!("{factor} is outside [0, 1]"),
                ));
            }
            aggregate.missing_evidence_factor = factor;
        }

        let mut retry = RetryPolicy::default();
        if let Some(max_retries) = overrides.max_retries.or(self.retry.max_retries) {
            retry.max_retries = max_retries;
        }
        if let Some(delays) = self.retry.delays_secs {
            retry.delays = delays.into_iter().map(Duration::from_secs).collect();
        }

        let defaults = BatchConfig::default();
        let batch = BatchConfig {
            worker_limit: overrides
                .workers
                .or(self.batch.worker_limit)
                .unwrap_or(defaults.worker_limit),
            checkpoint_interval: overrides
                .checkpoint_interval
                .or(self.batch.checkpoint_interval)
                .unwrap_or(defaults.checkpoint_interval),
            item_timeout: self
                .batch
                .item_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.item_timeout),
            retry,
            aggregate,
        };
        batch.validate()?;

        let judge = match self.judge.backend {
            Backend::Http => {
                let prompt = match &self.judge.prompt_file {
                    Some(path) => {
                        std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                            path: path.clone(),
                            source,
                        })?
                    }
                    None => DEFAULT_PROMPT.to_string(),
                };
                JudgeSettings::Http {
                    endpoint: self.judge.endpoint,
                    model: self.judge.model,
                    api_key_env: self.judge.api_key_env,
                    prompt,
                    temperature: self.judge.temperature,
                }
            }
            Backend::Command => {
                let program = self
                    .judge
                    .command
                    .filter(|c| !c.trim().is_empty())
                    .ok_or_else(|| {
                        ConfigError::invalid(
                            "judge.command",
                            "required when judge.backend = \"command\"",
                        )
                    })?;
                JudgeSettings::Command {
                    program,
                    args: self.judge.args,
                }
            }
        };

        let mut gateway = EncodingGateway::from_labels(
            &self.encoding.primary,
            &self.encoding.fallbacks,
        )
        .map_err(|label| ConfigError::invalid("encoding", format!("unknown encoding {label:?}")))?;
        if !self.encoding.detect {
            gateway = gateway.without_detection();
        }

        Ok(Settings {
            batch,
            judge,
            gateway,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
