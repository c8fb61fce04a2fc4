use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use salesgen_generate::{BadRate, GenerateOptions};

use crate::error::ConfigError;

pub const ENV_REGION: &str = "AWS_REGION";
pub const ENV_BUCKET: &str = "S3_BUCKET";
pub const ENV_PREFIX: &str = "S3_PREFIX";
pub const ENV_EVENTS_PER_FILE: &str = "EVENTS_PER_FILE";
pub const ENV_FILES: &str = "FILES";
pub const ENV_BAD_RATE: &str = "BAD_RATE";
pub const ENV_SEED: &str = "GENERATOR_SEED";
pub const ENV_UPLOAD_TIMEOUT_SECS: &str = "UPLOAD_TIMEOUT_SECS";

pub const DEFAULT_REGION: &str = "us-east-2";
pub const DEFAULT_PREFIX: &str = "raw/sales";
pub const DEFAULT_EVENTS_PER_FILE: usize = 200;
pub const DEFAULT_FILES: u32 = 5;
pub const DEFAULT_BAD_RATE: f64 = 0.05;
pub const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 60;

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub region: String,
    pub bucket: String,
    pub prefix: String,
    pub events_per_file: usize,
    pub files: u32,
    pub bad_rate: BadRate,
    pub seed: Option<u64>,
    pub upload_timeout: Duration,
}

/// One layer of optional settings: a TOML file, the environment, or CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsOverrides {
    pub region: Option<String>,
    pub bucket: Option<String>,
    pub prefix: Option<String>,
    pub events_per_file: Option<usize>,
    pub files: Option<u32>,
    pub bad_rate: Option<f64>,
    pub seed: Option<u64>,
    pub upload_timeout_secs: Option<u64>,
}

impl SettingsOverrides {
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the recognized variables through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Ok(Self {
            region: get(ENV_REGION),
            bucket: get(ENV_BUCKET),
            prefix: get(ENV_PREFIX),
            events_per_file: parse_var(ENV_EVENTS_PER_FILE, get(ENV_EVENTS_PER_FILE))?,
            files: parse_var(ENV_FILES, get(ENV_FILES))?,
            bad_rate: parse_var(ENV_BAD_RATE, get(ENV_BAD_RATE))?,
            seed: parse_var(ENV_SEED, get(ENV_SEED))?,
            upload_timeout_secs: parse_var(
                ENV_UPLOAD_TIMEOUT_SECS,
                get(ENV_UPLOAD_TIMEOUT_SECS),
            )?,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Stack an optional TOML file, then the process environment, then `cli`.
    pub fn layered(config_file: Option<&Path>, cli: SettingsOverrides) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        let env = Self::from_env()?;
        Ok(file.merge(env).merge(cli))
    }

    /// Layer `other` on top of `self`; values set in `other` win.
    pub fn merge(self, other: SettingsOverrides) -> Self {
        Self {
            region: other.region.or(self.region),
            bucket: other.bucket.or(self.bucket),
            prefix: other.prefix.or(self.prefix),
            events_per_file: other.events_per_file.or(self.events_per_file),
            files: other.files.or(self.files),
            bad_rate: other.bad_rate.or(self.bad_rate),
            seed: other.seed.or(self.seed),
            upload_timeout_secs: other.upload_timeout_secs.or(self.upload_timeout_secs),
        }
    }
}

impl Settings {
    /// Apply defaults and validate. A missing bucket is the only hard requirement.
    pub fn resolve(layers: SettingsOverrides) -> Result<Self, ConfigError> {
        let bucket = layers
            .bucket
            .filter(|bucket| !bucket.trim().is_empty())
            .ok_or(ConfigError::Missing { key: ENV_BUCKET })?;

        let raw_rate = layers.bad_rate.unwrap_or(DEFAULT_BAD_RATE);
        let bad_rate = BadRate::new(raw_rate).map_err(|err| ConfigError::Invalid {
            key: ENV_BAD_RATE,
            value: raw_rate.to_string(),
            reason: err.to_string(),
        })?;

        let timeout_secs = layers
            .upload_timeout_secs
            .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_UPLOAD_TIMEOUT_SECS,
                value: timeout_secs.to_string(),
                reason: "must be at least 1 second".to_string(),
            });
        }

        let prefix = layers
            .prefix
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            region: layers.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket,
            prefix,
            events_per_file: layers.events_per_file.unwrap_or(DEFAULT_EVENTS_PER_FILE),
            files: layers.files.unwrap_or(DEFAULT_FILES),
            bad_rate,
            seed: layers.seed,
            upload_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            bad_rate: self.bad_rate,
            seed: self.seed,
        }
    }
}

fn parse_var<T>(key: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|err| ConfigError::Invalid {
                key,
                value: raw.clone(),
                reason: err.to_string(),
            })
        })
        .transpose()
}
