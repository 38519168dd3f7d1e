use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use db::passage::DEFAULT_TRANSLATION;
use db::TextJoin;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration, read from the environment (and `.env`).
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub bind_address: String,
    pub pool_size: u32,
    pub workers: usize,
    pub default_translation: String,
    pub text_join: TextJoin,
    pub seed_on_start: bool,
    pub chapters_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            database_url: get("DATABASE_URL").unwrap_or_else(|| "/tmp/scripture.db".to_string()),
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            pool_size: parse(get("POOL_SIZE"), "POOL_SIZE", 15)?,
            workers: parse(get("WORKERS"), "WORKERS", num_cpus::get())?,
            default_translation: get("DEFAULT_TRANSLATION")
                .unwrap_or_else(|| DEFAULT_TRANSLATION.to_string()),
            text_join: parse(get("TEXT_JOIN"), "TEXT_JOIN", TextJoin::default())?,
            seed_on_start: parse_bool(get("SEED_ON_START"), "SEED_ON_START", true)?,
            chapters_dir: get("CHAPTERS_DIR").map(PathBuf::from),
        })
    }
}

fn parse<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    match value {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}

fn parse_bool(value: Option<String>, key: &'static str, default: bool) -> Result<bool, ConfigError> {
    match value.as_deref().map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: v,
                reason: "expected a boolean".to_string(),
            }),
        },
    }
}
