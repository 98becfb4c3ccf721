use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use eyre::{eyre, WrapErr};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-haiku-4-5-20251001-v1:0";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_GENERATOR_TIMEOUT_MS: u64 = 8_000;
pub const DEFAULT_HISTORY_WINDOW: usize = 10;

/// Server configuration, read once at startup from `MEDSIM_*` variables.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Extra `*.json` cases loaded on top of the bundled ones.
    pub case_dir: Option<PathBuf>,
    pub bedrock_enabled: bool,
    pub model_id: String,
    pub region: String,
    pub generator_timeout: Duration,
    pub fallback_seed: u64,
    pub history_window: usize,
}

impl ApiConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind_addr: parse_or(var("MEDSIM_BIND_ADDR"), "MEDSIM_BIND_ADDR", DEFAULT_BIND_ADDR)?,
            case_dir: var("MEDSIM_CASE_DIR").map(PathBuf::from),
            bedrock_enabled: parse_bool(var("MEDSIM_BEDROCK_ENABLED"), "MEDSIM_BEDROCK_ENABLED")?,
            model_id: var("MEDSIM_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            generator_timeout: Duration::from_millis(parse_or(
                var("MEDSIM_GENERATOR_TIMEOUT_MS"),
                "MEDSIM_GENERATOR_TIMEOUT_MS",
                &DEFAULT_GENERATOR_TIMEOUT_MS.to_string(),
            )?),
            fallback_seed: parse_or(var("MEDSIM_FALLBACK_SEED"), "MEDSIM_FALLBACK_SEED", "0")?,
            history_window: parse_or(
                var("MEDSIM_HISTORY_WINDOW"),
                "MEDSIM_HISTORY_WINDOW",
                &DEFAULT_HISTORY_WINDOW.to_string(),
            )?,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: &str) -> eyre::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = value.unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .wrap_err_with(|| format!("invalid value for {key}: {raw:?}"))
}

fn parse_bool(value: Option<String>, key: &str) -> eyre::Result<bool> {
    match value.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(v) => Err(eyre!("invalid value for {key}: {v:?}, expected true or false")),
    }
}
