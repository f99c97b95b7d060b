use std::{
    env, fs,
    net::{Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_INFERENCE_URL: &str =
    "https://api-inference.huggingface.co/models/facebook/blenderbot-400M-distill";
pub const DEFAULT_HEALTH_PORT: u16 = 8080;
pub const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 30;

/// Typed configuration, read once at startup and shared as `Arc<Config>`.
#[derive(Clone, Debug)]
pub struct Config {
    // Telegram
    pub telegram_token: String,

    // Inference endpoint
    pub inference_api_key: String,
    pub inference_url: String,
    pub inference_timeout: Duration,

    // Liveness
    pub health_port: u16,
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    ///
    /// Missing secrets are not an error here: a bad Telegram token fails at
    /// startup and a bad API key turns into fallback replies.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_token = lookup("TELEGRAM_TOKEN").unwrap_or_default();
        let inference_api_key = lookup("AI_API_KEY").unwrap_or_default();

        if telegram_token.trim().is_empty() {
            tracing::warn!("TELEGRAM_TOKEN is not set");
        }
        if inference_api_key.trim().is_empty() {
            tracing::warn!("AI_API_KEY is not set");
        }

        let inference_url = lookup("INFERENCE_URL")
            .and_then(non_empty)
            .unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string());

        let inference_timeout = match lookup("INFERENCE_TIMEOUT_SECS").and_then(non_empty) {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    Error::Config(format!("INFERENCE_TIMEOUT_SECS is not a number: {raw}"))
                })?;
                if secs == 0 {
                    return Err(Error::Config(
                        "INFERENCE_TIMEOUT_SECS must be greater than zero".to_string(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_INFERENCE_TIMEOUT_SECS),
        };

        let health_port = match lookup("PORT").and_then(non_empty) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {raw}")))?,
            None => DEFAULT_HEALTH_PORT,
        };

        Ok(Self {
            telegram_token,
            inference_api_key,
            inference_url,
            inference_timeout,
            health_port,
        })
    }

    pub fn health_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.health_port))
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter(|(k, _)| !k.trim().is_empty())
        .map(|(k, v)| (k.trim().to_string(), unquote(v.trim()).to_string()))
        .collect()
}

fn unquote(v: &str) -> &str {
    let quoted = v.len() >= 2
        && ((v.starts_with('"') && v.ends_with('"'))
            || (v.starts_with('\'') && v.ends_with('\'')));
    if quoted {
        &v[1..v.len() - 1]
    } else {
        v
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
