//! Configuration loading for the shopping assistant server.
//!
//! Everything is read from environment variables. A `.env` file in the
//! working directory is loaded first when present.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_APP_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_CATALOG_API_URL: &str = "http://localhost:3000/api/catalog";
const DEFAULT_SHOP_API_URL: &str = "http://localhost:3000/api/checkout";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_USER_ID_HEADER: &str = "x-user-id";
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_RECURSION_LIMIT: usize = 50;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_ADDR is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("{name} is not a valid number: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

/// Credentials and endpoints for the backchannel (CIBA) authorization flow.
#[derive(Debug, Clone)]
pub struct CibaConfig {
    /// Identity provider base URL, always with a scheme and no trailing slash.
    pub domain: String,
    pub client_id: String,
    pub client_secret: String,
    /// API the issued access token is meant for.
    pub audience: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

/// Chat-completions provider settings.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub app_base_url: String,
    pub catalog_api_url: String,
    /// `None` means orders are mocked instead of sent to a shop API.
    pub shop_api_url: Option<String>,
    /// `None` when the identity provider is not fully configured.
    pub ciba: Option<CibaConfig>,
    pub model: ModelConfig,
    pub recursion_limit: usize,
    pub user_id_header: String,
}

impl Config {
    /// Load configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup. Empty values are
    /// treated as unset except for `SHOP_API_URL`, where empty disables
    /// the shop call.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_str = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let app_base_url = trim_slash(
            get("APP_BASE_URL").unwrap_or_else(|| DEFAULT_APP_BASE_URL.to_string()),
        );
        let catalog_api_url =
            get("CATALOG_API_URL").unwrap_or_else(|| DEFAULT_CATALOG_API_URL.to_string());

        let shop_api_url = match lookup("SHOP_API_URL") {
            Some(v) if v.trim().is_empty() => None,
            Some(v) => Some(v),
            None => Some(DEFAULT_SHOP_API_URL.to_string()),
        };

        let poll_interval = Duration::from_millis(parse_number(
            "CIBA_POLL_INTERVAL_MS",
            get("CIBA_POLL_INTERVAL_MS"),
            DEFAULT_POLL_INTERVAL_MS,
        )?);
        let timeout = Duration::from_millis(parse_number(
            "CIBA_TIMEOUT_MS",
            get("CIBA_TIMEOUT_MS"),
            DEFAULT_TIMEOUT_MS,
        )?);

        let ciba = match (
            get("AUTH0_DOMAIN"),
            get("AUTH0_CLIENT_ID"),
            get("AUTH0_CLIENT_SECRET"),
        ) {
            (Some(domain), Some(client_id), Some(client_secret)) => Some(CibaConfig {
                domain: normalize_domain(&domain),
                client_id,
                client_secret,
                audience: get("SHOP_API_AUDIENCE")
                    .ok_or(ConfigError::Missing("SHOP_API_AUDIENCE"))?,
                poll_interval,
                timeout,
            }),
            _ => None,
        };

        let model = ModelConfig {
            api_key: get("OPENAI_API_KEY").ok_or(ConfigError::Missing("OPENAI_API_KEY"))?,
            base_url: trim_slash(
                get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
            model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
        };

        let recursion_limit = parse_number(
            "AGENT_RECURSION_LIMIT",
            get("AGENT_RECURSION_LIMIT"),
            DEFAULT_RECURSION_LIMIT as u64,
        )? as usize;

        let user_id_header = get("USER_ID_HEADER")
            .unwrap_or_else(|| DEFAULT_USER_ID_HEADER.to_string())
            .to_ascii_lowercase();

        Ok(Self {
            bind,
            app_base_url,
            catalog_api_url,
            shop_api_url,
            ciba,
            model,
            recursion_limit,
            user_id_header,
        })
    }
}

fn parse_number(
    name: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value: v }),
        None => Ok(default),
    }
}

fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim().trim_end_matches('/');
    if domain.starts_with("http://") || domain.starts_with("https://") {
        domain.to_string()
    } else {
        format!("https://{}", domain)
    }
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
