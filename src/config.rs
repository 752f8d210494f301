//! Configuration management for operate-agent.
//!
//! Configuration can be set via environment variables:
//! - `GEMINI_API_KEY` - Required. API key for the Gemini planner.
//! - `GEMINI_MODEL` - Optional. Planner model. Defaults to `gemini-2.0-flash-exp`.
//! - `MCP_SCHEME` / `MCP_HOST` / `MCP_PORT` - Optional. Compose the tool server
//!   base URL. Defaults to `http://localhost:8000`.
//! - `MAX_TURNS` - Optional. Turn limit for a run. Defaults to `12`.
//! - `TOOL_TIMEOUT_SECS` - Optional. Per-call timeout for tool server requests.
//!   Defaults to `30`.
//! - `OPERATE_ALLOWED_APPS` - Optional. Comma-separated allow-list for the
//!   App-Tool safety guard. Unset means no app restriction.
//!
//! CLI flags override these values after load.

use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key
    pub api_key: String,

    /// Planner model identifier
    pub model: String,

    /// Base URL of the tool server
    pub server_url: String,

    /// Maximum turns for a run
    pub max_turns: usize,

    /// Timeout applied to each tool server call
    pub tool_timeout: Duration,

    /// App-Tool allow-list for the safety guard; `None` means unrestricted
    pub allowed_apps: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `GEMINI_API_KEY` is not set,
    /// or `ConfigError::InvalidValue` for unparseable numbers and URLs.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("GEMINI_API_KEY".to_string()))?;

        let model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| "gemini-2.0-flash-exp".to_string());

        let scheme = std::env::var("MCP_SCHEME").unwrap_or_else(|_| "http".to_string());
        let host = std::env::var("MCP_HOST").unwrap_or_else(|_| "localhost".to_string());
        let port = std::env::var("MCP_PORT").unwrap_or_else(|_| "8000".to_string());
        let server_url = validate_server_url(&format!("{scheme}://{host}:{port}"))?;

        let max_turns = std::env::var("MAX_TURNS")
            .unwrap_or_else(|_| "12".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("MAX_TURNS".to_string(), format!("{e}")))?;

        let timeout_secs: u64 = std::env::var("TOOL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("TOOL_TIMEOUT_SECS".to_string(), format!("{e}"))
            })?;

        let allowed_apps = std::env::var("OPERATE_ALLOWED_APPS")
            .ok()
            .map(|v| parse_list(&v));

        Ok(Self {
            api_key,
            model,
            server_url,
            max_turns,
            tool_timeout: Duration::from_secs(timeout_secs),
            allowed_apps,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, model: String, server_url: String) -> Self {
        Self {
            api_key,
            model,
            server_url,
            max_turns: 12,
            tool_timeout: Duration::from_secs(30),
            allowed_apps: None,
        }
    }
}

/// Parse and normalize the tool server base URL.
pub fn validate_server_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidValue("server URL".to_string(), format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ConfigError::InvalidValue(
                "server URL".to_string(),
                format!("unsupported scheme '{other}'"),
            ))
        }
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
