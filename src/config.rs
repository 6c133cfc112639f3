//! Environment-driven settings
//!
//! Everything is read once at process start. Missing API keys do not fail
//! `from_env`; they only fail `agent_credentials`, which leaves the server
//! running in degraded mode. The same holds for unparsable agent settings:
//! only HOST/PORT errors are fatal.

use crate::error::AnalystError;
use crate::Result;
use std::env;
use std::str::FromStr;

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_TEMPERATURE: f32 = 0.4;
pub const DEFAULT_MAX_SEARCH_RESULTS: u32 = 5;
pub const DEFAULT_MAX_ITERATIONS: usize = 15;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

#[derive(Debug, Clone)]
pub struct Settings {
    pub google_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_search_results: u32,
    pub max_iterations: usize,
    pub http_timeout_secs: u64,
    pub host: String,
    pub port: u16,
    /// Agent settings that failed to parse; reported by `agent_credentials`
    pub invalid_agent_settings: Vec<String>,
}

/// Keys the agent cannot be built without
#[derive(Debug, Clone)]
pub struct AgentCredentials {
    pub google_api_key: String,
    pub tavily_api_key: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            google_api_key: None,
            tavily_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_search_results: DEFAULT_MAX_SEARCH_RESULTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            invalid_agent_settings: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let key = |name: &str| non_blank(lookup(name).as_deref());
        let google_api_key = key("GOOGLE_API_KEY").or_else(|| key("GEMINI_API_KEY"));
        let tavily_api_key = key("TAVILY_API_KEY");

        let port = match lookup("PORT").or_else(|| lookup("API_PORT")) {
            Some(raw) => parse_value("PORT", &raw)?,
            None => defaults.port,
        };

        let mut invalid = Vec::new();
        let temperature =
            parse_agent_setting("LLM_TEMPERATURE", &lookup, defaults.temperature, &mut invalid);
        let max_search_results = parse_agent_setting(
            "SEARCH_MAX_RESULTS",
            &lookup,
            defaults.max_search_results,
            &mut invalid,
        );
        let max_iterations = parse_agent_setting(
            "AGENT_MAX_ITERATIONS",
            &lookup,
            defaults.max_iterations,
            &mut invalid,
        );
        let http_timeout_secs = parse_agent_setting(
            "HTTP_TIMEOUT_SECS",
            &lookup,
            defaults.http_timeout_secs,
            &mut invalid,
        );

        Ok(Self {
            google_api_key,
            tavily_api_key,
            model: lookup("GEMINI_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(defaults.model),
            temperature,
            max_search_results,
            max_iterations,
            http_timeout_secs,
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            invalid_agent_settings: invalid,
        })
    }

    pub fn agent_credentials(&self) -> Result<AgentCredentials> {
        if !self.invalid_agent_settings.is_empty() {
            return Err(AnalystError::ConfigError(self.invalid_agent_settings.join("; ")));
        }

        let google_api_key = non_blank(self.google_api_key.as_deref()).ok_or_else(|| {
            AnalystError::UnavailableError(
                "GOOGLE_API_KEY (or GEMINI_API_KEY) is not configured".to_string(),
            )
        })?;
        let tavily_api_key = non_blank(self.tavily_api_key.as_deref()).ok_or_else(|| {
            AnalystError::UnavailableError("TAVILY_API_KEY is not configured".to_string())
        })?;

        Ok(AgentCredentials {
            google_api_key,
            tavily_api_key,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AnalystError::ConfigError(format!("{} has an invalid value: {:?}", key, raw)))
}

/// Falls back to the default and records the problem instead of failing
fn parse_agent_setting<T, F>(key: &str, lookup: &F, default: T, invalid: &mut Vec<String>) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|raw| parse_value(key, &raw)) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            if let AnalystError::ConfigError(message) = e {
                invalid.push(message);
            }
            default
        }
        None => default,
    }
}
