use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default so a bare `cargo run` talks to a local Ollama.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ollama_model: String,
    pub ollama_api_url: String,
    pub ollama_temperature: f32,
    pub ollama_timeout_secs: u64,
    pub scrape_timeout_secs: u64,
    pub oauth_backend_url: String,
    pub max_upload_bytes: usize,
    /// Cap on how much an uploaded archive may inflate to, across all members.
    pub max_archive_bytes: usize,
    /// Sessions untouched for this long are evicted.
    pub session_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            ollama_model: "gemma3:1b".to_string(),
            ollama_api_url: "http://localhost:11434/api/generate".to_string(),
            ollama_temperature: 0.7,
            ollama_timeout_secs: 60,
            scrape_timeout_secs: 8,
            oauth_backend_url: "http://localhost:5000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
            max_archive_bytes: 50 * 1024 * 1024,
            session_ttl_secs: 60 * 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: env_or("PORT", defaults.port)?,
            rust_log: env_or("RUST_LOG", defaults.rust_log)?,
            ollama_model: env_or("OLLAMA_MODEL", defaults.ollama_model)?,
            ollama_api_url: env_or("OLLAMA_API_URL", defaults.ollama_api_url)?,
            ollama_temperature: env_or("OLLAMA_TEMPERATURE", defaults.ollama_temperature)?,
            ollama_timeout_secs: env_or("OLLAMA_TIMEOUT_SECS", defaults.ollama_timeout_secs)?,
            scrape_timeout_secs: env_or("SCRAPE_TIMEOUT_SECS", defaults.scrape_timeout_secs)?,
            oauth_backend_url: env_or("OAUTH_BACKEND_URL", defaults.oauth_backend_url)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            max_archive_bytes: env_or("MAX_ARCHIVE_BYTES", defaults.max_archive_bytes)?,
            session_ttl_secs: env_or("SESSION_TTL_SECS", defaults.session_ttl_secs)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    parse_or(key, std::env::var(key).ok(), default)
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{value}'")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_uses_default_when_unset_or_blank() {
        assert_eq!(parse_or::<u16>("PORT", None, 8080).unwrap(), 8080);
        assert_eq!(parse_or::<u16>("PORT", Some("  ".into()), 8080).unwrap(), 8080);
    }

    #[test]
    fn test_parse_or_parses_value() {
        assert_eq!(parse_or::<u16>("PORT", Some("9000".into()), 8080).unwrap(), 9000);
        let temp = parse_or::<f32>("OLLAMA_TEMPERATURE", Some("0.2".into()), 0.7).unwrap();
        assert!((temp - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_or_rejects_garbage_with_key_in_message() {
        let err = parse_or::<u16>("PORT", Some("eighty".into()), 8080).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_default_points_at_local_ollama() {
        let config = Config::default();
        assert_eq!(config.ollama_api_url, "http://localhost:11434/api/generate");
        assert_eq!(config.ollama_model, "gemma3:1b");
        assert_eq!(config.scrape_timeout_secs, 8);
        assert!(config.max_archive_bytes > config.max_upload_bytes);
        assert_eq!(config.session_ttl_secs, 3600);
    }
}
