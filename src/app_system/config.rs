use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the clinic backend, without a trailing slash.
    pub api_base_url: String,
    /// Directory holding the persisted user record.
    pub storage_dir: PathBuf,
    /// Per-request timeout for the HTTP client.
    pub request_timeout: Duration,
    /// Extra attempts after a transient fetch failure.
    pub fetch_retries: u32,
    /// Base delay of the exponential backoff between retries.
    pub retry_backoff: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            storage_dir: PathBuf::from(".clinic-client"),
            request_timeout: Duration::from_secs(15),
            fetch_retries: 2,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

impl Config {
    /// Reads `CLINIC_*` environment overrides on top of the defaults.
    /// Unparseable values fall back with a warning rather than aborting.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("CLINIC_API_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }
        if let Ok(dir) = env::var("CLINIC_STORAGE_DIR") {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(secs) = parse_env_u64("CLINIC_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = parse_env_u64("CLINIC_FETCH_RETRIES") {
            config.fetch_retries = retries as u32;
        }
        if let Some(ms) = parse_env_u64("CLINIC_RETRY_BACKOFF_MS") {
            config.retry_backoff = Duration::from_millis(ms);
        }
        config
    }
}

fn parse_env_u64(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert!(!config.api_base_url.ends_with('/'));
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.fetch_retries, 2);
    }

    // Both assertions share one test: the environment is process-global.
    #[test]
    fn request_timeout_env_override_applies() {
        env::set_var("CLINIC_REQUEST_TIMEOUT_SECS", "30");
        assert_eq!(
            Config::from_env().request_timeout,
            Duration::from_secs(30)
        );

        env::set_var("CLINIC_REQUEST_TIMEOUT_SECS", "not a number");
        assert_eq!(
            Config::from_env().request_timeout,
            Duration::from_secs(15)
        );
        env::remove_var("CLINIC_REQUEST_TIMEOUT_SECS");
    }
}
