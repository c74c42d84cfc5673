use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:7001/api";
pub const DEFAULT_STORAGE_PATH: &str = ".finance/storage.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Settings the client needs to reach the backend and persist its session.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Reads `FINANCE_API_BASE_URL`, `FINANCE_STORAGE_PATH` and
    /// `FINANCE_REQUEST_TIMEOUT_SECS`, falling back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup("FINANCE_API_BASE_URL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or(defaults.api_base_url);
        let storage_path = lookup("FINANCE_STORAGE_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_path);
        let request_timeout = lookup("FINANCE_REQUEST_TIMEOUT_SECS")
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            storage_path,
            request_timeout,
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: &str) -> Self {
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_environment_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("FINANCE_API_BASE_URL", "https://finance.example.com/api/"),
            ("FINANCE_STORAGE_PATH", "/tmp/finance.json"),
            ("FINANCE_REQUEST_TIMEOUT_SECS", "5"),
        ]));

        assert_eq!(config.api_base_url, "https://finance.example.com/api");
        assert_eq!(config.storage_path, PathBuf::from("/tmp/finance.json"));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_unparseable_timeout_falls_back() {
        let config = ClientConfig::from_lookup(lookup_from(&[(
            "FINANCE_REQUEST_TIMEOUT_SECS",
            "soon",
        )]));
        assert_eq!(
            config.request_timeout,
            Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_with_api_base_url_strips_trailing_slash() {
        let config = ClientConfig::default().with_api_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:9000");
    }
}
