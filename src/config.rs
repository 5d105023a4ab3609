use std::env;
use std::time::Duration;

// Backend the dev server proxies `/api` to when no base URL is configured.
const DEV_BACKEND_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub parallelism: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: build_time_base_url(),
            timeout: Duration::from_secs(10),
            parallelism: 4,
        }
    }
}

impl ApiConfig {
    /// Loads `.env.local` / `.env` and reads `PRACTICE_API_*` overrides.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let defaults = Self::default();
        let base_url = env::var("PRACTICE_API_URL")
            .ok()
            .filter(|val| !val.trim().is_empty())
            .unwrap_or(defaults.base_url);
        let timeout_secs = env::var("PRACTICE_API_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(defaults.timeout.as_secs())
            .clamp(1, 120);
        let parallelism = env::var("FETCH_PARALLELISM")
            .ok()
            .and_then(|val| val.parse::<usize>().ok())
            .unwrap_or(defaults.parallelism)
            .clamp(1, 16);

        Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
            parallelism,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Absolute URL for an `/api/...` path. An empty base means "same origin",
    /// which for a terminal client is the development backend.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        let base = if base.is_empty() { DEV_BACKEND_URL } else { base };
        format!("{base}{path}")
    }
}

fn build_time_base_url() -> String {
    option_env!("PRACTICE_API_URL").unwrap_or("").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = ApiConfig::with_base_url("http://plans.local:9000/");
        assert_eq!(
            config.endpoint("/api/positions/sport/1"),
            "http://plans.local:9000/api/positions/sport/1"
        );
    }

    #[test]
    fn empty_base_targets_dev_backend() {
        let config = ApiConfig::with_base_url("");
        assert_eq!(
            config.endpoint("/api/practice-plans/generator"),
            "http://localhost:8080/api/practice-plans/generator"
        );
    }
}
