//! Client configuration

use std::time::Duration;

use civiclink_domain::DEFAULT_PAGE_SIZE;

/// Connection settings for the CMS API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL including the API prefix, e.g. `https://cms.example.org/api`.
    pub base_url: String,
    /// Transport timeout applied to every request. A hung fetch fails with
    /// `ApiError::Network` instead of wedging callers.
    pub timeout: Duration,
    pub user_agent: String,
    /// Default page size for list queries.
    pub page_size: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cms.civiclink.example/api".to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("civiclink/{}", env!("CARGO_PKG_VERSION")),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ApiConfig {
    /// Configuration pointing at the given base URL, defaults elsewhere.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    /// Read overrides from the environment, falling back to defaults.
    ///
    /// Recognized variables: `CIVICLINK_API_URL`,
    /// `CIVICLINK_API_TIMEOUT_SECS`, `CIVICLINK_PAGE_SIZE`. A `.env` file is
    /// honored when present.
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Ok(url) = std::env::var("CIVICLINK_API_URL") {
            config.base_url = url;
        }
        if let Some(secs) = env_parse::<u64>("CIVICLINK_API_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(size) = env_parse::<u32>("CIVICLINK_PAGE_SIZE") {
            config.page_size = size;
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|raw| raw.parse().ok())
}
