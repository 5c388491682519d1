use serde::{Deserialize, Serialize};

/// Upstream endpoints and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base of the REST API (default: `https://en.wikipedia.org/api/rest_v1`)
    pub api_base: String,

    /// Action API used for the raw-content fallback
    pub action_api: String,

    /// Site root used for article URLs and `/w/...` links
    pub site_base: String,

    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds (default: 15)
    pub timeout_secs: u64,

    /// Maximum concurrent requests when prefetching (default: 5)
    pub max_concurrency: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: "https://en.wikipedia.org/api/rest_v1".to_string(),
            action_api: "https://en.wikipedia.org/w/api.php".to_string(),
            site_base: "https://en.wikipedia.org".to_string(),
            user_agent: format!("swipedia/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 15,
            max_concurrency: 5,
        }
    }
}
