use std::time::Duration;

use crate::builder::SiteConfigBuilder;
use crate::cache::CacheConfig;

const DEFAULT_USER_AGENT: &str = "site-ws/0.1";

/// Configurable options for connecting to one LMS site
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Root URL of the site, without the web service script path
    pub base_url: String,

    /// Web service token issued for the mobile service
    pub token: String,

    /// Stable identifier for this site
    ///
    /// When absent, one is derived from the site host and the
    /// authenticated user id during the connection handshake.
    pub site_id: Option<String>,

    /// Preferred response language, sent with every call when set
    pub language: Option<String>,

    /// User agent string
    pub user_agent: String,

    /// Overall timeout for the entire HTTP request
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Tuning for the per-site response cache
    pub cache: CacheConfig,
}

impl SiteConfig {
    /// Create a configuration with default timeouts and caching for the given site.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            site_id: None,
            language: None,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            cache: CacheConfig::default(),
        }
    }

    pub fn builder(base_url: impl Into<String>, token: impl Into<String>) -> SiteConfigBuilder {
        SiteConfigBuilder::new(base_url, token)
    }
}
