//! # Builder for SiteConfig
//!
//! This module provides a builder pattern implementation for creating and
//! customizing SiteConfig instances with a fluent API.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use site_ws::SiteConfig;
//!
//! let config = SiteConfig::builder("https://campus.example.edu", "ws-token")
//!     .with_timeout(Duration::from_secs(20))
//!     .with_site_id("campus")
//!     .with_language("en")
//!     .build();
//!
//! assert_eq!(config.timeout, Duration::from_secs(20));
//! assert_eq!(config.site_id.as_deref(), Some("campus"));
//! ```

use std::time::Duration;

use crate::cache::CacheConfig;
use crate::config::SiteConfig;

/// Builder for creating SiteConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct SiteConfigBuilder {
    /// Internal config being built
    config: SiteConfig,
}

impl SiteConfigBuilder {
    /// Create a new builder for the given site URL and token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            config: SiteConfig::new(base_url, token),
        }
    }

    /// Set an explicit site identifier instead of the derived one.
    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.config.site_id = Some(site_id.into());
        self
    }

    /// Set the preferred response language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.config.language = Some(language.into());
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the overall timeout for the entire HTTP request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout (time to establish initial connection).
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Replace the cache tuning wholesale.
    pub fn with_cache_config(mut self, cache: CacheConfig) -> Self {
        self.config.cache = cache;
        self
    }

    /// Enable or disable response caching.
    pub fn with_caching_enabled(mut self, enabled: bool) -> Self {
        self.config.cache.enabled = enabled;
        self
    }

    /// Build the SiteConfig instance
    pub fn build(self) -> SiteConfig {
        self.config
    }
}
