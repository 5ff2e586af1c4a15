//! # Site-WS
//!
//! A client engine for LMS web services, built for mobile-style apps
//! that stay useful on a flaky connection. Talks the Moodle-compatible
//! REST protocol and keeps one authenticated session per site.
//!
//! ## Features
//!
//! - Named-function calls over a pluggable transport
//! - Read-through response cache with per-read freshness policies
//! - Stale fallback when the network is down
//! - Multi-site session registry with a current-site default
//! - Event forwarding to the site log store

pub mod builder;
pub mod cache;
pub mod config;
pub mod error;
pub mod events;
pub mod lang;
pub mod params;
pub mod session;
pub mod transport;

pub use builder::SiteConfigBuilder;
pub use cache::{CacheConfig, CacheKey, ReadOptions, UpdateFrequency, WsCache};
pub use config::SiteConfig;
pub use error::{WsError, WsResult};
pub use params::WsParams;

// Re-export the session surface most callers need
pub use session::{SITE_INFO_FUNCTION, SessionRegistry, SiteFunction, SiteInfo, SiteSession};

// Re-export transport seam for custom bindings and tests
pub use transport::{HttpTransport, WsTransport};

// Re-export event logging
pub use events::{EventLogger, LoggedEvent};

// Re-export localization
pub use lang::MessageCatalog;
