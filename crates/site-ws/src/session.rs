//! # Site Sessions
//!
//! A session is the authenticated connection to one LMS site. It owns
//! the transport, the per-site response cache and the capability list
//! the site reported during the connection handshake. The registry
//! keeps every active session and resolves which one a call targets.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::cache::{CacheKey, ReadOptions, WsCache};
use crate::config::SiteConfig;
use crate::error::{WsError, WsResult};
use crate::params::WsParams;
use crate::transport::{HttpTransport, WsTransport};

/// Web service function answering the connection handshake
pub const SITE_INFO_FUNCTION: &str = "core_webservice_get_site_info";

/// Site metadata returned by the handshake
#[derive(Debug, Clone, Deserialize)]
pub struct SiteInfo {
    pub sitename: String,
    pub siteurl: String,
    pub userid: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub release: Option<String>,
    /// Web service functions the token is allowed to call
    #[serde(default)]
    pub functions: Vec<SiteFunction>,
}

/// One web service function advertised by the site
#[derive(Debug, Clone, Deserialize)]
pub struct SiteFunction {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// Authenticated connection to one site.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct SiteSession {
    id: String,
    info: SiteInfo,
    transport: Arc<dyn WsTransport>,
    cache: WsCache,
    /// Function names from the handshake, for capability checks
    functions: HashSet<String>,
}

impl SiteSession {
    /// Connect to a site over the REST transport.
    ///
    /// Performs the site-info handshake before returning, so a returned
    /// session is known to have a working token.
    pub async fn connect(config: SiteConfig) -> WsResult<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        Self::connect_with(config, transport).await
    }

    /// Connect through a caller-supplied transport.
    pub async fn connect_with(
        config: SiteConfig,
        transport: Arc<dyn WsTransport>,
    ) -> WsResult<Self> {
        let payload = transport.call(SITE_INFO_FUNCTION, &WsParams::new()).await?;
        let info: SiteInfo = serde_json::from_value(payload)?;

        let id = config
            .site_id
            .clone()
            .unwrap_or_else(|| derive_site_id(&config.base_url, info.userid));
        let functions: HashSet<String> = info.functions.iter().map(|f| f.name.clone()).collect();

        info!(
            site = %id,
            site_name = %info.sitename,
            functions = functions.len(),
            "connected to site"
        );

        Ok(Self {
            id,
            info,
            transport,
            cache: WsCache::new(config.cache),
            functions,
        })
    }

    /// Stable identifier of this site connection.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Metadata reported by the handshake.
    pub fn info(&self) -> &SiteInfo {
        &self.info
    }

    /// Whether the site advertises the given web service function.
    pub fn supports(&self, function: &str) -> bool {
        self.functions.contains(function)
    }

    /// Execute a read-style function through the response cache.
    ///
    /// The cache is consulted first according to `options`; on a miss the
    /// call goes to the transport and a successful response is stored
    /// under the cache key. When the call fails and a cached copy exists
    /// under the key, the copy is served regardless of age.
    pub async fn read(
        &self,
        function: &str,
        params: WsParams,
        options: ReadOptions,
    ) -> WsResult<Value> {
        if !options.skip_cache {
            if let Some(key) = &options.cache_key {
                if let Some(payload) = self
                    .cache
                    .lookup(key, options.frequency, options.omit_expires)
                    .await
                {
                    return Ok(payload);
                }
            }
        }

        match self.transport.call(function, &params).await {
            Ok(payload) => {
                if let Some(key) = options.cache_key {
                    self.cache.put(key, payload.clone()).await;
                }
                Ok(payload)
            }
            Err(err) => {
                if !options.skip_cache {
                    if let Some(key) = &options.cache_key {
                        // Any cached copy, fresh or stale, beats a failed call
                        if let Some(payload) = self.cache.lookup(key, options.frequency, true).await
                        {
                            warn!(
                                site = %self.id,
                                function = function,
                                error = %err,
                                "web service call failed, serving cached response"
                            );
                            return Ok(payload);
                        }
                    }
                }
                Err(err)
            }
        }
    }

    /// Like [`read`](Self::read), decoding the payload into `T`.
    pub async fn read_as<T: DeserializeOwned>(
        &self,
        function: &str,
        params: WsParams,
        options: ReadOptions,
    ) -> WsResult<T> {
        let payload = self.read(function, params, options).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Execute a write-style function. Never cached.
    pub async fn write(&self, function: &str, params: WsParams) -> WsResult<Value> {
        self.transport.call(function, &params).await
    }

    /// Drop the cached response under the key, if any.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.cache.invalidate(key).await;
    }

    /// Drop every cached response of this session.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}

/// Identifier for a site connection when none was configured.
fn derive_site_id(base_url: &str, userid: i64) -> String {
    let host = Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .unwrap_or_else(|| base_url.trim_end_matches('/').to_owned());
    format!("{host}:{userid}")
}

#[derive(Default)]
struct RegistryInner {
    sessions: HashMap<String, Arc<SiteSession>>,
    current: Option<String>,
}

/// All active site sessions of the application.
///
/// One site is marked as current; calls that do not name a site go
/// there. The first registered session becomes current automatically.
#[derive(Default)]
pub struct SessionRegistry {
    inner: RwLock<RegistryInner>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session and hand back the shared handle.
    pub fn register(&self, session: SiteSession) -> Arc<SiteSession> {
        let session = Arc::new(session);
        let mut inner = self.inner.write();
        if inner.current.is_none() {
            inner.current = Some(session.id().to_owned());
        }
        inner
            .sessions
            .insert(session.id().to_owned(), Arc::clone(&session));
        debug!(site = %session.id(), "session registered");
        session
    }

    /// Make the given site the target for calls without an explicit id.
    pub fn set_current(&self, site_id: &str) -> WsResult<()> {
        let mut inner = self.inner.write();
        if !inner.sessions.contains_key(site_id) {
            return Err(WsError::SessionNotFound(site_id.to_owned()));
        }
        inner.current = Some(site_id.to_owned());
        Ok(())
    }

    /// Resolve the session a call targets.
    ///
    /// `None` means the current session. Unknown ids and a missing
    /// current session are reported as errors, never defaulted.
    pub fn resolve(&self, site_id: Option<&str>) -> WsResult<Arc<SiteSession>> {
        let inner = self.inner.read();
        match site_id {
            Some(id) => inner
                .sessions
                .get(id)
                .cloned()
                .ok_or_else(|| WsError::SessionNotFound(id.to_owned())),
            None => {
                let current = inner.current.as_deref().ok_or(WsError::NoCurrentSession)?;
                inner
                    .sessions
                    .get(current)
                    .cloned()
                    .ok_or_else(|| WsError::SessionNotFound(current.to_owned()))
            }
        }
    }

    /// Remove a session, e.g. on logout.
    ///
    /// Clears the current marker when it pointed at the removed session.
    pub fn remove(&self, site_id: &str) -> Option<Arc<SiteSession>> {
        let mut inner = self.inner.write();
        let removed = inner.sessions.remove(site_id);
        if removed.is_some() && inner.current.as_deref() == Some(site_id) {
            inner.current = None;
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.read().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, UpdateFrequency};
    use parking_lot::Mutex;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::time::Duration;
    use tokio::time::sleep;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    }

    // Transport returning queued responses and recording every call
    struct ScriptedTransport {
        responses: Mutex<VecDeque<WsResult<Value>>>,
        calls: Mutex<Vec<(String, WsParams)>>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<WsResult<Value>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn calls(&self) -> Vec<(String, WsParams)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait::async_trait]
    impl WsTransport for ScriptedTransport {
        async fn call(&self, function: &str, params: &WsParams) -> WsResult<Value> {
            self.calls.lock().push((function.to_owned(), params.clone()));
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted call to {function}"))
        }
    }

    fn site_info_payload() -> Value {
        json!({
            "sitename": "Demo Campus",
            "siteurl": "https://campus.example.edu",
            "userid": 7,
            "username": "student",
            "release": "4.5",
            "functions": [
                {"name": "mod_h5pactivity_get_h5pactivities_by_courses", "version": "2024100700"},
                {"name": "core_webservice_get_site_info", "version": "2024100700"}
            ]
        })
    }

    fn config() -> SiteConfig {
        SiteConfig::new("https://campus.example.edu", "token")
    }

    fn short_ttl_config() -> SiteConfig {
        SiteConfig::builder("https://campus.example.edu", "token")
            .with_cache_config(CacheConfig {
                usually_ttl: Duration::from_millis(50),
                ..CacheConfig::default()
            })
            .build()
    }

    fn read_options(name: &str) -> ReadOptions {
        ReadOptions::cached(
            CacheKey::new(format!("demo:test:{name}")),
            UpdateFrequency::Usually,
        )
    }

    #[tokio::test]
    async fn test_connect_populates_identity_and_capabilities() {
        init_tracing();
        let transport = ScriptedTransport::new(vec![Ok(site_info_payload())]);
        let session = SiteSession::connect_with(config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        assert_eq!(session.id(), "campus.example.edu:7");
        assert_eq!(session.info().sitename, "Demo Campus");
        assert_eq!(session.info().userid, 7);
        assert!(session.supports("mod_h5pactivity_get_h5pactivities_by_courses"));
        assert!(!session.supports("mod_h5pactivity_get_h5pactivity_access_information"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, SITE_INFO_FUNCTION);
        assert!(calls[0].1.is_empty());
    }

    #[tokio::test]
    async fn test_connect_honors_explicit_site_id() {
        let transport = ScriptedTransport::new(vec![Ok(site_info_payload())]);
        let config = SiteConfig::builder("https://campus.example.edu", "token")
            .with_site_id("campus-prod")
            .build();
        let session = SiteSession::connect_with(config, transport).await.unwrap();
        assert_eq!(session.id(), "campus-prod");
    }

    #[tokio::test]
    async fn test_read_serves_repeat_requests_from_cache() {
        let transport =
            ScriptedTransport::new(vec![Ok(site_info_payload()), Ok(json!({"canview": true}))]);
        let session = SiteSession::connect_with(config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        let first = session
            .read("mod_demo_get_info", WsParams::new(), read_options("info"))
            .await
            .unwrap();
        let second = session
            .read("mod_demo_get_info", WsParams::new(), read_options("info"))
            .await
            .unwrap();

        assert_eq!(first, json!({"canview": true}));
        assert_eq!(second, first);
        // Handshake plus exactly one network read
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_read_without_key_is_never_cached() {
        let transport = ScriptedTransport::new(vec![
            Ok(site_info_payload()),
            Ok(json!({"n": 1})),
            Ok(json!({"n": 2})),
        ]);
        let session = SiteSession::connect_with(config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        let first = session
            .read("mod_demo_get_info", WsParams::new(), ReadOptions::default())
            .await
            .unwrap();
        let second = session
            .read("mod_demo_get_info", WsParams::new(), ReadOptions::default())
            .await
            .unwrap();

        assert_eq!(first, json!({"n": 1}));
        assert_eq!(second, json!({"n": 2}));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_skip_cache_refetches_and_stores() {
        let transport = ScriptedTransport::new(vec![
            Ok(site_info_payload()),
            Ok(json!({"rev": 1})),
            Ok(json!({"rev": 2})),
        ]);
        let session = SiteSession::connect_with(config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        let first = session
            .read("mod_demo_get_info", WsParams::new(), read_options("rev"))
            .await
            .unwrap();
        assert_eq!(first, json!({"rev": 1}));

        let skipped = session
            .read(
                "mod_demo_get_info",
                WsParams::new(),
                ReadOptions {
                    skip_cache: true,
                    ..read_options("rev")
                },
            )
            .await
            .unwrap();
        assert_eq!(skipped, json!({"rev": 2}));

        // The bypassing read replaced the stored entry
        let cached = session
            .read("mod_demo_get_info", WsParams::new(), read_options("rev"))
            .await
            .unwrap();
        assert_eq!(cached, json!({"rev": 2}));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_omit_expires_serves_stale_but_cold_cache_goes_to_network() {
        let transport =
            ScriptedTransport::new(vec![Ok(site_info_payload()), Ok(json!({"n": 1}))]);
        let session = SiteSession::connect_with(short_ttl_config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        let offline_options = || ReadOptions {
            omit_expires: true,
            ..read_options("offline")
        };

        // Cold cache: even an offline-first read must hit the network
        let first = session
            .read("mod_demo_get_info", WsParams::new(), offline_options())
            .await
            .unwrap();
        assert_eq!(first, json!({"n": 1}));
        assert_eq!(transport.call_count(), 2);

        sleep(Duration::from_millis(120)).await;

        // Entry is now stale for a fresh read, but omit_expires accepts it
        let second = session
            .read("mod_demo_get_info", WsParams::new(), offline_options())
            .await
            .unwrap();
        assert_eq!(second, json!({"n": 1}));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_failed_call_falls_back_to_stale_entry() {
        init_tracing();
        let transport = ScriptedTransport::new(vec![
            Ok(site_info_payload()),
            Ok(json!({"n": 1})),
            Err(WsError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
        ]);
        let session = SiteSession::connect_with(short_ttl_config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        let first = session
            .read("mod_demo_get_info", WsParams::new(), read_options("fallback"))
            .await
            .unwrap();
        assert_eq!(first, json!({"n": 1}));

        sleep(Duration::from_millis(120)).await;

        // Fresh read required, entry stale, network broken: stale copy wins
        let second = session
            .read("mod_demo_get_info", WsParams::new(), read_options("fallback"))
            .await
            .unwrap();
        assert_eq!(second, json!({"n": 1}));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failed_call_without_cached_copy_propagates() {
        let transport = ScriptedTransport::new(vec![
            Ok(site_info_payload()),
            Err(WsError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
        ]);
        let session = SiteSession::connect_with(config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        let result = session
            .read("mod_demo_get_info", WsParams::new(), read_options("cold"))
            .await;
        assert!(matches!(result, Err(WsError::Status(_))));
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let transport = ScriptedTransport::new(vec![
            Ok(site_info_payload()),
            Ok(json!({"n": 1})),
            Ok(json!({"n": 2})),
        ]);
        let session = SiteSession::connect_with(config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        let options = || read_options("invalidated");
        let key = CacheKey::new("demo:test:invalidated");

        let first = session
            .read("mod_demo_get_info", WsParams::new(), options())
            .await
            .unwrap();
        assert_eq!(first, json!({"n": 1}));

        session.invalidate(&key).await;

        let second = session
            .read("mod_demo_get_info", WsParams::new(), options())
            .await
            .unwrap();
        assert_eq!(second, json!({"n": 2}));
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_write_bypasses_cache() {
        let transport = ScriptedTransport::new(vec![
            Ok(site_info_payload()),
            Ok(json!({"status": true})),
            Ok(json!({"status": true})),
        ]);
        let session = SiteSession::connect_with(config(), Arc::clone(&transport) as Arc<dyn WsTransport>)
            .await
            .unwrap();

        let mut params = WsParams::new();
        params.add("h5pactivityid", 42);
        session
            .write("mod_h5pactivity_view_h5pactivity", params.clone())
            .await
            .unwrap();
        session
            .write("mod_h5pactivity_view_h5pactivity", params)
            .await
            .unwrap();

        assert_eq!(transport.call_count(), 3);
        let calls = transport.calls();
        assert_eq!(calls[1].0, "mod_h5pactivity_view_h5pactivity");
        assert_eq!(calls[1].1.get("h5pactivityid"), Some("42"));
    }

    #[tokio::test]
    async fn test_read_as_decodes_payload() {
        #[derive(Deserialize)]
        struct Probe {
            canview: bool,
        }

        let transport =
            ScriptedTransport::new(vec![Ok(site_info_payload()), Ok(json!({"canview": true}))]);
        let session = SiteSession::connect_with(config(), transport).await.unwrap();

        let probe: Probe = session
            .read_as("mod_demo_get_info", WsParams::new(), read_options("typed"))
            .await
            .unwrap();
        assert!(probe.canview);
    }

    async fn session_with_id(id: &str) -> SiteSession {
        let transport = ScriptedTransport::new(vec![Ok(site_info_payload())]);
        let config = SiteConfig::builder("https://campus.example.edu", "token")
            .with_site_id(id)
            .build();
        SiteSession::connect_with(config, transport).await.unwrap()
    }

    #[tokio::test]
    async fn test_registry_resolves_current_and_explicit() {
        let registry = SessionRegistry::new();
        registry.register(session_with_id("alpha").await);
        registry.register(session_with_id("beta").await);

        // First registered session became current
        assert_eq!(registry.resolve(None).unwrap().id(), "alpha");
        assert_eq!(registry.resolve(Some("beta")).unwrap().id(), "beta");

        registry.set_current("beta").unwrap();
        assert_eq!(registry.resolve(None).unwrap().id(), "beta");
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn test_registry_reports_missing_sessions() {
        let registry = SessionRegistry::new();
        match registry.resolve(None) {
            Err(WsError::NoCurrentSession) => {}
            Err(other) => panic!("expected NoCurrentSession, got {other:?}"),
            Ok(session) => panic!("expected NoCurrentSession, got session {}", session.id()),
        }

        registry.register(session_with_id("alpha").await);
        match registry.resolve(Some("ghost")) {
            Err(WsError::SessionNotFound(id)) => assert_eq!(id, "ghost"),
            Err(other) => panic!("expected SessionNotFound, got {other:?}"),
            Ok(session) => panic!("expected SessionNotFound, got session {}", session.id()),
        }

        match registry.set_current("ghost") {
            Err(WsError::SessionNotFound(id)) => assert_eq!(id, "ghost"),
            other => panic!("expected SessionNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_registry_remove_clears_current_marker() {
        let registry = SessionRegistry::new();
        registry.register(session_with_id("alpha").await);

        assert!(registry.remove("alpha").is_some());
        assert!(registry.is_empty());
        assert!(matches!(
            registry.resolve(None),
            Err(WsError::NoCurrentSession)
        ));
        assert!(registry.remove("alpha").is_none());
    }

    #[test]
    fn test_derive_site_id() {
        assert_eq!(
            derive_site_id("https://campus.example.edu/", 7),
            "campus.example.edu:7"
        );
        assert_eq!(derive_site_id("not a url", 3), "not a url:3");
    }
}
