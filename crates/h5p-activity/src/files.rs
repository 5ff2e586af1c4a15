//! # Trusted File Resolution
//!
//! Deployment of H5P packages into servable files. An uploaded package
//! is not directly playable; the site deploys it and hands out a
//! trusted file URL instead. The resolver trait keeps that exchange
//! behind a seam, so tests and alternative deployments can stand in
//! for the site's web service.

use std::sync::Arc;

use async_trait::async_trait;
use site_ws::{CacheKey, MessageCatalog, ReadOptions, SessionRegistry, UpdateFrequency, WsParams};

use crate::error::{ActivityError, ActivityResult};
use crate::functions::{MSG_FILE_NOT_FOUND, WS_GET_TRUSTED_FILE, default_messages};
use crate::models::{H5pFile, TrustedFileResponse};

/// Display tuning for the embedded H5P player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct H5pDisplayOptions {
    /// Offer the package for download
    pub export: bool,

    /// Offer an embed code
    pub embed: bool,

    /// Show the copyright button
    pub copyright: bool,

    /// Draw the H5P frame around the content
    pub frame: bool,
}

impl H5pDisplayOptions {
    /// Append the options as the `1`/`0` flag parameters the deployment
    /// endpoint expects.
    pub(crate) fn apply_to(&self, params: &mut WsParams) {
        params.add("frame", self.frame as u8);
        params.add("export", self.export as u8);
        params.add("embed", self.embed as u8);
        params.add("copyright", self.copyright as u8);
    }
}

/// Resolves package URLs into deployed, trusted files.
#[async_trait]
pub trait TrustedFileResolver: Send + Sync {
    /// Resolve `url` into a servable file.
    ///
    /// `ignore_cache` forces a round trip to the site. `site_id` picks
    /// the session, `None` meaning the current one.
    async fn trusted_file(
        &self,
        url: &str,
        display: Option<&H5pDisplayOptions>,
        ignore_cache: bool,
        site_id: Option<&str>,
    ) -> ActivityResult<H5pFile>;
}

/// Resolver backed by the site's own H5P deployment web service
pub struct WsFileResolver {
    sessions: Arc<SessionRegistry>,
    messages: MessageCatalog,
}

impl WsFileResolver {
    pub fn new(sessions: Arc<SessionRegistry>) -> Self {
        Self {
            sessions,
            messages: default_messages(),
        }
    }

    /// Replace the user-facing strings, e.g. with translated ones.
    pub fn with_messages(mut self, messages: MessageCatalog) -> Self {
        self.messages = messages;
        self
    }
}

/// Deployment responses are cached per package URL
///
/// The display flags are deliberately not part of the key; the site
/// returns the same deployed file regardless of them.
fn trusted_file_key(url: &str) -> CacheKey {
    CacheKey::new(format!("coreH5P:trustedFile:{url}"))
}

#[async_trait]
impl TrustedFileResolver for WsFileResolver {
    async fn trusted_file(
        &self,
        url: &str,
        display: Option<&H5pDisplayOptions>,
        ignore_cache: bool,
        site_id: Option<&str>,
    ) -> ActivityResult<H5pFile> {
        let session = self.sessions.resolve(site_id)?;

        let mut params = WsParams::new();
        params.add("url", url);
        if let Some(display) = display {
            display.apply_to(&mut params);
        }

        let options = ReadOptions {
            skip_cache: ignore_cache,
            ..ReadOptions::cached(trusted_file_key(url), UpdateFrequency::Rarely)
        };

        let response: TrustedFileResponse = session
            .read_as(WS_GET_TRUSTED_FILE, params, options)
            .await?;

        response
            .files
            .into_iter()
            .next()
            .ok_or_else(|| ActivityError::NotFound(self.messages.text(MSG_FILE_NOT_FOUND)))
    }
}
