//! # Web Service Transport
//!
//! Wire binding for LMS web service calls.
//!
//! The HTTP transport speaks the Moodle-compatible REST protocol: each
//! call is a form-encoded POST to `webservice/rest/server.php` carrying
//! the token, the function name and the flattened parameters, answered
//! with JSON. Application-level failures arrive as a 200 response whose
//! body is an `exception` envelope; those are decoded into
//! [`WsError::Fault`] so callers never see a fault payload as data.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::SiteConfig;
use crate::error::{WsError, WsResult};
use crate::params::WsParams;

/// Path of the REST endpoint relative to the site root
const REST_SERVER_PATH: &str = "webservice/rest/server.php";

/// Response format requested from the endpoint
const REST_FORMAT: &str = "json";

/// Executes named web service functions against one site.
///
/// Implementations are expected to be cheap to share behind an `Arc`;
/// sessions keep a single transport for their whole lifetime.
#[async_trait]
pub trait WsTransport: Send + Sync {
    /// Execute `function` with the given parameters and return the raw
    /// JSON payload.
    async fn call(&self, function: &str, params: &WsParams) -> WsResult<Value>;
}

/// REST transport bound to one site and token
pub struct HttpTransport {
    /// Full URL of the REST endpoint
    endpoint: String,
    /// Web service token sent with every call
    token: String,
    /// Response language requested from the server, if any
    language: Option<String>,
    client: Client,
}

impl HttpTransport {
    /// Build a transport from the site configuration.
    pub fn new(config: &SiteConfig) -> WsResult<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| WsError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        let endpoint = format!("{}/{REST_SERVER_PATH}", base.as_str().trim_end_matches('/'));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self {
            endpoint,
            token: config.token.clone(),
            language: config.language.clone(),
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl WsTransport for HttpTransport {
    async fn call(&self, function: &str, params: &WsParams) -> WsResult<Value> {
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(params.len() + 4);
        form.push(("wstoken", self.token.as_str()));
        form.push(("wsfunction", function));
        form.push(("moodlewsrestformat", REST_FORMAT));
        if let Some(language) = &self.language {
            form.push(("moodlewssettinglang", language));
        }
        for (key, value) in params.pairs() {
            form.push((key.as_str(), value.as_str()));
        }

        debug!(function = function, params = params.len(), "calling web service");

        let response = self.client.post(&self.endpoint).form(&form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WsError::Status(status));
        }

        let payload: Value = response.json().await?;
        if let Some(fault) = decode_fault(&payload) {
            return Err(fault);
        }
        Ok(payload)
    }
}

/// Decode the REST fault envelope, if the payload is one.
///
/// A fault is an object with an `exception` field; `errorcode` and
/// `message` are optional in practice and fall back to placeholders.
fn decode_fault(payload: &Value) -> Option<WsError> {
    let body = payload.as_object()?;
    if !body.contains_key("exception") {
        return None;
    }

    let errorcode = body
        .get("errorcode")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("web service call failed")
        .to_string();

    Some(WsError::Fault { errorcode, message })
}
