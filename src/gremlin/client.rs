//! GremlinHttpClient: HTTP transport to Gremlin Server or Amazon Neptune
//!
//! Scripts are POSTed as `{"gremlin": "..."}` to the `/gremlin` endpoint and
//! answered with a GraphSON v3 envelope.

use crate::backend::{BackendError, BackendResult, GraphBackend};
use crate::config::{AuthMode, GraphConfig};
use crate::gremlin::sigv4::{Credentials, SigV4Signer, SigningError};
use crate::gremlin::traversal::Traversal;
use crate::gremlin::value::{from_graphson, GValue};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HOST};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value as Json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const GRAPHSON_V3: &str = "application/vnd.gremlin-v3.0+json";

/// Longest slice of an upstream body kept in an error message
const MAX_ERROR_BODY: usize = 512;

#[derive(Error, Debug)]
pub enum ClientBuildError {
    #[error("invalid gremlin endpoint '{0}'")]
    InvalidUrl(String),

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IAM signing: {0}")]
    Signing(#[from] SigningError),

    #[error("IAM mode requires a region")]
    MissingRegion,
}

/// Network client for a Gremlin HTTP endpoint
pub struct GremlinHttpClient {
    http: Client,
    url: Url,
    /// Host header value, signed in IAM mode
    host: String,
    signer: Option<SigV4Signer>,
    closed: AtomicBool,
}

impl GremlinHttpClient {
    /// Create an unauthenticated client for the given endpoint URL.
    ///
    /// `request_timeout` bounds every request end to end.
    ///
    /// # Example
    /// ```no_run
    /// # use std::time::Duration;
    /// # use moviegraph::gremlin::GremlinHttpClient;
    /// let client = GremlinHttpClient::new(
    ///     "http://localhost:8182/gremlin",
    ///     Duration::from_secs(5),
    ///     Duration::from_secs(2),
    /// ).unwrap();
    /// ```
    pub fn new(
        endpoint: &str,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ClientBuildError> {
        let url = Url::parse(endpoint).map_err(|_| ClientBuildError::InvalidUrl(endpoint.to_string()))?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{}:{}", h, p),
            (Some(h), None) => h.to_string(),
            (None, _) => return Err(ClientBuildError::InvalidUrl(endpoint.to_string())),
        };

        let http = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(16)
            .build()?;

        Ok(Self {
            http,
            url,
            host,
            signer: None,
            closed: AtomicBool::new(false),
        })
    }

    /// Sign every request with SigV4
    pub fn with_signer(mut self, signer: SigV4Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Build the client described by the configuration. IAM mode reads AWS
    /// credentials from the environment once, here.
    pub fn from_config(config: &GraphConfig, request_timeout: Duration) -> Result<Self, ClientBuildError> {
        let client = Self::new(
            &config.gremlin_url(),
            request_timeout,
            Duration::from_millis(config.connect_timeout_ms),
        )?;
        match config.auth_mode {
            AuthMode::None => Ok(client),
            AuthMode::Iam => {
                let region = config.region.clone().ok_or(ClientBuildError::MissingRegion)?;
                let credentials = Credentials::from_env()?;
                Ok(client.with_signer(SigV4Signer::new(credentials, region)))
            }
        }
    }

    pub fn endpoint(&self) -> &str {
        self.url.as_str()
    }

    async fn post_script(&self, script: &str) -> BackendResult<Vec<GValue>> {
        let body = serde_json::to_vec(&serde_json::json!({ "gremlin": script }))
            .map_err(|e| BackendError::Protocol(e.to_string()))?;

        let mut request = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, GRAPHSON_V3);

        if let Some(signer) = &self.signer {
            let headers = signer
                .sign("POST", &self.host, self.url.path(), &body, Utc::now())
                .map_err(|e| BackendError::Rejected {
                    status: 0,
                    message: e.to_string(),
                })?;
            request = request.header(HOST, self.host.as_str());
            for (name, value) in headers {
                request = request.header(name, value);
            }
        }

        let response = request.body(body).send().await.map_err(classify_transport)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &text));
        }
        parse_response(&text)
    }
}

#[async_trait]
impl GraphBackend for GremlinHttpClient {
    async fn submit(&self, traversal: &Traversal) -> BackendResult<Vec<GValue>> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Closed);
        }
        let script = traversal.to_script();
        debug!(endpoint = %self.url, %script, "submitting gremlin script");
        self.post_script(&script).await
    }

    fn name(&self) -> &'static str {
        "gremlin-http"
    }

    async fn close(&self) {
        // Pooled connections are released when the last clone of `http` drops.
        self.closed.store(true, Ordering::Release);
    }
}

#[derive(Deserialize)]
struct GremlinResponse {
    #[serde(default)]
    status: Option<ResponseStatus>,
    #[serde(default)]
    result: Option<ResponseResult>,
}

#[derive(Deserialize)]
struct ResponseStatus {
    code: u16,
}

#[derive(Deserialize)]
struct ResponseResult {
    #[serde(default)]
    data: Json,
}

/// Decode a successful response envelope into its result list
pub(crate) fn parse_response(text: &str) -> BackendResult<Vec<GValue>> {
    let envelope: GremlinResponse =
        serde_json::from_str(text).map_err(|e| BackendError::Protocol(e.to_string()))?;

    if let Some(status) = &envelope.status {
        if !matches!(status.code, 200 | 204 | 206) {
            return Err(classify_failure(status.code, text));
        }
    }

    let data = match envelope.result {
        Some(result) => result.data,
        None => return Ok(Vec::new()),
    };
    match from_graphson(&data).map_err(|e| BackendError::Protocol(e.to_string()))? {
        GValue::Null => Ok(Vec::new()),
        GValue::List(items) => Ok(items),
        single => Ok(vec![single]),
    }
}

fn classify_transport(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else if err.is_decode() {
        BackendError::Protocol(err.to_string())
    } else {
        BackendError::Unavailable(err.to_string())
    }
}

/// Map a non-success status (HTTP or Gremlin) and its body to a backend error
pub(crate) fn classify_failure(status: u16, body: &str) -> BackendError {
    let parsed: Option<Json> = serde_json::from_str(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|j| j.get(name))
            .and_then(Json::as_str)
            .map(str::to_string)
    };

    let code = field("code")
        .or_else(|| field("Exception-Class"))
        .or_else(|| {
            parsed
                .as_ref()
                .and_then(|j| j.get("exceptions"))
                .and_then(Json::as_array)
                .and_then(|a| a.first())
                .and_then(Json::as_str)
                .map(str::to_string)
        })
        .unwrap_or_default();
    let message = field("detailedMessage")
        .or_else(|| field("message"))
        .or_else(|| {
            parsed
                .as_ref()
                .and_then(|j| j.get("status"))
                .and_then(|s| s.get("message"))
                .and_then(Json::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| truncate(body));
    let detail = if code.is_empty() {
        message.clone()
    } else {
        format!("{}: {}", code, message)
    };

    let is_timeout = status == 598
        || status == 504
        || ["TimeLimitExceeded", "TimeoutException", "QueryTimeout"]
            .iter()
            .any(|m| code.contains(m) || message.contains(m));
    if is_timeout {
        return BackendError::Timeout(detail);
    }

    let is_transient = matches!(status, 429 | 502 | 503)
        || [
            "ThrottlingException",
            "ConcurrentModificationException",
            "ReadOnlyViolationException",
            "MemoryLimitExceededException",
        ]
        .iter()
        .any(|m| code.contains(m));
    if is_transient {
        return BackendError::Unavailable(detail);
    }

    BackendError::Rejected {
        status,
        message: detail,
    }
}

fn truncate(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
