use std::{sync::Arc, time::Duration};

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE},
    Method, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::envelope::{ApiResponse, REQUEST_SUCCESSFUL};
use crate::config::{ApiConfig, Environment};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid gateway base url `{0}`")]
    InvalidBaseUrl(String),
    #[error("failed to build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// What a [`ResponseHook`] sees about a completed call.
#[derive(Debug, Clone, Copy)]
pub struct ResponseContext<'a> {
    pub method: &'a Method,
    pub endpoint: &'a str,
    pub status: StatusCode,
    /// Bearer token the request carried, if any.
    pub bearer: Option<&'a str>,
}

/// Cross-cutting reaction to every response the gateway actually returned.
/// Synthesized timeout/network envelopes are not reported.
pub trait ResponseHook: Send + Sync {
    fn on_response(&self, ctx: &ResponseContext<'_>);
}

#[derive(Debug, Clone)]
enum Body {
    Empty,
    Json(Value),
    Unencodable(String),
}

/// One call against the gateway.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    endpoint: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Body,
    bearer: Option<String>,
    timeout: Option<Duration>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self {
            method,
            endpoint: endpoint.into(),
            query: Vec::new(),
            headers,
            body: Body::Empty,
            bearer: None,
            timeout: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PUT, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Self {
        self.body = match serde_json::to_value(body) {
            Ok(value) => Body::Json(value),
            Err(e) => Body::Unencodable(e.to_string()),
        };
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches `Authorization: Bearer <token>` when a token is present.
    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.bearer = token.map(str::to_owned);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Gateway client. Every call resolves to an [`ApiResponse`]; nothing is
/// retried and nothing is raised.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    default_timeout: Duration,
    verbose: bool,
    hook: Option<Arc<dyn ResponseHook>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("default_timeout", &self.default_timeout)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|_| ClientError::InvalidBaseUrl(config.base_url.clone()))?;

        // The refresh token lives in an httpOnly cookie; keep a jar so it is
        // replayed on /refresh and /logout.
        let http = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            http,
            base_url,
            default_timeout: config.timeout,
            verbose: config.environment == Environment::Local,
            hook: None,
        })
    }

    pub fn with_hook(mut self, hook: Arc<dyn ResponseHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self, request), fields(method = %request.method, endpoint = %request.endpoint))]
    pub async fn request<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResponse<T> {
        let ApiRequest {
            method,
            endpoint,
            query,
            headers,
            body,
            bearer,
            timeout,
        } = request;

        let url = format!("{}{}", self.base_url, endpoint);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .headers(headers)
            .timeout(timeout.unwrap_or(self.default_timeout));
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(token) = &bearer {
            builder = builder.bearer_auth(token);
        }
        match body {
            Body::Empty => {}
            Body::Json(value) => builder = builder.json(&value),
            Body::Unencodable(e) => {
                warn!(error = %e, "request body could not be encoded");
                return ApiResponse::network_error(format!("failed to encode request body: {e}"));
            }
        }

        if self.verbose {
            debug!(%url, bearer = bearer.is_some(), "api request");
        }

        let result = match builder.send().await {
            Ok(response) => {
                let status = response.status();
                let result = read_response(response).await;
                if let Some(hook) = &self.hook {
                    hook.on_response(&ResponseContext {
                        method: &method,
                        endpoint: &endpoint,
                        status,
                        bearer: bearer.as_deref(),
                    });
                }
                result
            }
            Err(e) => transport_failure(e),
        };

        if self.verbose {
            debug!(
                status = result.status,
                success = result.success,
                message = %result.message,
                "api response"
            );
        }
        result
    }
}

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> ApiResponse<T> {
    let status = response.status();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let bytes = match response.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => return transport_failure(e),
    };

    if is_json {
        if status.is_success() {
            return match serde_json::from_slice::<T>(&bytes) {
                Ok(data) => ApiResponse::new(status.as_u16(), Some(data), REQUEST_SUCCESSFUL),
                Err(e) => {
                    warn!(%status, error = %e, "response body did not match the expected shape");
                    ApiResponse::network_error(format!("failed to decode response body: {e}"))
                }
            };
        }
        let message = serde_json::from_slice::<Value>(&bytes)
            .ok()
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| reason(status));
        return ApiResponse::new(status.as_u16(), None, message);
    }

    let text = String::from_utf8_lossy(&bytes).into_owned();
    let message = match (text.trim().is_empty(), status.is_success()) {
        (true, true) => REQUEST_SUCCESSFUL.to_string(),
        (true, false) => reason(status),
        (false, _) => text,
    };
    ApiResponse::new(status.as_u16(), None, message)
}

fn transport_failure<T>(e: reqwest::Error) -> ApiResponse<T> {
    if e.is_timeout() {
        warn!("request timed out");
        ApiResponse::timed_out()
    } else {
        warn!(error = %e, "request failed");
        ApiResponse::network_error(e.to_string())
    }
}

/// Error text from the JSON shapes the gateway services use
/// (`{"message"}`, FastAPI's `{"detail"}`, `{"error"}`).
fn error_message(body: &Value) -> Option<String> {
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_owned)
        .unwrap_or_else(|| status.as_str().to_owned())
}
