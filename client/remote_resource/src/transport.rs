//! The HTTP boundary.
//!
//! The controller never talks to `reqwest` directly; it hands an [`ApiRequest`]
//! to a [`Transport`] and gets an [`ApiResponse`] (or a network-level
//! [`FetchError`]) back.  [`HttpTransport`] is the production implementation.
//!
//! Decoding lives here too so reads and writes share one set of rules:
//!
//! * non-2xx → [`FetchError::Server`] with the body's `message` if present;
//! * non-JSON content type with a body → [`FetchError::Decode`];
//! * empty body → decoded as JSON `null`.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::errors::{FetchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

/// A request relative to the configured base address.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path beginning with `/`, optionally with a query string already attached.
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        ApiRequest {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// A `200 OK` JSON response.  Mostly useful for test doubles.
    pub fn json(value: &Value) -> Self {
        Self::with_status(200, value)
    }

    pub fn with_status(status: u16, value: &Value) -> Self {
        ApiResponse {
            status,
            content_type: Some("application/json".to_string()),
            body: value.to_string().into_bytes(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map_or(true, |ct| ct.to_ascii_lowercase().contains("json"))
    }

    /// Decode the body as `T`, applying the shared status/content-type rules.
    pub fn decode<T: DeserializeOwned>(&self) -> std::result::Result<T, FetchError> {
        if !self.is_success() {
            return Err(FetchError::server(self.status, &self.body));
        }

        let body = self.body.as_slice();
        if body.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_value(Value::Null)
                .map_err(|e| FetchError::decode(format!("Empty response body: {e}")));
        }

        if !self.is_json() {
            return Err(FetchError::decode(
                "Server did not return JSON. Maybe a redirect or error page?",
            ));
        }

        serde_json::from_slice(body)
            .map_err(|e| FetchError::decode(format!("Unexpected response shape: {e}")))
    }
}

/// Sends requests to the backend.  Implementations must resolve every failure
/// to a [`FetchError`]; they never panic on bad input from the network.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, FetchError>;
}

/// `reqwest`-backed transport with a cookie store, so the session cookie set
/// at login authenticates every later request.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .cookie_store(true)
            .build()?;

        Ok(HttpTransport {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, FetchError> {
        let url = self.url_for(&request.path);
        debug!("{} {url}", request.method.as_str());

        let mut builder = self.client.request(request.method.into(), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError::network(describe_transport_error(&e)))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::network(describe_transport_error(&e)))?
            .to_vec();

        debug!("{} {url} → {status} ({} bytes)", request.method.as_str(), body.len());

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timed out".to_string()
    } else if e.is_connect() {
        "Could not connect to the server".to_string()
    } else {
        e.to_string()
    }
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}
