use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{ApiError, ApiResult};

#[cfg(test)]
use std::cell::RefCell;

// =========================================================
// HTTP interface abstraction
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self.with_header("Content-Type", "application/json")
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body. An empty body (e.g. 204) decodes as JSON `null`,
    /// which satisfies `()` and `Option<_>` targets.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body)
            .map_err(|e| ApiError::decode(format!("unexpected response body: {}", e)).with_source(e))
    }
}

/// Transport used by the API gateway.
///
/// `?Send` because the client core runs on a single-threaded UI event loop.
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    /// Only transport failures are errors; every HTTP status is a response.
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// Production client: reqwest
// =========================================================

#[derive(Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    pub fn new(timeout: Duration) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(format!("failed to build HTTP client: {}", e)).with_source(e))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait(?Send)]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let mut builder = self.client.request(req.method.into(), &req.url);

        for (k, v) in &req.headers {
            builder = builder.header(k, v);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let resp = builder.send().await.map_err(|e| {
            let message = if e.is_timeout() {
                "request timed out".to_string()
            } else {
                format!("request failed: {}", e)
            };
            ApiError::transport(message).with_source(e)
        })?;

        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::transport(format!("failed to read response body: {}", e)).with_source(e))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// Test double: MockHttpClient
// =========================================================

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

#[cfg(test)]
impl RecordedRequest {
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_str(self.body.as_deref().unwrap_or("null")).unwrap()
    }
}

/// Canned responses keyed by `METHOD url`; anything unmatched is a 404.
#[cfg(test)]
#[derive(Default)]
pub struct MockHttpClient {
    responses: RefCell<HashMap<String, (u16, String)>>,
    delays: RefCell<HashMap<String, Duration>>,
    unreachable: RefCell<Vec<String>>,
    pub requests: RefCell<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method, url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.responses
            .borrow_mut()
            .insert(Self::key(method, url), (status, body.to_string()));
    }

    pub fn mock_empty(&self, method: HttpMethod, url: &str, status: u16) {
        self.responses
            .borrow_mut()
            .insert(Self::key(method, url), (status, String::new()));
    }

    /// Hold the response for `url` until `delay` elapses on the tokio clock.
    pub fn mock_delay(&self, url: &str, delay: Duration) {
        self.delays.borrow_mut().insert(url.to_string(), delay);
    }

    pub fn mock_unreachable(&self, url: &str) {
        self.unreachable.borrow_mut().push(url.to_string());
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    pub fn urls(&self) -> Vec<String> {
        self.requests.borrow().iter().map(|r| r.url.clone()).collect()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            method: req.method,
            url: req.url.clone(),
            headers: req.headers.clone(),
            body: req.body.clone(),
        });

        let delay = self.delays.borrow().get(&req.url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.unreachable.borrow().contains(&req.url) {
            return Err(ApiError::transport("connection refused"));
        }

        let responses = self.responses.borrow();
        match responses.get(&Self::key(req.method, &req.url)) {
            Some((status, body)) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
            }),
            None => Ok(HttpResponse {
                status: 404,
                body: r#"{"detail":"Not Found"}"#.to_string(),
            }),
        }
    }
}
