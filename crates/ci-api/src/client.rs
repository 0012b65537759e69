//! HTTP client for the server under test

use std::sync::Arc;

use ci_registry::EntityRegistry;
use reqwest::{header, Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cleanup::register_created;
use crate::{ApiError, ApiResult, Credentials, HarnessConfig, RetryPolicy};

/// Response from an API call, normalized for assertions
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    /// Parsed JSON body, if the body was JSON
    pub body: Option<Value>,
    pub raw_body: String,
    /// Whether the status met the request's expectations
    pub success: bool,
}

impl ApiResponse {
    /// The JSON body, or `Value::Null` when the body was not JSON
    pub fn json(&self) -> &Value {
        self.body.as_ref().unwrap_or(&Value::Null)
    }

    /// Get a header value
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Statuses that count as success; any 2xx when empty
    pub expected_status: Vec<StatusCode>,
    /// Repeat failed attempts with backoff
    pub retry: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `status` as success (may be called repeatedly)
    pub fn expect_status(mut self, status: StatusCode) -> Self {
        self.expected_status.push(status);
        self
    }

    pub fn with_retry(mut self) -> Self {
        self.retry = true;
        self
    }

    /// Whether `status` meets these options
    pub fn is_success(&self, status: StatusCode) -> bool {
        if self.expected_status.is_empty() {
            status.is_success()
        } else {
            self.expected_status.contains(&status)
        }
    }

    fn describe_expected(&self) -> String {
        if self.expected_status.is_empty() {
            "2xx".to_string()
        } else {
            self.expected_status
                .iter()
                .map(|s| s.as_u16().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Authenticated connection to the server, without any registry
///
/// Cheap to clone; cleanup callbacks hold one of these.
#[derive(Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl Transport {
    pub fn new(config: &HarnessConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a single request; any HTTP status is returned as a response
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let url = self.url(path);
        debug!(method = %method, url = %url, "Sending request");

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(header::ACCEPT, "application/json");

        request = match &self.credentials {
            Credentials::Token(token) => request.bearer_auth(token),
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            Credentials::Anonymous => request,
        };

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;
        Self::parse_response(method, url, response, options).await
    }

    async fn parse_response(
        method: Method,
        url: String,
        response: Response,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let status = response.status();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let raw_body = response.text().await.map_err(|source| ApiError::Transport {
            method: method.clone(),
            url: url.clone(),
            source,
        })?;
        let body = serde_json::from_str(&raw_body).ok();

        debug!(method = %method, url = %url, status = status.as_u16(), "Received response");

        Ok(ApiResponse {
            success: options.is_success(status),
            method,
            url,
            status,
            headers,
            body,
            raw_body,
        })
    }
}

/// REST client that registers every entity it creates
///
/// A successful `POST` whose body carries an `id` or `username` is handed to
/// the [`EntityRegistry`] along with a callback that deletes it.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
    registry: Arc<EntityRegistry>,
    retry: RetryPolicy,
}

impl ApiClient {
    pub fn new(config: &HarnessConfig, registry: Arc<EntityRegistry>) -> ApiResult<Self> {
        Ok(Self {
            transport: Transport::new(config)?,
            registry,
            retry: RetryPolicy::with_attempts(config.retry_count),
        })
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn registry(&self) -> &Arc<EntityRegistry> {
        &self.registry
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(Method::GET, path, None, &RequestOptions::default())
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post<B>(&self, path: &str, body: &B) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        self.post_with(path, body, &RequestOptions::default()).await
    }

    /// Make a POST request with JSON body and explicit options
    pub async fn post_with<B>(
        &self,
        path: &str,
        body: &B,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::POST, path, Some(&body), options).await
    }

    /// Make a PUT request with JSON body
    pub async fn put<B>(&self, path: &str, body: &B) -> ApiResult<ApiResponse>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)?;
        self.request(Method::PUT, path, Some(&body), &RequestOptions::default())
            .await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> ApiResult<ApiResponse> {
        self.request(Method::DELETE, path, None, &RequestOptions::default())
            .await
    }

    /// Send a request and enforce the expected-status contract
    ///
    /// With `options.retry`, failed attempts are repeated with backoff up to
    /// the policy's attempt count. A retried `POST` may create the entity
    /// more than once; only the response that succeeded is registered.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> ApiResult<ApiResponse> {
        let attempts = if options.retry {
            self.retry.max_attempts.max(1)
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            let error = match self.transport.send(method.clone(), path, body, options).await {
                Ok(response) if response.success => {
                    if method == Method::POST {
                        register_created(&self.registry, &self.transport, path, &response);
                    }
                    return Ok(response);
                }
                Ok(response) => ApiError::UnexpectedStatus {
                    method: response.method,
                    url: response.url,
                    status: response.status,
                    expected: options.describe_expected(),
                    body: response.raw_body,
                },
                Err(err) => err,
            };

            attempt += 1;
            if attempt >= attempts {
                return Err(error);
            }

            let delay = self.retry.delay(attempt - 1);
            warn!(
                method = %method,
                path = %path,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
