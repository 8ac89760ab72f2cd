//! HTTP transport seam.
//!
//! The client speaks to the knowledge service through the `Transport` trait
//! so that tests (and offline hosts) can script responses without a network.
//! The production implementation wraps `reqwest`.

use crate::error::ApiError;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::Mutex;

/// HTTP method for a knowledge service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// GET request.
    #[default]
    Get,
    /// POST request.
    Post,
}

/// An outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<JsonValue>,
}

/// A response from the service.
///
/// Non-2xx statuses are returned here too; classifying them is the client's
/// job, not the transport's.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; a non-JSON body is wrapped as a JSON string.
    pub body: JsonValue,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for issuing HTTP requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` when the request could not be delivered
    /// at all; an error status from the service is a successful send.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with default client settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Transport {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| ApiError::Transport {
            reason: e.to_string(),
        })?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| ApiError::Transport {
            reason: e.to_string(),
        })?;

        let body = if text.is_empty() {
            JsonValue::Null
        } else {
            serde_json::from_str(&text).unwrap_or(JsonValue::String(text))
        };

        Ok(HttpResponse { status, body })
    }
}

/// A transport that replays a fixed script of responses.
///
/// Each `send` pops the next scripted response and records the request it
/// answered. Intended for tests and for hosts running without a backend.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Creates an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a response to the script.
    pub fn push_response(&self, status: u16, body: JsonValue) {
        self.responses
            .lock()
            .expect("script lock")
            .push_back(Ok(HttpResponse { status, body }));
    }

    /// Appends a transport failure to the script.
    pub fn push_failure(&self, reason: impl Into<String>) {
        self.responses
            .lock()
            .expect("script lock")
            .push_back(Err(ApiError::Transport {
                reason: reason.into(),
            }));
    }

    /// Returns the requests answered so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("script lock").clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().expect("script lock").push(request);
        self.responses
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| {
                Err(ApiError::Transport {
                    reason: "scripted transport exhausted".to_string(),
                })
            })
    }
}
