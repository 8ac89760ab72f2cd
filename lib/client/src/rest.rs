//! Knowledge service REST client.
//!
//! Wraps every outbound call with auth-header injection, a single retry when
//! the service reports an expired session token, and credential-redacted
//! logging on both success and failure paths.

use crate::config::{TenantConfig, TenantKey};
use crate::error::ApiError;
use crate::token::{TOKEN_RENEWAL_INTERVAL, TokenStore};
use crate::transport::{HttpRequest, Method, ReqwestTransport, Transport};
use serde_json::{Value as JsonValue, json};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Header carrying the knowledge service auth payload.
pub const KM_AUTH_HEADER: &str = "kmauthtoken";

/// Options for a single request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// HTTP method.
    pub method: Method,
    /// Extra headers. Supplying `kmauthtoken` here suppresses injection.
    pub headers: Vec<(String, String)>,
    /// JSON body, if any.
    pub body: Option<JsonValue>,
}

impl RequestOptions {
    /// A plain GET.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// A POST with a JSON body.
    #[must_use]
    pub fn post(body: JsonValue) -> Self {
        Self {
            method: Method::Post,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Client for one tenant of the knowledge service.
///
/// Cheap to clone; clones share the transport and the token store.
#[derive(Clone)]
pub struct KnowledgeClient {
    config: Arc<TenantConfig>,
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenStore>,
    tenant_key: TenantKey,
}

impl KnowledgeClient {
    /// Creates a client over an explicit transport.
    #[must_use]
    pub fn new(config: TenantConfig, transport: Arc<dyn Transport>, tokens: Arc<TokenStore>) -> Self {
        let tenant_key = config.tenant_key();
        Self {
            config: Arc::new(config),
            transport,
            tokens,
            tenant_key,
        }
    }

    /// Creates a client over the default reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_default_transport(
        config: TenantConfig,
        tokens: Arc<TokenStore>,
    ) -> Result<Self, ApiError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::new(config, transport, tokens))
    }

    /// The tenant configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &TenantConfig {
        &self.config
    }

    /// Issues a request against the versioned content API.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response, after
    /// the expired-token retry has been exhausted.
    pub async fn content_request(
        &self,
        relative_url: &str,
        options: RequestOptions,
    ) -> Result<JsonValue, ApiError> {
        let url = format!("{}/{relative_url}", self.config.versioned_content_api());
        self.request(&url, options).await
    }

    /// Issues a request against the versioned search API.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::content_request`].
    pub async fn search_request(
        &self,
        relative_url: &str,
        options: RequestOptions,
    ) -> Result<JsonValue, ApiError> {
        let url = format!("{}/{relative_url}", self.config.versioned_search_api());
        self.request(&url, options).await
    }

    /// Returns the tenant's integration token, acquiring one if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the login call fails.
    pub async fn integration_user_token(&self) -> Result<String, ApiError> {
        if let Some(token) = self.tokens.token(&self.tenant_key) {
            return Ok(token);
        }
        self.acquire_token().await
    }

    async fn request(&self, url: &str, options: RequestOptions) -> Result<JsonValue, ApiError> {
        match self.dispatch(url, options.clone()).await {
            Ok(body) => Ok(body),
            Err(err) if err.is_session_expired() => {
                info!(tenant = %self.tenant_key, "integration user token expired, retrying once");
                self.tokens.evict(&self.tenant_key);
                let mut retry = options;
                retry
                    .headers
                    .retain(|(name, _)| !name.eq_ignore_ascii_case(KM_AUTH_HEADER));
                // A second expiry here propagates; there is no retry loop.
                self.dispatch(url, retry).await
            }
            Err(err) => Err(err),
        }
    }

    async fn dispatch(&self, url: &str, mut options: RequestOptions) -> Result<JsonValue, ApiError> {
        let has_auth = options
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(KM_AUTH_HEADER));
        if !has_auth {
            let token = self.integration_user_token().await?;
            let auth = json!({
                "siteName": self.config.site_name,
                "interfaceId": self.config.interface_id,
                "integrationUserToken": token,
            });
            options.headers.push((KM_AUTH_HEADER.to_string(), auth.to_string()));
        }
        self.send_logged(url, options).await
    }

    /// Sends a request as-is. Never injects auth, so the login call can use
    /// this path without recursing through token acquisition.
    async fn send_logged(&self, url: &str, options: RequestOptions) -> Result<JsonValue, ApiError> {
        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        headers.extend(options.headers);

        let logged_body = options.body.as_ref().map(redact_credentials);
        let request = HttpRequest {
            method: options.method,
            url: url.to_string(),
            headers,
            body: options.body,
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(url, body = ?logged_body, error = %err, "knowledge request failed");
                return Err(err);
            }
        };

        if response.is_success() {
            debug!(url, body = ?logged_body, status = response.status, "knowledge request succeeded");
            return Ok(response.body);
        }

        let err = ApiError::Status {
            status: response.status,
            code: error_code(&response.body),
            body: response.body.to_string(),
        };
        if !err.is_session_expired() {
            warn!(url, body = ?logged_body, error = %err, "knowledge request failed");
        }
        Err(err)
    }

    #[instrument(skip(self), fields(tenant = %self.tenant_key))]
    async fn acquire_token(&self) -> Result<String, ApiError> {
        info!("generating integration user token");
        let token = self.login().await?;
        let generation = self.tokens.insert(self.tenant_key.clone(), token.clone());
        self.spawn_renewal(generation);
        Ok(token)
    }

    /// Performs the login call and returns the raw token.
    async fn login(&self) -> Result<String, ApiError> {
        let url = format!(
            "{}/auth/integration/authorize",
            self.config.versioned_content_api()
        );
        let bootstrap = json!({
            "siteName": self.config.site_name,
            "localeId": self.config.locale_id,
        });
        let options = RequestOptions::post(json!({
            "login": self.config.integration_user_name,
            "password": self.config.integration_user_password,
            "siteName": self.config.site_name,
        }))
        .with_header(KM_AUTH_HEADER, bootstrap.to_string());

        let body = self.send_logged(&url, options).await?;
        body.get("authenticationToken")
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::InvalidResponse {
                reason: "authorize response missing authenticationToken".to_string(),
            })
    }

    /// Schedules proactive renewal for the entry at `generation`.
    ///
    /// The task re-logs-in every renewal interval and refreshes the entry in
    /// place. It exits as soon as its generation is superseded; renewal
    /// failures are logged and never propagate to in-flight requests.
    fn spawn_renewal(&self, generation: u64) {
        let client = self.clone();
        let key = self.tenant_key.clone();
        let handle = tokio::spawn(async move {
            loop {
                tokio::time::sleep(TOKEN_RENEWAL_INTERVAL).await;
                if client.tokens.generation(&key) != Some(generation) {
                    break;
                }
                info!(tenant = %key, "renewing integration user token");
                match client.login().await {
                    Ok(token) => {
                        if !client.tokens.refresh(&key, generation, token) {
                            break;
                        }
                    }
                    Err(err) => {
                        warn!(tenant = %key, error = %err, "integration token renewal failed");
                    }
                }
            }
        })
        .abort_handle();
        self.tokens.set_renewal(&self.tenant_key, generation, handle);
    }
}

/// Strips password fields from a request body before it is logged.
fn redact_credentials(body: &JsonValue) -> JsonValue {
    let mut body = body.clone();
    if let Some(object) = body.as_object_mut() {
        object.remove("password");
    }
    body
}

/// Extracts the service error code from an error response body.
fn error_code(body: &JsonValue) -> Option<String> {
    body.get("error")
        .and_then(|error| error.get("errorCode"))
        .and_then(JsonValue::as_str)
        .map(str::to_string)
}
