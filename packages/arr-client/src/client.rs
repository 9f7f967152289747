//! Shared HTTP core for the Radarr and Sonarr clients

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};
use unmonitarr_shared_config::ArrConfig;

use crate::error::{ArrError, ArrResult};
use crate::models::Tag;

/// Maximum error body size kept in an [`ArrError::Api`]
const MAX_ERROR_BODY_SIZE: usize = 1000;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Which *arr service a client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Radarr,
    Sonarr,
}

impl Service {
    pub fn name(&self) -> &'static str {
        match self {
            Service::Radarr => "Radarr",
            Service::Sonarr => "Sonarr",
        }
    }
}

/// Outcome of a mutating call
///
/// Dry-run mode never reaches the network; callers branch on the variant
/// instead of inspecting a fake HTTP response.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayResponse {
    /// The request was sent and the service answered
    Real { status: u16, body: Value },
    /// The request was intercepted and only logged
    Suppressed {
        method: Method,
        path: String,
        payload: Option<Value>,
    },
}

impl GatewayResponse {
    pub fn is_suppressed(&self) -> bool {
        matches!(self, GatewayResponse::Suppressed { .. })
    }

    /// Response body of a real call
    pub fn body(&self) -> Option<&Value> {
        match self {
            GatewayResponse::Real { body, .. } => Some(body),
            GatewayResponse::Suppressed { .. } => None,
        }
    }
}

/// HTTP core with API key auth, timeouts and dry-run interception
#[derive(Clone)]
pub struct ArrClient {
    http_client: Client,
    config: ArrConfig,
    service: Service,
    dry_run: bool,
}

impl fmt::Debug for ArrClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrClient")
            .field("service", &self.service)
            .field("url", &self.config.url)
            .field("api_key", &"[REDACTED]")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl ArrClient {
    /// Create a client for one service instance
    pub fn new(service: Service, config: &ArrConfig, dry_run: bool) -> ArrResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("Unmonitarr/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            config: config.clone(),
            service,
            dry_run,
        })
    }

    pub fn service(&self) -> Service {
        self.service
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Issue a GET and decode the JSON body. Reads are never intercepted.
    pub async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> ArrResult<T>
    where
        T: DeserializeOwned,
    {
        debug!(service = self.service.name(), path, "GET");

        let request = self
            .http_client
            .get(self.config.api_url(path))
            .header("X-Api-Key", &self.config.api_key)
            .query(query);

        let response = self.execute(request, path).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Issue a mutating request, or log it when running dry
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<&Value>,
    ) -> ArrResult<GatewayResponse> {
        if self.dry_run && is_mutating(&method) {
            let rendered = payload
                .map(Value::to_string)
                .unwrap_or_else(|| "(no body)".to_string());
            info!(
                service = self.service.name(),
                "[DRY] {} {} -> {}",
                method,
                path,
                rendered
            );
            return Ok(GatewayResponse::Suppressed {
                method,
                path: path.to_string(),
                payload: payload.cloned(),
            });
        }

        debug!(service = self.service.name(), %method, path, "sending request");

        let mut request = self
            .http_client
            .request(method, self.config.api_url(path))
            .header("X-Api-Key", &self.config.api_key);
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = self.execute(request, path).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(GatewayResponse::Real { status, body })
    }

    pub async fn list_tags(&self) -> ArrResult<Vec<Tag>> {
        self.get("tag", &[]).await
    }

    /// Create a tag; the real response carries the new tag
    pub async fn create_tag(&self, label: &str) -> ArrResult<GatewayResponse> {
        let payload = serde_json::json!({ "label": label });
        self.send(Method::POST, "tag", Some(&payload)).await
    }

    /// Send the request and turn transport and status failures into [`ArrError`]
    async fn execute(&self, request: RequestBuilder, path: &str) -> ArrResult<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ArrError::Timeout {
                    service: self.service.name(),
                    path: path.to_string(),
                }
            } else if e.is_connect() {
                ArrError::Connection {
                    service: self.service.name(),
                    message: e.to_string(),
                }
            } else {
                ArrError::Http(e)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ArrError::Api {
                service: self.service.name(),
                status,
                message: truncate_error_body(body),
            });
        }

        Ok(response)
    }
}

fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

/// Truncate an error body on a UTF-8 boundary
fn truncate_error_body(body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_SIZE {
        return body;
    }

    let truncate_at = body
        .char_indices()
        .map(|(idx, _)| idx)
        .take_while(|idx| *idx <= MAX_ERROR_BODY_SIZE)
        .last()
        .unwrap_or(0);

    format!("{}... (truncated)", &body[..truncate_at])
}
