//! Wiremock server shared by the Radarr and Sonarr mocks

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A request the mock server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
}

/// Mock *arr v3 API with the endpoints both services share
///
/// Every mounted mock only matches requests carrying the server's API key.
pub struct MockArrServer {
    server: MockServer,
    api_key: String,
}

impl MockArrServer {
    /// Start a new mock server with custom API key
    pub async fn start_with_api_key(api_key: &str) -> Self {
        let server = MockServer::start().await;
        Self {
            server,
            api_key: api_key.to_string(),
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get the API key
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Access the underlying wiremock server for custom mocks
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Mount a GET mock returning a JSON body
    pub async fn mock_get(&self, api_path: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(api_path))
            .and(header("X-Api-Key", self.api_key.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for the tag list
    pub async fn mock_tags(&self, tags: &[(i64, &str)]) {
        let body: Vec<Value> = tags
            .iter()
            .map(|(id, label)| json!({ "id": id, "label": label }))
            .collect();
        self.mock_get("/api/v3/tag", Value::Array(body)).await;
    }

    /// Mount a mock for tag creation returning the new tag
    pub async fn mock_create_tag(&self, id: i64, label: &str) {
        Mock::given(method("POST"))
            .and(path("/api/v3/tag"))
            .and(header("X-Api-Key", self.api_key.as_str()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": id,
                "label": label
            })))
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for tag creation failure
    pub async fn mock_create_tag_failure(&self) {
        Mock::given(method("POST"))
            .and(path("/api/v3/tag"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "tag creation failed"
            })))
            .mount(&self.server)
            .await;
    }

    /// Accept every PUT whose path matches the pattern
    pub async fn mock_put(&self, path_pattern: &str) {
        Mock::given(method("PUT"))
            .and(path_regex(path_pattern))
            .and(header("X-Api-Key", self.api_key.as_str()))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({})))
            .mount(&self.server)
            .await;
    }

    /// Mount a GET mock that answers only after `delay`
    pub async fn mock_slow_get(&self, api_path: &str, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(api_path))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(delay)
                    .set_body_json(json!([])),
            )
            .mount(&self.server)
            .await;
    }

    /// Mount a mock for server error on every GET
    pub async fn mock_server_error(&self, error_message: &str) {
        Mock::given(method("GET"))
            .and(path_regex("^/api/v3/.*"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": error_message
            })))
            .mount(&self.server)
            .await;
    }

    /// Requests received with the given method and path, in arrival order
    pub async fn requests(&self, http_method: &str, api_path: &str) -> Vec<RecordedRequest> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|req| {
                req.method.to_string().eq_ignore_ascii_case(http_method)
                    && req.url.path() == api_path
            })
            .map(|req| RecordedRequest {
                method: req.method.to_string(),
                path: req.url.path().to_string(),
                body: serde_json::from_slice(&req.body).unwrap_or(Value::Null),
            })
            .collect()
    }

    /// Every mutating request received, in arrival order
    pub async fn mutations(&self) -> Vec<RecordedRequest> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|req| !req.method.to_string().eq_ignore_ascii_case("GET"))
            .map(|req| RecordedRequest {
                method: req.method.to_string(),
                path: req.url.path().to_string(),
                body: serde_json::from_slice(&req.body).unwrap_or(Value::Null),
            })
            .collect()
    }
}
