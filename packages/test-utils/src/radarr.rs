//! Mock Radarr server for testing the movies reconciler
//!
//! Provides a [`MockRadarrServer`] that simulates the Radarr v3 endpoints the
//! gateway uses, plus [`MovieFixture`] for building movie payloads.

use std::ops::Deref;

use serde_json::{json, Value};

use crate::arr::MockArrServer;

/// Mock Radarr server
///
/// # Example
///
/// ```rust,ignore
/// use unmonitarr_test_utils::{MockRadarrServer, MovieFixture};
///
/// #[tokio::test]
/// async fn test_radarr() {
///     let server = MockRadarrServer::start().await;
///     server.mock_movies(vec![MovieFixture::monitored(1, "Dune")]).await;
///     server.mock_editor().await;
/// }
/// ```
pub struct MockRadarrServer {
    base: MockArrServer,
}

impl MockRadarrServer {
    /// Start a new mock Radarr server with default API key
    pub async fn start() -> Self {
        Self {
            base: MockArrServer::start_with_api_key("test-api-key").await,
        }
    }

    /// Mount a mock for the movie list
    pub async fn mock_movies(&self, movies: Vec<MovieFixture>) {
        let body: Vec<Value> = movies.iter().map(MovieFixture::to_json).collect();
        self.base.mock_get("/api/v3/movie", Value::Array(body)).await;
    }

    /// Accept bulk movie edits
    pub async fn mock_editor(&self) {
        self.base.mock_put("^/api/v3/movie/editor$").await;
    }

    /// JSON bodies sent to the movie editor, in order
    pub async fn editor_payloads(&self) -> Vec<Value> {
        self.base
            .requests("PUT", "/api/v3/movie/editor")
            .await
            .into_iter()
            .map(|req| req.body)
            .collect()
    }
}

impl Deref for MockRadarrServer {
    type Target = MockArrServer;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// Fixture for creating Radarr movie responses
#[derive(Debug, Clone)]
pub struct MovieFixture {
    pub id: i64,
    pub title: String,
    pub monitored: bool,
    pub tags: Vec<i64>,
    pub digital_release: Option<String>,
    pub physical_release: Option<String>,
    pub in_cinemas: Option<String>,
    pub has_file: bool,
}

impl MovieFixture {
    /// Create a monitored movie without release dates or file
    pub fn monitored(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            monitored: true,
            tags: Vec::new(),
            digital_release: None,
            physical_release: None,
            in_cinemas: None,
            has_file: false,
        }
    }

    /// Create an unmonitored movie
    pub fn unmonitored(id: i64, title: &str) -> Self {
        let mut movie = Self::monitored(id, title);
        movie.monitored = false;
        movie
    }

    pub fn with_digital_release(mut self, at: &str) -> Self {
        self.digital_release = Some(at.to_string());
        self
    }

    pub fn with_physical_release(mut self, at: &str) -> Self {
        self.physical_release = Some(at.to_string());
        self
    }

    pub fn with_in_cinemas(mut self, at: &str) -> Self {
        self.in_cinemas = Some(at.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[i64]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    pub fn with_file(mut self) -> Self {
        self.has_file = true;
        self
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "monitored": self.monitored,
            "tags": self.tags,
            "digitalRelease": self.digital_release,
            "physicalRelease": self.physical_release,
            "inCinemas": self.in_cinemas,
            "hasFile": self.has_file
        })
    }
}
