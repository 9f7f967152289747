//! Mock Sonarr server for testing the series reconciler

use std::ops::Deref;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::arr::MockArrServer;

/// Mock Sonarr server
pub struct MockSonarrServer {
    base: MockArrServer,
}

impl MockSonarrServer {
    /// Start a new mock Sonarr server with default API key
    pub async fn start() -> Self {
        Self {
            base: MockArrServer::start_with_api_key("test-api-key").await,
        }
    }

    /// Mount a mock for the series list and for each series' detail resource
    pub async fn mock_series(&self, series: Vec<SeriesFixture>) {
        let body: Vec<Value> = series.iter().map(SeriesFixture::to_json).collect();
        self.base.mock_get("/api/v3/series", Value::Array(body)).await;

        for show in &series {
            self.base
                .mock_get(&format!("/api/v3/series/{}", show.id), show.to_json())
                .await;
        }
    }

    /// Mount a mock for one season's episodes
    pub async fn mock_episodes(&self, series_id: i64, season_number: i32, episodes: Vec<EpisodeFixture>) {
        let body: Vec<Value> = episodes.iter().map(EpisodeFixture::to_json).collect();

        Mock::given(method("GET"))
            .and(path("/api/v3/episode"))
            .and(query_param("seriesId", series_id.to_string()))
            .and(query_param("seasonNumber", season_number.to_string()))
            .and(header("X-Api-Key", self.base.api_key()))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(body)))
            .mount(self.base.server())
            .await;
    }

    /// Accept batched episode monitor edits and series updates
    pub async fn mock_mutations(&self) {
        self.base.mock_put("^/api/v3/episode/monitor$").await;
        self.base.mock_put("^/api/v3/series/[0-9]+$").await;
        self.base.mock_put("^/api/v3/series/editor$").await;
    }

    /// JSON bodies sent to the batched episode monitor endpoint
    pub async fn episode_monitor_payloads(&self) -> Vec<Value> {
        self.base
            .requests("PUT", "/api/v3/episode/monitor")
            .await
            .into_iter()
            .map(|req| req.body)
            .collect()
    }

    /// JSON bodies written back to one series
    pub async fn series_updates(&self, series_id: i64) -> Vec<Value> {
        self.base
            .requests("PUT", &format!("/api/v3/series/{series_id}"))
            .await
            .into_iter()
            .map(|req| req.body)
            .collect()
    }
}

impl Deref for MockSonarrServer {
    type Target = MockArrServer;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

/// Fixture for creating Sonarr series responses
#[derive(Debug, Clone)]
pub struct SeriesFixture {
    pub id: i64,
    pub title: String,
    pub monitored: bool,
    pub tags: Vec<i64>,
    pub seasons: Vec<(i32, bool)>,
}

impl SeriesFixture {
    /// Create a monitored series with season 1 monitored
    pub fn monitored(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            monitored: true,
            tags: Vec::new(),
            seasons: vec![(1, true)],
        }
    }

    /// Create an unmonitored series
    pub fn unmonitored(id: i64, title: &str) -> Self {
        let mut series = Self::monitored(id, title);
        series.monitored = false;
        series
    }

    pub fn with_tags(mut self, tags: &[i64]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    /// Replace the season list with `(season_number, monitored)` pairs
    pub fn with_seasons(mut self, seasons: &[(i32, bool)]) -> Self {
        self.seasons = seasons.to_vec();
        self
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "monitored": self.monitored,
            "tags": self.tags,
            "seasons": self
                .seasons
                .iter()
                .map(|(number, monitored)| json!({
                    "seasonNumber": number,
                    "monitored": monitored
                }))
                .collect::<Vec<_>>()
        })
    }
}

/// Fixture for creating Sonarr episode responses
#[derive(Debug, Clone)]
pub struct EpisodeFixture {
    pub id: i64,
    pub series_id: i64,
    pub season_number: i32,
    pub episode_number: i32,
    pub title: String,
    pub air_date_utc: Option<String>,
    pub monitored: bool,
    pub has_file: bool,
}

impl EpisodeFixture {
    /// Create a monitored episode without an air date
    pub fn new(id: i64, series_id: i64, season_number: i32, episode_number: i32) -> Self {
        Self {
            id,
            series_id,
            season_number,
            episode_number,
            title: format!("Episode {episode_number}"),
            air_date_utc: None,
            monitored: true,
            has_file: false,
        }
    }

    pub fn airing(mut self, at: &str) -> Self {
        self.air_date_utc = Some(at.to_string());
        self
    }

    pub fn unmonitored(mut self) -> Self {
        self.monitored = false;
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
            "seriesId": self.series_id,
            "seasonNumber": self.season_number,
            "episodeNumber": self.episode_number,
            "title": self.title,
            "airDateUtc": self.air_date_utc,
            "monitored": self.monitored,
            "hasFile": self.has_file
        })
    }
}
