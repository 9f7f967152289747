//! Sonarr (series) gateway

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use unmonitarr_shared_config::ArrConfig;

use crate::client::{ArrClient, GatewayResponse, Service};
use crate::error::ArrResult;
use crate::gateway::{CatalogGateway, SeriesGateway};
use crate::models::{Episode, Series, Tag, TagMode};

/// Sonarr v3 API client
#[derive(Debug, Clone)]
pub struct SonarrClient {
    inner: ArrClient,
}

impl SonarrClient {
    pub fn new(config: &ArrConfig, dry_run: bool) -> ArrResult<Self> {
        Ok(Self {
            inner: ArrClient::new(Service::Sonarr, config, dry_run)?,
        })
    }
}

#[async_trait]
impl CatalogGateway for SonarrClient {
    type Item = Series;

    async fn list_items(&self) -> ArrResult<Vec<Series>> {
        self.inner.get("series", &[]).await
    }

    async fn list_tags(&self) -> ArrResult<Vec<Tag>> {
        self.inner.list_tags().await
    }

    async fn create_tag(&self, label: &str) -> ArrResult<GatewayResponse> {
        self.inner.create_tag(label).await
    }

    async fn set_monitored(&self, item_ids: &[i64], monitored: bool) -> ArrResult<GatewayResponse> {
        let payload = json!({ "seriesIds": item_ids, "monitored": monitored });
        self.inner
            .send(Method::PUT, "series/editor", Some(&payload))
            .await
    }

    async fn apply_tag(
        &self,
        item_ids: &[i64],
        tag_id: i64,
        mode: TagMode,
    ) -> ArrResult<GatewayResponse> {
        let payload = json!({ "seriesIds": item_ids, "tags": [tag_id], "applyTags": mode });
        self.inner
            .send(Method::PUT, "series/editor", Some(&payload))
            .await
    }

    async fn get_item(&self, id: i64) -> ArrResult<Value> {
        self.inner.get(&format!("series/{id}"), &[]).await
    }

    async fn update_item(&self, id: i64, patch: &Value) -> ArrResult<GatewayResponse> {
        self.inner
            .send(Method::PUT, &format!("series/{id}"), Some(patch))
            .await
    }

    fn is_dry_run(&self) -> bool {
        self.inner.is_dry_run()
    }
}

#[async_trait]
impl SeriesGateway for SonarrClient {
    async fn list_episodes(&self, series_id: i64, season_number: i32) -> ArrResult<Vec<Episode>> {
        self.inner
            .get(
                "episode",
                &[
                    ("seriesId", series_id.to_string()),
                    ("seasonNumber", season_number.to_string()),
                ],
            )
            .await
    }

    async fn set_episodes_monitored(
        &self,
        episode_ids: &[i64],
        monitored: bool,
    ) -> ArrResult<GatewayResponse> {
        let payload = json!({ "episodeIds": episode_ids, "monitored": monitored });
        self.inner
            .send(Method::PUT, "episode/monitor", Some(&payload))
            .await
    }
}
