//! Radarr (movies) gateway

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use unmonitarr_shared_config::ArrConfig;

use crate::client::{ArrClient, GatewayResponse, Service};
use crate::error::ArrResult;
use crate::gateway::CatalogGateway;
use crate::models::{Movie, Tag, TagMode};

/// Radarr v3 API client
#[derive(Debug, Clone)]
pub struct RadarrClient {
    inner: ArrClient,
}

impl RadarrClient {
    pub fn new(config: &ArrConfig, dry_run: bool) -> ArrResult<Self> {
        Ok(Self {
            inner: ArrClient::new(Service::Radarr, config, dry_run)?,
        })
    }
}

#[async_trait]
impl CatalogGateway for RadarrClient {
    type Item = Movie;

    async fn list_items(&self) -> ArrResult<Vec<Movie>> {
        self.inner.get("movie", &[]).await
    }

    async fn list_tags(&self) -> ArrResult<Vec<Tag>> {
        self.inner.list_tags().await
    }

    async fn create_tag(&self, label: &str) -> ArrResult<GatewayResponse> {
        self.inner.create_tag(label).await
    }

    async fn set_monitored(&self, item_ids: &[i64], monitored: bool) -> ArrResult<GatewayResponse> {
        let payload = json!({ "movieIds": item_ids, "monitored": monitored });
        self.inner
            .send(Method::PUT, "movie/editor", Some(&payload))
            .await
    }

    async fn apply_tag(
        &self,
        item_ids: &[i64],
        tag_id: i64,
        mode: TagMode,
    ) -> ArrResult<GatewayResponse> {
        let payload = json!({ "movieIds": item_ids, "tags": [tag_id], "applyTags": mode });
        self.inner
            .send(Method::PUT, "movie/editor", Some(&payload))
            .await
    }

    async fn get_item(&self, id: i64) -> ArrResult<Value> {
        self.inner.get(&format!("movie/{id}"), &[]).await
    }

    async fn update_item(&self, id: i64, patch: &Value) -> ArrResult<GatewayResponse> {
        self.inner
            .send(Method::PUT, &format!("movie/{id}"), Some(patch))
            .await
    }

    fn is_dry_run(&self) -> bool {
        self.inner.is_dry_run()
    }
}
