//! Catalog gateway capabilities consumed by the reconcilers

use async_trait::async_trait;
use serde_json::Value;

use crate::client::GatewayResponse;
use crate::error::ArrResult;
use crate::models::{Episode, Series, Tag, TagMode};

/// Read and mutate one catalog category
#[async_trait]
pub trait CatalogGateway: Send + Sync {
    /// The catalog item type (movie or series)
    type Item: Send;

    async fn list_items(&self) -> ArrResult<Vec<Self::Item>>;

    async fn list_tags(&self) -> ArrResult<Vec<Tag>>;

    async fn create_tag(&self, label: &str) -> ArrResult<GatewayResponse>;

    /// Bulk-set the monitored flag on catalog items
    async fn set_monitored(&self, item_ids: &[i64], monitored: bool)
        -> ArrResult<GatewayResponse>;

    /// Bulk-add or remove one tag on catalog items
    async fn apply_tag(
        &self,
        item_ids: &[i64],
        tag_id: i64,
        mode: TagMode,
    ) -> ArrResult<GatewayResponse>;

    /// Fetch one item as raw JSON, for read-modify-write updates
    async fn get_item(&self, id: i64) -> ArrResult<Value>;

    /// Replace one item with the given JSON resource
    async fn update_item(&self, id: i64, patch: &Value) -> ArrResult<GatewayResponse>;

    fn is_dry_run(&self) -> bool;
}

/// Episode-level operations of the series catalog
#[async_trait]
pub trait SeriesGateway: CatalogGateway<Item = Series> {
    async fn list_episodes(&self, series_id: i64, season_number: i32) -> ArrResult<Vec<Episode>>;

    /// Set the monitored flag on many episodes in one call
    async fn set_episodes_monitored(
        &self,
        episode_ids: &[i64],
        monitored: bool,
    ) -> ArrResult<GatewayResponse>;
}
