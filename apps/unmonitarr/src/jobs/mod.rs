//! Reconciliation jobs
//!
//! One handler per category:
//! - Movies: per-item monitor/unmonitor against the selected release date
//! - Series: per-episode (or per-season in season-pack mode) monitoring with
//!   the auto-managed tag kept on the parent series
//!
//! Both follow the same shape: a pure `plan_*` function decides, the
//! reconciler applies the plan through a catalog gateway.

pub mod movies;
pub mod series;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use unmonitarr_arr_client::{CatalogGateway, GatewayResponse, Tag};

use crate::error::{WorkerError, WorkerResult};
use crate::queue::Trigger;

pub use movies::{plan_movies, select_release, MovieReconciler, MovieSettings};
pub use series::{plan_series, SeriesReconciler, SeriesSettings};

/// Tag id used for a tag that would have been created during a dry run
pub const DRY_RUN_TAG_ID: i64 = 999_999;

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileResult {
    /// Items (or episodes) that were evaluated
    pub assessed: usize,
    /// Items switched to unmonitored
    pub unmonitored: usize,
    /// Items switched back to monitored
    pub monitored: usize,
}

impl ReconcileResult {
    /// Total number of changes
    pub fn managed(&self) -> usize {
        self.unmonitored + self.monitored
    }
}

impl fmt::Display for ReconcileResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Assessed {}, Managed {}, Unmonitored {}, Monitored {}",
            self.assessed,
            self.managed(),
            self.unmonitored,
            self.monitored
        )
    }
}

/// Runs one category's reconciliation
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn run(&self, trigger: Trigger) -> WorkerResult<ReconcileResult>;
}

/// Tag lookup in both directions; labels compare case-insensitively
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    by_id: HashMap<i64, String>,
    by_label: HashMap<String, i64>,
}

impl TagIndex {
    pub fn new(tags: impl IntoIterator<Item = Tag>) -> Self {
        let mut index = Self::default();
        for tag in tags {
            index.insert(tag.id, &tag.label);
        }
        index
    }

    pub fn insert(&mut self, id: i64, label: &str) {
        self.by_label.insert(label.to_lowercase(), id);
        self.by_id.insert(id, label.to_string());
    }

    pub fn id_of(&self, label: &str) -> Option<i64> {
        self.by_label.get(&label.to_lowercase()).copied()
    }

    pub fn label_of(&self, id: i64) -> Option<&str> {
        self.by_id.get(&id).map(String::as_str)
    }

    /// Whether any of `tag_ids` resolves to `label`
    pub fn any_labelled(&self, tag_ids: &[i64], label: &str) -> bool {
        let wanted = label.to_lowercase();
        tag_ids
            .iter()
            .filter_map(|id| self.label_of(*id))
            .any(|found| found.to_lowercase() == wanted)
    }
}

/// Resolve a tag id by label, creating the tag if the catalog lacks it
///
/// In dry-run mode nothing is created and [`DRY_RUN_TAG_ID`] stands in.
pub async fn ensure_tag<G>(gateway: &G, index: &mut TagIndex, label: &str) -> WorkerResult<i64>
where
    G: CatalogGateway + ?Sized,
{
    if let Some(id) = index.id_of(label) {
        return Ok(id);
    }

    let response = match gateway.create_tag(label).await {
        Ok(response) => response,
        Err(e) if e.is_timeout() => return Err(e.into()),
        Err(e) => return Err(WorkerError::tag_creation(label, e.to_string())),
    };

    let id = match response {
        GatewayResponse::Suppressed { .. } => DRY_RUN_TAG_ID,
        GatewayResponse::Real { body, .. } => {
            match serde_json::from_value::<Tag>(body) {
                Ok(tag) => tag.id,
                // Some versions answer without the created resource
                Err(_) => {
                    let refreshed = TagIndex::new(gateway.list_tags().await?);
                    refreshed.id_of(label).ok_or_else(|| {
                        WorkerError::tag_creation(label, "tag missing after creation")
                    })?
                }
            }
        }
    };

    tracing::info!(label, id, "Created tag");
    index.insert(id, label);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: i64, label: &str) -> Tag {
        Tag {
            id,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_tag_index_is_case_insensitive() {
        let index = TagIndex::new(vec![tag(1, "Auto-Unmonitored"), tag(2, "ignore")]);
        assert_eq!(index.id_of("auto-unmonitored"), Some(1));
        assert_eq!(index.id_of("IGNORE"), Some(2));
        assert_eq!(index.label_of(1), Some("Auto-Unmonitored"));
        assert_eq!(index.id_of("season-pack"), None);
    }

    #[test]
    fn test_any_labelled() {
        let index = TagIndex::new(vec![tag(1, "auto-unmonitored"), tag(2, "Ignore")]);
        assert!(index.any_labelled(&[5, 2], "ignore"));
        assert!(!index.any_labelled(&[1, 5], "ignore"));
        assert!(!index.any_labelled(&[], "ignore"));
    }

    #[test]
    fn test_result_summary() {
        let result = ReconcileResult {
            assessed: 10,
            unmonitored: 2,
            monitored: 1,
        };
        assert_eq!(result.managed(), 3);
        assert_eq!(
            result.to_string(),
            "Assessed 10, Managed 3, Unmonitored 2, Monitored 1"
        );
    }
}
