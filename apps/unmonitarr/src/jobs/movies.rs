//! Movies reconciliation
//!
//! Unmonitors movies whose selected release date (plus the delay window) is
//! still ahead, and re-monitors movies this daemon unmonitored once that
//! threshold has passed. The auto-managed tag records which movies were
//! switched off by us.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use unmonitarr_arr_client::{CatalogGateway, Movie, TagMode};

use crate::config::PreferredRelease;
use crate::error::{WorkerError, WorkerResult};
use crate::jobs::{ensure_tag, JobHandler, ReconcileResult, TagIndex};
use crate::queue::Trigger;
use crate::retry::RetryPolicy;

/// Settings for one movies run
#[derive(Debug, Clone)]
pub struct MovieSettings {
    /// Added to the release date to get the monitoring threshold
    pub delay: Duration,
    pub skip_if_file: bool,
    pub auto_tag: String,
    pub ignore_tag: Option<String>,
    pub preferred_release: PreferredRelease,
    pub ignore_in_cinemas: bool,
    /// Loaded for parity with series; movie decisions do not consult it
    pub remonitor_window: Option<Duration>,
}

impl Default for MovieSettings {
    fn default() -> Self {
        Self {
            delay: Duration::minutes(120),
            skip_if_file: true,
            auto_tag: "auto-unmonitored".to_string(),
            ignore_tag: Some("ignore".to_string()),
            preferred_release: PreferredRelease::Either,
            ignore_in_cinemas: false,
            remonitor_window: Some(Duration::days(30)),
        }
    }
}

/// A change to apply to one movie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MovieAction {
    /// Unmonitor and add the auto-managed tag
    Unmonitor {
        id: i64,
        title: String,
        threshold: DateTime<Utc>,
    },
    /// Monitor and remove the auto-managed tag
    Monitor {
        id: i64,
        title: String,
        threshold: DateTime<Utc>,
    },
}

impl MovieAction {
    pub fn id(&self) -> i64 {
        match self {
            Self::Unmonitor { id, .. } | Self::Monitor { id, .. } => *id,
        }
    }
}

/// Outcome of planning a movies run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoviePlan {
    pub assessed: usize,
    pub actions: Vec<MovieAction>,
}

impl MoviePlan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn result(&self) -> ReconcileResult {
        let unmonitored = self
            .actions
            .iter()
            .filter(|action| matches!(action, MovieAction::Unmonitor { .. }))
            .count();
        ReconcileResult {
            assessed: self.assessed,
            unmonitored,
            monitored: self.actions.len() - unmonitored,
        }
    }
}

/// Pick the release date a movie is judged by
pub fn select_release(
    movie: &Movie,
    preferred: PreferredRelease,
    ignore_in_cinemas: bool,
) -> Option<DateTime<Utc>> {
    let digital = movie.digital_release_at();
    let physical = movie.physical_release_at();
    let cinemas = if ignore_in_cinemas {
        None
    } else {
        movie.in_cinemas_at()
    };

    match preferred {
        PreferredRelease::Digital => digital.or(physical).or(cinemas),
        PreferredRelease::Physical => physical.or(digital).or(cinemas),
        PreferredRelease::Either => match (digital, physical) {
            (Some(d), Some(p)) => Some(d.min(p)),
            (Some(d), None) => Some(d),
            (None, Some(p)) => Some(p),
            (None, None) => cinemas,
        },
    }
}

/// Decide which movies change state at `now`
pub fn plan_movies(
    movies: &[Movie],
    tags: &TagIndex,
    auto_tag_id: i64,
    settings: &MovieSettings,
    now: DateTime<Utc>,
) -> MoviePlan {
    let mut plan = MoviePlan::default();

    for movie in movies {
        if let Some(ignore) = settings.ignore_tag.as_deref() {
            if tags.any_labelled(&movie.tags, ignore) {
                continue;
            }
        }
        if settings.skip_if_file && movie.has_file() {
            continue;
        }

        let Some(release) =
            select_release(movie, settings.preferred_release, settings.ignore_in_cinemas)
        else {
            tracing::debug!(title = %movie.title, "No usable release date");
            continue;
        };

        plan.assessed += 1;
        let threshold = release + settings.delay;

        if movie.monitored && now < threshold {
            plan.actions.push(MovieAction::Unmonitor {
                id: movie.id,
                title: movie.title.clone(),
                threshold,
            });
        } else if !movie.monitored && movie.has_tag(auto_tag_id) && now >= threshold {
            plan.actions.push(MovieAction::Monitor {
                id: movie.id,
                title: movie.title.clone(),
                threshold,
            });
        }
    }

    plan
}

/// Movies job handler
pub struct MovieReconciler<G> {
    gateway: G,
    settings: MovieSettings,
    retry: RetryPolicy,
}

impl<G> MovieReconciler<G>
where
    G: CatalogGateway<Item = Movie>,
{
    pub fn new(gateway: G, settings: MovieSettings) -> Self {
        Self {
            gateway,
            settings,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run one reconciliation pass as of `now`, without retries
    pub async fn reconcile_at(&self, now: DateTime<Utc>) -> WorkerResult<ReconcileResult> {
        let dry = if self.gateway.is_dry_run() { "[DRY] " } else { "" };
        tracing::info!("Radarr reconciliation starting");

        let mut tags = TagIndex::new(self.gateway.list_tags().await?);
        let auto_tag_id = ensure_tag(&self.gateway, &mut tags, &self.settings.auto_tag).await?;

        let movies = self.gateway.list_items().await?;
        let plan = plan_movies(&movies, &tags, auto_tag_id, &self.settings, now);

        for action in &plan.actions {
            match action {
                MovieAction::Unmonitor {
                    id,
                    title,
                    threshold,
                } => {
                    tracing::info!("{dry}UNMONITOR: {title} until {}", threshold.to_rfc3339());
                    self.gateway.set_monitored(&[*id], false).await?;
                    self.gateway
                        .apply_tag(&[*id], auto_tag_id, TagMode::Add)
                        .await?;
                }
                MovieAction::Monitor {
                    id,
                    title,
                    threshold,
                } => {
                    tracing::info!("{dry}MONITOR: {title} (past {})", threshold.to_rfc3339());
                    self.gateway.set_monitored(&[*id], true).await?;
                    self.gateway
                        .apply_tag(&[*id], auto_tag_id, TagMode::Remove)
                        .await?;
                }
            }
        }

        let result = plan.result();
        tracing::info!(
            assessed = result.assessed,
            managed = result.managed(),
            unmonitored = result.unmonitored,
            monitored = result.monitored,
            "SUMMARY: {result}"
        );
        Ok(result)
    }
}

#[async_trait]
impl<G> JobHandler for MovieReconciler<G>
where
    G: CatalogGateway<Item = Movie> + 'static,
{
    async fn run(&self, trigger: Trigger) -> WorkerResult<ReconcileResult> {
        tracing::debug!(%trigger, "Movies job started");
        // Only request timeouts are worth another attempt here
        self.retry
            .run("radarr", WorkerError::is_timeout, move || {
                self.reconcile_at(Utc::now())
            })
            .await
    }
}
