//! Series reconciliation
//!
//! Tracks every monitored season of every monitored series. Episodes are
//! judged one by one against their air date, or, for series opted into
//! season-pack mode, a whole season follows its first aired episode.
//!
//! The auto-managed tag lives on the parent series. It is added when an
//! episode is unmonitored and removed by a sweep once no episode of the
//! series is left waiting for a re-monitor.

use std::collections::{BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use unmonitarr_arr_client::{ArrError, Episode, SeriesGateway, Series, TagMode};

use crate::error::{WorkerError, WorkerResult};
use crate::jobs::{ensure_tag, JobHandler, ReconcileResult, TagIndex};
use crate::queue::Trigger;
use crate::retry::RetryPolicy;

/// Settings for one series run
#[derive(Debug, Clone)]
pub struct SeriesSettings {
    /// Added to the air date to get the monitoring threshold
    pub delay: Duration,
    pub skip_if_file: bool,
    pub auto_tag: String,
    pub ignore_tag: Option<String>,
    /// Label of the season-pack opt-in tag; `None` when season-pack mode is off
    pub season_pack_tag: Option<String>,
    /// How long after airing an episode may still be re-monitored; `None` is unlimited
    pub remonitor_window: Option<Duration>,
}

impl Default for SeriesSettings {
    fn default() -> Self {
        Self {
            delay: Duration::minutes(120),
            skip_if_file: true,
            auto_tag: "auto-unmonitored".to_string(),
            ignore_tag: Some("ignore".to_string()),
            season_pack_tag: None,
            remonitor_window: Some(Duration::days(14)),
        }
    }
}

/// Resolved ids of the tags a run works with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesTags {
    pub auto: i64,
    pub season_pack: Option<i64>,
}

/// Episodes of one tracked season
#[derive(Debug, Clone)]
pub struct SeasonEpisodes {
    pub series_id: i64,
    pub season_number: i32,
    pub episodes: Vec<Episode>,
}

/// Why an episode changes state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// Monitored but without an air date
    NoAirDate,
    /// Monitored before its threshold
    Upcoming,
    /// Past its threshold and previously unmonitored by us
    Aired,
    /// Re-monitored together with its season
    SeasonPack,
}

/// A monitored-flag change for one episode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeChange {
    pub episode_id: i64,
    pub series_id: i64,
    /// `Series – S01E02 – Title`
    pub label: String,
    pub reason: ChangeReason,
}

/// Outcome of planning a series run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeriesPlan {
    pub assessed: usize,
    pub unmonitor: Vec<EpisodeChange>,
    pub monitor: Vec<EpisodeChange>,
    /// Series that need the auto-managed tag added
    pub tag_series: BTreeSet<i64>,
    /// Series whose auto-managed tag can be removed
    pub untag_series: BTreeSet<i64>,
    /// Re-monitor candidates that keep the tag for now
    pub keep_tag_series: BTreeSet<i64>,
}

impl SeriesPlan {
    pub fn is_empty(&self) -> bool {
        self.unmonitor.is_empty()
            && self.monitor.is_empty()
            && self.tag_series.is_empty()
            && self.untag_series.is_empty()
    }

    pub fn result(&self) -> ReconcileResult {
        ReconcileResult {
            assessed: self.assessed,
            unmonitored: self.unmonitor.len(),
            monitored: self.monitor.len(),
        }
    }
}

enum AirDate {
    Missing,
    Invalid,
    At(DateTime<Utc>),
}

fn air_date(episode: &Episode) -> AirDate {
    match episode.air_date_utc.as_deref().map(str::trim) {
        None | Some("") => AirDate::Missing,
        Some(_) => episode.aired_at().map_or(AirDate::Invalid, AirDate::At),
    }
}

/// Format an episode as `Series – S01E02 – Title`
///
/// The season number comes from the tracking unit, not the episode payload.
pub fn episode_label(series_title: &str, season_number: i32, episode: &Episode) -> String {
    let series_title = if series_title.is_empty() {
        "Unknown Series"
    } else {
        series_title
    };
    let number = episode
        .episode_number
        .map_or_else(|| "??".to_string(), |n| format!("{n:02}"));
    let title = episode.title.as_deref().unwrap_or("Unknown Title");
    format!("{series_title} – S{season_number:02}E{number} – {title}")
}

/// Every monitored season of every monitored, non-ignored series
pub fn tracking_units(
    series: &[Series],
    tags: &TagIndex,
    settings: &SeriesSettings,
) -> Vec<(i64, i32)> {
    series
        .iter()
        .filter(|s| s.monitored)
        .filter(|s| match settings.ignore_tag.as_deref() {
            Some(ignore) => !tags.any_labelled(&s.tags, ignore),
            None => true,
        })
        .flat_map(|s| {
            s.seasons
                .iter()
                .filter(|season| season.monitored)
                .map(move |season| (s.id, season.season_number))
        })
        .collect()
}

/// Plan state for one run, shared by the per-season passes
struct Planner<'a> {
    settings: &'a SeriesSettings,
    tags: SeriesTags,
    now: DateTime<Utc>,
    plan: SeriesPlan,
    candidates: BTreeSet<i64>,
}

impl Planner<'_> {
    fn within_window(&self, aired: DateTime<Utc>) -> bool {
        self.settings
            .remonitor_window
            .map_or(true, |window| self.now - aired <= window)
    }

    fn unmonitor(
        &mut self,
        series: &Series,
        season_number: i32,
        episode: &Episode,
        reason: ChangeReason,
    ) {
        self.plan.unmonitor.push(EpisodeChange {
            episode_id: episode.id,
            series_id: series.id,
            label: episode_label(&series.title, season_number, episode),
            reason,
        });
        if !series.has_tag(self.tags.auto) {
            self.plan.tag_series.insert(series.id);
        }
    }

    fn monitor(
        &mut self,
        series: &Series,
        season_number: i32,
        episode: &Episode,
        reason: ChangeReason,
    ) {
        self.plan.monitor.push(EpisodeChange {
            episode_id: episode.id,
            series_id: series.id,
            label: episode_label(&series.title, season_number, episode),
            reason,
        });
    }

    fn standard(&mut self, series: &Series, season_number: i32, episodes: &[Episode]) {
        let has_auto = series.has_tag(self.tags.auto);

        for episode in episodes {
            self.plan.assessed += 1;

            let aired = match air_date(episode) {
                AirDate::Missing => {
                    if episode.monitored {
                        self.unmonitor(series, season_number, episode, ChangeReason::NoAirDate);
                    }
                    continue;
                }
                AirDate::Invalid => continue,
                AirDate::At(aired) => aired,
            };

            if self.settings.skip_if_file && episode.has_file {
                continue;
            }

            let threshold = aired + self.settings.delay;
            if episode.monitored && self.now < threshold {
                self.unmonitor(series, season_number, episode, ChangeReason::Upcoming);
            } else if !episode.monitored
                && self.now >= threshold
                && has_auto
                && self.within_window(aired)
            {
                self.monitor(series, season_number, episode, ChangeReason::Aired);
                self.candidates.insert(series.id);
            }
        }
    }

    fn season_pack(&mut self, series: &Series, season_number: i32, episodes: &[Episode]) {
        let mut ordered: Vec<&Episode> = episodes.iter().collect();
        ordered.sort_by_key(|e| e.episode_number.unwrap_or(999));
        let trigger_aired = ordered.iter().find_map(|e| match air_date(e) {
            AirDate::At(aired) => Some(aired),
            _ => None,
        });

        match trigger_aired {
            Some(aired) if self.now >= aired + self.settings.delay => {
                if !series.has_tag(self.tags.auto) || !self.within_window(aired) {
                    return;
                }

                let mut added = 0;
                for episode in episodes {
                    self.plan.assessed += 1;
                    if !matches!(air_date(episode), AirDate::At(_)) {
                        continue;
                    }
                    if self.settings.skip_if_file && episode.has_file {
                        continue;
                    }
                    if !episode.monitored {
                        self.monitor(series, season_number, episode, ChangeReason::SeasonPack);
                        added += 1;
                    }
                }

                if added > 0 {
                    tracing::info!(
                        series = %series.title,
                        season = season_number,
                        episodes = added,
                        "Season pack re-monitored"
                    );
                    self.candidates.insert(series.id);
                }
            }
            // Before the trigger, or no dated episode yet
            _ => {
                for episode in episodes {
                    self.plan.assessed += 1;
                    if !episode.monitored {
                        continue;
                    }
                    match air_date(episode) {
                        AirDate::Missing => {
                            self.unmonitor(series, season_number, episode, ChangeReason::NoAirDate)
                        }
                        AirDate::At(aired) if aired > self.now => {
                            self.unmonitor(series, season_number, episode, ChangeReason::Upcoming)
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Decide which re-monitor candidates can drop the auto-managed tag
    fn sweep(&mut self, seasons: &[SeasonEpisodes]) {
        let monitored_now: HashSet<i64> = self.plan.monitor.iter().map(|c| c.episode_id).collect();
        let unmonitored_now: HashSet<i64> =
            self.plan.unmonitor.iter().map(|c| c.episode_id).collect();
        let touched_down: HashSet<i64> = self.plan.unmonitor.iter().map(|c| c.series_id).collect();

        for series_id in std::mem::take(&mut self.candidates) {
            let pending = seasons
                .iter()
                .filter(|season| season.series_id == series_id)
                .flat_map(|season| &season.episodes)
                .any(|episode| {
                    let monitored = (episode.monitored && !unmonitored_now.contains(&episode.id))
                        || monitored_now.contains(&episode.id);
                    if monitored || (self.settings.skip_if_file && episode.has_file) {
                        return false;
                    }
                    let AirDate::At(aired) = air_date(episode) else {
                        return false;
                    };
                    aired > self.now
                        || self.now < aired + self.settings.delay
                        || self.within_window(aired)
                });

            if pending || touched_down.contains(&series_id) {
                self.plan.keep_tag_series.insert(series_id);
            } else {
                self.plan.untag_series.insert(series_id);
            }
        }
    }
}

/// Decide which episodes change state at `now`
///
/// `seasons` holds the episodes of every tracking unit; series not present
/// in `series` are ignored.
pub fn plan_series(
    series: &[Series],
    seasons: &[SeasonEpisodes],
    tags: SeriesTags,
    settings: &SeriesSettings,
    now: DateTime<Utc>,
) -> SeriesPlan {
    let by_id: HashMap<i64, &Series> = series.iter().map(|s| (s.id, s)).collect();
    let mut planner = Planner {
        settings,
        tags,
        now,
        plan: SeriesPlan::default(),
        candidates: BTreeSet::new(),
    };

    for season in seasons {
        let Some(series) = by_id.get(&season.series_id) else {
            continue;
        };
        let season_pack = tags
            .season_pack
            .is_some_and(|tag_id| settings.season_pack_tag.is_some() && series.has_tag(tag_id));

        if season_pack {
            planner.season_pack(series, season.season_number, &season.episodes);
        } else {
            planner.standard(series, season.season_number, &season.episodes);
        }
    }

    planner.sweep(seasons);
    planner.plan
}

/// Series job handler
pub struct SeriesReconciler<G> {
    gateway: G,
    settings: SeriesSettings,
    retry: RetryPolicy,
}

impl<G> SeriesReconciler<G>
where
    G: SeriesGateway,
{
    pub fn new(gateway: G, settings: SeriesSettings) -> Self {
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
        tracing::info!("Sonarr reconciliation starting");

        let mut index = TagIndex::new(self.gateway.list_tags().await?);
        let auto = ensure_tag(&self.gateway, &mut index, &self.settings.auto_tag).await?;
        let season_pack = match self.settings.season_pack_tag.as_deref() {
            Some(label) => Some(ensure_tag(&self.gateway, &mut index, label).await?),
            None => None,
        };
        let tags = SeriesTags { auto, season_pack };

        let series = self.gateway.list_items().await?;
        let mut seasons = Vec::new();
        for (series_id, season_number) in tracking_units(&series, &index, &self.settings) {
            let episodes = self.gateway.list_episodes(series_id, season_number).await?;
            seasons.push(SeasonEpisodes {
                series_id,
                season_number,
                episodes,
            });
        }

        let plan = plan_series(&series, &seasons, tags, &self.settings, now);
        let titles: HashMap<i64, &str> = series.iter().map(|s| (s.id, s.title.as_str())).collect();
        let title_of = |id: i64| titles.get(&id).copied().unwrap_or("Unknown Series");

        for change in &plan.unmonitor {
            match change.reason {
                ChangeReason::NoAirDate => {
                    tracing::info!("{dry}UNMONITOR (no air date): {}", change.label)
                }
                _ => tracing::info!("{dry}UNMONITOR: {}", change.label),
            }
        }
        for change in &plan.monitor {
            match change.reason {
                ChangeReason::SeasonPack => {
                    tracing::info!("{dry}MONITOR (season pack): {}", change.label)
                }
                _ => tracing::info!("{dry}MONITOR: {}", change.label),
            }
        }

        for series_id in &plan.tag_series {
            tracing::info!(series = title_of(*series_id), "{dry}Adding auto-tag to series");
            self.edit_series_tags(*series_id, auto, TagMode::Add).await?;
        }

        if !plan.unmonitor.is_empty() {
            let ids: Vec<i64> = plan.unmonitor.iter().map(|c| c.episode_id).collect();
            self.gateway.set_episodes_monitored(&ids, false).await?;
        }
        if !plan.monitor.is_empty() {
            let ids: Vec<i64> = plan.monitor.iter().map(|c| c.episode_id).collect();
            self.gateway.set_episodes_monitored(&ids, true).await?;
        }

        for series_id in &plan.keep_tag_series {
            tracing::info!(
                series = title_of(*series_id),
                "Keeping auto-tag on series (episodes still need re-monitoring)"
            );
        }
        for series_id in &plan.untag_series {
            tracing::info!(series = title_of(*series_id), "{dry}Removing auto-tag from series");
            self.edit_series_tags(*series_id, auto, TagMode::Remove).await?;
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

    /// Read the series, edit its tag list and write it back if it changed
    async fn edit_series_tags(&self, series_id: i64, tag_id: i64, mode: TagMode) -> WorkerResult<bool> {
        let mut resource = self.gateway.get_item(series_id).await?;
        let Some(fields) = resource.as_object_mut() else {
            return Err(ArrError::InvalidResponse(format!("series {series_id} is not an object")).into());
        };

        let mut tags: Vec<i64> = fields
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();

        let changed = match mode {
            TagMode::Add if !tags.contains(&tag_id) => {
                tags.push(tag_id);
                true
            }
            TagMode::Remove if tags.contains(&tag_id) => {
                tags.retain(|tag| *tag != tag_id);
                true
            }
            _ => false,
        };
        if !changed {
            return Ok(false);
        }

        fields.insert("tags".to_string(), json!(tags));
        self.gateway.update_item(series_id, &resource).await?;
        Ok(true)
    }
}

#[async_trait]
impl<G> JobHandler for SeriesReconciler<G>
where
    G: SeriesGateway + 'static,
{
    async fn run(&self, trigger: Trigger) -> WorkerResult<ReconcileResult> {
        tracing::debug!(%trigger, "Series job started");
        self.retry
            .run("sonarr", |_: &WorkerError| true, move || {
                self.reconcile_at(Utc::now())
            })
            .await
    }
}
