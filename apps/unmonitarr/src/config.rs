//! Daemon configuration loaded from environment variables
//!
//! Configuration is read once at startup. Every setting has a default so an
//! empty environment yields a runnable (dry-run) daemon with both categories
//! disabled for lack of credentials.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use unmonitarr_shared_config::{
    get_env_or_default, parse_bool_env, parse_env, ArrConfig, CommonConfig,
};

use crate::jobs::{MovieSettings, SeriesSettings};
use crate::queue::Category;

/// Which release date a movie is judged by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreferredRelease {
    /// Digital, then physical
    Digital,
    /// Physical, then digital
    Physical,
    /// Earliest of digital and physical
    #[default]
    Either,
}

impl FromStr for PreferredRelease {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "digital" => Ok(Self::Digital),
            "physical" => Ok(Self::Physical),
            "either" => Ok(Self::Either),
            other => Err(format!("unknown release preference: {other}")),
        }
    }
}

impl fmt::Display for PreferredRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digital => f.write_str("digital"),
            Self::Physical => f.write_str("physical"),
            Self::Either => f.write_str("either"),
        }
    }
}

/// Movies (Radarr) settings
#[derive(Debug, Clone)]
pub struct MoviesConfig {
    /// `ENABLE_RADARR`
    pub enabled: bool,
    /// Connection settings; `None` when URL or API key is unset
    pub arr: Option<ArrConfig>,
    pub preferred_release: PreferredRelease,
    pub ignore_in_cinemas: bool,
    /// 0 means unlimited
    pub remonitor_window_days: u32,
}

/// Series (Sonarr) settings
#[derive(Debug, Clone)]
pub struct SeriesConfig {
    /// `ENABLE_SONARR`
    pub enabled: bool,
    /// Connection settings; `None` when URL or API key is unset
    pub arr: Option<ArrConfig>,
    pub season_pack_mode: bool,
    pub season_pack_tag: String,
    /// 0 means unlimited
    pub remonitor_window_days: u32,
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Common configuration shared with the catalog clients
    pub common: CommonConfig,

    /// Scheduler interval in minutes
    pub sleep_minutes: u32,

    /// Delay added to every release/air date, in minutes
    pub delay_minutes: u32,

    /// Leave items that already have a file alone
    pub skip_if_file: bool,

    /// Label of the tag marking items this daemon unmonitored
    pub auto_tag_name: String,

    /// Label of the tag excluding items from reconciliation; empty disables
    pub ignore_tag_name: String,

    /// Port the webhook server listens on
    pub webhook_port: u16,

    pub movies: MoviesConfig,

    pub series: SeriesConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let common = CommonConfig::from_env().context("Failed to load common config")?;

        let preferred_release = {
            let raw = get_env_or_default("PREFERRED_RELEASE", "either");
            raw.parse().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Invalid PREFERRED_RELEASE, using 'either'");
                PreferredRelease::Either
            })
        };

        Ok(Self {
            common,
            sleep_minutes: parse_env("SLEEP_MINUTES", 30).context("Invalid SLEEP_MINUTES value")?,
            delay_minutes: parse_env("DELAY_MINUTES", 120)
                .context("Invalid DELAY_MINUTES value")?,
            skip_if_file: parse_bool_env("SKIP_IF_FILE", true),
            auto_tag_name: get_env_or_default("AUTO_TAG_NAME", "auto-unmonitored")
                .trim()
                .to_string(),
            ignore_tag_name: get_env_or_default("IGNORE_TAG_NAME", "ignore")
                .trim()
                .to_string(),
            webhook_port: parse_env("WEBHOOK_PORT", 5099).context("Invalid WEBHOOK_PORT value")?,
            movies: MoviesConfig {
                enabled: parse_bool_env("ENABLE_RADARR", true),
                arr: load_arr("RADARR")?,
                preferred_release,
                ignore_in_cinemas: parse_bool_env("IGNORE_INCINEMAS", false),
                remonitor_window_days: parse_env("RADARR_REMONITOR_WINDOW_DAYS", 30)
                    .context("Invalid RADARR_REMONITOR_WINDOW_DAYS value")?,
            },
            series: SeriesConfig {
                enabled: parse_bool_env("ENABLE_SONARR", true),
                arr: load_arr("SONARR")?,
                season_pack_mode: parse_bool_env("SEASON_PACK_MODE", false),
                season_pack_tag: get_env_or_default("SEASON_PACK_MODE_TAG", "season-pack")
                    .trim()
                    .to_string(),
                remonitor_window_days: parse_env("SONARR_REMONITOR_WINDOW_DAYS", 14)
                    .context("Invalid SONARR_REMONITOR_WINDOW_DAYS value")?,
            },
        })
    }

    pub fn dry_run(&self) -> bool {
        self.common.dry_run
    }

    pub fn scheduler_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.sleep_minutes.max(1)) * 60)
    }

    /// Connection settings of an enabled category
    ///
    /// `None` if the category is switched off or has no credentials. A
    /// category that is switched on without credentials is logged as a
    /// warning.
    pub fn arr_for(&self, category: Category) -> Option<&ArrConfig> {
        let (enabled, arr, prefix) = match category {
            Category::Movies => (self.movies.enabled, self.movies.arr.as_ref(), "RADARR"),
            Category::Series => (self.series.enabled, self.series.arr.as_ref(), "SONARR"),
        };

        if !enabled {
            return None;
        }
        if arr.is_none() {
            tracing::warn!(
                category = %category,
                "ENABLE_{prefix} is on but {prefix}_URL or {prefix}_API_KEY is unset; category disabled"
            );
        }
        arr
    }

    /// Categories the scheduler should enqueue
    pub fn enabled_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|category| self.arr_for(*category).is_some())
            .collect()
    }

    pub fn movie_settings(&self) -> MovieSettings {
        MovieSettings {
            delay: chrono::Duration::minutes(i64::from(self.delay_minutes)),
            skip_if_file: self.skip_if_file,
            auto_tag: self.auto_tag_name.clone(),
            ignore_tag: self.ignore_tag(),
            preferred_release: self.movies.preferred_release,
            ignore_in_cinemas: self.movies.ignore_in_cinemas,
            remonitor_window: window(self.movies.remonitor_window_days),
        }
    }

    pub fn series_settings(&self) -> SeriesSettings {
        SeriesSettings {
            delay: chrono::Duration::minutes(i64::from(self.delay_minutes)),
            skip_if_file: self.skip_if_file,
            auto_tag: self.auto_tag_name.clone(),
            ignore_tag: self.ignore_tag(),
            season_pack_tag: self
                .series
                .season_pack_mode
                .then(|| self.series.season_pack_tag.clone())
                .filter(|label| !label.is_empty()),
            remonitor_window: window(self.series.remonitor_window_days),
        }
    }

    fn ignore_tag(&self) -> Option<String> {
        Some(self.ignore_tag_name.clone()).filter(|label| !label.is_empty())
    }
}

fn window(days: u32) -> Option<chrono::Duration> {
    (days > 0).then(|| chrono::Duration::days(i64::from(days)))
}

/// Read `{PREFIX}_URL` / `{PREFIX}_API_KEY`; absent or blank credentials
/// leave the service unconfigured, anything else malformed is an error.
fn load_arr(prefix: &str) -> Result<Option<ArrConfig>> {
    let is_set = |name: String| env::var(name).is_ok_and(|value| !value.trim().is_empty());
    if !is_set(format!("{prefix}_URL")) || !is_set(format!("{prefix}_API_KEY")) {
        return Ok(None);
    }

    let config = ArrConfig::from_env(prefix)
        .with_context(|| format!("Invalid {prefix} connection settings"))?;
    Ok(Some(config))
}
