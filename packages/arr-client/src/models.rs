//! Radarr / Sonarr v3 API models
//!
//! Only the fields the reconcilers read are modelled. Timestamps are kept as
//! the raw strings the services send and parsed on demand, so one malformed
//! date never fails a whole listing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A catalog tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

/// How a bulk tag edit is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMode {
    Add,
    Remove,
}

/// Radarr movie
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub tags: Vec<i64>,
    pub digital_release: Option<String>,
    pub physical_release: Option<String>,
    pub in_cinemas: Option<String>,
    pub has_file: Option<bool>,
    pub movie_file: Option<serde_json::Value>,
}

impl Movie {
    /// `hasFile` when the service reports it, otherwise whether a file record is attached
    pub fn has_file(&self) -> bool {
        match self.has_file {
            Some(flag) => flag,
            None => self
                .movie_file
                .as_ref()
                .is_some_and(|file| !file.is_null()),
        }
    }

    pub fn digital_release_at(&self) -> Option<DateTime<Utc>> {
        self.digital_release.as_deref().and_then(parse_timestamp)
    }

    pub fn physical_release_at(&self) -> Option<DateTime<Utc>> {
        self.physical_release.as_deref().and_then(parse_timestamp)
    }

    pub fn in_cinemas_at(&self) -> Option<DateTime<Utc>> {
        self.in_cinemas.as_deref().and_then(parse_timestamp)
    }

    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tags.contains(&tag_id)
    }
}

/// Sonarr series
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub seasons: Vec<SeasonInfo>,
}

impl Series {
    pub fn has_tag(&self, tag_id: i64) -> bool {
        self.tags.contains(&tag_id)
    }
}

/// Season summary embedded in a series
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInfo {
    pub season_number: i32,
    #[serde(default)]
    pub monitored: bool,
}

/// Sonarr episode
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: i64,
    #[serde(default)]
    pub series_id: i64,
    #[serde(default)]
    pub season_number: i32,
    pub episode_number: Option<i32>,
    pub title: Option<String>,
    pub air_date_utc: Option<String>,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub has_file: bool,
}

impl Episode {
    /// Air timestamp, `None` when absent or unparsable
    pub fn aired_at(&self) -> Option<DateTime<Utc>> {
        self.air_date_utc.as_deref().and_then(parse_timestamp)
    }
}

/// Parse a service timestamp leniently
///
/// Accepts RFC 3339 (`Z` or offset), naive ISO date-times (taken as UTC) and
/// bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
