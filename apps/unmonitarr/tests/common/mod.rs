//! Common test utilities for daemon integration tests

#![allow(dead_code)]

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use unmonitarr::RetryPolicy;
use unmonitarr_arr_client::{RadarrClient, SonarrClient};
use unmonitarr_shared_config::ArrConfig;
use unmonitarr_test_utils::{MockRadarrServer, MockSonarrServer};

/// Fixed reference instant for time-based scenarios
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// Format a timestamp the way the services send it
pub fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Retry policy that keeps tests fast
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_millis(10))
}

pub fn radarr(server: &MockRadarrServer, dry_run: bool) -> RadarrClient {
    let config = ArrConfig::new(server.url(), server.api_key());
    RadarrClient::new(&config, dry_run).unwrap()
}

pub fn sonarr(server: &MockSonarrServer, dry_run: bool) -> SonarrClient {
    let config = ArrConfig::new(server.url(), server.api_key());
    SonarrClient::new(&config, dry_run).unwrap()
}
