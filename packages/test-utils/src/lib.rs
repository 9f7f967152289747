//! Shared test utilities for Unmonitarr workspace
//!
//! This crate provides mock implementations of the Radarr and Sonarr APIs for
//! testing the catalog gateway and reconcilers without network dependencies.
//!
//! # Mock Services
//!
//! - [`MockRadarrServer`] - Mock Radarr server (movies, tags, movie editor)
//! - [`MockSonarrServer`] - Mock Sonarr server (series, episodes, tags)
//!
//! # Example
//!
//! ```rust,ignore
//! use unmonitarr_test_utils::{MockRadarrServer, MovieFixture};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let radarr = MockRadarrServer::start().await;
//!     radarr.mock_movies(vec![MovieFixture::monitored(1, "Dune")]).await;
//!
//!     // Use radarr.url() and radarr.api_key() to configure your client
//! }
//! ```

mod arr;
mod radarr;
mod sonarr;

pub use arr::{MockArrServer, RecordedRequest};
pub use radarr::{MockRadarrServer, MovieFixture};
pub use sonarr::{EpisodeFixture, MockSonarrServer, SeriesFixture};
