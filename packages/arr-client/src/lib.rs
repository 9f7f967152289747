//! Catalog gateway for Unmonitarr
//!
//! This crate talks to the Radarr (movies) and Sonarr (series) v3 APIs on
//! behalf of the reconcilers:
//! - listing catalog items, episodes and tags
//! - bulk monitored/tag edits and tag creation
//! - dry-run interception of every mutating call
//!
//! # Example
//!
//! ```rust,no_run
//! use unmonitarr_arr_client::{CatalogGateway, RadarrClient};
//! use unmonitarr_shared_config::ArrConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ArrConfig::new("http://radarr:7878", "your_api_key");
//! let radarr = RadarrClient::new(&config, true)?;
//!
//! for movie in radarr.list_items().await? {
//!     println!("{} (monitored: {})", movie.title, movie.monitored);
//! }
//!
//! // Logged only, nothing is sent while dry-run is on
//! radarr.set_monitored(&[42], false).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod gateway;
mod models;
mod radarr;
mod sonarr;

pub use client::{ArrClient, GatewayResponse, Service};
pub use error::{ArrError, ArrResult};
pub use gateway::{CatalogGateway, SeriesGateway};
pub use models::{parse_timestamp, Episode, Movie, SeasonInfo, Series, Tag, TagMode};
pub use radarr::RadarrClient;
pub use sonarr::SonarrClient;

pub use reqwest::Method;
