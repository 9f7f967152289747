//! Integration tests for the Radarr / Sonarr gateways against mock servers

use std::time::Duration;

use assert_matches::assert_matches;
use serde_json::json;
use unmonitarr_arr_client::{
    ArrError, CatalogGateway, GatewayResponse, Method, RadarrClient, SeriesGateway, SonarrClient,
    TagMode,
};
use unmonitarr_shared_config::ArrConfig;
use unmonitarr_test_utils::{EpisodeFixture, MockRadarrServer, MockSonarrServer, MovieFixture, SeriesFixture};

fn radarr(server: &MockRadarrServer, dry_run: bool) -> RadarrClient {
    let config = ArrConfig::new(server.url(), server.api_key());
    RadarrClient::new(&config, dry_run).unwrap()
}

fn sonarr(server: &MockSonarrServer, dry_run: bool) -> SonarrClient {
    let config = ArrConfig::new(server.url(), server.api_key());
    SonarrClient::new(&config, dry_run).unwrap()
}

#[tokio::test]
async fn test_list_movies_and_tags() {
    let server = MockRadarrServer::start().await;
    server
        .mock_movies(vec![
            MovieFixture::monitored(1, "Dune").with_digital_release("2024-04-16T00:00:00Z"),
            MovieFixture::unmonitored(2, "Arrival").with_tags(&[5]),
        ])
        .await;
    server.mock_tags(&[(5, "auto-unmonitored")]).await;

    let client = radarr(&server, false);
    let movies = client.list_items().await.unwrap();
    let tags = client.list_tags().await.unwrap();

    assert_eq!(movies.len(), 2);
    assert!(movies[0].digital_release_at().is_some());
    assert!(movies[1].has_tag(5));
    assert_eq!(tags[0].label, "auto-unmonitored");
}

#[tokio::test]
async fn test_set_monitored_payload() {
    let server = MockRadarrServer::start().await;
    server.mock_editor().await;

    let client = radarr(&server, false);
    let response = client.set_monitored(&[1, 2], false).await.unwrap();

    assert_matches!(response, GatewayResponse::Real { status: 202, .. });
    assert_eq!(
        server.editor_payloads().await,
        vec![json!({"movieIds": [1, 2], "monitored": false})]
    );
}

#[tokio::test]
async fn test_apply_tag_payload() {
    let server = MockRadarrServer::start().await;
    server.mock_editor().await;

    let client = radarr(&server, false);
    client.apply_tag(&[9], 5, TagMode::Remove).await.unwrap();

    assert_eq!(
        server.editor_payloads().await,
        vec![json!({"movieIds": [9], "tags": [5], "applyTags": "remove"})]
    );
}

#[tokio::test]
async fn test_create_tag_returns_body() {
    let server = MockRadarrServer::start().await;
    server.mock_create_tag(12, "auto-unmonitored").await;

    let client = radarr(&server, false);
    let response = client.create_tag("auto-unmonitored").await.unwrap();

    assert_eq!(
        response.body(),
        Some(&json!({"id": 12, "label": "auto-unmonitored"}))
    );
}

#[tokio::test]
async fn test_dry_run_suppresses_mutations_but_not_reads() {
    let server = MockRadarrServer::start().await;
    server.mock_movies(vec![MovieFixture::monitored(1, "Dune")]).await;
    server.mock_editor().await;

    let client = radarr(&server, true);
    assert!(client.is_dry_run());

    let movies = client.list_items().await.unwrap();
    assert_eq!(movies.len(), 1);

    let response = client.set_monitored(&[1], false).await.unwrap();
    assert_matches!(
        response,
        GatewayResponse::Suppressed { ref method, ref path, .. } if *method == Method::PUT && path == "movie/editor"
    );

    let created = client.create_tag("auto-unmonitored").await.unwrap();
    assert!(created.is_suppressed());

    assert!(server.mutations().await.is_empty());
    assert_eq!(server.requests("GET", "/api/v3/movie").await.len(), 1);
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockRadarrServer::start().await;
    server.mock_server_error("database is locked").await;

    let client = radarr(&server, false);
    let err = client.list_items().await.unwrap_err();

    assert_matches!(err, ArrError::Api { status: 500, .. });
    assert!(err.is_retryable());
    assert!(!err.is_timeout());
}

#[tokio::test]
async fn test_wrong_api_key_is_not_retryable() {
    let server = MockRadarrServer::start().await;
    server.mock_movies(vec![]).await;

    let config = ArrConfig::new(server.url(), "wrong-key");
    let client = RadarrClient::new(&config, false).unwrap();
    let err = client.list_items().await.unwrap_err();

    assert_matches!(err, ArrError::Api { status: 404, .. });
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockRadarrServer::start().await;
    server
        .mock_slow_get("/api/v3/movie", Duration::from_secs(3))
        .await;

    let mut config = ArrConfig::new(server.url(), server.api_key());
    config.timeout_secs = 1;
    let client = RadarrClient::new(&config, false).unwrap();

    let err = client.list_items().await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {err:?}");
}

#[tokio::test]
async fn test_sonarr_episodes_and_batch_monitor() {
    let server = MockSonarrServer::start().await;
    server
        .mock_series(vec![SeriesFixture::monitored(7, "Severance")])
        .await;
    server
        .mock_episodes(
            7,
            1,
            vec![
                EpisodeFixture::new(70, 7, 1, 1).airing("2022-02-18T05:00:00Z"),
                EpisodeFixture::new(71, 7, 1, 2),
            ],
        )
        .await;
    server.mock_mutations().await;

    let client = sonarr(&server, false);
    let series = client.list_items().await.unwrap();
    let episodes = client.list_episodes(7, 1).await.unwrap();
    client.set_episodes_monitored(&[70, 71], true).await.unwrap();

    assert_eq!(series[0].title, "Severance");
    assert_eq!(episodes.len(), 2);
    assert!(episodes[1].aired_at().is_none());
    assert_eq!(
        server.episode_monitor_payloads().await,
        vec![json!({"episodeIds": [70, 71], "monitored": true})]
    );
}

#[tokio::test]
async fn test_sonarr_read_modify_write_series() {
    let server = MockSonarrServer::start().await;
    server
        .mock_series(vec![SeriesFixture::monitored(7, "Severance").with_tags(&[1])])
        .await;
    server.mock_mutations().await;

    let client = sonarr(&server, false);
    let mut resource = client.get_item(7).await.unwrap();
    resource["tags"] = json!([1, 4]);
    client.update_item(7, &resource).await.unwrap();

    let updates = server.series_updates(7).await;
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["tags"], json!([1, 4]));
    assert_eq!(updates[0]["title"], "Severance");
}

#[tokio::test]
async fn test_sonarr_editor_payloads() {
    let server = MockSonarrServer::start().await;
    server.mock_mutations().await;

    let client = sonarr(&server, false);
    client.set_monitored(&[7], true).await.unwrap();
    client.apply_tag(&[7], 4, TagMode::Add).await.unwrap();

    let bodies: Vec<_> = server
        .requests("PUT", "/api/v3/series/editor")
        .await
        .into_iter()
        .map(|req| req.body)
        .collect();
    assert_eq!(
        bodies,
        vec![
            json!({"seriesIds": [7], "monitored": true}),
            json!({"seriesIds": [7], "tags": [4], "applyTags": "add"}),
        ]
    );
}
