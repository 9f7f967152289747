//! End-to-end tests for the queue, worker and movies reconciler
//!
//! Jobs are queued the way the scheduler and webhook routes do it and run by
//! a real worker against a mock Radarr.

mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use unmonitarr::jobs::{MovieReconciler, MovieSettings, SeriesReconciler, SeriesSettings};
use unmonitarr::{Category, CategoryLocks, Job, JobQueue, Scheduler, Trigger, Worker};
use unmonitarr_test_utils::{MockRadarrServer, MockSonarrServer, MovieFixture};

use common::{iso, radarr, sonarr};

async fn wait_for_editor_payloads(server: &MockRadarrServer, count: usize) -> Vec<Value> {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let payloads = server.editor_payloads().await;
            if payloads.len() >= count {
                return payloads;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("worker should apply the plan")
}

#[tokio::test]
async fn test_webhook_job_runs_movies_reconciler() {
    let server = MockRadarrServer::start().await;
    server.mock_tags(&[(1, "auto-unmonitored")]).await;
    server
        .mock_movies(vec![MovieFixture::monitored(10, "Dune: Part Two")
            .with_digital_release(&iso(Utc::now() + ChronoDuration::days(30)))])
        .await;
    server.mock_editor().await;

    let queue = JobQueue::new();
    let worker = Worker::new(queue.clone(), Arc::new(CategoryLocks::new())).with_handler(
        Category::Movies,
        Arc::new(MovieReconciler::new(radarr(&server, false), MovieSettings::default())),
    );
    let handle = tokio::spawn(worker.run());

    queue.enqueue(Job::new(Category::Movies, Trigger::Webhook));

    let payloads = wait_for_editor_payloads(&server, 2).await;
    assert_eq!(
        payloads,
        vec![
            json!({"movieIds": [10], "monitored": false}),
            json!({"movieIds": [10], "tags": [1], "applyTags": "add"}),
        ]
    );
    handle.abort();
}

#[tokio::test]
async fn test_scheduler_feeds_every_enabled_category() {
    let movies = MockRadarrServer::start().await;
    movies.mock_tags(&[(1, "auto-unmonitored")]).await;
    movies
        .mock_movies(vec![MovieFixture::monitored(10, "Dune: Part Two")
            .with_digital_release(&iso(Utc::now() + ChronoDuration::days(30)))])
        .await;
    movies.mock_editor().await;

    let series = MockSonarrServer::start().await;
    series.mock_tags(&[(1, "auto-unmonitored")]).await;
    series.mock_series(vec![]).await;

    let queue = JobQueue::new();
    let worker = Worker::new(queue.clone(), Arc::new(CategoryLocks::new()))
        .with_handler(
            Category::Movies,
            Arc::new(MovieReconciler::new(radarr(&movies, false), MovieSettings::default())),
        )
        .with_handler(
            Category::Series,
            Arc::new(SeriesReconciler::new(sonarr(&series, false), SeriesSettings::default())),
        );
    let scheduler = Scheduler::new(
        queue.clone(),
        vec![Category::Movies, Category::Series],
        Duration::from_secs(3600),
    );

    let worker_handle = tokio::spawn(worker.run());
    let scheduler_handle = tokio::spawn(scheduler.run());

    wait_for_editor_payloads(&movies, 2).await;
    tokio::time::timeout(Duration::from_secs(5), async {
        while series.requests("GET", "/api/v3/series").await.is_empty() {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("series job should run");

    scheduler_handle.abort();
    worker_handle.abort();
}

#[tokio::test]
async fn test_job_for_disabled_category_does_not_block_queue() {
    let server = MockRadarrServer::start().await;
    server.mock_tags(&[(1, "auto-unmonitored")]).await;
    server
        .mock_movies(vec![MovieFixture::monitored(10, "Dune: Part Two")
            .with_digital_release(&iso(Utc::now() + ChronoDuration::days(30)))])
        .await;
    server.mock_editor().await;

    let queue = JobQueue::new();
    let worker = Worker::new(queue.clone(), Arc::new(CategoryLocks::new())).with_handler(
        Category::Movies,
        Arc::new(MovieReconciler::new(radarr(&server, false), MovieSettings::default())),
    );
    let handle = tokio::spawn(worker.run());

    queue.enqueue(Job::new(Category::Series, Trigger::Webhook));
    queue.enqueue(Job::new(Category::Movies, Trigger::Webhook));

    wait_for_editor_payloads(&server, 2).await;
    assert!(queue.is_empty());
    assert!(!handle.is_finished());
    handle.abort();
}
