use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unmonitarr::jobs::{MovieReconciler, SeriesReconciler};
use unmonitarr::{routes, Category, CategoryLocks, Config, JobHandler, JobQueue, Scheduler, Worker};
use unmonitarr_arr_client::{RadarrClient, SonarrClient};
use unmonitarr_shared_config::get_env_or_default;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing; RUST_LOG wins over LOG_LEVEL
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                get_env_or_default("LOG_LEVEL", "info").to_lowercase().into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Initialising Unmonitarr");

    let config = Arc::new(Config::from_env()?);
    let enabled = config.enabled_categories();
    tracing::info!(
        enabled = ?enabled.iter().map(Category::as_str).collect::<Vec<_>>(),
        dry_run = config.dry_run(),
        timezone = %config.common.timezone,
        "Configuration loaded"
    );
    if config.dry_run() {
        tracing::warn!("DRY_RUN is on: catalog changes are only logged");
    }

    let queue = JobQueue::new();
    let locks = Arc::new(CategoryLocks::new());

    let mut worker = Worker::new(queue.clone(), Arc::clone(&locks));
    for category in &enabled {
        let Some(arr) = config.arr_for(*category) else {
            continue;
        };
        let handler: Arc<dyn JobHandler> = match category {
            Category::Movies => Arc::new(MovieReconciler::new(
                RadarrClient::new(arr, config.dry_run())?,
                config.movie_settings(),
            )),
            Category::Series => Arc::new(SeriesReconciler::new(
                SonarrClient::new(arr, config.dry_run())?,
                config.series_settings(),
            )),
        };
        worker = worker.with_handler(*category, handler);
    }

    // Start job worker
    tokio::spawn(worker.run());

    // Start scheduler
    tokio::spawn(Scheduler::new(queue.clone(), enabled, config.scheduler_interval()).run());

    // Start webhook server (blocking)
    let app = routes::app_router(queue);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.webhook_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Webhook server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
