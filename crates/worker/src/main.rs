use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skill_loop_events::{EventBus, LogNotifier, NotificationDispatcher};
use skill_loop_journey::JourneyEngine;
use skill_loop_worker::config::WorkerConfig;
use skill_loop_worker::overdue_sweeper::OverdueSweeper;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skill_loop_worker=debug,skill_loop_journey=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = WorkerConfig::from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = skill_loop_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    skill_loop_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database ready");

    let event_bus = Arc::new(EventBus::default());
    let dispatcher = NotificationDispatcher::new(Arc::new(LogNotifier));
    let dispatcher_handle = tokio::spawn(dispatcher.run(event_bus.subscribe()));

    let engine = Arc::new(JourneyEngine::new(pool, Arc::clone(&event_bus)));
    let cancel = CancellationToken::new();
    let sweeper = OverdueSweeper::new(engine, config.sweep_interval, config.sweep_on_start);
    let sweeper_handle = tokio::spawn(sweeper.run(cancel.clone()));

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Received SIGINT (Ctrl-C), shutting down");

    cancel.cancel();
    let _ = sweeper_handle.await;

    // The sweeper held the engine's bus handle; dropping ours closes the
    // channel so the dispatcher drains and exits.
    drop(event_bus);
    let _ = tokio::time::timeout(config.shutdown_timeout, dispatcher_handle).await;
    tracing::info!("Worker stopped");
}
