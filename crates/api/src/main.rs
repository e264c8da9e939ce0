use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use deckhand_core::project::{ProjectConfig, ProjectService};
use deckhand_db::{MemorySlideStore, PgSlideStore, SlideStore};
use deckhand_events::EventBus;
use deckhand_worker::{JobContext, JobQueue, WorkerConfig, WorkerPool};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckhand_api::config::ServerConfig;
use deckhand_api::live::LiveUpdates;
use deckhand_api::router::build_app_router;
use deckhand_api::state::AppState;
use deckhand_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "deckhand_api=debug,deckhand_worker=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env().expect("Invalid server configuration");
    let project_config = ProjectConfig::from_env().expect("Invalid project configuration");
    let worker_config = WorkerConfig::from_env().expect("Invalid worker configuration");
    tracing::info!(
        host = %config.host,
        port = config.port,
        projects_root = %project_config.projects_root.display(),
        output_root = %project_config.output_root.display(),
        public_base = %project_config.public_base,
        "Loaded configuration"
    );

    // --- Slide store ---
    let store: Arc<dyn SlideStore> = match &config.database_url {
        Some(database_url) => {
            let pool = deckhand_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            deckhand_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            deckhand_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgSlideStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; slides are kept in memory and lost on restart");
            Arc::new(MemorySlideStore::new())
        }
    };

    // --- Project service ---
    let service = Arc::new(ProjectService::new(project_config));
    service
        .ensure_roots()
        .await
        .expect("Failed to create project directories");

    // --- WebSocket manager + heartbeat ---
    let cancel = CancellationToken::new();
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat_handle = ws::start_heartbeat(
        Arc::clone(&ws_manager),
        ws::HEARTBEAT_INTERVAL,
        cancel.clone(),
    );

    // --- Event bus + live updates ---
    let event_bus = Arc::new(EventBus::default());

    let live = LiveUpdates::new(Arc::clone(&ws_manager), Arc::clone(&service));
    let live_handle = tokio::spawn(live.run(event_bus.subscribe(), cancel.clone()));

    // --- Job queue + workers ---
    let (jobs, receiver) = JobQueue::channel();
    let ctx = JobContext {
        store: Arc::clone(&store),
        service: Arc::clone(&service),
        events: Arc::clone(&event_bus),
    };
    let worker_handles = WorkerPool::new(ctx, worker_config, jobs.clone(), receiver).spawn(cancel.clone());

    // --- App state ---
    let state = AppState {
        store,
        service,
        jobs,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        event_bus: Arc::clone(&event_bus),
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    // In-flight jobs finish their current step; queued ones are dropped.
    cancel.cancel();
    if tokio::time::timeout(grace, futures::future::join_all(worker_handles))
        .await
        .is_err()
    {
        tracing::warn!("Workers did not stop within the shutdown timeout");
    }
    tracing::info!("Worker pool stopped");

    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), live_handle).await;
    tracing::info!("Live update router stopped");

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    let _ = heartbeat_handle.await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
