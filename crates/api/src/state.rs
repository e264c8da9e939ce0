use std::sync::Arc;

use deckhand_core::project::ProjectService;
use deckhand_db::SlideStore;
use deckhand_events::EventBus;
use deckhand_worker::JobQueue;

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Slide records (Postgres, or in-memory without `DATABASE_URL`).
    pub store: Arc<dyn SlideStore>,
    /// Filesystem and tooling access for Slidev projects.
    pub service: Arc<ProjectService>,
    /// Producer side of the background job queue.
    pub jobs: JobQueue,
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Slide lifecycle events, consumed by the live-update router.
    pub event_bus: Arc<EventBus>,
}
