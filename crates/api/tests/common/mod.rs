//! Shared fixtures for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use deckhand_api::config::ServerConfig;
use deckhand_api::flash::Flash;
use deckhand_api::router::build_app_router;
use deckhand_api::state::AppState;
use deckhand_api::ws::WsManager;
use deckhand_core::project::{ProjectConfig, ProjectService};
use deckhand_core::status::SlideStatus;
use deckhand_core::tooling::ToolCommand;
use deckhand_db::models::slide::{CreateSlide, Slide};
use deckhand_db::{MemorySlideStore, SlideStore};
use deckhand_events::EventBus;
use deckhand_worker::{JobEnvelope, JobQueue, JobReceiver};

/// Scaffold stand-in: creates `<slug>/` in the working directory.
const SCAFFOLD_OK: &str = r#"read answer; mkdir -p "$1""#;
/// Build stand-in: writes an index page into `--out`.
const BUILD_OK: &str = r#"mkdir -p "$2" && echo ok > "$2/index.html""#;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: None,
    }
}

/// The full router over an in-memory store and a scratch directory.
///
/// No workers run: enqueued jobs stay on `receiver` for inspection.
pub struct TestApp {
    pub dir: TempDir,
    pub store: Arc<MemorySlideStore>,
    pub service: Arc<ProjectService>,
    pub events: Arc<EventBus>,
    pub ws_manager: Arc<WsManager>,
    pub receiver: JobReceiver,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut project_config = ProjectConfig::with_roots(
            dir.path().join("projects"),
            dir.path().join("public"),
            dir.path().join("log"),
        );
        project_config.scaffold = ToolCommand::new("sh", ["-c", SCAFFOLD_OK, "scaffold", "{slug}"]);
        project_config.install = None;
        project_config.build = ToolCommand::new("sh", ["-c", BUILD_OK, "build", "{base}", "{out}"]);

        let service = Arc::new(ProjectService::new(project_config));
        service.ensure_roots().await.expect("create roots");

        let store = Arc::new(MemorySlideStore::new());
        let events = Arc::new(EventBus::default());
        let ws_manager = Arc::new(WsManager::new());
        let (jobs, receiver) = JobQueue::channel();
        let config = test_config();

        let state = AppState {
            store: store.clone(),
            service: service.clone(),
            jobs,
            config: Arc::new(config.clone()),
            ws_manager: ws_manager.clone(),
            event_bus: events.clone(),
        };

        Self {
            dir,
            store,
            service,
            events,
            ws_manager,
            receiver,
            router: build_app_router(state, &config),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// Submit an urlencoded form with the given method.
    pub async fn form(&self, method: Method, uri: &str, fields: &[(&str, &str)]) -> Response {
        let body = serde_urlencoded::to_string(fields).expect("encode form");
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("valid request");
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response {
        self.form(Method::POST, uri, fields).await
    }

    /// Insert a record directly, bypassing the handlers.
    pub async fn insert(&self, name: &str) -> Slide {
        self.store
            .create(&CreateSlide {
                name: name.to_string(),
                slug: deckhand_core::slug::generate_slug(name),
                description: None,
            })
            .await
            .expect("insert slide")
    }

    /// Insert a record with a scaffolded project, in `status`.
    pub async fn insert_ready(&self, name: &str, status: SlideStatus) -> Slide {
        let slide = self.insert(name).await;
        let path = self.service.scaffold(&slide.slug).await.expect("scaffold");
        let path = path.to_str().expect("utf-8 path");
        self.service
            .write_source(path, "# Hello")
            .await
            .expect("write slides.md");
        self.store
            .set_project_path(slide.id, path)
            .await
            .expect("set path")
            .expect("slide exists");
        if status != SlideStatus::Pending {
            self.store
                .advance(slide.id, SlideStatus::Building, None)
                .await
                .expect("claim")
                .expect("slide was pending");
        }
        if matches!(status, SlideStatus::Completed | SlideStatus::Failed) {
            self.store
                .advance(slide.id, status, None)
                .await
                .expect("finish")
                .expect("slide was building");
        }
        self.reload(slide.id).await
    }

    pub async fn reload(&self, id: i64) -> Slide {
        self.store.find(id).await.expect("find").expect("slide exists")
    }

    /// Pop the next enqueued job, if any.
    pub async fn next_job(&self) -> Option<JobEnvelope> {
        let payload = self.receiver.lock().await.try_recv().ok()?;
        Some(JobEnvelope::decode(&payload).expect("decodable job"))
    }
}

pub async fn body_string(response: Response) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("JSON body")
}

/// Split a redirect's `Location` into its path and flash.
pub fn redirect_target(response: &Response) -> (String, Flash) {
    let location = response
        .headers()
        .get(LOCATION)
        .expect("Location header")
        .to_str()
        .expect("ASCII Location");
    match location.split_once('?') {
        Some((path, query)) => (
            path.to_string(),
            serde_urlencoded::from_str(query).expect("flash query"),
        ),
        None => (location.to_string(), Flash::default()),
    }
}
