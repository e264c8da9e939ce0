//! Shared fixtures for worker integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use deckhand_core::project::{ProjectConfig, ProjectService};
use deckhand_core::tooling::ToolCommand;
use deckhand_db::models::slide::{CreateSlide, Slide};
use deckhand_db::{MemorySlideStore, SlideStore};
use deckhand_events::EventBus;
use deckhand_worker::JobContext;
use tempfile::TempDir;

/// Scaffold stand-in: creates `<slug>/` in the working directory.
pub const SCAFFOLD_OK: &str = r#"read answer; mkdir -p "$1""#;
/// Build stand-in: writes an index page into `--out`.
pub const BUILD_OK: &str = r#"echo "building $1"; mkdir -p "$2" && echo ok > "$2/index.html""#;
/// Build stand-in that fails the way a Vue template error does.
pub const BUILD_BROKEN: &str = r#"echo '[vite:vue] [plugin vite:vue] Element is missing end tag.'; echo "file: $PWD/slides.md__slidev_1.md:4:1"; exit 1"#;

pub struct TestEnv {
    pub dir: TempDir,
    pub store: Arc<MemorySlideStore>,
    pub service: Arc<ProjectService>,
    pub events: Arc<EventBus>,
}

impl TestEnv {
    pub fn context(&self) -> JobContext {
        JobContext {
            store: self.store.clone(),
            service: self.service.clone(),
            events: self.events.clone(),
        }
    }

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

    /// Insert a slide whose project directory already exists.
    pub async fn insert_scaffolded(&self, name: &str) -> Slide {
        let slide = self.insert(name).await;
        let path = self.service.scaffold(&slide.slug).await.expect("scaffold");
        self.store
            .set_project_path(slide.id, path.to_str().expect("utf-8 path"))
            .await
            .expect("set path")
            .expect("slide exists")
    }

    pub async fn reload(&self, id: i64) -> Slide {
        self.store.find(id).await.expect("find").expect("slide exists")
    }
}

/// Build a test environment with shell stand-ins for the Slidev tooling.
pub async fn env_with(scaffold: &str, build: &str) -> TestEnv {
    let dir = tempfile::tempdir().expect("create temp dir");
    let mut config = ProjectConfig::with_roots(
        dir.path().join("projects"),
        dir.path().join("public"),
        dir.path().join("log"),
    );
    config.scaffold = ToolCommand::new("sh", ["-c", scaffold, "scaffold", "{slug}"]);
    config.install = None;
    config.build = ToolCommand::new("sh", ["-c", build, "build", "{base}", "{out}"]);

    let service = ProjectService::new(config);
    service.ensure_roots().await.expect("create roots");

    TestEnv {
        dir,
        store: Arc::new(MemorySlideStore::new()),
        service: Arc::new(service),
        events: Arc::new(EventBus::default()),
    }
}

pub async fn env() -> TestEnv {
    env_with(SCAFFOLD_OK, BUILD_OK).await
}
