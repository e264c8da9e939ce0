//! Slidev project lifecycle: scaffold, build, edit source, delete.

pub mod config;
pub mod service;

pub use config::ProjectConfig;
pub use service::{ProjectService, ServiceError};

/// Name of the Markdown source file inside a Slidev project.
pub const SLIDES_FILE: &str = "slides.md";

/// Content written to `slides.md` by a freshly created project.
pub const DEFAULT_INITIAL_CONTENT: &str = "Hello, World!";
