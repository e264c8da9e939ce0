//! [`ProjectService`]: the only component that touches Slidev project
//! directories or runs the external tooling.

use std::path::{Path, PathBuf};

use crate::build_log::DiagnosticExtractor;
use crate::slug::PENDING_PROJECT_PATH;
use crate::tooling::{self, Invocation, ToolCommand, ToolError};

use super::config::ProjectConfig;
use super::SLIDES_FILE;

/// Answer piped to the scaffolder's "Install and start it now?" prompt.
const SCAFFOLD_PROMPT_ANSWER: &[u8] = b"n\n";

/// Errors from project operations. The `Display` text is what gets stored
/// in `slides.error_message`, so it is written for end users.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to create Slidev project (exit code {exit_code})")]
    ScaffoldFailed { exit_code: i32 },

    #[error("Slidev project scaffold finished but {} was not created", path.display())]
    MissingProjectDir { path: PathBuf },

    /// Build failed; `diagnostic` is the message scraped from the build log.
    #[error("{diagnostic}")]
    BuildFailed { diagnostic: String },

    #[error("Project directory has not been created yet")]
    NotScaffolded,

    /// One or more removals failed during delete.
    #[error("{}", failures.join(", "))]
    Cleanup { failures: Vec<String> },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ServiceError {
    fn io(context: impl Into<String>) -> impl FnOnce(std::io::Error) -> Self {
        let context = context.into();
        move |source| Self::Io { context, source }
    }
}

/// Drives the external Slidev tooling against explicit filesystem roots.
pub struct ProjectService {
    config: ProjectConfig,
    diagnostics: DiagnosticExtractor,
}

impl ProjectService {
    pub fn new(config: ProjectConfig) -> Self {
        Self {
            config,
            diagnostics: DiagnosticExtractor::default(),
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Create the projects, output and log roots if they are missing.
    pub async fn ensure_roots(&self) -> Result<(), ServiceError> {
        for dir in [
            &self.config.projects_root,
            &self.config.output_root,
            &self.config.log_root,
        ] {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(ServiceError::io(format!("Failed to create {}", dir.display())))?;
        }
        Ok(())
    }

    pub fn project_dir(&self, slug: &str) -> PathBuf {
        self.config.projects_root.join(slug)
    }

    pub fn output_dir(&self, slug: &str) -> PathBuf {
        self.config.output_root.join(slug)
    }

    pub fn log_path(&self, slug: &str) -> PathBuf {
        self.config.log_root.join(format!("slidev_build_{slug}.log"))
    }

    /// Public URL of the published deck.
    pub fn public_url(&self, slug: &str) -> String {
        self.config.base_url(slug)
    }

    /// Scaffold a new project named `slug` and return its directory.
    pub async fn scaffold(&self, slug: &str) -> Result<PathBuf, ServiceError> {
        let vars = [("slug", slug)];
        let mut cmd = self.config.scaffold.to_command(&vars);
        let invocation = Invocation {
            working_dir: Some(self.config.projects_root.clone()),
            stdin: Some(SCAFFOLD_PROMPT_ANSWER.to_vec()),
            env: Vec::new(),
            timeout: self.config.timeout,
        };

        tracing::info!(slug, command = %self.config.scaffold.display(&vars), "Scaffolding project");
        let output = tooling::run_captured(&mut cmd, invocation).await?;

        if !output.success() {
            tracing::error!(
                slug,
                exit_code = output.exit_code,
                stderr = %output.stderr.trim(),
                "Scaffold command failed"
            );
            return Err(ServiceError::ScaffoldFailed {
                exit_code: output.exit_code,
            });
        }

        let path = self.project_dir(slug);
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(ServiceError::io(format!("Failed to inspect {}", path.display())))?;
        if !exists {
            return Err(ServiceError::MissingProjectDir { path });
        }

        tracing::info!(slug, path = %path.display(), duration_ms = output.duration_ms, "Project scaffolded");
        Ok(path)
    }

    /// Install dependencies and build the project into its output directory.
    ///
    /// Both steps append to a fresh `slidev_build_<slug>.log`. On failure the
    /// log is scraped for a diagnostic which becomes the error message.
    pub async fn build(&self, slug: &str, project_path: &str) -> Result<PathBuf, ServiceError> {
        let project_dir = resolve(project_path)?;
        let output_dir = self.output_dir(slug);
        let log_path = self.log_path(slug);

        tokio::fs::File::create(&log_path)
            .await
            .map_err(ServiceError::io(format!("Failed to create {}", log_path.display())))?;

        let base = self.config.base_url(slug);
        let out = output_dir.to_string_lossy().into_owned();
        let vars = [("slug", slug), ("base", base.as_str()), ("out", out.as_str())];
        let invocation = Invocation {
            working_dir: Some(project_dir.to_path_buf()),
            stdin: None,
            env: vec![(
                "NODE_OPTIONS".to_string(),
                format!("--max-old-space-size={}", self.config.node_heap_mb),
            )],
            timeout: self.config.timeout,
        };

        let steps = self.config.install.iter().chain(std::iter::once(&self.config.build));
        for step in steps {
            if !self.run_step(step, &vars, invocation.clone(), &log_path).await? {
                let diagnostic = self.diagnostics.diagnose_file(&log_path).await;
                tracing::warn!(slug, log = %log_path.display(), "Build failed");
                return Err(ServiceError::BuildFailed { diagnostic });
            }
        }

        tracing::info!(slug, output = %output_dir.display(), "Build completed");
        Ok(output_dir)
    }

    async fn run_step(
        &self,
        step: &ToolCommand,
        vars: &[(&str, &str)],
        invocation: Invocation,
        log_path: &Path,
    ) -> Result<bool, ServiceError> {
        let rendered = step.display(vars);
        tracing::debug!(command = %rendered, "Running build step");
        let mut cmd = step.to_command(vars);
        let output = tooling::run_logged(&mut cmd, invocation, log_path, &rendered).await?;
        Ok(output.success())
    }

    /// Remove the project's source directory and published output.
    ///
    /// Absent directories (and the `pending` sentinel) are skipped. Both
    /// removals are always attempted; their failures are reported together.
    pub async fn delete(&self, slug: &str, project_path: &str) -> Result<(), ServiceError> {
        let mut failures = Vec::new();

        if project_path != PENDING_PROJECT_PATH && !project_path.is_empty() {
            if let Err(e) = remove_dir_if_exists(Path::new(project_path)).await {
                failures.push(format!("Failed to remove project directory: {e}"));
            }
        }

        if let Err(e) = remove_dir_if_exists(&self.output_dir(slug)).await {
            failures.push(format!("Failed to remove build output: {e}"));
        }

        let log_path = self.log_path(slug);
        if let Err(e) = tokio::fs::remove_file(&log_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(slug, log = %log_path.display(), error = %e, "Could not remove build log");
            }
        }

        if failures.is_empty() {
            tracing::info!(slug, "Project files deleted");
            Ok(())
        } else {
            Err(ServiceError::Cleanup { failures })
        }
    }

    /// Remove only the source directory, leaving the published output and
    /// the build log in place. Used to undo a failed create.
    pub async fn remove_project_dir(&self, project_path: &str) -> Result<(), ServiceError> {
        if project_path == PENDING_PROJECT_PATH || project_path.is_empty() {
            return Ok(());
        }
        remove_dir_if_exists(Path::new(project_path))
            .await
            .map_err(ServiceError::io(format!("Failed to remove project directory {project_path}")))
    }

    /// Read the project's `slides.md`.
    pub async fn read_source(&self, project_path: &str) -> Result<String, ServiceError> {
        let path = resolve(project_path)?.join(SLIDES_FILE);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(ServiceError::io(format!("Failed to read {}", path.display())))
    }

    /// Overwrite the project's `slides.md`.
    pub async fn write_source(&self, project_path: &str, content: &str) -> Result<(), ServiceError> {
        let path = resolve(project_path)?.join(SLIDES_FILE);
        tokio::fs::write(&path, content)
            .await
            .map_err(ServiceError::io(format!("Failed to write {}", path.display())))
    }
}

/// Map a stored `project_path` to a directory, rejecting the sentinel.
fn resolve(project_path: &str) -> Result<&Path, ServiceError> {
    if project_path == PENDING_PROJECT_PATH || project_path.is_empty() {
        return Err(ServiceError::NotScaffolded);
    }
    Ok(Path::new(project_path))
}

async fn remove_dir_if_exists(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
