use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::{env_or, parse_env, parse_env_opt, ConfigError};
use crate::tooling::ToolCommand;

/// Filesystem roots and tool command lines used by
/// [`ProjectService`](super::ProjectService).
#[derive(Debug, Clone)]
pub struct ProjectConfig {
    /// Parent directory of every scaffolded project (`<root>/<slug>`).
    pub projects_root: PathBuf,
    /// Parent directory of every published build (`<root>/<slug>`).
    pub output_root: PathBuf,
    /// Directory holding `slidev_build_<slug>.log` files.
    pub log_root: PathBuf,
    /// URL prefix under which `output_root` is served, e.g. `/decks`.
    pub public_base: String,
    /// Value of `--max-old-space-size` passed to Node during builds.
    pub node_heap_mb: u32,
    /// Kill scaffold/build subprocesses after this long. `None` never kills.
    pub timeout: Option<Duration>,
    /// Scaffold command, run in `projects_root`. Placeholders: `{slug}`.
    pub scaffold: ToolCommand,
    /// Dependency install command run before each build, if any.
    pub install: Option<ToolCommand>,
    /// Build command, run in the project directory.
    /// Placeholders: `{slug}`, `{base}`, `{out}`.
    pub build: ToolCommand,
}

impl ProjectConfig {
    /// Default `npm`-based commands with the given roots.
    pub fn with_roots(
        projects_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        log_root: impl Into<PathBuf>,
    ) -> Self {
        Self::with_npm("npm", projects_root, output_root, log_root)
    }

    fn with_npm(
        npm: &str,
        projects_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        log_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            projects_root: projects_root.into(),
            output_root: output_root.into(),
            log_root: log_root.into(),
            public_base: "/decks".to_string(),
            node_heap_mb: 4096,
            timeout: None,
            scaffold: ToolCommand::new(
                npm,
                ["create", "slidev@latest", "{slug}", "--", "--template", "basic", "--yes"],
            ),
            install: Some(ToolCommand::new(npm, ["install"])),
            build: ToolCommand::new(
                npm,
                ["run", "build", "--", "--base", "{base}", "--out", "{out}"],
            ),
        }
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default           |
    /// |-----------------------|-------------------|
    /// | `SLIDEV_PROJECTS_DIR` | `slidev_projects` |
    /// | `SLIDEV_OUTPUT_DIR`   | `public/decks`    |
    /// | `SLIDEV_LOG_DIR`      | `log`             |
    /// | `SLIDEV_PUBLIC_BASE`  | `/decks`          |
    /// | `SLIDEV_NODE_HEAP_MB` | `4096`            |
    /// | `SLIDEV_NPM`          | `npm`             |
    /// | `BUILD_TIMEOUT_SECS`  | unset (no limit)  |
    ///
    /// Relative directories are resolved against the current directory.
    pub fn from_env() -> Result<Self, ConfigError> {
        let projects_root = absolute_env("SLIDEV_PROJECTS_DIR", "slidev_projects")?;
        let output_root = absolute_env("SLIDEV_OUTPUT_DIR", "public/decks")?;
        let log_root = absolute_env("SLIDEV_LOG_DIR", "log")?;

        let mut config = Self::with_npm(
            &env_or("SLIDEV_NPM", "npm"),
            projects_root,
            output_root,
            log_root,
        );
        config.public_base = public_base_env()?;
        config.node_heap_mb = parse_env("SLIDEV_NODE_HEAP_MB", 4096, "u32")?;
        config.timeout =
            parse_env_opt::<u64>("BUILD_TIMEOUT_SECS", "u64")?.map(Duration::from_secs);
        Ok(config)
    }

    /// `--base` value for a slug: `<public_base>/<slug>/`.
    pub fn base_url(&self, slug: &str) -> String {
        format!("{}/{slug}/", self.public_base.trim_end_matches('/'))
    }
}

fn absolute_env(key: &'static str, default: &str) -> Result<PathBuf, ConfigError> {
    let raw = env_or(key, default);
    std::path::absolute(Path::new(&raw)).map_err(|source| ConfigError::Path { key, source })
}

/// `SLIDEV_PUBLIC_BASE` must be an absolute URL path below the site root.
fn public_base_env() -> Result<String, ConfigError> {
    let raw = env_or("SLIDEV_PUBLIC_BASE", "/decks");
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') {
        return Err(ConfigError::Invalid {
            key: "SLIDEV_PUBLIC_BASE",
            expected: "URL path such as /decks",
            value: raw,
        });
    }
    Ok(trimmed.to_string())
}
