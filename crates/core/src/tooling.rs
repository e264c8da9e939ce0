//! External tool invocation.
//!
//! [`ToolCommand`] describes a configurable command line with `{name}`
//! placeholders. [`run_captured`] and [`run_logged`] spawn it with
//! `tokio::process`, optionally feed stdin, and either capture the output
//! in memory or append stdout and stderr to a log file. Neither treats a
//! non-zero exit as an error: callers inspect [`ToolOutput::exit_code`].

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};

/// Maximum stdout or stderr size captured per stream (1 MiB).
const MAX_OUTPUT_BYTES: usize = 1024 * 1024;

/// A program plus argument templates.
///
/// Arguments may contain `{name}` placeholders that are replaced when the
/// command is rendered, e.g. `["run", "build", "--", "--out", "{out}"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Substitute `{key}` placeholders in every argument.
    pub fn render_args(&self, vars: &[(&str, &str)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect()
    }

    /// Build a ready-to-spawn [`Command`] with placeholders substituted.
    pub fn to_command(&self, vars: &[(&str, &str)]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.render_args(vars));
        cmd
    }

    /// Human-readable rendering used in logs.
    pub fn display(&self, vars: &[(&str, &str)]) -> String {
        std::iter::once(self.program.clone())
            .chain(self.render_args(vars))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Per-invocation process settings.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Working directory for the child process.
    pub working_dir: Option<PathBuf>,
    /// Bytes written to stdin before it is closed. `None` attaches `/dev/null`.
    pub stdin: Option<Vec<u8>>,
    /// Additional environment variables.
    pub env: Vec<(String, String)>,
    /// Kill the process after this long. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Result of a finished process.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit code (`-1` if killed by a signal).
    pub exit_code: i32,
    /// Captured stdout; empty for [`run_logged`].
    pub stdout: String,
    /// Captured stderr; empty for [`run_logged`].
    pub stderr: String,
    pub duration_ms: u64,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {elapsed_ms}ms")]
    Timeout { program: String, elapsed_ms: u64 },

    #[error("I/O error while running tool: {0}")]
    Io(#[from] std::io::Error),
}

/// Run `cmd`, capturing stdout and stderr in memory.
pub async fn run_captured(cmd: &mut Command, invocation: Invocation) -> Result<ToolOutput, ToolError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let start = Instant::now();
    let mut child = spawn(cmd, &invocation).await?;

    let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
    let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

    let exit_code = wait(&mut child, cmd, invocation.timeout, start).await?;
    let stdout_bytes = stdout_task.await.unwrap_or_default();
    let stderr_bytes = stderr_task.await.unwrap_or_default();

    Ok(ToolOutput {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout_bytes).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_bytes).into_owned(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Run `cmd` with stdout and stderr both appended to `log_path`.
///
/// A `$ <command line>` header is written before the process starts so a
/// log holding several steps stays readable.
pub async fn run_logged(
    cmd: &mut Command,
    invocation: Invocation,
    log_path: &Path,
    header: &str,
) -> Result<ToolOutput, ToolError> {
    let mut log = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .await?;
    log.write_all(format!("$ {header}\n").as_bytes()).await?;
    log.flush().await?;

    let log = log.into_std().await;
    let stderr_log = log.try_clone()?;
    cmd.stdout(Stdio::from(log)).stderr(Stdio::from(stderr_log));

    let start = Instant::now();
    let mut child = spawn(cmd, &invocation).await?;
    let exit_code = wait(&mut child, cmd, invocation.timeout, start).await?;

    Ok(ToolOutput {
        exit_code,
        stdout: String::new(),
        stderr: String::new(),
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Apply the invocation settings, spawn, and feed stdin.
async fn spawn(cmd: &mut Command, invocation: &Invocation) -> Result<Child, ToolError> {
    // `kill_on_drop(true)` ensures the child is killed when dropped (e.g. on timeout).
    cmd.kill_on_drop(true);
    cmd.stdin(if invocation.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    for (key, value) in &invocation.env {
        cmd.env(key, value);
    }
    if let Some(dir) = &invocation.working_dir {
        cmd.current_dir(dir);
    }

    let program = program_name(cmd);
    let mut child = cmd
        .spawn()
        .map_err(|source| ToolError::Spawn { program, source })?;

    if let (Some(mut stdin), Some(bytes)) = (child.stdin.take(), invocation.stdin.as_ref()) {
        // Best-effort write; if the process closes stdin early, ignore the error.
        let _ = stdin.write_all(bytes).await;
        drop(stdin);
    }
    Ok(child)
}

async fn wait(
    child: &mut Child,
    cmd: &Command,
    timeout: Option<Duration>,
    start: Instant,
) -> Result<i32, ToolError> {
    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status?,
            Err(_elapsed) => {
                let _ = child.kill().await;
                return Err(ToolError::Timeout {
                    program: program_name(cmd),
                    elapsed_ms: start.elapsed().as_millis() as u64,
                });
            }
        },
        None => child.wait().await?,
    };
    Ok(status.code().unwrap_or(-1))
}

fn program_name(cmd: &Command) -> String {
    cmd.as_std().get_program().to_string_lossy().into_owned()
}

/// Read an entire output stream into a byte buffer, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn sh(script: &str) -> ToolCommand {
        ToolCommand::new("sh", ["-c", script])
    }

    #[test]
    fn placeholders_are_substituted() {
        let cmd = ToolCommand::new("npm", ["run", "build", "--", "--base", "{base}", "--out", "{out}"]);
        let args = cmd.render_args(&[("base", "/decks/demo/"), ("out", "/srv/out/demo")]);
        assert_eq!(
            args,
            vec!["run", "build", "--", "--base", "/decks/demo/", "--out", "/srv/out/demo"]
        );
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        let cmd = ToolCommand::new("echo", ["{slug}-{missing}"]);
        assert_eq!(cmd.render_args(&[("slug", "demo")]), vec!["demo-{missing}"]);
        assert_eq!(cmd.display(&[("slug", "demo")]), "echo demo-{missing}");
    }

    #[tokio::test]
    async fn captured_output_and_exit_code() {
        let mut cmd = sh("echo out; echo err >&2; exit 3").to_command(&[]);
        let output = run_captured(&mut cmd, Invocation::default())
            .await
            .expect("run");
        assert_eq!(output.exit_code, 3);
        assert!(!output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn stdin_env_and_working_dir_are_applied() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut cmd = sh("read answer; echo \"$answer $GREETING\" > reply.txt").to_command(&[]);
        let invocation = Invocation {
            working_dir: Some(dir.path().to_path_buf()),
            stdin: Some(b"n\n".to_vec()),
            env: vec![("GREETING".to_string(), "hello".to_string())],
            timeout: None,
        };
        let output = run_captured(&mut cmd, invocation).await.expect("run");
        assert!(output.success());

        let reply = std::fs::read_to_string(dir.path().join("reply.txt")).expect("read reply");
        assert_eq!(reply.trim(), "n hello");
    }

    #[tokio::test]
    async fn logged_run_appends_both_streams() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let log = dir.path().join("build.log");

        let mut first = sh("echo first").to_command(&[]);
        run_logged(&mut first, Invocation::default(), &log, "step one")
            .await
            .expect("run first");
        let mut second = sh("echo oops >&2; exit 1").to_command(&[]);
        let output = run_logged(&mut second, Invocation::default(), &log, "step two")
            .await
            .expect("run second");

        assert_eq!(output.exit_code, 1);
        let contents = std::fs::read_to_string(&log).expect("read log");
        assert_eq!(contents, "$ step one\nfirst\n$ step two\noops\n");
    }

    #[tokio::test]
    async fn timeout_kills_the_process() {
        let mut cmd = sh("sleep 30").to_command(&[]);
        let invocation = Invocation {
            timeout: Some(Duration::from_millis(200)),
            ..Invocation::default()
        };
        let result = run_captured(&mut cmd, invocation).await;
        assert_matches!(result, Err(ToolError::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let mut cmd = ToolCommand::new("deckhand-no-such-binary", Vec::<String>::new()).to_command(&[]);
        let result = run_captured(&mut cmd, Invocation::default()).await;
        assert_matches!(result, Err(ToolError::Spawn { program, .. }) if program == "deckhand-no-such-binary");
    }
}
