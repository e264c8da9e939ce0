//! Best-effort diagnostics scraped from a Slidev build log.
//!
//! The build tool is a black box; when it exits non-zero the only clue is
//! its console output. [`DiagnosticExtractor`] runs an ordered list of
//! [`LogMatcher`] strategies over the log text and returns the first
//! diagnostic any of them produces, falling back to a generic message that
//! points at the log file.
//!
//! The patterns track the current Vite / Vue plugin phrasing. If the tool
//! changes its output the matchers stop firing and the extractor silently
//! degrades to the keyword and fallback messages.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Number of keyword lines quoted by [`KeywordLineMatcher`].
const MAX_KEYWORD_LINES: usize = 5;

/// `slides.md` location as reported for Slidev's per-slide virtual modules
/// (`slides.md__slidev_3.md:12:5`) and for the raw file (`slides.md:12:5`).
static LOCATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"slides\.md__slidev_\d+\.md:(\d+):(\d+)", r"slides\.md:(\d+):(\d+)"]
        .into_iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
});

static KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"error|failed")
        .case_insensitive(true)
        .build()
        .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Matcher data
// ---------------------------------------------------------------------------

/// A line marker that identifies a compiler/plugin error, plus the
/// tool-specific prefix to strip from that line.
#[derive(Debug, Clone)]
pub struct ErrorMarker {
    /// Substring that identifies the error line.
    pub needle: &'static str,
    /// Prefix pattern removed from the trimmed line before quoting it.
    pub strip: Regex,
}

/// A canned hint appended when the error text matches `pattern`.
#[derive(Debug, Clone)]
pub struct Hint {
    pub pattern: Regex,
    pub text: &'static str,
}

impl Hint {
    fn new(pattern: &str, text: &'static str) -> Self {
        Self {
            pattern: RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .expect("valid regex"),
            text,
        }
    }
}

/// Markers recognised by the default plugin-error matcher, in priority order.
pub fn default_markers() -> Vec<ErrorMarker> {
    vec![
        ErrorMarker {
            needle: "[vite:vue]",
            strip: Regex::new(r"\[vite:vue\]\s*\[plugin vite:vue\]\s*").expect("valid regex"),
        },
        ErrorMarker {
            needle: "SyntaxError:",
            strip: Regex::new(r"^SyntaxError:\s*\[plugin vite:vue\]\s*").expect("valid regex"),
        },
    ]
}

/// Hints recognised by the default plugin-error matcher.
pub fn default_hints() -> Vec<Hint> {
    vec![
        Hint::new(
            "Element is missing end tag",
            "Hint: an HTML tag is not closed. Every <div> needs a matching </div>.",
        ),
        Hint::new(
            "Unexpected token",
            "Hint: syntax error. Check for unclosed Markdown constructs or code fences.",
        ),
        Hint::new(
            "Cannot find module",
            "Hint: a module could not be found. Check the dependencies in package.json.",
        ),
    ]
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// One independent diagnostic strategy.
pub trait LogMatcher: Send + Sync {
    /// Short name used in trace output.
    fn name(&self) -> &'static str;

    /// Inspect the log lines and return a diagnostic if this strategy applies.
    fn diagnose(&self, lines: &[&str]) -> Option<String>;
}

/// Recognises Vite/Vue plugin and syntax errors and points at the offending
/// `slides.md` location.
pub struct PluginErrorMatcher {
    markers: Vec<ErrorMarker>,
    hints: Vec<Hint>,
}

impl PluginErrorMatcher {
    pub fn new(markers: Vec<ErrorMarker>, hints: Vec<Hint>) -> Self {
        Self { markers, hints }
    }

    fn location(lines: &[&str]) -> Option<(u32, u32)> {
        let file_line = lines
            .iter()
            .find(|line| line.contains("file:") && line.contains("slides.md"))?;
        LOCATION_PATTERNS.iter().find_map(|re| {
            let caps = re.captures(file_line)?;
            let line = caps[1].parse().ok()?;
            let column = caps[2].parse().ok()?;
            Some((line, column))
        })
    }

    fn hint_for(&self, message: &str) -> Option<&'static str> {
        self.hints
            .iter()
            .find(|hint| hint.pattern.is_match(message))
            .map(|hint| hint.text)
    }
}

impl Default for PluginErrorMatcher {
    fn default() -> Self {
        Self::new(default_markers(), default_hints())
    }
}

impl LogMatcher for PluginErrorMatcher {
    fn name(&self) -> &'static str {
        "plugin_error"
    }

    fn diagnose(&self, lines: &[&str]) -> Option<String> {
        // The first marked line wins, whichever marker it carries.
        let (line, marker) = lines.iter().find_map(|line| {
            self.markers
                .iter()
                .find(|marker| line.contains(marker.needle))
                .map(|marker| (*line, marker))
        })?;

        let message = marker.strip.replace(line.trim(), "").into_owned();
        let mut parts = vec![message.clone()];

        if let Some((line_no, column)) = Self::location(lines) {
            parts.push(format!("Location: slides.md line {line_no}, column {column}"));
        }
        if let Some(hint) = self.hint_for(&message) {
            parts.push(hint.to_string());
        }

        Some(format!(
            "Slidev build failed:\n\n{}\n\nCheck the syntax of slides.md.",
            parts.join("\n")
        ))
    }
}

/// Quotes the first few lines that mention `error` or `failed`.
pub struct KeywordLineMatcher {
    max_lines: usize,
}

impl KeywordLineMatcher {
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }
}

impl Default for KeywordLineMatcher {
    fn default() -> Self {
        Self::new(MAX_KEYWORD_LINES)
    }
}

impl LogMatcher for KeywordLineMatcher {
    fn name(&self) -> &'static str {
        "keyword_lines"
    }

    fn diagnose(&self, lines: &[&str]) -> Option<String> {
        let matched: Vec<&str> = lines
            .iter()
            .copied()
            .filter(|line| KEYWORD_RE.is_match(line))
            .take(self.max_lines)
            .collect();

        if matched.is_empty() {
            return None;
        }
        Some(format!("Slidev build failed:\n\n{}", matched.join("\n").trim()))
    }
}

// ---------------------------------------------------------------------------
// Extractor
// ---------------------------------------------------------------------------

/// Ordered chain of [`LogMatcher`]s with a generic fallback.
pub struct DiagnosticExtractor {
    matchers: Vec<Box<dyn LogMatcher>>,
}

impl DiagnosticExtractor {
    pub fn new(matchers: Vec<Box<dyn LogMatcher>>) -> Self {
        Self { matchers }
    }

    /// Diagnose raw log text. `log_path` is only quoted in the fallback.
    pub fn diagnose(&self, log: &str, log_path: &Path) -> String {
        let lines: Vec<&str> = log.lines().collect();

        for matcher in &self.matchers {
            if let Some(message) = matcher.diagnose(&lines) {
                tracing::debug!(matcher = matcher.name(), "Build log diagnostic found");
                return message;
            }
        }

        format!(
            "Slidev build failed. See the build log for details: {}",
            log_path.display()
        )
    }

    /// Read the log at `log_path` and diagnose it.
    pub async fn diagnose_file(&self, log_path: &Path) -> String {
        match tokio::fs::read(log_path).await {
            Ok(bytes) => self.diagnose(&String::from_utf8_lossy(&bytes), log_path),
            Err(e) => {
                tracing::warn!(path = %log_path.display(), error = %e, "Build log unreadable");
                format!(
                    "Slidev build failed and no build log was found at {}.",
                    log_path.display()
                )
            }
        }
    }
}

impl Default for DiagnosticExtractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(PluginErrorMatcher::default()),
            Box::new(KeywordLineMatcher::default()),
        ])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn log_path() -> PathBuf {
        PathBuf::from("log/slidev_build_demo.log")
    }

    const VITE_LOG: &str = "\
> build
> slidev build --base /decks/demo/ --out /srv/decks/demo

vite v5.4.0 building for production...
[vite:vue] [plugin vite:vue] Element is missing end tag.
file: /srv/projects/demo/slides.md__slidev_2.md:14:3
error during build:
";

    #[test]
    fn plugin_error_reports_message_location_and_hint() {
        let message = DiagnosticExtractor::default().diagnose(VITE_LOG, &log_path());

        assert!(message.starts_with("Slidev build failed:\n\nElement is missing end tag."));
        assert!(message.contains("Location: slides.md line 14, column 3"));
        assert!(message.contains("Hint: an HTML tag is not closed"));
        assert!(message.ends_with("Check the syntax of slides.md."));
    }

    #[test]
    fn syntax_error_marker_with_plain_slides_location() {
        let log = "\
SyntaxError: [plugin vite:vue] Unexpected token (3:1)
  file: /tmp/demo/slides.md:27:9
";
        let message = DiagnosticExtractor::default().diagnose(log, &log_path());

        assert!(message.contains("Unexpected token (3:1)"));
        assert!(!message.contains("[plugin vite:vue]"));
        assert!(message.contains("line 27, column 9"));
        assert!(message.contains("Hint: syntax error"));
    }

    #[test]
    fn plugin_error_without_location_or_hint() {
        let log = "[vite:vue] [plugin vite:vue] Something odd happened\n";
        let message = PluginErrorMatcher::default()
            .diagnose(&log.lines().collect::<Vec<_>>())
            .expect("marker present");

        assert_eq!(
            message,
            "Slidev build failed:\n\nSomething odd happened\n\nCheck the syntax of slides.md."
        );
    }

    #[test]
    fn file_line_for_other_source_is_ignored() {
        let log = "\
[vite:vue] [plugin vite:vue] Cannot find module 'foo'
file: /tmp/demo/components/Counter.vue:3:1
";
        let message = DiagnosticExtractor::default().diagnose(log, &log_path());

        assert!(!message.contains("Location:"));
        assert!(message.contains("Hint: a module could not be found"));
    }

    #[test]
    fn keyword_lines_are_quoted_verbatim() {
        let log = "\
npm WARN deprecated something
Error: ENOENT: no such file or directory, open 'theme.css'
    at Object.openSync (node:fs:573:18)
";
        let message = DiagnosticExtractor::default().diagnose(log, &log_path());

        assert_eq!(
            message,
            "Slidev build failed:\n\nError: ENOENT: no such file or directory, open 'theme.css'"
        );
    }

    #[test]
    fn keyword_matcher_is_case_insensitive_and_capped() {
        let log = (1..=8)
            .map(|i| format!("step {i} FAILED"))
            .collect::<Vec<_>>()
            .join("\n");
        let message = DiagnosticExtractor::default().diagnose(&log, &log_path());

        assert!(message.contains("step 5 FAILED"));
        assert!(!message.contains("step 6 FAILED"));
    }

    #[test]
    fn unrecognised_log_falls_back_to_log_path() {
        let message = DiagnosticExtractor::default().diagnose("all quiet\n", &log_path());
        assert_eq!(
            message,
            "Slidev build failed. See the build log for details: log/slidev_build_demo.log"
        );
    }

    #[test]
    fn empty_matcher_chain_always_falls_back() {
        let extractor = DiagnosticExtractor::new(vec![]);
        let message = extractor.diagnose(VITE_LOG, &log_path());
        assert!(message.starts_with("Slidev build failed. See the build log"));
    }

    #[tokio::test]
    async fn missing_log_file_is_reported() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("absent.log");
        let message = DiagnosticExtractor::default().diagnose_file(&path).await;
        assert!(message.contains("no build log was found"));
        assert!(message.contains("absent.log"));
    }

    #[tokio::test]
    async fn diagnose_file_reads_log_contents() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("build.log");
        tokio::fs::write(&path, VITE_LOG).await.expect("write log");

        let message = DiagnosticExtractor::default().diagnose_file(&path).await;
        assert!(message.contains("line 14, column 3"));
    }
}
