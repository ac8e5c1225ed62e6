use super::{relative_display, walk_files};
use crate::builtins::file::Workspace;
use crate::error::{Error, Result};
use crate::registry::{Tool, ToolDefinition, ToolKind, ToolResult};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default search timeout in seconds
pub const DEFAULT_GREP_TIMEOUT_SECS: u64 = 30;

/// What a search reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Matching file paths
    #[default]
    FilesWithMatches,
    /// Matching lines, optionally with context
    Content,
    /// Match count per file
    Count,
}

impl OutputMode {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "files_with_matches" => Some(Self::FilesWithMatches),
            "content" => Some(Self::Content),
            "count" => Some(Self::Count),
            _ => None,
        }
    }
}

/// Grep tool configuration
#[derive(Debug, Clone)]
pub struct GrepConfig {
    /// Whole-search time limit
    pub timeout: Duration,
    /// Output is cut beyond this many characters
    pub output_limit: usize,
}

impl Default for GrepConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_GREP_TIMEOUT_SECS),
            output_limit: 30_000,
        }
    }
}

#[derive(Debug, Clone)]
struct SearchRequest {
    regex: Regex,
    root: PathBuf,
    file_filter: Option<glob::Pattern>,
    mode: OutputMode,
    line_numbers: bool,
    before: usize,
    after: usize,
    multiline: bool,
}

/// Regex content search over the workspace
pub struct GrepTool {
    definition: ToolDefinition,
    workspace: Workspace,
    config: GrepConfig,
}

impl GrepTool {
    /// Create a new grep tool
    #[must_use]
    pub fn new(workspace: Workspace, config: GrepConfig) -> Self {
        let definition = ToolDefinition::new(
            ToolKind::Grep,
            "Search file contents with a regular expression. Supports full regex syntax \
             (e.g. \"log.*Error\", \"fn\\s+\\w+\"). Filter files with the glob parameter. \
             Output modes: files_with_matches (default), content, count.",
        )
        .with_parameters(serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The regular expression to search for"
                },
                "path": {
                    "type": "string",
                    "description": "File or directory to search (defaults to the working directory)"
                },
                "glob": {
                    "type": "string",
                    "description": "Only search files matching this glob (e.g. \"*.rs\")"
                },
                "output_mode": {
                    "type": "string",
                    "enum": ["content", "files_with_matches", "count"],
                    "description": "What to report (default files_with_matches)"
                },
                "case_insensitive": {"type": "boolean", "description": "Case insensitive search"},
                "show_line_numbers": {"type": "boolean", "description": "Show line numbers (content mode)"},
                "context_before": {"type": "integer", "description": "Lines of context before each match (content mode)"},
                "context_after": {"type": "integer", "description": "Lines of context after each match (content mode)"},
                "multiline": {"type": "boolean", "description": "Let patterns span lines; '.' matches newlines"}
            },
            "required": ["pattern"]
        }))
        .with_timeout(config.timeout + Duration::from_secs(1));

        Self {
            definition,
            workspace,
            config,
        }
    }

    fn build_request(&self, input: &serde_json::Value) -> std::result::Result<SearchRequest, String> {
        let pattern = input
            .get("pattern")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "Error: Missing 'pattern' parameter".to_string())?;
        let flag = |name: &str| input.get(name).and_then(|v| v.as_bool()).unwrap_or(false);
        let count = |name: &str| {
            input
                .get(name)
                .and_then(|v| v.as_u64())
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(0)
        };

        let multiline = flag("multiline");
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(flag("case_insensitive"))
            .multi_line(true)
            .dot_matches_new_line(multiline)
            .build()
            .map_err(|e| format!("Error: Invalid regex pattern: {e}"))?;

        let file_filter = match input.get("glob").and_then(|v| v.as_str()) {
            Some(g) => Some(
                glob::Pattern::new(g).map_err(|e| format!("Error: Invalid glob '{g}': {e}"))?,
            ),
            None => None,
        };

        let mode = match input.get("output_mode").and_then(|v| v.as_str()) {
            Some(m) => OutputMode::parse(m).ok_or_else(|| {
                format!("Error: Invalid output_mode '{m}'. Must be one of: content, files_with_matches, count")
            })?,
            None => OutputMode::default(),
        };

        Ok(SearchRequest {
            regex,
            root: self
                .workspace
                .resolve(input.get("path").and_then(|v| v.as_str()).unwrap_or("")),
            file_filter,
            mode,
            line_numbers: flag("show_line_numbers"),
            before: count("context_before"),
            after: count("context_after"),
            multiline,
        })
    }
}

/// Run a search synchronously; `display_base` is what paths are shown relative to
fn search(request: &SearchRequest, display_base: &Path) -> Vec<String> {
    let files: Vec<PathBuf> = if request.root.is_file() {
        vec![request.root.clone()]
    } else {
        walk_files(&request.root, "**/*")
    };

    let mut out = Vec::new();
    for path in files {
        if let Some(filter) = &request.file_filter {
            let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
            let relative = relative_display(&request.root, &path);
            if !filter.matches(&name) && !filter.matches(&relative) {
                continue;
            }
        }

        // Non-UTF-8 files are treated as binary and skipped
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };
        let shown = relative_display(display_base, &path);

        match request.mode {
            OutputMode::FilesWithMatches => {
                if request.regex.is_match(&content) {
                    out.push(shown);
                }
            }
            OutputMode::Count => {
                let n = count_matches(request, &content);
                if n > 0 {
                    out.push(format!("{shown}:{n}"));
                }
            }
            OutputMode::Content => {
                content_lines(request, &content, &shown, &mut out);
            }
        }
    }
    out
}

fn count_matches(request: &SearchRequest, content: &str) -> usize {
    if request.multiline {
        request.regex.find_iter(content).count()
    } else {
        content.lines().filter(|l| request.regex.is_match(l)).count()
    }
}

fn matched_line_numbers(request: &SearchRequest, content: &str) -> BTreeSet<usize> {
    if request.multiline {
        // Every line a match touches counts as matched
        let starts: Vec<usize> = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let line_of = |offset: usize| starts.partition_point(|&s| s <= offset).saturating_sub(1);
        request
            .regex
            .find_iter(content)
            .flat_map(|m| line_of(m.start())..=line_of(m.end().saturating_sub(1).max(m.start())))
            .collect()
    } else {
        content
            .lines()
            .enumerate()
            .filter(|(_, l)| request.regex.is_match(l))
            .map(|(i, _)| i)
            .collect()
    }
}

fn content_lines(request: &SearchRequest, content: &str, shown: &str, out: &mut Vec<String>) {
    let matched = matched_line_numbers(request, content);
    if matched.is_empty() {
        return;
    }
    let lines: Vec<&str> = content.lines().collect();

    let mut shown_lines = BTreeSet::new();
    for &i in &matched {
        let from = i.saturating_sub(request.before);
        let to = (i + request.after).min(lines.len().saturating_sub(1));
        shown_lines.extend(from..=to);
    }

    let mut previous: Option<usize> = None;
    for i in shown_lines {
        if let Some(p) = previous {
            if i > p + 1 {
                out.push("--".to_string());
            }
        }
        previous = Some(i);

        let sep = if matched.contains(&i) { ':' } else { '-' };
        let text = lines.get(i).copied().unwrap_or_default();
        if request.line_numbers {
            out.push(format!("{shown}{sep}{}{sep}{text}", i + 1));
        } else {
            out.push(format!("{shown}{sep}{text}"));
        }
    }
}

#[async_trait::async_trait]
impl Tool for GrepTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn execute(&self, input: serde_json::Value) -> Result<ToolResult> {
        let start = Instant::now();
        let elapsed = || u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let request = match self.build_request(&input) {
            Ok(request) => request,
            Err(message) => return Ok(ToolResult::failure(message, elapsed())),
        };

        if !request.root.exists() {
            return Ok(ToolResult::failure(
                format!("Error: Path does not exist: {}", request.root.display()),
                elapsed(),
            ));
        }

        debug!(
            pattern = %request.regex.as_str(),
            root = %request.root.display(),
            mode = ?request.mode,
            "Searching"
        );

        let base = self.workspace.root().to_path_buf();
        let job = tokio::task::spawn_blocking(move || search(&request, &base));

        let lines = match tokio::time::timeout(self.config.timeout, job).await {
            Ok(joined) => joined.map_err(|e| Error::Execution(e.to_string()))?,
            Err(_) => {
                warn!(timeout_secs = self.config.timeout.as_secs(), "Search timed out");
                return Ok(ToolResult::failure(
                    format!(
                        "Error: Search timed out after {} seconds",
                        self.config.timeout.as_secs()
                    ),
                    elapsed(),
                ));
            }
        };

        if lines.is_empty() {
            return Ok(ToolResult::success("No matches found", elapsed()));
        }

        let mut output = lines.join("\n");
        if output.chars().count() > self.config.output_limit {
            output = format!(
                "{}\n\n[Output truncated - exceeded {} characters]",
                copert_llm::util::truncate_chars(&output, self.config.output_limit),
                self.config.output_limit
            );
        }

        Ok(ToolResult::success(output, elapsed()))
    }
}
