//! Search tools - regex content search and filename globbing
//!
//! Both are read-only. Hidden entries and common build/dependency
//! directories are skipped while walking.

pub mod glob;
pub mod grep;
#[cfg(test)]
mod tests;

pub use self::glob::GlobTool;
pub use grep::{GrepConfig, GrepTool, OutputMode};

use std::path::{Path, PathBuf};

/// Directories never descended into
const SKIPPED_DIRECTORIES: &[&str] = &["target", "node_modules", "__pycache__", "dist", "build"];

fn match_options() -> ::glob::MatchOptions {
    ::glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: true,
    }
}

fn is_skipped(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .any(|c| {
            let name = c.as_os_str().to_string_lossy();
            SKIPPED_DIRECTORIES.contains(&name.as_ref())
        })
}

/// Every regular file under `root` matching `pattern` (relative to `root`)
pub(crate) fn walk_files(root: &Path, pattern: &str) -> Vec<PathBuf> {
    let escaped = ::glob::Pattern::escape(&root.to_string_lossy());
    let full = format!("{}/{}", escaped.trim_end_matches('/'), pattern);

    match ::glob::glob_with(&full, match_options()) {
        Ok(paths) => paths
            .filter_map(std::result::Result::ok)
            .filter(|p| p.is_file() && !is_skipped(root, p))
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Display `path` relative to `base` when possible
pub(crate) fn relative_display(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}
