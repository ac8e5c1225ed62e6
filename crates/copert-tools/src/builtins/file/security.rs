//! Path resolution and safe text loading shared by the file tools

use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// System directories the mutating tools refuse to touch
const BLOCKED_WRITE_DIRECTORIES: &[&str] = &[
    "/etc", "/boot", "/dev", "/proc", "/sys", "/bin", "/sbin", "/usr/bin", "/usr/sbin",
];

/// The directory relative paths are resolved against
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Workspace root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path
    ///
    /// Relative paths are joined onto the root; `.` and `..` components are
    /// folded lexically so the result reads the way the user meant it.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let raw = raw.trim();
        let joined = if raw.is_empty() {
            self.root.clone()
        } else {
            let path = Path::new(raw);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.root.join(path)
            }
        };
        normalize(&joined)
    }

    /// Resolve a path for writing, refusing system directories
    pub fn resolve_for_write(&self, raw: &str) -> Result<PathBuf> {
        let path = self.resolve(raw);
        if BLOCKED_WRITE_DIRECTORIES
            .iter()
            .any(|blocked| path.starts_with(blocked))
        {
            warn!(path = %path.display(), "Blocked write to system directory");
            return Err(Error::PermissionDenied(format!(
                "writing to '{}' is not allowed",
                path.display()
            )));
        }
        Ok(path)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Outcome of loading a file as text
#[derive(Debug)]
pub enum TextFile {
    /// UTF-8 content
    Text(String),
    /// Path does not exist
    Missing,
    /// Path exists but is not a regular file
    NotAFile,
    /// Content is not valid UTF-8
    Binary,
}

/// Load a file as UTF-8 text, classifying the common failures
pub async fn read_text(path: &Path) -> Result<TextFile> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TextFile::Missing),
        Err(e) => return Err(Error::Io(e)),
    };
    if !metadata.is_file() {
        return Ok(TextFile::NotAFile);
    }

    let bytes = tokio::fs::read(path).await?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => TextFile::Text(text),
        Err(_) => TextFile::Binary,
    })
}

/// Line count as reported to the model: newlines plus one, zero when empty
#[must_use]
pub fn line_count(content: &str) -> usize {
    if content.is_empty() {
        0
    } else {
        content.matches('\n').count() + 1
    }
}
