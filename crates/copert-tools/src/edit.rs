//! Atomic multi-edit engine
//!
//! Edits are exact-string substitutions applied in order, each one seeing the
//! output of the previous. The whole sequence is computed in memory; a file is
//! written at most once, after every edit succeeded.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// One substitution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOperation {
    /// Exact text to find
    pub old_string: String,
    /// Replacement text
    pub new_string: String,
    /// Replace every occurrence instead of requiring exactly one
    #[serde(default)]
    pub replace_all: bool,
}

impl EditOperation {
    /// Replace the single occurrence of `old` with `new`
    #[must_use]
    pub fn new(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            old_string: old.into(),
            new_string: new.into(),
            replace_all: false,
        }
    }

    /// Replace every occurrence of `old` with `new`
    #[must_use]
    pub fn replace_all(old: impl Into<String>, new: impl Into<String>) -> Self {
        Self {
            replace_all: true,
            ..Self::new(old, new)
        }
    }
}

/// Why an edit sequence was rejected. Indexes are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// Nothing to do
    #[error("No edits provided. Must provide at least one edit operation.")]
    Empty,

    /// `old_string` is empty
    #[error("Edit {index} has an empty old_string")]
    EmptyMatch {
        /// Failing edit
        index: usize,
    },

    /// `old_string == new_string`
    #[error("Edit {index} has identical old_string and new_string")]
    Identical {
        /// Failing edit
        index: usize,
    },

    /// `old_string` absent from the content as it stood before this edit
    #[error("Edit {index} failed - old_string not found in file (remember edits are applied sequentially)")]
    NotFound {
        /// Failing edit
        index: usize,
    },

    /// More than one match without `replace_all`
    #[error("Edit {index} failed - old_string appears {count} times in file. Use replace_all=true to replace all occurrences, or provide more context to make it unique.")]
    Ambiguous {
        /// Failing edit
        index: usize,
        /// Number of matches found
        count: usize,
    },
}

impl EditError {
    /// 1-based index of the failing edit, if the failure is tied to one
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Empty => None,
            Self::EmptyMatch { index }
            | Self::Identical { index }
            | Self::NotFound { index }
            | Self::Ambiguous { index, .. } => Some(*index),
        }
    }
}

/// Apply `operations` to `original`, returning the new content
///
/// Degenerate operations (empty or identical strings) are rejected before
/// anything is applied.
pub fn apply_edits(original: &str, operations: &[EditOperation]) -> Result<String, EditError> {
    if operations.is_empty() {
        return Err(EditError::Empty);
    }

    for (i, op) in operations.iter().enumerate() {
        let index = i + 1;
        if op.old_string.is_empty() {
            return Err(EditError::EmptyMatch { index });
        }
        if op.old_string == op.new_string {
            return Err(EditError::Identical { index });
        }
    }

    let mut content = original.to_string();
    for (i, op) in operations.iter().enumerate() {
        let index = i + 1;
        let count = content.matches(op.old_string.as_str()).count();

        if count == 0 {
            return Err(EditError::NotFound { index });
        }
        if count > 1 && !op.replace_all {
            return Err(EditError::Ambiguous { index, count });
        }

        content = if op.replace_all {
            content.replace(&op.old_string, &op.new_string)
        } else {
            content.replacen(&op.old_string, &op.new_string, 1)
        };
    }

    Ok(content)
}

/// Persist `updated` over `path` in one write
///
/// If the write fails, `original` is written back best-effort so the file
/// holds either the old or the new content.
pub async fn persist(path: &Path, original: &str, updated: &str) -> std::io::Result<()> {
    match tokio::fs::write(path, updated).await {
        Ok(()) => {
            debug!(path = %path.display(), bytes = updated.len(), "Edits persisted");
            Ok(())
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Write failed, restoring original content");
            if let Err(restore) = tokio::fs::write(path, original).await {
                warn!(path = %path.display(), error = %restore, "Restore failed");
            }
            Err(e)
        }
    }
}
