//! Sub-agent classes

use crate::prompts;
use copert_tools::ToolKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of sub-agent kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubAgentClass {
    /// Read-only research and analysis
    GeneralPurpose,
    /// Multi-file implementation without command execution
    CodeWriter,
    /// Writes `COPERT.md`
    ProjectInit,
}

const GENERAL_PURPOSE_TOOLS: &[ToolKind] = &[
    ToolKind::ReadFile,
    ToolKind::Ls,
    ToolKind::Grep,
    ToolKind::Glob,
    ToolKind::WebFetch,
    ToolKind::WebSearch,
];

const CODE_WRITER_TOOLS: &[ToolKind] = &[
    ToolKind::ReadFile,
    ToolKind::WriteFile,
    ToolKind::EditFile,
    ToolKind::MultiEdit,
    ToolKind::Ls,
    ToolKind::Grep,
    ToolKind::Glob,
];

const PROJECT_INIT_TOOLS: &[ToolKind] = &[
    ToolKind::ReadFile,
    ToolKind::WriteFile,
    ToolKind::Ls,
    ToolKind::Grep,
    ToolKind::Glob,
    ToolKind::ReadCopertMd,
    ToolKind::WriteCopertMd,
];

impl SubAgentClass {
    /// Every class
    pub const ALL: [SubAgentClass; 3] = [Self::GeneralPurpose, Self::CodeWriter, Self::ProjectInit];

    /// Name used in `subagent_type`
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GeneralPurpose => "general-purpose",
            Self::CodeWriter => "code-writer",
            Self::ProjectInit => "project-init",
        }
    }

    /// Look a class up by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|class| class.name() == name)
    }

    /// Tools the class may use; never includes `task` or `init`
    #[must_use]
    pub fn tools(self) -> &'static [ToolKind] {
        match self {
            Self::GeneralPurpose => GENERAL_PURPOSE_TOOLS,
            Self::CodeWriter => CODE_WRITER_TOOLS,
            Self::ProjectInit => PROJECT_INIT_TOOLS,
        }
    }

    /// System prompt of the class
    #[must_use]
    pub fn prompt(self) -> &'static str {
        match self {
            Self::GeneralPurpose => prompts::GENERAL_PURPOSE_PROMPT,
            Self::CodeWriter => prompts::CODE_WRITER_PROMPT,
            Self::ProjectInit => prompts::PROJECT_INIT_PROMPT,
        }
    }

    /// One-line summary for listings
    #[must_use]
    pub fn summary(self) -> &'static str {
        match self {
            Self::GeneralPurpose => "Read-only research and codebase analysis",
            Self::CodeWriter => "Code implementation across files (no command execution)",
            Self::ProjectInit => "Creates COPERT.md (used by init)",
        }
    }

    /// Comma-separated list of valid names
    #[must_use]
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|class| class.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SubAgentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SubAgentClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            format!(
                "Error: Invalid subagent_type '{s}'. Valid types: {}",
                Self::valid_names()
            )
        })
    }
}
