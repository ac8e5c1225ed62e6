//! File tools - Read, write, edit, multi-edit and list

pub mod edit;
pub mod list;
pub mod multiedit;
pub mod read;
pub mod security;
#[cfg(test)]
mod tests;
pub mod write;

pub use edit::FileEditTool;
pub use list::FileListTool;
pub use multiedit::MultiEditTool;
pub use read::FileReadTool;
pub use write::FileWriteTool;

pub use security::{line_count, read_text, TextFile, Workspace};
