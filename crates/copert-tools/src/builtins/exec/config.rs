/// Default command timeout in milliseconds (2 minutes)
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Largest timeout a caller may request in milliseconds (10 minutes)
pub const MAX_TIMEOUT_MS: u64 = 600_000;

/// Combined output beyond this many characters is cut
pub const DEFAULT_OUTPUT_LIMIT: usize = 30_000;

/// Configuration for the shell tool
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Interpreter the command string is handed to (`<shell> -c <command>`)
    pub shell: String,
    /// Timeout when the caller does not give one
    pub default_timeout_ms: u64,
    /// Cap on caller-supplied timeouts
    pub max_timeout_ms: u64,
    /// Output truncation limit in characters
    pub output_limit: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            shell: "sh".to_string(),
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
            max_timeout_ms: MAX_TIMEOUT_MS,
            output_limit: DEFAULT_OUTPUT_LIMIT,
        }
    }
}

impl ExecConfig {
    /// Effective timeout for a request
    #[must_use]
    pub fn effective_timeout_ms(&self, requested: Option<u64>) -> u64 {
        requested
            .filter(|ms| *ms > 0)
            .unwrap_or(self.default_timeout_ms)
            .min(self.max_timeout_ms)
    }
}
