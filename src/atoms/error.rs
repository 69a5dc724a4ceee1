// ── Atoms: Error Types ─────────────────────────────────────────────────────
// Single canonical error enum for the agent core, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (query, tool, plan, synthesis…).
//   • `#[from]` wires std/external error conversions automatically.
//   • Component-level failures are caught at that component's boundary and
//     converted to degraded results; only CoreAgent sees escaping errors.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum AgentError {
    /// Query rejected before any tool runs (empty or over the length cap).
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A tool raised during execution. Callers convert this into an empty
    /// result list rather than propagating.
    #[error("Tool error: {tool}: {message}")]
    Tool { tool: String, message: String },

    /// An action plan could not be executed (unknown plan type).
    #[error("Plan error: {0}")]
    Plan(String),

    /// LLM synthesis failed (call error or unparseable reply). Degrades to
    /// the merged-text fallback, never fails the overall request.
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// SQLite / rusqlite persistence failure.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for errors that do not yet have a dedicated variant.
    /// Prefer adding a specific variant over using this in new code.
    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl AgentError {
    /// Create a tool error with name and message.
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool { tool: tool.into(), message: message.into() }
    }

    /// Create a synthesis error from any displayable cause.
    pub fn synthesis(message: impl Into<String>) -> Self {
        Self::Synthesis(message.into())
    }
}

impl From<String> for AgentError {
    fn from(s: String) -> Self {
        AgentError::Other(s)
    }
}

impl From<&str> for AgentError {
    fn from(s: &str) -> Self {
        AgentError::Other(s.to_string())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All agent-core operations should return this type.
pub type AgentResult<T> = Result<T, AgentError>;
