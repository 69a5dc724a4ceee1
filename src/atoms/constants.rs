// ── Atoms: Constants ───────────────────────────────────────────────────────
// Numeric caps and limits shared across the engine.

/// Maximum entries kept in each bounded memory list (FIFO, oldest dropped).
pub const MAX_HISTORY: usize = 50;

/// Maximum suggestions in a combined response.
pub const MAX_SUGGESTIONS: usize = 6;

/// Maximum suggestions a single responder agent emits.
pub const MAX_AGENT_SUGGESTIONS: usize = 4;

/// Queries longer than this are rejected before any tool runs.
pub const MAX_QUERY_CHARS: usize = 1000;

/// Keyword extraction returns at most this many tokens.
pub const MAX_KEYWORDS: usize = 5;

/// Per-tool execution deadline during fan-out.
pub const TOOL_TIMEOUT_SECS: u64 = 10;

/// How many tools may run concurrently during fan-out.
pub const TOOL_CONCURRENCY: usize = 4;

/// How many recent conversation turns the relevance filter scans.
pub const RELEVANCE_WINDOW: usize = 10;

/// Shared-word threshold for a past turn to count as relevant.
pub const MIN_SHARED_WORDS: usize = 2;

/// Words at or below this length are ignored by the relevance filter.
pub const RELEVANCE_MIN_WORD_LEN: usize = 3;
