// ── Atoms: Core Types ──────────────────────────────────────────────────────
// Shared data model for the whole pipeline. Wire-shaped types carry serde
// derives with camelCase renames so the HTTP layer can pass them through
// unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ── User context ───────────────────────────────────────────────────────────

/// Geographic position attached to a user context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub district: String,
    pub city: String,
}

/// Caller-owned identity and situational context. Passed by value into every
/// component; enrichment produces a new copy, never mutates the caller's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: String,
    #[serde(default)]
    pub location: Option<GeoLocation>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub preferences: HashMap<String, Value>,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        UserContext {
            user_id: user_id.into(),
            location: None,
            operator: None,
            age: None,
            preferences: HashMap::new(),
        }
    }

    /// District name, or the fallback when no location is attached.
    pub fn district_or(&self, fallback: &str) -> String {
        self.location
            .as_ref()
            .map(|l| l.district.clone())
            .unwrap_or_else(|| fallback.to_string())
    }
}

// ── Tool contract shapes ───────────────────────────────────────────────────

/// Input handed to every tool invocation.
#[derive(Debug, Clone)]
pub struct ToolInput {
    pub query: String,
    pub user_context: UserContext,
}

/// Typed, confidence-scored payload produced by one tool invocation.
/// Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Type tag, e.g. "location", "emergency", "recommendation".
    pub kind: String,
    /// Opaque payload; agents know the shapes for the kinds they consume.
    pub data: Value,
    /// Always within [0, 1].
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    /// Name of the tool that produced this result.
    pub source: String,
}

impl ToolResult {
    /// Build a result with the confidence clamped into [0, 1].
    pub fn new(
        kind: impl Into<String>,
        data: Value,
        confidence: f64,
        source: impl Into<String>,
    ) -> Self {
        ToolResult {
            kind: kind.into(),
            data,
            confidence: confidence.clamp(0.0, 1.0),
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}

// ── Priorities and severities ──────────────────────────────────────────────

/// Urgency scale shared by action items, supervisor decisions, and report
/// sections. Ordering: Low < Medium < High < Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Emergency tier detected in a query. Tiers are tested critical-first, so a
/// query matching several tiers always lands on the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Query sentiment heuristic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

// ── Action items ───────────────────────────────────────────────────────────

/// Concern an action item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Network,
    Location,
    Emergency,
    Social,
    Notification,
    Report,
}

/// A concrete follow-up derived from tool evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionItem {
    pub kind: ActionKind,
    pub title: String,
    pub data: Value,
    pub priority: Priority,
}

// ── Agent responses ────────────────────────────────────────────────────────

/// Response produced by a responder agent or the final combiner.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentResponse {
    pub message: String,
    /// Ordered, deduplicated, at most 6 entries in combined responses.
    pub suggestions: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub tool_results: Vec<ToolResult>,
    /// Always within [0, 0.95].
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl AgentResponse {
    /// Build a response with the confidence clamped into [0, 0.95].
    pub fn new(
        message: impl Into<String>,
        suggestions: Vec<String>,
        action_items: Vec<ActionItem>,
        tool_results: Vec<ToolResult>,
        confidence: f64,
    ) -> Self {
        AgentResponse {
            message: message.into(),
            suggestions,
            action_items,
            tool_results,
            confidence: confidence.clamp(0.0, 0.95),
            timestamp: Utc::now(),
        }
    }
}

// ── Supervisor decisions ───────────────────────────────────────────────────

/// Responder agents the supervisor can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    Info,
    Action,
    Emergency,
    Report,
}

impl AgentId {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentId::Info => "info",
            AgentId::Action => "action",
            AgentId::Emergency => "emergency",
            AgentId::Report => "report",
        }
    }
}

/// One decision per query: which agents run, how urgent, and why.
/// `selected_agents` is never empty — the supervisor defaults to `{info}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupervisorDecision {
    pub selected_agents: Vec<AgentId>,
    pub priority: Priority,
    pub reasoning: String,
    pub estimated_time_ms: u64,
}

// ── Memory ─────────────────────────────────────────────────────────────────

/// One completed query/response exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub query: String,
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// One location observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationEntry {
    pub location: String,
    pub timestamp: DateTime<Utc>,
}

/// Bounded per-user rolling window of recent queries, responses, locations,
/// and preferences. Every list is capped at `MAX_HISTORY` entries, FIFO.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryContext {
    pub user_id: String,
    pub recent_queries: Vec<String>,
    pub user_preferences: HashMap<String, Value>,
    pub location_history: Vec<LocationEntry>,
    pub conversation_history: Vec<ConversationTurn>,
}

impl MemoryContext {
    pub fn empty(user_id: impl Into<String>) -> Self {
        MemoryContext {
            user_id: user_id.into(),
            recent_queries: Vec::new(),
            user_preferences: HashMap::new(),
            location_history: Vec::new(),
            conversation_history: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_result_confidence_is_clamped() {
        let high = ToolResult::new("location", json!({}), 1.7, "location");
        assert_eq!(high.confidence, 1.0);
        let low = ToolResult::new("location", json!({}), -0.2, "location");
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn agent_response_confidence_capped_at_095() {
        let resp = AgentResponse::new("ok", vec![], vec![], vec![], 0.99);
        assert_eq!(resp.confidence, 0.95);
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Critical > Priority::High);
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }

    #[test]
    fn user_context_district_fallback() {
        let ctx = UserContext::new("u1");
        assert_eq!(ctx.district_or("Bilinmiyor"), "Bilinmiyor");
    }
}
