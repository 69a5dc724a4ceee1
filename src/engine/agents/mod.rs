// Agent Engine — Responder Agents
// Each responder consumes the tool results relevant to its concern and
// produces an AgentResponse. Shared rules: at most 4 suggestions, mean tool
// confidence (0.1 with no inputs) capped at 0.95 by the response constructor.

use crate::atoms::constants::MAX_AGENT_SUGGESTIONS;
use crate::atoms::types::{AgentId, AgentResponse, ToolResult, UserContext};
use async_trait::async_trait;

pub mod action;
pub mod emergency;
pub mod info;
pub mod report;

pub use action::ActionAgent;
pub use emergency::EmergencyAgent;
pub use info::InfoAgent;
pub use report::ReportAgent;

#[async_trait]
pub trait ResponderAgent: Send + Sync {
    fn id(&self) -> AgentId;

    async fn execute(
        &self,
        query: &str,
        user_context: &UserContext,
        tool_results: &[ToolResult],
    ) -> AgentResponse;
}

/// Instantiate the responder for an agent id.
pub fn agent_for(id: AgentId) -> Box<dyn ResponderAgent> {
    match id {
        AgentId::Info => Box::new(InfoAgent),
        AgentId::Action => Box::new(ActionAgent),
        AgentId::Emergency => Box::new(EmergencyAgent),
        AgentId::Report => Box::new(ReportAgent),
    }
}

/// Mean tool confidence; 0.1 when the agent received nothing relevant.
pub(crate) fn mean_confidence(results: &[ToolResult]) -> f64 {
    if results.is_empty() {
        return 0.1;
    }
    results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
}

/// Trim a suggestion list to the per-agent cap.
pub(crate) fn cap_suggestions(mut suggestions: Vec<String>) -> Vec<String> {
    suggestions.truncate(MAX_AGENT_SUGGESTIONS);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mean_confidence_defaults_low() {
        assert_eq!(mean_confidence(&[]), 0.1);
        let results = [
            ToolResult::new("a", json!({}), 0.6, "a"),
            ToolResult::new("b", json!({}), 0.8, "b"),
        ];
        assert!((mean_confidence(&results) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn suggestions_capped_at_four() {
        let caps = cap_suggestions((0..7).map(|i| format!("s{}", i)).collect());
        assert_eq!(caps.len(), 4);
    }
}
