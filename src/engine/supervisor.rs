// Agent Engine — Supervisor
// Turns a classified query plus the tool fan-out into one decision: which
// responder agents run, at what priority, and why. Selection is additive and
// never empty — with nothing matched, the info agent answers alone.

use crate::atoms::types::{AgentId, Priority, SupervisorDecision, ToolResult};
use crate::engine::classify::{Category, Classification, Complexity};
use log::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct SupervisorAgent;

impl SupervisorAgent {
    pub fn new() -> Self {
        SupervisorAgent
    }

    pub fn coordinate(
        &self,
        classification: &Classification,
        tool_results: &[ToolResult],
    ) -> SupervisorDecision {
        let selected_agents = Self::select_agents(classification);
        let priority = Self::determine_priority(classification, tool_results);
        let estimated_time_ms = Self::estimated_time(&selected_agents, classification);
        let reasoning = Self::reasoning(classification, &selected_agents, priority);

        debug!(
            "[supervisor] agents={:?} priority={:?}",
            selected_agents, priority
        );

        SupervisorDecision { selected_agents, priority, reasoning, estimated_time_ms }
    }

    fn select_agents(classification: &Classification) -> Vec<AgentId> {
        let facets = &classification.facets;
        let categories = &classification.categories;
        let mut selected = Vec::new();

        if facets.is_emergency {
            selected.push(AgentId::Emergency);
        }
        if facets.is_info_request
            || categories.contains(&Category::Location)
            || categories.contains(&Category::Network)
            || categories.contains(&Category::Social)
        {
            selected.push(AgentId::Info);
        }
        if facets.is_action_request
            || categories.contains(&Category::Notification)
            || categories.contains(&Category::Emergency)
        {
            selected.push(AgentId::Action);
        }
        if facets.is_report_request || classification.complexity == Complexity::High {
            selected.push(AgentId::Report);
        }

        if selected.is_empty() {
            selected.push(AgentId::Info);
        }
        selected.dedup();
        selected
    }

    fn determine_priority(
        classification: &Classification,
        tool_results: &[ToolResult],
    ) -> Priority {
        if classification.facets.is_emergency {
            return Priority::Critical;
        }
        if tool_results
            .iter()
            .any(|r| r.kind == "emergency" && r.confidence > 0.8)
        {
            return Priority::Critical;
        }
        if classification.complexity == Complexity::High
            || classification.categories.contains(&Category::Emergency)
        {
            return Priority::High;
        }
        if classification.categories.len() > 2 || classification.facets.is_action_request {
            return Priority::Medium;
        }
        Priority::Low
    }

    fn estimated_time(agents: &[AgentId], classification: &Classification) -> u64 {
        let mut time: u64 = 1000;
        time += agents.len() as u64 * 500;
        time += match classification.complexity {
            Complexity::High => 2000,
            Complexity::Medium => 1000,
            Complexity::Low => 0,
        };
        if classification.facets.is_emergency {
            time += 1500;
        }
        time
    }

    fn reasoning(
        classification: &Classification,
        agents: &[AgentId],
        priority: Priority,
    ) -> String {
        let mut reasons: Vec<String> = Vec::new();

        if classification.facets.is_emergency {
            reasons.push("Acil durum tespit edildi".to_string());
        }
        if classification.facets.is_info_request {
            reasons.push("Bilgi talebi tespit edildi".to_string());
        }
        if classification.facets.is_action_request {
            reasons.push("Aksiyon talebi tespit edildi".to_string());
        }
        if classification.complexity == Complexity::High {
            reasons.push("Karmaşık sorgu, çoklu agent gerekli".to_string());
        }

        let names: Vec<&str> = agents.iter().map(AgentId::as_str).collect();
        reasons.push(format!("Seçilen agent'lar: {}", names.join(", ")));
        let priority_name = match priority {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        };
        reasons.push(format!("Öncelik: {}", priority_name));

        reasons.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::classify;
    use serde_json::json;

    fn decide(query: &str, tool_results: &[ToolResult]) -> SupervisorDecision {
        SupervisorAgent::new().coordinate(&classify::classify(query), tool_results)
    }

    #[test]
    fn unmatched_query_defaults_to_info() {
        let decision = decide("xyz123", &[]);
        assert_eq!(decision.selected_agents, vec![AgentId::Info]);
        assert_eq!(decision.priority, Priority::Low);
    }

    #[test]
    fn emergency_query_is_critical_and_includes_emergency_agent() {
        let decision = decide("acil yardım lazım bana", &[]);
        assert!(decision.selected_agents.contains(&AgentId::Emergency));
        assert_eq!(decision.priority, Priority::Critical);
        assert!(decision.reasoning.contains("Acil durum tespit edildi"));
    }

    #[test]
    fn high_confidence_emergency_tool_result_raises_priority() {
        let results = [ToolResult::new("emergency", json!({}), 0.95, "emergency")];
        let decision = decide("bugün hava nasıl acaba", &results);
        assert_eq!(decision.priority, Priority::Critical);
    }

    #[test]
    fn report_agent_on_high_complexity() {
        let decision = decide("bölgedeki şebeke durumu hakkında detaylı analiz raporu çıkar", &[]);
        assert!(decision.selected_agents.contains(&AgentId::Report));
    }

    #[test]
    fn estimated_time_accumulates() {
        let decision = decide("acil yardım lazım bana", &[]);
        // base 1000 + agents*500 + emergency 1500 + complexity bonus
        assert!(decision.estimated_time_ms >= 1000 + 500 + 1500);
    }

    #[test]
    fn agents_are_deduplicated() {
        let decision = decide("acil durum bildirimi gönder, konum bilgisi ver", &[]);
        let mut seen = decision.selected_agents.clone();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), decision.selected_agents.len());
    }
}
