// Agent Engine — Tools
// Data-gathering tools behind the `Tool` trait. Each tool gates itself on a
// keyword list, returns `Ok(None)` when irrelevant, and degrades internal
// failures into a low-confidence (0.1) result instead of propagating.
//
// Module layout:
//   location        — safe areas and nearest-shelter data (0.9)
//   network         — operator coverage and recommendation (0.85)
//   social          — social media trends and sentiment (0.8)
//   emergency       — active alerts, contacts, safety tips (0.95)
//   notification    — notification drafting, sms/email/push/call (0.9)
//   websearch       — operator comparison / demographics / general (0.85)
//   first_aid       — knowledge-base search via the Search port
//   recommendation  — contextual-bandit personalized suggestions

use crate::engine::registry::ToolRegistry;
use crate::engine::search::Search;
use crate::engine::storage::Storage;
use std::sync::Arc;

pub mod emergency;
pub mod first_aid;
pub mod location;
pub mod network;
pub mod notification;
pub mod recommendation;
pub mod social;
pub mod websearch;

pub use emergency::EmergencyTool;
pub use first_aid::FirstAidTool;
pub use location::LocationTool;
pub use network::NetworkTool;
pub use notification::NotificationTool;
pub use recommendation::RecommendationTool;
pub use social::SocialTool;
pub use websearch::WebSearchTool;

/// Registry preloaded with the full default tool set.
pub fn create_default_registry(
    storage: Arc<dyn Storage>,
    search: Arc<dyn Search>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(LocationTool::new()));
    registry.register(Arc::new(NetworkTool::new()));
    registry.register(Arc::new(SocialTool::new()));
    registry.register(Arc::new(EmergencyTool::new(storage)));
    registry.register(Arc::new(NotificationTool::new()));
    registry.register(Arc::new(WebSearchTool::new()));
    registry.register(Arc::new(FirstAidTool::new(search)));
    registry.register(Arc::new(RecommendationTool::new()));
    registry
}

pub(crate) fn matches_any(query_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| query_lower.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::search::EmbeddedIndex;
    use crate::engine::storage::MemStorage;

    #[test]
    fn default_registry_has_all_tools() {
        let registry = create_default_registry(
            Arc::new(MemStorage::new()),
            Arc::new(EmbeddedIndex::with_first_aid_kb()),
        );
        assert_eq!(registry.count(), 8);
        for name in [
            "location",
            "network",
            "social",
            "emergency",
            "notification",
            "websearch",
            "first_aid",
            "recommendation",
        ] {
            assert!(registry.has(name), "missing tool: {}", name);
        }
    }
}
