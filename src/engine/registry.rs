// Agent Engine — Tool Registry
// Central lookup of data-gathering tools, keyed by unique name. Tools are
// trait objects behind `Arc` so the orchestrator can fan out without cloning
// the tool itself.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ToolInput, ToolResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

// ── Tool contract ──────────────────────────────────────────────────────────

/// A single data-gathering capability. Implementations decide relevance
/// themselves via `can_handle`; irrelevant tools return no result.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique registry key, e.g. "location", "websearch".
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Cheap keyword gate — decides whether `execute` is worth running.
    fn can_handle(&self, query: &str) -> bool;

    /// Produce a result for the query, or `Ok(None)` when the tool has
    /// nothing relevant to contribute.
    async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>>;
}

pub type DynTool = Arc<dyn Tool>;

// ── Registry ───────────────────────────────────────────────────────────────

/// Name-keyed tool collection. Registering a name that already exists
/// replaces the previous tool.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<&'static str, DynTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        ToolRegistry { tools: HashMap::new() }
    }

    pub fn register(&mut self, tool: DynTool) {
        let name = tool.name();
        if self.tools.insert(name, tool).is_some() {
            log::warn!("[registry] replaced existing tool: {}", name);
        } else {
            log::debug!("[registry] registered tool: {}", name);
        }
    }

    /// Remove a tool by name. Returns true when something was removed;
    /// unknown names are a no-op.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.tools.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<DynTool> {
        self.tools.get(name).cloned()
    }

    pub fn all(&self) -> Vec<DynTool> {
        self.tools.values().cloned().collect()
    }

    /// Registered names, sorted for deterministic iteration.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.tools.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn count(&self) -> usize {
        self.tools.len()
    }

    pub fn clear(&mut self) {
        self.tools.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::error::AgentResult;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &'static str {
            "echo"
        }
        fn description(&self) -> &'static str {
            "test tool"
        }
        fn can_handle(&self, _query: &str) -> bool {
            true
        }
        async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>> {
            Ok(Some(ToolResult::new(
                "echo",
                json!({ "query": input.query }),
                0.5,
                "echo",
            )))
        }
    }

    #[test]
    fn register_get_unregister() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        assert!(registry.has("echo"));
        assert_eq!(registry.count(), 1);
        assert!(registry.get("echo").is_some());

        assert!(registry.unregister("echo"));
        assert!(registry.get("echo").is_none());
        assert_eq!(registry.count(), 0);

        // Unknown name is a no-op.
        assert!(!registry.unregister("echo"));
    }

    #[test]
    fn register_same_name_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(EchoTool));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        assert_eq!(registry.names(), vec!["echo"]);
    }
}
