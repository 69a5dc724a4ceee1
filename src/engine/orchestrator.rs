// Agent Engine — Tool Orchestrator
// Fans a query out to the registered tools with bounded concurrency and a
// per-tool timeout. Tool errors and timeouts never fail the fan-out; they
// just contribute no result. The merged list is sorted by source name so
// downstream consumers see a deterministic order.

use crate::atoms::constants::{TOOL_CONCURRENCY, TOOL_TIMEOUT_SECS};
use crate::atoms::types::{ToolInput, ToolResult, UserContext};
use crate::engine::registry::{DynTool, ToolRegistry};
use futures::stream::{self, StreamExt};
use log::{debug, warn};
use serde_json::json;
use std::time::Duration;

pub struct ToolOrchestrator;

impl ToolOrchestrator {
    async fn run_one(tool: DynTool, input: ToolInput) -> Option<ToolResult> {
        let name = tool.name();
        if !tool.can_handle(&input.query) {
            return None;
        }

        let timeout = Duration::from_secs(TOOL_TIMEOUT_SECS);
        match tokio::time::timeout(timeout, tool.execute(&input)).await {
            Ok(Ok(result)) => {
                if result.is_some() {
                    debug!("[orchestrator] tool {} produced a result", name);
                }
                result
            }
            Ok(Err(err)) => {
                warn!("[orchestrator] tool {} failed: {}", name, err);
                None
            }
            Err(_) => {
                warn!("[orchestrator] tool {} timed out after {}s", name, TOOL_TIMEOUT_SECS);
                None
            }
        }
    }

    /// Run every registered tool against the query. At most
    /// `TOOL_CONCURRENCY` tools are in flight at once.
    pub async fn execute_tools(
        registry: &ToolRegistry,
        query: &str,
        user_context: &UserContext,
    ) -> Vec<ToolResult> {
        let tools = registry.all();
        debug!("[orchestrator] fanning out to {} tools", tools.len());

        let mut results: Vec<ToolResult> = stream::iter(tools.into_iter().map(|tool| {
            let input = ToolInput {
                query: query.to_string(),
                user_context: user_context.clone(),
            };
            Self::run_one(tool, input)
        }))
        .buffer_unordered(TOOL_CONCURRENCY)
        .filter_map(|result| async move { result })
        .collect()
        .await;

        results.sort_by(|a, b| a.source.cmp(&b.source));
        debug!("[orchestrator] {} tools produced results", results.len());
        results
    }

    /// Run only the named tools, in the given order. Unknown names are
    /// skipped with a warning.
    pub async fn execute_specific(
        registry: &ToolRegistry,
        tool_names: &[&str],
        query: &str,
        user_context: &UserContext,
    ) -> Vec<ToolResult> {
        let mut results = Vec::new();
        for name in tool_names {
            let Some(tool) = registry.get(name) else {
                warn!("[orchestrator] tool not found: {}", name);
                continue;
            };
            let input = ToolInput {
                query: query.to_string(),
                user_context: user_context.clone(),
            };
            if let Some(result) = Self::run_one(tool, input).await {
                results.push(result);
            }
        }
        results
    }

    /// Summary statistics over one fan-out's results.
    pub fn execution_stats(registry: &ToolRegistry, results: &[ToolResult]) -> serde_json::Value {
        let avg = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
        };
        json!({
            "totalTools": registry.count(),
            "successfulTools": results.len(),
            "averageConfidence": (avg * 100.0).round() / 100.0,
            "toolTypes": results.iter().map(|r| r.kind.clone()).collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::error::{AgentError, AgentResult};
    use crate::engine::registry::Tool;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedTool {
        name: &'static str,
        confidence: f64,
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &'static str {
            self.name
        }
        fn description(&self) -> &'static str {
            "test"
        }
        fn can_handle(&self, _query: &str) -> bool {
            true
        }
        async fn execute(&self, _input: &ToolInput) -> AgentResult<Option<ToolResult>> {
            Ok(Some(ToolResult::new(self.name, json!({}), self.confidence, self.name)))
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn description(&self) -> &'static str {
            "test"
        }
        fn can_handle(&self, _query: &str) -> bool {
            true
        }
        async fn execute(&self, _input: &ToolInput) -> AgentResult<Option<ToolResult>> {
            Err(AgentError::tool("failing", "boom"))
        }
    }

    fn make_registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(FixedTool { name: "zeta", confidence: 0.8 }));
        registry.register(Arc::new(FixedTool { name: "alpha", confidence: 0.6 }));
        registry.register(Arc::new(FailingTool));
        registry
    }

    #[tokio::test]
    async fn merged_results_sorted_by_source_and_errors_dropped() {
        let registry = make_registry();
        let ctx = UserContext::new("u1");
        let results = ToolOrchestrator::execute_tools(&registry, "soru", &ctx).await;

        let sources: Vec<&str> = results.iter().map(|r| r.source.as_str()).collect();
        assert_eq!(sources, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn specific_execution_skips_unknown_names() {
        let registry = make_registry();
        let ctx = UserContext::new("u1");
        let results =
            ToolOrchestrator::execute_specific(&registry, &["alpha", "missing"], "soru", &ctx)
                .await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source, "alpha");
    }

    #[tokio::test]
    async fn stats_reflect_results() {
        let registry = make_registry();
        let ctx = UserContext::new("u1");
        let results = ToolOrchestrator::execute_tools(&registry, "soru", &ctx).await;
        let stats = ToolOrchestrator::execution_stats(&registry, &results);
        assert_eq!(stats["totalTools"], 3);
        assert_eq!(stats["successfulTools"], 2);
        assert_eq!(stats["averageConfidence"], 0.7);
    }
}
