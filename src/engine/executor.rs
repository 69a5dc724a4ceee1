// Agent Engine — Action Executor
// Maps a textual action description onto a concrete plan (single tool,
// web-search, fallback chain, or static data) and executes it. Failures
// produce an unsuccessful `ExecutionResult`, never an escaping error.

use crate::atoms::types::{ToolInput, ToolResult, UserContext};
use crate::engine::registry::ToolRegistry;
use log::{debug, warn};
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;
use std::time::Instant;

// ── Plans ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPlan {
    /// Run one named tool.
    ToolExecution { tool_name: &'static str },
    /// Web search only.
    WebSearch,
    /// Web search, then static data if the search contributes nothing.
    Fallback,
    /// Canned static answers.
    StaticData,
}

#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub success: bool,
    pub results: Vec<ToolResult>,
    pub error: Option<String>,
    pub execution_time_ms: u64,
    pub fallback_used: bool,
}

// ── Executor ───────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct ActionExecutor {
    history: Mutex<HashMap<String, Vec<ExecutionResult>>>,
}

impl ActionExecutor {
    pub fn new() -> Self {
        ActionExecutor::default()
    }

    /// First matching rule wins; unmatched actions fall through to a general
    /// web search.
    pub fn create_plan(action: &str) -> ActionPlan {
        let lower = action.to_lowercase();

        if lower.contains("fallback") {
            ActionPlan::Fallback
        } else if lower.contains("sonuç bulunamadı") || lower.contains("web search") {
            ActionPlan::WebSearch
        } else if lower.contains("hastane") && lower.contains("location") {
            ActionPlan::ToolExecution { tool_name: "location" }
        } else if lower.contains("ilkyardım") {
            ActionPlan::ToolExecution { tool_name: "first_aid" }
        } else if lower.contains("acil durum") {
            ActionPlan::ToolExecution { tool_name: "emergency" }
        } else if lower.contains("konum") {
            ActionPlan::ToolExecution { tool_name: "location" }
        } else {
            ActionPlan::ToolExecution { tool_name: "websearch" }
        }
    }

    pub async fn execute_action(
        &self,
        registry: &ToolRegistry,
        action: &str,
        query: &str,
        user_context: &UserContext,
    ) -> ExecutionResult {
        let start = Instant::now();
        debug!("[executor] action: {:?}", action);

        let plan = Self::create_plan(action);
        let fallback_used = matches!(plan, ActionPlan::Fallback | ActionPlan::WebSearch);
        let results = self.execute_plan(registry, &plan, query, user_context).await;

        let result = ExecutionResult {
            success: !results.is_empty() && results.iter().any(|r| r.confidence > 0.3),
            results,
            error: None,
            execution_time_ms: start.elapsed().as_millis() as u64,
            fallback_used,
        };

        self.history
            .lock()
            .entry(user_context.user_id.clone())
            .or_default()
            .push(result.clone());
        result
    }

    async fn execute_plan(
        &self,
        registry: &ToolRegistry,
        plan: &ActionPlan,
        query: &str,
        user_context: &UserContext,
    ) -> Vec<ToolResult> {
        match plan {
            ActionPlan::ToolExecution { tool_name } => {
                Self::run_tool(registry, tool_name, query, user_context).await
            }
            ActionPlan::WebSearch => {
                Self::run_tool(registry, "websearch", query, user_context).await
            }
            ActionPlan::Fallback => {
                let results = Self::run_tool(registry, "websearch", query, user_context).await;
                if results.is_empty() {
                    Self::static_data(query, user_context)
                } else {
                    results
                }
            }
            ActionPlan::StaticData => Self::static_data(query, user_context),
        }
    }

    async fn run_tool(
        registry: &ToolRegistry,
        tool_name: &str,
        query: &str,
        user_context: &UserContext,
    ) -> Vec<ToolResult> {
        let Some(tool) = registry.get(tool_name) else {
            warn!("[executor] tool not found: {}", tool_name);
            return Vec::new();
        };
        let input = ToolInput {
            query: query.to_string(),
            user_context: user_context.clone(),
        };
        match tool.execute(&input).await {
            Ok(Some(result)) => vec![result],
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("[executor] tool {} failed: {}", tool_name, err);
                Vec::new()
            }
        }
    }

    /// Canned last-resort answers, all tagged `fallback: true`.
    fn static_data(query: &str, user_context: &UserContext) -> Vec<ToolResult> {
        let lower = query.to_lowercase();

        if lower.contains("hastane") {
            return vec![ToolResult::new(
                "static_hospital",
                json!({
                    "query": query,
                    "results": [{
                        "title": "Genel Hastane Bilgisi",
                        "content": "Hastane bilgileri için lütfen 112 Acil Çağrı Merkezi'ni arayın veya en yakın sağlık kuruluşuna başvurun.",
                        "location": user_context.district_or("Bilinmiyor"),
                        "phone": "112",
                    }],
                    "fallback": true,
                }),
                0.4,
                "static_data",
            )];
        }

        if lower.contains("yaşam üçgeni") || lower.contains("ilkyardım") {
            return vec![ToolResult::new(
                "static_first_aid",
                json!({
                    "query": query,
                    "results": [{
                        "title": "Yaşam Üçgeni - Deprem Anında",
                        "content": "Deprem anında yaşam üçgeni oluşturmak için:\n1. Sağlam masa, sıra veya yatak yanına geçin\n2. Çömel, kapan, tutun pozisyonu alın\n3. Başınızı ve boynunuzu koruyacak şekilde kapanın\n4. Pencerelerden, ağır eşyalardan uzak durun\n5. Asansör kullanmayın, merdivenlerden inmeyin\n6. Dışarı çıkmaya çalışmayın, içeride kalın",
                        "category": "deprem_güvenlik",
                    }],
                    "fallback": true,
                }),
                0.8,
                "static_data",
            )];
        }

        vec![ToolResult::new(
            "static_general",
            json!({
                "query": query,
                "results": [{
                    "title": "Genel Bilgi",
                    "content": format!(
                        "\"{}\" konusunda detaylı bilgi için lütfen daha spesifik bir soru sorun veya 112 Acil Çağrı Merkezi'ni arayın.",
                        query,
                    ),
                    "fallback": true,
                }],
                "fallback": true,
            }),
            0.3,
            "static_data",
        )]
    }

    pub fn clear_history(&self, user_id: &str) {
        self.history.lock().remove(user_id);
    }

    pub fn history(&self, user_id: &str) -> Vec<ExecutionResult> {
        self.history.lock().get(user_id).cloned().unwrap_or_default()
    }

    /// Aggregate execution statistics across all users.
    pub fn execution_stats(&self) -> serde_json::Value {
        let history = self.history.lock();
        let all: Vec<&ExecutionResult> = history.values().flatten().collect();
        let avg_time = if all.is_empty() {
            0.0
        } else {
            all.iter().map(|r| r.execution_time_ms as f64).sum::<f64>() / all.len() as f64
        };
        json!({
            "totalExecutions": all.len(),
            "successfulExecutions": all.iter().filter(|r| r.success).count(),
            "averageExecutionTime": avg_time,
            "fallbackUsage": all.iter().filter(|r| r.fallback_used).count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::search::EmbeddedIndex;
    use crate::engine::storage::MemStorage;
    use crate::engine::tools::create_default_registry;
    use std::sync::Arc;

    fn make_registry() -> ToolRegistry {
        create_default_registry(
            Arc::new(MemStorage::new()),
            Arc::new(EmbeddedIndex::with_first_aid_kb()),
        )
    }

    #[test]
    fn plan_matching_order() {
        assert_eq!(ActionExecutor::create_plan("fallback uygula"), ActionPlan::Fallback);
        assert_eq!(
            ActionExecutor::create_plan("sonuç bulunamadı, tekrar dene"),
            ActionPlan::WebSearch
        );
        assert_eq!(
            ActionExecutor::create_plan("hastane location araması"),
            ActionPlan::ToolExecution { tool_name: "location" }
        );
        assert_eq!(
            ActionExecutor::create_plan("ilkyardım bilgisi getir"),
            ActionPlan::ToolExecution { tool_name: "first_aid" }
        );
        assert_eq!(
            ActionExecutor::create_plan("acil durum bilgisi"),
            ActionPlan::ToolExecution { tool_name: "emergency" }
        );
        assert_eq!(
            ActionExecutor::create_plan("konum bilgisi al"),
            ActionPlan::ToolExecution { tool_name: "location" }
        );
        assert_eq!(
            ActionExecutor::create_plan("başka bir şey"),
            ActionPlan::ToolExecution { tool_name: "websearch" }
        );
    }

    #[tokio::test]
    async fn static_hospital_fallback() {
        let ctx = UserContext::new("u1");
        let results = ActionExecutor::static_data("en yakın hastane", &ctx);
        assert_eq!(results[0].kind, "static_hospital");
        assert_eq!(results[0].confidence, 0.4);
        assert_eq!(results[0].data["fallback"], true);
    }

    #[tokio::test]
    async fn static_first_aid_and_general() {
        let ctx = UserContext::new("u1");
        let first_aid = ActionExecutor::static_data("yaşam üçgeni nedir", &ctx);
        assert_eq!(first_aid[0].kind, "static_first_aid");
        assert_eq!(first_aid[0].confidence, 0.8);

        let general = ActionExecutor::static_data("hava durumu", &ctx);
        assert_eq!(general[0].kind, "static_general");
        assert_eq!(general[0].confidence, 0.3);
    }

    #[tokio::test]
    async fn execute_records_history_and_stats() {
        let executor = ActionExecutor::new();
        let registry = make_registry();
        let ctx = UserContext::new("u1");

        let result = executor
            .execute_action(&registry, "konum bilgisi al", "toplanma alanı nerede", &ctx)
            .await;
        assert!(result.success);
        assert!(!result.fallback_used);

        assert_eq!(executor.history("u1").len(), 1);
        let stats = executor.execution_stats();
        assert_eq!(stats["totalExecutions"], 1);
        assert_eq!(stats["successfulExecutions"], 1);

        executor.clear_history("u1");
        assert!(executor.history("u1").is_empty());
    }
}
