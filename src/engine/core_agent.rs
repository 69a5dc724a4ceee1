// Agent Engine — Core Agent
// The full pipeline behind one `process_query` call: validate, short-circuit
// greetings, classify, fan out to tools, let the supervisor pick responder
// agents, combine their answers, and record the exchange in memory. Any
// escaping error becomes an apology response; the call itself never fails.

use crate::atoms::types::{AgentResponse, MemoryContext, UserContext};
use crate::engine::agents::agent_for;
use crate::engine::classify;
use crate::engine::executor::{ActionExecutor, ExecutionResult};
use crate::engine::greeting::GreetingHandler;
use crate::engine::memory::MemoryStore;
use crate::engine::orchestrator::ToolOrchestrator;
use crate::engine::providers::Completion;
use crate::engine::query::QueryProcessor;
use crate::engine::registry::ToolRegistry;
use crate::engine::response::ResponseGenerator;
use crate::engine::search::Search;
use crate::engine::storage::Storage;
use crate::engine::supervisor::SupervisorAgent;
use crate::engine::tools::{create_default_registry, RecommendationTool};
use log::{debug, info};
use serde_json::json;
use std::sync::Arc;

pub struct CoreAgent {
    registry: ToolRegistry,
    memory: MemoryStore,
    executor: ActionExecutor,
    recommendation: Arc<RecommendationTool>,
    completion: Arc<dyn Completion>,
    query_processor: QueryProcessor,
    greeting: GreetingHandler,
    supervisor: SupervisorAgent,
}

impl CoreAgent {
    pub fn new(
        storage: Arc<dyn Storage>,
        search: Arc<dyn Search>,
        completion: Arc<dyn Completion>,
    ) -> Self {
        let mut registry = create_default_registry(storage.clone(), search);
        // Keep a handle on the bandit so feedback can reach it later.
        let recommendation = Arc::new(RecommendationTool::new());
        registry.register(recommendation.clone());

        CoreAgent {
            registry,
            memory: MemoryStore::new(storage),
            executor: ActionExecutor::new(),
            recommendation,
            completion,
            query_processor: QueryProcessor::new(),
            greeting: GreetingHandler::new(),
            supervisor: SupervisorAgent::new(),
        }
    }

    /// Answer one user query end to end.
    pub async fn process_query(&self, query: &str, user_context: &UserContext) -> AgentResponse {
        if let Err(err) = self.query_processor.validate_query(query) {
            return Self::error_response(&err.to_string());
        }

        let classification = classify::classify(query);
        info!(
            "[core] query from {}: level={:?} categories={:?}",
            user_context.user_id, classification.severity, classification.categories,
        );

        if classification.is_greeting {
            let response = self.greeting.greeting_response();
            self.memory.update_context(
                &user_context.user_id,
                query,
                &response.message,
                Some(user_context),
            );
            return response;
        }

        // Tools and agents see the detected emergency level as a preference
        // on their own copy of the context; the caller's stays untouched.
        let mut enriched = user_context.clone();
        enriched
            .preferences
            .insert("emergencyLevel".to_string(), json!(classification.severity.as_str()));

        let relevant_context = self.memory.get_relevant_context(&user_context.user_id, query);
        let tool_results = ToolOrchestrator::execute_tools(&self.registry, query, &enriched).await;

        let decision = self.supervisor.coordinate(&classification, &tool_results);
        debug!("[core] supervisor: {}", decision.reasoning);

        let mut agent_responses = Vec::with_capacity(decision.selected_agents.len());
        for id in &decision.selected_agents {
            let agent = agent_for(*id);
            agent_responses.push(agent.execute(query, &enriched, &tool_results).await);
        }

        let generator = ResponseGenerator::new(self.completion.as_ref());
        let response = generator
            .combine_responses(query, &enriched, &tool_results, &agent_responses, &relevant_context)
            .await;

        self.memory.update_context(
            &user_context.user_id,
            query,
            &response.message,
            Some(user_context),
        );
        response
    }

    /// Execute one textual action directly (plan matching + fallback chain).
    pub async fn execute_action(
        &self,
        action: &str,
        query: &str,
        user_context: &UserContext,
    ) -> ExecutionResult {
        self.executor.execute_action(&self.registry, action, query, user_context).await
    }

    /// Feed an observed reward back into the recommendation bandit.
    pub fn record_feedback(&self, user_id: &str, action_id: &str, reward: f64, context_key: &str) {
        self.recommendation.record_interaction(user_id, action_id, reward, context_key);
    }

    pub fn get_user_memory(&self, user_id: &str) -> MemoryContext {
        self.memory.get_context(user_id)
    }

    pub fn clear_user_memory(&self, user_id: &str) {
        self.memory.clear(user_id);
        self.executor.clear_history(user_id);
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.registry
    }

    fn error_response(message: &str) -> AgentResponse {
        AgentResponse::new(
            format!("Üzgünüm, bir hata oluştu: {}. Lütfen tekrar deneyin.", message),
            vec![
                "Tekrar deneyin".to_string(),
                "Farklı bir soru sorun".to_string(),
                "Yardım isteyin".to_string(),
            ],
            Vec::new(),
            Vec::new(),
            0.1,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::error::{AgentError, AgentResult};
    use crate::engine::search::EmbeddedIndex;
    use crate::engine::storage::MemStorage;
    use async_trait::async_trait;

    struct NoModel;

    #[async_trait]
    impl Completion for NoModel {
        async fn complete(&self, _system: &str, _user: &str) -> AgentResult<String> {
            Err(AgentError::synthesis("offline"))
        }
    }

    fn make_agent() -> CoreAgent {
        CoreAgent::new(
            Arc::new(MemStorage::new()),
            Arc::new(EmbeddedIndex::with_first_aid_kb()),
            Arc::new(NoModel),
        )
    }

    #[tokio::test]
    async fn empty_query_yields_error_response() {
        let agent = make_agent();
        let resp = agent.process_query("   ", &UserContext::new("u1")).await;
        assert!(resp.message.starts_with("Üzgünüm, bir hata oluştu"));
        assert_eq!(resp.confidence, 0.1);
        assert_eq!(resp.suggestions.len(), 3);
    }

    #[tokio::test]
    async fn greeting_short_circuits_without_tools() {
        let agent = make_agent();
        let resp = agent.process_query("Merhaba", &UserContext::new("u1")).await;
        assert_eq!(resp.confidence, 1.0);
        assert!(resp.tool_results.is_empty());
        // The exchange still lands in memory.
        assert_eq!(agent.get_user_memory("u1").conversation_history.len(), 1);
    }

    #[tokio::test]
    async fn enrichment_does_not_mutate_caller_context() {
        let agent = make_agent();
        let ctx = UserContext::new("u1");
        agent.process_query("acil yardım lazım bana", &ctx).await;
        assert!(ctx.preferences.is_empty());
    }

    #[tokio::test]
    async fn clear_user_memory_resets_history() {
        let agent = make_agent();
        agent.process_query("toplanma alanı nerede", &UserContext::new("u1")).await;
        assert!(!agent.get_user_memory("u1").conversation_history.is_empty());
        agent.clear_user_memory("u1");
        assert!(agent.get_user_memory("u1").conversation_history.is_empty());
    }
}
