// End-to-end pipeline tests: CoreAgent wired with in-memory storage, the
// embedded first-aid index, and a canned completion model.

use async_trait::async_trait;
use reach_agent::atoms::error::{AgentError, AgentResult};
use reach_agent::atoms::types::{GeoLocation, UserContext};
use reach_agent::engine::search::EmbeddedIndex;
use reach_agent::engine::storage::MemStorage;
use reach_agent::{Completion, CoreAgent};
use std::sync::Arc;

/// Completion stub: `Some(reply)` answers with that JSON, `None` errors so
/// the combiner falls back to the merged agent text.
struct CannedModel(Option<String>);

#[async_trait]
impl Completion for CannedModel {
    async fn complete(&self, _system: &str, _user: &str) -> AgentResult<String> {
        match &self.0 {
            Some(reply) => Ok(reply.clone()),
            None => Err(AgentError::synthesis("model offline")),
        }
    }
}

fn offline_agent() -> CoreAgent {
    CoreAgent::new(
        Arc::new(MemStorage::new()),
        Arc::new(EmbeddedIndex::with_first_aid_kb()),
        Arc::new(CannedModel(None)),
    )
}

fn kadikoy_context(user_id: &str) -> UserContext {
    let mut ctx = UserContext::new(user_id);
    ctx.location = Some(GeoLocation {
        latitude: 40.9839,
        longitude: 29.0365,
        district: "Kadıköy".to_string(),
        city: "İstanbul".to_string(),
    });
    ctx.operator = Some("Turkcell".to_string());
    ctx
}

#[tokio::test]
async fn greeting_short_circuits_the_pipeline() {
    let agent = offline_agent();
    let resp = agent.process_query("Merhaba", &kadikoy_context("u1")).await;

    assert_eq!(resp.confidence, 1.0);
    assert_eq!(resp.suggestions.len(), 4);
    assert!(resp.suggestions.contains(&"Acil durum bildir".to_string()));
    assert!(resp.tool_results.is_empty());
    assert!(resp.action_items.is_empty());
}

#[tokio::test]
async fn emergency_query_produces_urgent_guidance() {
    let agent = offline_agent();
    let resp = agent
        .process_query("acil yardım lazım bana", &kadikoy_context("u1"))
        .await;

    // Emergency tool fires at high confidence and the emergency agent's
    // briefing dominates the merged text.
    assert!(resp.message.contains("ACİL DURUM"));
    assert!(resp.message.contains("112"));
    assert!(resp
        .tool_results
        .iter()
        .any(|r| r.kind == "emergency" && r.confidence > 0.9));
    assert!(resp.confidence > 0.1);
    assert!(resp.confidence <= 0.95);
}

#[tokio::test]
async fn combined_suggestions_are_bounded_and_unique() {
    let agent = offline_agent();
    let resp = agent
        .process_query(
            "acil durum var, konum ve şebeke bilgisi gönder",
            &kadikoy_context("u1"),
        )
        .await;

    assert!(resp.suggestions.len() <= 6);
    let mut deduped = resp.suggestions.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(deduped.len(), resp.suggestions.len());
}

#[tokio::test]
async fn recommendation_leads_the_suggestion_list() {
    let agent = offline_agent();
    let resp = agent
        .process_query("şebeke durumu nasıl", &kadikoy_context("u1"))
        .await;

    assert!(resp.tool_results.iter().any(|r| r.kind == "recommendation"));
    assert!(resp.suggestions[0].starts_with("🎯 "));
}

#[tokio::test]
async fn synthesized_reply_wins_when_the_model_answers() {
    let agent = CoreAgent::new(
        Arc::new(MemStorage::new()),
        Arc::new(EmbeddedIndex::with_first_aid_kb()),
        Arc::new(CannedModel(Some(
            r#"{"message":"Sakin olun, güvendesiniz.","suggestions":["Derin nefes alın"]}"#
                .to_string(),
        ))),
    );
    let resp = agent
        .process_query("deprem oldu çok korkuyorum", &kadikoy_context("u1"))
        .await;

    assert_eq!(resp.message, "Sakin olun, güvendesiniz.");
    assert_eq!(resp.suggestions, vec!["Derin nefes alın"]);
}

#[tokio::test]
async fn memory_keeps_only_the_last_fifty_exchanges() {
    let agent = offline_agent();
    let ctx = kadikoy_context("u1");
    for i in 0..55 {
        agent.process_query(&format!("toplanma alanı nerede {}", i), &ctx).await;
    }

    let memory = agent.get_user_memory("u1");
    assert_eq!(memory.conversation_history.len(), 50);
    assert_eq!(memory.recent_queries.len(), 50);
    assert_eq!(memory.conversation_history[0].query, "toplanma alanı nerede 5");
    assert_eq!(
        memory.conversation_history.last().map(|t| t.query.as_str()),
        Some("toplanma alanı nerede 54"),
    );
    assert!(!memory.location_history.is_empty());
}

#[tokio::test]
async fn empty_query_is_rejected_gracefully() {
    let agent = offline_agent();
    let resp = agent.process_query("   ", &kadikoy_context("u1")).await;

    assert!(resp.message.starts_with("Üzgünüm, bir hata oluştu"));
    assert_eq!(resp.confidence, 0.1);
    assert_eq!(resp.suggestions.len(), 3);
    // Rejected queries never reach memory.
    assert!(agent.get_user_memory("u1").conversation_history.is_empty());
}

#[tokio::test]
async fn oversized_query_is_rejected() {
    let agent = offline_agent();
    let resp = agent.process_query(&"a".repeat(1001), &kadikoy_context("u1")).await;
    assert!(resp.message.starts_with("Üzgünüm, bir hata oluştu"));
    assert_eq!(resp.confidence, 0.1);
}

#[tokio::test]
async fn unregistering_a_tool_removes_it_from_fanout() {
    let mut agent = offline_agent();
    assert_eq!(agent.registry().count(), 8);
    assert!(agent.registry_mut().unregister("websearch"));
    assert_eq!(agent.registry().count(), 7);
    assert!(agent.registry().get("websearch").is_none());

    let resp = agent
        .process_query("turkcell vodafone karşılaştırma", &kadikoy_context("u1"))
        .await;
    assert!(resp.tool_results.iter().all(|r| r.source != "websearch"));
}

#[tokio::test]
async fn unmatched_query_still_gets_an_answer() {
    let agent = offline_agent();
    let resp = agent.process_query("xyz123", &kadikoy_context("u1")).await;

    assert!(!resp.message.is_empty());
    assert!(resp.confidence > 0.0);
    assert!(resp.confidence <= 0.95);
}

#[tokio::test]
async fn first_aid_query_surfaces_knowledge_base_steps() {
    let agent = offline_agent();
    let resp = agent
        .process_query("kanama nasıl durdurulur ilkyardım", &kadikoy_context("u1"))
        .await;

    assert!(resp
        .tool_results
        .iter()
        .any(|r| r.kind == "first_aid" && r.confidence >= 0.7));
}

#[tokio::test]
async fn direct_action_execution_uses_the_plan_matcher() {
    let agent = offline_agent();
    let result = agent
        .execute_action("konum bilgisi al", "toplanma alanı nerede", &kadikoy_context("u1"))
        .await;

    assert!(result.success);
    assert!(!result.fallback_used);
    assert!(result.results.iter().any(|r| r.source == "location"));
}

#[tokio::test]
async fn clearing_memory_forgets_the_user() {
    let agent = offline_agent();
    let ctx = kadikoy_context("u1");
    agent.process_query("güvenli alan nerede", &ctx).await;
    assert!(!agent.get_user_memory("u1").conversation_history.is_empty());

    agent.clear_user_memory("u1");
    assert!(agent.get_user_memory("u1").conversation_history.is_empty());
}

#[tokio::test]
async fn feedback_reaches_the_recommendation_bandit() {
    let agent = offline_agent();
    let resp = agent
        .process_query("şebeke durumu nasıl", &kadikoy_context("u1"))
        .await;
    let rec = resp
        .tool_results
        .iter()
        .find(|r| r.kind == "recommendation")
        .expect("recommendation result");

    let action_id = rec.data["actionId"].as_str().expect("actionId");
    let context_key = rec.data["contextKey"].as_str().expect("contextKey");
    agent.record_feedback("u1", action_id, 0.9, context_key);
    // A second pass still produces a recommendation after the update.
    let again = agent
        .process_query("şebeke durumu nasıl acaba", &kadikoy_context("u1"))
        .await;
    assert!(again.tool_results.iter().any(|r| r.kind == "recommendation"));
}
