// Agent Engine — Response Generator
// Combines the selected agents' responses into one reply: merge messages and
// suggestions, fold in the bandit recommendation, then let the LLM produce
// the final empathetic wording. Synthesis failure falls back to the merged
// text; it never fails the request.

use crate::atoms::constants::MAX_SUGGESTIONS;
use crate::atoms::types::{AgentResponse, ToolResult, UserContext};
use crate::engine::providers::Completion;
use log::warn;
use serde_json::Value;

pub const APOLOGY_MESSAGE: &str = "Üzgünüm, bu konuda yardımcı olamıyorum.";

pub struct ResponseGenerator<'a> {
    completion: &'a dyn Completion,
}

impl<'a> ResponseGenerator<'a> {
    pub fn new(completion: &'a dyn Completion) -> Self {
        ResponseGenerator { completion }
    }

    pub async fn combine_responses(
        &self,
        query: &str,
        user_context: &UserContext,
        tool_results: &[ToolResult],
        agent_responses: &[AgentResponse],
        relevant_context: &[String],
    ) -> AgentResponse {
        let combined_message = Self::combine_messages(agent_responses);
        let combined_suggestions = Self::combine_suggestions(agent_responses);

        let recommendation = tool_results.iter().find(|r| r.kind == "recommendation");
        let suggestions = match recommendation {
            Some(result) => Self::fold_in_recommendation(combined_suggestions, &result.data),
            None => combined_suggestions,
        };

        let (message, suggestions) = self
            .synthesize(query, user_context, &combined_message, suggestions, relevant_context, recommendation)
            .await;

        AgentResponse::new(
            message,
            suggestions,
            Vec::new(),
            tool_results.to_vec(),
            Self::overall_confidence(agent_responses, tool_results),
        )
    }

    fn combine_messages(agent_responses: &[AgentResponse]) -> String {
        match agent_responses {
            [] => APOLOGY_MESSAGE.to_string(),
            [only] => only.message.clone(),
            many => many
                .iter()
                .map(|r| r.message.as_str())
                .collect::<Vec<_>>()
                .join("\n\n---\n\n"),
        }
    }

    /// Flatten, deduplicate preserving first occurrence, cap at 6.
    fn combine_suggestions(agent_responses: &[AgentResponse]) -> Vec<String> {
        let mut seen = Vec::new();
        for response in agent_responses {
            for suggestion in &response.suggestions {
                if !seen.contains(suggestion) {
                    seen.push(suggestion.clone());
                }
            }
        }
        seen.truncate(MAX_SUGGESTIONS);
        seen
    }

    /// Put the bandit pick first (🎯), its alternatives next (💡), then the
    /// original suggestions minus any the recommendation lines already cover.
    fn fold_in_recommendation(original: Vec<String>, data: &Value) -> Vec<String> {
        let mut folded = Vec::new();
        if let Some(title) = data["title"].as_str() {
            folded.push(format!("🎯 {}", title));
        }
        if let Some(alternatives) = data["alternatives"].as_array() {
            for alternative in alternatives {
                if let Some(title) = alternative["title"].as_str() {
                    folded.push(format!("💡 {}", title));
                }
            }
        }

        for suggestion in original {
            let lower = suggestion.to_lowercase();
            let covered = folded.iter().any(|f| f.to_lowercase().contains(&lower));
            if !covered {
                folded.push(suggestion);
            }
        }
        folded.truncate(MAX_SUGGESTIONS);
        folded
    }

    async fn synthesize(
        &self,
        query: &str,
        user_context: &UserContext,
        combined_message: &str,
        suggestions: Vec<String>,
        relevant_context: &[String],
        recommendation: Option<&ToolResult>,
    ) -> (String, Vec<String>) {
        let system_prompt =
            Self::system_prompt(user_context, combined_message, relevant_context, recommendation);

        match self.completion.complete(&system_prompt, query).await {
            Ok(reply) => match serde_json::from_str::<Value>(&reply) {
                Ok(parsed) => {
                    let message = parsed["message"]
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| combined_message.to_string());
                    let synthesized: Vec<String> = parsed["suggestions"]
                        .as_array()
                        .map(|list| {
                            list.iter().filter_map(Value::as_str).map(str::to_string).collect()
                        })
                        .unwrap_or_default();
                    let suggestions = if synthesized.is_empty() { suggestions } else { synthesized };
                    (message, suggestions)
                }
                Err(err) => {
                    warn!("[response] unparseable synthesis reply: {}", err);
                    (combined_message.to_string(), suggestions)
                }
            },
            Err(err) => {
                warn!("[response] synthesis failed, using merged text: {}", err);
                (combined_message.to_string(), suggestions)
            }
        }
    }

    fn system_prompt(
        user_context: &UserContext,
        combined_message: &str,
        relevant_context: &[String],
        recommendation: Option<&ToolResult>,
    ) -> String {
        let (district, city) = match &user_context.location {
            Some(location) => (location.district.clone(), location.city.clone()),
            None => ("Bilinmiyor".to_string(), "İstanbul".to_string()),
        };

        let rl_context = recommendation
            .map(|r| {
                format!(
                    "\n🤖 Kişiselleştirilmiş Öneri:\n- Ana Öneri: {}\n- Açıklama: {}\n",
                    r.data["title"].as_str().unwrap_or("-"),
                    r.data["description"].as_str().unwrap_or("-"),
                )
            })
            .unwrap_or_default();

        format!(
            "Sen REACH+ afet destek sisteminin ana AI asistanısın. \
Acil durumlarda kullanıcıyı sakinleştiren, ilk yardım konusunda rehberlik eden \
ve panik halindeki insanlara empatiyle yaklaşan bir asistan.\n\n\
Kullanıcı Bağlamı:\n\
- Kullanıcı ID: {}\n\
- Konum: {}, {}\n\
- Operatör: {}\n\n\
Mevcut Bilgiler:\n{}\n{}\n\
İlgili Geçmiş:\n{}\n\n\
KURALLAR:\n\
- Acil durumlarda öncelik: Sakinleştir → Sorgula → İlk yardım → Güvenli alan\n\
- Panik halindeki kullanıcıya kısa, net talimatlar ver\n\
- Sıcak ve empatik ton kullan, sürekli güven ver\n\n\
Yanıt formatı (JSON):\n\
{{\n  \"message\": \"Empatik ve sakinleştirici ana yanıt\",\n  \"suggestions\": [\"Sakinleştirici öneri 1\", \"Pratik adım 2\"]\n}}\n\n\
Lütfen yanıtınızı JSON formatında verin.",
            user_context.user_id,
            district,
            city,
            user_context.operator.as_deref().unwrap_or("Bilinmiyor"),
            combined_message,
            rl_context,
            relevant_context.join("\n"),
        )
    }

    /// (agent mean + tool mean) / 2, capped at 0.95; 0.1 with no inputs.
    fn overall_confidence(agent_responses: &[AgentResponse], tool_results: &[ToolResult]) -> f64 {
        if agent_responses.is_empty() && tool_results.is_empty() {
            return 0.1;
        }
        let agent_avg = if agent_responses.is_empty() {
            0.0
        } else {
            agent_responses.iter().map(|r| r.confidence).sum::<f64>() / agent_responses.len() as f64
        };
        let tool_avg = if tool_results.is_empty() {
            0.0
        } else {
            tool_results.iter().map(|r| r.confidence).sum::<f64>() / tool_results.len() as f64
        };
        ((agent_avg + tool_avg) / 2.0).min(0.95)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::error::AgentError;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedCompletion(Result<String, ()>);

    #[async_trait]
    impl Completion for CannedCompletion {
        async fn complete(&self, _system: &str, _user: &str) -> crate::atoms::error::AgentResult<String> {
            match &self.0 {
                Ok(reply) => Ok(reply.clone()),
                Err(()) => Err(AgentError::synthesis("model unavailable")),
            }
        }
    }

    fn make_response(message: &str, suggestions: &[&str], confidence: f64) -> AgentResponse {
        AgentResponse::new(
            message,
            suggestions.iter().map(|s| s.to_string()).collect(),
            vec![],
            vec![],
            confidence,
        )
    }

    #[tokio::test]
    async fn empty_inputs_yield_apology_with_floor_confidence() {
        let completion = CannedCompletion(Err(()));
        let generator = ResponseGenerator::new(&completion);
        let ctx = UserContext::new("u1");
        let resp = generator.combine_responses("soru", &ctx, &[], &[], &[]).await;

        assert_eq!(resp.message, APOLOGY_MESSAGE);
        assert_eq!(resp.confidence, 0.1);
        assert!(resp.action_items.is_empty());
    }

    #[tokio::test]
    async fn synthesis_failure_falls_back_to_merged_text() {
        let completion = CannedCompletion(Err(()));
        let generator = ResponseGenerator::new(&completion);
        let ctx = UserContext::new("u1");
        let agents = [
            make_response("birinci", &["a"], 0.8),
            make_response("ikinci", &["b", "a"], 0.6),
        ];
        let resp = generator.combine_responses("soru", &ctx, &[], &agents, &[]).await;

        assert_eq!(resp.message, "birinci\n\n---\n\nikinci");
        assert_eq!(resp.suggestions, vec!["a", "b"]);
        assert!((resp.confidence - 0.35).abs() < 1e-9);
    }

    #[tokio::test]
    async fn llm_reply_replaces_message_and_suggestions() {
        let completion = CannedCompletion(Ok(
            r#"{"message":"Sakin olun","suggestions":["Derin nefes alın"]}"#.to_string(),
        ));
        let generator = ResponseGenerator::new(&completion);
        let ctx = UserContext::new("u1");
        let agents = [make_response("ham mesaj", &["x"], 0.8)];
        let resp = generator.combine_responses("soru", &ctx, &[], &agents, &[]).await;

        assert_eq!(resp.message, "Sakin olun");
        assert_eq!(resp.suggestions, vec!["Derin nefes alın"]);
    }

    #[tokio::test]
    async fn recommendation_folds_in_first_and_dedupes() {
        let completion = CannedCompletion(Err(()));
        let generator = ResponseGenerator::new(&completion);
        let ctx = UserContext::new("u1");
        let tools = [ToolResult::new(
            "recommendation",
            json!({
                "title": "Şebeke durumu genel",
                "alternatives": [{ "title": "Bildirim ayarları" }],
            }),
            0.75,
            "recommendation",
        )];
        let agents = [make_response("mesaj", &["Şebeke durumu genel", "Başka öneri"], 0.8)];
        let resp = generator.combine_responses("soru", &ctx, &tools, &agents, &[]).await;

        assert_eq!(resp.suggestions[0], "🎯 Şebeke durumu genel");
        assert_eq!(resp.suggestions[1], "💡 Bildirim ayarları");
        // The covered original is dropped, the novel one survives.
        assert!(resp.suggestions.contains(&"Başka öneri".to_string()));
        assert!(!resp.suggestions.contains(&"Şebeke durumu genel".to_string()));
        assert!(resp.suggestions.len() <= 6);
    }

    #[test]
    fn suggestions_capped_at_six_unique() {
        let agents = [
            make_response("a", &["1", "2", "3", "4"], 0.5),
            make_response("b", &["3", "4", "5", "6", "7", "8"], 0.5),
        ];
        let combined = ResponseGenerator::combine_suggestions(&agents);
        assert_eq!(combined.len(), 6);
        assert_eq!(combined, vec!["1", "2", "3", "4", "5", "6"]);
    }
}
