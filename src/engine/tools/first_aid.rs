// First-aid tool: similarity search over the first-aid knowledge base via
// the `Search` port. Confidence is max(0.7, best similarity) when hits
// exist, 0.1 when the knowledge base has nothing relevant.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ToolInput, ToolResult};
use crate::engine::registry::Tool;
use crate::engine::search::{Search, SearchHit};
use crate::engine::tools::matches_any;
use async_trait::async_trait;
use log::error;
use serde_json::json;
use std::sync::Arc;

const KEYWORDS: &[&str] = &[
    "ilkyardım", "ilk yardım", "first aid", "kalp masajı", "cpr", "kanama",
    "kırık", "yanık", "bilinç kaybı", "zehirlenme", "yaralanma", "nefes",
    "solunum", "tedavi", "müdahale", "bayılma", "yara", "şok", "boğulma",
    "burkulma", "çıkık", "donma", "sıcak çarpması", "yaşam üçgeni",
];

const TOP_K: usize = 3;

pub struct FirstAidTool {
    search: Arc<dyn Search>,
}

impl FirstAidTool {
    pub fn new(search: Arc<dyn Search>) -> Self {
        FirstAidTool { search }
    }

    fn format_message(hits: &[SearchHit]) -> String {
        let Some(top) = hits.first() else {
            return "İlkyardım konusunda spesifik bilgi bulunamadı.".to_string();
        };

        let topic = top.metadata["topic"].as_str().unwrap_or("ilkyardım");
        let mut message = format!("📚 **{}**\n\n", topic);
        if let Some(steps) = top.metadata["steps"].as_array() {
            for step in steps {
                if let Some(step) = step.as_str() {
                    message.push_str(&format!("• {}\n", step));
                }
            }
        }

        if hits.len() > 1 {
            message.push_str("\n🔍 **Diğer İlgili Konular:**\n");
            for (i, hit) in hits.iter().skip(1).enumerate() {
                let topic = hit.metadata["topic"].as_str().unwrap_or("-");
                message.push_str(&format!("{}. {}\n", i + 2, topic));
            }
        }
        message
    }
}

#[async_trait]
impl Tool for FirstAidTool {
    fn name(&self) -> &'static str {
        "first_aid"
    }

    fn description(&self) -> &'static str {
        "İlkyardım bilgi tabanında arama yapar"
    }

    fn can_handle(&self, query: &str) -> bool {
        matches_any(&query.to_lowercase(), KEYWORDS)
    }

    async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>> {
        if !self.can_handle(&input.query) {
            return Ok(None);
        }

        let hits = match self.search.search(&input.query, TOP_K).await {
            Ok(hits) => hits,
            Err(err) => {
                error!("[first_aid] knowledge base search failed: {}", err);
                return Ok(Some(ToolResult::new(
                    "first_aid",
                    json!({
                        "error": "İlkyardım bilgilerine erişimde sorun yaşanıyor.",
                        "results": [],
                    }),
                    0.1,
                    self.name(),
                )));
            }
        };

        if hits.is_empty() {
            return Ok(Some(ToolResult::new(
                "first_aid",
                json!({
                    "message": "İlkyardım konusunda spesifik bilgi bulunamadı.",
                    "results": [],
                }),
                0.1,
                self.name(),
            )));
        }

        let confidence = hits[0].similarity.max(0.7);
        let message = Self::format_message(&hits);
        Ok(Some(ToolResult::new(
            "first_aid",
            json!({
                "query": input.query,
                "results": hits,
                "totalFound": hits.len(),
                "message": message,
            }),
            confidence,
            self.name(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::UserContext;
    use crate::engine::search::EmbeddedIndex;

    fn make_input(query: &str) -> ToolInput {
        ToolInput { query: query.to_string(), user_context: UserContext::new("u1") }
    }

    #[tokio::test]
    async fn kb_hit_yields_floor_confidence() {
        let tool = FirstAidTool::new(Arc::new(EmbeddedIndex::with_first_aid_kb()));
        let result = tool
            .execute(&make_input("kanama nasıl durdurulur"))
            .await
            .unwrap()
            .unwrap();
        assert!(result.confidence >= 0.7);
        assert!(result.data["message"].as_str().unwrap().contains("kanama durdurma"));
    }

    #[tokio::test]
    async fn no_hit_degrades_to_low_confidence() {
        let tool = FirstAidTool::new(Arc::new(EmbeddedIndex::new()));
        let result = tool.execute(&make_input("yanık tedavisi")).await.unwrap().unwrap();
        assert_eq!(result.confidence, 0.1);
    }

    #[tokio::test]
    async fn unrelated_query_skipped() {
        let tool = FirstAidTool::new(Arc::new(EmbeddedIndex::with_first_aid_kb()));
        assert!(tool.execute(&make_input("şebeke durumu")).await.unwrap().is_none());
    }
}
