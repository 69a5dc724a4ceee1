// Social media tool: trend topics and sentiment summary for the district.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ToolInput, ToolResult};
use crate::engine::registry::Tool;
use crate::engine::tools::matches_any;
use async_trait::async_trait;
use serde_json::json;

const KEYWORDS: &[&str] = &[
    "twitter", "tweet", "sosyal medya", "trend", "gündem", "ne konuşuluyor",
    "popüler", "sentiment", "duygu", "afet", "deprem", "yardım", "acil",
    "haber",
];

#[derive(Debug, Default)]
pub struct SocialTool;

impl SocialTool {
    pub fn new() -> Self {
        SocialTool
    }
}

#[async_trait]
impl Tool for SocialTool {
    fn name(&self) -> &'static str {
        "social"
    }

    fn description(&self) -> &'static str {
        "Sosyal medya analizi, trend konular ve sentiment analizi sağlar"
    }

    fn can_handle(&self, query: &str) -> bool {
        matches_any(&query.to_lowercase(), KEYWORDS)
    }

    async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>> {
        if !self.can_handle(&input.query) {
            return Ok(None);
        }

        let location = input.user_context.district_or("İstanbul");
        Ok(Some(ToolResult::new(
            "social",
            json!({
                "location": location,
                "insights": [
                    { "keyword": "deprem", "sentiment": "negative", "count": 45, "category": "disaster" },
                    { "keyword": "yardım", "sentiment": "positive", "count": 32, "category": "help" },
                    { "keyword": "şebeke", "sentiment": "negative", "count": 28, "category": "network" },
                ],
                "trends": ["deprem", "yardım", "şebeke", "güvenli alan", "acil durum"],
                "sentimentSummary": "Genel olarak endişeli ama yardımlaşma odaklı",
            }),
            0.8,
            self.name(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::UserContext;

    #[tokio::test]
    async fn trend_query_handled() {
        let tool = SocialTool::new();
        let input = ToolInput {
            query: "twitter'da gündem ne".to_string(),
            user_context: UserContext::new("u1"),
        };
        let result = tool.execute(&input).await.unwrap().unwrap();
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.data["trends"].as_array().unwrap().len(), 5);
    }
}
