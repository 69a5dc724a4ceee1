// Network tool: operator coverage status and a per-district recommendation.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ToolInput, ToolResult};
use crate::engine::registry::Tool;
use crate::engine::tools::matches_any;
use async_trait::async_trait;
use serde_json::json;

const KEYWORDS: &[&str] = &[
    "şebeke", "internet", "çekmiyor", "sinyal", "bağlantı", "türk telekom",
    "vodafone", "turkcell", "operatör", "kapsama", "hız", "veri", "wifi",
    "5g", "4g",
];

#[derive(Debug, Default)]
pub struct NetworkTool;

impl NetworkTool {
    pub fn new() -> Self {
        NetworkTool
    }
}

#[async_trait]
impl Tool for NetworkTool {
    fn name(&self) -> &'static str {
        "network"
    }

    fn description(&self) -> &'static str {
        "Şebeke durumu, operatör bilgileri ve bağlantı önerileri sağlar"
    }

    fn can_handle(&self, query: &str) -> bool {
        matches_any(&query.to_lowercase(), KEYWORDS)
    }

    async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>> {
        if !self.can_handle(&input.query) {
            return Ok(None);
        }

        let location = input.user_context.district_or("İstanbul");
        let operators = json!({
            "türk telekom": { "status": "up", "coverage": 90, "signalStrength": 85 },
            "vodafone":     { "status": "up", "coverage": 88, "signalStrength": 80 },
            "turkcell":     { "status": "up", "coverage": 92, "signalStrength": 88 },
        });

        Ok(Some(ToolResult::new(
            "network",
            json!({
                "location": location,
                "networkStatus": {
                    "location": location,
                    "status": "active",
                    "coverage": 85,
                },
                "recommendation": format!(
                    "{} bölgesinde en güçlü kapsama şu an Turkcell şebekesinde",
                    location
                ),
                "operators": operators,
                "userOperator": input.user_context.operator,
            }),
            0.85,
            self.name(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::{GeoLocation, UserContext};

    #[tokio::test]
    async fn uses_user_district_when_present() {
        let tool = NetworkTool::new();
        let mut ctx = UserContext::new("u1");
        ctx.location = Some(GeoLocation {
            latitude: 40.98,
            longitude: 29.03,
            district: "Kadıköy".to_string(),
            city: "İstanbul".to_string(),
        });
        let input = ToolInput { query: "şebeke çekmiyor".to_string(), user_context: ctx };

        let result = tool.execute(&input).await.unwrap().unwrap();
        assert_eq!(result.data["location"], "Kadıköy");
        assert_eq!(result.confidence, 0.85);
    }

    #[tokio::test]
    async fn defaults_to_istanbul_without_location() {
        let tool = NetworkTool::new();
        let input = ToolInput {
            query: "internet hızı nasıl".to_string(),
            user_context: UserContext::new("u1"),
        };
        let result = tool.execute(&input).await.unwrap().unwrap();
        assert_eq!(result.data["location"], "İstanbul");
    }
}
