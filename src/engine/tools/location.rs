// Location tool: safe areas, nearest shelter, and user position data.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ToolInput, ToolResult};
use crate::engine::registry::Tool;
use crate::engine::tools::matches_any;
use async_trait::async_trait;
use serde_json::json;

const KEYWORDS: &[&str] = &[
    "konum", "nerede", "güvenli alan", "toplanma", "hastane", "yol tarifi",
    "nasıl giderim", "yakın", "mesafe", "koordinat",
];

#[derive(Debug, Default)]
pub struct LocationTool;

impl LocationTool {
    pub fn new() -> Self {
        LocationTool
    }
}

#[async_trait]
impl Tool for LocationTool {
    fn name(&self) -> &'static str {
        "location"
    }

    fn description(&self) -> &'static str {
        "Konum bilgileri, güvenli alanlar ve yol tarifi sağlar"
    }

    fn can_handle(&self, query: &str) -> bool {
        matches_any(&query.to_lowercase(), KEYWORDS)
    }

    async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>> {
        if !self.can_handle(&input.query) {
            return Ok(None);
        }

        let safe_areas = json!([
            {
                "name": "Fenerbahçe Parkı",
                "distance": "400m",
                "coordinates": { "lat": 40.9839, "lng": 29.0365 },
                "capacity": 5000,
                "facilities": ["Su", "Elektrik", "Tıbbi Yardım"]
            }
        ]);

        let nearest = safe_areas[0].clone();
        Ok(Some(ToolResult::new(
            "location",
            json!({
                "nearestSafeArea": nearest,
                "safeAreas": safe_areas,
                "userLocation": input.user_context.location,
            }),
            0.9,
            self.name(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::UserContext;

    #[tokio::test]
    async fn irrelevant_query_yields_none() {
        let tool = LocationTool::new();
        let input = ToolInput {
            query: "şebeke çekmiyor".to_string(),
            user_context: UserContext::new("u1"),
        };
        assert!(tool.execute(&input).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn relevant_query_yields_high_confidence() {
        let tool = LocationTool::new();
        let input = ToolInput {
            query: "en yakın toplanma alanı nerede".to_string(),
            user_context: UserContext::new("u1"),
        };
        let result = tool.execute(&input).await.unwrap().unwrap();
        assert_eq!(result.kind, "location");
        assert_eq!(result.confidence, 0.9);
        assert!(result.data["safeAreas"].is_array());
    }
}
