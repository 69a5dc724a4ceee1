// Emergency tool: active alerts from storage, emergency contacts, and
// query-specific safety recommendations. Storage failures degrade to a 0.1
// result instead of failing the fan-out.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ToolInput, ToolResult};
use crate::engine::registry::Tool;
use crate::engine::storage::Storage;
use crate::engine::tools::matches_any;
use async_trait::async_trait;
use log::error;
use serde_json::json;
use std::sync::Arc;

const KEYWORDS: &[&str] = &[
    "acil", "emergency", "uyarı", "tehlike", "güvenlik", "112", "ambulans",
    "itfaiye", "polis", "kurtarma", "afet", "deprem", "yangın", "sel",
    "fırtına",
];

const URGENT_KEYWORDS: &[&str] =
    &["acil", "emergency", "hemen", "immediately", "sıkıştım", "mahsur"];

pub struct EmergencyTool {
    storage: Arc<dyn Storage>,
}

impl EmergencyTool {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        EmergencyTool { storage }
    }

    fn safety_recommendations(query_lower: &str) -> Vec<&'static str> {
        let mut recommendations = Vec::new();
        if query_lower.contains("deprem") {
            recommendations.push("Çök, kapan, tutun pozisyonu alın");
            recommendations.push("Güvenli bir yere geçin");
            recommendations.push("Asansör kullanmayın");
        }
        if query_lower.contains("yangın") {
            recommendations.push("Hemen binayı terk edin");
            recommendations.push("Asansör kullanmayın");
            recommendations.push("112'yi arayın");
        }
        recommendations.push("Acil durum numarası: 112");
        recommendations.push("Güvenli alana gidin");
        recommendations
    }
}

#[async_trait]
impl Tool for EmergencyTool {
    fn name(&self) -> &'static str {
        "emergency"
    }

    fn description(&self) -> &'static str {
        "Acil durum yönetimi, uyarılar ve güvenlik bilgileri sağlar"
    }

    fn can_handle(&self, query: &str) -> bool {
        matches_any(&query.to_lowercase(), KEYWORDS)
    }

    async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>> {
        if !self.can_handle(&input.query) {
            return Ok(None);
        }

        let lower = input.query.to_lowercase();
        let location = input.user_context.district_or("İstanbul");

        let alerts = match self.storage.active_alerts() {
            Ok(alerts) => alerts,
            Err(err) => {
                error!("[emergency] alert lookup failed: {}", err);
                return Ok(Some(ToolResult::new(
                    "emergency",
                    json!({
                        "error": "Acil durum bilgisi alınamadı",
                        "location": location,
                        "emergencyAlerts": [],
                        "emergencyContacts": [],
                        "safetyRecommendations": [],
                    }),
                    0.1,
                    self.name(),
                )));
            }
        };

        Ok(Some(ToolResult::new(
            "emergency",
            json!({
                "location": location,
                "emergencyAlerts": alerts,
                "emergencyContacts": [
                    { "name": "Acil Çağrı Merkezi", "number": "112", "type": "emergency" },
                    { "name": "Ambulans", "number": "112", "type": "medical" },
                    { "name": "İtfaiye", "number": "110", "type": "fire" },
                    { "name": "Polis", "number": "155", "type": "police" },
                ],
                "safetyRecommendations": Self::safety_recommendations(&lower),
                "isUrgent": matches_any(&lower, URGENT_KEYWORDS),
            }),
            0.95,
            self.name(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::UserContext;
    use crate::engine::storage::MemStorage;

    fn make_input(query: &str) -> ToolInput {
        ToolInput { query: query.to_string(), user_context: UserContext::new("u1") }
    }

    #[tokio::test]
    async fn surfaces_active_alerts_and_contacts() {
        let storage = Arc::new(MemStorage::new());
        storage.push_alert(json!({ "type": "deprem", "severity": "high" }));
        let tool = EmergencyTool::new(storage);

        let result = tool.execute(&make_input("deprem oldu acil yardım")).await.unwrap().unwrap();
        assert_eq!(result.confidence, 0.95);
        assert_eq!(result.data["emergencyAlerts"].as_array().unwrap().len(), 1);
        assert_eq!(result.data["emergencyContacts"].as_array().unwrap().len(), 4);
        assert_eq!(result.data["isUrgent"], true);

        let recs = result.data["safetyRecommendations"].as_array().unwrap();
        assert!(recs.iter().any(|r| r == "Çök, kapan, tutun pozisyonu alın"));
    }

    #[tokio::test]
    async fn non_emergency_query_skipped() {
        let tool = EmergencyTool::new(Arc::new(MemStorage::new()));
        assert!(tool.execute(&make_input("şebeke durumu")).await.unwrap().is_none());
    }
}
