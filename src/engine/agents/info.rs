// Info agent: summarizes location, network, social, and websearch results
// into a readable briefing.

use crate::atoms::types::{
    ActionItem, ActionKind, AgentId, AgentResponse, Priority, ToolResult, UserContext,
};
use crate::engine::agents::{cap_suggestions, mean_confidence, ResponderAgent};
use async_trait::async_trait;
use serde_json::{json, Value};

const RELEVANT_KINDS: &[&str] = &["location", "network", "social", "websearch"];

pub struct InfoAgent;

impl InfoAgent {
    fn format_location(data: &Value) -> String {
        if let Some(error) = data["error"].as_str() {
            return format!("Konum bilgisi: {}", error);
        }

        let mut info = String::from("📍 Konum Bilgileri:\n");
        if let Some(area) = data["nearestSafeArea"].as_object() {
            info.push_str(&format!(
                "• En yakın güvenli alan: {} ({})\n",
                area.get("name").and_then(Value::as_str).unwrap_or("-"),
                area.get("distance").and_then(Value::as_str).unwrap_or("-"),
            ));
        }
        if let Some(areas) = data["safeAreas"].as_array() {
            if !areas.is_empty() {
                info.push_str(&format!("• Diğer güvenli alanlar: {} adet\n", areas.len()));
            }
        }
        info
    }

    fn format_network(data: &Value) -> String {
        if let Some(error) = data["error"].as_str() {
            return format!("Şebeke bilgisi: {}", error);
        }

        let mut info = format!(
            "📡 Şebeke Durumu ({}):\n",
            data["location"].as_str().unwrap_or("-")
        );
        if let Some(operators) = data["operators"].as_object() {
            for (operator, status) in operators {
                info.push_str(&format!(
                    "• {}: {}\n",
                    operator,
                    status["status"].as_str().unwrap_or("Bilinmiyor"),
                ));
            }
        }
        if let Some(recommendation) = data["recommendation"].as_str() {
            info.push_str(&format!("• Öneri: {}\n", recommendation));
        }
        info
    }

    fn format_social(data: &Value) -> String {
        if let Some(error) = data["error"].as_str() {
            return format!("Sosyal medya bilgisi: {}", error);
        }

        let mut info = format!(
            "🐦 Sosyal Medya Analizi ({}):\n",
            data["location"].as_str().unwrap_or("-")
        );
        if let Some(insights) = data["insights"].as_array() {
            if !insights.is_empty() {
                info.push_str(&format!("• {} adet insight\n", insights.len()));
            }
        }
        if let Some(trends) = data["trends"].as_array() {
            if !trends.is_empty() {
                let top: Vec<&str> = trends.iter().take(3).filter_map(Value::as_str).collect();
                info.push_str(&format!("• Trend konular: {}\n", top.join(", ")));
            }
        }
        if let Some(sentiment) = data["sentimentSummary"].as_str() {
            info.push_str(&format!("• Genel duygu: {}\n", sentiment));
        }
        info
    }

    fn format_websearch(data: &Value) -> String {
        if let Some(error) = data["error"].as_str() {
            return format!("Web araması: {}", error);
        }

        let mut info = format!(
            "🔍 Web Araştırması ({}):\n",
            data["location"].as_str().unwrap_or("-")
        );
        let Some(results) = data["results"].as_array().filter(|r| !r.is_empty()) else {
            info.push_str("Arama sonucu bulunamadı.");
            return info;
        };

        for (i, result) in results.iter().enumerate() {
            info.push_str(&format!(
                "\n{}. {}\n   {}\n",
                i + 1,
                result["title"].as_str().unwrap_or("-"),
                result["snippet"].as_str().unwrap_or(""),
            ));
            if let Some(content) = result["content"].as_str() {
                let short: String = content.chars().take(200).collect();
                let suffix = if content.chars().count() > 200 { "..." } else { "" };
                info.push_str(&format!("   {}{}\n", short, suffix));
            }
        }
        info
    }

    fn summary(results: &[ToolResult]) -> String {
        results
            .iter()
            .map(|result| match result.kind.as_str() {
                "location" => Self::format_location(&result.data),
                "network" => Self::format_network(&result.data),
                "social" => Self::format_social(&result.data),
                _ => Self::format_websearch(&result.data),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn message(query: &str, summary: &str, user_context: &UserContext) -> String {
        let location = user_context.district_or("İstanbul");
        let lower = query.to_lowercase();

        if lower.contains("toplanma") || lower.contains("güvenli alan") {
            format!(
                "🏢 {} bölgesindeki toplanma alanları:\n\n{}\n\nBu alanlar acil durumlarda güvenli toplanma noktalarıdır. Koordinat bilgileri ile konumlarına ulaşabilirsiniz.",
                location, summary,
            )
        } else if lower.contains("durum") || lower.contains("ne oluyor") {
            format!(
                "📊 {} için güncel durum:\n\n{}\n\nBu bilgiler gerçek zamanlı olarak güncellenmektedir.",
                location, summary,
            )
        } else if lower.contains("konum") || lower.contains("nerede") {
            format!(
                "📍 Konum bilgileriniz:\n\n{}\n\nGüvenli alanlara ulaşım için yol tarifi alabilirsiniz.",
                summary,
            )
        } else if lower.contains("şebeke") || lower.contains("internet") {
            format!(
                "📡 Şebeke durumu:\n\n{}\n\nEn iyi bağlantı için önerilen operatörü kullanabilirsiniz.",
                summary,
            )
        } else {
            format!(
                "ℹ️ İstediğiniz bilgiler:\n\n{}\n\nDaha detaylı bilgi için spesifik sorular sorabilirsiniz.",
                summary,
            )
        }
    }

    fn suggestions(results: &[ToolResult]) -> Vec<String> {
        let mut suggestions = Vec::new();
        let has = |kind: &str| results.iter().any(|r| r.kind == kind);

        if has("location") {
            suggestions.push("Güvenli alana nasıl giderim?".to_string());
            suggestions.push("Yakındaki hastaneler nerede?".to_string());
        }
        if has("network") {
            suggestions.push("Şebekemi nasıl test ederim?".to_string());
            suggestions.push("Hangi operatörü kullanmalıyım?".to_string());
        }
        if has("social") {
            suggestions.push("Son trendler neler?".to_string());
            suggestions.push("Sosyal medyada ne konuşuluyor?".to_string());
        }
        if has("websearch") {
            suggestions.push("Daha detaylı araştırma yap".to_string());
            suggestions.push("Güncel verileri kontrol et".to_string());
        }
        suggestions.push("Acil durum numarası nedir?".to_string());
        suggestions.push("Yardım nasıl isteyebilirim?".to_string());

        cap_suggestions(suggestions)
    }

    fn action_items(results: &[ToolResult]) -> Vec<ActionItem> {
        let mut items = Vec::new();
        for result in results {
            if result.kind == "location" && !result.data["nearestSafeArea"].is_null() {
                items.push(ActionItem {
                    kind: ActionKind::Location,
                    title: "Güvenli alana git".to_string(),
                    data: json!({ "safeArea": result.data["nearestSafeArea"] }),
                    priority: Priority::Medium,
                });
            }
            if result.kind == "network" && !result.data["recommendation"].is_null() {
                items.push(ActionItem {
                    kind: ActionKind::Network,
                    title: "Operatör değiştir".to_string(),
                    data: json!({ "recommendation": result.data["recommendation"] }),
                    priority: Priority::Low,
                });
            }
        }
        items
    }
}

#[async_trait]
impl ResponderAgent for InfoAgent {
    fn id(&self) -> AgentId {
        AgentId::Info
    }

    async fn execute(
        &self,
        query: &str,
        user_context: &UserContext,
        tool_results: &[ToolResult],
    ) -> AgentResponse {
        let relevant: Vec<ToolResult> = tool_results
            .iter()
            .filter(|r| RELEVANT_KINDS.contains(&r.kind.as_str()))
            .cloned()
            .collect();

        let summary = Self::summary(&relevant);
        let message = Self::message(query, &summary, user_context);
        let suggestions = Self::suggestions(&relevant);
        let action_items = Self::action_items(&relevant);
        let confidence = mean_confidence(&relevant);

        AgentResponse::new(message, suggestions, action_items, relevant, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn irrelevant_results_filtered_and_confidence_low() {
        let results = [ToolResult::new("emergency", json!({}), 0.95, "emergency")];
        let resp = InfoAgent
            .execute("bir şey", &UserContext::new("u1"), &results)
            .await;
        assert!(resp.tool_results.is_empty());
        assert_eq!(resp.confidence, 0.1);
    }

    #[tokio::test]
    async fn location_result_produces_action_item_and_suggestions() {
        let results = [ToolResult::new(
            "location",
            json!({
                "nearestSafeArea": { "name": "Park", "distance": "400m" },
                "safeAreas": [{ "name": "Park" }],
            }),
            0.9,
            "location",
        )];
        let resp = InfoAgent
            .execute("toplanma alanı nerede", &UserContext::new("u1"), &results)
            .await;

        assert!(resp.message.contains("toplanma alanları"));
        assert_eq!(resp.action_items.len(), 1);
        assert_eq!(resp.action_items[0].kind, ActionKind::Location);
        assert!(resp.suggestions.len() <= 4);
        assert!((resp.confidence - 0.9).abs() < 1e-9);
    }
}
