// Action agent: builds a concrete action plan from emergency and
// notification results plus query cues.

use crate::atoms::types::{
    ActionItem, ActionKind, AgentId, AgentResponse, Priority, ToolResult, UserContext,
};
use crate::engine::agents::{cap_suggestions, mean_confidence, ResponderAgent};
use async_trait::async_trait;
use serde_json::{json, Value};

const RELEVANT_KINDS: &[&str] = &["emergency", "notification"];

struct PlannedAction {
    kind: ActionKind,
    title: String,
    description: String,
    priority: Priority,
    data: Value,
}

pub struct ActionAgent;

impl ActionAgent {
    fn build_plan(
        query: &str,
        results: &[ToolResult],
        user_context: &UserContext,
    ) -> Vec<PlannedAction> {
        let lower = query.to_lowercase();
        let mut actions = Vec::new();

        if let Some(emergency) = results.iter().find(|r| r.kind == "emergency") {
            actions.push(PlannedAction {
                kind: ActionKind::Emergency,
                title: "112 Acil Çağrı Merkezini Ara".to_string(),
                description: "Acil durum için 112 numarasını arayın".to_string(),
                priority: Priority::Critical,
                data: emergency.data.clone(),
            });
            if emergency.data["isUrgent"] == true {
                actions.push(PlannedAction {
                    kind: ActionKind::Emergency,
                    title: "Güvenlik Protokolünü Uygula".to_string(),
                    description: "Acil durum güvenlik önlemlerini alın".to_string(),
                    priority: Priority::Critical,
                    data: json!({
                        "recommendations": emergency.data["safetyRecommendations"]
                    }),
                });
            }
        }

        if let Some(notification) = results.iter().find(|r| r.kind == "notification") {
            if notification.data["canSend"] == true {
                actions.push(PlannedAction {
                    kind: ActionKind::Notification,
                    title: "Bildirim Gönder".to_string(),
                    description: format!(
                        "{} ile bildirim gönder",
                        notification.data["type"].as_str().unwrap_or("push"),
                    ),
                    priority: Priority::Medium,
                    data: notification.data.clone(),
                });
            }
        }

        if lower.contains("güvenli") {
            actions.push(PlannedAction {
                kind: ActionKind::Location,
                title: "Güvenli Alana Git".to_string(),
                description: "En yakın güvenli alana yönlendir".to_string(),
                priority: Priority::High,
                data: json!({ "userLocation": user_context.location }),
            });
        }

        if lower.contains("şebeke") || lower.contains("internet") {
            actions.push(PlannedAction {
                kind: ActionKind::Network,
                title: "Şebeke Test Et".to_string(),
                description: "Mevcut şebeke bağlantısını test et".to_string(),
                priority: Priority::Medium,
                data: json!({ "operator": user_context.operator }),
            });
        }

        actions
    }

    fn plan_priority(actions: &[PlannedAction]) -> Priority {
        actions
            .iter()
            .map(|a| a.priority)
            .max()
            .unwrap_or(Priority::Medium)
    }

    fn message(actions: &[PlannedAction]) -> String {
        if actions.is_empty() {
            return "Bu konuda herhangi bir aksiyon gerekmiyor. Başka bir konuda yardımcı olabilirim."
                .to_string();
        }

        let mut response = String::from("🎯 Aksiyon Planı:\n\n");
        for (i, action) in actions.iter().enumerate() {
            response.push_str(&format!("{}. {}\n   {}\n", i + 1, action.title, action.description));
            if action.priority == Priority::Critical {
                response.push_str("   ⚠️ ACİL - Hemen yapılmalı\n");
            }
            response.push('\n');
        }

        match Self::plan_priority(actions) {
            Priority::Critical => response
                .push_str("🚨 Bu aksiyonlar acil durum için kritik önemde! Hemen uygulayın."),
            Priority::High => {
                response.push_str("⚡ Bu aksiyonlar öncelikli olarak yapılmalı.")
            }
            _ => response.push_str("✅ Bu aksiyonlar zamanınız olduğunda yapılabilir."),
        }
        response
    }

    fn suggestions(results: &[ToolResult]) -> Vec<String> {
        let mut suggestions = Vec::new();
        if results.iter().any(|r| r.kind == "emergency") {
            suggestions.push("Acil durum protokolü nedir?".to_string());
            suggestions.push("Güvenlik önlemleri neler?".to_string());
        }
        if results.iter().any(|r| r.kind == "notification") {
            suggestions.push("Bildirim göndermek istiyorum".to_string());
            suggestions.push("Aileme nasıl haber verebilirim?".to_string());
        }
        suggestions.push("Başka ne yapabilirim?".to_string());
        suggestions.push("Yardım nasıl isteyebilirim?".to_string());
        cap_suggestions(suggestions)
    }
}

#[async_trait]
impl ResponderAgent for ActionAgent {
    fn id(&self) -> AgentId {
        AgentId::Action
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

        let actions = Self::build_plan(query, &relevant, user_context);
        let message = Self::message(&actions);
        let suggestions = Self::suggestions(&relevant);
        let action_items: Vec<ActionItem> = actions
            .into_iter()
            .map(|a| ActionItem {
                kind: a.kind,
                title: a.title,
                data: a.data,
                priority: a.priority,
            })
            .collect();
        let confidence = mean_confidence(&relevant);

        AgentResponse::new(message, suggestions, action_items, relevant, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn urgent_emergency_result_yields_critical_plan() {
        let results = [ToolResult::new(
            "emergency",
            json!({
                "isUrgent": true,
                "safetyRecommendations": ["112'yi arayın"],
            }),
            0.95,
            "emergency",
        )];
        let resp = ActionAgent
            .execute("acil yardım", &UserContext::new("u1"), &results)
            .await;

        assert!(resp.message.contains("kritik önemde"));
        assert_eq!(resp.action_items.len(), 2);
        assert!(resp.action_items.iter().all(|a| a.priority == Priority::Critical));
    }

    #[tokio::test]
    async fn no_relevant_results_yields_no_action_message() {
        let resp = ActionAgent.execute("merak ettim", &UserContext::new("u1"), &[]).await;
        assert!(resp.message.contains("aksiyon gerekmiyor"));
        assert!(resp.action_items.is_empty());
        assert_eq!(resp.confidence, 0.1);
    }

    #[tokio::test]
    async fn notification_result_adds_send_action() {
        let results = [ToolResult::new(
            "notification",
            json!({ "canSend": true, "type": "sms" }),
            0.9,
            "notification",
        )];
        let resp = ActionAgent
            .execute("aileme sms gönder", &UserContext::new("u1"), &results)
            .await;
        assert!(resp.action_items.iter().any(|a| a.kind == ActionKind::Notification));
    }
}
