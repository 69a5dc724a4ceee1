// Emergency agent: assesses incident severity, assembles safety protocols
// and emergency contacts, and formats an urgent briefing.

use crate::atoms::types::{
    ActionItem, ActionKind, AgentId, AgentResponse, Priority, Severity, ToolResult, UserContext,
};
use crate::engine::agents::{cap_suggestions, mean_confidence, ResponderAgent};
use crate::engine::classify;
use async_trait::async_trait;
use serde_json::{json, Value};

const RELEVANT_KINDS: &[&str] = &["emergency", "notification"];

struct ImmediateAction {
    title: String,
    description: String,
    priority: Priority,
    data: Value,
}

struct Assessment {
    severity: Severity,
    immediate_actions: Vec<ImmediateAction>,
    safety_protocols: Vec<String>,
    contacts: Vec<Value>,
    location: String,
}

pub struct EmergencyAgent;

impl EmergencyAgent {
    fn assess(query: &str, results: &[ToolResult], user_context: &UserContext) -> Assessment {
        let (mut severity, _urgent) = classify::incident_severity(query);
        let mut immediate_actions = Vec::new();
        let mut safety_protocols = Vec::new();

        for result in results {
            match result.kind.as_str() {
                "emergency" => {
                    if result.data["error"].is_string() {
                        immediate_actions.push(ImmediateAction {
                            title: "Veri Hatası".to_string(),
                            description: "Acil durum verisi alınamadı, manuel kontrol gerekli"
                                .to_string(),
                            priority: Priority::High,
                            data: json!({}),
                        });
                        continue;
                    }
                    if result.data["isUrgent"] == true {
                        severity = Severity::Critical;
                    }
                    if let Some(alerts) =
                        result.data["emergencyAlerts"].as_array().filter(|a| !a.is_empty())
                    {
                        immediate_actions.push(ImmediateAction {
                            title: "Aktif Uyarılar".to_string(),
                            description: format!("{} aktif uyarı tespit edildi", alerts.len()),
                            priority: Priority::Critical,
                            data: json!({ "alerts": alerts }),
                        });
                    }
                    if let Some(recommendations) =
                        result.data["safetyRecommendations"].as_array()
                    {
                        safety_protocols.extend(
                            recommendations
                                .iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string),
                        );
                    }
                }
                "notification" => {
                    if result.data["canSend"] == true {
                        immediate_actions.push(ImmediateAction {
                            title: "Bildirim Gönder".to_string(),
                            description: format!(
                                "{} ile acil durum bildirimi gönder",
                                result.data["type"].as_str().unwrap_or("push"),
                            ),
                            priority: if severity == Severity::Critical {
                                Priority::Critical
                            } else {
                                Priority::High
                            },
                            data: result.data.clone(),
                        });
                    }
                }
                _ => {}
            }
        }

        safety_protocols.extend(Self::protocols(severity, query));
        let contacts = Self::contacts(severity);

        Assessment {
            severity,
            immediate_actions,
            safety_protocols,
            contacts,
            location: user_context.district_or("Bilinmiyor"),
        }
    }

    fn protocols(severity: Severity, query: &str) -> Vec<String> {
        let lower = query.to_lowercase();
        let mut protocols = Vec::new();

        if severity == Severity::Critical {
            protocols.push("112 Acil Çağrı Merkezini hemen arayın".to_string());
            protocols.push("Güvenli bir yere geçin".to_string());
            protocols.push("Acil durum çantanızı alın".to_string());
        }
        if lower.contains("deprem") {
            protocols.push("Çök, kapan, tutun pozisyonu alın".to_string());
            protocols.push("Asansör kullanmayın".to_string());
            protocols.push("Pencere ve camlardan uzak durun".to_string());
        }
        if lower.contains("yangın") {
            protocols.push("Hemen binayı terk edin".to_string());
            protocols.push("Asansör kullanmayın".to_string());
            protocols.push("Kapıları kapatın".to_string());
        }
        if lower.contains("sel") {
            protocols.push("Yüksek yerlere çıkın".to_string());
            protocols.push("Su seviyesini takip edin".to_string());
            protocols.push("Elektrikli cihazları kapatın".to_string());
        }

        protocols.push("Acil durum numarası: 112".to_string());
        protocols.push("Güvenli alana gidin".to_string());
        protocols.push("Aile ve arkadaşlarınızı bilgilendirin".to_string());
        protocols
    }

    /// Full contact list; in critical incidents only the critical and
    /// high-priority lines are surfaced.
    fn contacts(severity: Severity) -> Vec<Value> {
        let all = vec![
            json!({ "name": "Acil Çağrı Merkezi", "number": "112", "type": "emergency", "priority": "critical" }),
            json!({ "name": "Ambulans", "number": "112", "type": "medical", "priority": "high" }),
            json!({ "name": "İtfaiye", "number": "110", "type": "fire", "priority": "high" }),
            json!({ "name": "Polis", "number": "155", "type": "police", "priority": "medium" }),
        ];

        if severity == Severity::Critical {
            all.into_iter()
                .filter(|c| c["priority"] == "critical" || c["priority"] == "high")
                .collect()
        } else {
            all
        }
    }

    fn message(assessment: &Assessment) -> String {
        let mut response = match assessment.severity {
            Severity::Critical => {
                "🚨 ACİL DURUM TESPİT EDİLDİ! 🚨\n\nHemen aşağıdaki adımları takip edin:\n\n"
                    .to_string()
            }
            Severity::High => {
                "⚠️ YÜKSEK ÖNCELİKLİ DURUM ⚠️\n\nAşağıdaki önlemleri alın:\n\n".to_string()
            }
            _ => "📋 Güvenlik Durumu\n\nMevcut durum ve öneriler:\n\n".to_string(),
        };

        if !assessment.immediate_actions.is_empty() {
            response.push_str("🎯 HEMEN YAPILACAKLAR:\n");
            for (i, action) in assessment.immediate_actions.iter().enumerate() {
                let icon = if action.priority == Priority::Critical { "🚨" } else { "⚡" };
                response.push_str(&format!(
                    "{} {}. {}\n   {}\n\n",
                    icon,
                    i + 1,
                    action.title,
                    action.description,
                ));
            }
        }

        if !assessment.safety_protocols.is_empty() {
            response.push_str("🛡️ GÜVENLİK PROTOKOLLERİ:\n");
            for (i, protocol) in assessment.safety_protocols.iter().enumerate() {
                response.push_str(&format!("{}. {}\n", i + 1, protocol));
            }
            response.push('\n');
        }

        if !assessment.contacts.is_empty() {
            response.push_str("📞 ACİL DURUM KİŞİLERİ:\n");
            for contact in &assessment.contacts {
                let icon = if contact["priority"] == "critical" { "🚨" } else { "📞" };
                response.push_str(&format!(
                    "{} {}: {}\n",
                    icon,
                    contact["name"].as_str().unwrap_or("-"),
                    contact["number"].as_str().unwrap_or("-"),
                ));
            }
            response.push('\n');
        }

        response.push_str(&format!("📍 Konum: {}\n", assessment.location));
        response
    }

    fn suggestions(assessment: &Assessment) -> Vec<String> {
        let mut suggestions = if assessment.severity == Severity::Critical {
            vec![
                "112'yi aramak istiyorum".to_string(),
                "Güvenli alana nasıl giderim?".to_string(),
                "Aileme nasıl haber verebilirim?".to_string(),
            ]
        } else {
            vec![
                "Güvenlik önlemleri neler?".to_string(),
                "Acil durum çantası nedir?".to_string(),
                "Toplanma alanları nerede?".to_string(),
            ]
        };
        suggestions.push("Yardım nasıl isteyebilirim?".to_string());
        suggestions.push("Durum nasıl?".to_string());
        cap_suggestions(suggestions)
    }

    fn action_items(assessment: &Assessment) -> Vec<ActionItem> {
        let mut items: Vec<ActionItem> = assessment
            .immediate_actions
            .iter()
            .map(|action| ActionItem {
                kind: ActionKind::Emergency,
                title: action.title.clone(),
                data: action.data.clone(),
                priority: action.priority,
            })
            .collect();

        if !assessment.safety_protocols.is_empty() {
            items.push(ActionItem {
                kind: ActionKind::Emergency,
                title: "Güvenlik protokollerini uygula".to_string(),
                data: json!({ "protocols": assessment.safety_protocols }),
                priority: if assessment.severity == Severity::Critical {
                    Priority::Critical
                } else {
                    Priority::High
                },
            });
        }

        if !assessment.contacts.is_empty() {
            items.push(ActionItem {
                kind: ActionKind::Emergency,
                title: "Acil durum kişilerini ara".to_string(),
                data: json!({ "contacts": assessment.contacts }),
                priority: if assessment.severity == Severity::Critical {
                    Priority::Critical
                } else {
                    Priority::Medium
                },
            });
        }

        items
    }
}

#[async_trait]
impl ResponderAgent for EmergencyAgent {
    fn id(&self) -> AgentId {
        AgentId::Emergency
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

        let assessment = Self::assess(query, &relevant, user_context);
        let message = Self::message(&assessment);
        let suggestions = Self::suggestions(&assessment);
        let action_items = Self::action_items(&assessment);
        let confidence = mean_confidence(&relevant);

        AgentResponse::new(message, suggestions, action_items, relevant, confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn critical_incident_filters_contacts_and_escalates() {
        let results = [ToolResult::new(
            "emergency",
            json!({
                "isUrgent": true,
                "emergencyAlerts": [{ "type": "deprem" }],
                "safetyRecommendations": ["Güvenli alana gidin"],
            }),
            0.95,
            "emergency",
        )];
        let resp = EmergencyAgent
            .execute("deprem oldu enkaz altındayım", &UserContext::new("u1"), &results)
            .await;

        assert!(resp.message.starts_with("🚨 ACİL DURUM TESPİT EDİLDİ"));
        // Critical incidents drop the medium-priority contact line.
        assert!(!resp.message.contains("155"));
        assert!(resp.message.contains("Çök, kapan, tutun pozisyonu alın"));
        assert!(resp.suggestions.contains(&"112'yi aramak istiyorum".to_string()));
    }

    #[tokio::test]
    async fn mild_query_keeps_full_contact_list() {
        let resp = EmergencyAgent
            .execute("toplanma alanı bilgisi", &UserContext::new("u1"), &[])
            .await;
        assert!(resp.message.contains("155"));
        assert_eq!(resp.confidence, 0.1);
    }

    #[tokio::test]
    async fn flood_query_adds_flood_protocols() {
        let resp = EmergencyAgent
            .execute("sel basıyor ne yapmalıyım", &UserContext::new("u1"), &[])
            .await;
        assert!(resp.message.contains("Yüksek yerlere çıkın"));
    }
}
