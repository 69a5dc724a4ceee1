// Report agent: aggregates every tool result into a structured status
// report with summary, prioritized sections, metrics, and recommendations.

use crate::atoms::types::{
    ActionItem, ActionKind, AgentId, AgentResponse, Priority, ToolResult, UserContext,
};
use crate::engine::agents::{cap_suggestions, mean_confidence, ResponderAgent};
use async_trait::async_trait;
use serde_json::{json, Value};

struct Section {
    title: &'static str,
    content: String,
    priority: Priority,
}

pub struct ReportAgent;

impl ReportAgent {
    fn of_kind<'a>(results: &'a [ToolResult], kind: &str) -> Vec<&'a ToolResult> {
        results.iter().filter(|r| r.kind == kind).collect()
    }

    fn summary(results: &[ToolResult], location: &str) -> String {
        let active: Vec<&ToolResult> = results.iter().filter(|r| r.confidence > 0.5).collect();
        if active.is_empty() {
            return format!(
                "{} için yeterli veri bulunamadı. Lütfen daha sonra tekrar deneyin.",
                location,
            );
        }

        let mut summary = format!("{} için güncel durum raporu:\n\n", location);
        let count = |kind: &str| active.iter().filter(|r| r.kind == kind).count();

        if count("location") > 0 {
            summary.push_str(&format!("📍 Konum: {} güvenli alan tespit edildi\n", count("location")));
        }
        if count("network") > 0 {
            summary.push_str(&format!("📡 Şebeke: {} operatör durumu analiz edildi\n", count("network")));
        }
        if count("social") > 0 {
            summary.push_str(&format!("🐦 Sosyal Medya: {} insight toplandı\n", count("social")));
        }
        if count("emergency") > 0 {
            summary.push_str(&format!("🚨 Acil Durum: {} uyarı aktif\n", count("emergency")));
        }
        summary
    }

    fn sections(results: &[ToolResult]) -> Vec<Section> {
        let mut sections = Vec::new();

        let location = Self::of_kind(results, "location");
        if !location.is_empty() {
            sections.push(Section {
                title: "Konum ve Güvenlik",
                content: Self::location_section(&location),
                priority: Priority::High,
            });
        }
        let network = Self::of_kind(results, "network");
        if !network.is_empty() {
            sections.push(Section {
                title: "Şebeke Durumu",
                content: Self::network_section(&network),
                priority: Priority::Medium,
            });
        }
        let social = Self::of_kind(results, "social");
        if !social.is_empty() {
            sections.push(Section {
                title: "Sosyal Medya Analizi",
                content: Self::social_section(&social),
                priority: Priority::Low,
            });
        }
        let emergency = Self::of_kind(results, "emergency");
        if !emergency.is_empty() {
            sections.push(Section {
                title: "Acil Durum Uyarıları",
                content: Self::emergency_section(&emergency),
                priority: Priority::Critical,
            });
        }
        sections
    }

    fn location_section(results: &[&ToolResult]) -> String {
        let mut content = String::new();
        for result in results {
            if let Some(error) = result.data["error"].as_str() {
                content.push_str(&format!("❌ Konum bilgisi alınamadı: {}\n", error));
                continue;
            }
            if let Some(area) = result.data["nearestSafeArea"].as_object() {
                content.push_str(&format!(
                    "🏃 En Yakın Güvenli Alan: {} ({})\n",
                    area.get("name").and_then(Value::as_str).unwrap_or("-"),
                    area.get("distance").and_then(Value::as_str).unwrap_or("-"),
                ));
            }
            if let Some(areas) = result.data["safeAreas"].as_array().filter(|a| !a.is_empty()) {
                content.push_str(&format!("🏢 Toplam Güvenli Alan: {} adet\n", areas.len()));
                for (i, area) in areas.iter().take(3).enumerate() {
                    content.push_str(&format!(
                        "   {}. {} ({})\n",
                        i + 1,
                        area["name"].as_str().unwrap_or("-"),
                        area["distance"].as_str().unwrap_or("-"),
                    ));
                }
            }
        }
        content
    }

    fn network_section(results: &[&ToolResult]) -> String {
        let mut content = String::new();
        for result in results {
            if let Some(error) = result.data["error"].as_str() {
                content.push_str(&format!("❌ Şebeke bilgisi alınamadı: {}\n", error));
                continue;
            }
            content.push_str(&format!(
                "📡 Şebeke Durumu ({}):\n",
                result.data["location"].as_str().unwrap_or("-"),
            ));
            if let Some(operators) = result.data["operators"].as_object() {
                for (operator, status) in operators {
                    content.push_str(&format!(
                        "   • {}: {}\n",
                        operator,
                        status["status"].as_str().unwrap_or("Bilinmiyor"),
                    ));
                }
            }
            if let Some(recommendation) = result.data["recommendation"].as_str() {
                content.push_str(&format!("💡 Öneri: {}\n", recommendation));
            }
        }
        content
    }

    fn social_section(results: &[&ToolResult]) -> String {
        let mut content = String::new();
        for result in results {
            if let Some(error) = result.data["error"].as_str() {
                content.push_str(&format!("❌ Sosyal medya verisi alınamadı: {}\n", error));
                continue;
            }
            content.push_str(&format!(
                "🐦 Sosyal Medya Analizi ({}):\n",
                result.data["location"].as_str().unwrap_or("-"),
            ));
            if let Some(insights) = result.data["insights"].as_array().filter(|i| !i.is_empty()) {
                content.push_str(&format!("   • Toplam Insight: {}\n", insights.len()));
            }
            if let Some(trends) = result.data["trends"].as_array().filter(|t| !t.is_empty()) {
                let top: Vec<&str> = trends.iter().take(5).filter_map(Value::as_str).collect();
                content.push_str(&format!("   • Trend Konular: {}\n", top.join(", ")));
            }
            if let Some(sentiment) = result.data["sentimentSummary"].as_str() {
                content.push_str(&format!("   • Genel Duygu: {}\n", sentiment));
            }
        }
        content
    }

    fn emergency_section(results: &[&ToolResult]) -> String {
        let mut content = String::new();
        for result in results {
            if let Some(error) = result.data["error"].as_str() {
                content.push_str(&format!("❌ Acil durum bilgisi alınamadı: {}\n", error));
                continue;
            }
            content.push_str(&format!(
                "🚨 Acil Durum Uyarıları ({}):\n",
                result.data["location"].as_str().unwrap_or("-"),
            ));
            match result.data["emergencyAlerts"].as_array().filter(|a| !a.is_empty()) {
                Some(alerts) => {
                    for (i, alert) in alerts.iter().enumerate() {
                        content.push_str(&format!(
                            "   {}. {}: {}\n",
                            i + 1,
                            alert["type"].as_str().unwrap_or("uyarı"),
                            alert["severity"].as_str().unwrap_or("-"),
                        ));
                    }
                }
                None => content.push_str("   ✅ Aktif acil durum uyarısı yok\n"),
            }
            if let Some(contacts) = result.data["emergencyContacts"].as_array() {
                content.push_str("📞 Acil Durum Kişileri:\n");
                for contact in contacts {
                    content.push_str(&format!(
                        "   • {}: {}\n",
                        contact["name"].as_str().unwrap_or("-"),
                        contact["number"].as_str().unwrap_or("-"),
                    ));
                }
            }
        }
        content
    }

    fn metrics(results: &[ToolResult]) -> Value {
        let avg = if results.is_empty() {
            0.0
        } else {
            results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
        };
        let mut metrics = json!({
            "totalResults": results.len(),
            "highConfidenceResults": results.iter().filter(|r| r.confidence > 0.8).count(),
            "averageConfidence": avg,
        });

        for kind in ["location", "network", "social", "emergency", "notification"] {
            let of_kind: Vec<&ToolResult> = Self::of_kind(results, kind);
            let kind_avg = if of_kind.is_empty() {
                0.0
            } else {
                of_kind.iter().map(|r| r.confidence).sum::<f64>() / of_kind.len() as f64
            };
            metrics[format!("{}Count", kind)] = json!(of_kind.len());
            metrics[format!("{}Confidence", kind)] = json!(kind_avg);
        }
        metrics
    }

    fn recommendations(results: &[ToolResult]) -> Vec<String> {
        let mut recommendations = Vec::new();
        if results.iter().any(|r| r.kind == "emergency") {
            recommendations.push("Acil durum protokollerini gözden geçirin".to_string());
            recommendations.push("Güvenli alanların yerlerini öğrenin".to_string());
        }
        if results.iter().any(|r| r.kind == "network") {
            recommendations.push("En iyi operatörü kullanın".to_string());
            recommendations.push("Alternatif bağlantı yöntemleri hazırlayın".to_string());
        }
        recommendations.push("Düzenli olarak durum güncellemelerini kontrol edin".to_string());
        recommendations.push("Acil durum çantasını hazır bulundurun".to_string());
        recommendations.truncate(5);
        recommendations
    }

    fn message(
        location: &str,
        summary: &str,
        sections: &[Section],
        recommendations: &[String],
    ) -> String {
        let mut response = format!("📊 REACH+ Durum Raporu - {}\n\n{}\n\n", location, summary);

        for section in sections {
            let icon = match section.priority {
                Priority::Critical => "🚨",
                Priority::High => "⚡",
                Priority::Medium => "📋",
                Priority::Low => "📝",
            };
            response.push_str(&format!("{} {}:\n{}\n\n", icon, section.title, section.content));
        }

        if !recommendations.is_empty() {
            response.push_str("💡 Öneriler:\n");
            for (i, recommendation) in recommendations.iter().enumerate() {
                response.push_str(&format!("{}. {}\n", i + 1, recommendation));
            }
        }
        response
    }
}

#[async_trait]
impl ResponderAgent for ReportAgent {
    fn id(&self) -> AgentId {
        AgentId::Report
    }

    async fn execute(
        &self,
        _query: &str,
        user_context: &UserContext,
        tool_results: &[ToolResult],
    ) -> AgentResponse {
        let location = user_context.district_or("İstanbul");
        let summary = Self::summary(tool_results, &location);
        let sections = Self::sections(tool_results);
        let recommendations = Self::recommendations(tool_results);
        let message = Self::message(&location, &summary, &sections, &recommendations);

        let mut action_items = Vec::new();
        if sections.iter().any(|s| s.priority == Priority::Critical) {
            action_items.push(ActionItem {
                kind: ActionKind::Emergency,
                title: "Acil durum protokolünü uygula".to_string(),
                data: json!({ "metrics": Self::metrics(tool_results) }),
                priority: Priority::Critical,
            });
        }
        action_items.push(ActionItem {
            kind: ActionKind::Report,
            title: "Raporu paylaş".to_string(),
            data: json!({ "metrics": Self::metrics(tool_results) }),
            priority: Priority::Medium,
        });

        let suggestions = cap_suggestions(vec![
            "Detaylı analiz istiyorum".to_string(),
            "Grafik görünümü göster".to_string(),
            "PDF olarak indir".to_string(),
            "E-posta ile gönder".to_string(),
        ]);
        let confidence = mean_confidence(tool_results);

        AgentResponse::new(message, suggestions, action_items, tool_results.to_vec(), confidence)
    }
}
