// Web search tool: routes a query to one of three canned branches —
// operator comparison, population/demographics, or general search. Reference
// data stands in for a live search API.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ToolInput, ToolResult};
use crate::engine::registry::Tool;
use crate::engine::tools::matches_any;
use async_trait::async_trait;
use serde_json::{json, Value};

const KEYWORDS: &[&str] = &[
    "araştır", "internet", "web", "güncel", "son veriler", "istatistik",
    "nüfus", "yoğunluk", "operatör", "karşılaştır", "hangi", "en iyi",
    "türk telekom", "vodafone", "turkcell", "kapsama", "hız", "fiyat",
    "genç nüfus", "demografi", "yaş dağılımı", "nüfus yoğunluğu",
];

const OPERATOR_KEYWORDS: &[&str] = &[
    "operatör", "türk telekom", "vodafone", "turkcell", "hangi operatör",
    "en iyi operatör", "karşılaştır", "seç", "öner",
];

const POPULATION_KEYWORDS: &[&str] = &[
    "nüfus", "yoğunluk", "genç nüfus", "demografi", "yaş dağılımı",
    "nüfus yoğunluğu", "gençlik", "öğrenci", "üniversite",
];

#[derive(Debug, Default)]
pub struct WebSearchTool;

impl WebSearchTool {
    pub fn new() -> Self {
        WebSearchTool
    }

    fn operator_comparison(location: &str) -> Value {
        let operators = [
            ("Türk Telekom", 92, 100, "Orta", 8.5, "En geniş kapsama", "Stabil bağlantı"),
            ("Vodafone", 85, 120, "Yüksek", 8.2, "Hızlı internet", "5G desteği"),
            ("Turkcell", 94, 95, "Düşük", 7.8, "Uygun fiyat", "Geniş kapsama"),
        ];

        let mut content = format!("{} Bölgesi Operatör Karşılaştırması:\n\n", location);
        for (i, (name, coverage, speed, price, score, adv1, adv2)) in
            operators.iter().enumerate()
        {
            content.push_str(&format!(
                "{}. {}\n   Kapsama: %{}\n   Hız: {} Mbps\n   Fiyat: {}\n   Puan: {}/10\n   Avantajlar: {}, {}\n\n",
                i + 1, name, coverage, speed, price, score, adv1, adv2,
            ));
        }
        let best = operators
            .iter()
            .max_by(|a, b| a.4.partial_cmp(&b.4).unwrap_or(std::cmp::Ordering::Equal));
        if let Some((name, _, _, _, _, adv1, adv2)) = best {
            content.push_str(&format!("🏆 ÖNERİ: {}\nNeden: {} ve {}", name, adv1, adv2));
        }

        json!([{
            "title": format!("{} Operatör Karşılaştırması", location),
            "snippet": format!("{} bölgesinde operatör performans analizi", location),
            "content": content,
            "relevanceScore": 0.95,
        }])
    }

    fn population_analysis(location: &str) -> Value {
        let total: u64 = 180_000;
        let youth: u64 = 58_000;
        let youth_pct = youth as f64 / total as f64 * 100.0;

        let mut content = format!("{} Nüfus ve Demografi Analizi:\n\n", location);
        content.push_str(&format!(
            "📊 Genel Bilgiler:\n• Toplam Nüfus: {}\n• Genç Nüfus (15-24): {} (%{:.1})\n• Nüfus Yoğunluğu: 2400 kişi/km²\n\n",
            total, youth, youth_pct,
        ));
        content.push_str("🎓 Eğitim:\n• Üniversite Sayısı: 2\n• Öğrenci Sayısı: 24000\n\n");
        content.push_str("💡 Analiz:\n");
        if youth_pct > 30.0 {
            content.push_str("• Bu bölge genç nüfus yoğunluğu yüksek\n• Mobil internet talebi yüksek olabilir\n");
        } else if youth_pct > 20.0 {
            content.push_str("• Bu bölge orta düzeyde genç nüfus\n• Dengeli operatör seçimi yapılabilir\n");
        } else {
            content.push_str("• Bu bölge daha yaşlı nüfus ağırlıklı\n• Kapsama ve güvenilirlik öncelikli\n");
        }

        json!([{
            "title": format!("{} Nüfus ve Demografi Analizi", location),
            "snippet": format!("{} bölgesi nüfus yoğunluğu ve genç nüfus oranı", location),
            "content": content,
            "relevanceScore": 0.92,
        }])
    }

    fn general_search(query: &str, location: &str) -> Value {
        json!([{
            "title": format!("{} - {} için arama sonuçları", query, location),
            "snippet": format!("{} konusunda {} için güncel bilgiler", query, location),
            "content": format!(
                "Arama sorgusu: \"{}\"\nKonum: {}\n\nBu konuda daha detaylı bilgi için spesifik sorular sorabilirsiniz.",
                query, location,
            ),
            "relevanceScore": 0.7,
        }])
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &'static str {
        "websearch"
    }

    fn description(&self) -> &'static str {
        "Web araması yapar, gerçek zamanlı veri toplar ve analiz eder"
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

        let results = if matches_any(&lower, OPERATOR_KEYWORDS) {
            Self::operator_comparison(&location)
        } else if matches_any(&lower, POPULATION_KEYWORDS) {
            Self::population_analysis(&location)
        } else {
            Self::general_search(&input.query, &location)
        };

        Ok(Some(ToolResult::new(
            "websearch",
            json!({
                "query": input.query,
                "results": results,
                "location": location,
            }),
            0.85,
            self.name(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::types::UserContext;

    fn make_input(query: &str) -> ToolInput {
        ToolInput { query: query.to_string(), user_context: UserContext::new("u1") }
    }

    #[tokio::test]
    async fn operator_query_takes_comparison_branch() {
        let tool = WebSearchTool::new();
        let result =
            tool.execute(&make_input("hangi operatör en iyi")).await.unwrap().unwrap();
        assert_eq!(result.confidence, 0.85);
        let content = result.data["results"][0]["content"].as_str().unwrap();
        assert!(content.contains("Operatör Karşılaştırması"));
        assert!(content.contains("ÖNERİ"));
    }

    #[tokio::test]
    async fn population_query_takes_demographics_branch() {
        let tool = WebSearchTool::new();
        let result = tool
            .execute(&make_input("bölgedeki genç nüfus yoğunluğu nedir"))
            .await
            .unwrap()
            .unwrap();
        let title = result.data["results"][0]["title"].as_str().unwrap();
        assert!(title.contains("Nüfus ve Demografi"));
    }

    #[tokio::test]
    async fn other_queries_take_general_branch() {
        let tool = WebSearchTool::new();
        let result =
            tool.execute(&make_input("güncel hava durumunu araştır")).await.unwrap().unwrap();
        let title = result.data["results"][0]["title"].as_str().unwrap();
        assert!(title.contains("arama sonuçları"));
    }
}
