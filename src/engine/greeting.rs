// Agent Engine — Greeting Handler
// Short-circuit responses for greeting messages: no tool runs, fixed
// response with confidence 1.0.

use crate::atoms::types::AgentResponse;
use chrono::{Local, Timelike};

const GREETING_MESSAGE: &str = "Merhaba! Ben Reach+ AI Destek Asistanı. Size nasıl yardımcı olabilirim? Eğer acil bir durumdaysanız veya herhangi bir konuda destek ihtiyacınız varsa, lütfen bana söyleyin. Buradayım ve sizinle birlikteyim! 🤖";

/// The four fixed greeting suggestions.
pub const GREETING_SUGGESTIONS: [&str; 4] = [
    "Acil durum bildir",
    "Güvenli alanları öğren",
    "Konumumu paylaş",
    "Yardım talep et",
];

#[derive(Debug, Clone, Copy, Default)]
pub struct GreetingHandler;

impl GreetingHandler {
    pub fn new() -> Self {
        GreetingHandler
    }

    /// Fixed greeting response — confidence 1.0 is the one place the 0.95
    /// cap does not apply, since no synthesis is involved.
    pub fn greeting_response(&self) -> AgentResponse {
        AgentResponse {
            message: GREETING_MESSAGE.to_string(),
            suggestions: GREETING_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
            action_items: Vec::new(),
            tool_results: Vec::new(),
            confidence: 1.0,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Time-of-day contextual greeting line.
    pub fn contextual_greeting(&self) -> &'static str {
        match Local::now().hour() {
            5..=11 => "Günaydın! 🌅",
            12..=16 => "İyi günler! ☀️",
            17..=21 => "İyi akşamlar! 🌆",
            _ => "İyi geceler! 🌙",
        }
    }

    /// Personalized greeting with an optional user name.
    pub fn personalized_greeting(&self, user_name: Option<&str>) -> String {
        let contextual = self.contextual_greeting();
        match user_name {
            Some(name) => format!(
                "{} {}! Ben Reach+ AI Destek Asistanı. Size nasıl yardımcı olabilirim?",
                contextual, name
            ),
            None => format!(
                "{} Ben Reach+ AI Destek Asistanı. Size nasıl yardımcı olabilirim?",
                contextual
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_response_is_fixed() {
        let resp = GreetingHandler::new().greeting_response();
        assert_eq!(resp.confidence, 1.0);
        assert_eq!(resp.suggestions.len(), 4);
        assert!(resp.action_items.is_empty());
        assert!(resp.tool_results.is_empty());
    }

    #[test]
    fn personalized_greeting_includes_name() {
        let line = GreetingHandler::new().personalized_greeting(Some("Ayşe"));
        assert!(line.contains("Ayşe"));
    }
}
