// Notification tool: drafts an outbound message (sms/email/push/call) with
// inferred recipients. Nothing is actually sent from here.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ToolInput, ToolResult};
use crate::engine::registry::Tool;
use crate::engine::tools::matches_any;
use async_trait::async_trait;
use serde_json::json;

const KEYWORDS: &[&str] = &[
    "bildirim", "sms", "e-posta", "email", "push", "uyarı", "gönder",
    "haber ver", "bilgilendir", "arama", "çağır",
];

#[derive(Debug, Default)]
pub struct NotificationTool;

impl NotificationTool {
    pub fn new() -> Self {
        NotificationTool
    }

    fn notification_type(lower: &str) -> &'static str {
        if lower.contains("sms") || lower.contains("mesaj") {
            "sms"
        } else if lower.contains("e-posta") || lower.contains("email") {
            "email"
        } else if lower.contains("arama") || lower.contains("çağır") {
            "call"
        } else {
            "push"
        }
    }

    fn recipients(lower: &str) -> Vec<&'static str> {
        let mut recipients = Vec::new();
        if lower.contains("aile") || lower.contains("anne") || lower.contains("baba") {
            recipients.push("family");
        }
        if lower.contains("arkadaş") || lower.contains("dost") {
            recipients.push("friends");
        }
        if lower.contains("acil") || lower.contains("112") {
            recipients.push("emergency");
        }
        recipients
    }

    fn draft_message(lower: &str, query: &str, location: &str) -> String {
        if lower.contains("acil") {
            format!("ACİL DURUM: {} konumunda yardıma ihtiyacım var.", location)
        } else if lower.contains("güvenli") {
            format!("Güvenli alana ulaştım. Konum: {}.", location)
        } else {
            format!("REACH+ bildirimi: {}. Konum: {}.", query, location)
        }
    }
}

#[async_trait]
impl Tool for NotificationTool {
    fn name(&self) -> &'static str {
        "notification"
    }

    fn description(&self) -> &'static str {
        "Bildirim gönderme, SMS, push notification ve e-posta servisleri sağlar"
    }

    fn can_handle(&self, query: &str) -> bool {
        matches_any(&query.to_lowercase(), KEYWORDS)
    }

    async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>> {
        if !self.can_handle(&input.query) {
            return Ok(None);
        }

        let lower = input.query.to_lowercase();
        let location = input.user_context.district_or("Bilinmiyor");

        Ok(Some(ToolResult::new(
            "notification",
            json!({
                "type": Self::notification_type(&lower),
                "recipients": Self::recipients(&lower),
                "message": Self::draft_message(&lower, &input.query, &location),
                "canSend": true,
            }),
            0.9,
            self.name(),
        )))
    }
}
