// Recommendation tool: contextual multi-armed bandit over a small action
// catalog. Scores combine expected reward, a UCB1 exploration bonus,
// recorded per-context rewards, and emergency/time/location/intent bonuses.
// Feedback arrives through `record_interaction`.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{Severity, ToolInput, ToolResult, UserContext};
use crate::engine::registry::Tool;
use crate::engine::tools::matches_any;
use async_trait::async_trait;
use chrono::{Local, Timelike};
use log::debug;
use parking_lot::Mutex;
use serde_json::json;
use std::collections::HashMap;

const EXPLORATION_FACTOR: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActionKind {
    Location,
    Network,
    Emergency,
    Notification,
    Social,
}

impl ActionKind {
    fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Location => "location",
            ActionKind::Network => "network",
            ActionKind::Emergency => "emergency",
            ActionKind::Notification => "notification",
            ActionKind::Social => "social",
        }
    }
}

#[derive(Debug, Clone)]
struct CandidateAction {
    id: String,
    kind: ActionKind,
    title: String,
    description: String,
    confidence: f64,
    expected_reward: f64,
    context_relevance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    fn current() -> Self {
        match Local::now().hour() {
            6..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            18..=21 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

#[derive(Default)]
struct BanditState {
    // user_id -> chosen action ids
    user_interactions: HashMap<String, Vec<String>>,
    // action id -> rewards
    action_rewards: HashMap<String, Vec<f64>>,
    // context key -> action id -> rewards
    context_rewards: HashMap<String, HashMap<String, Vec<f64>>>,
}

pub struct RecommendationTool {
    state: Mutex<BanditState>,
}

impl Default for RecommendationTool {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationTool {
    pub fn new() -> Self {
        RecommendationTool { state: Mutex::new(BanditState::default()) }
    }

    fn emergency_level(ctx: &UserContext) -> Severity {
        ctx.preferences
            .get("emergencyLevel")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(Severity::Low)
    }

    fn primary_intent(lower: &str) -> ActionKind {
        if matches_any(lower, &["acil", "emergency", "deprem", "yangın", "sel", "tehlike", "korku", "panik"]) {
            ActionKind::Emergency
        } else if matches_any(lower, &["sosyal medya", "sosyal", "twitter", "instagram", "çöktü", "giremiyorum"]) {
            ActionKind::Social
        } else if matches_any(lower, &["şebeke", "internet", "çekmiyor", "sinyal", "kapsama", "turkcell", "vodafone", "türk telekom"]) {
            ActionKind::Network
        } else if matches_any(lower, &["nerede", "konum", "güvenli", "alan", "hastane", "toplanma", "mahalle", "ilçe"]) {
            ActionKind::Location
        } else {
            ActionKind::Notification
        }
    }

    fn candidate_actions(
        level: Severity,
        district: &str,
        operator: Option<&str>,
    ) -> Vec<CandidateAction> {
        let mut actions = Vec::new();

        match level {
            Severity::Critical => actions.push(CandidateAction {
                id: "emergency_critical".to_string(),
                kind: ActionKind::Emergency,
                title: "🚨 KRİTİK: Acil durum aksiyonları".to_string(),
                description: "Hemen yapmanız gereken kritik aksiyonlar".to_string(),
                confidence: 0.95,
                expected_reward: 0.9,
                context_relevance: 1.0,
            }),
            Severity::High => actions.push(CandidateAction {
                id: "emergency_high".to_string(),
                kind: ActionKind::Emergency,
                title: "⚠️ Acil durum hazırlığı".to_string(),
                description: "Acil durum için hazırlık yapmanız gerekenler".to_string(),
                confidence: 0.9,
                expected_reward: 0.85,
                context_relevance: 0.95,
            }),
            _ => {}
        }

        if district != "Bilinmiyor" {
            actions.push(CandidateAction {
                id: format!("safe_area_{}", district),
                kind: ActionKind::Location,
                title: format!("📍 {} güvenli alanları", district),
                description: "Yakınınızdaki güvenli toplanma alanları ve hastaneler".to_string(),
                confidence: 0.8,
                expected_reward: 0.7,
                context_relevance: 0.9,
            });
        }

        if let Some(operator) = operator.filter(|o| *o != "Bilinmiyor") {
            actions.push(CandidateAction {
                id: format!("network_{}", operator),
                kind: ActionKind::Network,
                title: format!("📡 {} kapsama durumu", operator),
                description: format!("Mevcut konumunuzda {} şebeke kalitesi", operator),
                confidence: 0.85,
                expected_reward: 0.8,
                context_relevance: 0.8,
            });
        }

        actions.push(CandidateAction {
            id: "network_general".to_string(),
            kind: ActionKind::Network,
            title: "📶 Şebeke durumu genel".to_string(),
            description: "Tüm operatörlerin mevcut durumu".to_string(),
            confidence: 0.75,
            expected_reward: 0.7,
            context_relevance: 0.6,
        });

        if matches!(level, Severity::Low | Severity::Medium) {
            actions.push(CandidateAction {
                id: "notification_setup".to_string(),
                kind: ActionKind::Notification,
                title: "🔔 Bildirim ayarları".to_string(),
                description: "Acil durum bildirimlerini yapılandırın".to_string(),
                confidence: 0.7,
                expected_reward: 0.6,
                context_relevance: 0.7,
            });
        }

        actions.push(CandidateAction {
            id: "social_media_insights".to_string(),
            kind: ActionKind::Social,
            title: "📱 Sosyal medya durumu".to_string(),
            description: "Güncel sosyal medya analizi ve trendler".to_string(),
            confidence: 0.7,
            expected_reward: 0.65,
            context_relevance: 0.6,
        });

        actions
    }

    fn context_key(district: &str, city: &str, level: Severity, time: TimeOfDay) -> String {
        format!("{}_{}_{}_{}", district, city, level.as_str(), time.as_str())
    }

    fn exploration_bonus(state: &BanditState, user_id: &str, action_id: &str) -> f64 {
        let interactions = match state.user_interactions.get(user_id) {
            Some(list) if !list.is_empty() => list,
            _ => return 1.0,
        };
        let action_count = interactions.iter().filter(|id| *id == action_id).count();
        if action_count == 0 {
            return 1.0;
        }
        EXPLORATION_FACTOR
            * ((interactions.len() as f64).ln() / action_count as f64).sqrt()
    }

    fn exploitation_score(state: &BanditState, context_key: &str, action_id: &str) -> f64 {
        state
            .context_rewards
            .get(context_key)
            .and_then(|by_action| by_action.get(action_id))
            .filter(|rewards| !rewards.is_empty())
            .map(|rewards| rewards.iter().sum::<f64>() / rewards.len() as f64)
            .unwrap_or(0.5)
    }

    fn score(
        state: &BanditState,
        action: &CandidateAction,
        user_id: &str,
        context_key: &str,
        level: Severity,
        time: TimeOfDay,
        has_district: bool,
        intent: ActionKind,
    ) -> f64 {
        let base = action.expected_reward * action.context_relevance;
        let exploration = Self::exploration_bonus(state, user_id, &action.id);
        let exploitation = Self::exploitation_score(state, context_key, &action.id);

        let emergency_bonus = match (action.kind, level) {
            (ActionKind::Emergency, Severity::Critical) => 2.0,
            (ActionKind::Emergency, Severity::High) => 1.0,
            _ => 0.0,
        };
        let time_bonus = if time == TimeOfDay::Night && action.kind == ActionKind::Emergency {
            0.5
        } else {
            0.0
        };
        let location_bonus = if action.kind == ActionKind::Location && has_district {
            0.3
        } else {
            0.0
        };
        let intent_bonus = match (intent, action.kind) {
            (ActionKind::Social, ActionKind::Social) => 1.5,
            (ActionKind::Network, ActionKind::Network) => 1.2,
            (ActionKind::Location, ActionKind::Location) => 1.2,
            (ActionKind::Emergency, ActionKind::Emergency) => 1.0,
            (ActionKind::Notification, ActionKind::Notification) => 1.0,
            _ => 0.0,
        };

        base + exploration + exploitation + emergency_bonus + time_bonus + location_bonus
            + intent_bonus
    }

    /// Record user feedback for a chosen action. Reward is clamped to [0, 1].
    pub fn record_interaction(
        &self,
        user_id: &str,
        action_id: &str,
        reward: f64,
        context_key: &str,
    ) {
        let reward = reward.clamp(0.0, 1.0);
        let mut state = self.state.lock();
        state
            .user_interactions
            .entry(user_id.to_string())
            .or_default()
            .push(action_id.to_string());
        state
            .action_rewards
            .entry(action_id.to_string())
            .or_default()
            .push(reward);
        state
            .context_rewards
            .entry(context_key.to_string())
            .or_default()
            .entry(action_id.to_string())
            .or_default()
            .push(reward);
        debug!("[recommendation] feedback recorded: {} -> {}", action_id, reward);
    }

    /// Aggregate bandit statistics.
    pub fn performance(&self) -> serde_json::Value {
        let state = self.state.lock();
        let total: usize = state.user_interactions.values().map(Vec::len).sum();
        let rewards: Vec<f64> = state.action_rewards.values().flatten().copied().collect();
        let avg = if rewards.is_empty() {
            0.0
        } else {
            rewards.iter().sum::<f64>() / rewards.len() as f64
        };
        json!({
            "totalInteractions": total,
            "averageReward": avg,
            "uniqueUsers": state.user_interactions.len(),
            "uniqueActions": state.action_rewards.len(),
            "contextKeys": state.context_rewards.len(),
        })
    }
}

#[async_trait]
impl Tool for RecommendationTool {
    fn name(&self) -> &'static str {
        "recommendation"
    }

    fn description(&self) -> &'static str {
        "Kişiselleştirilmiş öneri motoru"
    }

    // Recommendations apply to every query; relevance is handled by scoring.
    fn can_handle(&self, _query: &str) -> bool {
        true
    }

    async fn execute(&self, input: &ToolInput) -> AgentResult<Option<ToolResult>> {
        let ctx = &input.user_context;
        let lower = input.query.to_lowercase();

        let level = Self::emergency_level(ctx);
        let district = ctx.district_or("Bilinmiyor");
        let city = ctx
            .location
            .as_ref()
            .map(|l| l.city.clone())
            .unwrap_or_else(|| "İstanbul".to_string());
        let time = TimeOfDay::current();
        let intent = Self::primary_intent(&lower);
        let context_key = Self::context_key(&district, &city, level, time);
        let has_district = district != "Bilinmiyor";

        let actions = Self::candidate_actions(level, &district, ctx.operator.as_deref());

        let selected = {
            let state = self.state.lock();
            actions
                .iter()
                .map(|action| {
                    let score = Self::score(
                        &state,
                        action,
                        &ctx.user_id,
                        &context_key,
                        level,
                        time,
                        has_district,
                        intent,
                    );
                    (action, score)
                })
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(action, _)| action.clone())
        };

        let Some(selected) = selected else {
            return Ok(None);
        };

        let alternatives: Vec<serde_json::Value> = actions
            .iter()
            .filter(|a| a.id != selected.id)
            .take(2)
            .map(|a| json!({ "id": a.id, "title": a.title, "confidence": a.confidence }))
            .collect();

        Ok(Some(ToolResult::new(
            "recommendation",
            json!({
                "actionId": selected.id,
                "type": selected.kind.as_str(),
                "title": selected.title,
                "description": selected.description,
                "alternatives": alternatives,
                "contextKey": context_key,
            }),
            selected.confidence,
            self.name(),
        )))
    }
}
