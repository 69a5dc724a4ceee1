// Agent Engine — Query Classification
// Single source of truth for every keyword table in the pipeline: emergency
// tiers, topic categories, request facets, complexity, sentiment, greetings.
// QueryProcessor, SupervisorAgent, and EmergencyAgent all consume this module
// instead of keeping their own drifting lists.
//
// Matching is case-insensitive substring membership over the lowercased
// query, same as the upstream keyword tests.

use crate::atoms::constants::{MAX_KEYWORDS, MAX_QUERY_CHARS};
use crate::atoms::types::{Sentiment, Severity};
use serde::{Deserialize, Serialize};

// ── Emergency level tiers (critical first — highest matching tier wins) ────

const CRITICAL_KEYWORDS: &[&str] = &[
    "acil yardım", "ambulans", "itfaiye", "112", "kritik", "tehlikede",
    "kurtarma", "yardım et", "ölüyor", "bayıldı", "kanama", "yangın",
];

const HIGH_KEYWORDS: &[&str] = &[
    "acil", "emergency", "deprem", "sel", "yangın", "tehlike", "panik",
    "korkuyorum", "korku", "endişe", "stres", "kötü", "iyi değil",
];

const MEDIUM_KEYWORDS: &[&str] = &[
    "sorun", "problem", "yardım", "destek", "bilgi", "nasıl", "ne yapmalı",
];

// ── Incident severity tiers (emergency-agent assessment, distinct scale) ───

const INCIDENT_CRITICAL: &[&str] = &[
    "acil", "emergency", "tehlike", "yangın", "deprem", "sel", "kurtarma",
    "yardım", "112", "ambulans", "itfaiye", "polis", "sıkıştım", "mahsur",
    "enkaz", "can kaybı", "yaralı",
];

const INCIDENT_HIGH: &[&str] = &[
    "hastane", "doktor", "ilaç", "kan", "oksijen", "nefes", "kalp",
    "bayılma", "koma", "şok", "travma",
];

const INCIDENT_MEDIUM: &[&str] = &[
    "güvenlik", "kaçış", "toplanma", "sığınak", "barınak", "yiyecek", "su",
    "elektrik", "ısıtma",
];

// ── Topic categories ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Location,
    Network,
    Social,
    Emergency,
    Hospital,
    FirstAid,
    Population,
    Notification,
}

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Location, &["konum", "nerede", "güvenli"]),
    (Category::Network, &["şebeke", "internet", "sinyal"]),
    (Category::Social, &["twitter", "sosyal", "trend"]),
    (Category::Emergency, &["acil", "emergency", "112"]),
    (Category::Hospital, &["hastane", "sağlık", "doktor"]),
    (Category::FirstAid, &["ilk yardım", "yaralı", "kanama"]),
    (
        Category::Population,
        &["nüfus", "demografik", "yaş", "cinsiyet", "genç", "yaşlı", "trend", "analiz"],
    ),
    (Category::Notification, &["bildirim", "sms", "email"]),
];

// ── Request facets ─────────────────────────────────────────────────────────

const EMERGENCY_FACET: &[&str] = &[
    "acil", "emergency", "tehlike", "yangın", "deprem", "sel", "kurtarma",
    "yardım", "112", "ambulans", "itfaiye",
];

const INFO_FACET: &[&str] = &[
    "nedir", "nasıl", "nerede", "ne zaman", "hangi", "bilgi", "durum",
    "şebeke", "konum", "güvenli", "trend",
];

const ACTION_FACET: &[&str] = &[
    "gönder", "arama", "çağır", "bildirim", "sms", "email", "yap", "et",
    "git", "gel", "kaydet",
];

const REPORT_FACET: &[&str] = &[
    "rapor", "özet", "durum", "analiz", "istatistik", "grafik", "chart",
    "sonuç", "bulgu",
];

const COMPLEX_KEYWORDS: &[&str] =
    &["analiz", "rapor", "karşılaştır", "değerlendir", "hesapla"];

// ── Greetings, stop words, sentiment ───────────────────────────────────────

const GREETINGS: &[&str] = &[
    "merhaba", "selam", "selamlar", "hey", "hi", "hello", "günaydın",
    "iyi günler", "iyi akşamlar", "iyi geceler", "nasılsın", "naber",
    "ne haber",
];

const STOP_WORDS: &[&str] = &[
    "ve", "veya", "ile", "için", "bir", "bu", "şu", "o", "ne", "nasıl",
    "nerede", "neden",
];

const POSITIVE_WORDS: &[&str] =
    &["teşekkür", "güzel", "iyi", "harika", "mükemmel", "süper"];

const NEGATIVE_WORDS: &[&str] = &[
    "kötü", "berbat", "korkunç", "acil", "tehlike", "yardım", "panik", "sorun",
];

// ── Result shapes ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

/// Boolean request facets the supervisor keys its agent selection on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Facets {
    pub is_emergency: bool,
    pub is_info_request: bool,
    pub is_action_request: bool,
    pub is_report_request: bool,
}

/// Full structured classification of one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub severity: Severity,
    pub categories: Vec<Category>,
    pub facets: Facets,
    pub complexity: Complexity,
    pub keywords: Vec<String>,
    pub sentiment: Sentiment,
    pub is_greeting: bool,
}

// ── Classification ─────────────────────────────────────────────────────────

fn contains_any(lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| lower.contains(k))
}

/// Classify a query into severity, categories, facets, complexity, keywords,
/// and sentiment in one pass. Pure — no side effects.
pub fn classify(query: &str) -> Classification {
    let lower = query.to_lowercase();

    let categories = categorize(&lower);
    let facets = Facets {
        is_emergency: contains_any(&lower, EMERGENCY_FACET),
        is_info_request: contains_any(&lower, INFO_FACET),
        is_action_request: contains_any(&lower, ACTION_FACET),
        is_report_request: contains_any(&lower, REPORT_FACET),
    };
    let complexity = assess_complexity(&lower, categories.len());

    Classification {
        severity: emergency_level(query),
        categories,
        facets,
        complexity,
        keywords: extract_keywords(&lower),
        sentiment: detect_sentiment(&lower),
        is_greeting: is_greeting(query),
    }
}

/// Tiered emergency-level detection. Tiers are evaluated in strict order
/// (critical first), so a query matching both critical and medium keywords
/// is always classified critical. Defaults to `Low`.
pub fn emergency_level(query: &str) -> Severity {
    let lower = query.to_lowercase();

    if contains_any(&lower, CRITICAL_KEYWORDS) {
        log::info!("[classify] critical emergency detected: {:?}", query);
        return Severity::Critical;
    }
    if contains_any(&lower, HIGH_KEYWORDS) {
        log::info!("[classify] high emergency detected: {:?}", query);
        return Severity::High;
    }
    if contains_any(&lower, MEDIUM_KEYWORDS) {
        return Severity::Medium;
    }
    Severity::Low
}

/// Incident-severity assessment used by the emergency responder to pick
/// safety protocols and contacts. Returns the tier plus an urgency flag
/// (critical and high tiers are urgent).
pub fn incident_severity(query: &str) -> (Severity, bool) {
    let lower = query.to_lowercase();

    if contains_any(&lower, INCIDENT_CRITICAL) {
        (Severity::Critical, true)
    } else if contains_any(&lower, INCIDENT_HIGH) {
        (Severity::High, true)
    } else if contains_any(&lower, INCIDENT_MEDIUM) {
        (Severity::Medium, false)
    } else {
        (Severity::Low, false)
    }
}

/// Independent per-topic membership checks — a query may belong to zero or
/// many categories.
pub fn categorize(lower: &str) -> Vec<Category> {
    CATEGORY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| contains_any(lower, keywords))
        .map(|(category, _)| *category)
        .collect()
}

fn assess_complexity(lower: &str, category_count: usize) -> Complexity {
    if category_count > 3 || lower.len() > 100 || contains_any(lower, COMPLEX_KEYWORDS) {
        Complexity::High
    } else if category_count >= 2 {
        Complexity::Medium
    } else {
        Complexity::Low
    }
}

/// Whitespace tokenization, stop words and short tokens dropped, first 5
/// surviving tokens in original order.
pub fn extract_keywords(lower: &str) -> Vec<String> {
    lower
        .split_whitespace()
        .filter(|word| word.chars().count() > 2 && !STOP_WORDS.contains(word))
        .take(MAX_KEYWORDS)
        .map(|word| word.to_string())
        .collect()
}

/// Positive list checked before negative; default neutral.
pub fn detect_sentiment(lower: &str) -> Sentiment {
    if contains_any(lower, POSITIVE_WORDS) {
        Sentiment::Positive
    } else if contains_any(lower, NEGATIVE_WORDS) {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    }
}

/// Exact match against the fixed greeting set, case-insensitive, trimmed,
/// with an optional trailing "!".
pub fn is_greeting(query: &str) -> bool {
    let trimmed = query.trim().to_lowercase();
    let stripped = trimmed.strip_suffix('!').unwrap_or(&trimmed);
    GREETINGS.contains(&stripped)
}

/// Reject empty/whitespace-only queries and queries over the length cap.
pub fn validate_query(query: &str) -> Result<(), String> {
    if query.trim().is_empty() {
        return Err("Query cannot be empty".to_string());
    }
    if query.chars().count() > MAX_QUERY_CHARS {
        return Err(format!("Query is too long (max {} characters)", MAX_QUERY_CHARS));
    }
    Ok(())
}
