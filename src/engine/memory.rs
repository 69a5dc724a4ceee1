// Agent Engine — Memory Store
// Per-user rolling context: recent queries, conversation turns, location
// history, and merged preferences, every list capped at MAX_HISTORY entries.
// Persistence through the injected `Storage` port is best effort; a failed
// write is logged and never fails the request.

use crate::atoms::constants::{
    MAX_HISTORY, MIN_SHARED_WORDS, RELEVANCE_MIN_WORD_LEN, RELEVANCE_WINDOW,
};
use crate::atoms::types::{ConversationTurn, LocationEntry, MemoryContext, UserContext};
use crate::engine::storage::Storage;
use chrono::Utc;
use log::{debug, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

pub struct MemoryStore {
    storage: Arc<dyn Storage>,
    cache: Mutex<HashMap<String, MemoryContext>>,
}

impl MemoryStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        MemoryStore { storage, cache: Mutex::new(HashMap::new()) }
    }

    /// Cached context, or a snapshot from storage, or a fresh context
    /// hydrated from chat history and stored preferences.
    pub fn get_context(&self, user_id: &str) -> MemoryContext {
        if let Some(cached) = self.cache.lock().get(user_id) {
            return cached.clone();
        }

        let context = match self.storage.load_memory(user_id) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => self.hydrate(user_id),
            Err(err) => {
                warn!("[memory] snapshot load failed for {}: {}", user_id, err);
                self.hydrate(user_id)
            }
        };

        self.cache.lock().insert(user_id.to_string(), context.clone());
        context
    }

    fn hydrate(&self, user_id: &str) -> MemoryContext {
        let mut context = MemoryContext::empty(user_id);

        match self.storage.recent_chat(user_id) {
            Ok(history) => {
                context.recent_queries = history.recent_queries;
                context.conversation_history = history.conversation_history;
            }
            Err(err) => warn!("[memory] chat hydration failed for {}: {}", user_id, err),
        }
        match self.storage.user_preferences(user_id) {
            Ok(preferences) => context.user_preferences = preferences,
            Err(err) => warn!("[memory] preference load failed for {}: {}", user_id, err),
        }

        debug!(
            "[memory] hydrated {} ({} turns, {} queries)",
            user_id,
            context.conversation_history.len(),
            context.recent_queries.len(),
        );
        context
    }

    /// Record one completed exchange. All windows stay within MAX_HISTORY.
    pub fn update_context(
        &self,
        user_id: &str,
        query: &str,
        response: &str,
        user_context: Option<&UserContext>,
    ) {
        let mut context = self.get_context(user_id);
        let now = Utc::now();

        context.conversation_history.push(ConversationTurn {
            query: query.to_string(),
            response: response.to_string(),
            timestamp: now,
        });
        context.recent_queries.push(query.to_string());

        if let Some(user_context) = user_context {
            if let Some(location) = &user_context.location {
                context.location_history.push(LocationEntry {
                    location: format!("{}, {}", location.city, location.district),
                    timestamp: now,
                });
            }
            for (key, value) in &user_context.preferences {
                context.user_preferences.insert(key.clone(), value.clone());
            }
        }

        trim_front(&mut context.conversation_history);
        trim_front(&mut context.recent_queries);
        trim_front(&mut context.location_history);

        self.cache.lock().insert(user_id.to_string(), context.clone());

        // Best effort: the reply already went out.
        if let Err(err) = self.storage.save_memory(&context) {
            warn!("[memory] snapshot save failed for {}: {}", user_id, err);
        }
        if let Err(err) = self.storage.append_chat_message(user_id, "user", query) {
            warn!("[memory] chat append failed for {}: {}", user_id, err);
        }
        if let Err(err) = self.storage.append_chat_message(user_id, "assistant", response) {
            warn!("[memory] chat append failed for {}: {}", user_id, err);
        }
    }

    /// Context lines for the synthesis prompt: recent turns sharing words
    /// with the query, stored preferences, and the last few locations.
    pub fn get_relevant_context(&self, user_id: &str, query: &str) -> Vec<String> {
        let context = self.get_context(user_id);
        let mut lines = Vec::new();

        let window_start = context.conversation_history.len().saturating_sub(RELEVANCE_WINDOW);
        for turn in &context.conversation_history[window_start..] {
            if is_relevant(query, &turn.query) {
                lines.push(format!("Soru: {}\nYanıt: {}", turn.query, turn.response));
            }
        }

        if !context.user_preferences.is_empty() {
            if let Ok(json) = serde_json::to_string(&context.user_preferences) {
                lines.push(format!("Kullanıcı tercihleri: {}", json));
            }
        }

        let location_start = context.location_history.len().saturating_sub(3);
        for entry in &context.location_history[location_start..] {
            lines.push(format!("Konum: {} ({})", entry.location, entry.timestamp));
        }

        lines
    }

    pub fn clear(&self, user_id: &str) {
        self.cache.lock().remove(user_id);
        if let Err(err) = self.storage.save_memory(&MemoryContext::empty(user_id)) {
            warn!("[memory] clear persist failed for {}: {}", user_id, err);
        }
    }
}

fn trim_front<T>(list: &mut Vec<T>) {
    if list.len() > MAX_HISTORY {
        let excess = list.len() - MAX_HISTORY;
        list.drain(..excess);
    }
}

/// Two texts are related when they share at least MIN_SHARED_WORDS words
/// longer than RELEVANCE_MIN_WORD_LEN characters.
fn is_relevant(query: &str, past_query: &str) -> bool {
    let query_lower = query.to_lowercase();
    let past_lower = past_query.to_lowercase();
    let query_words: Vec<&str> = query_lower
        .split_whitespace()
        .filter(|w| w.chars().count() > RELEVANCE_MIN_WORD_LEN)
        .collect();
    let shared = past_lower
        .split_whitespace()
        .filter(|w| w.chars().count() > RELEVANCE_MIN_WORD_LEN)
        .filter(|w| query_words.contains(w))
        .count();
    shared >= MIN_SHARED_WORDS
}
