// Agent Engine — Storage Port
// Persistence boundary for memory snapshots, chat history, preferences, and
// active emergency alerts. MemoryStore and the emergency tool only see the
// `Storage` trait; production wires `SqliteStorage`, tests wire `MemStorage`.

use crate::atoms::error::AgentResult;
use crate::atoms::types::{ConversationTurn, MemoryContext};
use chrono::{DateTime, Utc};
use log::info;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

// ── Port ───────────────────────────────────────────────────────────────────

/// One persisted chat message.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Chat history slices used to hydrate a memory context when no snapshot
/// exists: the user's last 10 queries plus the last 20 query/response pairs.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    pub recent_queries: Vec<String>,
    pub conversation_history: Vec<ConversationTurn>,
}

pub trait Storage: Send + Sync {
    fn user_preferences(&self, user_id: &str) -> AgentResult<HashMap<String, Value>>;

    fn append_chat_message(&self, user_id: &str, role: &str, content: &str) -> AgentResult<()>;

    /// Recent history in chronological order, mapped per `ChatHistory`.
    fn recent_chat(&self, user_id: &str) -> AgentResult<ChatHistory>;

    /// Currently active emergency alerts, newest first.
    fn active_alerts(&self) -> AgentResult<Vec<Value>>;

    fn save_memory(&self, context: &MemoryContext) -> AgentResult<()>;

    fn load_memory(&self, user_id: &str) -> AgentResult<Option<MemoryContext>>;
}

// ── SQLite implementation ──────────────────────────────────────────────────

/// Thread-safe SQLite store. One connection behind a Mutex; WAL enabled.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Open (or create) the database at `path` and run migrations.
    pub fn open(path: impl AsRef<Path>) -> AgentResult<Self> {
        let path = path.as_ref();
        info!("[storage] Opening store at {:?}", path);
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").ok();
        run_migrations(&conn)?;
        Ok(SqliteStorage { conn: Mutex::new(conn) })
    }

    /// In-memory store for tests and ephemeral deployments.
    pub fn open_in_memory() -> AgentResult<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(SqliteStorage { conn: Mutex::new(conn) })
    }

    /// Insert an emergency alert, assigning it an id when the payload has
    /// none. Used by the ingestion side; the agent core only reads alerts.
    pub fn add_alert(&self, alert: &Value, active: bool) -> AgentResult<()> {
        let mut alert = alert.clone();
        if let Some(map) = alert.as_object_mut() {
            map.entry("id").or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        }
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO emergency_alerts (payload_json, active) VALUES (?1, ?2)",
            params![serde_json::to_string(&alert)?, active as i64],
        )?;
        Ok(())
    }
}

fn run_migrations(conn: &Connection) -> AgentResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS chat_messages (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id TEXT NOT NULL,
            role TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_chat_messages_user
            ON chat_messages(user_id, id);

        CREATE TABLE IF NOT EXISTS user_preferences (
            user_id TEXT PRIMARY KEY,
            prefs_json TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS emergency_alerts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            payload_json TEXT NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS memory_snapshots (
            user_id TEXT PRIMARY KEY,
            context_json TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

impl Storage for SqliteStorage {
    fn user_preferences(&self, user_id: &str) -> AgentResult<HashMap<String, Value>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT prefs_json FROM user_preferences WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .ok();
        match json {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(HashMap::new()),
        }
    }

    fn append_chat_message(&self, user_id: &str, role: &str, content: &str) -> AgentResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO chat_messages (user_id, role, content) VALUES (?1, ?2, ?3)",
            params![user_id, role, content],
        )?;
        Ok(())
    }

    fn recent_chat(&self, user_id: &str) -> AgentResult<ChatHistory> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT role, content FROM (
                SELECT id, role, content FROM chat_messages
                WHERE user_id = ?1 ORDER BY id DESC LIMIT 40
             ) ORDER BY id ASC",
        )?;
        let messages: Vec<(String, String)> = stmt
            .query_map(params![user_id], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);
        drop(conn);

        Ok(map_history(&messages))
    }

    fn active_alerts(&self) -> AgentResult<Vec<Value>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT payload_json FROM emergency_alerts
             WHERE active = 1 ORDER BY id DESC",
        )?;
        let alerts = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .filter_map(|r| r.ok())
            .filter_map(|json| serde_json::from_str(&json).ok())
            .collect();
        Ok(alerts)
    }

    fn save_memory(&self, context: &MemoryContext) -> AgentResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO memory_snapshots (user_id, context_json, updated_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(user_id) DO UPDATE SET
                context_json = excluded.context_json,
                updated_at = datetime('now')",
            params![context.user_id, serde_json::to_string(context)?],
        )?;
        Ok(())
    }

    fn load_memory(&self, user_id: &str) -> AgentResult<Option<MemoryContext>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT context_json FROM memory_snapshots WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .ok();
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }
}

/// Map chronological (role, content) pairs to the hydration shape: last 10
/// user messages become recent queries, last 20 user→assistant pairs become
/// conversation history.
fn map_history(messages: &[(String, String)]) -> ChatHistory {
    let user_messages: Vec<&String> = messages
        .iter()
        .filter(|(role, _)| role == "user")
        .map(|(_, content)| content)
        .collect();
    let recent_queries: Vec<String> = user_messages
        .iter()
        .rev()
        .take(10)
        .rev()
        .map(|c| (*c).clone())
        .collect();

    let mut pairs: Vec<ConversationTurn> = Vec::new();
    let mut i = 0;
    while i + 1 < messages.len() {
        if messages[i].0 == "user" && messages[i + 1].0 == "assistant" {
            pairs.push(ConversationTurn {
                query: messages[i].1.clone(),
                response: messages[i + 1].1.clone(),
                timestamp: Utc::now(),
            });
            i += 2;
        } else {
            i += 1;
        }
    }
    let start = pairs.len().saturating_sub(20);
    ChatHistory { recent_queries, conversation_history: pairs.split_off(start) }
}

// ── In-memory implementation (tests) ───────────────────────────────────────

/// Storage backed by plain maps. Also records save_memory calls so tests can
/// assert persistence happened.
#[derive(Default)]
pub struct MemStorage {
    inner: Mutex<MemInner>,
}

#[derive(Default)]
struct MemInner {
    preferences: HashMap<String, HashMap<String, Value>>,
    messages: HashMap<String, Vec<ChatMessage>>,
    alerts: Vec<Value>,
    snapshots: HashMap<String, MemoryContext>,
}

impl MemStorage {
    pub fn new() -> Self {
        MemStorage::default()
    }

    pub fn push_alert(&self, alert: Value) {
        self.inner.lock().alerts.push(alert);
    }

    pub fn set_preferences(&self, user_id: &str, prefs: HashMap<String, Value>) {
        self.inner.lock().preferences.insert(user_id.to_string(), prefs);
    }

    pub fn snapshot_count(&self) -> usize {
        self.inner.lock().snapshots.len()
    }
}

impl Storage for MemStorage {
    fn user_preferences(&self, user_id: &str) -> AgentResult<HashMap<String, Value>> {
        Ok(self.inner.lock().preferences.get(user_id).cloned().unwrap_or_default())
    }

    fn append_chat_message(&self, user_id: &str, role: &str, content: &str) -> AgentResult<()> {
        self.inner.lock().messages.entry(user_id.to_string()).or_default().push(ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    fn recent_chat(&self, user_id: &str) -> AgentResult<ChatHistory> {
        let inner = self.inner.lock();
        let messages: Vec<(String, String)> = inner
            .messages
            .get(user_id)
            .map(|msgs| msgs.iter().map(|m| (m.role.clone(), m.content.clone())).collect())
            .unwrap_or_default();
        Ok(map_history(&messages))
    }

    fn active_alerts(&self) -> AgentResult<Vec<Value>> {
        let mut alerts = self.inner.lock().alerts.clone();
        alerts.reverse();
        Ok(alerts)
    }

    fn save_memory(&self, context: &MemoryContext) -> AgentResult<()> {
        self.inner.lock().snapshots.insert(context.user_id.clone(), context.clone());
        Ok(())
    }

    fn load_memory(&self, user_id: &str) -> AgentResult<Option<MemoryContext>> {
        Ok(self.inner.lock().snapshots.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sqlite_round_trips_memory_snapshot() {
        let store = SqliteStorage::open_in_memory().unwrap();
        let mut ctx = MemoryContext::empty("u1");
        ctx.recent_queries.push("deprem nerede oldu".to_string());
        store.save_memory(&ctx).unwrap();

        let loaded = store.load_memory("u1").unwrap().unwrap();
        assert_eq!(loaded.recent_queries, vec!["deprem nerede oldu"]);
        assert!(store.load_memory("u2").unwrap().is_none());
    }

    #[test]
    fn sqlite_history_mapping() {
        let store = SqliteStorage::open_in_memory().unwrap();
        for i in 0..12 {
            store.append_chat_message("u1", "user", &format!("soru {}", i)).unwrap();
            store.append_chat_message("u1", "assistant", &format!("yanıt {}", i)).unwrap();
        }

        let history = store.recent_chat("u1").unwrap();
        assert_eq!(history.recent_queries.len(), 10);
        assert_eq!(history.recent_queries.last().map(String::as_str), Some("soru 11"));
        assert!(history.conversation_history.len() <= 20);
        let last = history.conversation_history.last().unwrap();
        assert_eq!(last.query, "soru 11");
        assert_eq!(last.response, "yanıt 11");
    }

    #[test]
    fn sqlite_active_alerts_only() {
        let store = SqliteStorage::open_in_memory().unwrap();
        store.add_alert(&json!({ "type": "deprem", "severity": "high" }), true).unwrap();
        store.add_alert(&json!({ "type": "sel", "severity": "low" }), false).unwrap();

        let alerts = store.active_alerts().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["type"], "deprem");
        assert!(alerts[0]["id"].is_string());
    }

    #[test]
    fn mem_storage_records_snapshots() {
        let store = MemStorage::new();
        store.save_memory(&MemoryContext::empty("u1")).unwrap();
        assert_eq!(store.snapshot_count(), 1);
    }
}
