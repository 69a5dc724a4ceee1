// REACH+ Agent Core
// Disaster-support agent pipeline for the Turkish emergency domain: query
// classification, supervisor-driven agent selection, concurrent tool fan-out,
// LLM response synthesis, and bounded per-user conversational memory.
//
// Typical wiring:
//
//   let storage = Arc::new(SqliteStorage::open("reach.db")?);
//   let search = Arc::new(EmbeddedIndex::with_first_aid_kb());
//   let model = Arc::new(OpenAiCompatProvider::new(base_url, api_key));
//   let agent = CoreAgent::new(storage, search, model);
//   let response = agent.process_query("toplanma alanı nerede", &ctx).await;

pub mod atoms;
pub mod engine;

pub use atoms::error::{AgentError, AgentResult};
pub use atoms::types::{
    AgentId, AgentResponse, MemoryContext, Priority, Severity, ToolResult, UserContext,
};
pub use engine::core_agent::CoreAgent;
pub use engine::providers::{Completion, OpenAiCompatProvider};
pub use engine::search::{EmbeddedIndex, Search};
pub use engine::storage::{MemStorage, SqliteStorage, Storage};
