// ── Agent Engine ───────────────────────────────────────────────────────────
// The pipeline behind one query: classify → fan out to tools → supervisor
// picks responder agents → combine and synthesize → remember the exchange.
// `CoreAgent` is the single entry point; everything else is a stage it wires.

pub mod agents;
pub mod classify;
pub mod core_agent;
pub mod executor;
pub mod greeting;
pub mod memory;
pub mod orchestrator;
pub mod providers;
pub mod query;
pub mod registry;
pub mod response;
pub mod search;
pub mod storage;
pub mod supervisor;
pub mod tools;

pub use core_agent::CoreAgent;
