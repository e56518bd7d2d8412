//! Personal Finance Multi-Agent Portal
//!
//! A console assistant that routes natural-language financial questions
//! to specialized agents:
//! - Classifies each turn into spend / investment / project
//! - Agents reason step-by-step via an LLM, then act or delegate to a peer
//! - Deterministic calculator tools (budget, returns, cash flows, NPV)
//! - Session memory keeps the latest project ranking across turns
//!
//! TURN LIFECYCLE:
//! ROUTE → (CLASSIFY_TASK) → REASON → ACT → RESPOND

pub mod agents;
pub mod console;
pub mod error;
pub mod llm;
pub mod memory;
pub mod models;
pub mod router;
pub mod tools;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use router::Router;
