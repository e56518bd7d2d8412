//! Core data models for the finance portal

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

//
// ================= Agent identity =================
//

/// Key of a registered agent. The registry must always be able to resolve
/// an agent's own key.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AgentKey {
    Spend,
    Investment,
    Project,
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentKey::Spend => "spend",
            AgentKey::Investment => "investment",
            AgentKey::Project => "project",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for AgentKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spend" => Ok(AgentKey::Spend),
            "investment" => Ok(AgentKey::Investment),
            "project" => Ok(AgentKey::Project),
            _ => Err(()),
        }
    }
}

//
// ================= Reasoning =================
//

/// Literal prefix the reasoning prompt uses to signal a hand-off.
pub const DELEGATION_MARKER: &str = "delegate to";

/// Decision emitted by the reasoning step, parsed exactly once at the LLM
/// boundary so downstream logic never re-parses strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentAction {
    /// Run one of the current agent's own tools.
    UseTool(String),
    /// Hand the unmodified user input to a peer agent. The raw target key is
    /// validated at dispatch time, not here.
    Delegate(String),
}

impl AgentAction {
    pub fn parse(final_action: &str) -> Self {
        let action = final_action.trim().to_lowercase();

        if let Some(target) = action.strip_prefix(DELEGATION_MARKER) {
            AgentAction::Delegate(target.trim().to_string())
        } else {
            AgentAction::UseTool(action)
        }
    }
}

/// Wire form of the reasoning JSON the LLM is asked to emit.
#[derive(Debug, Deserialize)]
struct RawReasoning {
    reasoning: String,
    final_action: String,
}

/// Structured `{reasoning, final_action}` decision for one turn.
#[derive(Debug, Clone)]
pub struct ReasoningOutcome {
    pub reasoning: String,
    pub action: AgentAction,
}

impl ReasoningOutcome {
    /// Parse the LLM's reasoning output. Malformed payloads never fail the
    /// turn: the raw output is logged and the safe default is substituted.
    pub fn from_llm(raw: &str) -> Self {
        let cleaned = strip_code_fences(raw);

        match serde_json::from_str::<RawReasoning>(cleaned) {
            Ok(parsed) => Self {
                reasoning: parsed.reasoning,
                action: AgentAction::parse(&parsed.final_action),
            },
            Err(e) => {
                warn!(error = %e, raw_output = raw, "Failed to parse reasoning JSON");
                Self::fallback()
            }
        }
    }

    /// Safe default when the reasoning output cannot be parsed.
    pub fn fallback() -> Self {
        Self {
            reasoning: "Could not parse reasoning".to_string(),
            action: AgentAction::Delegate(AgentKey::Spend.to_string()),
        }
    }
}

/// Strip a surrounding markdown ```json ... ``` fence, if present.
pub fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

//
// ================= Projects =================
//

/// A project extracted from free text, one per evaluation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub initial_investment: f64,
    pub periods: u32,
    #[serde(default)]
    pub base_income: f64,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub expenses: f64,
    /// One-off costs keyed by period number (1-based).
    #[serde(default)]
    pub unexpected_costs: BTreeMap<u32, f64>,
}

/// Extraction envelope: the LLM is asked for strict JSON under a
/// `projects` key.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectBatch {
    #[serde(default)]
    pub projects: Vec<Project>,
}

/// An evaluated project: NPV plus the cash-flow sequence it was derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatedProject {
    pub name: String,
    pub npv: f64,
    pub cash_flows: Vec<f64>,
}

//
// ================= Bills =================
//

/// An upcoming bill for the reminder tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bill {
    pub name: String,
    pub due_date: NaiveDate,
}

//
// ================= Tool I/O =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInput {
    pub tool_name: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub data: serde_json::Value,
    pub error: Option<String>,
}
