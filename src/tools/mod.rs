//! Tool trait and registry
//!
//! Tools are deterministic, side-effect-free calculators. Agents gather the
//! structured parameters (console prompts or LLM extraction) and invoke tools
//! through one uniform interface.

use crate::error::PortalError;
use crate::models::{ToolInput, ToolOutput};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;

pub mod finance;
pub mod project_eval;

pub use finance::{
    BillReminderTool, BudgetTrackerTool, DebtPayoffTool, ExpenseClassifierTool,
    InvestmentReturnTool, PortfolioAnalyzerTool,
};
pub use project_eval::ProjectNpvTool;

/// Trait for a single tool (deterministic execution)
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    async fn execute(&self, input: &ToolInput) -> Result<ToolOutput>;
}

/// Tool registry for looking up and executing tools
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Tool names in stable order, for prompt construction.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn require_f64(input: &ToolInput, key: &str) -> Result<f64> {
    input
        .parameters
        .get(key)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| {
            PortalError::InvalidToolInput(format!("Expected numeric '{}' in tool_input", key))
        })
}

fn require_str<'a>(input: &'a ToolInput, key: &str) -> Result<&'a str> {
    input
        .parameters
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            PortalError::InvalidToolInput(format!("Expected string '{}' in tool_input", key))
        })
}
