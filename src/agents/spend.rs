//! Spend Management Agent
//!
//! Owns budgeting, expense classification and bill reminders.

use chrono::NaiveDate;
use serde_json::json;
use std::sync::Arc;

use super::{ActStep, Agent, AgentCore, AgentRegistry};
use crate::console::{prompt_f64, Console};
use crate::llm::LlmClient;
use crate::memory::SessionMemory;
use crate::models::{AgentKey, Bill};
use crate::tools::{BillReminderTool, BudgetTrackerTool, ExpenseClassifierTool, ToolRegistry};
use crate::Result;

pub struct SpendAgent {
    core: AgentCore,
}

impl SpendAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: String,
        memory: SessionMemory,
        console: Arc<dyn Console>,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(ExpenseClassifierTool));
        tools.register(Arc::new(BudgetTrackerTool));
        tools.register(Arc::new(BillReminderTool));

        Self {
            core: AgentCore::new(
                AgentKey::Spend,
                "Spend Management Agent",
                "Manages user spending, budgets, and alerts.",
                llm,
                model,
                tools,
                memory,
                console,
            ),
        }
    }

    /// Built-in upcoming bills for the reminder tool.
    fn upcoming_bills() -> Vec<Bill> {
        vec![
            Bill {
                name: "Electricity Bill".to_string(),
                due_date: NaiveDate::from_ymd_opt(2025, 5, 10).expect("valid date"),
            },
            Bill {
                name: "Water Bill".to_string(),
                due_date: NaiveDate::from_ymd_opt(2025, 5, 12).expect("valid date"),
            },
        ]
    }

    async fn run_tool(&self, tool_name: &str) -> Result<String> {
        let core = &self.core;

        match tool_name {
            "expense_classifier" => {
                let description = core
                    .console
                    .prompt("[Spend Agent] Please describe your expense: ")?;

                let output = core
                    .invoke_tool(tool_name, json!({ "description": description }))
                    .await?;
                let category = output.data["category"].as_str().unwrap_or("Other");

                Ok(core
                    .respond(&format!("Result of {}: {}", tool_name, category))
                    .await)
            }

            "budget_tracker" => {
                let Some(spent) = prompt_f64(core.console.as_ref(), "[Spend Agent] How much did you spend? ")?
                else {
                    return Ok("[Spend Agent] Invalid number entered.".to_string());
                };
                let Some(budget) = prompt_f64(core.console.as_ref(), "[Spend Agent] What is your budget? ")?
                else {
                    return Ok("[Spend Agent] Invalid number entered.".to_string());
                };

                let output = core
                    .invoke_tool(tool_name, json!({ "spent": spent, "budget": budget }))
                    .await?;
                let message = output.data["message"].as_str().unwrap_or_default();

                Ok(core
                    .respond(&format!("Result of {}: {}", tool_name, message))
                    .await)
            }

            "bill_reminder" => {
                let bills = Self::upcoming_bills();
                let output = core
                    .invoke_tool(tool_name, json!({ "bills": bills }))
                    .await?;
                let message = output.data["message"].as_str().unwrap_or_default();

                Ok(core
                    .respond(&format!("Result of {}: {}", tool_name, message))
                    .await)
            }

            _ => Ok(format!("[{}] Selected an unknown tool.", core.name)),
        }
    }
}

#[async_trait::async_trait]
impl Agent for SpendAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Spend
    }

    fn name(&self) -> &str {
        &self.core.name
    }

    async fn handle(&self, user_input: &str, registry: &AgentRegistry) -> Result<String> {
        let outcome = self.core.reason(user_input).await?;
        self.core.announce_reasoning(&outcome);

        match self.core.plan_act(&outcome.action) {
            ActStep::Forward(target) => self.core.forward(registry, target, user_input).await,
            ActStep::Reply(message) => Ok(message),
            ActStep::RunTool(tool_name) => self.run_tool(&tool_name).await,
        }
    }
}
