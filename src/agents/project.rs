//! Project Management Agent
//!
//! Evaluates project ideas by NPV and helps optimize debt payments. A
//! one-word LLM classification splits debt questions off before the
//! reasoning state machine runs; the project path adds an LLM-based
//! structured-extraction step ahead of the NPV engine.

use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use super::{ActStep, Agent, AgentCore, AgentRegistry};
use crate::console::{prompt_f64, Console};
use crate::llm::{ChatMessage, LlmClient};
use crate::memory::{SessionMemory, LAST_EVALUATED_PROJECTS};
use crate::models::{strip_code_fences, AgentKey, EvaluatedProject, Project, ProjectBatch};
use crate::tools::project_eval::{build_cash_flow_table, DEFAULT_DISCOUNT_RATE};
use crate::tools::{DebtPayoffTool, ProjectNpvTool, ToolRegistry};
use crate::Result;

/// Hard pre-branch of each turn: debt questions skip the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskKind {
    Debt,
    Project,
}

pub struct ProjectAgent {
    core: AgentCore,
}

impl ProjectAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: String,
        memory: SessionMemory,
        console: Arc<dyn Console>,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(ProjectNpvTool));
        tools.register(Arc::new(DebtPayoffTool));

        Self {
            core: AgentCore::new(
                AgentKey::Project,
                "Project Management Agent",
                "Manages user projects, evaluates risk, and optimizes debt.",
                llm,
                model,
                tools,
                memory,
                console,
            ),
        }
    }

    /// One-word LLM classification into debt vs. project.
    async fn classify_task_type(&self, user_input: &str) -> Result<TaskKind> {
        let system_prompt = r#"You are a classification assistant.

Classify the following user input as either:
- "debt" (if about loans, payments, debts, payoff)
- "project" (if about investments, projects, cash flows, returns)

Only reply with one word: "debt" or "project"."#;

        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_input),
        ];

        let raw = self.core.llm.complete(&self.core.model, &messages).await?;

        Ok(match raw.trim().to_lowercase().as_str() {
            "debt" => TaskKind::Debt,
            _ => TaskKind::Project,
        })
    }

    /// LLM-based structured extraction of project records. Parse failure is
    /// recoverable: the raw payload is logged and an empty list returned so
    /// the caller can ask the user to restate.
    async fn extract_projects(&self, user_input: &str) -> Result<Vec<Project>> {
        let system_prompt = r#"You are a project extraction assistant.

From the user's description, extract a list of projects. For each project, identify:

- name (string)
- initial_investment (float)
- periods (int)
- base_income (float)
- growth_rate (float, optional, default 0 if not mentioned)
- expenses (float, optional, default 0 if not mentioned)
- unexpected_costs (dictionary where keys are periods as strings and values are amounts)

Output STRICTLY as JSON:
{
    "projects": [
        { project 1 },
        { project 2 }
    ]
}"#;

        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_input),
        ];

        let raw = self.core.llm.complete(&self.core.model, &messages).await?;
        let cleaned = strip_code_fences(&raw);

        match serde_json::from_str::<ProjectBatch>(cleaned) {
            Ok(batch) => Ok(batch.projects),
            Err(e) => {
                warn!(error = %e, raw_output = %raw, "Failed to parse project JSON");
                Ok(Vec::new())
            }
        }
    }

    /// Ask for a discount rate; blank or invalid input keeps the default.
    fn read_discount_rate(&self) -> Result<f64> {
        let raw = self.core.console.prompt(
            "[Project Agent] Enter discount rate as decimal (default 0.10 for 10%): ",
        )?;

        if raw.trim().is_empty() {
            return Ok(DEFAULT_DISCOUNT_RATE);
        }

        match raw.trim().parse::<f64>() {
            Ok(rate) => Ok(rate),
            Err(_) => {
                self.core
                    .console
                    .print("Invalid input. Using default 10% discount rate.");
                Ok(DEFAULT_DISCOUNT_RATE)
            }
        }
    }

    /// Evaluate every extracted project, print the breakdown, remember the
    /// ranking and phrase only the winner through the LLM.
    async fn evaluate_projects(&self, user_input: &str) -> Result<String> {
        let projects = self.extract_projects(user_input).await?;

        if projects.is_empty() {
            return Ok("Sorry, I could not understand the project details. Could you describe \
                       them again mentioning investment amount, expected cash inflows, periods, \
                       and unexpected costs?"
                .to_string());
        }

        let discount_rate = self.read_discount_rate()?;

        let output = self
            .core
            .invoke_tool(
                "project_npv_calculator",
                json!({ "projects": projects, "discount_rate": discount_rate }),
            )
            .await?;

        let ranked: Vec<EvaluatedProject> =
            serde_json::from_value(output.data["ranked_projects"].clone())?;

        self.core
            .memory
            .update(LAST_EVALUATED_PROJECTS, serde_json::to_value(&ranked)?)
            .await;

        self.core.console.print("\n📊 Project Evaluation Results:");
        for project in &ranked {
            self.core
                .console
                .print(&format!("- {}: NPV = ${:.2}", project.name, project.npv));
            self.core
                .console
                .print(&build_cash_flow_table(&project.cash_flows));
        }

        // Only the winner's name goes through the LLM; the breakdown above
        // is shown directly.
        let best = &ranked[0];
        let context = format!("The project with the highest NPV is {}.", best.name);

        Ok(self.core.respond(&context).await)
    }

    /// Debt-optimization path, entered before the reasoning state machine.
    async fn optimize_debt(&self) -> Result<String> {
        let Some(budget) = prompt_f64(
            self.core.console.as_ref(),
            "[Project Agent] Enter your available budget for extra payments: ",
        )?
        else {
            return Ok("Invalid input. Please enter valid numeric values.".to_string());
        };
        let Some(monthly_payment) = prompt_f64(
            self.core.console.as_ref(),
            "[Project Agent] Enter your current monthly debt payment: ",
        )?
        else {
            return Ok("Invalid input. Please enter valid numeric values.".to_string());
        };

        let output = self
            .core
            .invoke_tool(
                "debt_payoff_optimizer",
                json!({ "budget": budget, "monthly_payment": monthly_payment }),
            )
            .await?;
        let suggestion = output.data["suggestion"].as_str().unwrap_or_default();

        Ok(self
            .core
            .respond(&format!("Debt payoff suggestion: {}", suggestion))
            .await)
    }

    async fn run_tool(&self, tool_name: &str, user_input: &str) -> Result<String> {
        match tool_name {
            "project_npv_calculator" => self.evaluate_projects(user_input).await,
            "debt_payoff_optimizer" => self.optimize_debt().await,
            _ => Ok(format!("[{}] Selected an unknown tool.", self.core.name)),
        }
    }
}

#[async_trait::async_trait]
impl Agent for ProjectAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Project
    }

    fn name(&self) -> &str {
        &self.core.name
    }

    async fn handle(&self, user_input: &str, registry: &AgentRegistry) -> Result<String> {
        // CLASSIFY_TASK: debt questions bypass reasoning entirely.
        if self.classify_task_type(user_input).await? == TaskKind::Debt {
            return self.optimize_debt().await;
        }

        let outcome = self.core.reason(user_input).await?;
        self.core.announce_reasoning(&outcome);

        match self.core.plan_act(&outcome.action) {
            ActStep::Forward(target) => self.core.forward(registry, target, user_input).await,
            ActStep::Reply(message) => Ok(message),
            ActStep::RunTool(tool_name) => self.run_tool(&tool_name, user_input).await,
        }
    }
}
