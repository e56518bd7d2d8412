//! Investment Management Agent
//!
//! Owns simple return calculation and portfolio averaging.

use serde_json::json;
use std::sync::Arc;

use super::{ActStep, Agent, AgentCore, AgentRegistry};
use crate::console::{prompt_f64, Console};
use crate::llm::LlmClient;
use crate::memory::SessionMemory;
use crate::models::AgentKey;
use crate::tools::{InvestmentReturnTool, PortfolioAnalyzerTool, ToolRegistry};
use crate::Result;

pub struct InvestmentAgent {
    core: AgentCore,
}

impl InvestmentAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: String,
        memory: SessionMemory,
        console: Arc<dyn Console>,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools.register(Arc::new(InvestmentReturnTool));
        tools.register(Arc::new(PortfolioAnalyzerTool));

        Self {
            core: AgentCore::new(
                AgentKey::Investment,
                "Investment Management Agent",
                "Manages user investments, returns, and reallocations.",
                llm,
                model,
                tools,
                memory,
                console,
            ),
        }
    }

    async fn run_tool(&self, tool_name: &str) -> Result<String> {
        let core = &self.core;

        match tool_name {
            "investment_return_calculator" => {
                let Some(initial) = prompt_f64(
                    core.console.as_ref(),
                    "[Investment Agent] Enter your initial investment amount: ",
                )?
                else {
                    return Ok("[Investment Agent] Invalid number entered.".to_string());
                };
                let Some(final_amount) = prompt_f64(
                    core.console.as_ref(),
                    "[Investment Agent] Enter your final investment value: ",
                )?
                else {
                    return Ok("[Investment Agent] Invalid number entered.".to_string());
                };

                let output = core
                    .invoke_tool(
                        tool_name,
                        json!({ "initial_amount": initial, "final_amount": final_amount }),
                    )
                    .await?;
                let return_pct = output.data["return_pct"].as_f64().unwrap_or_default();

                Ok(core
                    .respond(&format!("Result of {}: {:.2}%", tool_name, return_pct))
                    .await)
            }

            "portfolio_analyzer" => {
                let raw = core.console.prompt(
                    "[Investment Agent] Enter individual investment returns separated by commas: ",
                )?;

                let mut returns = Vec::new();
                for piece in raw.split(',') {
                    match piece.trim().parse::<f64>() {
                        Ok(value) => returns.push(value),
                        Err(_) => return Ok("[Investment Agent] Invalid input.".to_string()),
                    }
                }

                let output = core
                    .invoke_tool(tool_name, json!({ "returns": returns }))
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
impl Agent for InvestmentAgent {
    fn key(&self) -> AgentKey {
        AgentKey::Investment
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::llm::ScriptedClient;

    fn agent_with(llm_script: Vec<&str>, console_script: Vec<&str>) -> InvestmentAgent {
        InvestmentAgent::new(
            Arc::new(ScriptedClient::new(llm_script)),
            "test-model".to_string(),
            SessionMemory::new(),
            Arc::new(ScriptedConsole::new(console_script)),
        )
    }

    #[tokio::test]
    async fn test_return_calculator_path() {
        let agent = agent_with(
            vec![r#"{"reasoning": "compute the return", "final_action": "investment_return_calculator"}"#],
            vec!["1000", "1500"],
        );
        let registry = AgentRegistry::new();

        let reply = agent
            .handle("I put in 1000 and now have 1500", &registry)
            .await
            .unwrap();
        assert!(reply.contains("50.00%"));
    }

    #[tokio::test]
    async fn test_return_calculator_invalid_number() {
        let agent = agent_with(
            vec![r#"{"reasoning": "compute the return", "final_action": "investment_return_calculator"}"#],
            vec!["lots", "1500"],
        );
        let registry = AgentRegistry::new();

        let reply = agent.handle("what's my return?", &registry).await.unwrap();
        assert_eq!(reply, "[Investment Agent] Invalid number entered.");
    }

    #[tokio::test]
    async fn test_portfolio_analyzer_path() {
        let agent = agent_with(
            vec![r#"{"reasoning": "average the returns", "final_action": "portfolio_analyzer"}"#],
            vec!["5, 15, 10"],
        );
        let registry = AgentRegistry::new();

        let reply = agent.handle("how is my portfolio?", &registry).await.unwrap();
        assert!(reply.contains("10.00%"));
    }

    #[tokio::test]
    async fn test_portfolio_analyzer_invalid_input() {
        let agent = agent_with(
            vec![r#"{"reasoning": "average the returns", "final_action": "portfolio_analyzer"}"#],
            vec!["5, banana, 10"],
        );
        let registry = AgentRegistry::new();

        let reply = agent.handle("how is my portfolio?", &registry).await.unwrap();
        assert_eq!(reply, "[Investment Agent] Invalid input.");
    }
}
