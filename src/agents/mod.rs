//! Agent contract and shared reasoning/delegation plumbing
//!
//! Every turn runs the same state machine inside the selected agent:
//! REASON (LLM chain-of-thought → structured action) → ACT (run an owned
//! tool or hand off to a peer) → RESPOND (LLM phrasing with raw fallback).
//! Delegation is a single synchronous hop: the delegate runs this same
//! machine on the unmodified input. Self-delegation is handled locally;
//! multi-hop cycles are not guarded.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::console::Console;
use crate::error::PortalError;
use crate::llm::{ChatMessage, LlmClient};
use crate::memory::SessionMemory;
use crate::models::{AgentAction, AgentKey, ReasoningOutcome, ToolInput, ToolOutput};
use crate::tools::ToolRegistry;
use crate::Result;

pub mod investment;
pub mod project;
pub mod spend;

pub use investment::InvestmentAgent;
pub use project::ProjectAgent;
pub use spend::SpendAgent;

/// A component owning a set of tools and the ability to reason about and
/// either act on or delegate a user request.
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    fn key(&self) -> AgentKey;
    fn name(&self) -> &str;
    async fn handle(&self, user_input: &str, registry: &AgentRegistry) -> Result<String>;
}

/// Registry of all agents, owned by the router and passed by reference into
/// each `handle` call. Keeps the peer graph cycle-free: agents never hold
/// references to each other.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<AgentKey, Arc<dyn Agent>>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, agent: Arc<dyn Agent>) {
        self.agents.insert(agent.key(), agent);
    }

    pub fn get(&self, key: AgentKey) -> Option<Arc<dyn Agent>> {
        self.agents.get(&key).cloned()
    }

    /// Run one agent's state machine on the input.
    pub async fn dispatch(&self, key: AgentKey, user_input: &str) -> Result<String> {
        let agent = self
            .get(key)
            .ok_or_else(|| PortalError::RoutingError(format!("No agent registered for '{}'", key)))?;

        agent.handle(user_input, self).await
    }
}

/// Resolved ACT step for a reasoning outcome.
#[derive(Debug, PartialEq, Eq)]
pub enum ActStep {
    /// Run the named tool, owned by the current agent.
    RunTool(String),
    /// Hand the unmodified input to a peer.
    Forward(AgentKey),
    /// Terminal message; the turn ends without a tool call.
    Reply(String),
}

/// Shared identity, LLM plumbing and tool set of a concrete agent.
pub struct AgentCore {
    pub key: AgentKey,
    pub name: String,
    pub description: String,
    pub model: String,
    pub llm: Arc<dyn LlmClient>,
    pub tools: ToolRegistry,
    pub memory: SessionMemory,
    pub console: Arc<dyn Console>,
}

impl AgentCore {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        key: AgentKey,
        name: &str,
        description: &str,
        llm: Arc<dyn LlmClient>,
        model: String,
        tools: ToolRegistry,
        memory: SessionMemory,
        console: Arc<dyn Console>,
    ) -> Self {
        Self {
            key,
            name: name.to_string(),
            description: description.to_string(),
            model,
            llm,
            tools,
            memory,
            console,
        }
    }

    /// REASON: ask the LLM to think step-by-step and emit a strict
    /// `{reasoning, final_action}` JSON object. Malformed output degrades to
    /// the safe default; transport failures propagate to the session loop.
    pub async fn reason(&self, user_input: &str) -> Result<ReasoningOutcome> {
        let available_tools = self.tools.list().join(", ");

        let system_prompt = format!(
            r#"You are the {name}. {description}

You must perform step-by-step reasoning to decide the final action to handle the user's request.

Available tools you can use: {tools}
Available agents you can delegate to: spend, investment, project

Follow this process strictly:
1. Think step-by-step what the user's goal is.
2. Think what sub-tasks would solve it.
3. Decide whether you can solve it yourself or if another agent is needed.

Output ONLY a JSON object like this:

{{"reasoning": "<your reasoning>", "final_action": "<tool_name>"}}

OR, if delegating:

{{"reasoning": "<your reasoning>", "final_action": "delegate to <agent_name>"}}

No free text. No explanations outside the JSON.

If you cannot understand, delegate to spend."#,
            name = self.name,
            description = self.description,
            tools = available_tools,
        );

        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_input),
        ];

        let raw = self.llm.complete(&self.model, &messages).await?;
        Ok(ReasoningOutcome::from_llm(&raw))
    }

    /// Show the chain-of-thought on the console for observability. It is
    /// never part of the agent's reply.
    pub fn announce_reasoning(&self, outcome: &ReasoningOutcome) {
        info!(agent = %self.key, reasoning = %outcome.reasoning, "Chain of thought");
        self.console.print(&format!(
            "[{}] Chain of Thought Reasoning:\n{}\n",
            self.name, outcome.reasoning
        ));
    }

    /// ACT dispatch: validate the reasoned action against this agent's own
    /// key and tool set.
    pub fn plan_act(&self, action: &AgentAction) -> ActStep {
        match action {
            AgentAction::Delegate(target) => match target.parse::<AgentKey>() {
                Ok(key) if key == self.key => {
                    // No-op self-delegation: handle locally instead of looping.
                    info!(agent = %self.key, "Self-delegation, proceeding internally");
                    self.console.print(&format!(
                        "[{}] I am already the correct agent. Proceeding internally...",
                        self.name
                    ));
                    ActStep::Reply(format!(
                        "[{}] Sorry, I could not find the right tool.",
                        self.name
                    ))
                }
                Ok(key) => ActStep::Forward(key),
                Err(()) => {
                    warn!(agent = %self.key, target = %target, "Unknown delegation target");
                    ActStep::Reply(format!("[{}] Unknown delegation target.", self.name))
                }
            },
            AgentAction::UseTool(tool_name) => {
                if self.tools.get(tool_name).is_some() {
                    ActStep::RunTool(tool_name.clone())
                } else {
                    ActStep::Reply(format!(
                        "[{}] Sorry, I could not find the right tool.",
                        self.name
                    ))
                }
            }
        }
    }

    /// Single-hop delegation to a peer, with the original input unchanged.
    pub async fn forward(
        &self,
        registry: &AgentRegistry,
        target: AgentKey,
        user_input: &str,
    ) -> Result<String> {
        info!(from = %self.key, to = %target, "Delegating task");
        self.console.print(&format!(
            "[{}] Delegating task to {} Agent...",
            self.name,
            capitalize(&target.to_string())
        ));

        registry.dispatch(target, user_input).await
    }

    /// Execute one of this agent's own tools.
    pub async fn invoke_tool(
        &self,
        tool_name: &str,
        parameters: serde_json::Value,
    ) -> Result<ToolOutput> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| PortalError::ToolNotFound(tool_name.to_string()))?;

        let input = ToolInput {
            tool_name: tool_name.to_string(),
            parameters,
        };

        tool.execute(&input).await
    }

    /// RESPOND: ask the LLM for a brief user-facing paraphrase of the tool
    /// result. Best-effort: any failure returns the raw context verbatim.
    pub async fn respond(&self, context: &str) -> String {
        let system_prompt = r#"You are a friendly financial assistant.
Given some internal context (like tool results), you must generate a polite, natural, and helpful response to the user.

Always be brief (1-3 sentences), helpful, and clear.

Do not repeat the user's input. Just explain the result nicely."#;

        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(context),
        ];

        match self.llm.complete(&self.model, &messages).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(agent = %self.key, error = %e, "Response phrasing failed, returning raw context");
                context.to_string()
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
