//! Top-level turn routing
//!
//! Classifies each fresh user turn into one agent key with a single-word
//! LLM call and dispatches through the agent registry. Classification never
//! fails to pick an agent: anything unrecognized coerces to spend.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::agents::AgentRegistry;
use crate::llm::{ChatMessage, LlmClient};
use crate::models::AgentKey;
use crate::Result;

pub struct Router {
    llm: Arc<dyn LlmClient>,
    model: String,
    registry: AgentRegistry,
}

impl Router {
    pub fn new(llm: Arc<dyn LlmClient>, model: String, registry: AgentRegistry) -> Self {
        Self {
            llm,
            model,
            registry,
        }
    }

    /// Classify a turn into spend / investment / project.
    pub async fn classify(&self, user_input: &str) -> Result<AgentKey> {
        let system_prompt = r#"You are a router assistant.
Given a user's message, decide if it should go to:
- Spend Management Agent
- Investment Management Agent
- Project Management Agent

Only answer with one word: 'spend', 'investment', or 'project'.

If unclear, guess the most likely option."#;

        let messages = [
            ChatMessage::system(system_prompt),
            ChatMessage::user(user_input),
        ];

        let raw = self.llm.complete(&self.model, &messages).await?;

        // Default fallback: some agent is always selected.
        Ok(raw.parse::<AgentKey>().unwrap_or(AgentKey::Spend))
    }

    /// Run one full turn: classify, then hand the original input to the
    /// selected agent's state machine.
    pub async fn route(&self, user_input: &str) -> Result<String> {
        let turn_id = Uuid::new_v4();
        let agent_key = self.classify(user_input).await?;

        info!(%turn_id, agent = %agent_key, "Routing user turn");

        self.registry.dispatch(agent_key, user_input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::error::PortalError;
    use crate::llm::ScriptedClient;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoAgent {
        key: AgentKey,
        calls: AtomicUsize,
    }

    impl EchoAgent {
        fn new(key: AgentKey) -> Self {
            Self {
                key,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl Agent for EchoAgent {
        fn key(&self) -> AgentKey {
            self.key
        }

        fn name(&self) -> &str {
            "Echo Agent"
        }

        async fn handle(&self, user_input: &str, _registry: &AgentRegistry) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{}: {}", self.key, user_input))
        }
    }

    fn full_registry() -> (AgentRegistry, Arc<EchoAgent>, Arc<EchoAgent>, Arc<EchoAgent>) {
        let spend = Arc::new(EchoAgent::new(AgentKey::Spend));
        let investment = Arc::new(EchoAgent::new(AgentKey::Investment));
        let project = Arc::new(EchoAgent::new(AgentKey::Project));

        let mut registry = AgentRegistry::new();
        registry.insert(spend.clone());
        registry.insert(investment.clone());
        registry.insert(project.clone());

        (registry, spend, investment, project)
    }

    #[tokio::test]
    async fn test_route_dispatches_to_classified_agent() {
        let (registry, _spend, investment, _project) = full_registry();
        let router = Router::new(
            Arc::new(ScriptedClient::new(vec!["investment"])),
            "test-model".to_string(),
            registry,
        );

        let reply = router.route("how are my stocks doing?").await.unwrap();
        assert_eq!(reply, "investment: how are my stocks doing?");
        assert_eq!(investment.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_classification_tolerates_casing_and_whitespace() {
        let (registry, _spend, _investment, project) = full_registry();
        let router = Router::new(
            Arc::new(ScriptedClient::new(vec!["  Project \n"])),
            "test-model".to_string(),
            registry,
        );

        router.route("evaluate my cafe idea").await.unwrap();
        assert_eq!(project.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unrecognized_classification_coerces_to_spend() {
        let (registry, spend, _investment, _project) = full_registry();
        let router = Router::new(
            Arc::new(ScriptedClient::new(vec!["I think this is about budgets"])),
            "test-model".to_string(),
            registry,
        );

        let reply = router.route("hello there").await.unwrap();
        assert!(reply.starts_with("spend:"));
        assert_eq!(spend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_classification_failure_propagates() {
        let (registry, ..) = full_registry();
        let router = Router::new(
            Arc::new(ScriptedClient::new(vec![])),
            "test-model".to_string(),
            registry,
        );

        let result = router.route("anything").await;
        assert!(matches!(result, Err(PortalError::LlmError(_))));
    }
}
