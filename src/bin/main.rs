use std::env;
use std::sync::Arc;

use finance_agent_portal::agents::{AgentRegistry, InvestmentAgent, ProjectAgent, SpendAgent};
use finance_agent_portal::console::{Console, StdConsole};
use finance_agent_portal::llm::{LlmClient, OpenAiClient};
use finance_agent_portal::memory::SessionMemory;
use finance_agent_portal::Router;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const AVAILABLE_MODELS: &[&str] = &[
    "gpt-3.5-turbo",
    "gpt-4",
    "gpt-4-turbo",
    "gpt-4.1-2025-04-14",
];
const DEFAULT_MODEL: &str = "gpt-4.1-2025-04-14";

/// Interactive model selection with a numbered list and a default.
fn select_model(console: &dyn Console) -> String {
    console.print("Available models:");
    for (idx, model) in AVAILABLE_MODELS.iter().enumerate() {
        console.print(&format!("{}. {}", idx + 1, model));
    }

    let choice = console
        .prompt("Select the model number you want to use (default 4 for gpt-4.1-2025-04-14): ")
        .unwrap_or_default();

    if let Ok(idx) = choice.trim().parse::<usize>() {
        if (1..=AVAILABLE_MODELS.len()).contains(&idx) {
            return AVAILABLE_MODELS[idx - 1].to_string();
        }
    }

    console.print(&format!("Using default model {}.\n", DEFAULT_MODEL));
    DEFAULT_MODEL.to_string()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let console: Arc<dyn Console> = Arc::new(StdConsole);

    let api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
    let model = select_model(console.as_ref());

    let llm: Arc<dyn LlmClient> = match env::var("OPENAI_BASE_URL") {
        Ok(base_url) => Arc::new(OpenAiClient::with_base_url(api_key, base_url)),
        Err(_) => Arc::new(OpenAiClient::new(api_key)),
    };

    let memory = SessionMemory::new();

    let mut registry = AgentRegistry::new();
    registry.insert(Arc::new(SpendAgent::new(
        llm.clone(),
        model.clone(),
        memory.clone(),
        console.clone(),
    )));
    registry.insert(Arc::new(InvestmentAgent::new(
        llm.clone(),
        model.clone(),
        memory.clone(),
        console.clone(),
    )));
    registry.insert(Arc::new(ProjectAgent::new(
        llm.clone(),
        model.clone(),
        memory.clone(),
        console.clone(),
    )));

    let router = Router::new(llm, model, registry);

    info!("Finance portal session starting");

    console.print("Welcome to your Personal Finance Multi-Agent Portal!");
    console.print("Type 'exit' to quit.\n");

    loop {
        let user_input = console.prompt("You: ")?;

        if user_input.eq_ignore_ascii_case("exit") {
            console.print("Goodbye!");
            break;
        }

        if user_input.is_empty() {
            continue;
        }

        match router.route(&user_input).await {
            Ok(response) => console.print(&response),
            Err(e) => {
                // A failed LLM call aborts the turn, never the session.
                error!(error = %e, "Turn failed");
                console.print("Sorry, something went wrong handling that request. Please try again.");
            }
        }
    }

    Ok(())
}
