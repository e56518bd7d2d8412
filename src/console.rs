//! Interactive console boundary
//!
//! Agents gather tool inputs through line-based prompts and show mid-turn
//! output (reasoning, delegation notices, evaluation tables) on the console.
//! The trait keeps agents testable without a terminal.

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Mutex;

use crate::error::PortalError;
use crate::Result;

/// Line-based prompt/response plus direct output.
pub trait Console: Send + Sync {
    /// Show `message` and read one trimmed line of input.
    fn prompt(&self, message: &str) -> Result<String>;

    /// Show `text` to the user directly, without going through an agent reply.
    fn print(&self, text: &str);
}

/// Console backed by stdin/stdout.
pub struct StdConsole;

impl Console for StdConsole {
    fn prompt(&self, message: &str) -> Result<String> {
        print!("{}", message);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn print(&self, text: &str) {
        println!("{}", text);
    }
}

/// Scripted console for development & testing: replays queued inputs and
/// records everything printed.
#[derive(Default)]
pub struct ScriptedConsole {
    inputs: Mutex<VecDeque<String>>,
    printed: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub fn new(inputs: Vec<&str>) -> Self {
        Self {
            inputs: Mutex::new(inputs.into_iter().map(String::from).collect()),
            printed: Mutex::new(Vec::new()),
        }
    }

    /// Everything printed so far, in order.
    pub fn printed(&self) -> Vec<String> {
        self.printed.lock().expect("console poisoned").clone()
    }
}

impl Console for ScriptedConsole {
    fn prompt(&self, _message: &str) -> Result<String> {
        let mut inputs = self
            .inputs
            .lock()
            .map_err(|_| PortalError::ConsoleError("Scripted console poisoned".to_string()))?;

        inputs
            .pop_front()
            .ok_or_else(|| PortalError::ConsoleError("Scripted console exhausted".to_string()))
    }

    fn print(&self, text: &str) {
        self.printed
            .lock()
            .expect("console poisoned")
            .push(text.to_string());
    }
}

/// Prompt for a number. `Ok(None)` means the input did not parse; callers
/// turn that into a user-visible message rather than a crash.
pub fn prompt_f64(console: &dyn Console, message: &str) -> Result<Option<f64>> {
    let raw = console.prompt(message)?;
    Ok(raw.trim().parse().ok())
}
