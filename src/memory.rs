//! Session memory
//!
//! Process-lifetime key/value store shared across turns within one run.
//! No eviction, no persistence; last write per key wins.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Key under which the latest NPV ranking is stored.
pub const LAST_EVALUATED_PROJECTS: &str = "last_evaluated_projects";

/// In-process key/value store, cheap to clone and share between agents.
#[derive(Clone, Default)]
pub struct SessionMemory {
    data: Arc<RwLock<HashMap<String, Value>>>,
}

impl SessionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn update(&self, key: &str, value: Value) {
        let mut data = self.data.write().await;
        data.insert(key.to_string(), value);
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let data = self.data.read().await;
        data.get(key).cloned()
    }
}
