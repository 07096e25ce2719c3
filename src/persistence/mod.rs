//! Debug dumps of tool responses

pub mod store;

pub use store::FileDebugSink;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// One recorded payload
#[derive(Debug, Clone, Serialize)]
pub struct DebugRecord {
    pub label: String,
    pub recorded_at: DateTime<Utc>,
    pub payload: Value,
}

/// Trait for debug sinks
#[async_trait::async_trait]
pub trait DebugSink: Send + Sync {
    /// Persist a labelled payload, returning where it went
    async fn persist(&self, label: &str, payload: &Value) -> Result<String>;
}

/// Hand a payload to the sink without letting its failure reach the caller
pub async fn record(sink: &dyn DebugSink, label: &str, payload: &Value) {
    if let Err(e) = sink.persist(label, payload).await {
        warn!("Failed to dump {} response: {:#}", label, e);
    }
}

/// In-memory sink (for testing or when dumps are disabled)
pub struct InMemoryDebugSink {
    records: tokio::sync::RwLock<Vec<DebugRecord>>,
}

impl InMemoryDebugSink {
    pub fn new() -> Self {
        Self {
            records: tokio::sync::RwLock::new(Vec::new()),
        }
    }

    pub async fn records(&self) -> Vec<DebugRecord> {
        self.records.read().await.clone()
    }

    /// Records with the given label, oldest first
    pub async fn labelled(&self, label: &str) -> Vec<DebugRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.label == label)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryDebugSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DebugSink for InMemoryDebugSink {
    async fn persist(&self, label: &str, payload: &Value) -> Result<String> {
        let mut records = self.records.write().await;
        records.push(DebugRecord {
            label: label.to_string(),
            recorded_at: Utc::now(),
            payload: payload.clone(),
        });
        Ok(format!("memory:{}#{}", label, records.len()))
    }
}
