//! JSON file debug sink

use crate::persistence::DebugSink;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

/// Writes each payload to `<dir>/<label>_<timestamp>_<id>.json`
pub struct FileDebugSink {
    dir: PathBuf,
}

impl FileDebugSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_name(label: &str) -> String {
        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let id = Uuid::new_v4().simple().to_string();
        format!("{}_{}_{}.json", label, timestamp, &id[..8])
    }
}

#[async_trait::async_trait]
impl DebugSink for FileDebugSink {
    async fn persist(&self, label: &str, payload: &Value) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.dir.join(Self::file_name(label));
        let json = serde_json::to_string_pretty(payload)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!("Response dumped to: {}", path.display());
        Ok(path.display().to_string())
    }
}
