// Static lookup data for the writing UI: linking-word list and hot topics.
// Files are read on every request so edits on disk show up without a restart.

pub mod handlers;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::seq::IteratorRandom;
use serde_json::{Map, Value};

pub const CONJUNCTIONS_FILE: &str = "connection.json";
pub const HOT_TOPICS_FILE: &str = "hottopic.json";

#[derive(Debug, Clone)]
pub struct ReferenceData {
    dir: PathBuf,
}

impl ReferenceData {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn conjunctions(&self) -> Result<Vec<String>> {
        let raw = self.read(CONJUNCTIONS_FILE).await?;
        Ok(parse_conjunctions(&raw))
    }

    /// Topic id to topic text.
    pub async fn hot_topics(&self) -> Result<Map<String, Value>> {
        let raw = self.read(HOT_TOPICS_FILE).await?;
        serde_json::from_str(&raw).with_context(|| format!("{HOT_TOPICS_FILE} is not a JSON object"))
    }

    async fn read(&self, file: &str) -> Result<String> {
        let path = self.dir.join(file);
        tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Reads either a JSON array of strings or the brace-wrapped quoted list
/// (`{"a", "b"}`) older data files use.
pub fn parse_conjunctions(raw: &str) -> Vec<String> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list;
    }

    let content = raw.trim();
    let content = content
        .strip_prefix('{')
        .and_then(|c| c.strip_suffix('}'))
        .unwrap_or(content);

    content
        .split(',')
        .map(|item| item.trim().trim_matches('"'))
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Uniform pick over topic ids. `None` for an empty map.
pub fn pick_random_topic(topics: &Map<String, Value>) -> Option<(String, Value)> {
    topics
        .iter()
        .choose(&mut rand::thread_rng())
        .map(|(id, text)| (id.clone(), text.clone()))
}
