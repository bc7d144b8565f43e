use crate::models::GenerationResult;
use std::collections::VecDeque;
use tokio::sync::RwLock;

/// Session gallery, newest first. Append-only; lives as long as the process.
#[derive(Default)]
pub struct Gallery {
    entries: RwLock<VecDeque<GenerationResult>>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, result: GenerationResult) {
        log::debug!("Recording {} in the gallery", result.id);
        self.entries.write().await.push_front(result);
    }

    pub async fn entries(&self) -> Vec<GenerationResult> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn get(&self, id: &str) -> Option<GenerationResult> {
        self.entries
            .read()
            .await
            .iter()
            .find(|entry| entry.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
