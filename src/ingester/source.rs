//! Common source utilities

use super::{MessageSource, RawMessage};
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Multi-source aggregator
pub struct SourceAggregator {
    sources: Vec<Arc<dyn MessageSource>>,
}

impl SourceAggregator {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn add_source(&mut self, source: Arc<dyn MessageSource>) {
        self.sources.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Run all sources concurrently
    pub async fn run(&self, tx: mpsc::Sender<RawMessage>) -> Result<()> {
        let mut handles = Vec::new();

        for source in &self.sources {
            let source = Arc::clone(source);
            let tx = tx.clone();

            let handle = tokio::spawn(async move {
                if let Err(e) = source.run(tx).await {
                    tracing::error!("Source {} error: {}", source.name(), e);
                }
            });

            handles.push(handle);
        }

        // Wait for all sources (they should run forever)
        for handle in handles {
            let _ = handle.await;
        }

        Ok(())
    }
}

impl Default for SourceAggregator {
    fn default() -> Self {
        Self::new()
    }
}
