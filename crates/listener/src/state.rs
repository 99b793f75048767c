//! Shared state handed to every request handler.

use std::sync::Arc;

use nodes::{ExecutorConfig, PipelineExecutor};
use pipeline::CompletionClient;

/// Per-process state. Runs never share a context; only the executor (and
/// through it the completion client) is shared.
#[derive(Debug, Clone)]
pub struct AppState {
    pub executor: Arc<PipelineExecutor>,
}

impl AppState {
    /// Builds the standard three-node pipeline over `client`.
    pub fn new(client: Arc<dyn CompletionClient>, config: &ExecutorConfig) -> Self {
        Self {
            executor: Arc::new(PipelineExecutor::skill_analysis(client, config)),
        }
    }
}
