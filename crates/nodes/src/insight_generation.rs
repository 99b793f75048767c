//! Insight-Generation node.

use async_trait::async_trait;
use pipeline::validation::check_insights;
use pipeline::{NodeError, NodeName, NodeOutput, PipelineContext, PipelineNode};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::payload::decode_list;
use crate::prompts;

/// Display name of the second node.
pub const INSIGHT_GENERATION_NODE: &str = "Insight-Generation Node";

/// Reads `skill_name` and `distinctions`; produces `insights`.
#[derive(Debug, Clone)]
pub struct InsightGenerationNode {
    name: NodeName,
    gateway: LlmGateway,
}

impl InsightGenerationNode {
    /// Creates the node; every completion goes through `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self {
            name: NodeName::from_static(INSIGHT_GENERATION_NODE),
            gateway,
        }
    }
}

#[async_trait]
impl PipelineNode for InsightGenerationNode {
    fn name(&self) -> &NodeName {
        &self.name
    }

    async fn execute(&self, context: &PipelineContext) -> Result<NodeOutput, NodeError> {
        let value = self
            .gateway
            .request_json(&self.name, prompts::insight_generation(context))
            .await?;

        let insights: Vec<String> = decode_list("insights", value)?;
        let insights: Vec<String> = insights.into_iter().map(|i| i.trim().to_owned()).collect();
        check_insights(&insights)?;

        info!(count = insights.len(), "generated insights");
        Ok(NodeOutput::Insights(insights))
    }
}
