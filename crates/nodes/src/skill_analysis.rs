//! Skill-Analysis node: breaks the skill into its distinctions.

use async_trait::async_trait;
use pipeline::validation::check_distinctions;
use pipeline::{Distinction, NodeError, NodeName, NodeOutput, PipelineContext, PipelineNode};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::payload::decode_list;
use crate::prompts;

/// Display name of the first node.
pub const SKILL_ANALYSIS_NODE: &str = "Skill-Analysis Node";

/// Reads `skill_name` and `proficiency_level`; produces `distinctions`.
#[derive(Debug, Clone)]
pub struct SkillAnalysisNode {
    name: NodeName,
    gateway: LlmGateway,
}

impl SkillAnalysisNode {
    /// Creates the node; every completion goes through `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self {
            name: NodeName::from_static(SKILL_ANALYSIS_NODE),
            gateway,
        }
    }
}

#[async_trait]
impl PipelineNode for SkillAnalysisNode {
    fn name(&self) -> &NodeName {
        &self.name
    }

    async fn execute(&self, context: &PipelineContext) -> Result<NodeOutput, NodeError> {
        let value = self
            .gateway
            .request_json(&self.name, prompts::skill_analysis(context))
            .await?;

        let distinctions: Vec<Distinction> = decode_list("distinctions", value)?;
        check_distinctions(&distinctions)?;

        info!(count = distinctions.len(), "identified distinctions");
        Ok(NodeOutput::Distinctions(distinctions))
    }
}
