//! Next-Steps node: turns distinctions and insights into practice actions.
//!
//! Models rarely reproduce distinction names byte for byte, so `develops`
//! entries are resolved against the context's distinctions (ignoring case and
//! surrounding whitespace) before the strict reference check runs. Unknown
//! names fail the node; they are never silently dropped.

use async_trait::async_trait;
use pipeline::validation::{check_next_steps, resolve_develops};
use pipeline::{NextStep, NodeError, NodeName, NodeOutput, PipelineContext, PipelineNode};
use tracing::info;

use crate::gateway::LlmGateway;
use crate::payload::decode_list;
use crate::prompts;

/// Display name of the third node.
pub const NEXT_STEPS_NODE: &str = "Next-Steps Node";

/// Reads `skill_name`, `distinctions` and `insights`; produces `next_steps`.
#[derive(Debug, Clone)]
pub struct NextStepsNode {
    name: NodeName,
    gateway: LlmGateway,
}

impl NextStepsNode {
    /// Creates the node; every completion goes through `gateway`.
    pub fn new(gateway: LlmGateway) -> Self {
        Self {
            name: NodeName::from_static(NEXT_STEPS_NODE),
            gateway,
        }
    }
}

#[async_trait]
impl PipelineNode for NextStepsNode {
    fn name(&self) -> &NodeName {
        &self.name
    }

    async fn execute(&self, context: &PipelineContext) -> Result<NodeOutput, NodeError> {
        let value = self
            .gateway
            .request_json(&self.name, prompts::next_steps(context))
            .await?;

        let steps: Vec<NextStep> = decode_list("next_steps", value)?;
        let steps = resolve_develops(steps, context.distinctions())?;
        check_next_steps(&steps, context.distinctions())?;

        info!(count = steps.len(), "planned next steps");
        Ok(NodeOutput::NextSteps(steps))
    }
}
