//! The pipeline node contract.

use async_trait::async_trait;

use crate::{Distinction, NextStep, NodeError, NodeName, PipelineContext};

/// The single field a node produces.
///
/// A node never touches the context itself: it returns one of these and the
/// executor commits it with [`PipelineContext::apply`]. A node therefore
/// cannot write a field it does not own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeOutput {
    /// Output of the Skill-Analysis node.
    Distinctions(Vec<Distinction>),
    /// Output of the Insight-Generation node.
    Insights(Vec<String>),
    /// Output of the Next-Steps node.
    NextSteps(Vec<NextStep>),
}

impl NodeOutput {
    /// Name of the context field this output populates.
    pub fn field(&self) -> &'static str {
        match self {
            NodeOutput::Distinctions(_) => "distinctions",
            NodeOutput::Insights(_) => "insights",
            NodeOutput::NextSteps(_) => "next_steps",
        }
    }
}

/// One stage of the analysis pipeline.
///
/// Implementations read the fields they depend on from `context` (all of
/// which are populated by earlier nodes), call the completion client, and
/// return their validated output. Status bookkeeping belongs to the executor.
#[async_trait]
pub trait PipelineNode: Send + Sync {
    /// Stable display name, used in status records and failure reports.
    fn name(&self) -> &NodeName;

    /// Produces this node's output from the current context.
    async fn execute(&self, context: &PipelineContext) -> Result<NodeOutput, NodeError>;
}
