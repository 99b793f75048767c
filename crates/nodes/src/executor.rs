//! The pipeline executor.
//!
//! Runs registered nodes strictly in order against one [`PipelineContext`].
//! The executor is the only writer of node statuses and of the context's
//! output fields: a node returns its [`pipeline::NodeOutput`] and the executor
//! commits it. The first failure halts the run; later nodes stay `Pending`.

use std::sync::Arc;
use std::time::Duration;

use pipeline::{
    AnalysisReport, CompletionClient, ContextError, NodeError, NodeFailure, NodeName,
    PipelineContext, PipelineNode, ValidationError,
};
use tracing::{info, info_span, instrument, warn, Instrument};

use crate::cancellation::CancellationSignal;
use crate::gateway::LlmGateway;
use crate::{InsightGenerationNode, NextStepsNode, SkillAnalysisNode};

/// Default per-call deadline for completion requests.
pub const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_secs(60);

/// Execution limits shared by all nodes of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Deadline for each completion call a node makes.
    pub node_timeout: Duration,
    /// Re-send once with a stricter prompt when a response holds no JSON.
    pub parse_retry: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            node_timeout: DEFAULT_NODE_TIMEOUT,
            parse_retry: true,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every node completed.
    AllCompleted,
    /// A node failed; no later node ran.
    Halted(NodeFailure),
}

/// The final context of a run plus its outcome.
///
/// The context is returned in both cases so callers can report partial
/// results and per-node status.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// State after the last node that ran, including per-node status.
    pub context: PipelineContext,
    /// Whether the run finished or where it stopped.
    pub outcome: RunOutcome,
}

impl PipelineRun {
    /// True when every node completed.
    pub fn is_complete(&self) -> bool {
        self.outcome == RunOutcome::AllCompleted
    }

    /// The exported report, or the failure that halted the run.
    pub fn into_result(self) -> Result<AnalysisReport, NodeFailure> {
        match self.outcome {
            RunOutcome::AllCompleted => Ok(self.context.to_report()),
            RunOutcome::Halted(failure) => Err(failure),
        }
    }
}

/// Drives an ordered list of nodes.
pub struct PipelineExecutor {
    nodes: Vec<Box<dyn PipelineNode>>,
}

impl PipelineExecutor {
    /// Creates an executor over `nodes`, which run in the given order.
    pub fn new(nodes: Vec<Box<dyn PipelineNode>>) -> Self {
        Self { nodes }
    }

    /// The standard three-node analysis pipeline.
    pub fn skill_analysis(client: Arc<dyn CompletionClient>, config: &ExecutorConfig) -> Self {
        let gateway = LlmGateway::new(client, config);
        Self::new(vec![
            Box::new(SkillAnalysisNode::new(gateway.clone())),
            Box::new(InsightGenerationNode::new(gateway.clone())),
            Box::new(NextStepsNode::new(gateway)),
        ])
    }

    /// Node names in execution order.
    pub fn node_names(&self) -> Vec<NodeName> {
        self.nodes.iter().map(|n| n.name().clone()).collect()
    }

    /// Runs every node against `context`.
    pub async fn run(&self, context: PipelineContext) -> Result<PipelineRun, ContextError> {
        self.run_with_cancellation(context, &CancellationSignal::new())
            .await
    }

    /// Runs every node against `context`, stopping at the first node boundary
    /// after `cancel` is raised.
    ///
    /// `Err` is returned only when the context rejects the executor's own
    /// bookkeeping (for example a context that already has nodes registered
    /// under the same names). Node failures are reported through
    /// [`RunOutcome::Halted`].
    #[instrument(
        name = "pipeline_run",
        skip_all,
        fields(
            run_id = %context.run_id(),
            skill = %context.skill_name(),
            level = %context.proficiency_level(),
        )
    )]
    pub async fn run_with_cancellation(
        &self,
        mut context: PipelineContext,
        cancel: &CancellationSignal,
    ) -> Result<PipelineRun, ContextError> {
        for node in &self.nodes {
            context.register_node(node.name().clone())?;
        }
        info!(nodes = self.nodes.len(), "pipeline started");

        for node in &self.nodes {
            let name = node.name().clone();
            context.mark_running(&name)?;

            let result = if cancel.is_cancelled() {
                Err(NodeError::Cancelled)
            } else {
                let span = info_span!("node", node = %name);
                let result = node.execute(&context).instrument(span).await;
                if cancel.is_cancelled() {
                    Err(NodeError::Cancelled)
                } else {
                    result
                }
            };

            let committed = match result {
                Ok(output) => context.apply(output).map_err(rejected_output),
                Err(err) => Err(err),
            };

            match committed {
                Ok(()) => {
                    context.mark_completed(&name)?;
                    info!(node = %name, "node completed");
                }
                Err(err) => {
                    let failure = NodeFailure::from_error(name, &err);
                    warn!(
                        node = %failure.failed_node,
                        error_kind = %failure.error_kind,
                        error = %failure.message,
                        "node failed; halting pipeline"
                    );
                    context.mark_failed(failure.clone())?;
                    return Ok(PipelineRun {
                        context,
                        outcome: RunOutcome::Halted(failure),
                    });
                }
            }
        }

        info!("pipeline completed");
        Ok(PipelineRun {
            context,
            outcome: RunOutcome::AllCompleted,
        })
    }
}

/// Classifies a refused write as the node's own validation failure.
fn rejected_output(err: ContextError) -> NodeError {
    match err {
        ContextError::Invalid(err) => NodeError::Validation(err),
        other => NodeError::Validation(ValidationError::Rejected {
            reason: other.to_string(),
        }),
    }
}

impl std::fmt::Debug for PipelineExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineExecutor")
            .field("nodes", &self.node_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pipeline::{
        Distinction, ErrorKind, NodeOutput, NodeStatus, ProficiencyLevel, SkillName,
    };

    use super::*;

    /// A node that returns a fixed result without calling any model.
    struct Fixed {
        name: NodeName,
        output: Result<NodeOutput, NodeError>,
    }

    #[async_trait]
    impl PipelineNode for Fixed {
        fn name(&self) -> &NodeName {
            &self.name
        }

        async fn execute(&self, _: &PipelineContext) -> Result<NodeOutput, NodeError> {
            self.output.clone()
        }
    }

    fn fixed(name: &'static str, output: Result<NodeOutput, NodeError>) -> Box<dyn PipelineNode> {
        Box::new(Fixed {
            name: NodeName::from_static(name),
            output,
        })
    }

    fn distinctions(n: usize) -> Vec<Distinction> {
        (0..n)
            .map(|i| Distinction {
                name: format!("D{i}"),
                description: "d".into(),
                importance: "i".into(),
                current_level: ProficiencyLevel::Beginner,
            })
            .collect()
    }

    fn context() -> PipelineContext {
        PipelineContext::new(SkillName::new("Chess").unwrap(), ProficiencyLevel::Beginner)
    }

    #[tokio::test]
    async fn failure_halts_and_leaves_later_nodes_pending() {
        let executor = PipelineExecutor::new(vec![
            fixed("first", Ok(NodeOutput::Distinctions(distinctions(5)))),
            fixed("second", Err(NodeError::Cancelled)),
            fixed("third", Ok(NodeOutput::Insights(vec![]))),
        ]);

        let run = executor.run(context()).await.unwrap();
        let ctx = &run.context;

        assert_eq!(ctx.status_of(&NodeName::from_static("first")), Some(NodeStatus::Completed));
        assert_eq!(ctx.status_of(&NodeName::from_static("second")), Some(NodeStatus::Failed));
        assert_eq!(ctx.status_of(&NodeName::from_static("third")), Some(NodeStatus::Pending));
        assert_eq!(ctx.distinctions().len(), 5);

        let failure = run.into_result().unwrap_err();
        assert_eq!(failure.failed_node.as_str(), "second");
        assert_eq!(failure.error_kind, ErrorKind::Cancelled);
    }

    #[tokio::test]
    async fn invalid_output_fails_the_node_as_validation() {
        let executor = PipelineExecutor::new(vec![fixed(
            "first",
            Ok(NodeOutput::Distinctions(distinctions(4))),
        )]);

        let run = executor.run(context()).await.unwrap();
        assert!(run.context.distinctions().is_empty());
        assert_eq!(run.context.error().unwrap().error_kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn output_ahead_of_its_upstream_halts_as_validation() {
        let executor = PipelineExecutor::new(vec![
            fixed(
                "insights-first",
                Ok(NodeOutput::Insights((1..=4).map(|i| format!("I{i}")).collect())),
            ),
            fixed("after", Ok(NodeOutput::Distinctions(distinctions(5)))),
        ]);

        let run = executor.run(context()).await.unwrap();
        let ctx = &run.context;

        assert!(ctx.insights().is_empty());
        assert_eq!(
            ctx.status_of(&NodeName::from_static("insights-first")),
            Some(NodeStatus::Failed)
        );
        assert_eq!(ctx.status_of(&NodeName::from_static("after")), Some(NodeStatus::Pending));

        let failure = run.into_result().unwrap_err();
        assert_eq!(failure.failed_node.as_str(), "insights-first");
        assert_eq!(failure.error_kind, ErrorKind::Validation);
        assert!(failure.message.contains("requires 'distinctions'"), "{}", failure.message);
    }

    #[tokio::test]
    async fn second_write_to_a_field_halts_as_validation() {
        let executor = PipelineExecutor::new(vec![
            fixed("first", Ok(NodeOutput::Distinctions(distinctions(5)))),
            fixed("again", Ok(NodeOutput::Distinctions(distinctions(5)))),
        ]);

        let run = executor.run(context()).await.unwrap();
        assert_eq!(run.context.distinctions().len(), 5);
        assert_eq!(
            run.context.status_of(&NodeName::from_static("again")),
            Some(NodeStatus::Failed)
        );
        let failure = run.context.error().unwrap();
        assert_eq!(failure.error_kind, ErrorKind::Validation);
        assert!(failure.message.contains("already been written"), "{}", failure.message);
    }

    #[tokio::test]
    async fn raised_signal_stops_before_the_first_node() {
        let executor = PipelineExecutor::new(vec![
            fixed("first", Ok(NodeOutput::Distinctions(distinctions(5)))),
            fixed("second", Ok(NodeOutput::Insights(vec![]))),
        ]);
        let cancel = CancellationSignal::new();
        cancel.cancel();

        let run = executor.run_with_cancellation(context(), &cancel).await.unwrap();
        assert!(run.context.distinctions().is_empty());
        assert_eq!(
            run.context.status_of(&NodeName::from_static("first")),
            Some(NodeStatus::Failed)
        );
        assert_eq!(
            run.context.status_of(&NodeName::from_static("second")),
            Some(NodeStatus::Pending)
        );
    }

    #[tokio::test]
    async fn duplicate_node_names_are_rejected() {
        let executor = PipelineExecutor::new(vec![
            fixed("same", Err(NodeError::Cancelled)),
            fixed("same", Err(NodeError::Cancelled)),
        ]);
        assert!(matches!(
            executor.run(context()).await,
            Err(ContextError::DuplicateNode { .. })
        ));
    }

    #[test]
    fn default_config_matches_documented_values() {
        let config = ExecutorConfig::default();
        assert_eq!(config.node_timeout, Duration::from_secs(60));
        assert!(config.parse_retry);
    }
}
