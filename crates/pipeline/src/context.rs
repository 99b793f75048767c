//! The per-request analysis state threaded through every node.
//!
//! [`PipelineContext`] is append-only. Each output field is written once, by
//! committing the owning node's [`NodeOutput`], and only after its upstream
//! fields are populated. Node statuses follow the state machine
//! `Pending → Running → Completed | Failed`; any other transition is rejected.

use crate::validation::{check_distinctions, check_insights, check_next_steps};
use crate::{
    AnalysisReport, ContextError, Distinction, NextStep, NodeFailure, NodeName, NodeOutput,
    NodeRecord, NodeStatus, PipelineRunId, ProficiencyLevel, SkillName, Timestamp,
};

/// Accumulating analysis for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineContext {
    run_id: PipelineRunId,
    skill_name: SkillName,
    proficiency_level: ProficiencyLevel,
    distinctions: Vec<Distinction>,
    insights: Vec<String>,
    next_steps: Vec<NextStep>,
    node_records: Vec<NodeRecord>,
    error: Option<NodeFailure>,
}

impl PipelineContext {
    /// Creates an empty context for one request.
    pub fn new(skill_name: SkillName, proficiency_level: ProficiencyLevel) -> Self {
        Self {
            run_id: PipelineRunId::new_random(),
            skill_name,
            proficiency_level,
            distinctions: Vec::new(),
            insights: Vec::new(),
            next_steps: Vec::new(),
            node_records: Vec::new(),
            error: None,
        }
    }

    /// Rebuilds a completed context from an exported report.
    ///
    /// Every rule a live run enforces is checked again, and each of `nodes`
    /// is recorded as `Completed` (without timestamps).
    pub fn from_report(
        report: AnalysisReport,
        nodes: impl IntoIterator<Item = NodeName>,
    ) -> Result<Self, ContextError> {
        check_distinctions(&report.distinctions)?;
        check_insights(&report.insights)?;
        check_next_steps(&report.next_steps, &report.distinctions)?;

        let mut context = Self::new(report.skill_name, report.proficiency_level);
        for node in nodes {
            context.register_node(node)?;
        }
        for record in &mut context.node_records {
            record.status = NodeStatus::Completed;
        }
        context.distinctions = report.distinctions;
        context.insights = report.insights;
        context.next_steps = report.next_steps;
        Ok(context)
    }

    // -- Accessors -----------------------------------------------------------

    /// Identifier correlating all log events of this run.
    pub fn run_id(&self) -> PipelineRunId {
        self.run_id
    }

    /// The skill under analysis.
    pub fn skill_name(&self) -> &SkillName {
        &self.skill_name
    }

    /// The learner's level.
    pub fn proficiency_level(&self) -> ProficiencyLevel {
        self.proficiency_level
    }

    /// Distinctions, empty until the Skill-Analysis node completes.
    pub fn distinctions(&self) -> &[Distinction] {
        &self.distinctions
    }

    /// Insights, empty until the Insight-Generation node completes.
    pub fn insights(&self) -> &[String] {
        &self.insights
    }

    /// Next steps, empty until the Next-Steps node completes.
    pub fn next_steps(&self) -> &[NextStep] {
        &self.next_steps
    }

    /// Status records in registration order.
    pub fn node_records(&self) -> &[NodeRecord] {
        &self.node_records
    }

    /// Current status of `node`, if registered.
    pub fn status_of(&self, node: &NodeName) -> Option<NodeStatus> {
        self.record(node).map(|r| r.status)
    }

    /// The failure that halted the run, if any.
    pub fn error(&self) -> Option<&NodeFailure> {
        self.error.as_ref()
    }

    /// `true` when every registered node completed and nothing failed.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
            && !self.node_records.is_empty()
            && self
                .node_records
                .iter()
                .all(|r| r.status == NodeStatus::Completed)
    }

    /// Exports the analysis fields.
    pub fn to_report(&self) -> AnalysisReport {
        AnalysisReport {
            skill_name: self.skill_name.clone(),
            proficiency_level: self.proficiency_level,
            distinctions: self.distinctions.clone(),
            insights: self.insights.clone(),
            next_steps: self.next_steps.clone(),
        }
    }

    // -- Executor-only mutators ----------------------------------------------
    //
    // These are public because the executor lives in another crate. Nothing
    // but the executor should call them.

    /// Registers `node` with status `Pending`.
    pub fn register_node(&mut self, node: NodeName) -> Result<(), ContextError> {
        if self.record(&node).is_some() {
            return Err(ContextError::DuplicateNode { node });
        }
        self.node_records.push(NodeRecord::pending(node));
        Ok(())
    }

    /// Moves `node` from `Pending` to `Running`.
    pub fn mark_running(&mut self, node: &NodeName) -> Result<(), ContextError> {
        let record = self.transition(node, NodeStatus::Running)?;
        record.started_at = Some(Timestamp::now());
        Ok(())
    }

    /// Moves `node` from `Running` to `Completed`.
    pub fn mark_completed(&mut self, node: &NodeName) -> Result<(), ContextError> {
        let record = self.transition(node, NodeStatus::Completed)?;
        record.finished_at = Some(Timestamp::now());
        Ok(())
    }

    /// Moves the failed node from `Running` to `Failed` and records `failure`.
    pub fn mark_failed(&mut self, failure: NodeFailure) -> Result<(), ContextError> {
        let record = self.transition(&failure.failed_node, NodeStatus::Failed)?;
        record.finished_at = Some(Timestamp::now());
        self.error = Some(failure);
        Ok(())
    }

    /// Commits a node's output to the field it owns.
    ///
    /// Fails if the field was already written or an upstream field is empty.
    /// The output itself is re-validated, so a context can never hold a
    /// mis-sized list or a dangling `develops` reference.
    pub fn apply(&mut self, output: NodeOutput) -> Result<(), ContextError> {
        let field = output.field();
        match output {
            NodeOutput::Distinctions(distinctions) => {
                Self::ensure_unwritten(field, self.distinctions.is_empty())?;
                check_distinctions(&distinctions)?;
                self.distinctions = distinctions;
            }
            NodeOutput::Insights(insights) => {
                Self::ensure_unwritten(field, self.insights.is_empty())?;
                Self::ensure_upstream(field, "distinctions", !self.distinctions.is_empty())?;
                check_insights(&insights)?;
                self.insights = insights;
            }
            NodeOutput::NextSteps(steps) => {
                Self::ensure_unwritten(field, self.next_steps.is_empty())?;
                Self::ensure_upstream(field, "distinctions", !self.distinctions.is_empty())?;
                Self::ensure_upstream(field, "insights", !self.insights.is_empty())?;
                check_next_steps(&steps, &self.distinctions)?;
                self.next_steps = steps;
            }
        }
        tracing::debug!(run_id = %self.run_id, field, "committed node output");
        Ok(())
    }

    // -- Internals -----------------------------------------------------------

    fn record(&self, node: &NodeName) -> Option<&NodeRecord> {
        self.node_records.iter().find(|r| &r.node == node)
    }

    fn transition(
        &mut self,
        node: &NodeName,
        to: NodeStatus,
    ) -> Result<&mut NodeRecord, ContextError> {
        let record = self
            .node_records
            .iter_mut()
            .find(|r| &r.node == node)
            .ok_or_else(|| ContextError::UnknownNode { node: node.clone() })?;

        let allowed = matches!(
            (record.status, to),
            (NodeStatus::Pending, NodeStatus::Running)
                | (NodeStatus::Running, NodeStatus::Completed)
                | (NodeStatus::Running, NodeStatus::Failed)
        );
        if !allowed {
            return Err(ContextError::InvalidTransition {
                node: node.clone(),
                from: record.status,
                to,
            });
        }
        record.status = to;
        Ok(record)
    }

    fn ensure_unwritten(field: &'static str, empty: bool) -> Result<(), ContextError> {
        if empty {
            Ok(())
        } else {
            Err(ContextError::AlreadyWritten { field })
        }
    }

    fn ensure_upstream(
        field: &'static str,
        requires: &'static str,
        populated: bool,
    ) -> Result<(), ContextError> {
        if populated {
            Ok(())
        } else {
            Err(ContextError::MissingUpstream { field, requires })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, ValidationError};

    const A: NodeName = NodeName::from_static("A");

    fn context() -> PipelineContext {
        PipelineContext::new(
            SkillName::new("Guitar Playing").unwrap(),
            ProficiencyLevel::Beginner,
        )
    }

    fn distinctions() -> Vec<Distinction> {
        ["Chords", "Rhythm", "Strumming", "Fretting", "Ear Training"]
            .into_iter()
            .map(|n| Distinction {
                name: n.into(),
                description: "d".into(),
                importance: "i".into(),
                current_level: ProficiencyLevel::Beginner,
            })
            .collect()
    }

    fn insights() -> Vec<String> {
        (1..=4).map(|i| format!("insight {i}")).collect()
    }

    fn steps() -> Vec<NextStep> {
        (0..3)
            .map(|i| NextStep {
                action: format!("step {i}"),
                time_commitment: "10 minutes".into(),
                success_criteria: "done".into(),
                develops: vec!["Chords".into()],
            })
            .collect()
    }

    #[test]
    fn new_context_is_empty() {
        let ctx = context();
        assert!(ctx.distinctions().is_empty());
        assert!(ctx.insights().is_empty());
        assert!(ctx.next_steps().is_empty());
        assert!(ctx.error().is_none());
        assert!(!ctx.is_complete());
    }

    #[test]
    fn registered_nodes_start_pending() {
        let mut ctx = context();
        ctx.register_node(A).unwrap();
        assert_eq!(ctx.status_of(&A), Some(NodeStatus::Pending));
        assert_eq!(
            ctx.register_node(A),
            Err(ContextError::DuplicateNode { node: A })
        );
    }

    #[test]
    fn status_follows_the_state_machine() {
        let mut ctx = context();
        ctx.register_node(A).unwrap();

        assert!(matches!(
            ctx.mark_completed(&A),
            Err(ContextError::InvalidTransition { .. })
        ));

        ctx.mark_running(&A).unwrap();
        ctx.mark_completed(&A).unwrap();
        assert_eq!(ctx.status_of(&A), Some(NodeStatus::Completed));
        assert!(ctx.node_records()[0].elapsed().is_some());

        assert!(matches!(
            ctx.mark_running(&A),
            Err(ContextError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn failure_is_recorded() {
        let mut ctx = context();
        ctx.register_node(A).unwrap();
        ctx.mark_running(&A).unwrap();
        ctx.mark_failed(NodeFailure {
            failed_node: A,
            error_kind: ErrorKind::Timeout,
            message: "too slow".into(),
        })
        .unwrap();

        assert_eq!(ctx.status_of(&A), Some(NodeStatus::Failed));
        assert_eq!(ctx.error().unwrap().error_kind, ErrorKind::Timeout);
        assert!(!ctx.is_complete());
    }

    #[test]
    fn fields_are_written_once() {
        let mut ctx = context();
        ctx.apply(NodeOutput::Distinctions(distinctions())).unwrap();
        assert_eq!(
            ctx.apply(NodeOutput::Distinctions(distinctions())),
            Err(ContextError::AlreadyWritten {
                field: "distinctions"
            })
        );
    }

    #[test]
    fn downstream_fields_require_upstream_fields() {
        let mut ctx = context();
        assert_eq!(
            ctx.apply(NodeOutput::Insights(insights())),
            Err(ContextError::MissingUpstream {
                field: "insights",
                requires: "distinctions"
            })
        );

        ctx.apply(NodeOutput::Distinctions(distinctions())).unwrap();
        assert_eq!(
            ctx.apply(NodeOutput::NextSteps(steps())),
            Err(ContextError::MissingUpstream {
                field: "next_steps",
                requires: "insights"
            })
        );
    }

    #[test]
    fn apply_rejects_invalid_output() {
        let mut ctx = context();
        let mut four = distinctions();
        four.pop();
        assert!(matches!(
            ctx.apply(NodeOutput::Distinctions(four)),
            Err(ContextError::Invalid(ValidationError::WrongCount { .. }))
        ));
        assert!(ctx.distinctions().is_empty());
    }

    #[test]
    fn report_round_trips_through_context() {
        let mut ctx = context();
        ctx.apply(NodeOutput::Distinctions(distinctions())).unwrap();
        ctx.apply(NodeOutput::Insights(insights())).unwrap();
        ctx.apply(NodeOutput::NextSteps(steps())).unwrap();

        let report = ctx.to_report();
        let json = serde_json::to_string(&report).unwrap();
        let parsed: AnalysisReport = serde_json::from_str(&json).unwrap();
        let rebuilt = PipelineContext::from_report(parsed, [A]).unwrap();

        assert_eq!(rebuilt.to_report(), report);
        assert!(rebuilt.is_complete());
    }

    #[test]
    fn from_report_rejects_dangling_references() {
        let mut report = AnalysisReport {
            skill_name: SkillName::new("Chess").unwrap(),
            proficiency_level: ProficiencyLevel::Advanced,
            distinctions: distinctions(),
            insights: insights(),
            next_steps: steps(),
        };
        report.next_steps[1].develops = vec!["Openings".into()];

        assert!(matches!(
            PipelineContext::from_report(report, [A]),
            Err(ContextError::Invalid(ValidationError::UnknownDistinction { .. }))
        ));
    }
}
