//! SkillMaster pipeline nodes, LLM gateway, and executor.
//!
//! This crate provides the three analysis nodes (Skill-Analysis,
//! Insight-Generation, Next-Steps), the LLM gateway every node uses to reach
//! the model, the tolerant response parser, and the [`PipelineExecutor`] that
//! drives a run.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Nodes sequence calls between business logic in the
//! [`pipeline`] crate and the [`pipeline::CompletionClient`] port. Domain
//! rules (counts, uniqueness, references) live in [`pipeline::validation`];
//! nodes only invoke them.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`parser`] | JSON extraction from raw model output |
//! | [`prompts`] | Prompt builders, one per node |
//! | [`gateway`] | Deadline and parse-retry wrapper over the completion client |
//! | [`skill_analysis`], [`insight_generation`], [`next_steps`] | The nodes |
//! | [`cancellation`] | Cooperative run cancellation |
//! | [`executor`] | Sequential executor and run outcome types |

pub mod cancellation;
pub mod executor;
pub mod gateway;
pub mod insight_generation;
pub mod next_steps;
pub mod parser;
mod payload;
pub mod prompts;
pub mod skill_analysis;

pub use cancellation::{CancelOnDrop, CancellationSignal};
pub use executor::{ExecutorConfig, PipelineExecutor, PipelineRun, RunOutcome};
pub use gateway::LlmGateway;
pub use insight_generation::{InsightGenerationNode, INSIGHT_GENERATION_NODE};
pub use next_steps::{NextStepsNode, NEXT_STEPS_NODE};
pub use parser::parse_response;
pub use skill_analysis::{SkillAnalysisNode, SKILL_ANALYSIS_NODE};
