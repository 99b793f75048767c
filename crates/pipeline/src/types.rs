//! Shared value types for the SkillMaster analysis domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! the analysis payload itself: the proficiency scale, the per-node outputs
//! ([`Distinction`], [`NextStep`]), and the bookkeeping the executor keeps
//! for each registered node ([`NodeStatus`], [`NodeRecord`]).

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NodeName;

// ---------------------------------------------------------------------------
// Proficiency
// ---------------------------------------------------------------------------

/// The learner's self-assessed level, also used to grade each [`Distinction`].
///
/// Serialises as the canonical label (`"Beginner"`, `"Intermediate"`,
/// `"Advanced"`). Parsing is lenient about case and surrounding whitespace and
/// also accepts the menu digits `1`–`3`; anything else is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum ProficiencyLevel {
    /// Just starting out.
    Beginner,
    /// Comfortable with the fundamentals.
    Intermediate,
    /// Refining mastery.
    Advanced,
}

impl ProficiencyLevel {
    /// All levels in ascending order.
    pub const ALL: [ProficiencyLevel; 3] = [
        ProficiencyLevel::Beginner,
        ProficiencyLevel::Intermediate,
        ProficiencyLevel::Advanced,
    ];

    /// Returns the canonical label.
    pub fn as_str(self) -> &'static str {
        match self {
            ProficiencyLevel::Beginner => "Beginner",
            ProficiencyLevel::Intermediate => "Intermediate",
            ProficiencyLevel::Advanced => "Advanced",
        }
    }
}

impl std::fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text does not name a [`ProficiencyLevel`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown proficiency level '{0}' (expected Beginner, Intermediate or Advanced)")]
pub struct UnknownProficiencyLevel(pub String);

impl FromStr for ProficiencyLevel {
    type Err = UnknownProficiencyLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "beginner" | "1" => Ok(ProficiencyLevel::Beginner),
            "intermediate" | "2" => Ok(ProficiencyLevel::Intermediate),
            "advanced" | "3" => Ok(ProficiencyLevel::Advanced),
            _ => Err(UnknownProficiencyLevel(s.to_owned())),
        }
    }
}

impl TryFrom<String> for ProficiencyLevel {
    type Error = UnknownProficiencyLevel;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// Node outputs
// ---------------------------------------------------------------------------

/// One fundamental component of a skill, produced by the Skill-Analysis node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distinction {
    /// Short label, unique within one analysis.
    pub name: String,
    /// One sentence describing what the distinction is.
    pub description: String,
    /// One sentence on why it matters for the skill.
    pub importance: String,
    /// The learner's assessed level for this distinction.
    pub current_level: ProficiencyLevel,
}

/// One concrete practice recommendation, produced by the Next-Steps node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextStep {
    /// Imperative instruction.
    pub action: String,
    /// Free-text estimate such as `"15 minutes daily"`.
    pub time_commitment: String,
    /// Observable measure of completion.
    pub success_criteria: String,
    /// Names of the [`Distinction`]s this step develops. Always a subset of
    /// the distinction names in the same context.
    pub develops: Vec<String>,
}

// ---------------------------------------------------------------------------
// Node bookkeeping
// ---------------------------------------------------------------------------

/// Execution status of one registered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    /// Registered but not yet started.
    Pending,
    /// Currently executing.
    Running,
    /// Finished and its output was committed to the context.
    Completed,
    /// Finished with an error; the run halted here.
    Failed,
}

impl NodeStatus {
    /// Returns `true` for `Completed` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, NodeStatus::Completed | NodeStatus::Failed)
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            NodeStatus::Pending => "pending",
            NodeStatus::Running => "running",
            NodeStatus::Completed => "completed",
            NodeStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Status entry for one node, kept in registration order by the context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// The node this entry tracks.
    pub node: NodeName,
    /// Current status.
    pub status: NodeStatus,
    /// When the node entered `Running`. `None` while pending, and for contexts
    /// rebuilt from an exported report.
    pub started_at: Option<Timestamp>,
    /// When the node reached a terminal status.
    pub finished_at: Option<Timestamp>,
}

impl NodeRecord {
    /// Creates a pending record for `node`.
    pub fn pending(node: NodeName) -> Self {
        Self {
            node,
            status: NodeStatus::Pending,
            started_at: None,
            finished_at: None,
        }
    }

    /// Wall-clock time between start and finish, when both are known.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end.as_datetime() - start.as_datetime()),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
