//! Data contracts at the request boundary.
//!
//! [`AnalysisRequest`] is what a caller (CLI or HTTP) supplies;
//! [`AnalysisReport`] is the exported form of a completed context. A halted
//! run is reported as a [`crate::NodeFailure`] instead.

use serde::{Deserialize, Serialize};

use crate::{Distinction, NextStep, ProficiencyLevel, SkillMasterError, SkillName};

/// Inbound request, exactly as received.
///
/// Fields are raw text; [`AnalysisRequest::validate`] normalises them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Skill to analyse.
    pub skill_name: String,
    /// Free-text proficiency; defaults to `"Beginner"` when omitted.
    #[serde(default = "default_proficiency")]
    pub proficiency_level: String,
}

fn default_proficiency() -> String {
    ProficiencyLevel::Beginner.as_str().to_owned()
}

impl AnalysisRequest {
    /// Normalises and validates the request.
    pub fn validate(&self) -> Result<(SkillName, ProficiencyLevel), SkillMasterError> {
        let skill = SkillName::new(self.skill_name.as_str()).ok_or_else(|| {
            SkillMasterError::InvalidInput {
                field: "skill_name",
                message: "must not be empty".into(),
            }
        })?;
        let level = self
            .proficiency_level
            .parse()
            .map_err(|e: crate::UnknownProficiencyLevel| SkillMasterError::InvalidInput {
                field: "proficiency_level",
                message: e.to_string(),
            })?;
        Ok((skill, level))
    }
}

/// Exported analysis of one completed run.
///
/// Serialises as
/// `{skill_name, proficiency_level, distinctions[5], insights[4], next_steps[3]}`
/// and round-trips through [`crate::PipelineContext::from_report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// The analysed skill.
    pub skill_name: SkillName,
    /// The learner's level.
    pub proficiency_level: ProficiencyLevel,
    /// Key distinctions, in model order.
    pub distinctions: Vec<Distinction>,
    /// Actionable insights, in model order.
    pub insights: Vec<String>,
    /// Practice steps, in model order.
    pub next_steps: Vec<NextStep>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_level_defaults_to_beginner() {
        let request: AnalysisRequest =
            serde_json::from_str(r#"{"skill_name": "Python Programming"}"#).unwrap();
        let (skill, level) = request.validate().unwrap();
        assert_eq!(skill.as_str(), "Python Programming");
        assert_eq!(level, ProficiencyLevel::Beginner);
    }

    #[test]
    fn blank_skill_is_invalid_input() {
        let request = AnalysisRequest {
            skill_name: "  ".into(),
            proficiency_level: "Advanced".into(),
        };
        assert!(matches!(
            request.validate(),
            Err(SkillMasterError::InvalidInput {
                field: "skill_name",
                ..
            })
        ));
    }

    #[test]
    fn unknown_level_is_invalid_input() {
        let request = AnalysisRequest {
            skill_name: "Chess".into(),
            proficiency_level: "grandmaster".into(),
        };
        match request.validate() {
            Err(SkillMasterError::InvalidInput { field, message }) => {
                assert_eq!(field, "proficiency_level");
                assert!(message.contains("grandmaster"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
