//! Prompt builders, one per node.
//!
//! Each builder reads only the context fields its node depends on. Every
//! prompt asks for a JSON object wrapping the list under the field name,
//! which keeps providers that enforce `json_object` output happy.

use std::fmt::Write as _;

use pipeline::{Distinction, PipelineContext};

/// System instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "You are an expert skill coach using the \"Skilled Success\" \
methodology. Always respond with a single valid JSON object and nothing else.";

/// Appended to a prompt when the first response could not be parsed.
pub const STRICT_JSON_REMINDER: &str = "IMPORTANT: your previous reply could not be parsed. \
Respond with ONLY the JSON object described above: no prose, no explanations, no code fences.";

/// Prompt for the Skill-Analysis node: `skill_name` + `proficiency_level`.
pub fn skill_analysis(context: &PipelineContext) -> String {
    let skill = context.skill_name();
    let level = context.proficiency_level();
    format!(
        r#"Analyze the skill "{skill}" for someone at the {level} level.

Identify exactly 5 key distinctions (sub-skills or components) that make up this skill.
Each distinction should be specific, observable, and improvable incrementally.

For each distinction, provide:
1. name: concise, 2-4 words, unique among the five
2. description: one sentence explaining what it is
3. importance: one sentence on why it matters for this skill
4. current_level: your assessment for a {level} learner, one of "Beginner", "Intermediate", "Advanced"

Return ONLY valid JSON in this exact format:
{{
  "distinctions": [
    {{
      "name": "string",
      "description": "string",
      "importance": "string",
      "current_level": "Beginner|Intermediate|Advanced"
    }}
  ]
}}"#
    )
}

/// Prompt for the Insight-Generation node: `skill_name` + `distinctions`.
pub fn insight_generation(context: &PipelineContext) -> String {
    let skill = context.skill_name();
    let level = context.proficiency_level();
    let distinctions = summarise(context.distinctions(), true);
    format!(
        r#"Based on these distinctions for {skill} at the {level} level:

{distinctions}
Generate exactly 4 actionable insights or strategic recommendations for learning this skill effectively.
Each insight should be specific and practical, connect to one or more distinctions, and state a clear
learning principle or strategy.

Return ONLY valid JSON in this exact format:
{{
  "insights": ["insight 1", "insight 2", "insight 3", "insight 4"]
}}"#
    )
}

/// Prompt for the Next-Steps node: `skill_name` + `distinctions` + `insights`.
pub fn next_steps(context: &PipelineContext) -> String {
    let skill = context.skill_name();
    let level = context.proficiency_level();
    let distinctions = summarise(context.distinctions(), false);
    let mut insights = String::new();
    for (i, insight) in context.insights().iter().enumerate() {
        let _ = writeln!(insights, "{}. {insight}", i + 1);
    }
    format!(
        r#"Create exactly 3 specific, actionable next steps for developing {skill} at the {level} level.

Available distinctions to develop (use these names exactly):
{distinctions}
Insights to build on:
{insights}
For each step provide:
1. action: a specific practice or exercise
2. time_commitment: e.g. "10 minutes daily"
3. success_criteria: how to know you've succeeded
4. develops: the list of distinction names (from the list above) this step improves

Return ONLY valid JSON in this exact format:
{{
  "next_steps": [
    {{
      "action": "string",
      "time_commitment": "string",
      "success_criteria": "string",
      "develops": ["distinction name", "distinction name"]
    }}
  ]
}}"#
    )
}

fn summarise(distinctions: &[Distinction], with_description: bool) -> String {
    let mut out = String::new();
    for d in distinctions {
        if with_description {
            let _ = writeln!(out, "- {}: {}", d.name, d.description);
        } else {
            let _ = writeln!(out, "- {}", d.name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{NodeOutput, ProficiencyLevel, SkillName};

    fn context() -> PipelineContext {
        PipelineContext::new(
            SkillName::new("Guitar Playing").unwrap(),
            ProficiencyLevel::Intermediate,
        )
    }

    fn with_distinctions() -> PipelineContext {
        let mut ctx = context();
        let distinctions = ["Chord Changes", "Rhythm", "Strumming", "Fretting", "Ear Training"]
            .into_iter()
            .map(|n| Distinction {
                name: n.into(),
                description: format!("About {n}"),
                importance: "It matters".into(),
                current_level: ProficiencyLevel::Beginner,
            })
            .collect();
        ctx.apply(NodeOutput::Distinctions(distinctions)).unwrap();
        ctx
    }

    #[test]
    fn skill_analysis_mentions_skill_and_level() {
        let prompt = skill_analysis(&context());
        assert!(prompt.contains("\"Guitar Playing\""));
        assert!(prompt.contains("Intermediate level"));
        assert!(prompt.contains("exactly 5"));
        assert!(prompt.contains("\"distinctions\": ["));
    }

    #[test]
    fn insight_prompt_lists_distinctions_with_descriptions() {
        let prompt = insight_generation(&with_distinctions());
        assert!(prompt.contains("- Chord Changes: About Chord Changes"));
        assert!(prompt.contains("exactly 4"));
    }

    #[test]
    fn next_steps_prompt_lists_names_and_insights() {
        let mut ctx = with_distinctions();
        let insights = (1..=4).map(|i| format!("Insight number {i}")).collect();
        ctx.apply(NodeOutput::Insights(insights)).unwrap();

        let prompt = next_steps(&ctx);
        assert!(prompt.contains("- Ear Training\n"));
        assert!(prompt.contains("4. Insight number 4"));
        assert!(prompt.contains("exactly 3"));
    }

    #[test]
    fn prompts_are_deterministic() {
        let ctx = with_distinctions();
        assert_eq!(insight_generation(&ctx), insight_generation(&ctx));
    }
}
