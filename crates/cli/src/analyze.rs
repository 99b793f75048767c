//! The `analyze` subcommand: input prompting, result display, report saving.

use std::fs;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pipeline::{AnalysisReport, AnalysisRequest, NodeFailure, ProficiencyLevel};

const RULE: &str = "============================================================";

/// Builds the request from command-line values, prompting on `input` for
/// whatever is missing.
///
/// A level entered at the menu that is not 1-3 falls back to Beginner. A
/// level given on the command line is passed through unchanged and validated
/// strictly.
pub fn collect_request(
    skill: Option<String>,
    level: Option<String>,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<AnalysisRequest> {
    let skill_name = match skill {
        Some(skill) => skill,
        None => {
            write!(out, "What skill would you like to analyze? ")?;
            out.flush()?;
            read_line(input)?
        }
    };

    let proficiency_level = match level {
        Some(level) => level,
        None => {
            writeln!(out, "\nSelect your current proficiency level:")?;
            for (i, level) in ProficiencyLevel::ALL.iter().enumerate() {
                writeln!(out, "{}. {level}", i + 1)?;
            }
            write!(out, "\nEnter choice (1-3): ")?;
            out.flush()?;
            menu_choice(&read_line(input)?).as_str().to_owned()
        }
    };

    Ok(AnalysisRequest {
        skill_name,
        proficiency_level,
    })
}

fn read_line(input: &mut impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read input")?;
    Ok(line.trim().to_owned())
}

fn menu_choice(choice: &str) -> ProficiencyLevel {
    match choice.trim() {
        "2" => ProficiencyLevel::Intermediate,
        "3" => ProficiencyLevel::Advanced,
        _ => ProficiencyLevel::Beginner,
    }
}

/// Writes the formatted breakdown of a completed analysis.
pub fn display_report(report: &AnalysisReport, out: &mut impl Write) -> Result<()> {
    writeln!(out, "\n{RULE}")?;
    writeln!(out, "SKILL ANALYSIS: {}", report.skill_name.as_str().to_uppercase())?;
    writeln!(out, "Current Level: {}", report.proficiency_level)?;
    writeln!(out, "{RULE}")?;

    writeln!(out, "\nKEY DISTINCTIONS:")?;
    for (i, d) in report.distinctions.iter().enumerate() {
        writeln!(out, "\n{}. {} [{}]", i + 1, d.name, d.current_level)?;
        writeln!(out, "   {}", d.description)?;
        writeln!(out, "   Why it matters: {}", d.importance)?;
    }

    writeln!(out, "\nKEY INSIGHTS:")?;
    for (i, insight) in report.insights.iter().enumerate() {
        writeln!(out, "{}. {insight}", i + 1)?;
    }

    writeln!(out, "\nNEXT STEPS:")?;
    for (i, step) in report.next_steps.iter().enumerate() {
        writeln!(out, "\n{}. {}", i + 1, step.action)?;
        writeln!(out, "   Time: {}", step.time_commitment)?;
        writeln!(out, "   Success looks like: {}", step.success_criteria)?;
        writeln!(out, "   Develops: {}", step.develops.join(", "))?;
    }
    writeln!(out, "\n{RULE}")?;
    Ok(())
}

/// Writes the failure summary of a halted run.
pub fn display_failure(failure: &NodeFailure, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Analysis halted at {}.", failure.failed_node)?;
    writeln!(out, "  kind:    {}", failure.error_kind)?;
    writeln!(out, "  message: {}", failure.message)?;
    Ok(())
}

/// Default report file name: `skillmaster_<skill>.json`, lower-cased with
/// spaces replaced by underscores.
pub fn default_report_path(skill: &str) -> PathBuf {
    PathBuf::from(format!(
        "skillmaster_{}.json",
        skill.trim().replace(' ', "_").to_lowercase()
    ))
}

/// Saves `report` as pretty-printed JSON.
pub fn save_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("failed to serialise report")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use pipeline::{Distinction, NextStep, NodeName, PipelineContext, SkillName};

    use super::*;

    fn report() -> AnalysisReport {
        AnalysisReport {
            skill_name: SkillName::new("Public Speaking").unwrap(),
            proficiency_level: ProficiencyLevel::Beginner,
            distinctions: ["Vocal Variety", "Eye Contact", "Structure", "Pacing", "Stage Presence"]
                .into_iter()
                .map(|n| Distinction {
                    name: n.into(),
                    description: format!("About {n}."),
                    importance: "Audiences notice.".into(),
                    current_level: ProficiencyLevel::Beginner,
                })
                .collect(),
            insights: (1..=4).map(|i| format!("Insight {i}")).collect(),
            next_steps: (1..=3)
                .map(|i| NextStep {
                    action: format!("Drill {i}"),
                    time_commitment: "10 minutes daily".into(),
                    success_criteria: "Recorded and reviewed".into(),
                    develops: vec!["Pacing".into()],
                })
                .collect(),
        }
    }

    #[test]
    fn missing_values_are_prompted_for() {
        let mut input = Cursor::new("Public Speaking\n2\n");
        let mut out = Vec::new();
        let request = collect_request(None, None, &mut input, &mut out).unwrap();

        assert_eq!(request.skill_name, "Public Speaking");
        assert_eq!(request.proficiency_level, "Intermediate");
        let shown = String::from_utf8(out).unwrap();
        assert!(shown.contains("3. Advanced"));
    }

    #[test]
    fn unknown_menu_choice_defaults_to_beginner() {
        let mut input = Cursor::new("9\n");
        let request =
            collect_request(Some("Chess".into()), None, &mut input, &mut Vec::<u8>::new()).unwrap();
        assert_eq!(request.proficiency_level, "Beginner");
    }

    #[test]
    fn given_values_skip_the_prompts() {
        let mut input = Cursor::new("");
        let mut out = Vec::new();
        let request = collect_request(
            Some("Chess".into()),
            Some("Grandmaster".into()),
            &mut input,
            &mut out,
        )
        .unwrap();
        assert_eq!(request.proficiency_level, "Grandmaster");
        assert!(out.is_empty());
        assert!(request.validate().is_err());
    }

    #[test]
    fn default_path_is_derived_from_the_skill() {
        assert_eq!(
            default_report_path("Public Speaking"),
            PathBuf::from("skillmaster_public_speaking.json")
        );
    }

    #[test]
    fn formatted_report_lists_every_section() {
        let mut out = Vec::new();
        display_report(&report(), &mut out).unwrap();
        let shown = String::from_utf8(out).unwrap();

        assert!(shown.contains("SKILL ANALYSIS: PUBLIC SPEAKING"));
        assert!(shown.contains("5. Stage Presence [Beginner]"));
        assert!(shown.contains("4. Insight 4"));
        assert!(shown.contains("Develops: Pacing"));
    }

    #[test]
    fn saved_report_loads_back_into_a_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(default_report_path("Public Speaking"));
        save_report(&report(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let loaded: AnalysisReport = serde_json::from_str(&text).unwrap();
        let context = PipelineContext::from_report(loaded, Vec::<NodeName>::new()).unwrap();
        assert_eq!(context.to_report(), report());
    }
}
