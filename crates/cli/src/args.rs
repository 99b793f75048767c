//! Command-line definition.
//!
//! Every setting can also come from the environment (after `.env` is loaded),
//! so the same binary works interactively and in a container.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use llm::config::{DEFAULT_MODEL, OPENAI_BASE_URL};
use llm::OpenAiConfig;
use nodes::ExecutorConfig;
use pipeline::{ModelName, SkillMasterError};

/// SkillMaster: break a skill into distinctions, insights, and next steps.
#[derive(Debug, Parser)]
#[command(name = "skillmaster", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze one skill and print the breakdown.
    ///
    /// Prompts on stdin for anything not given on the command line.
    Analyze {
        /// Skill to analyze, e.g. "Public Speaking".
        #[arg(long)]
        skill: Option<String>,

        /// Beginner, Intermediate, Advanced (or 1, 2, 3).
        #[arg(long)]
        level: Option<String>,

        /// Save the report as JSON. Without a value the file is named after
        /// the skill.
        #[arg(long, value_name = "FILE")]
        output: Option<Option<PathBuf>>,

        /// Print the report as JSON instead of the formatted breakdown.
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "SKILLMASTER_ADDR", default_value = "0.0.0.0:8000")]
        addr: SocketAddr,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per event.
    Json,
}

/// Settings shared by every subcommand.
#[derive(Debug, Args)]
pub struct Settings {
    /// API key for the completion provider.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// OpenAI-compatible API root.
    #[arg(long, env = "SKILLMASTER_BASE_URL", default_value = OPENAI_BASE_URL, global = true)]
    pub base_url: String,

    /// Chat model name.
    #[arg(long, env = "SKILLMASTER_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: ModelName,

    /// Sampling temperature (0.0 to 2.0).
    #[arg(long, env = "SKILLMASTER_TEMPERATURE", default_value_t = 0.7, global = true)]
    pub temperature: f32,

    /// Deadline for each completion call, in seconds.
    #[arg(long, env = "SKILLMASTER_NODE_TIMEOUT_SECS", default_value_t = 60, global = true)]
    pub node_timeout_secs: u64,

    /// Attempts per completion call for transient provider errors.
    #[arg(long, env = "SKILLMASTER_MAX_ATTEMPTS", default_value_t = 3, global = true)]
    pub max_attempts: u32,

    /// Do not re-ask the model when a response contains no JSON.
    #[arg(long, global = true)]
    pub no_parse_retry: bool,

    /// Log output format on stderr.
    #[arg(
        long,
        env = "SKILLMASTER_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text,
        global = true
    )]
    pub log_format: LogFormat,
}

impl Settings {
    /// Validates the settings into provider and executor configuration.
    pub fn resolve(&self) -> Result<(OpenAiConfig, ExecutorConfig), SkillMasterError> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| SkillMasterError::Configuration {
                message: "OPENAI_API_KEY is not set (use --api-key or a .env file)".into(),
            })?;
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(SkillMasterError::Configuration {
                message: format!("temperature must be within 0.0..=2.0, got {}", self.temperature),
            });
        }
        if self.node_timeout_secs == 0 {
            return Err(SkillMasterError::Configuration {
                message: "node timeout must be at least one second".into(),
            });
        }
        if self.max_attempts == 0 {
            return Err(SkillMasterError::Configuration {
                message: "max attempts must be at least 1".into(),
            });
        }

        let executor = ExecutorConfig {
            node_timeout: Duration::from_secs(self.node_timeout_secs),
            parse_retry: !self.no_parse_retry,
        };

        let mut provider = OpenAiConfig::openai(api_key, self.model.clone())
            .with_base_url(self.base_url.as_str());
        provider.temperature = self.temperature;
        provider.max_attempts = self.max_attempts;
        let provider = provider.with_attempt_budget(executor.node_timeout);

        Ok((provider, executor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn output_flag_may_omit_its_value() {
        let cli = parse(&["skillmaster", "analyze", "--skill", "Chess", "--output"]);
        match cli.command {
            Command::Analyze { output, .. } => assert_eq!(output, Some(None)),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = parse(&["skillmaster", "analyze", "--output", "out.json"]);
        match cli.command {
            Command::Analyze { output, .. } => {
                assert_eq!(output, Some(Some(PathBuf::from("out.json"))))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn settings_resolve_into_configs() {
        let cli = parse(&[
            "skillmaster",
            "--api-key",
            "sk-test",
            "--node-timeout-secs",
            "5",
            "--no-parse-retry",
            "serve",
        ]);
        let (provider, executor) = cli.settings.resolve().unwrap();
        assert_eq!(provider.api_key, "sk-test");
        assert_eq!(executor.node_timeout, Duration::from_secs(5));
        assert!(!executor.parse_retry);
    }

    #[test]
    fn http_timeout_leaves_room_for_every_attempt() {
        let cli = parse(&["skillmaster", "--api-key", "k", "--max-attempts", "3", "serve"]);
        let (provider, executor) = cli.settings.resolve().unwrap();
        assert_eq!(executor.node_timeout, Duration::from_secs(60));
        assert_eq!(provider.request_timeout, Duration::from_secs(20));
        assert!(provider.request_timeout * provider.max_attempts <= executor.node_timeout);
    }

    #[test]
    fn blank_api_key_is_a_configuration_error() {
        let cli = parse(&["skillmaster", "--api-key", "  ", "serve"]);
        assert!(matches!(
            cli.settings.resolve(),
            Err(SkillMasterError::Configuration { .. })
        ));
    }

    #[test]
    fn out_of_range_temperature_is_rejected() {
        let cli = parse(&["skillmaster", "--api-key", "k", "--temperature", "3.5", "serve"]);
        assert!(cli.settings.resolve().is_err());
    }
}
