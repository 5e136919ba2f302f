//! Command-line arguments and the logic behind them
//!
//! Kept in the library so configuration precedence and output rendering are
//! testable without spawning the binary.

use std::path::PathBuf;
use clap::{Parser, Subcommand};
use shared::{Record, RecordId};

use crate::config::ProcessorConfig;
use crate::error::ProcessorResult;

/// Printed by `lookup` when no record matches; not an error
pub const NOT_FOUND: &str = "not found";

/// Data processing utilities over JSON record collections
#[derive(Parser, Debug)]
#[command(name = "processor")]
#[command(about = "Duplicate detection, record lookup, scoring and a safe calculator for JSON records")]
pub struct Args {
    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the activity log after the command completes
    #[arg(long)]
    pub show_activity: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Report values of a field that occur more than once
    Duplicates {
        /// Collection file (defaults to the configured data file)
        file: Option<PathBuf>,

        /// Field to compare
        #[arg(long, default_value = "id")]
        field: String,

        /// Report once per equal pair instead of once per value
        #[arg(long)]
        pairs: bool,
    },

    /// Print the first record with the given identifier
    Lookup {
        /// Collection file
        file: PathBuf,

        /// Identifier; plain digits are read as an integer id
        id: String,

        /// Treat the identifier as text even when it is all digits
        #[arg(long)]
        text_id: bool,
    },

    /// Score one record, or every record when no id is given
    Score {
        /// Collection file
        file: PathBuf,

        /// Identifier of the record to score
        id: Option<String>,

        /// Treat the identifier as text even when it is all digits
        #[arg(long)]
        text_id: bool,
    },

    /// Evaluate an arithmetic expression
    Eval {
        expression: String,
    },

    /// Load, validate, transform and save a collection
    Pipeline {
        /// Input file (defaults to the configured data file)
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output file (defaults to the configured output file)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Copy records without adding scores
        #[arg(long)]
        no_score: bool,
    },
}

/// Resolve the configuration: defaults, then the config file, then the
/// environment (read through `lookup`), then `--log-level`
pub async fn build_config<F>(args: &Args, lookup: F) -> ProcessorResult<ProcessorConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match &args.config {
        Some(path) => ProcessorConfig::load(path).await?,
        None => ProcessorConfig::default(),
    };

    config.apply_overrides_from(lookup)?;
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

pub fn record_id(raw: &str, text_id: bool) -> RecordId {
    if text_id {
        RecordId::from(raw)
    } else {
        RecordId::parse_lenient(raw)
    }
}

/// Pretty JSON for a found record, [`NOT_FOUND`] otherwise
pub fn render_lookup(record: Option<&Record>) -> serde_json::Result<String> {
    match record {
        Some(record) => serde_json::to_string_pretty(record),
        None => Ok(NOT_FOUND.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ENV_LOG_LEVEL, ENV_OUTPUT_FILE};
    use crate::error::{ConfigError, ProcessorError};
    use std::collections::HashMap;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    async fn config_file(content: &str) -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, content).await.unwrap();
        let path = path.to_string_lossy().into_owned();
        (dir, path)
    }

    #[tokio::test]
    async fn test_defaults_without_file_or_env() {
        let args = parse(&["processor", "eval", "1+1"]);
        let config = build_config(&args, no_env).await.unwrap();
        assert_eq!(config, ProcessorConfig::default());
    }

    #[tokio::test]
    async fn test_precedence_file_then_env_then_flag() {
        let (_dir, path) = config_file(
            r#"{"log_level": "warn", "output_file": "from-file.json", "data_file": "file-data.json"}"#,
        )
        .await;
        let env = HashMap::from([
            (ENV_LOG_LEVEL, "error"),
            (ENV_OUTPUT_FILE, "from-env.json"),
        ]);
        let lookup = |key: &str| env.get(key).map(|v| v.to_string());

        let args = parse(&["processor", "--config", &path, "eval", "1"]);
        let config = build_config(&args, lookup).await.unwrap();
        assert_eq!(config.data_file, Path::new("file-data.json"));
        assert_eq!(config.output_file, Path::new("from-env.json"));
        assert_eq!(config.log_level, "error");

        let args = parse(&["processor", "--config", &path, "--log-level", "debug", "eval", "1"]);
        let config = build_config(&args, lookup).await.unwrap();
        assert_eq!(config.log_level, "debug");
    }

    #[tokio::test]
    async fn test_invalid_flag_level_rejected() {
        let args = parse(&["processor", "--log-level", "shouty", "eval", "1"]);
        let err = build_config(&args, no_env).await.unwrap_err();
        assert!(matches!(err, ProcessorError::Config(ConfigError::Invalid { .. })));
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let args = parse(&["processor", "--config", "/nonexistent/config.json", "eval", "1"]);
        let err = build_config(&args, no_env).await.unwrap_err();
        assert!(matches!(err, ProcessorError::Config(ConfigError::Read { .. })));
    }

    #[test]
    fn test_lookup_arguments() {
        let args = parse(&["processor", "lookup", "users.json", "007", "--text-id"]);
        assert_eq!(
            args.command,
            Command::Lookup {
                file: PathBuf::from("users.json"),
                id: "007".to_string(),
                text_id: true,
            }
        );

        assert_eq!(record_id("007", true), RecordId::from("007"));
        assert_eq!(record_id("007", false), RecordId::Int(7));
        assert_eq!(record_id("u-1", false), RecordId::from("u-1"));
    }

    #[test]
    fn test_render_lookup() {
        assert_eq!(render_lookup(None).unwrap(), NOT_FOUND);

        let record = Record::new().with("id", 1);
        let rendered = render_lookup(Some(&record)).unwrap();
        assert!(rendered.contains("\"id\": 1"));
    }
}
