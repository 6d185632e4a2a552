//! Runs one or more parser configurations over the same file and checks
//! that they agree.

use std::path::{Path, PathBuf};

use fixedwidth_rs::{FixedWidthParser, ParseError, ParseSummary, ParserConfig, Schema};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum RunError {
    #[error("{config}: {source}")]
    Parse {
        config: ParserConfig,
        #[source]
        source: ParseError,
    },

    #[error("Cannot generate fixture '{}': {source}", .path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{config} disagrees: {source}")]
    Disagreement {
        config: ParserConfig,
        #[source]
        source: ParseError,
    },

    #[error("{0}")]
    Config(#[from] ParseError),
}

/// Result of one configuration's parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyRun {
    pub config: ParserConfig,
    pub summary: ParseSummary,
}

/// Parse `path` once with `config`.
pub fn run_one(
    schema: &Schema,
    config: ParserConfig,
    path: &Path,
) -> Result<StrategyRun, RunError> {
    let parser = FixedWidthParser::new(schema.clone(), config)
        .map_err(|source| RunError::Parse { config, source })?;
    let summary = parser
        .parse_path(path)
        .map_err(|source| RunError::Parse { config, source })?;
    debug!(%config, total = summary.total, lines = summary.lines, "strategy finished");
    Ok(StrategyRun { config, summary })
}

/// Parse `path` with every configuration in `configs`, in order.
pub fn run_all(
    schema: &Schema,
    configs: &[ParserConfig],
    path: &Path,
) -> Result<Vec<StrategyRun>, RunError> {
    configs
        .iter()
        .map(|&config| run_one(schema, config, path))
        .collect()
}

/// Check every run against `expected`, or against the first run when no
/// expected total is given. Returns the agreed total.
pub fn check_agreement(runs: &[StrategyRun], expected: Option<i64>) -> Result<i64, RunError> {
    let Some(first) = runs.first() else {
        return Err(RunError::Config(ParseError::invalid_config(
            "no configurations were run",
        )));
    };
    let reference = expected.unwrap_or(first.summary.total);

    for run in runs {
        if run.summary.total != reference {
            error!(
                config = %run.config,
                total = run.summary.total,
                reference,
                "checksum mismatch"
            );
            return Err(RunError::Disagreement {
                config: run.config,
                source: ParseError::ChecksumMismatch {
                    expected: reference,
                    actual: run.summary.total,
                },
            });
        }
    }
    Ok(reference)
}
