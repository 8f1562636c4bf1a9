use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use mcda::config::AppConfig;
use mcda::error::AppError;
use mcda::scoring::{read_matrix_csv, MethodFamily, ScoreResult, ScoringEngine, ScoringRequest};
use serde_json::{json, Value};
use tracing::debug;

use crate::infra::ResultBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum MethodArg {
    /// Simple Additive Weighting
    Saw,
    /// Weighted Product
    Wp,
}

impl From<MethodArg> for MethodFamily {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::Saw => MethodFamily::Saw,
            MethodArg::Wp => MethodFamily::Wp,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Scoring method to apply
    #[arg(long, value_enum)]
    pub(crate) method: MethodArg,
    /// JSON request body, flat or hierarchical, as accepted by the HTTP API
    #[arg(long, required_unless_present = "matrix", conflicts_with = "matrix")]
    pub(crate) request: Option<PathBuf>,
    /// CSV decision matrix with a header row and an optional leading `alternative` column
    #[arg(long, requires = "weights")]
    pub(crate) matrix: Option<PathBuf>,
    /// Criteria weights for the CSV columns, comma separated
    #[arg(long, value_delimiter = ',')]
    pub(crate) weights: Vec<f64>,
    /// Criteria types (`benefit` or `cost`) for the CSV columns; benefit when omitted
    #[arg(long, value_delimiter = ',')]
    pub(crate) types: Vec<String>,
}

/// Request to score plus the row labels a CSV matrix carried, if any.
pub(crate) struct PreparedRequest {
    pub(crate) request: ScoringRequest,
    pub(crate) alternatives: Option<Vec<String>>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = Arc::new(ResultBackend::open(&config.storage)?);
    let engine = ScoringEngine::with_options(store, config.scoring);

    let family = MethodFamily::from(args.method);
    let prepared = prepare_request(args)?;
    let scores = engine.score(family, &prepared.request)?;

    let output = render_output(family, &scores, prepared.alternatives);
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn prepare_request(args: ScoreArgs) -> Result<PreparedRequest, AppError> {
    let ScoreArgs {
        request,
        matrix,
        weights,
        types,
        ..
    } = args;

    if let Some(path) = request {
        debug!(path = %path.display(), "reading scoring request");
        let request = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        return Ok(PreparedRequest {
            request,
            alternatives: None,
        });
    }

    match matrix {
        Some(path) => {
            debug!(path = %path.display(), "reading decision matrix");
            request_from_csv(File::open(path)?, weights, types)
        }
        None => Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "either --request or --matrix must be given",
        ))),
    }
}

pub(crate) fn request_from_csv<R: Read>(
    reader: R,
    weights: Vec<f64>,
    types: Vec<String>,
) -> Result<PreparedRequest, AppError> {
    let imported = read_matrix_csv(reader)?;
    let alternatives = imported.alternatives.clone();
    let types = (!types.is_empty()).then_some(types);
    Ok(PreparedRequest {
        request: ScoringRequest::Flat(imported.into_flat_request(weights, types)),
        alternatives,
    })
}

pub(crate) fn render_output(
    family: MethodFamily,
    scores: &ScoreResult,
    alternatives: Option<Vec<String>>,
) -> Value {
    let mut output = json!({
        "method": family,
        "scores": scores,
    });
    if let Some(alternatives) = alternatives {
        output["alternatives"] = json!(alternatives);
    }
    output
}
