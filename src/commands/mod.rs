pub mod analyze;
pub mod evaluate;
pub mod rubric;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::batch::{BatchReport, evaluate_rows};
use crate::config::EvaluationConfig;
use crate::tabular::parse_rows;
use crate::verdict::Evaluator;

/// Reads a delimited input file and scores every row in it.
pub(crate) fn evaluate_file(
    input: &Path,
    delimiter: char,
    config: &EvaluationConfig,
) -> Result<BatchReport> {
    let raw = fs::read_to_string(input)
        .with_context(|| format!("failed to read input {}", input.display()))?;
    let rows = parse_rows(&raw, delimiter)
        .with_context(|| format!("failed to parse input {}", input.display()))?;

    let evaluator = Evaluator::new(config);
    Ok(evaluate_rows(&evaluator, &rows))
}
