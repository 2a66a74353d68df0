use std::fs::File;
use std::io::BufWriter;

use anyhow::{Context, Result};
use tracing::info;

use super::evaluate_file;
use crate::cli::EvaluateArgs;
use crate::config::EvaluationConfig;
use crate::model::ReportManifest;
use crate::tabular::write_results;
use crate::util::{
    ensure_directory, next_results_path, now_utc_string, sha256_file, write_json_pretty,
};

const REPORT_MANIFEST_VERSION: u32 = 1;

pub fn run(args: EvaluateArgs) -> Result<()> {
    let config = EvaluationConfig::load(args.config.as_deref())?;
    let report = evaluate_file(&args.input, args.delimiter, &config)?;

    let summary = &report.summary;
    info!(
        total = summary.total,
        skipped = report.defects.len(),
        excellent = summary.rating_counts.excellent,
        good = summary.rating_counts.good,
        needs_review = summary.rating_counts.needs_review,
        poor = summary.rating_counts.poor,
        safety_flagged = summary.safety_flagged,
        average_quality = summary.average_quality,
        "evaluation completed"
    );
    if summary.accuracy.is_measured() {
        info!(
            matches = summary.matches,
            accuracy_percent = summary.accuracy.percent,
            "evaluator accuracy"
        );
    } else {
        info!("no records evaluated; evaluator accuracy not measured");
    }

    let output_path = match args.output {
        Some(path) => path,
        None => next_results_path(&args.results_dir)?,
    };
    if let Some(parent) = output_path.parent() {
        ensure_directory(parent)?;
    }

    let file = File::create(&output_path)
        .with_context(|| format!("failed to create results file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    write_results(&mut writer, &report, args.delimiter)
        .with_context(|| format!("failed to write results: {}", output_path.display()))?;
    info!(path = %output_path.display(), "wrote results");

    let report_path = args
        .report
        .unwrap_or_else(|| output_path.with_extension("json"));
    let manifest = ReportManifest {
        manifest_version: REPORT_MANIFEST_VERSION,
        generated_at: now_utc_string(),
        source_path: args.input.display().to_string(),
        source_sha256: sha256_file(&args.input)?,
        config_path: args.config.map(|path| path.display().to_string()),
        report,
    };
    write_json_pretty(&report_path, &manifest)?;
    info!(path = %report_path.display(), "wrote report manifest");

    Ok(())
}
