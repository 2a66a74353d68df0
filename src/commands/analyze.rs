use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;
use tracing::info;

use super::evaluate_file;
use crate::batch::BatchReport;
use crate::cli::AnalyzeArgs;
use crate::config::EvaluationConfig;
use crate::model::{RecordDefect, ReportManifest};
use crate::triage::{TriageReport, analyze};
use crate::util::latest_report_path;

#[derive(Debug, Serialize)]
struct AnalyzeResponse<'a> {
    source: String,
    triage: &'a TriageReport,
    defects: &'a [RecordDefect],
}

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let config = EvaluationConfig::load(args.config.as_deref())?;

    let (source, report) = match &args.input {
        Some(input) => {
            let report = evaluate_file(input, args.delimiter, &config)?;
            (input.display().to_string(), report)
        }
        None => {
            let path = resolve_report_path(&args)?;
            (path.display().to_string(), load_report(&path)?)
        }
    };

    let triage = analyze(&report, &config.triage);
    info!(
        source = %source,
        total = report.summary.total,
        issues = triage.issues.len(),
        recommendation = ?triage.summary.recommendation,
        "analysis completed"
    );

    if args.json {
        write_json_response(&source, &triage, &report.defects)
    } else {
        write_text_response(&source, &triage, &report)
    }
}

fn resolve_report_path(args: &AnalyzeArgs) -> Result<PathBuf> {
    if let Some(path) = &args.report {
        return Ok(path.clone());
    }
    match latest_report_path(&args.results_dir)? {
        Some(path) => Ok(path),
        None => bail!(
            "no results_<N>.json report found in {}; run `evaluate` first or pass --report/--input",
            args.results_dir.display()
        ),
    }
}

fn load_report(path: &Path) -> Result<BatchReport> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: ReportManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse report manifest {}", path.display()))?;
    info!(
        path = %path.display(),
        generated_at = %manifest.generated_at,
        source = %manifest.source_path,
        "loaded report manifest"
    );
    Ok(manifest.report)
}

fn write_json_response(
    source: &str,
    triage: &TriageReport,
    defects: &[RecordDefect],
) -> Result<()> {
    let response = AnalyzeResponse {
        source: source.to_string(),
        triage,
        defects,
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &response)
        .context("failed to serialize analysis json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(source: &str, triage: &TriageReport, report: &BatchReport) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    render_text(&mut output, source, triage, report)?;
    output.flush()?;
    Ok(())
}

fn render_text<W: Write>(
    output: &mut W,
    source: &str,
    triage: &TriageReport,
    report: &BatchReport,
) -> Result<()> {
    let summary = &triage.summary;

    writeln!(output, "Source: {source}")?;
    writeln!(
        output,
        "Records: evaluated={} skipped={}",
        summary.total,
        report.defects.len()
    )?;

    if let Some(notice) = &triage.notice {
        writeln!(output, "Notice: {notice}")?;
    }

    writeln!(output)?;
    writeln!(output, "Rating distribution:")?;
    for share in &triage.distribution {
        writeln!(
            output,
            "\t{:<13}{:>5}\t{:>5.1}%",
            share.rating.as_str(),
            share.count,
            share.percent
        )?;
    }

    if !triage.rating_comparison.is_empty() {
        writeln!(output)?;
        writeln!(output, "Expected vs actual:")?;
        for pair in &triage.rating_comparison {
            let expected = if pair.expected.is_empty() {
                "(none)"
            } else {
                pair.expected.as_str()
            };
            writeln!(
                output,
                "\t{:<13}-> {:<13}{:>5}",
                expected,
                pair.actual.as_str(),
                pair.count
            )?;
        }
    }

    if !triage.grade_performance.is_empty() {
        writeln!(output)?;
        writeln!(output, "Grade performance:")?;
        for grade in &triage.grade_performance {
            writeln!(
                output,
                "\t{}\tmean={:.2} min={:.2} max={:.2} count={}",
                grade.grade_level, grade.mean, grade.min, grade.max, grade.count
            )?;
        }
    }

    if !triage.criteria.is_empty() {
        writeln!(output)?;
        writeln!(output, "Criteria:")?;
        for breakdown in &triage.criteria {
            writeln!(
                output,
                "\t{}\tmean={:.2} flagged={}",
                breakdown.criterion.as_str(),
                breakdown.mean,
                breakdown.flagged
            )?;
        }
    }

    if !triage.common_notes.is_empty() {
        writeln!(output)?;
        writeln!(output, "Common notes:")?;
        for note in &triage.common_notes {
            writeln!(output, "\t{}x\t{}", note.count, note.note)?;
        }
    }

    if triage.low_performer_count > 0 {
        writeln!(output)?;
        writeln!(
            output,
            "Low performers: {} (showing {})",
            triage.low_performer_count,
            triage.low_performers.len()
        )?;
        for low in &triage.low_performers {
            writeln!(
                output,
                "\t#{}\t{:.2}\t{}\t{}",
                low.test_id, low.quality_score, low.rating, low.prompt
            )?;
        }
    }

    if triage.mismatch_count > 0 {
        writeln!(output)?;
        writeln!(
            output,
            "Mismatches: {} (showing {})",
            triage.mismatch_count,
            triage.mismatches.len()
        )?;
        for mismatch in &triage.mismatches {
            let expected = if mismatch.expected.trim().is_empty() {
                "(none)"
            } else {
                mismatch.expected.as_str()
            };
            writeln!(
                output,
                "\t#{}\texpected={} actual={}\t{}",
                mismatch.test_id, expected, mismatch.actual, mismatch.prompt
            )?;
        }
    }

    writeln!(output)?;
    writeln!(output, "Issues: {}", triage.issues.len())?;
    for (index, issue) in triage.issues.iter().enumerate() {
        writeln!(
            output,
            "{}.\t[{}] {}\t{}",
            index + 1,
            issue.priority,
            issue.category,
            issue.description
        )?;
        writeln!(output, "\taction: {}", issue.action)?;
    }

    if !report.defects.is_empty() {
        writeln!(output)?;
        writeln!(output, "Skipped rows:")?;
        for defect in &report.defects {
            writeln!(output, "\trow {}\t{}", defect.row, defect.reason)?;
        }
    }

    writeln!(output)?;
    writeln!(output, "Executive summary:")?;
    writeln!(output, "\tTotal evaluated: {}", summary.total)?;
    writeln!(output, "\tAverage quality: {:.2}", summary.average_quality)?;
    writeln!(
        output,
        "\tEvaluator accuracy: {:.1}%",
        summary.evaluator_accuracy_percent
    )?;
    writeln!(output, "\tSuccess rate: {:.1}%", summary.success_rate)?;
    writeln!(output, "\tNeeds attention: {:.1}%", summary.attention_rate)?;
    writeln!(
        output,
        "\tRecommendation: {}",
        summary.recommendation.message()
    )?;

    Ok(())
}
