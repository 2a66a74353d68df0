use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{EvaluationRecord, InputRow, Rating, RecordDefect, Verdict, round_to};
use crate::verdict::Evaluator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluatedRecord {
    /// 1-based position in the input.
    pub test_id: usize,
    pub record: EvaluationRecord,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<EvaluatedRecord>,
    pub summary: BatchSummary,
    #[serde(default)]
    pub defects: Vec<RecordDefect>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub rating_counts: RatingCounts,
    pub safety_flagged: usize,
    pub matches: usize,
    pub accuracy: EvaluatorAccuracy,
    pub average_quality: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingCounts {
    pub excellent: usize,
    pub good: usize,
    pub needs_review: usize,
    pub poor: usize,
}

impl RatingCounts {
    pub fn get(&self, rating: Rating) -> usize {
        match rating {
            Rating::Excellent => self.excellent,
            Rating::Good => self.good,
            Rating::NeedsReview => self.needs_review,
            Rating::Poor => self.poor,
        }
    }

    pub fn total(&self) -> usize {
        self.excellent + self.good + self.needs_review + self.poor
    }

    fn increment(&mut self, rating: Rating) {
        let slot = match rating {
            Rating::Excellent => &mut self.excellent,
            Rating::Good => &mut self.good,
            Rating::NeedsReview => &mut self.needs_review,
            Rating::Poor => &mut self.poor,
        };
        *slot += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyStatus {
    /// Nothing was evaluated; `percent` is 0 by definition.
    NoRecords,
    Measured,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluatorAccuracy {
    pub status: AccuracyStatus,
    pub percent: f64,
}

impl EvaluatorAccuracy {
    pub fn is_measured(&self) -> bool {
        self.status == AccuracyStatus::Measured
    }
}

/// Running totals folded over verdicts in input order.
#[derive(Debug, Clone, Default)]
pub struct SummaryTally {
    total: usize,
    rating_counts: RatingCounts,
    safety_flagged: usize,
    matches: usize,
    quality_sum: f64,
}

impl SummaryTally {
    pub fn record(mut self, verdict: &Verdict) -> Self {
        self.total += 1;
        self.rating_counts.increment(verdict.rating);
        if verdict.safety_flagged() {
            self.safety_flagged += 1;
        }
        if verdict.matches_expected {
            self.matches += 1;
        }
        self.quality_sum += verdict.quality_score;
        self
    }

    pub fn finish(self) -> BatchSummary {
        let (accuracy, average_quality) = if self.total == 0 {
            (
                EvaluatorAccuracy {
                    status: AccuracyStatus::NoRecords,
                    percent: 0.0,
                },
                0.0,
            )
        } else {
            (
                EvaluatorAccuracy {
                    status: AccuracyStatus::Measured,
                    percent: self.matches as f64 / self.total as f64 * 100.0,
                },
                round_to(self.quality_sum / self.total as f64, 4),
            )
        };

        BatchSummary {
            total: self.total,
            rating_counts: self.rating_counts,
            safety_flagged: self.safety_flagged,
            matches: self.matches,
            accuracy,
            average_quality,
        }
    }
}

/// Scores records in input order; test ids are 1-based positions.
pub fn evaluate_batch(evaluator: &Evaluator, records: &[EvaluationRecord]) -> BatchReport {
    let results = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let verdict = evaluator.evaluate(record);
            debug!(
                test_id = index + 1,
                rating = %verdict.rating,
                quality = verdict.quality_score,
                "record evaluated"
            );
            EvaluatedRecord {
                test_id: index + 1,
                record: record.clone(),
                verdict,
            }
        })
        .collect::<Vec<EvaluatedRecord>>();

    let summary = results
        .iter()
        .fold(SummaryTally::default(), |tally, result| {
            tally.record(&result.verdict)
        })
        .finish();

    BatchReport {
        results,
        summary,
        defects: Vec::new(),
    }
}

/// Like [`evaluate_batch`], but starting from raw rows: rows missing a
/// required field are skipped and recorded as defects. Test ids keep the
/// row's position so skipped rows leave a gap.
pub fn evaluate_rows(evaluator: &Evaluator, rows: &[InputRow]) -> BatchReport {
    let mut positions = Vec::with_capacity(rows.len());
    let mut records = Vec::with_capacity(rows.len());
    let mut defects = Vec::new();

    for (index, row) in rows.iter().enumerate() {
        match EvaluationRecord::from_row(row) {
            Ok(record) => {
                positions.push(index + 1);
                records.push(record);
            }
            Err(defect) => {
                warn!(row = defect.row, reason = %defect.reason, "skipping malformed record");
                defects.push(defect);
            }
        }
    }

    let mut report = evaluate_batch(evaluator, &records);
    for (result, position) in report.results.iter_mut().zip(positions) {
        result.test_id = position;
    }
    report.defects = defects;
    report
}
