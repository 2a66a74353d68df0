use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::batch::{BatchReport, BatchSummary, EvaluatedRecord};
use crate::config::TriageConfig;
use crate::model::{Criterion, Rating};
use crate::rubric::parse_grade_level;
use crate::text::excerpt;
use crate::verdict::MEETS_STANDARDS_NOTE;

mod distribution;
mod issues;
mod summary;

use self::distribution::*;
use self::issues::*;
use self::summary::*;

pub use self::summary::{ExecutiveSummary, Recommendation};

pub const EMPTY_BATCH_NOTICE: &str = "no records evaluated";
const PROMPT_EXCERPT_CHARS: usize = 50;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub priority: Priority,
    pub category: String,
    /// Number of records behind the finding.
    pub count: usize,
    pub description: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingShare {
    pub rating: Rating,
    pub count: usize,
    pub percent: f64,
}

/// Records sharing one (expected tier, actual rating) combination. The
/// expected tier is empty when it was missing or unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingPair {
    pub expected: String,
    pub actual: Rating,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradePerformance {
    pub grade_level: String,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteFrequency {
    pub note: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionBreakdown {
    pub criterion: Criterion,
    pub mean: f64,
    /// Records whose score for this criterion carried a flag.
    pub flagged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LowPerformer {
    pub test_id: usize,
    pub prompt: String,
    pub quality_score: f64,
    pub rating: Rating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mismatch {
    pub test_id: usize,
    pub prompt: String,
    pub expected: String,
    pub actual: Rating,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageReport {
    pub distribution: Vec<RatingShare>,
    pub rating_comparison: Vec<RatingPair>,
    pub grade_performance: Vec<GradePerformance>,
    pub criteria: Vec<CriterionBreakdown>,
    pub common_notes: Vec<NoteFrequency>,
    pub low_performer_count: usize,
    pub low_performers: Vec<LowPerformer>,
    pub mismatch_count: usize,
    pub mismatches: Vec<Mismatch>,
    /// HIGH before MEDIUM before LOW, larger counts first within a priority.
    pub issues: Vec<Issue>,
    pub summary: ExecutiveSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

pub fn analyze(report: &BatchReport, config: &TriageConfig) -> TriageReport {
    let low = low_performers(&report.results, config.low_quality_bar);
    let mismatched = mismatches(&report.results);

    TriageReport {
        distribution: rating_distribution(&report.summary),
        rating_comparison: rating_comparison(&report.results),
        grade_performance: grade_performance(&report.results),
        criteria: criterion_breakdown(&report.results),
        common_notes: common_notes(&report.results, config.common_notes_limit),
        low_performer_count: low.len(),
        low_performers: low.into_iter().take(config.listing_limit).collect(),
        mismatch_count: mismatched.len(),
        mismatches: mismatched.into_iter().take(config.listing_limit).collect(),
        issues: prioritize_issues(report, config),
        summary: executive_summary(&report.summary, config),
        notice: (report.summary.total == 0).then(|| EMPTY_BATCH_NOTICE.to_string()),
    }
}

fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}
