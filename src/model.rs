use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::batch::BatchReport;

pub const NOTE_SEPARATOR: &str = "; ";

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rating {
    Excellent,
    Good,
    #[serde(rename = "Needs Review")]
    NeedsReview,
    Poor,
}

impl Rating {
    pub const ALL: [Rating; 4] = [
        Rating::Excellent,
        Rating::Good,
        Rating::NeedsReview,
        Rating::Poor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsReview => "Needs Review",
            Self::Poor => "Poor",
        }
    }

    /// Lenient tier parsing: case, surrounding whitespace and `_`/`-`
    /// separators are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ")
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ");

        match normalized.as_str() {
            "excellent" => Some(Self::Excellent),
            "good" => Some(Self::Good),
            "needs review" | "needsreview" => Some(Self::NeedsReview),
            "poor" => Some(Self::Poor),
            _ => None,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub prompt: String,
    pub response: String,
    pub grade_level: String,
    /// Raw tier label as provided; see [`EvaluationRecord::expected_tier`].
    pub expected_quality: String,
}

impl EvaluationRecord {
    pub fn new(
        prompt: impl Into<String>,
        response: impl Into<String>,
        grade_level: impl Into<String>,
        expected_quality: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            response: response.into(),
            grade_level: grade_level.into(),
            expected_quality: expected_quality.into(),
        }
    }

    pub fn expected_tier(&self) -> Option<Rating> {
        Rating::parse(&self.expected_quality)
    }

    pub fn from_row(row: &InputRow) -> Result<Self, RecordDefect> {
        let prompt = row.required("prompt")?;
        let response = row.required("response")?;
        let grade_level = row.required("grade_level")?;
        let expected_quality = row.get("expected_quality").unwrap_or_default();

        Ok(Self::new(prompt, response, grade_level, expected_quality))
    }
}

/// One data row keyed by normalized header name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRow {
    pub row: usize,
    pub fields: HashMap<String, String>,
}

impl InputRow {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    fn required(&self, field: &str) -> Result<&str, RecordDefect> {
        self.get(field).ok_or_else(|| RecordDefect {
            row: self.row,
            reason: format!("missing required field '{field}'"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDefect {
    pub row: usize,
    pub reason: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Accuracy,
    AgeAppropriateness,
    Completeness,
    Safety,
}

impl Criterion {
    pub const ALL: [Criterion; 4] = [
        Criterion::Accuracy,
        Criterion::Completeness,
        Criterion::Safety,
        Criterion::AgeAppropriateness,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accuracy => "accuracy",
            Self::AgeAppropriateness => "age_appropriateness",
            Self::Completeness => "completeness",
            Self::Safety => "safety",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: Criterion,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

impl CriterionScore {
    pub fn new(criterion: Criterion, score: f64, flag: Option<String>) -> Self {
        Self {
            criterion,
            score: clamp_unit(score),
            flag,
        }
    }

    pub fn full(criterion: Criterion) -> Self {
        Self::new(criterion, 1.0, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricScores {
    pub accuracy: CriterionScore,
    pub age_appropriateness: CriterionScore,
    pub completeness: CriterionScore,
    pub safety: CriterionScore,
    /// Set when a severe marker was found; gates the rating.
    pub safety_flagged: bool,
}

impl RubricScores {
    pub fn iter(&self) -> impl Iterator<Item = &CriterionScore> {
        [
            &self.accuracy,
            &self.age_appropriateness,
            &self.completeness,
            &self.safety,
        ]
        .into_iter()
    }

    pub fn get(&self, criterion: Criterion) -> &CriterionScore {
        match criterion {
            Criterion::Accuracy => &self.accuracy,
            Criterion::AgeAppropriateness => &self.age_appropriateness,
            Criterion::Completeness => &self.completeness,
            Criterion::Safety => &self.safety,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub quality_score: f64,
    pub rating: Rating,
    pub matches_expected: bool,
    /// The deciding flag first, then any informational notes.
    pub notes: Vec<String>,
    pub scores: RubricScores,
}

impl Verdict {
    pub fn safety_flagged(&self) -> bool {
        self.scores.safety_flagged
    }

    /// Notes as written to the results file.
    pub fn notes_line(&self) -> String {
        self.notes.join(NOTE_SEPARATOR)
    }
}

/// On-disk envelope around a batch report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_path: String,
    pub source_sha256: String,
    #[serde(default)]
    pub config_path: Option<String>,
    pub report: BatchReport,
}

pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{EvaluationRecord, InputRow, Rating, clamp_unit, round_to};

    #[test]
    fn rating_parse_is_lenient() {
        assert_eq!(Rating::parse("Excellent"), Some(Rating::Excellent));
        assert_eq!(Rating::parse("  good "), Some(Rating::Good));
        assert_eq!(Rating::parse("Needs_Review"), Some(Rating::NeedsReview));
        assert_eq!(Rating::parse("needs-review"), Some(Rating::NeedsReview));
        assert_eq!(Rating::parse("NEEDSREVIEW"), Some(Rating::NeedsReview));
        assert_eq!(Rating::parse("poor"), Some(Rating::Poor));
        assert_eq!(Rating::parse(""), None);
        assert_eq!(Rating::parse("great"), None);
    }

    #[test]
    fn rating_serializes_with_display_label() {
        let raw = serde_json::to_string(&Rating::NeedsReview).expect("rating should serialize");
        assert_eq!(raw, "\"Needs Review\"");
        assert_eq!(Rating::NeedsReview.to_string(), "Needs Review");
    }

    #[test]
    fn record_from_row_treats_expected_quality_as_optional() {
        let row = InputRow {
            row: 4,
            fields: [("prompt", "q"), ("response", "a"), ("grade_level", "3rd")]
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect::<HashMap<String, String>>(),
        };
        let record = EvaluationRecord::from_row(&row).expect("row should convert");
        assert_eq!(record.expected_quality, "");
        assert_eq!(record.expected_tier(), None);

        let mut incomplete = row.clone();
        incomplete.fields.remove("grade_level");
        let defect = EvaluationRecord::from_row(&incomplete).expect_err("grade is required");
        assert_eq!(defect.row, 4);
        assert!(defect.reason.contains("grade_level"));
    }

    #[test]
    fn clamp_and_round_helpers() {
        assert_eq!(clamp_unit(f64::NAN), 0.0);
        assert_eq!(clamp_unit(1.7), 1.0);
        assert_eq!(clamp_unit(-0.2), 0.0);
        assert!((round_to(0.8125, 2) - 0.81).abs() < 1e-9);
    }
}
