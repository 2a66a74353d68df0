use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::model::Rating;

mod defaults;
#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub rubric: RubricConfig,
    pub scoring: ScoringConfig,
    pub triage: TriageConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubricConfig {
    /// Responses longer than this many characters are cut before analysis.
    pub max_response_chars: usize,
    pub topics: Vec<TopicRule>,
    pub accuracy: AccuracyConfig,
    pub completeness: CompletenessConfig,
    pub grade_bands: Vec<GradeBand>,
    /// Grade used to pick a band when the label cannot be parsed.
    pub fallback_grade: u8,
    pub jargon_terms: Vec<String>,
    pub age: AgePenaltyConfig,
    pub safety: SafetyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRule {
    pub topic: String,
    /// Matched against the prompt.
    pub keywords: Vec<String>,
    /// Matched against the response.
    pub concepts: Vec<Concept>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Concept {
    pub label: String,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyConfig {
    /// Coverage fraction at which accuracy reaches 1.0.
    pub full_coverage_ratio: f64,
    pub no_concept_score: f64,
    /// Upper bound of the completeness-weighted estimate used without a topic.
    pub fallback_ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletenessConfig {
    pub min_words: usize,
    pub target_words: usize,
    pub under_min_cap: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeBand {
    pub label: String,
    pub min_grade: u8,
    pub max_grade: u8,
    pub min_words: usize,
    pub max_words: usize,
    pub min_avg_word_len: f64,
    pub max_avg_word_len: f64,
    pub max_avg_sentence_words: f64,
    pub jargon_penalty: f64,
}

impl GradeBand {
    pub fn contains(&self, grade: u8) -> bool {
        (self.min_grade..=self.max_grade).contains(&grade)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgePenaltyConfig {
    /// Penalty per unit of relative excess over a band maximum.
    pub complexity_rate: f64,
    /// Penalty per unit of relative shortfall under a band minimum.
    pub simplicity_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub severe_markers: Vec<String>,
    pub flagged_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: CriterionWeights,
    pub thresholds: RatingThresholds,
    /// Highest quality score a safety-flagged response can receive.
    pub safety_gate_ceiling: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriterionWeights {
    pub accuracy: f64,
    pub age_appropriateness: f64,
    pub completeness: f64,
    pub safety: f64,
}

impl CriterionWeights {
    pub fn total(&self) -> f64 {
        self.accuracy + self.age_appropriateness + self.completeness + self.safety
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingThresholds {
    pub excellent: f64,
    pub good: f64,
    pub needs_review: f64,
}

impl RatingThresholds {
    /// Lower bounds are inclusive; anything below `needs_review` is Poor.
    pub fn rate(&self, quality: f64) -> Rating {
        if quality >= self.excellent {
            Rating::Excellent
        } else if quality >= self.good {
            Rating::Good
        } else if quality >= self.needs_review {
            Rating::NeedsReview
        } else {
            Rating::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Percent.
    pub evaluator_accuracy_min: f64,
    pub low_quality_bar: f64,
    pub common_notes_limit: usize,
    pub listing_limit: usize,
    pub healthy_quality: f64,
    pub healthy_accuracy: f64,
    pub fair_quality: f64,
    pub fair_accuracy: f64,
}

impl EvaluationConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = fs::read(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                serde_json::from_slice::<Self>(&raw)
                    .with_context(|| format!("failed to parse {}", path.display()))?
            }
            None => Self::default(),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let thresholds = &self.scoring.thresholds;
        let ordered = 0.0 < thresholds.needs_review
            && thresholds.needs_review < thresholds.good
            && thresholds.good < thresholds.excellent
            && thresholds.excellent <= 1.0;
        if !ordered {
            bail!(
                "rating thresholds must satisfy 0 < needs_review < good < excellent <= 1 (got {} / {} / {})",
                thresholds.needs_review,
                thresholds.good,
                thresholds.excellent
            );
        }

        let ceiling = self.scoring.safety_gate_ceiling;
        if !(0.0..thresholds.good).contains(&ceiling) {
            bail!(
                "safety_gate_ceiling {ceiling} must be in [0, good threshold {})",
                thresholds.good
            );
        }

        let weights = &self.scoring.weights;
        let all_weights = [
            weights.accuracy,
            weights.age_appropriateness,
            weights.completeness,
            weights.safety,
        ];
        if all_weights.iter().any(|weight| !weight.is_finite() || *weight < 0.0) {
            bail!("criterion weights must be finite and non-negative");
        }
        if weights.total() <= 0.0 {
            bail!("criterion weights must not all be zero");
        }

        let completeness = &self.rubric.completeness;
        if completeness.min_words == 0 || completeness.min_words >= completeness.target_words {
            bail!(
                "completeness requires 0 < min_words < target_words (got {} / {})",
                completeness.min_words,
                completeness.target_words
            );
        }

        if self.rubric.accuracy.full_coverage_ratio <= 0.0
            || self.rubric.accuracy.full_coverage_ratio > 1.0
        {
            bail!(
                "accuracy full_coverage_ratio must be in (0, 1] (got {})",
                self.rubric.accuracy.full_coverage_ratio
            );
        }

        if self.rubric.max_response_chars == 0 {
            bail!("max_response_chars must be positive");
        }

        if self.rubric.grade_bands.is_empty() {
            bail!("at least one grade band is required");
        }
        for band in &self.rubric.grade_bands {
            if band.min_grade > band.max_grade
                || band.min_words > band.max_words
                || band.min_avg_word_len > band.max_avg_word_len
                || band.max_avg_word_len <= 0.0
                || band.max_avg_sentence_words <= 0.0
                || band.max_words == 0
            {
                bail!("grade band '{}' has an empty or inverted range", band.label);
            }
        }

        for topic in &self.rubric.topics {
            if topic.keywords.is_empty() || topic.concepts.is_empty() {
                bail!("topic '{}' needs at least one keyword and one concept", topic.topic);
            }
        }

        Ok(())
    }
}
