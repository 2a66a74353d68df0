use tracing::debug;

use crate::config::{GradeBand, RubricConfig, TopicRule};
use crate::model::{Criterion, CriterionScore, EvaluationRecord, RubricScores};
use crate::text::{TextProfile, cap_chars};

mod accuracy;
mod age;
mod completeness;
mod grade;
mod safety;

use self::accuracy::*;
use self::age::*;
use self::completeness::*;
use self::safety::*;

pub use self::accuracy::TOPIC_FALLBACK_FLAG;
pub use self::grade::parse_grade_level;

pub const EMPTY_RESPONSE_FLAG: &str = "empty response";

/// Scores a single record against the configured heuristics.
///
/// The checks are keyword and length proxies: accuracy means "mentions the
/// concepts expected for the prompt's topic", not verified correctness.
#[derive(Debug, Clone)]
pub struct Rubric {
    config: RubricConfig,
}

impl Rubric {
    pub fn new(config: RubricConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, record: &EvaluationRecord) -> RubricScores {
        let max_chars = self.config.max_response_chars;
        let (response, truncated) = cap_chars(&record.response, max_chars);
        if truncated {
            debug!(max_chars, "response truncated before analysis");
        }
        let (prompt, _) = cap_chars(&record.prompt, max_chars);

        let response_profile = TextProfile::new(response);
        if response_profile.is_empty() {
            return empty_response_scores();
        }
        let prompt_profile = TextProfile::new(prompt);

        let safety = score_safety(&self.config.safety, &response_profile);
        let completeness = score_completeness(&self.config.completeness, &response_profile);
        let accuracy = score_accuracy(
            &self.config,
            &prompt_profile,
            &response_profile,
            completeness.score,
        );
        let age_appropriateness =
            score_age_appropriateness(&self.config, &record.grade_level, &response_profile);

        RubricScores {
            accuracy,
            age_appropriateness,
            completeness,
            safety_flagged: safety.flagged,
            safety: safety.score,
        }
    }
}

fn empty_response_scores() -> RubricScores {
    let empty =
        |criterion| CriterionScore::new(criterion, 0.0, Some(EMPTY_RESPONSE_FLAG.to_string()));
    RubricScores {
        accuracy: empty(Criterion::Accuracy),
        age_appropriateness: empty(Criterion::AgeAppropriateness),
        completeness: empty(Criterion::Completeness),
        safety: empty(Criterion::Safety),
        safety_flagged: false,
    }
}
