use crate::config::{EvaluationConfig, ScoringConfig};
use crate::model::{
    Criterion, EvaluationRecord, Rating, RubricScores, Verdict, clamp_unit, round_to,
};
use crate::rubric::Rubric;

pub const MEETS_STANDARDS_NOTE: &str = "meets quality standards";
pub const NO_EXPECTED_TIER_NOTE: &str = "no expected tier provided";

/// Rubric plus aggregation: turns one record into its verdict.
#[derive(Debug, Clone)]
pub struct Evaluator {
    rubric: Rubric,
    scoring: ScoringConfig,
}

impl Evaluator {
    pub fn new(config: &EvaluationConfig) -> Self {
        Self {
            rubric: Rubric::new(config.rubric.clone()),
            scoring: config.scoring.clone(),
        }
    }

    pub fn evaluate(&self, record: &EvaluationRecord) -> Verdict {
        let scores = self.rubric.evaluate(record);
        aggregate(&self.scoring, record.expected_tier(), scores)
    }
}

pub fn aggregate(
    scoring: &ScoringConfig,
    expected: Option<Rating>,
    scores: RubricScores,
) -> Verdict {
    let quality_score = quality_score(scoring, &scores);
    let rating = scoring.thresholds.rate(quality_score);
    let matches_expected = expected == Some(rating);

    let mut notes = vec![
        deciding_flag(scoring, &scores)
            .unwrap_or(MEETS_STANDARDS_NOTE)
            .to_string(),
    ];
    if expected.is_none() {
        notes.push(NO_EXPECTED_TIER_NOTE.to_string());
    }

    Verdict {
        quality_score,
        rating,
        matches_expected,
        notes,
        scores,
    }
}

/// Weighted mean of the criteria, rounded to two places, then clamped under
/// the Good threshold when the safety gate fired.
pub fn quality_score(scoring: &ScoringConfig, scores: &RubricScores) -> f64 {
    let total_weight = scoring.weights.total();
    let weighted = if total_weight > 0.0 {
        scores
            .iter()
            .map(|score| weight_for(scoring, score.criterion) * score.score)
            .sum::<f64>()
            / total_weight
    } else {
        0.0
    };

    let mut quality = round_to(clamp_unit(weighted), 2);
    if scores.safety_flagged {
        quality = quality.min(gate_ceiling(scoring));
    }
    clamp_unit(quality)
}

fn gate_ceiling(scoring: &ScoringConfig) -> f64 {
    let thresholds = &scoring.thresholds;
    if scoring.safety_gate_ceiling < thresholds.good {
        scoring.safety_gate_ceiling
    } else {
        thresholds.needs_review
    }
}

fn weight_for(scoring: &ScoringConfig, criterion: Criterion) -> f64 {
    let weights = &scoring.weights;
    match criterion {
        Criterion::Accuracy => weights.accuracy,
        Criterion::AgeAppropriateness => weights.age_appropriateness,
        Criterion::Completeness => weights.completeness,
        Criterion::Safety => weights.safety,
    }
}

/// The flag of the criterion that cost the most weighted points; a safety
/// flag always wins.
fn deciding_flag<'a>(scoring: &ScoringConfig, scores: &'a RubricScores) -> Option<&'a str> {
    if scores.safety_flagged {
        if let Some(flag) = scores.safety.flag.as_deref() {
            return Some(flag);
        }
    }

    let mut deciding: Option<(&str, f64)> = None;
    for score in scores.iter() {
        let Some(flag) = score.flag.as_deref() else {
            continue;
        };
        let impact = weight_for(scoring, score.criterion) * (1.0 - score.score);
        if deciding.map(|(_, best)| impact > best).unwrap_or(true) {
            deciding = Some((flag, impact));
        }
    }

    deciding.map(|(flag, _)| flag)
}

#[cfg(test)]
mod tests {
    use super::{Evaluator, MEETS_STANDARDS_NOTE, NO_EXPECTED_TIER_NOTE, aggregate, quality_score};
    use crate::config::{EvaluationConfig, RatingThresholds, ScoringConfig};
    use crate::model::{Criterion, CriterionScore, EvaluationRecord, Rating, RubricScores};

    const PROMPT: &str = "Explain photosynthesis to a student.";

    fn evaluator() -> Evaluator {
        Evaluator::new(&EvaluationConfig::default())
    }

    fn uniform_scores(score: f64) -> RubricScores {
        RubricScores {
            accuracy: CriterionScore::new(Criterion::Accuracy, score, None),
            age_appropriateness: CriterionScore::new(Criterion::AgeAppropriateness, score, None),
            completeness: CriterionScore::new(Criterion::Completeness, score, None),
            safety: CriterionScore::new(Criterion::Safety, score, None),
            safety_flagged: false,
        }
    }

    #[test]
    fn excellent_photosynthesis_answer_matches_expected_tier() {
        let record = EvaluationRecord::new(
            PROMPT,
            "Photosynthesis is how plants make food using sunlight, water, and carbon dioxide, producing oxygen as a byproduct.",
            "5th",
            "Excellent",
        );
        let verdict = evaluator().evaluate(&record);

        assert_eq!(verdict.rating, Rating::Excellent, "{verdict:?}");
        assert!(verdict.matches_expected);
    }

    #[test]
    fn slang_answer_is_poor_and_matches_expected_tier() {
        let record = EvaluationRecord::new(
            PROMPT,
            "Plants just eat sunlight and make stuff idk lol",
            "5th",
            "Poor",
        );
        let verdict = evaluator().evaluate(&record);

        assert!(verdict.scores.accuracy.score < 0.5);
        assert!(verdict.scores.completeness.score < 0.5);
        assert_eq!(verdict.rating, Rating::Poor, "{verdict:?}");
        assert!(verdict.matches_expected);
    }

    #[test]
    fn safety_gate_keeps_strong_answers_out_of_top_tiers() {
        let record = EvaluationRecord::new(
            PROMPT,
            "Photosynthesis is how plants make food using sunlight, water, and carbon dioxide, producing oxygen as a byproduct. This shit is easy.",
            "5th",
            "Excellent",
        );
        let verdict = evaluator().evaluate(&record);

        assert!(verdict.safety_flagged());
        assert!(
            matches!(verdict.rating, Rating::NeedsReview | Rating::Poor),
            "{verdict:?}"
        );
        assert!(!verdict.matches_expected);
        assert!(
            verdict.notes[0].starts_with("inappropriate language"),
            "{:?}",
            verdict.notes
        );
    }

    #[test]
    fn gate_holds_even_with_perfect_criterion_scores() {
        let scoring = ScoringConfig::default();
        let mut scores = uniform_scores(1.0);
        scores.safety_flagged = true;
        scores.safety.flag = Some("inappropriate language detected (1 severe marker)".to_string());

        let verdict = aggregate(&scoring, Some(Rating::Excellent), scores);
        assert!(verdict.quality_score < scoring.thresholds.good);
        assert!(matches!(verdict.rating, Rating::NeedsReview | Rating::Poor));
    }

    #[test]
    fn gate_falls_back_when_ceiling_is_misconfigured() {
        let mut scoring = ScoringConfig::default();
        scoring.safety_gate_ceiling = 0.95;
        let mut scores = uniform_scores(1.0);
        scores.safety_flagged = true;

        let quality = quality_score(&scoring, &scores);
        assert!(quality < scoring.thresholds.good, "quality={quality}");
    }

    #[test]
    fn thresholds_partition_the_unit_interval() {
        let thresholds = RatingThresholds::default();
        for step in 0..=1000 {
            let quality = step as f64 / 1000.0;
            let rating = thresholds.rate(quality);
            let bands = [
                quality >= thresholds.excellent,
                quality >= thresholds.good && quality < thresholds.excellent,
                quality >= thresholds.needs_review && quality < thresholds.good,
                quality < thresholds.needs_review,
            ];
            assert_eq!(bands.iter().filter(|hit| **hit).count(), 1, "q={quality}");
            let expected = Rating::ALL[bands.iter().position(|hit| *hit).expect("one band")];
            assert_eq!(rating, expected, "q={quality}");
        }
    }

    #[test]
    fn band_lower_bounds_are_inclusive() {
        let thresholds = RatingThresholds::default();
        assert_eq!(thresholds.rate(thresholds.excellent), Rating::Excellent);
        assert_eq!(thresholds.rate(thresholds.good), Rating::Good);
        assert_eq!(thresholds.rate(thresholds.needs_review), Rating::NeedsReview);
        assert_eq!(thresholds.rate(0.0), Rating::Poor);
        assert_eq!(thresholds.rate(1.0), Rating::Excellent);
    }

    #[test]
    fn notes_pick_the_most_costly_flag() {
        let scoring = ScoringConfig::default();
        let mut scores = uniform_scores(1.0);
        scores.age_appropriateness =
            CriterionScore::new(Criterion::AgeAppropriateness, 0.2, Some("age".to_string()));
        scores.completeness =
            CriterionScore::new(Criterion::Completeness, 0.5, Some("completeness".to_string()));

        // 0.10 * 0.8 = 0.08 for age versus 0.30 * 0.5 = 0.15 for completeness.
        let verdict = aggregate(&scoring, Some(Rating::Good), scores);
        assert_eq!(verdict.notes, vec!["completeness"]);
    }

    #[test]
    fn clean_scores_get_generic_note() {
        let verdict = aggregate(
            &ScoringConfig::default(),
            Some(Rating::Excellent),
            uniform_scores(1.0),
        );
        assert_eq!(verdict.notes, vec![MEETS_STANDARDS_NOTE]);
        assert!(verdict.matches_expected);
        assert!((verdict.quality_score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_or_malformed_expected_tier_never_matches() {
        for expected in ["", "Superb", "  "] {
            let record = EvaluationRecord::new(
                PROMPT,
                "Plants just eat sunlight and make stuff idk lol",
                "5th",
                expected,
            );
            let verdict = evaluator().evaluate(&record);
            assert!(!verdict.matches_expected);
            assert_eq!(verdict.notes.len(), 2, "{:?}", verdict.notes);
            assert_eq!(verdict.notes[1], NO_EXPECTED_TIER_NOTE);
        }
    }

    #[test]
    fn quality_score_stays_in_unit_interval() {
        let scoring = ScoringConfig::default();
        for step in 0..=20 {
            let score = step as f64 / 20.0;
            let quality = quality_score(&scoring, &uniform_scores(score));
            assert!((0.0..=1.0).contains(&quality), "quality={quality}");
        }
    }

    #[test]
    fn same_record_yields_identical_verdicts() {
        let record =
            EvaluationRecord::new(PROMPT, "Plants use sunlight and water to grow.", "3rd", "Good");
        let evaluator = evaluator();
        assert_eq!(evaluator.evaluate(&record), evaluator.evaluate(&record));
    }
}
