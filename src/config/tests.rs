use std::fs;

use super::*;

fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rubric.json");
    fs::write(&path, contents).expect("config fixture");
    (dir, path)
}

#[test]
fn default_config_is_valid() {
    let config = EvaluationConfig::default();
    config.validate().expect("defaults should validate");

    let weights = &config.scoring.weights;
    assert!((weights.total() - 1.0).abs() < 1e-9);
    assert!(config.scoring.safety_gate_ceiling < config.scoring.thresholds.good);
    assert!(!config.rubric.topics.is_empty());
    assert!(!config.rubric.safety.severe_markers.is_empty());
}

#[test]
fn load_without_path_returns_defaults() {
    let config = EvaluationConfig::load(None).expect("defaults should load");
    assert_eq!(config, EvaluationConfig::default());
}

#[test]
fn partial_override_keeps_remaining_defaults() {
    let (_dir, path) = write_config(
        r#"{
            "scoring": { "thresholds": { "excellent": 0.9 } },
            "triage": { "listing_limit": 10 }
        }"#,
    );
    let config = EvaluationConfig::load(Some(&path)).expect("override should load");
    let defaults = EvaluationConfig::default();

    assert!((config.scoring.thresholds.excellent - 0.9).abs() < 1e-9);
    assert_eq!(config.scoring.thresholds.good, defaults.scoring.thresholds.good);
    assert_eq!(config.scoring.weights, defaults.scoring.weights);
    assert_eq!(config.triage.listing_limit, 10);
    assert_eq!(
        config.triage.common_notes_limit,
        defaults.triage.common_notes_limit
    );
    assert_eq!(config.rubric, defaults.rubric);
}

#[test]
fn malformed_json_reports_the_path() {
    let (_dir, path) = write_config("{ not json");
    let error = EvaluationConfig::load(Some(&path)).expect_err("bad json should fail");
    assert!(error.to_string().contains("rubric.json"), "{error}");
}

#[test]
fn unordered_thresholds_are_rejected() {
    let mut config = EvaluationConfig::default();
    config.scoring.thresholds.good = 0.85;
    let error = config.validate().expect_err("good above excellent");
    assert!(error.to_string().contains("thresholds"), "{error}");

    let mut config = EvaluationConfig::default();
    config.scoring.thresholds.needs_review = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn gate_ceiling_must_stay_below_good() {
    let mut config = EvaluationConfig::default();
    config.scoring.safety_gate_ceiling = config.scoring.thresholds.good;
    let error = config.validate().expect_err("ceiling at good threshold");
    assert!(error.to_string().contains("safety_gate_ceiling"), "{error}");
}

#[test]
fn weights_must_be_usable() {
    let mut config = EvaluationConfig::default();
    config.scoring.weights = CriterionWeights {
        accuracy: 0.0,
        age_appropriateness: 0.0,
        completeness: 0.0,
        safety: 0.0,
    };
    assert!(config.validate().is_err());

    let mut config = EvaluationConfig::default();
    config.scoring.weights.safety = -0.1;
    assert!(config.validate().is_err());

    let mut config = EvaluationConfig::default();
    config.scoring.weights.accuracy = f64::NAN;
    assert!(config.validate().is_err());
}

#[test]
fn completeness_bounds_must_be_ordered() {
    let mut config = EvaluationConfig::default();
    config.rubric.completeness.min_words = config.rubric.completeness.target_words;
    let error = config.validate().expect_err("min equal to target");
    assert!(error.to_string().contains("min_words"), "{error}");
}

#[test]
fn grade_bands_are_checked() {
    let mut config = EvaluationConfig::default();
    config.rubric.grade_bands.clear();
    assert!(config.validate().is_err());

    let mut config = EvaluationConfig::default();
    let band = &mut config.rubric.grade_bands[0];
    band.min_grade = 5;
    band.max_grade = 2;
    let error = config.validate().expect_err("inverted band");
    assert!(error.to_string().contains("inverted"), "{error}");
}

#[test]
fn topics_need_keywords_and_concepts() {
    let mut config = EvaluationConfig::default();
    config.rubric.topics.push(TopicRule {
        topic: "rainbows".to_string(),
        keywords: vec!["rainbow".to_string()],
        concepts: Vec::new(),
    });
    let error = config.validate().expect_err("topic without concepts");
    assert!(error.to_string().contains("rainbows"), "{error}");
}

#[test]
fn rate_uses_inclusive_lower_bounds() {
    let thresholds = RatingThresholds::default();
    assert_eq!(thresholds.rate(0.80), Rating::Excellent);
    assert_eq!(thresholds.rate(0.79), Rating::Good);
    assert_eq!(thresholds.rate(0.65), Rating::Good);
    assert_eq!(thresholds.rate(0.64), Rating::NeedsReview);
    assert_eq!(thresholds.rate(0.50), Rating::NeedsReview);
    assert_eq!(thresholds.rate(0.49), Rating::Poor);
}

#[test]
fn grade_band_contains_its_endpoints() {
    let config = EvaluationConfig::default();
    let band = &config.rubric.grade_bands[1];
    assert!(band.contains(band.min_grade));
    assert!(band.contains(band.max_grade));
    assert!(!band.contains(band.max_grade + 1));
}
