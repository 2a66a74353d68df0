use super::*;

use crate::config::CompletenessConfig;

pub(super) fn score_completeness(
    config: &CompletenessConfig,
    response: &TextProfile,
) -> CriterionScore {
    let words = response.word_count();

    if words < config.min_words {
        let score = config.under_min_cap * words as f64 / config.min_words as f64;
        return CriterionScore::new(
            Criterion::Completeness,
            score,
            Some(format!(
                "too brief: {words} words (minimum {})",
                config.min_words
            )),
        );
    }

    if words < config.target_words {
        let span = (config.target_words - config.min_words) as f64;
        let score = 0.5 + 0.5 * (words - config.min_words) as f64 / span;
        return CriterionScore::new(
            Criterion::Completeness,
            score,
            Some(format!(
                "limited detail: {words} words (target {})",
                config.target_words
            )),
        );
    }

    CriterionScore::full(Criterion::Completeness)
}
