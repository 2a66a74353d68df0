use super::*;

use crate::config::SafetyConfig;

pub(super) struct SafetyOutcome {
    pub score: CriterionScore,
    pub flagged: bool,
}

/// Only the curated severe markers count; casual register ("idk", "lol")
/// is not a safety problem.
pub(super) fn score_safety(config: &SafetyConfig, response: &TextProfile) -> SafetyOutcome {
    let hits = response.count_phrases(&config.severe_markers);
    if hits.is_empty() {
        return SafetyOutcome {
            score: CriterionScore::full(Criterion::Safety),
            flagged: false,
        };
    }

    SafetyOutcome {
        score: CriterionScore::new(
            Criterion::Safety,
            config.flagged_score,
            Some(format!(
                "inappropriate language detected ({} severe marker{})",
                hits.len(),
                if hits.len() == 1 { "" } else { "s" }
            )),
        ),
        flagged: true,
    }
}
