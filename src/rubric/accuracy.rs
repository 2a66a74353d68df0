use super::*;

pub const TOPIC_FALLBACK_FLAG: &str =
    "no recognized topic in prompt, accuracy estimated from completeness";

pub(super) fn score_accuracy(
    config: &RubricConfig,
    prompt: &TextProfile,
    response: &TextProfile,
    completeness: f64,
) -> CriterionScore {
    let Some(topic) = detect_topic(&config.topics, prompt) else {
        return CriterionScore::new(
            Criterion::Accuracy,
            config.accuracy.fallback_ceiling * completeness,
            Some(TOPIC_FALLBACK_FLAG.to_string()),
        );
    };

    let mut covered = Vec::<&str>::new();
    let mut missing = Vec::<&str>::new();
    for concept in &topic.concepts {
        if concept.terms.iter().any(|term| response.contains_phrase(term)) {
            covered.push(&concept.label);
        } else {
            missing.push(&concept.label);
        }
    }

    let total = topic.concepts.len();
    if covered.is_empty() {
        return CriterionScore::new(
            Criterion::Accuracy,
            config.accuracy.no_concept_score,
            Some(format!(
                "none of the expected concepts for {} mentioned",
                topic.topic
            )),
        );
    }

    let coverage = covered.len() as f64 / total as f64;
    let score = (coverage / config.accuracy.full_coverage_ratio).min(1.0);
    let flag = (score < 1.0).then(|| {
        format!(
            "covers {} of {} expected concepts for {} (missing: {})",
            covered.len(),
            total,
            topic.topic,
            missing.join(", ")
        )
    });

    CriterionScore::new(Criterion::Accuracy, score, flag)
}

/// Picks the topic whose keywords appear most often in the prompt; ties go
/// to the earlier entry.
pub(super) fn detect_topic<'a>(
    topics: &'a [TopicRule],
    prompt: &TextProfile,
) -> Option<&'a TopicRule> {
    let mut best: Option<(&TopicRule, usize)> = None;

    for topic in topics {
        let hits = prompt.count_phrases(&topic.keywords).len();
        if hits == 0 {
            continue;
        }
        if best.map(|(_, best_hits)| hits > best_hits).unwrap_or(true) {
            best = Some((topic, hits));
        }
    }

    best.map(|(topic, _)| topic)
}
