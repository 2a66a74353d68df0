use super::*;

struct Deduction {
    penalty: f64,
    reason: String,
}

/// Too-complex responses are penalized at `complexity_rate`, too-simple ones
/// at the gentler `simplicity_rate`.
pub(super) fn score_age_appropriateness(
    config: &RubricConfig,
    grade_label: &str,
    response: &TextProfile,
) -> CriterionScore {
    let parsed_grade = parse_grade_level(grade_label);
    let grade = parsed_grade.unwrap_or(config.fallback_grade);
    let Some(band) = select_band(&config.grade_bands, grade) else {
        return CriterionScore::new(
            Criterion::AgeAppropriateness,
            1.0,
            Some("no grade bands configured".to_string()),
        );
    };

    let deductions = collect_deductions(config, band, response);
    let penalty = deductions.iter().map(|deduction| deduction.penalty).sum::<f64>();

    let mut notes = Vec::<String>::new();
    if let Some(largest) = deductions
        .iter()
        .max_by(|left, right| left.penalty.total_cmp(&right.penalty))
    {
        notes.push(largest.reason.clone());
    }
    if parsed_grade.is_none() {
        notes.push(format!(
            "unrecognized grade level '{}', scored against {} band",
            grade_label.trim(),
            band.label
        ));
    }

    let flag = (!notes.is_empty()).then(|| notes.join(", "));
    CriterionScore::new(Criterion::AgeAppropriateness, 1.0 - penalty, flag)
}

fn collect_deductions(
    config: &RubricConfig,
    band: &GradeBand,
    response: &TextProfile,
) -> Vec<Deduction> {
    let complex = config.age.complexity_rate;
    let simple = config.age.simplicity_rate;
    let label = &band.label;

    let words = response.word_count();
    let avg_word_len = response.avg_word_len();
    let avg_sentence_words = response.avg_sentence_words();

    let mut deductions = Vec::new();

    if avg_word_len > band.max_avg_word_len {
        deductions.push(Deduction {
            penalty: complex * relative_excess(avg_word_len, band.max_avg_word_len),
            reason: format!(
                "vocabulary too complex for {label} (avg word length {avg_word_len:.1} > {:.1})",
                band.max_avg_word_len
            ),
        });
    }

    if avg_sentence_words > band.max_avg_sentence_words {
        deductions.push(Deduction {
            penalty: complex * relative_excess(avg_sentence_words, band.max_avg_sentence_words),
            reason: format!(
                "sentences too long for {label} (avg {avg_sentence_words:.1} words > {:.1})",
                band.max_avg_sentence_words
            ),
        });
    }

    if words > band.max_words {
        deductions.push(Deduction {
            penalty: complex * relative_excess(words as f64, band.max_words as f64),
            reason: format!(
                "response too long for {label} ({words} words > {})",
                band.max_words
            ),
        });
    }

    if band.jargon_penalty > 0.0 {
        let jargon = response.count_phrases(&config.jargon_terms);
        if !jargon.is_empty() {
            deductions.push(Deduction {
                penalty: band.jargon_penalty * jargon.len() as f64,
                reason: format!("technical jargon for {label}: {}", jargon.join(", ")),
            });
        }
    }

    if avg_word_len < band.min_avg_word_len {
        deductions.push(Deduction {
            penalty: simple * relative_shortfall(avg_word_len, band.min_avg_word_len),
            reason: format!(
                "vocabulary too simple for {label} (avg word length {avg_word_len:.1} < {:.1})",
                band.min_avg_word_len
            ),
        });
    }

    if words < band.min_words {
        deductions.push(Deduction {
            penalty: simple * relative_shortfall(words as f64, band.min_words as f64),
            reason: format!(
                "response too brief for {label} ({words} words < {})",
                band.min_words
            ),
        });
    }

    deductions
}

/// The band containing `grade`, else the nearest one.
pub(super) fn select_band(bands: &[GradeBand], grade: u8) -> Option<&GradeBand> {
    bands.iter().min_by_key(|band| {
        if band.contains(grade) {
            0
        } else if grade < band.min_grade {
            band.min_grade - grade
        } else {
            grade - band.max_grade
        }
    })
}

fn relative_excess(value: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 1.0;
    }
    ((value - limit) / limit).clamp(0.0, 1.0)
}

fn relative_shortfall(value: f64, floor: f64) -> f64 {
    if floor <= 0.0 {
        return 0.0;
    }
    ((floor - value) / floor).clamp(0.0, 1.0)
}
