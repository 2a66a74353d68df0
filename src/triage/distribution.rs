use super::*;

pub fn rating_distribution(summary: &BatchSummary) -> Vec<RatingShare> {
    Rating::ALL
        .iter()
        .map(|rating| {
            let count = summary.rating_counts.get(*rating);
            RatingShare {
                rating: *rating,
                count,
                percent: percent_of(count, summary.rating_counts.total()),
            }
        })
        .collect()
}

/// Expected-versus-actual counts, both sides in tier order with unknown
/// expectations last. Empty combinations are omitted.
pub fn rating_comparison(results: &[EvaluatedRecord]) -> Vec<RatingPair> {
    let mut counts = BTreeMap::<(usize, Rating), usize>::new();
    for result in results {
        let expected_slot = result
            .record
            .expected_tier()
            .map(|tier| tier as usize)
            .unwrap_or(Rating::ALL.len());
        *counts
            .entry((expected_slot, result.verdict.rating))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((expected_slot, actual), count)| RatingPair {
            expected: Rating::ALL
                .get(expected_slot)
                .map(|tier| tier.as_str().to_string())
                .unwrap_or_default(),
            actual,
            count,
        })
        .collect()
}

/// Mean/min/max quality per grade label, ordered by grade number with
/// unparseable labels last.
pub fn grade_performance(results: &[EvaluatedRecord]) -> Vec<GradePerformance> {
    let mut by_grade = BTreeMap::<String, Vec<f64>>::new();
    for result in results {
        by_grade
            .entry(result.record.grade_level.trim().to_string())
            .or_default()
            .push(result.verdict.quality_score);
    }

    let mut performance = by_grade
        .into_iter()
        .map(|(grade_level, scores)| {
            let count = scores.len();
            let sum = scores.iter().sum::<f64>();
            let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
            let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            GradePerformance {
                grade_level,
                mean: sum / count as f64,
                min,
                max,
                count,
            }
        })
        .collect::<Vec<GradePerformance>>();

    performance.sort_by(|left, right| {
        grade_sort_key(&left.grade_level)
            .cmp(&grade_sort_key(&right.grade_level))
            .then_with(|| left.grade_level.cmp(&right.grade_level))
    });
    performance
}

pub fn criterion_breakdown(results: &[EvaluatedRecord]) -> Vec<CriterionBreakdown> {
    if results.is_empty() {
        return Vec::new();
    }

    Criterion::ALL
        .iter()
        .map(|criterion| {
            let scores = results
                .iter()
                .map(|result| result.verdict.scores.get(*criterion))
                .collect::<Vec<_>>();
            let sum = scores.iter().map(|score| score.score).sum::<f64>();
            CriterionBreakdown {
                criterion: *criterion,
                mean: sum / scores.len() as f64,
                flagged: scores.iter().filter(|score| score.flag.is_some()).count(),
            }
        })
        .collect()
}

fn grade_sort_key(label: &str) -> u16 {
    parse_grade_level(label).map(u16::from).unwrap_or(u16::MAX)
}

/// Note frequencies across verdicts, most frequent first.
pub fn common_notes(results: &[EvaluatedRecord], limit: usize) -> Vec<NoteFrequency> {
    let mut counts = HashMap::<&str, usize>::new();
    for result in results {
        for note in &result.verdict.notes {
            let note = note.trim();
            if note.is_empty() || note == MEETS_STANDARDS_NOTE {
                continue;
            }
            *counts.entry(note).or_default() += 1;
        }
    }

    let mut frequencies = counts
        .into_iter()
        .map(|(note, count)| NoteFrequency {
            note: note.to_string(),
            count,
        })
        .collect::<Vec<NoteFrequency>>();
    frequencies.sort_by(|left, right| {
        right
            .count
            .cmp(&left.count)
            .then_with(|| left.note.cmp(&right.note))
    });
    frequencies.truncate(limit);
    frequencies
}

pub fn low_performers(results: &[EvaluatedRecord], bar: f64) -> Vec<LowPerformer> {
    results
        .iter()
        .filter(|result| result.verdict.quality_score < bar)
        .map(|result| LowPerformer {
            test_id: result.test_id,
            prompt: excerpt(&result.record.prompt, PROMPT_EXCERPT_CHARS),
            quality_score: result.verdict.quality_score,
            rating: result.verdict.rating,
        })
        .collect()
}

pub fn mismatches(results: &[EvaluatedRecord]) -> Vec<Mismatch> {
    results
        .iter()
        .filter(|result| !result.verdict.matches_expected)
        .map(|result| Mismatch {
            test_id: result.test_id,
            prompt: excerpt(&result.record.prompt, PROMPT_EXCERPT_CHARS),
            expected: result.record.expected_quality.trim().to_string(),
            actual: result.verdict.rating,
        })
        .collect()
}
