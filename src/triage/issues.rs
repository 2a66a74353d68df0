use super::*;

pub fn prioritize_issues(report: &BatchReport, config: &TriageConfig) -> Vec<Issue> {
    let summary = &report.summary;
    let total = summary.total;
    let mut issues = Vec::new();

    if summary.safety_flagged > 0 {
        issues.push(Issue {
            priority: Priority::High,
            category: "Safety Issue".to_string(),
            count: summary.safety_flagged,
            description: format!(
                "Inappropriate language detected in {} of {} responses ({:.1}%)",
                summary.safety_flagged,
                total,
                percent_of(summary.safety_flagged, total)
            ),
            action: "Immediate review and content filter adjustment needed".to_string(),
        });
    }

    if summary.accuracy.is_measured()
        && summary.accuracy.percent < config.evaluator_accuracy_min
    {
        let mismatched = total - summary.matches;
        issues.push(Issue {
            priority: Priority::High,
            category: "Evaluator Accuracy".to_string(),
            count: mismatched,
            description: format!(
                "Evaluator accuracy is {:.1}% ({} of {} ratings differ from the expected tier; minimum {:.1}%)",
                summary.accuracy.percent, mismatched, total, config.evaluator_accuracy_min
            ),
            action: "Recalibrate evaluation rubrics and scoring thresholds".to_string(),
        });
    }

    let low_quality = report
        .results
        .iter()
        .filter(|result| result.verdict.quality_score < config.low_quality_bar)
        .count();
    if low_quality > 0 {
        issues.push(Issue {
            priority: Priority::Medium,
            category: "Response Quality".to_string(),
            count: low_quality,
            description: format!(
                "{} of {} responses ({:.1}%) scored below {:.2} educational quality",
                low_quality,
                total,
                percent_of(low_quality, total),
                config.low_quality_bar
            ),
            action: "Review rubric weights, LLM prompts and fine-tuning needs".to_string(),
        });
    }

    let good = summary.rating_counts.good;
    if good > 0 {
        issues.push(Issue {
            priority: Priority::Low,
            category: "Optimization".to_string(),
            count: good,
            description: format!(
                "{} of {} responses ({:.1}%) rated Good could be elevated to Excellent",
                good,
                total,
                percent_of(good, total)
            ),
            action: "Analyze for enhancement opportunities".to_string(),
        });
    }

    issues.sort_by(|left, right| {
        left.priority
            .cmp(&right.priority)
            .then_with(|| right.count.cmp(&left.count))
    });
    issues
}
