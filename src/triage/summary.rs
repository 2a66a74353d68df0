use super::*;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    Healthy,
    Fair,
    NeedsAttention,
    NoData,
}

impl Recommendation {
    pub fn message(self) -> &'static str {
        match self {
            Self::Healthy => "System is performing well. Continue monitoring.",
            Self::Fair => "Good performance with room for optimization.",
            Self::NeedsAttention => {
                "System needs attention. Review low-performing cases and recalibrate evaluators."
            }
            Self::NoData => "No records were evaluated.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub total: usize,
    pub average_quality: f64,
    pub evaluator_accuracy_percent: f64,
    /// Excellent + Good, percent.
    pub success_rate: f64,
    /// Needs Review + Poor, percent.
    pub attention_rate: f64,
    pub recommendation: Recommendation,
}

pub fn executive_summary(summary: &BatchSummary, config: &TriageConfig) -> ExecutiveSummary {
    let counts = &summary.rating_counts;
    let recommendation = if summary.total == 0 {
        Recommendation::NoData
    } else if summary.average_quality >= config.healthy_quality
        && summary.accuracy.percent >= config.healthy_accuracy
    {
        Recommendation::Healthy
    } else if summary.average_quality >= config.fair_quality
        && summary.accuracy.percent >= config.fair_accuracy
    {
        Recommendation::Fair
    } else {
        Recommendation::NeedsAttention
    };

    ExecutiveSummary {
        total: summary.total,
        average_quality: summary.average_quality,
        evaluator_accuracy_percent: summary.accuracy.percent,
        success_rate: percent_of(counts.excellent + counts.good, summary.total),
        attention_rate: percent_of(counts.needs_review + counts.poor, summary.total),
        recommendation,
    }
}
