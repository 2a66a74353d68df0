use std::sync::LazyLock;

use regex::Regex;

static GRADE_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)?\b").expect("valid grade regex"));

const COLLEGE_GRADE: u8 = 13;
const MAX_GRADE: u8 = 20;

/// Maps a free-form grade label ("5th", "Grade 10", "K", "college") to a
/// grade number, kindergarten being 0.
pub fn parse_grade_level(label: &str) -> Option<u8> {
    let lowered = label.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }

    if matches!(
        lowered.as_str(),
        "k" | "kg" | "kinder" | "kindergarten" | "pre-k" | "prek"
    ) {
        return Some(0);
    }

    if ["college", "university", "undergraduate", "graduate", "adult"]
        .iter()
        .any(|word| lowered.contains(word))
    {
        return Some(COLLEGE_GRADE);
    }

    if let Some(grade) = GRADE_NUMBER_REGEX
        .captures(&lowered)
        .and_then(|captures| captures.get(1))
        .and_then(|value| value.as_str().parse::<u8>().ok())
    {
        return (grade <= MAX_GRADE).then_some(grade);
    }

    if lowered.contains("high school") {
        Some(10)
    } else if lowered.contains("middle school") {
        Some(7)
    } else if lowered.contains("elementary") {
        Some(3)
    } else {
        None
    }
}
