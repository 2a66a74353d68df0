use std::sync::LazyLock;

use regex::Regex;

static WORD_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}]+(?:['’][\p{L}]+)*").expect("valid word regex"));
static SENTENCE_BREAK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+(?:\s+|$)|\n{2,}").expect("valid sentence regex"));

/// Length and vocabulary measurements of a piece of text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextProfile {
    pub words: Vec<String>,
    pub sentence_count: usize,
    /// Lowercased words joined by single spaces and padded on both ends,
    /// so whole-word phrases can be found with `contains(" phrase ")`.
    pub normalized: String,
}

impl TextProfile {
    pub fn new(text: &str) -> Self {
        let words = WORD_REGEX
            .find_iter(text)
            .map(|word| word.as_str().to_lowercase())
            .collect::<Vec<String>>();

        let sentence_count = SENTENCE_BREAK_REGEX
            .split(text)
            .filter(|segment| WORD_REGEX.is_match(segment))
            .count();

        let normalized = format!(" {} ", words.join(" "));

        Self {
            words,
            sentence_count,
            normalized,
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn avg_word_len(&self) -> f64 {
        if self.words.is_empty() {
            return 0.0;
        }
        let letters = self
            .words
            .iter()
            .map(|word| word.chars().count())
            .sum::<usize>();
        letters as f64 / self.words.len() as f64
    }

    pub fn avg_sentence_words(&self) -> f64 {
        if self.words.is_empty() {
            return 0.0;
        }
        self.words.len() as f64 / self.sentence_count.max(1) as f64
    }

    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let needle = normalize_phrase(phrase);
        if needle.trim().is_empty() {
            return false;
        }
        self.normalized.contains(&needle)
    }

    pub fn count_phrases<'a, I>(&self, phrases: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a String>,
    {
        phrases
            .into_iter()
            .filter(|phrase| self.contains_phrase(phrase))
            .map(String::as_str)
            .collect()
    }
}

/// Runs a phrase through the same tokenization as [`TextProfile`].
pub fn normalize_phrase(phrase: &str) -> String {
    let tokens = WORD_REGEX
        .find_iter(phrase)
        .map(|word| word.as_str().to_lowercase())
        .collect::<Vec<String>>();
    format!(" {} ", tokens.join(" "))
}

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub fn cap_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => (&text[..byte_index], true),
        None => (text, false),
    }
}

/// First `max_chars` characters with a trailing ellipsis when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let condensed = text.split_whitespace().collect::<Vec<&str>>().join(" ");
    match cap_chars(&condensed, max_chars) {
        (head, true) => format!("{head}..."),
        (whole, false) => whole.to_string(),
    }
}
