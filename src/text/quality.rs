//! Content-quality gate
//!
//! A page is worth expanding only if it carries enough substantive text: a
//! minimum count of non-stopword tokens and a bounded stopword ratio. Pages
//! failing the gate are recorded but contribute no outbound links.

use serde::{Deserialize, Serialize};

use super::stopwords::is_stopword;
use super::tokenizer::TokenFrequency;

/// Thresholds for the high-information predicate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityThresholds {
    /// Minimum non-stopword token count (strict: the page must exceed this)
    #[serde(default = "default_min_words")]
    pub min_words: u64,
    /// Maximum tolerated stopword fraction (strict: the page must stay below)
    #[serde(default = "default_max_stopword_ratio")]
    pub max_stopword_ratio: f64,
}

fn default_min_words() -> u64 {
    50
}

fn default_max_stopword_ratio() -> f64 {
    0.5
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            max_stopword_ratio: default_max_stopword_ratio(),
        }
    }
}

/// Word-count signals backing the quality decision, also used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitySignals {
    /// Total token occurrences on the page
    pub total_words: u64,
    /// Occurrences that are stopwords
    pub stopword_count: u64,
}

impl QualitySignals {
    /// Stopword fraction; -1.0 for a wordless page so log lines stay greppable
    pub fn stopword_ratio(&self) -> f64 {
        if self.total_words == 0 {
            return -1.0;
        }
        self.stopword_count as f64 / self.total_words as f64
    }
}

/// Count total and stopword occurrences in a frequency map.
pub fn signals(frequencies: &TokenFrequency) -> QualitySignals {
    let mut total_words = 0;
    let mut stopword_count = 0;
    for (token, &count) in frequencies {
        total_words += count;
        if is_stopword(token) {
            stopword_count += count;
        }
    }
    QualitySignals {
        total_words,
        stopword_count,
    }
}

/// Decide whether a page has high textual information content.
///
/// A wordless page is low-information by definition; the stopword ratio is
/// never computed against a zero denominator.
pub fn is_high_information(frequencies: &TokenFrequency, thresholds: &QualityThresholds) -> bool {
    let s = signals(frequencies);
    if s.total_words == 0 {
        return false;
    }
    s.total_words - s.stopword_count > thresholds.min_words
        && s.stopword_ratio() < thresholds.max_stopword_ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn freq_of(pairs: &[(&str, u64)]) -> TokenFrequency {
        pairs.iter().map(|(t, c)| (t.to_string(), *c)).collect()
    }

    fn distinct_content_words(n: u64) -> Vec<(String, u64)> {
        (0..n).map(|i| (format!("term{i}"), 1)).collect()
    }

    #[test]
    fn test_wordless_page_is_low_information() {
        let empty = TokenFrequency::new();
        assert!(!is_high_information(&empty, &QualityThresholds::default()));
        assert_eq!(signals(&empty).stopword_ratio(), -1.0);
    }

    #[test]
    fn test_sixty_content_ten_stopwords_passes() {
        let mut freq = TokenFrequency::new();
        for (t, c) in distinct_content_words(60) {
            freq.insert(t, c);
        }
        freq.insert("the".to_string(), 10);

        let s = signals(&freq);
        assert_eq!(s.total_words, 70);
        assert_eq!(s.stopword_count, 10);
        assert!(is_high_information(&freq, &QualityThresholds::default()));
    }

    #[test]
    fn test_forty_content_words_fails_regardless_of_ratio() {
        let mut freq = TokenFrequency::new();
        for (t, c) in distinct_content_words(40) {
            freq.insert(t, c);
        }
        assert!(!is_high_information(&freq, &QualityThresholds::default()));
    }

    #[test]
    fn test_min_words_is_strict() {
        // Exactly min_words non-stopwords is not enough
        let mut freq = TokenFrequency::new();
        for (t, c) in distinct_content_words(50) {
            freq.insert(t, c);
        }
        assert!(!is_high_information(&freq, &QualityThresholds::default()));
    }

    #[test]
    fn test_stopword_heavy_page_fails() {
        let freq = freq_of(&[("the", 80), ("and", 30)]);
        assert!(!is_high_information(&freq, &QualityThresholds::default()));
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let freq = freq_of(&[("alpha", 3), ("beta", 2), ("the", 1)]);
        let relaxed = QualityThresholds {
            min_words: 4,
            max_stopword_ratio: 0.5,
        };
        assert!(is_high_information(&freq, &relaxed));
        assert!(!is_high_information(&freq, &QualityThresholds::default()));
    }
}
