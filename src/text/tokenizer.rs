//! Page-text tokenization
//!
//! Tokens are maximal runs of ASCII alphanumeric characters, case-folded to
//! lowercase. Everything else, including all non-ASCII characters, acts as a
//! delimiter: page encodings are decoded upstream, so a multi-byte character
//! reaching this layer is never part of an English word.

use std::collections::HashMap;

/// Token to occurrence-count mapping for a single page
pub type TokenFrequency = HashMap<String, u64>;

/// Split page text into lowercase ASCII-alphanumeric tokens.
///
/// O(n) in the input length; empty tokens are never emitted.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            current.push(ch.to_ascii_lowercase());
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Fold the token stream of `text` into per-token counts.
pub fn word_frequencies(text: &str) -> TokenFrequency {
    let mut frequencies = TokenFrequency::new();
    for token in tokenize(text) {
        *frequencies.entry(token).or_insert(0) += 1;
    }
    frequencies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_ascii_is_delimiter() {
        assert_eq!(tokenize("A1 b--2 \u{03a9}3"), vec!["a1", "b", "2", "3"]);
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(tokenize("Hello WORLD"), vec!["hello", "world"]);
    }

    #[test]
    fn test_idempotent_on_clean_input() {
        let once = tokenize("already lowercase tokens");
        let again = tokenize(&once.join(" "));
        assert_eq!(once, again);
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("--- !!! ...").is_empty());
    }

    #[test]
    fn test_trailing_token_emitted() {
        assert_eq!(tokenize("end token"), vec!["end", "token"]);
    }

    #[test]
    fn test_word_frequencies_counts() {
        let freq = word_frequencies("the cat and the dog and the bird");
        assert_eq!(freq.get("the"), Some(&3));
        assert_eq!(freq.get("and"), Some(&2));
        assert_eq!(freq.get("cat"), Some(&1));
        assert_eq!(freq.len(), 5);
    }
}
