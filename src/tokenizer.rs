//! Minimal word/sentence/syllable tokenization.
//!
//! Used by the adaptive chunker's complexity score and the prompt builder's
//! example-budget selection — neither needs a full token-stream/offset API,
//! just word- and sentence-level counts.

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9']+").unwrap());
static SENTENCE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());
static VOWEL_GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)[aeiouy]+").unwrap());

pub struct Tokenizer;

impl Tokenizer {
    pub fn new() -> Self {
        Self
    }

    /// Extracts words (alphanumeric runs, apostrophes included).
    pub fn words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
    }

    pub fn word_count(&self, text: &str) -> usize {
        self.words(text).len()
    }

    /// Counts sentence-terminating punctuation runs, at least 1 for any
    /// non-empty text.
    pub fn sentence_count(&self, text: &str) -> usize {
        let count = SENTENCE_RE.find_iter(text).count();
        if count == 0 && !text.trim().is_empty() {
            1
        } else {
            count
        }
    }

    /// Heuristic vowel-group syllable count, at least 1 per non-empty word.
    pub fn syllable_count(&self, word: &str) -> usize {
        let count = VOWEL_GROUP_RE.find_iter(word).count();
        count.max(if word.is_empty() { 0 } else { 1 })
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_words_and_sentences() {
        let t = Tokenizer::new();
        assert_eq!(t.word_count("The quick brown fox."), 4);
        assert_eq!(t.sentence_count("One. Two! Three?"), 3);
        assert_eq!(t.sentence_count("no terminator here"), 1);
        assert_eq!(t.sentence_count(""), 0);
    }

    #[test]
    fn estimates_syllables() {
        let t = Tokenizer::new();
        assert_eq!(t.syllable_count("cat"), 1);
        assert!(t.syllable_count("interdisciplinary") >= 5);
    }
}
