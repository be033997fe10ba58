//! Text analysis: tokenization, stopwords, and the content-quality gate

pub mod quality;
pub mod stopwords;
pub mod tokenizer;

pub use quality::{is_high_information, QualitySignals, QualityThresholds};
pub use stopwords::is_stopword;
pub use tokenizer::{tokenize, word_frequencies, TokenFrequency};
