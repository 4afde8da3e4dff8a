//! Text analysis pipeline.
//!
//! This module provides the text processing components:
//! - **Normalizer**: Lowercases raw text and strips everything but letters
//! - **Tokenizer**: Splits normalized text into tokens
//! - **StopWords**: Drops function words
//! - **Lemmatizer**: Reduces inflected words to a base form
//!
//! [`Analyzer`] chains them in that order. The same analyzer configuration is
//! stored in every model bundle, so training and inference see identical
//! token streams.

pub mod lemmatizer;
pub mod normalizer;
pub mod stopwords;
pub mod tokenizer;

pub use lemmatizer::Lemmatizer;
pub use normalizer::TextNormalizer;
pub use stopwords::StopWords;
pub use tokenizer::{Tokenizer, Tokens};

use smsguard_types::AnalyzerConfig;

/// Raw text to normalized tokens.
///
/// ```
/// use smsguard_core::analyzer::Analyzer;
/// use smsguard_types::AnalyzerConfig;
///
/// let analyzer = Analyzer::new(AnalyzerConfig::default());
/// assert_eq!(
///     analyzer.normalize("You have WON! Claim your prizes now"),
///     vec!["claim", "prize"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalyzerConfig,
    normalizer: TextNormalizer,
    tokenizer: Tokenizer,
    stopwords: StopWords,
    lemmatizer: Lemmatizer,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerConfig::default())
    }
}

impl Analyzer {
    /// Builds the pipeline for a configuration.
    pub fn new(config: AnalyzerConfig) -> Self {
        let mut stopwords = StopWords::english();
        stopwords.extend(&config.extra_stopwords);

        Self {
            normalizer: TextNormalizer::with_mode(config.non_letters),
            tokenizer: Tokenizer::new(),
            lemmatizer: Lemmatizer::new(config.reduction),
            stopwords,
            config,
        }
    }

    /// The configuration this analyzer was built from.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Runs the pipeline and emits each surviving token in message order.
    pub fn analyze<F>(&self, text: &str, mut emit: F)
    where
        F: FnMut(&str),
    {
        let normalized = self.normalizer.normalize(text);
        for token in self.tokenizer.tokens(&normalized) {
            if !self.stopwords.contains(token) {
                emit(self.lemmatizer.reduce(token).as_ref());
            }
        }
    }

    /// Normalized token sequence. Order and repetition are preserved.
    pub fn normalize(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.analyze(text, |token| out.push(token.to_owned()));
        out
    }

    /// Normalized tokens joined by single spaces.
    pub fn normalize_to_string(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        self.analyze(text, |token| {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(token);
        });
        out
    }
}
