//! Keyword-count spam rule.
//!
//! A model-free strategy: a message is spam when it contains more than
//! [`SPAM_THRESHOLD`] distinct words from a fixed list. Tokens come from the
//! normalizer and tokenizer only; stopwords are kept and nothing is reduced,
//! so `"won"` and `"win"` are different keywords.

use rustc_hash::FxHashSet;
use smsguard_types::{ClassifyError, KeywordVerdict, Label};

use crate::analyzer::{TextNormalizer, Tokenizer};

/// Built-in spam keywords.
#[rustfmt::skip]
pub const SPAM_KEYWORDS: &[&str] = &[
    "free", "win", "winner", "won", "prize", "cash", "claim", "urgent",
    "congratulations", "offer", "reward", "guaranteed", "selected", "credit",
    "loan", "bonus", "mobile", "click", "subscribe", "award", "ringtone",
    "entry", "voucher", "discount", "limited",
];

/// A message needs strictly more distinct matches than this to be spam.
pub const SPAM_THRESHOLD: usize = 2;

/// Rule-based classifier over a keyword set.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    keywords: FxHashSet<String>,
    threshold: usize,
    normalizer: TextNormalizer,
    tokenizer: Tokenizer,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(SPAM_KEYWORDS.iter().copied(), SPAM_THRESHOLD)
    }
}

impl KeywordClassifier {
    /// Classifier over custom keywords. Keywords are lowercased.
    pub fn new<I, S>(keywords: I, threshold: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_ascii_lowercase())
                .collect(),
            threshold,
            normalizer: TextNormalizer::default(),
            tokenizer: Tokenizer::new(),
        }
    }

    /// Distinct keywords in `text`, in first-seen order.
    pub fn matches(&self, text: &str) -> Vec<String> {
        let normalized = self.normalizer.normalize(text);
        let mut matched: Vec<String> = Vec::new();
        for token in self.tokenizer.tokens(&normalized) {
            if self.keywords.contains(token) && !matched.iter().any(|m| m == token) {
                matched.push(token.to_owned());
            }
        }
        matched
    }

    /// Applies the rule. Blank input is rejected like on the statistical path.
    pub fn classify(&self, text: &str) -> Result<KeywordVerdict, ClassifyError> {
        if text.trim().is_empty() {
            return Err(ClassifyError::EmptyInput);
        }
        let matched = self.matches(text);
        let label = if matched.len() > self.threshold {
            Label::Spam
        } else {
            Label::Ham
        };
        Ok(KeywordVerdict { label, matched })
    }

    /// Match count above which a message is spam.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Number of keywords.
    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    /// Returns `true` if there are no keywords.
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}
