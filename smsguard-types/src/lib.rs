//! Core types shared across the smsguard crates.
//!
//! Keeping types separate ensures:
//!
//! - **One vocabulary of results**: the library, the CLI and the HTTP layer
//!   report the same `Label` and `ClassificationResult`
//! - **Serializable configuration**: the analyzer and vectorizer settings
//!   travel inside the persisted model bundle
//! - **Clean boundaries**: no circular dependencies between crates

#![warn(missing_docs)]

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Binary message label.
///
/// `#[repr(u8)]` keeps the discriminant usable as a class index:
/// ham is class 0 and spam is class 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Label {
    /// Legitimate message.
    Ham = 0,
    /// Unsolicited message.
    Spam = 1,
}

impl Label {
    /// Both labels, ordered by class index.
    pub const ALL: [Label; 2] = [Label::Ham, Label::Spam];

    /// Returns the class index of this label.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the label for a class index. Any non-zero index is spam.
    #[inline(always)]
    pub const fn from_index(index: usize) -> Self {
        if index == 0 {
            Label::Ham
        } else {
            Label::Spam
        }
    }

    /// Lowercase name, as used on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }

    /// Returns `true` for [`Label::Spam`].
    #[inline(always)]
    pub const fn is_spam(self) -> bool {
        matches!(self, Label::Spam)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = ParseEnumError;

    /// Accepts `spam`/`ham` in any case and the numeric forms `1`/`0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("spam") || s == "1" {
            Ok(Label::Spam)
        } else if s.eq_ignore_ascii_case("ham") || s == "0" {
            Ok(Label::Ham)
        } else {
            Err(ParseEnumError::new("label", s))
        }
    }
}

/// Outcome of the statistical classifier for one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Predicted label.
    pub label: Label,
    /// Maximum class probability, in `[0, 1]`.
    pub confidence: f32,
    /// Probability of the spam class, in `[0, 1]`.
    pub spam_probability: f32,
    /// Normalized tokens joined by single spaces.
    pub normalized_text: String,
}

impl ClassificationResult {
    /// Returns `true` if the message was classified as spam.
    #[inline(always)]
    pub fn is_spam(&self) -> bool {
        self.label.is_spam()
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}%)", self.label, self.confidence * 100.0)
    }
}

/// Outcome of the keyword rule for one message. Carries no confidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordVerdict {
    /// Predicted label.
    pub label: Label,
    /// Distinct keywords found in the message, in first-seen order.
    pub matched: Vec<String>,
}

impl fmt::Display for KeywordVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} keywords", self.label, self.matched.len())?;
        if !self.matched.is_empty() {
            write!(f, ": {}", self.matched.join(", "))?;
        }
        f.write_str(")")
    }
}

/// Result of whichever strategy the caller configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum Verdict {
    /// Produced by the Naive Bayes model.
    Statistical(ClassificationResult),
    /// Produced by the keyword rule.
    Keyword(KeywordVerdict),
}

impl Verdict {
    /// Predicted label.
    pub fn label(&self) -> Label {
        match self {
            Verdict::Statistical(r) => r.label,
            Verdict::Keyword(v) => v.label,
        }
    }

    /// Confidence, when the strategy produces one.
    pub fn confidence(&self) -> Option<f32> {
        match self {
            Verdict::Statistical(r) => Some(r.confidence),
            Verdict::Keyword(_) => None,
        }
    }

    /// Returns `true` if the message was classified as spam.
    #[inline(always)]
    pub fn is_spam(&self) -> bool {
        self.label().is_spam()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Statistical(r) => r.fmt(f),
            Verdict::Keyword(v) => v.fmt(f),
        }
    }
}

/// What the normalizer does with characters outside `a-z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonLetterMode {
    /// Turn them into token separators (`"don't"` → `"don t"`).
    #[default]
    Replace,
    /// Delete them, joining the surrounding letters (`"don't"` → `"dont"`).
    Remove,
}

/// Word reduction applied after stopword removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    /// Keep tokens as they are.
    None,
    /// Reduce plural nouns to the singular.
    Noun,
    /// Reduce inflected verbs to the base form.
    #[default]
    Verb,
}

/// Feature weighting used by the vectorizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Smoothed TF-IDF with L2 row normalization.
    #[default]
    TfIdf,
    /// Raw term counts.
    Count,
}

/// Classification strategy selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Trained Naive Bayes model.
    #[default]
    Statistical,
    /// Fixed keyword rule, no model required.
    Keyword,
}

impl Strategy {
    /// Lowercase name, as used on the command line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Strategy::Statistical => "statistical",
            Strategy::Keyword => "keyword",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Reduction::None => "none",
            Reduction::Noun => "noun",
            Reduction::Verb => "verb",
        })
    }
}

impl fmt::Display for Weighting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Weighting::TfIdf => "tfidf",
            Weighting::Count => "count",
        })
    }
}

impl fmt::Display for NonLetterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NonLetterMode::Replace => "replace",
            NonLetterMode::Remove => "remove",
        })
    }
}

macro_rules! impl_from_str {
    ($ty:ty, $kind:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    _ => Err(ParseEnumError::new($kind, s)),
                }
            }
        }
    };
}

impl_from_str!(Strategy, "strategy", {
    "statistical" => Strategy::Statistical,
    "model" => Strategy::Statistical,
    "keyword" => Strategy::Keyword,
    "rules" => Strategy::Keyword,
});

impl_from_str!(Reduction, "reduction", {
    "none" => Reduction::None,
    "noun" => Reduction::Noun,
    "verb" => Reduction::Verb,
});

impl_from_str!(Weighting, "weighting", {
    "tfidf" => Weighting::TfIdf,
    "tf-idf" => Weighting::TfIdf,
    "count" => Weighting::Count,
});

impl_from_str!(NonLetterMode, "non-letter mode", {
    "replace" => NonLetterMode::Replace,
    "remove" => NonLetterMode::Remove,
});

/// Error returned when parsing one of the enums above from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.value)
    }
}

impl core::error::Error for ParseEnumError {}

/// Text analysis options.
///
/// Stored in the model bundle: inference must run the same pipeline the
/// vectorizer was fit on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Handling of characters outside `a-z`.
    pub non_letters: NonLetterMode,
    /// Reduction applied to surviving tokens.
    pub reduction: Reduction,
    /// Stopwords added on top of the built-in English list.
    pub extra_stopwords: Vec<String>,
}

impl AnalyzerConfig {
    /// Lowercase, strip, tokenize and drop stopwords; no reduction.
    pub fn plain() -> Self {
        Self {
            reduction: Reduction::None,
            ..Self::default()
        }
    }

    /// Variant used by the web form: non-letters are deleted and
    /// plural nouns reduced.
    pub fn web_form() -> Self {
        Self {
            non_letters: NonLetterMode::Remove,
            reduction: Reduction::Noun,
            extra_stopwords: Vec::new(),
        }
    }
}

/// Vectorizer options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Feature weighting.
    pub weighting: Weighting,
    /// Minimum number of training documents a term must appear in.
    /// Default: 1
    pub min_df: u32,
    /// Keep only the most frequent terms, if set.
    pub max_features: Option<u32>,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            weighting: Weighting::TfIdf,
            min_df: 1,
            max_features: None,
        }
    }
}

/// Errors that can occur when classifying a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    /// The message is empty or whitespace only.
    EmptyInput,
    /// No model/vectorizer pair has been fit or loaded.
    ModelNotTrained,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::EmptyInput => write!(f, "no text provided"),
            ClassifyError::ModelNotTrained => {
                write!(f, "model is not trained; train or load a model bundle first")
            }
        }
    }
}

impl core::error::Error for ClassifyError {}

/// Errors that can occur when reading or writing a model bundle.
#[derive(Debug)]
pub enum BundleError {
    /// Underlying file I/O failed.
    Io(std::io::Error),
    /// The file does not start with the bundle magic.
    NotABundle,
    /// The bundle was written by an incompatible format version.
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },
    /// The stored vocabulary does not match the stored fingerprint.
    VectorizerMismatch {
        /// Fingerprint recorded at training time.
        expected: u64,
        /// Fingerprint recomputed from the loaded vocabulary.
        found: u64,
    },
    /// Model and vectorizer disagree on the feature dimension.
    DimensionMismatch {
        /// Vocabulary size.
        vocabulary: usize,
        /// Number of model coefficients per class.
        model: usize,
    },
    /// Serialization failed.
    Encode(String),
    /// Deserialization failed.
    Decode(String),
}

impl fmt::Display for BundleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleError::Io(e) => write!(f, "bundle I/O error: {}", e),
            BundleError::NotABundle => write!(f, "file is not a smsguard model bundle"),
            BundleError::UnsupportedVersion { found, expected } => write!(
                f,
                "unsupported bundle format version {} (expected {})",
                found, expected
            ),
            BundleError::VectorizerMismatch { expected, found } => write!(
                f,
                "vocabulary fingerprint mismatch: bundle records {:016x}, vocabulary hashes to {:016x}",
                expected, found
            ),
            BundleError::DimensionMismatch { vocabulary, model } => write!(
                f,
                "model expects {} features but the vocabulary has {}",
                model, vocabulary
            ),
            BundleError::Encode(e) => write!(f, "failed to encode bundle: {}", e),
            BundleError::Decode(e) => write!(f, "failed to decode bundle: {}", e),
        }
    }
}

impl core::error::Error for BundleError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            BundleError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BundleError {
    fn from(e: std::io::Error) -> Self {
        BundleError::Io(e)
    }
}

/// Errors that can occur when loading a dataset or training a model.
#[derive(Debug)]
pub enum TrainError {
    /// Underlying file I/O failed.
    Io(std::io::Error),
    /// The CSV reader rejected the input.
    Csv {
        /// Line of the offending record, if known.
        line: Option<u64>,
        /// Reader error message.
        message: String,
    },
    /// A required column is absent from the header row.
    MissingColumn {
        /// Column names that were tried.
        tried: Vec<String>,
    },
    /// A label cell is neither spam nor ham.
    InvalidLabel {
        /// Line of the record.
        line: u64,
        /// Cell content.
        value: String,
    },
    /// The dataset contains no samples.
    EmptyDataset,
    /// The dataset contains samples of one label only.
    SingleClass {
        /// The only label present.
        label: Label,
    },
    /// No term survived analysis and vocabulary filtering.
    EmptyVocabulary,
}

impl fmt::Display for TrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrainError::Io(e) => write!(f, "dataset I/O error: {}", e),
            TrainError::Csv {
                line: Some(line),
                message,
            } => write!(f, "CSV error on line {}: {}", line, message),
            TrainError::Csv { line: None, message } => write!(f, "CSV error: {}", message),
            TrainError::MissingColumn { tried } => {
                write!(f, "missing column (tried: {})", tried.join(", "))
            }
            TrainError::InvalidLabel { line, value } => {
                write!(f, "invalid label {:?} on line {} (expected spam or ham)", value, line)
            }
            TrainError::EmptyDataset => write!(f, "dataset contains no samples"),
            TrainError::SingleClass { label } => write!(
                f,
                "dataset contains only {} samples; both spam and ham are required",
                label
            ),
            TrainError::EmptyVocabulary => {
                write!(f, "no terms survived analysis; vocabulary is empty")
            }
        }
    }
}

impl core::error::Error for TrainError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            TrainError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for TrainError {
    fn from(e: std::io::Error) -> Self {
        TrainError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_class_indices() {
        assert_eq!(Label::Ham.index(), 0);
        assert_eq!(Label::Spam.index(), 1);
        assert_eq!(Label::from_index(0), Label::Ham);
        assert_eq!(Label::from_index(1), Label::Spam);
        assert_eq!(Label::ALL, [Label::Ham, Label::Spam]);
    }

    #[test]
    fn label_parses_names_and_digits() {
        assert_eq!("spam".parse::<Label>(), Ok(Label::Spam));
        assert_eq!(" SPAM ".parse::<Label>(), Ok(Label::Spam));
        assert_eq!("Ham".parse::<Label>(), Ok(Label::Ham));
        assert_eq!("1".parse::<Label>(), Ok(Label::Spam));
        assert_eq!("0".parse::<Label>(), Ok(Label::Ham));
        assert!("junk".parse::<Label>().is_err());
    }

    #[test]
    fn label_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Label::Spam).unwrap(), "\"spam\"");
        assert_eq!(
            serde_json::from_str::<Label>("\"ham\"").unwrap(),
            Label::Ham
        );
    }

    #[test]
    fn verdict_accessors() {
        let stat = Verdict::Statistical(ClassificationResult {
            label: Label::Spam,
            confidence: 0.9,
            spam_probability: 0.9,
            normalized_text: "win cash".into(),
        });
        assert!(stat.is_spam());
        assert_eq!(stat.confidence(), Some(0.9));

        let kw = Verdict::Keyword(KeywordVerdict {
            label: Label::Ham,
            matched: vec!["free".into()],
        });
        assert!(!kw.is_spam());
        assert_eq!(kw.confidence(), None);
    }

    #[test]
    fn result_display_uses_percent() {
        let r = ClassificationResult {
            label: Label::Ham,
            confidence: 0.875,
            spam_probability: 0.125,
            normalized_text: String::new(),
        };
        assert_eq!(r.to_string(), "ham (87.5%)");
    }

    #[test]
    fn keyword_verdict_display() {
        let v = KeywordVerdict {
            label: Label::Spam,
            matched: vec!["free".into(), "win".into(), "cash".into()],
        };
        assert_eq!(v.to_string(), "spam (3 keywords: free, win, cash)");
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Keyword".parse::<Strategy>(), Ok(Strategy::Keyword));
        assert_eq!("tf-idf".parse::<Weighting>(), Ok(Weighting::TfIdf));
        assert_eq!("NOUN".parse::<Reduction>(), Ok(Reduction::Noun));
        assert_eq!("remove".parse::<NonLetterMode>(), Ok(NonLetterMode::Remove));
        let err = "bogus".parse::<Strategy>().unwrap_err();
        assert_eq!(err.to_string(), "unknown strategy: \"bogus\"");
    }

    #[test]
    fn config_defaults() {
        let a = AnalyzerConfig::default();
        assert_eq!(a.non_letters, NonLetterMode::Replace);
        assert_eq!(a.reduction, Reduction::Verb);
        assert!(a.extra_stopwords.is_empty());

        let v = VectorizerConfig::default();
        assert_eq!(v.weighting, Weighting::TfIdf);
        assert_eq!(v.min_df, 1);
        assert_eq!(v.max_features, None);
    }

    #[test]
    fn error_messages() {
        assert_eq!(ClassifyError::EmptyInput.to_string(), "no text provided");
        let e = BundleError::UnsupportedVersion {
            found: 9,
            expected: 1,
        };
        assert_eq!(
            e.to_string(),
            "unsupported bundle format version 9 (expected 1)"
        );
        let e = TrainError::SingleClass { label: Label::Ham };
        assert!(e.to_string().contains("only ham samples"));
    }
}
