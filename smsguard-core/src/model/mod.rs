//! Feature extraction, scoring and persistence.
//!
//! - **Vectorizer**: vocabulary, document frequencies and sparse rows
//! - **NaiveBayes**: two-class multinomial model with additive smoothing
//! - **ModelBundle**: the versioned file that keeps the two together

pub mod bundle;
pub mod naive_bayes;
pub mod vectorizer;

pub use bundle::{ModelBundle, ModelStats, TrainingSummary, FORMAT_VERSION, MAGIC};
pub use naive_bayes::{NaiveBayes, DEFAULT_ALPHA};
pub use vectorizer::{FeatureVector, Vectorizer, Vocabulary};
