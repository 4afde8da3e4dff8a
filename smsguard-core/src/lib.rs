//! SMS spam classification core.
//!
//! - [`analyzer`]: raw text to normalized tokens
//! - [`model`]: TF-IDF vectorizer, Naive Bayes and the persisted bundle
//! - [`classifier`]: [`SpamClassifier`] and strategy selection via [`Engine`]
//! - [`keyword`]: model-free keyword rule
//! - [`train`]: CSV datasets, training and evaluation
//!
//! ```
//! use smsguard_core::{train, Dataset, Sample, SpamClassifier, TrainConfig};
//! use smsguard_types::Label;
//!
//! let data = Dataset::new(vec![
//!     Sample::new(Label::Spam, "Claim your free cash prize now"),
//!     Sample::new(Label::Spam, "You won a prize, call to claim"),
//!     Sample::new(Label::Ham, "Coffee later today?"),
//!     Sample::new(Label::Ham, "See you at lunch"),
//! ]);
//! let bundle = train(&data, &TrainConfig::default()).unwrap();
//! let classifier = SpamClassifier::from_bundle(bundle);
//!
//! assert!(classifier.classify("free prize!").unwrap().is_spam());
//! ```

pub mod analyzer;
pub mod classifier;
pub mod keyword;
pub mod model;
pub mod train;

pub use analyzer::Analyzer;
pub use classifier::{Engine, SpamClassifier};
pub use keyword::KeywordClassifier;
pub use model::{ModelBundle, ModelStats};
pub use train::{evaluate, train, CsvColumns, Dataset, Evaluation, Sample, TrainConfig};
