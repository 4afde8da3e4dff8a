//! Classification front ends.
//!
//! [`SpamClassifier`] runs the statistical pipeline over a loaded
//! [`ModelBundle`]. [`Engine`] selects between it and the keyword rule once,
//! at startup; the two are never mixed per message.

use std::path::Path;

use smsguard_types::{
    AnalyzerConfig, BundleError, ClassificationResult, ClassifyError, Label, Strategy, TrainError,
    Verdict,
};
use tracing::debug;

use crate::analyzer::Analyzer;
use crate::keyword::KeywordClassifier;
use crate::model::naive_bayes::argmax;
use crate::model::ModelBundle;
use crate::train::{train, Dataset, TrainConfig};

/// Naive Bayes spam classifier.
///
/// Starts untrained unless built from a bundle. Classifying with no bundle
/// yields [`ClassifyError::ModelNotTrained`].
#[derive(Debug, Clone)]
pub struct SpamClassifier {
    analyzer: Analyzer,
    bundle: Option<ModelBundle>,
}

impl Default for SpamClassifier {
    fn default() -> Self {
        Self::untrained(AnalyzerConfig::default())
    }
}

impl SpamClassifier {
    /// Classifier with no model. [`fit`](Self::fit) replaces the analyzer
    /// configuration with the one it trains with.
    pub fn untrained(config: AnalyzerConfig) -> Self {
        Self {
            analyzer: Analyzer::new(config),
            bundle: None,
        }
    }

    /// Classifier over a fitted bundle, using the bundle's analyzer settings.
    pub fn from_bundle(bundle: ModelBundle) -> Self {
        Self {
            analyzer: Analyzer::new(bundle.analyzer().clone()),
            bundle: Some(bundle),
        }
    }

    /// Loads a bundle from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        ModelBundle::load(path).map(Self::from_bundle)
    }

    /// Trains on `dataset`, replacing any previous model.
    pub fn fit(
        &mut self,
        dataset: &Dataset,
        config: &TrainConfig,
    ) -> Result<&ModelBundle, TrainError> {
        let bundle = train(dataset, config)?;
        self.analyzer = Analyzer::new(bundle.analyzer().clone());
        Ok(self.bundle.insert(bundle))
    }

    /// The fitted bundle, if any.
    pub fn bundle(&self) -> Option<&ModelBundle> {
        self.bundle.as_ref()
    }

    /// Returns `true` once a model is fit or loaded.
    pub fn is_trained(&self) -> bool {
        self.bundle.is_some()
    }

    /// Analyzer applied to incoming text.
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Classifies one message.
    ///
    /// Blank input is rejected before the model is consulted, so the error
    /// does not depend on whether a model is loaded.
    pub fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        if text.trim().is_empty() {
            return Err(ClassifyError::EmptyInput);
        }
        let bundle = self.bundle.as_ref().ok_or(ClassifyError::ModelNotTrained)?;

        let tokens = self.analyzer.normalize(text);
        let features = bundle.vectorizer().transform(&tokens);
        let proba = bundle.model().predict_proba(&features);
        let label = argmax(proba);
        let confidence = proba[label.index()] as f32;

        debug!(
            %label,
            confidence,
            tokens = tokens.len(),
            features = features.nnz(),
            "classified message"
        );

        Ok(ClassificationResult {
            label,
            confidence,
            spam_probability: proba[Label::Spam.index()] as f32,
            normalized_text: tokens.join(" "),
        })
    }

    /// Predicted label only.
    pub fn predict(&self, text: &str) -> Result<Label, ClassifyError> {
        self.classify(text).map(|r| r.label)
    }

    /// Probability of the spam class, in `[0, 1]`.
    pub fn spam_probability(&self, text: &str) -> Result<f32, ClassifyError> {
        self.classify(text).map(|r| r.spam_probability)
    }
}

/// The strategy a process classifies with.
#[derive(Debug, Clone)]
pub enum Engine {
    /// Naive Bayes over a model bundle.
    Statistical(SpamClassifier),
    /// Keyword-count rule.
    Keyword(KeywordClassifier),
}

impl Engine {
    /// Builds the engine for `strategy`.
    ///
    /// The statistical engine loads `model` when given and is otherwise left
    /// untrained. The keyword engine ignores `model`.
    pub fn open(strategy: Strategy, model: Option<&Path>) -> Result<Self, BundleError> {
        Ok(match (strategy, model) {
            (Strategy::Statistical, Some(path)) => Engine::Statistical(SpamClassifier::load(path)?),
            (Strategy::Statistical, None) => Engine::Statistical(SpamClassifier::default()),
            (Strategy::Keyword, _) => Engine::Keyword(KeywordClassifier::default()),
        })
    }

    /// Strategy this engine implements.
    pub fn strategy(&self) -> Strategy {
        match self {
            Engine::Statistical(_) => Strategy::Statistical,
            Engine::Keyword(_) => Strategy::Keyword,
        }
    }

    /// Returns `true` if [`classify`](Self::classify) can succeed on
    /// non-blank input.
    pub fn is_ready(&self) -> bool {
        match self {
            Engine::Statistical(c) => c.is_trained(),
            Engine::Keyword(_) => true,
        }
    }

    /// Classifies one message with the configured strategy.
    pub fn classify(&self, text: &str) -> Result<Verdict, ClassifyError> {
        match self {
            Engine::Statistical(c) => c.classify(text).map(Verdict::Statistical),
            Engine::Keyword(k) => k.classify(text).map(Verdict::Keyword),
        }
    }
}

impl From<SpamClassifier> for Engine {
    fn from(classifier: SpamClassifier) -> Self {
        Engine::Statistical(classifier)
    }
}

impl From<KeywordClassifier> for Engine {
    fn from(classifier: KeywordClassifier) -> Self {
        Engine::Keyword(classifier)
    }
}
