//! Dataset loading, training and evaluation.
//!
//! The expected input is the SMS Spam Collection layout: a CSV file with a
//! header row, the label in `v1` and the message in `v2`, trailing empty
//! columns, and message bytes that are not always valid UTF-8.

use std::borrow::Cow;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use smsguard_types::{AnalyzerConfig, ClassifyError, Label, TrainError, VectorizerConfig};
use tracing::{info, warn};

use crate::analyzer::Analyzer;
use crate::classifier::SpamClassifier;
use crate::model::naive_bayes::DEFAULT_ALPHA;
use crate::model::{FeatureVector, ModelBundle, NaiveBayes, TrainingSummary, Vectorizer};

/// One labelled message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Ground-truth label.
    pub label: Label,
    /// Raw message text.
    pub text: String,
}

impl Sample {
    /// Creates a sample.
    pub fn new(label: Label, text: impl Into<String>) -> Self {
        Self {
            label,
            text: text.into(),
        }
    }
}

/// Header names to look for. Matching is case-insensitive; the first header
/// that matches any candidate wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    /// Candidates for the label column.
    pub label: Vec<String>,
    /// Candidates for the text column.
    pub text: Vec<String>,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            label: vec!["v1".into(), "label".into()],
            text: vec!["v2".into(), "text".into(), "message".into()],
        }
    }
}

/// Labelled messages in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    samples: Vec<Sample>,
}

impl FromIterator<Sample> for Dataset {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Dataset {
    /// Wraps already-labelled samples.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Reads a CSV file.
    pub fn from_csv_path(path: impl AsRef<Path>, columns: &CsvColumns) -> Result<Self, TrainError> {
        let path = path.as_ref();
        let dataset = Self::from_csv_reader(File::open(path)?, columns)?;
        let [ham, spam] = dataset.counts();
        info!(
            path = %path.display(),
            samples = dataset.len(),
            spam,
            ham,
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Reads CSV from any reader.
    ///
    /// Rows may have any number of fields. Rows missing the label or text
    /// field, or whose text is blank, are skipped with a warning. Fields that
    /// are not valid UTF-8 are decoded as ISO-8859-1.
    pub fn from_csv_reader<R: Read>(reader: R, columns: &CsvColumns) -> Result<Self, TrainError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.byte_headers().map_err(csv_error)?.clone();
        let label_col = find_column(&headers, &columns.label)?;
        let text_col = find_column(&headers, &columns.text)?;

        let mut samples = Vec::new();
        let mut record = csv::ByteRecord::new();
        while rdr.read_byte_record(&mut record).map_err(csv_error)? {
            let line = record.position().map_or(0, |p| p.line());

            let (Some(label), Some(text)) = (record.get(label_col), record.get(text_col)) else {
                warn!(line, "skipping row without label or text field");
                continue;
            };

            let text = decode(text);
            if text.trim().is_empty() {
                warn!(line, "skipping row with empty text");
                continue;
            }

            let label = decode(label);
            let label = label.parse::<Label>().map_err(|_| TrainError::InvalidLabel {
                line,
                value: label.trim().to_owned(),
            })?;

            samples.push(Sample {
                label,
                text: text.into_owned(),
            });
        }

        Ok(Self { samples })
    }

    /// All samples.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterates over the samples.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample count per label, indexed by [`Label::index`].
    pub fn counts(&self) -> [u32; 2] {
        let mut counts = [0u32; 2];
        for s in &self.samples {
            counts[s.label.index()] += 1;
        }
        counts
    }

    /// Samples with `label`.
    pub fn count(&self, label: Label) -> u32 {
        self.counts()[label.index()]
    }

    /// Deterministic split: every `holdout_every`-th sample goes to the
    /// second set. Values below 2 hold nothing out.
    pub fn split(&self, holdout_every: usize) -> (Dataset, Dataset) {
        if holdout_every < 2 {
            return (self.clone(), Dataset::default());
        }
        let (holdout, train): (Vec<_>, Vec<_>) = self
            .samples
            .iter()
            .enumerate()
            .partition(|(i, _)| (i + 1) % holdout_every == 0);
        (
            train.into_iter().map(|(_, s)| s.clone()).collect(),
            holdout.into_iter().map(|(_, s)| s.clone()).collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

fn find_column(headers: &csv::ByteRecord, names: &[String]) -> Result<usize, TrainError> {
    headers
        .iter()
        .position(|h| {
            let h = decode(h);
            let h = h.trim().trim_start_matches('\u{feff}');
            names.iter().any(|n| n.eq_ignore_ascii_case(h))
        })
        .ok_or_else(|| TrainError::MissingColumn {
            tried: names.to_vec(),
        })
}

/// UTF-8 if valid, ISO-8859-1 otherwise.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

fn csv_error(e: csv::Error) -> TrainError {
    let line = e.position().map(|p| p.line());
    let message = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => TrainError::Io(io),
        _ => TrainError::Csv { line, message },
    }
}

/// Training options.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainConfig {
    /// Text analysis; stored in the bundle.
    pub analyzer: AnalyzerConfig,
    /// Vocabulary and weighting.
    pub vectorizer: VectorizerConfig,
    /// Naive Bayes additive smoothing.
    pub alpha: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            analyzer: AnalyzerConfig::default(),
            vectorizer: VectorizerConfig::default(),
            alpha: DEFAULT_ALPHA,
        }
    }
}

/// Fits analyzer, vectorizer and model on `dataset` as one bundle.
pub fn train(dataset: &Dataset, config: &TrainConfig) -> Result<ModelBundle, TrainError> {
    if dataset.is_empty() {
        return Err(TrainError::EmptyDataset);
    }
    let [ham, spam] = dataset.counts();
    if spam == 0 {
        return Err(TrainError::SingleClass { label: Label::Ham });
    }
    if ham == 0 {
        return Err(TrainError::SingleClass { label: Label::Spam });
    }

    let analyzer = Analyzer::new(config.analyzer.clone());
    let docs: Vec<Vec<String>> = dataset.iter().map(|s| analyzer.normalize(&s.text)).collect();

    let vectorizer = Vectorizer::fit(config.vectorizer, &docs);
    if vectorizer.vocabulary().is_empty() {
        return Err(TrainError::EmptyVocabulary);
    }

    let rows: Vec<FeatureVector> = docs.iter().map(|d| vectorizer.transform(d)).collect();
    let labels: Vec<Label> = dataset.iter().map(|s| s.label).collect();
    let model = NaiveBayes::fit(vectorizer.dim(), &rows, &labels, config.alpha);

    let summary = TrainingSummary {
        samples: dataset.len() as u32,
        spam,
        ham,
    };

    info!(
        samples = summary.samples,
        spam,
        ham,
        terms = vectorizer.dim(),
        weighting = %vectorizer.weighting(),
        reduction = %config.analyzer.reduction,
        "trained model"
    );

    Ok(ModelBundle::new(config.analyzer.clone(), vectorizer, model, summary))
}

/// Binary confusion counts, spam being the positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Confusion {
    /// Spam predicted as spam.
    pub true_positives: u32,
    /// Ham predicted as spam.
    pub false_positives: u32,
    /// Ham predicted as ham.
    pub true_negatives: u32,
    /// Spam predicted as ham.
    pub false_negatives: u32,
}

impl Confusion {
    /// Counts one prediction.
    pub fn record(&mut self, actual: Label, predicted: Label) {
        let slot = match (actual, predicted) {
            (Label::Spam, Label::Spam) => &mut self.true_positives,
            (Label::Ham, Label::Spam) => &mut self.false_positives,
            (Label::Ham, Label::Ham) => &mut self.true_negatives,
            (Label::Spam, Label::Ham) => &mut self.false_negatives,
        };
        *slot += 1;
    }

    /// Number of predictions recorded.
    pub fn total(&self) -> u32 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

/// Classifier quality on a labelled set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Evaluation {
    /// Raw counts.
    pub confusion: Confusion,
}

fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl Evaluation {
    /// Samples scored.
    pub fn total(&self) -> u32 {
        self.confusion.total()
    }

    /// Fraction of correct predictions.
    pub fn accuracy(&self) -> f64 {
        let c = &self.confusion;
        ratio(c.true_positives + c.true_negatives, c.total())
    }

    /// Fraction of spam predictions that were spam.
    pub fn precision(&self) -> f64 {
        let c = &self.confusion;
        ratio(c.true_positives, c.true_positives + c.false_positives)
    }

    /// Fraction of spam that was caught.
    pub fn recall(&self) -> f64 {
        let c = &self.confusion;
        ratio(c.true_positives, c.true_positives + c.false_negatives)
    }

    /// Harmonic mean of precision and recall.
    pub fn f1(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.confusion;
        writeln!(f, "samples:   {}", self.total())?;
        writeln!(f, "accuracy:  {:.4}", self.accuracy())?;
        writeln!(f, "precision: {:.4}", self.precision())?;
        writeln!(f, "recall:    {:.4}", self.recall())?;
        writeln!(f, "f1:        {:.4}", self.f1())?;
        write!(
            f,
            "confusion: tp={} fp={} tn={} fn={}",
            c.true_positives, c.false_positives, c.true_negatives, c.false_negatives
        )
    }
}

/// Scores `classifier` against every sample. Blank samples are skipped.
pub fn evaluate(classifier: &SpamClassifier, dataset: &Dataset) -> Result<Evaluation, ClassifyError> {
    let mut confusion = Confusion::default();
    for sample in dataset {
        match classifier.predict(&sample.text) {
            Ok(predicted) => confusion.record(sample.label, predicted),
            Err(ClassifyError::EmptyInput) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(Evaluation { confusion })
}
