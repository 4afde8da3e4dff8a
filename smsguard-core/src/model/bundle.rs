//! Persisted model bundle.
//!
//! One file holds everything inference needs: the analyzer configuration,
//! the fitted vectorizer, the Naive Bayes parameters and a fingerprint of the
//! vocabulary they were trained against.
//!
//! ## File layout
//!
//! ```text
//! offset  size  content
//! 0       8     magic "SMSGUARD"
//! 8       4     format version, u32 little-endian
//! 12      ..    bincode payload
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use smsguard_types::{AnalyzerConfig, BundleError, NonLetterMode, Reduction, Weighting};
use tracing::info;

use super::naive_bayes::NaiveBayes;
use super::vectorizer::Vectorizer;

/// Leading bytes of every bundle file.
pub const MAGIC: &[u8; 8] = b"SMSGUARD";

/// Bundle format written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Class balance of the training set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Number of training samples.
    pub samples: u32,
    /// Spam samples.
    pub spam: u32,
    /// Ham samples.
    pub ham: u32,
}

/// Analyzer, vectorizer and model fit together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    fingerprint: u64,
    analyzer: AnalyzerConfig,
    vectorizer: Vectorizer,
    model: NaiveBayes,
    summary: TrainingSummary,
}

impl ModelBundle {
    /// Bundles a fitted pipeline, recording the vocabulary fingerprint.
    pub fn new(
        analyzer: AnalyzerConfig,
        vectorizer: Vectorizer,
        model: NaiveBayes,
        summary: TrainingSummary,
    ) -> Self {
        Self {
            fingerprint: vectorizer.vocabulary().fingerprint(),
            analyzer,
            vectorizer,
            model,
            summary,
        }
    }

    /// Checks that the parts belong together.
    pub fn validate(&self) -> Result<(), BundleError> {
        let found = self.vectorizer.vocabulary().fingerprint();
        if found != self.fingerprint {
            return Err(BundleError::VectorizerMismatch {
                expected: self.fingerprint,
                found,
            });
        }

        let vocabulary = self.vectorizer.dim();
        let [ham, spam] = self.model.dims();
        for model in [ham, spam, self.vectorizer.idf().len()] {
            if model != vocabulary {
                return Err(BundleError::DimensionMismatch { vocabulary, model });
            }
        }
        Ok(())
    }

    /// Writes header and payload to `w`.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), BundleError> {
        w.write_all(MAGIC)?;
        w.write_all(&FORMAT_VERSION.to_le_bytes())?;
        bincode::serialize_into(&mut w, self).map_err(|e| BundleError::Encode(e.to_string()))?;
        w.flush()?;
        Ok(())
    }

    /// Reads and validates a bundle from `r`.
    pub fn read_from<R: Read>(mut r: R) -> Result<Self, BundleError> {
        let mut magic = [0u8; 8];
        read_header(&mut r, &mut magic)?;
        if &magic != MAGIC {
            return Err(BundleError::NotABundle);
        }

        let mut version = [0u8; 4];
        read_header(&mut r, &mut version)?;
        let found = u32::from_le_bytes(version);
        if found != FORMAT_VERSION {
            return Err(BundleError::UnsupportedVersion {
                found,
                expected: FORMAT_VERSION,
            });
        }

        let bundle: Self =
            bincode::deserialize_from(r).map_err(|e| BundleError::Decode(e.to_string()))?;
        bundle.validate()?;
        Ok(bundle)
    }

    /// Writes the bundle to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), BundleError> {
        let path = path.as_ref();
        self.write_to(BufWriter::new(File::create(path)?))?;
        info!(
            path = %path.display(),
            terms = self.vectorizer.dim(),
            fingerprint = %format_args!("{:016x}", self.fingerprint),
            "saved model bundle"
        );
        Ok(())
    }

    /// Loads and validates the bundle at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BundleError> {
        let path = path.as_ref();
        let bundle = Self::read_from(BufReader::new(File::open(path)?))?;
        info!(
            path = %path.display(),
            terms = bundle.vectorizer.dim(),
            samples = bundle.summary.samples,
            "loaded model bundle"
        );
        Ok(bundle)
    }

    /// Analyzer configuration used at training time.
    pub fn analyzer(&self) -> &AnalyzerConfig {
        &self.analyzer
    }

    /// Fitted vectorizer.
    pub fn vectorizer(&self) -> &Vectorizer {
        &self.vectorizer
    }

    /// Fitted model.
    pub fn model(&self) -> &NaiveBayes {
        &self.model
    }

    /// Training set class balance.
    pub fn summary(&self) -> TrainingSummary {
        self.summary
    }

    /// Vocabulary fingerprint recorded at training time.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Format version of this build.
    pub const fn format_version(&self) -> u32 {
        FORMAT_VERSION
    }

    /// Human-readable summary.
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            vocabulary: self.vectorizer.dim(),
            summary: self.summary,
            weighting: self.vectorizer.weighting(),
            reduction: self.analyzer.reduction,
            non_letters: self.analyzer.non_letters,
            alpha: self.model.alpha(),
            fingerprint: self.fingerprint,
        }
    }
}

/// Truncated files are not bundles.
fn read_header<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<(), BundleError> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => BundleError::NotABundle,
        _ => BundleError::Io(e),
    })
}

/// Bundle statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelStats {
    /// Number of features.
    pub vocabulary: usize,
    /// Training set class balance.
    pub summary: TrainingSummary,
    /// Feature weighting.
    pub weighting: Weighting,
    /// Token reduction mode.
    pub reduction: Reduction,
    /// Non-letter handling.
    pub non_letters: NonLetterMode,
    /// Additive smoothing.
    pub alpha: f64,
    /// Vocabulary fingerprint.
    pub fingerprint: u64,
}

impl fmt::Display for ModelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "vocabulary:  {} terms", self.vocabulary)?;
        writeln!(
            f,
            "samples:     {} ({} spam, {} ham)",
            self.summary.samples, self.summary.spam, self.summary.ham
        )?;
        writeln!(f, "weighting:   {}", self.weighting)?;
        writeln!(f, "reduction:   {}", self.reduction)?;
        writeln!(f, "non-letters: {}", self.non_letters)?;
        writeln!(f, "alpha:       {}", self.alpha)?;
        write!(f, "fingerprint: {:016x}", self.fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::naive_bayes::DEFAULT_ALPHA;
    use smsguard_types::{Label, VectorizerConfig};

    fn bundle() -> ModelBundle {
        let docs: Vec<Vec<String>> = ["claim prize cash", "prize win", "coffee later", "home lunch"]
            .iter()
            .map(|d| d.split(' ').map(str::to_owned).collect())
            .collect();
        let labels = [Label::Spam, Label::Spam, Label::Ham, Label::Ham];
        let vectorizer = Vectorizer::fit(VectorizerConfig::default(), &docs);
        let rows: Vec<_> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let model = NaiveBayes::fit(vectorizer.dim(), &rows, &labels, DEFAULT_ALPHA);
        let summary = TrainingSummary {
            samples: 4,
            spam: 2,
            ham: 2,
        };
        ModelBundle::new(AnalyzerConfig::default(), vectorizer, model, summary)
    }

    fn encode(b: &ModelBundle) -> Vec<u8> {
        let mut buf = Vec::new();
        b.write_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn header_layout() {
        let buf = encode(&bundle());
        assert_eq!(&buf[..8], b"SMSGUARD");
        assert_eq!(&buf[8..12], &1u32.to_le_bytes());
    }

    #[test]
    fn round_trip_in_memory() {
        let original = bundle();
        let loaded = ModelBundle::read_from(encode(&original).as_slice()).unwrap();
        assert_eq!(loaded, original);

        let row = loaded.vectorizer().transform(&["prize", "cash"]);
        assert_eq!(
            loaded.model().predict_proba(&row),
            original.model().predict_proba(&original.vectorizer().transform(&["prize", "cash"]))
        );
    }

    #[test]
    fn round_trip_on_disk() {
        let path = std::env::temp_dir().join(format!("smsguard-bundle-{}.bin", std::process::id()));
        let original = bundle();
        original.save(&path).unwrap();
        let loaded = ModelBundle::load(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.unwrap(), original);
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut buf = encode(&bundle());
        buf[0] = b'X';
        assert!(matches!(
            ModelBundle::read_from(buf.as_slice()),
            Err(BundleError::NotABundle)
        ));
        assert!(matches!(
            ModelBundle::read_from(&b"SMS"[..]),
            Err(BundleError::NotABundle)
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut buf = encode(&bundle());
        buf[8..12].copy_from_slice(&7u32.to_le_bytes());
        assert!(matches!(
            ModelBundle::read_from(buf.as_slice()),
            Err(BundleError::UnsupportedVersion { found: 7, expected: 1 })
        ));
    }

    #[test]
    fn tampered_vocabulary_is_rejected() {
        let mut buf = encode(&bundle());
        let at = buf
            .windows(5)
            .position(|w| w == b"prize")
            .expect("term present in payload");
        buf[at + 4] = b'y';

        assert!(matches!(
            ModelBundle::read_from(buf.as_slice()),
            Err(BundleError::VectorizerMismatch { .. })
        ));
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let mut b = bundle();
        b.model = NaiveBayes::fit(b.vectorizer.dim() + 1, &[], &[], DEFAULT_ALPHA);
        assert!(matches!(
            b.validate(),
            Err(BundleError::DimensionMismatch { model, vocabulary }) if model == vocabulary + 1
        ));
    }

    #[test]
    fn short_class_row_is_rejected() {
        for label in [Label::Spam, Label::Ham] {
            let mut b = bundle();
            b.model.feature_log_prob[label.index()].truncate(5);
            assert!(matches!(
                b.validate(),
                Err(BundleError::DimensionMismatch { model: 5, vocabulary: 8 })
            ));
        }
    }

    #[test]
    fn short_class_row_fails_to_load() {
        let mut b = bundle();
        b.model.feature_log_prob[Label::Spam.index()].pop();
        assert!(matches!(
            ModelBundle::read_from(encode(&b).as_slice()),
            Err(BundleError::DimensionMismatch { model: 7, vocabulary: 8 })
        ));
    }

    #[test]
    fn truncated_payload_fails_to_decode() {
        let buf = encode(&bundle());
        assert!(matches!(
            ModelBundle::read_from(&buf[..20]),
            Err(BundleError::Decode(_))
        ));
    }

    #[test]
    fn stats_display() {
        let stats = bundle().stats();
        assert_eq!(stats.vocabulary, 8);
        let text = stats.to_string();
        assert!(text.contains("8 terms"));
        assert!(text.contains("4 (2 spam, 2 ham)"));
        assert!(text.contains("tfidf"));
    }
}
