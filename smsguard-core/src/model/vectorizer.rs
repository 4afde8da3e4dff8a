//! Bag-of-words feature extraction.
//!
//! [`Vectorizer::fit`] learns a sorted [`Vocabulary`] and per-term document
//! frequencies from analyzed training messages. [`Vectorizer::transform`] maps
//! one analyzed message to a sparse [`FeatureVector`] over that vocabulary.
//!
//! ## TF-IDF
//!
//! ```text
//! idf(t)   = ln((1 + n) / (1 + df(t))) + 1
//! w(t, d)  = count(t, d) * idf(t)
//! row      = w / ||w||₂
//! ```
//!
//! The `+ 1` smoothing acts as if one extra document contained every term,
//! so no idf is ever zero or infinite.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use smsguard_types::{VectorizerConfig, Weighting};
use xxhash_rust::xxh3::Xxh3;

/// Tokens shorter than this are never features.
pub const MIN_TERM_LEN: usize = 2;

/// Term to column mapping. Terms are stored in ascending byte order, so a
/// term's column is its rank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    terms: Vec<String>,
    index: FxHashMap<String, u32>,
}

impl From<Vec<String>> for Vocabulary {
    fn from(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, t)| (t.clone(), i as u32))
            .collect();
        Self { terms, index }
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocabulary: Vocabulary) -> Self {
        vocabulary.terms
    }
}

impl Vocabulary {
    /// Builds a vocabulary from arbitrary terms. Terms are sorted and
    /// deduplicated.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut terms: Vec<String> = terms.into_iter().map(Into::into).collect();
        terms.sort_unstable();
        terms.dedup();
        Self::from(terms)
    }

    /// Number of terms.
    #[inline]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns `true` if there are no terms.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Column of `term`, if known.
    #[inline]
    pub fn get(&self, term: &str) -> Option<u32> {
        self.index.get(term).copied()
    }

    /// Term at column `index`.
    pub fn term(&self, index: u32) -> Option<&str> {
        self.terms.get(index as usize).map(String::as_str)
    }

    /// All terms in column order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// XXH3-64 digest of the ordered terms.
    ///
    /// Each term is followed by a NUL byte so `["ab", "c"]` and `["a", "bc"]`
    /// hash differently.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = Xxh3::new();
        for term in &self.terms {
            hasher.update(term.as_bytes());
            hasher.update(&[0]);
        }
        hasher.digest()
    }
}

/// Sparse feature row. Entries are sorted by column and never zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureVector {
    dim: u32,
    entries: SmallVec<[(u32, f64); 16]>,
}

impl FeatureVector {
    /// All-zero vector of dimension `dim`.
    pub fn zeros(dim: u32) -> Self {
        Self {
            dim,
            entries: SmallVec::new(),
        }
    }

    /// Vocabulary size this row was produced against.
    #[inline]
    pub fn dim(&self) -> u32 {
        self.dim
    }

    /// Non-zero `(column, weight)` pairs in column order.
    #[inline]
    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    /// Number of non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no term of the message is in the vocabulary.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Weight at `column` (zero if absent).
    pub fn get(&self, column: u32) -> f64 {
        self.entries
            .binary_search_by_key(&column, |&(c, _)| c)
            .map_or(0.0, |i| self.entries[i].1)
    }

    /// Euclidean norm.
    pub fn l2_norm(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt()
    }
}

/// Fitted vectorizer: vocabulary, idf weights and the weighting scheme.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vectorizer {
    config: VectorizerConfig,
    vocabulary: Vocabulary,
    idf: Vec<f64>,
    documents: u32,
}

impl Vectorizer {
    /// Learns the vocabulary and document frequencies of `docs`.
    ///
    /// Terms must appear in at least `min_df` documents. With `max_features`
    /// set, only the terms with the highest total count are kept (ties broken
    /// by term order). May return an empty vocabulary; callers decide whether
    /// that is an error.
    pub fn fit<S: AsRef<str>>(config: VectorizerConfig, docs: &[Vec<S>]) -> Self {
        let mut df: FxHashMap<&str, u32> = FxHashMap::default();
        let mut total: FxHashMap<&str, u64> = FxHashMap::default();
        let mut seen: FxHashSet<&str> = FxHashSet::default();

        for doc in docs {
            seen.clear();
            for token in doc {
                let token = token.as_ref();
                if token.len() < MIN_TERM_LEN {
                    continue;
                }
                *total.entry(token).or_insert(0) += 1;
                if seen.insert(token) {
                    *df.entry(token).or_insert(0) += 1;
                }
            }
        }

        let min_df = config.min_df.max(1);
        let mut kept: Vec<(&str, u32)> = df.into_iter().filter(|&(_, d)| d >= min_df).collect();

        if let Some(max) = config.max_features {
            let count = |t: &str| total.get(t).copied().unwrap_or(0);
            kept.sort_unstable_by(|a, b| count(b.0).cmp(&count(a.0)).then_with(|| a.0.cmp(b.0)));
            kept.truncate(max as usize);
        }

        kept.sort_unstable_by(|a, b| a.0.cmp(b.0));

        let n = docs.len() as f64;
        let idf = kept
            .iter()
            .map(|&(_, d)| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();
        let vocabulary = Vocabulary::from_terms(kept.iter().map(|&(t, _)| t));

        Self {
            config,
            vocabulary,
            idf,
            documents: docs.len() as u32,
        }
    }

    /// Maps analyzed tokens to a feature row. Unknown and too-short tokens
    /// are ignored; a message with no known term yields [`FeatureVector::zeros`].
    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> FeatureVector {
        let dim = self.vocabulary.len() as u32;

        let mut columns: SmallVec<[u32; 32]> = tokens
            .iter()
            .filter_map(|t| self.vocabulary.get(t.as_ref()))
            .collect();
        if columns.is_empty() {
            return FeatureVector::zeros(dim);
        }
        columns.sort_unstable();

        let mut entries: SmallVec<[(u32, f64); 16]> = SmallVec::new();
        for column in columns {
            match entries.last_mut() {
                Some((c, w)) if *c == column => *w += 1.0,
                _ => entries.push((column, 1.0)),
            }
        }

        if self.config.weighting == Weighting::TfIdf {
            for (column, weight) in entries.iter_mut() {
                *weight *= self.idf[*column as usize];
            }
            let norm = entries.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, weight) in entries.iter_mut() {
                    *weight /= norm;
                }
            }
        }

        FeatureVector { dim, entries }
    }

    /// Options the vectorizer was fit with.
    pub fn config(&self) -> &VectorizerConfig {
        &self.config
    }

    /// Weighting scheme.
    pub fn weighting(&self) -> Weighting {
        self.config.weighting
    }

    /// Fitted vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Inverse document frequency per column.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// Number of training documents seen by [`fit`](Self::fit).
    pub fn documents(&self) -> u32 {
        self.documents
    }

    /// Number of features.
    pub fn dim(&self) -> usize {
        self.vocabulary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(raw: &[&str]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|d| d.split_whitespace().map(str::to_owned).collect())
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn vocabulary_is_sorted() {
        let v = Vectorizer::fit(VectorizerConfig::default(), &docs(&["win cash", "cash prize"]));
        assert_eq!(v.vocabulary().terms(), &["cash", "prize", "win"]);
        assert_eq!(v.vocabulary().get("prize"), Some(1));
        assert_eq!(v.vocabulary().term(2), Some("win"));
        assert_eq!(v.documents(), 2);
    }

    #[test]
    fn short_tokens_are_not_features() {
        let v = Vectorizer::fit(VectorizerConfig::default(), &docs(&["a cash b", "u win"]));
        assert_eq!(v.vocabulary().terms(), &["cash", "win"]);
    }

    #[test]
    fn smoothed_idf() {
        let v = Vectorizer::fit(VectorizerConfig::default(), &docs(&["win cash", "cash prize"]));
        let cash = v.vocabulary().get("cash").unwrap() as usize;
        let win = v.vocabulary().get("win").unwrap() as usize;
        assert!(approx(v.idf()[cash], 1.0));
        assert!(approx(v.idf()[win], (3.0f64 / 2.0).ln() + 1.0));
    }

    #[test]
    fn tfidf_rows_are_unit_length() {
        let v = Vectorizer::fit(
            VectorizerConfig::default(),
            &docs(&["win cash cash", "cash prize", "hello there"]),
        );
        let row = v.transform(&["cash", "cash", "win", "unknown"]);
        assert_eq!(row.nnz(), 2);
        assert!(approx(row.l2_norm(), 1.0));
        let cols: Vec<u32> = row.entries().iter().map(|&(c, _)| c).collect();
        assert!(cols.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn count_weighting_is_raw() {
        let config = VectorizerConfig {
            weighting: Weighting::Count,
            ..VectorizerConfig::default()
        };
        let v = Vectorizer::fit(config, &docs(&["win cash", "cash prize"]));
        let row = v.transform(&["cash", "cash", "win"]);
        assert_eq!(row.get(v.vocabulary().get("cash").unwrap()), 2.0);
        assert_eq!(row.get(v.vocabulary().get("win").unwrap()), 1.0);
        assert_eq!(row.get(v.vocabulary().get("prize").unwrap()), 0.0);
    }

    #[test]
    fn unknown_and_empty_input_is_all_zero() {
        let v = Vectorizer::fit(VectorizerConfig::default(), &docs(&["win cash"]));
        let empty: [&str; 0] = [];
        assert!(v.transform(&empty).is_zero());
        let row = v.transform(&["coffee"]);
        assert!(row.is_zero());
        assert_eq!(row.dim(), 2);
    }

    #[test]
    fn min_df_filters_rare_terms() {
        let config = VectorizerConfig {
            min_df: 2,
            ..VectorizerConfig::default()
        };
        let v = Vectorizer::fit(config, &docs(&["win cash", "cash prize", "cash win"]));
        assert_eq!(v.vocabulary().terms(), &["cash", "win"]);
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let config = VectorizerConfig {
            max_features: Some(2),
            ..VectorizerConfig::default()
        };
        let v = Vectorizer::fit(
            config,
            &docs(&["cash cash prize", "win prize", "cash zebra", "apple"]),
        );
        // cash=3, prize=2, then win/zebra/apple tie at 1
        assert_eq!(v.vocabulary().terms(), &["cash", "prize"]);

        let config = VectorizerConfig {
            max_features: Some(3),
            ..VectorizerConfig::default()
        };
        let v = Vectorizer::fit(
            config,
            &docs(&["cash cash prize", "win prize", "cash zebra", "apple"]),
        );
        assert_eq!(v.vocabulary().terms(), &["apple", "cash", "prize"]);
    }

    #[test]
    fn fitted_vocabulary_matches_sorted_terms() {
        let v = Vectorizer::fit(
            VectorizerConfig::default(),
            &docs(&["win cash now", "cash prize u", "now win"]),
        );
        let expected = Vocabulary::from_terms(["win", "cash", "now", "prize", "now"]);
        assert_eq!(v.vocabulary(), &expected);
        assert_eq!(v.vocabulary().fingerprint(), expected.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_terms() {
        let a = Vocabulary::from_terms(["cash", "win"]);
        let b = Vocabulary::from_terms(["win", "cash", "win"]);
        let c = Vocabulary::from_terms(["cash", "wins"]);
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(
            Vocabulary::from(vec!["ab".to_owned(), "c".to_owned()]).fingerprint(),
            Vocabulary::from(vec!["a".to_owned(), "bc".to_owned()]).fingerprint()
        );
    }

    #[test]
    fn empty_corpus_fits_empty_vocabulary() {
        let v = Vectorizer::fit::<String>(VectorizerConfig::default(), &[]);
        assert!(v.vocabulary().is_empty());
        assert!(v.transform(&["cash"]).is_zero());
    }
}
