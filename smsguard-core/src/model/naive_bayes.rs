//! Multinomial Naive Bayes over sparse feature rows.
//!
//! Fitting accumulates per-class feature mass and smooths it additively:
//!
//! ```text
//! log P(c)     = ln(N_c / N)
//! log P(j | c) = ln(F_cj + α) - ln(Σ_j F_cj + α · dim)
//! ```
//!
//! Scoring sums `x_j · log P(j | c)` over the row's non-zero entries and
//! normalizes the two joint log-likelihoods with log-sum-exp.

use serde::{Deserialize, Serialize};
use smsguard_types::Label;

use super::vectorizer::FeatureVector;

/// Default additive smoothing (Laplace).
pub const DEFAULT_ALPHA: f64 = 1.0;

/// Smallest smoothing value accepted; lower values are clamped.
pub const MIN_ALPHA: f64 = 1e-10;

/// Fitted two-class multinomial Naive Bayes model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NaiveBayes {
    alpha: f64,
    class_count: [u32; 2],
    class_log_prior: [f64; 2],
    pub(crate) feature_log_prob: [Vec<f64>; 2],
}

impl NaiveBayes {
    /// Fits the model on rows of dimension `dim` and their labels.
    ///
    /// `rows` and `labels` are zipped; extra items on either side are
    /// ignored. A class with no samples gets a prior of `-inf` and is never
    /// predicted.
    pub fn fit(dim: usize, rows: &[FeatureVector], labels: &[Label], alpha: f64) -> Self {
        let alpha = if alpha.is_finite() && alpha > MIN_ALPHA {
            alpha
        } else {
            MIN_ALPHA
        };

        let mut class_count = [0u32; 2];
        let mut feature_count = [vec![0.0f64; dim], vec![0.0f64; dim]];

        for (row, &label) in rows.iter().zip(labels) {
            let c = label.index();
            class_count[c] += 1;
            for &(column, weight) in row.entries() {
                if let Some(slot) = feature_count[c].get_mut(column as usize) {
                    *slot += weight;
                }
            }
        }

        let total = (class_count[0] + class_count[1]) as f64;
        let class_log_prior = class_count.map(|n| (n as f64 / total).ln());

        let feature_log_prob = feature_count.map(|counts| {
            let denom = (counts.iter().sum::<f64>() + alpha * dim as f64).ln();
            counts
                .into_iter()
                .map(|fc| (fc + alpha).ln() - denom)
                .collect::<Vec<f64>>()
        });

        Self {
            alpha,
            class_count,
            class_log_prior,
            feature_log_prob,
        }
    }

    /// Unnormalized joint log-likelihood per class, indexed by [`Label::index`].
    pub fn predict_log_joint(&self, x: &FeatureVector) -> [f64; 2] {
        let mut jll = self.class_log_prior;
        for (c, score) in jll.iter_mut().enumerate() {
            let log_prob = &self.feature_log_prob[c];
            *score += x
                .entries()
                .iter()
                .filter_map(|&(column, weight)| log_prob.get(column as usize).map(|lp| weight * lp))
                .sum::<f64>();
        }
        jll
    }

    /// Class probabilities, indexed by [`Label::index`]. Always sums to 1.
    pub fn predict_proba(&self, x: &FeatureVector) -> [f64; 2] {
        let jll = self.predict_log_joint(x);
        let max = jll[0].max(jll[1]);
        let lse = max + ((jll[0] - max).exp() + (jll[1] - max).exp()).ln();
        jll.map(|l| (l - lse).exp())
    }

    /// Most likely class. Ties resolve to [`Label::Ham`].
    pub fn predict(&self, x: &FeatureVector) -> Label {
        argmax(self.predict_log_joint(x))
    }

    /// Smoothing used at fit time.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Training samples per class, indexed by [`Label::index`].
    pub fn class_count(&self) -> [u32; 2] {
        self.class_count
    }

    /// Log prior per class, indexed by [`Label::index`].
    pub fn class_log_prior(&self) -> [f64; 2] {
        self.class_log_prior
    }

    /// Per-feature log probabilities of `label`.
    pub fn feature_log_prob(&self, label: Label) -> &[f64] {
        &self.feature_log_prob[label.index()]
    }

    /// Number of features the model was fit on.
    pub fn dim(&self) -> usize {
        self.feature_log_prob[0].len()
    }

    /// Row length per class, indexed by [`Label::index`]. Both equal
    /// [`dim`](Self::dim) for a model produced by [`fit`](Self::fit).
    pub fn dims(&self) -> [usize; 2] {
        [self.feature_log_prob[0].len(), self.feature_log_prob[1].len()]
    }
}

/// Label with the larger score; ham on ties.
#[inline]
pub fn argmax(scores: [f64; 2]) -> Label {
    let spam_wins = scores[Label::Spam.index()] > scores[Label::Ham.index()];
    Label::from_index(usize::from(spam_wins))
}
