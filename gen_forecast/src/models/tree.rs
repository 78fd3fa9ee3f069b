//! Histogram regression trees used by the boosting ensemble

use serde::{Deserialize, Serialize};

/// Bin index reserved for missing (NaN) inputs
const MISSING_BIN: u16 = u16::MAX;

/// Splits with a smaller loss reduction are not worth a node
const MIN_GAIN_TO_SPLIT: f64 = 1e-12;

/// Regression tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with prediction value
    Leaf { value: f64, n_samples: usize },
    /// Internal node; `x <= threshold` goes left, NaN follows `missing_left`
    Split {
        feature_idx: usize,
        threshold: f64,
        missing_left: bool,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
    },
}

impl TreeNode {
    /// Route one dense feature vector to its leaf value
    ///
    /// `None` when a split refers to a feature `x` does not have.
    pub fn predict(&self, x: &[f64]) -> Option<f64> {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { value, .. } => return Some(*value),
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    missing_left,
                    left,
                    right,
                    ..
                } => {
                    let value = *x.get(*feature_idx)?;
                    let go_left = if value.is_nan() {
                        *missing_left
                    } else {
                        value <= *threshold
                    };
                    node = if go_left { left.as_ref() } else { right.as_ref() };
                }
            }
        }
    }

    /// Largest feature index referenced by any split
    pub fn max_feature_idx(&self) -> Option<usize> {
        match self {
            TreeNode::Leaf { .. } => None,
            TreeNode::Split {
                feature_idx,
                left,
                right,
                ..
            } => Some(*feature_idx)
                .max(left.max_feature_idx())
                .max(right.max_feature_idx()),
        }
    }
}

/// Per-feature bin edges computed once from the training matrix
#[derive(Debug, Clone)]
pub struct FeatureBinner {
    thresholds: Vec<Vec<f64>>,
}

impl FeatureBinner {
    /// Place at most `max_bins` bins per feature at distinct quantiles
    pub fn fit(matrix: &[Vec<f64>], n_features: usize, max_bins: usize) -> Self {
        let thresholds = (0..n_features)
            .map(|feature| {
                let mut column: Vec<f64> = matrix
                    .iter()
                    .map(|row| row[feature])
                    .filter(|v| !v.is_nan())
                    .collect();
                column.sort_by(|a, b| a.total_cmp(b));
                column.dedup();

                let mut candidates = if column.len() <= max_bins {
                    column
                } else {
                    let last = column.len() - 1;
                    (0..max_bins)
                        .map(|q| column[q * last / (max_bins - 1)])
                        .collect::<Vec<f64>>()
                };
                candidates.dedup();

                candidates
                    .windows(2)
                    .map(|w| (w[0] + w[1]) / 2.0)
                    .collect()
            })
            .collect();

        Self { thresholds }
    }

    fn n_features(&self) -> usize {
        self.thresholds.len()
    }

    fn n_bins(&self, feature: usize) -> usize {
        self.thresholds[feature].len() + 1
    }

    fn bin(&self, feature: usize, value: f64) -> u16 {
        if value.is_nan() {
            return MISSING_BIN;
        }
        self.thresholds[feature].partition_point(|t| *t < value) as u16
    }

    /// Upper edge of `bin`; the last bin is unbounded
    fn threshold(&self, feature: usize, bin: usize) -> f64 {
        self.thresholds[feature].get(bin).copied().unwrap_or(f64::MAX)
    }

    /// Bin every value of the matrix
    pub fn transform(&self, matrix: &[Vec<f64>]) -> BinnedMatrix {
        let n_features = self.n_features();
        let mut bins = Vec::with_capacity(matrix.len() * n_features);
        for row in matrix {
            for (feature, value) in row.iter().enumerate().take(n_features) {
                bins.push(self.bin(feature, *value));
            }
        }
        BinnedMatrix { n_features, bins }
    }
}

/// Row-major matrix of bin indices
#[derive(Debug, Clone)]
pub struct BinnedMatrix {
    n_features: usize,
    bins: Vec<u16>,
}

impl BinnedMatrix {
    fn get(&self, row: usize, feature: usize) -> u16 {
        self.bins[row * self.n_features + feature]
    }
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub l2_regularization: f64,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: usize,
    missing_left: bool,
    gain: f64,
}

/// Grows one least-squares tree on the current residuals
pub struct TreeBuilder<'a> {
    binner: &'a FeatureBinner,
    binned: &'a BinnedMatrix,
    residuals: &'a [f64],
    params: TreeParams,
    importances: Vec<f64>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        binner: &'a FeatureBinner,
        binned: &'a BinnedMatrix,
        residuals: &'a [f64],
        params: TreeParams,
    ) -> Self {
        Self {
            binner,
            binned,
            residuals,
            params,
            importances: vec![0.0; binner.n_features()],
        }
    }

    /// Grow a tree over the rows in `indices`
    pub fn build(&mut self, indices: &[usize]) -> TreeNode {
        self.grow(indices, 0)
    }

    /// Loss reduction credited to each feature while growing
    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    fn leaf_value(&self, sum: f64, count: usize) -> f64 {
        if count == 0 {
            0.0
        } else {
            sum / (count as f64 + self.params.l2_regularization)
        }
    }

    fn score(&self, sum: f64, count: usize) -> f64 {
        if count == 0 {
            0.0
        } else {
            sum * sum / (count as f64 + self.params.l2_regularization)
        }
    }

    fn grow(&mut self, indices: &[usize], depth: usize) -> TreeNode {
        let n_samples = indices.len();
        let sum: f64 = indices.iter().map(|&i| self.residuals[i]).sum();
        let leaf = TreeNode::Leaf {
            value: self.leaf_value(sum, n_samples),
            n_samples,
        };

        if depth >= self.params.max_depth || n_samples < 2 * self.params.min_samples_leaf {
            return leaf;
        }
        let Some(best) = self.best_split(indices, sum) else {
            return leaf;
        };

        self.importances[best.feature] += best.gain;
        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| {
                let bin = self.binned.get(i, best.feature);
                if bin == MISSING_BIN {
                    best.missing_left
                } else {
                    bin as usize <= best.bin
                }
            });

        let left = Box::new(self.grow(&left_indices, depth + 1));
        let right = Box::new(self.grow(&right_indices, depth + 1));

        TreeNode::Split {
            feature_idx: best.feature,
            threshold: self.binner.threshold(best.feature, best.bin),
            missing_left: best.missing_left,
            left,
            right,
            n_samples,
        }
    }

    fn best_split(&self, indices: &[usize], total_sum: f64) -> Option<SplitCandidate> {
        let n_samples = indices.len();
        let parent_score = self.score(total_sum, n_samples);
        let min_leaf = self.params.min_samples_leaf;
        let mut best: Option<SplitCandidate> = None;

        for feature in 0..self.binner.n_features() {
            let n_bins = self.binner.n_bins(feature);
            if n_bins < 2 {
                continue;
            }

            let mut sums = vec![0.0; n_bins];
            let mut counts = vec![0usize; n_bins];
            let mut missing_sum = 0.0;
            let mut missing_count = 0usize;
            for &i in indices {
                let bin = self.binned.get(i, feature);
                if bin == MISSING_BIN {
                    missing_sum += self.residuals[i];
                    missing_count += 1;
                } else {
                    sums[bin as usize] += self.residuals[i];
                    counts[bin as usize] += 1;
                }
            }

            let observed_sum = total_sum - missing_sum;
            let observed_count = n_samples - missing_count;
            let mut left_sum = 0.0;
            let mut left_count = 0usize;

            for bin in 0..n_bins - 1 {
                left_sum += sums[bin];
                left_count += counts[bin];
                let right_sum = observed_sum - left_sum;
                let right_count = observed_count - left_count;

                // Without missing values here, unseen NaNs follow the larger child
                let directions = if missing_count > 0 {
                    [Some(true), Some(false)]
                } else {
                    [Some(left_count >= right_count), None]
                };

                for missing_left in directions.into_iter().flatten() {
                    let (ls, lc, rs, rc) = if missing_left {
                        (left_sum + missing_sum, left_count + missing_count, right_sum, right_count)
                    } else {
                        (left_sum, left_count, right_sum + missing_sum, right_count + missing_count)
                    };
                    if lc < min_leaf || rc < min_leaf {
                        continue;
                    }

                    let gain = self.score(ls, lc) + self.score(rs, rc) - parent_score;
                    if gain > MIN_GAIN_TO_SPLIT && best.map_or(true, |b| gain > b.gain) {
                        best = Some(SplitCandidate {
                            feature,
                            bin,
                            missing_left,
                            gain,
                        });
                    }
                }
            }

            // Observed values on one side, missing values on the other
            if missing_count >= min_leaf && observed_count >= min_leaf {
                let gain = self.score(observed_sum, observed_count)
                    + self.score(missing_sum, missing_count)
                    - parent_score;
                if gain > MIN_GAIN_TO_SPLIT && best.map_or(true, |b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        bin: n_bins - 1,
                        missing_left: false,
                        gain,
                    });
                }
            }
        }

        best
    }
}
