//! Random Forest - bagged CART classifier
//!
//! Each tree is grown on a bootstrap sample with Gini impurity, examining a
//! random subset of features per split. Prediction averages the per-tree
//! class distributions and picks the most probable class; ties go to the
//! lowest class label.
//!
//! Trees are fit in parallel. Every tree draws from its own RNG seeded from
//! the forest seed, so the same data and seed always produce the same forest
//! regardless of thread scheduling.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::classifier::{check_input, Classifier, ModelError};
use super::label::Label;
use crate::constants::{DEFAULT_SEED, DEFAULT_TREES};

// ============================================================================
// PARAMETERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Depth limit, `None` grows until leaves are pure
    pub max_depth: Option<usize>,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
    /// Candidate features per split, `None` means sqrt(n_features)
    pub max_features: Option<usize>,
    /// Sample rows with replacement for each tree
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: DEFAULT_TREES,
            max_depth: None,
            min_samples_split: 2,
            max_features: None,
            bootstrap: true,
            seed: DEFAULT_SEED,
        }
    }
}

impl ForestParams {
    pub fn with_trees(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn resolve_max_features(&self, n_features: usize) -> usize {
        let sqrt = (n_features as f64).sqrt().floor() as usize;
        self.max_features
            .unwrap_or(sqrt)
            .clamp(1, n_features.max(1))
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// `value <= threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Class frequencies, indexed like `RandomForest::classes`
    Leaf { distribution: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn fit(
        x: &Array2<f64>,
        y: &[usize],
        n_classes: usize,
        params: &ForestParams,
        max_features: usize,
        sample: Vec<usize>,
        rng: StdRng,
    ) -> Self {
        let mut builder = TreeBuilder {
            x,
            y,
            n_classes,
            max_features,
            min_samples_split: params.min_samples_split.max(2),
            max_depth: params.max_depth,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(sample);
        Self {
            nodes: builder.nodes,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Leaf distribution reached by `row`. Caller guarantees the row length.
    fn distribution(&self, row: &[f64]) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { distribution } => return distribution,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Structural checks for trees that came from disk
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::InvalidInput("tree has no nodes".to_string()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    // Children are always appended after their parent
                    if *feature >= n_features
                        || *left <= i
                        || *right <= i
                        || *left >= self.nodes.len()
                        || *right >= self.nodes.len()
                    {
                        return Err(ModelError::InvalidInput(format!(
                            "tree node {} references an invalid feature or child",
                            i
                        )));
                    }
                }
                TreeNode::Leaf { distribution } => {
                    if distribution.len() != n_classes {
                        return Err(ModelError::InvalidInput(format!(
                            "tree leaf {} has {} classes, expected {}",
                            i,
                            distribution.len(),
                            n_classes
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// Sample-weighted Gini impurity of the two children (lower is better)
    impurity: f64,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    n_classes: usize,
    max_features: usize,
    min_samples_split: usize,
    max_depth: Option<usize>,
    rng: StdRng,
    nodes: Vec<TreeNode>,
}

/// Which child slot of a split a pending node fills
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// A node still to be grown
struct Pending {
    rows: Vec<usize>,
    depth: usize,
    parent: Option<(usize, Side)>,
}

impl TreeBuilder<'_> {
    /// Grows the tree from an explicit work stack, so depth is bounded by
    /// heap rather than the worker thread's stack. Nodes are numbered in
    /// pre-order (left subtree first), children always after their parent.
    fn grow(&mut self, rows: Vec<usize>) {
        let mut stack = vec![Pending {
            rows,
            depth: 0,
            parent: None,
        }];

        while let Some(Pending { rows, depth, parent }) = stack.pop() {
            let counts = self.class_counts(&rows);
            let node = self.nodes.len();
            self.nodes.push(TreeNode::Leaf {
                distribution: normalize(&counts),
            });
            if let Some((parent, side)) = parent {
                self.attach(parent, side, node);
            }

            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let too_deep = self.max_depth.is_some_and(|d| depth >= d);
            if pure || too_deep || rows.len() < self.min_samples_split {
                continue;
            }

            let Some(split) = self.best_split(&rows, &counts) else {
                continue;
            };

            let x = self.x;
            let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                .iter()
                .partition(|&&i| x[[i, split.feature]] <= split.threshold);

            // Child indices are patched in once the children are pushed
            self.nodes[node] = TreeNode::Split {
                feature: split.feature,
                threshold: split.threshold,
                left: node,
                right: node,
            };
            stack.push(Pending {
                rows: right_rows,
                depth: depth + 1,
                parent: Some((node, Side::Right)),
            });
            stack.push(Pending {
                rows: left_rows,
                depth: depth + 1,
                parent: Some((node, Side::Left)),
            });
        }
    }

    fn attach(&mut self, parent: usize, side: Side, child: usize) {
        if let TreeNode::Split { left, right, .. } = &mut self.nodes[parent] {
            match side {
                Side::Left => *left = child,
                Side::Right => *right = child,
            }
        }
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    /// Keeps drawing features past `max_features` until at least one valid
    /// split has been found, so constant features never force a leaf early.
    fn best_split(&mut self, indices: &[usize], counts: &[usize]) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(&mut self.rng);

        let total = indices.len();
        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, usize)> = Vec::with_capacity(total);

        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }

            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (self.x[[i, feature]], self.y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left = vec![0usize; self.n_classes];
            let mut right = counts.to_vec();

            for k in 0..total - 1 {
                let class = pairs[k].1;
                left[class] += 1;
                right[class] -= 1;

                let (value, next) = (pairs[k].0, pairs[k + 1].0);
                if value == next {
                    continue;
                }

                let n_left = k + 1;
                let n_right = total - n_left;
                let impurity =
                    n_left as f64 * gini(&left, n_left) + n_right as f64 * gini(&right, n_right);

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: midpoint(value, next),
                        impurity,
                    });
                }
            }
        }

        best
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

fn midpoint(low: f64, high: f64) -> f64 {
    let mid = low + (high - low) / 2.0;
    // Adjacent floats can round the midpoint up onto `high`
    if mid >= high {
        low
    } else {
        mid
    }
}

fn normalize(counts: &[usize]) -> Vec<f64> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return vec![0.0; counts.len()];
    }
    counts.iter().map(|&c| c as f64 / total as f64).collect()
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_features: usize,
    /// Sorted distinct raw labels seen during fit
    classes: Vec<i64>,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on rows of `x` with raw labels `y`
    pub fn fit(x: &Array2<f64>, y: &[i64], params: ForestParams) -> Result<Self, ModelError> {
        let (n_samples, n_features) = x.dim();

        if n_samples == 0 || n_features == 0 {
            return Err(ModelError::Training("empty training set".to_string()));
        }
        if n_samples != y.len() {
            return Err(ModelError::Training(format!(
                "{} feature rows but {} labels",
                n_samples,
                y.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(ModelError::Training("n_estimators must be at least 1".to_string()));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidInput(
                "training matrix contains non-finite values".to_string(),
            ));
        }

        let mut classes = y.to_vec();
        classes.sort_unstable();
        classes.dedup();
        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.partition_point(|c| c < label))
            .collect();

        let max_features = params.resolve_max_features(n_features);
        let mut seeder = StdRng::seed_from_u64(params.seed);
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| seeder.gen()).collect();

        log::info!(
            "Fitting random forest: {} trees, {} samples, {} features ({} per split)",
            params.n_estimators,
            n_samples,
            n_features,
            max_features
        );

        let n_classes = classes.len();
        let trees: Vec<DecisionTree> = seeds
            .into_par_iter()
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let sample: Vec<usize> = if params.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                DecisionTree::fit(x, &encoded, n_classes, &params, max_features, sample, rng)
            })
            .collect();

        let nodes: usize = trees.iter().map(DecisionTree::node_count).sum();
        log::debug!("Random forest grown: {} nodes total", nodes);

        Ok(Self {
            params,
            n_features,
            classes,
            trees,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean class distribution across trees, indexed like `classes()`
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_input(self.n_features, row)?;

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.distribution(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len().max(1) as f64;
        proba.iter_mut().for_each(|p| *p /= n);
        Ok(proba)
    }

    /// Most probable raw label for one row
    pub fn predict_raw(&self, row: &[f64]) -> Result<i64, ModelError> {
        let proba = self.predict_proba(row)?;
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        self.classes
            .get(best)
            .copied()
            .ok_or_else(|| ModelError::InvalidInput("forest has no classes".to_string()))
    }

    /// Raw labels for every row of `x`
    pub fn predict_batch(&self, x: &Array2<f64>) -> Result<Vec<i64>, ModelError> {
        x.outer_iter()
            .map(|row| self.predict_raw(&row.to_vec()))
            .collect()
    }

    /// Structural checks for forests that came from disk
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() || self.classes.is_empty() || self.n_features == 0 {
            return Err(ModelError::InvalidInput("forest is empty".to_string()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features, self.classes.len())?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn feature_count(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<Label, ModelError> {
        self.predict_raw(features).map(Label::from_raw)
    }
}

// ============================================================================
// TESTS
// ============================================================================
