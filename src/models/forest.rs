//! Случайный лес для регрессии

#![allow(non_snake_case)]

use std::cmp::Ordering;

use linfa::traits::Fit;
use linfa::DatasetBase;
use ndarray::{Array1, Array2, ArrayView1};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::{RentError, Result};

/// Сколько признаков рассматривать при каждом разбиении
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// floor(sqrt(n_features)), минимум 1
    Sqrt,
    Fixed(usize),
    All,
}

/// Гиперпараметры леса
#[derive(Debug, Clone)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub random_state: Option<u64>,
}

impl ForestParams {
    /// 200 деревьев, без ограничения глубины, sqrt признаков, без bootstrap
    pub fn new() -> Self {
        Self {
            n_estimators: 200,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: false,
            random_state: None,
        }
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    pub fn with_bootstrap(mut self, bootstrap: bool) -> Self {
        self.bootstrap = bootstrap;
        self
    }

    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.random_state = seed;
        self
    }

    pub fn features_per_split(&self, n_features: usize) -> usize {
        match self.max_features {
            MaxFeatures::Sqrt => (n_features as f64).sqrt().floor() as usize,
            MaxFeatures::Fixed(n) => n.min(n_features),
            MaxFeatures::All => n_features,
        }
        .max(1)
    }

    fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(linfa::error::Error::Parameters("n_estimators must be positive".to_string()).into());
        }
        if self.min_samples_split < 2 {
            return Err(linfa::error::Error::Parameters("min_samples_split must be at least 2".to_string()).into());
        }
        if self.min_samples_leaf == 0 {
            return Err(linfa::error::Error::Parameters("min_samples_leaf must be at least 1".to_string()).into());
        }
        Ok(())
    }
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::new()
    }
}

enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, sample: &ArrayView1<f64>) -> f64 {
        match self {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] <= *threshold {
                    left.predict(sample)
                } else {
                    right.predict(sample)
                }
            }
        }
    }

    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Построение одного дерева (критерий - сумма квадратов отклонений)
struct TreeBuilder<'a> {
    X: &'a Array2<f64>,
    y: &'a Array1<f64>,
    params: &'a ForestParams,
    max_features: usize,
}

impl<'a> TreeBuilder<'a> {
    fn build(&self, indices: Vec<usize>, depth: usize, rng: &mut StdRng) -> TreeNode {
        let n_samples = indices.len();
        let mean = indices.iter().map(|&i| self.y[i]).sum::<f64>() / n_samples as f64;

        let depth_reached = self.params.max_depth.map_or(false, |d| depth >= d);
        if depth_reached
            || n_samples < self.params.min_samples_split
            || n_samples < 2 * self.params.min_samples_leaf
            || self.is_pure(&indices)
        {
            return TreeNode::Leaf { value: mean };
        }

        // Признаки в случайном порядке: первые max_features обязательны,
        // дальше смотрим только если разбиение еще не найдено
        let mut features: Vec<usize> = (0..self.X.ncols()).collect();
        features.shuffle(rng);

        let mut best: Option<(usize, f64, f64)> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.max_features && best.is_some() {
                break;
            }
            if let Some((threshold, sse)) = self.best_threshold(feature, &indices) {
                if best.map_or(true, |(_, _, best_sse)| sse < best_sse) {
                    best = Some((feature, threshold, sse));
                }
            }
        }

        let Some((feature, threshold, _)) = best else {
            return TreeNode::Leaf { value: mean };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.X[[i, feature]] <= threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build(left_indices, depth + 1, rng)),
            right: Box::new(self.build(right_indices, depth + 1, rng)),
        }
    }

    fn is_pure(&self, indices: &[usize]) -> bool {
        indices.windows(2).all(|w| self.y[w[0]] == self.y[w[1]])
    }

    /// Лучший порог по одному признаку: (порог, SSE детей)
    fn best_threshold(&self, feature: usize, indices: &[usize]) -> Option<(f64, f64)> {
        let mut values: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (self.X[[i, feature]], self.y[i]))
            .collect();
        values.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

        let n = values.len();
        let total_sum: f64 = values.iter().map(|(_, y)| y).sum();
        let total_sq: f64 = values.iter().map(|(_, y)| y * y).sum();
        let min_leaf = self.params.min_samples_leaf;

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        let mut best: Option<(f64, f64)> = None;

        for p in 1..n {
            let (x_prev, y_prev) = values[p - 1];
            left_sum += y_prev;
            left_sq += y_prev * y_prev;

            let x_next = values[p].0;
            if x_next <= x_prev {
                continue;
            }
            let (n_left, n_right) = (p, n - p);
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / n_left as f64)
                + (right_sq - right_sum * right_sum / n_right as f64);

            if best.map_or(true, |(_, best_sse)| sse < best_sse) {
                let mut threshold = (x_prev + x_next) / 2.0;
                if threshold >= x_next {
                    threshold = x_prev;
                }
                best = Some((threshold, sse));
            }
        }

        best
    }
}

/// Обученный лес: предсказание - среднее по деревьям
pub struct RandomForestRegressor {
    trees: Vec<TreeNode>,
    n_features: usize,
}

impl RandomForestRegressor {
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(TreeNode::depth).max().unwrap_or(0)
    }

    pub fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>> {
        if X.ncols() != self.n_features {
            return Err(RentError::DimensionMismatch {
                expected: self.n_features,
                actual: X.ncols(),
            });
        }

        let n_trees = self.trees.len() as f64;
        let predictions = X
            .rows()
            .into_iter()
            .map(|row| self.trees.iter().map(|tree| tree.predict(&row)).sum::<f64>() / n_trees)
            .collect();

        Ok(predictions)
    }
}

impl Fit<Array2<f64>, Array1<f64>, RentError> for ForestParams {
    type Object = RandomForestRegressor;

    fn fit(&self, dataset: &DatasetBase<Array2<f64>, Array1<f64>>) -> Result<Self::Object> {
        self.validate()?;

        let X = &dataset.records;
        let y = &dataset.targets;
        let n_samples = X.nrows();

        if n_samples == 0 {
            return Err(RentError::DataUnavailable("empty training set".to_string()));
        }
        if y.len() != n_samples {
            return Err(RentError::DimensionMismatch {
                expected: n_samples,
                actual: y.len(),
            });
        }

        let mut rng = match self.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let builder = TreeBuilder {
            X,
            y,
            params: self,
            max_features: self.features_per_split(X.ncols()),
        };

        let trees = (0..self.n_estimators)
            .map(|_| {
                let indices: Vec<usize> = if self.bootstrap {
                    (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect()
                } else {
                    (0..n_samples).collect()
                };
                builder.build(indices, 0, &mut rng)
            })
            .collect();

        tracing::info!(
            "Random forest fitted: {} trees, {} samples, {} features",
            self.n_estimators,
            n_samples,
            X.ncols()
        );

        Ok(RandomForestRegressor {
            trees,
            n_features: X.ncols(),
        })
    }
}
