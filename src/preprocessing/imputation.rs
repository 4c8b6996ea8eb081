//! Заполнение пропусков

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};
use std::collections::HashMap;

use crate::error::{RentError, Result};

/// Пропуски в числовой матрице (NaN) заменяются средним по колонке
pub struct MeanImputer {
    means: Option<Array1<f64>>,
}

impl MeanImputer {
    pub fn new() -> Self {
        Self { means: None }
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
        if X.nrows() == 0 {
            return Err(RentError::Preprocessing("Empty dataset".to_string()));
        }

        let means: Array1<f64> = X
            .columns()
            .into_iter()
            .map(|col| {
                let (sum, count) = col
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                // Колонка целиком из пропусков заполняется нулем
                if count == 0 {
                    0.0
                } else {
                    sum / count as f64
                }
            })
            .collect();

        self.means = Some(means);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let means = self
            .means
            .as_ref()
            .ok_or_else(|| RentError::Preprocessing("Imputer not fitted".to_string()))?;

        let mut filled = X.clone();
        for mut row in filled.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                if !val.is_finite() {
                    *val = means[i];
                }
            }
        }
        Ok(filled)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }
}

impl Default for MeanImputer {
    fn default() -> Self {
        Self::new()
    }
}

/// Пропуски в категориальной колонке заменяются самым частым значением.
/// При равенстве частот берется лексикографически меньшее.
#[derive(Default)]
pub struct MostFrequentImputer {
    fill: Option<String>,
}

impl MostFrequentImputer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, values: &[Option<&str>]) {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for value in values.iter().flatten() {
            *counts.entry(*value).or_insert(0) += 1;
        }

        self.fill = counts
            .into_iter()
            .max_by(|(a, ca), (b, cb)| ca.cmp(cb).then_with(|| b.cmp(a)))
            .map(|(value, _)| value.to_string());
    }

    pub fn fill_value(&self) -> Option<&str> {
        self.fill.as_deref()
    }

    pub fn transform<'a>(&'a self, values: &[Option<&'a str>]) -> Vec<Option<&'a str>> {
        values
            .iter()
            .map(|&v| v.or(self.fill.as_deref()))
            .collect()
    }
}
