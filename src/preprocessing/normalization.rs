//! Масштабирование числовых признаков

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};

use crate::error::{RentError, Result};

/// Параметры, выученные на обучающей матрице
#[derive(Debug, Clone)]
struct ColumnStats {
    center: Array1<f64>,
    scale: Array1<f64>,
}

/// z-оценка по колонкам. Разброс считается с ddof = 0,
/// колонка с нулевым разбросом получает scale = 1.
#[derive(Debug, Clone, Default)]
pub struct StandardScaler {
    stats: Option<ColumnStats>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<()> {
        let center = X
            .mean_axis(Axis(0))
            .ok_or_else(|| RentError::Preprocessing("cannot scale a matrix without rows".to_string()))?;
        let scale = X
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s < 1e-10 { 1.0 } else { s });

        self.stats = Some(ColumnStats { center, scale });
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        let stats = self
            .stats
            .as_ref()
            .ok_or_else(|| RentError::Preprocessing("StandardScaler used before fit".to_string()))?;

        if X.ncols() != stats.center.len() {
            return Err(RentError::DimensionMismatch {
                expected: stats.center.len(),
                actual: X.ncols(),
            });
        }

        Ok((X - &stats.center) / &stats.scale)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(X)?;
        self.transform(X)
    }
}
