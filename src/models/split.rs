//! Сохраненное разбиение train/test

#![allow(non_snake_case)]

use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::dataset::ReferenceDataset;
use crate::error::{RentError, Result};
use crate::preprocessing::FeatureEncoder;

/// (X_train, X_test, y_train, y_test), признаки в порядке FeatureEncoder
#[derive(Debug, Clone, PartialEq)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub x_test: Array2<f64>,
    pub y_train: Array1<f64>,
    pub y_test: Array1<f64>,
}

/// Формат файла: строки матриц как массивы
#[derive(Debug, Serialize, Deserialize)]
struct SplitFileFormat {
    x_train: Vec<Vec<f64>>,
    x_test: Vec<Vec<f64>>,
    y_train: Vec<f64>,
    y_test: Vec<f64>,
}

impl TrainTestSplit {
    pub fn n_features(&self) -> usize {
        self.x_train.ncols()
    }

    /// Проверка согласованности размеров и целевых значений
    pub fn validate(&self) -> Result<()> {
        if self.x_train.nrows() == 0 {
            return Err(RentError::DataUnavailable("empty training set".to_string()));
        }
        if self.x_train.nrows() != self.y_train.len() || self.x_test.nrows() != self.y_test.len() {
            return Err(RentError::DataUnavailable(
                "feature rows and targets differ in length".to_string(),
            ));
        }
        if self.x_test.nrows() > 0 && self.x_test.ncols() != self.x_train.ncols() {
            return Err(RentError::DataUnavailable(
                "train and test feature widths differ".to_string(),
            ));
        }
        if self.x_train.iter().chain(self.x_test.iter()).any(|v| !v.is_finite()) {
            return Err(RentError::DataUnavailable("non-finite feature value".to_string()));
        }
        if self
            .y_train
            .iter()
            .chain(self.y_test.iter())
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(RentError::DataUnavailable(
                "rent targets must be finite and non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| RentError::DataUnavailable(format!("{}: {}", path.display(), e)))?;
        let format: SplitFileFormat = serde_json::from_reader(std::io::BufReader::new(file))
            .map_err(|e| RentError::DataUnavailable(format!("{}: {}", path.display(), e)))?;

        let split = Self {
            x_train: to_matrix(format.x_train)?,
            x_test: to_matrix(format.x_test)?,
            y_train: Array1::from(format.y_train),
            y_test: Array1::from(format.y_test),
        };
        split.validate()?;
        Ok(split)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = SplitFileFormat {
            x_train: to_rows(&self.x_train),
            x_test: to_rows(&self.x_test),
            y_train: self.y_train.to_vec(),
            y_test: self.y_test.to_vec(),
        };

        let io_error = |e: String| RentError::DataUnavailable(format!("{}: {}", path.display(), e));
        let file = std::fs::File::create(path).map_err(|e| io_error(e.to_string()))?;
        serde_json::to_writer(std::io::BufWriter::new(file), &format).map_err(|e| io_error(e.to_string()))?;

        tracing::info!(
            "Train/test split saved to {}: {} train rows, {} test rows",
            path.display(),
            self.x_train.nrows(),
            self.x_test.nrows()
        );
        Ok(())
    }
}

fn to_matrix(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(RentError::DataUnavailable("ragged feature matrix".to_string()));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, n_cols), flat)
        .map_err(|e| RentError::DataUnavailable(e.to_string()))
}

fn to_rows(X: &Array2<f64>) -> Vec<Vec<f64>> {
    X.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Источник разбиения для RentRegressor
pub trait SplitSource {
    fn load_split(&self) -> Result<TrainTestSplit>;
}

/// Файл на диске, читается заново при каждом обращении
#[derive(Debug, Clone)]
pub struct SplitFile {
    path: PathBuf,
}

impl SplitFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SplitSource for SplitFile {
    fn load_split(&self) -> Result<TrainTestSplit> {
        TrainTestSplit::load(&self.path)
    }
}

impl SplitSource for TrainTestSplit {
    fn load_split(&self) -> Result<TrainTestSplit> {
        self.validate()?;
        Ok(self.clone())
    }
}

/// Офлайн-сборка разбиения из справочного датасета.
/// Кодируются все строки, словарь категорий тот же, что при инференсе.
/// В разбиение попадают только строки с арендой.
pub fn build_split(
    dataset: &ReferenceDataset,
    encoder: &FeatureEncoder,
    test_ratio: f64,
    seed: u64,
) -> Result<TrainTestSplit> {
    if !(test_ratio > 0.0 && test_ratio < 1.0) {
        return Err(RentError::invalid("test_ratio", "must be in (0, 1)"));
    }

    let labeled: Vec<usize> = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.rent.map_or(false, |v| v.is_finite()))
        .map(|(i, _)| i)
        .collect();
    if labeled.len() < 2 {
        return Err(RentError::DataUnavailable(
            "need at least 2 rows with a rent value".to_string(),
        ));
    }

    let X = encoder.encode_reference(dataset)?;
    let rent = |i: usize| dataset.records()[i].rent.unwrap_or(f64::NAN);

    let mut indices = labeled;
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = ((indices.len() as f64 * test_ratio).round() as usize).clamp(1, indices.len() - 1);
    let (test_idx, train_idx) = indices.split_at(n_test);

    let split = TrainTestSplit {
        x_train: X.select(ndarray::Axis(0), train_idx),
        x_test: X.select(ndarray::Axis(0), test_idx),
        y_train: train_idx.iter().map(|&i| rent(i)).collect(),
        y_test: test_idx.iter().map(|&i| rent(i)).collect(),
    };

    tracing::info!(
        "Built train/test split: {} train rows, {} test rows, {} features",
        split.x_train.nrows(),
        split.x_test.nrows(),
        split.n_features()
    );
    Ok(split)
}
