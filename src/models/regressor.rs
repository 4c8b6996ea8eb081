//! Модель оценки аренды
//!
//! Каждый вызов predict заново загружает split и обучает новый лес,
//! обученная модель не кэшируется между запросами.

use linfa::traits::Fit;
use linfa::Dataset;
use ndarray::Array2;

use crate::error::{RentError, Result};
use crate::models::forest::{ForestParams, RandomForestRegressor};
use crate::models::split::{SplitFile, SplitSource};

pub struct RentRegressor<S: SplitSource = SplitFile> {
    source: S,
    params: ForestParams,
}

impl<S: SplitSource> RentRegressor<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            params: ForestParams::new(),
        }
    }

    pub fn with_params(mut self, params: ForestParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_random_state(mut self, seed: Option<u64>) -> Self {
        self.params = self.params.with_random_state(seed);
        self
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Загрузка split и обучение нового леса
    pub fn fit(&self) -> Result<RandomForestRegressor> {
        let split = self.source.load_split()?;
        let (x_test, y_test) = (split.x_test, split.y_test);
        let dataset = Dataset::new(split.x_train, split.y_train);

        let model = self.params.fit(&dataset)?;

        // Оценка качества на отложенной части (для логирования)
        if x_test.nrows() > 0 {
            let predictions = model.predict(&x_test)?;
            let mae = (predictions - &y_test).mapv(f64::abs).mean().unwrap_or(0.0);
            tracing::info!("Rent model trained. Test MAE: {:.2}", mae);
        }

        Ok(model)
    }

    /// Предсказание для одной закодированной строки (1 x D)
    pub fn predict(&self, encoded: &Array2<f64>) -> Result<f64> {
        if encoded.nrows() != 1 {
            return Err(RentError::Preprocessing(format!(
                "expected a single encoded row, got {}",
                encoded.nrows()
            )));
        }

        let model = self.fit()?;
        let prediction = model.predict(encoded)?[0];

        tracing::info!("Predicted rent: {:.2}", prediction);
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::split::TrainTestSplit;
    use ndarray::array;

    fn split() -> TrainTestSplit {
        TrainTestSplit {
            x_train: array![
                [-1.0, 0.0, 1.0],
                [-0.5, 1.0, 0.0],
                [0.0, 0.0, 1.0],
                [0.5, 1.0, 0.0],
                [1.0, 0.0, 1.0],
            ],
            x_test: array![[0.25, 1.0, 0.0]],
            y_train: array![1200.0, 1800.0, 2500.0, 3100.0, 4000.0],
            y_test: array![2900.0],
        }
    }

    #[test]
    fn test_prediction_is_finite_and_non_negative() {
        let regressor = RentRegressor::new(split()).with_random_state(Some(3));
        let price = regressor.predict(&array![[0.2, 1.0, 0.0]]).unwrap();

        assert!(price.is_finite());
        assert!((1200.0..=4000.0).contains(&price));
    }

    #[test]
    fn test_default_hyperparameters() {
        let regressor = RentRegressor::new(split());
        let params = regressor.params();

        assert_eq!(params.n_estimators, 200);
        assert_eq!(params.max_depth, None);
        assert_eq!(params.min_samples_split, 2);
        assert_eq!(params.min_samples_leaf, 1);
        assert!(!params.bootstrap);
        assert_eq!(regressor.fit().unwrap().n_trees(), 200);
    }

    #[test]
    fn test_width_mismatch_is_reported() {
        let regressor = RentRegressor::new(split());
        let err = regressor.predict(&array![[0.2, 1.0]]).unwrap_err();
        assert!(matches!(err, RentError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn test_missing_split_is_data_unavailable() {
        let regressor = RentRegressor::new(SplitFile::new("/nonexistent/base_treino_teste.json"));
        let err = regressor.predict(&array![[0.0, 0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, RentError::DataUnavailable(_)));
    }

    #[test]
    fn test_rejects_multiple_rows() {
        let regressor = RentRegressor::new(split());
        assert!(regressor.predict(&array![[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]]).is_err());
    }
}
