//! Пайплайн: проверка -> кодирование -> обучение + предсказание

use std::sync::Arc;

use crate::dataset::ReferenceDataset;
use crate::error::Result;
use crate::models::{RentRegressor, SplitFile, SplitSource};
use crate::preprocessing::FeatureEncoder;
use crate::types::{PredictionResponse, RentRequest};

pub struct RentEstimator<S: SplitSource = SplitFile> {
    dataset: Arc<ReferenceDataset>,
    encoder: FeatureEncoder,
    regressor: RentRegressor<S>,
}

impl<S: SplitSource> RentEstimator<S> {
    pub fn new(dataset: Arc<ReferenceDataset>, encoder: FeatureEncoder, regressor: RentRegressor<S>) -> Self {
        Self {
            dataset,
            encoder,
            regressor,
        }
    }

    pub fn dataset(&self) -> &ReferenceDataset {
        &self.dataset
    }

    pub fn estimate(&self, request: &RentRequest) -> Result<PredictionResponse> {
        let raw = request.validate(&self.dataset)?;
        let encoded = self.encoder.encode(&self.dataset, &raw)?;
        let price = self.regressor.predict(&encoded)?;

        Ok(PredictionResponse {
            price,
            formatted: format_price(price),
            attributes: request.clone(),
        })
    }
}

pub fn format_price(price: f64) -> String {
    format!("R$ {:.2}", price)
}
