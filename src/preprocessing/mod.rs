/// Модуль предобработки данных

pub mod encoder;
pub mod imputation;
pub mod normalization;
pub mod one_hot;

pub use encoder::FeatureEncoder;
pub use imputation::{MeanImputer, MostFrequentImputer};
pub use normalization::StandardScaler;
pub use one_hot::OneHotEncoder;
