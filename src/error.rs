//! Ошибки пайплайна оценки аренды

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RentError {
    /// Файл справочного датасета отсутствует или не читается
    #[error("Reference dataset unavailable: {0}")]
    DatasetUnavailable(String),

    /// Нарушено ограничение на поле запроса
    #[error("Invalid input for `{field}`: {message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    /// Сохраненный train/test split не загружается
    #[error("Train/test split unavailable: {0}")]
    DataUnavailable(String),

    /// Ширина вектора не совпадает с шириной обучающей матрицы
    #[error("Dimension mismatch: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Внутренняя ошибка предобработки (пустая матрица, не обучен и т.п.)
    #[error("Preprocessing error: {0}")]
    Preprocessing(String),

    #[error("Model error: {0}")]
    Model(#[from] linfa::error::Error),
}

impl RentError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        RentError::InvalidInput {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RentError>;
