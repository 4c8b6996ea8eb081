//! Кодирование записи в вектор признаков для модели
//!
//! Числовые колонки: среднее вместо пропусков + стандартизация.
//! Категориальные: самое частое значение вместо пропусков + one-hot.
//! Статистики считаются по справочному датасету вместе с новой строкой,
//! поэтому от запроса к запросу они немного смещаются.

use ndarray::{concatenate, s, Array2, ArrayView2, Axis};

use crate::dataset::ReferenceDataset;
use crate::error::{RentError, Result};
use crate::preprocessing::{MeanImputer, MostFrequentImputer, OneHotEncoder, StandardScaler};
use crate::types::{RawRecord, RentalRecord, CATEGORICAL_FEATURES, FEATURE_COLUMNS, NUMERIC_FEATURES};

/// Сколько первых колонок справочного датасета участвует в кодировании
pub const DEFAULT_REFERENCE_COLUMNS: usize = 8;

#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    reference_columns: usize,
}

impl FeatureEncoder {
    pub fn new() -> Self {
        Self {
            reference_columns: DEFAULT_REFERENCE_COLUMNS,
        }
    }

    /// Колонки справочного датасета с индексом >= n считаются пропусками
    pub fn with_reference_columns(mut self, n: usize) -> Self {
        self.reference_columns = n.min(FEATURE_COLUMNS);
        self
    }

    pub fn reference_columns(&self) -> usize {
        self.reference_columns
    }

    /// Ширина выходного вектора: 7 + размеры словарей района и типа
    pub fn output_width(&self, reference: &ReferenceDataset) -> usize {
        let rows = self.reference_rows(reference);
        NUMERIC_FEATURES.len()
            + (0..CATEGORICAL_FEATURES.len())
                .map(|c| {
                    let mut one_hot = OneHotEncoder::new();
                    one_hot.fit(rows.iter().map(|r| r.categorical(c)));
                    one_hot.width()
                })
                .sum::<usize>()
    }

    /// Кодирует новую запись: матрица 1 x D
    pub fn encode(&self, reference: &ReferenceDataset, raw: &RawRecord) -> Result<Array2<f64>> {
        require_label("neighborhood", raw.neighborhood.as_deref())?;
        require_label("property_type", raw.property_type.as_deref())?;

        let mut rows = self.reference_rows(reference);
        rows.push(RentalRecord::from(raw.clone()));

        let encoded = self.fit_transform(&rows, reference.len())?;
        let last = encoded.nrows() - 1;
        let vector = encoded.slice(s![last..last + 1, ..]).to_owned();

        tracing::debug!(
            "Encoded record against {} reference rows: {} features",
            reference.len(),
            vector.ncols()
        );
        Ok(vector)
    }

    /// Кодирует все строки справочного датасета в той же раскладке колонок
    /// (статистики только по справочнику). Используется для сборки split.
    pub fn encode_reference(&self, reference: &ReferenceDataset) -> Result<Array2<f64>> {
        if reference.is_empty() {
            return Err(RentError::Preprocessing("Empty reference dataset".to_string()));
        }
        let rows = self.reference_rows(reference);
        self.fit_transform(&rows, rows.len())
    }

    fn reference_rows(&self, reference: &ReferenceDataset) -> Vec<RentalRecord> {
        reference.records().iter().map(|r| self.truncate(r)).collect()
    }

    fn truncate(&self, record: &RentalRecord) -> RentalRecord {
        let keep = |column: usize| column < self.reference_columns;
        let numeric = |idx: usize| record.numeric(idx).filter(|_| keep(idx + CATEGORICAL_FEATURES.len()));

        RentalRecord {
            neighborhood: record.neighborhood.clone().filter(|_| keep(0)),
            property_type: record.property_type.clone().filter(|_| keep(1)),
            area_util: numeric(0),
            bathrooms: numeric(1),
            suites: numeric(2),
            bedrooms: numeric(3),
            garage_spots: numeric(4),
            condo_fee: numeric(5),
            property_tax_year: numeric(6),
            rent: record.rent,
        }
    }

    /// Обучение и применение трансформаций по всем строкам.
    /// Словарь категорий берется из первых `vocabulary_rows` строк.
    fn fit_transform(&self, rows: &[RentalRecord], vocabulary_rows: usize) -> Result<Array2<f64>> {
        let numeric = Array2::from_shape_fn((rows.len(), NUMERIC_FEATURES.len()), |(i, j)| {
            rows[i].numeric(j).unwrap_or(f64::NAN)
        });
        let numeric = MeanImputer::new().fit_transform(&numeric)?;
        let numeric = StandardScaler::new().fit_transform(&numeric)?;

        let mut blocks = vec![numeric];
        for c in 0..CATEGORICAL_FEATURES.len() {
            let values: Vec<Option<&str>> = rows.iter().map(|r| r.categorical(c)).collect();

            let mut imputer = MostFrequentImputer::new();
            imputer.fit(&values);
            let filled = imputer.transform(&values);

            let mut one_hot = OneHotEncoder::new();
            one_hot.fit(values[..vocabulary_rows.min(values.len())].iter().copied());
            blocks.push(one_hot.transform(&filled));
        }

        let views: Vec<ArrayView2<f64>> = blocks.iter().map(|b| b.view()).collect();
        concatenate(Axis(1), &views).map_err(|e| RentError::Preprocessing(e.to_string()))
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn require_label(field: &'static str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(RentError::invalid(field, "a value must be selected")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(bairro: &str, tipo: &str, area: f64, condominio: f64, iptu: f64) -> RentalRecord {
        RentalRecord {
            neighborhood: Some(bairro.to_string()),
            property_type: Some(tipo.to_string()),
            area_util: Some(area),
            bathrooms: Some(1.0),
            suites: Some(0.0),
            bedrooms: Some(2.0),
            garage_spots: Some(1.0),
            condo_fee: Some(condominio),
            property_tax_year: Some(iptu),
            rent: Some(area * 30.0),
        }
    }

    fn reference() -> ReferenceDataset {
        ReferenceDataset::new(vec![
            record("A", "house", 100.0, 500.0, 1000.0),
            record("B", "apartment", 60.0, 700.0, 600.0),
            record("C", "house", 150.0, 0.0, 2000.0),
        ])
    }

    fn raw(bairro: &str) -> RawRecord {
        RawRecord {
            neighborhood: Some(bairro.to_string()),
            property_type: Some("house".to_string()),
            area_util: Some(80.0),
            bathrooms: Some(2.0),
            suites: Some(1.0),
            bedrooms: Some(2.0),
            garage_spots: Some(1.0),
            condo_fee: Some(300.0),
            property_tax_year: Some(50.0),
        }
    }

    #[test]
    fn test_width_follows_reference_vocabulary() {
        let encoder = FeatureEncoder::new();
        let vector = encoder.encode(&reference(), &raw("A")).unwrap();

        assert_eq!(vector.shape(), &[1, 12]);
        assert_eq!(encoder.output_width(&reference()), 12);
    }

    #[test]
    fn test_one_hot_blocks_are_sorted() {
        let vector = FeatureEncoder::new().encode(&reference(), &raw("B")).unwrap();
        let row = vector.row(0);

        // районы: A, B, C; типы: apartment, house
        assert_eq!(row.slice(s![7..10]).to_vec(), vec![0.0, 1.0, 0.0]);
        assert_eq!(row.slice(s![10..12]).to_vec(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let encoder = FeatureEncoder::new();
        let first = encoder.encode(&reference(), &raw("C")).unwrap();
        let second = encoder.encode(&reference(), &raw("C")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_neighborhood_is_zero_block() {
        let vector = FeatureEncoder::new().encode(&reference(), &raw("Z")).unwrap();

        assert_eq!(vector.ncols(), 12);
        assert!(vector.row(0).slice(s![7..10]).iter().all(|v| *v == 0.0));
        assert_eq!(vector[[0, 11]], 1.0);
    }

    #[test]
    fn test_missing_numeric_is_imputed() {
        let mut input = raw("A");
        input.area_util = None;
        input.condo_fee = None;

        let vector = FeatureEncoder::new().encode(&reference(), &input).unwrap();
        assert!(vector.iter().all(|v| v.is_finite()));
        // среднее по колонке после стандартизации дает 0
        assert!(vector[[0, 0]].abs() < 1e-12);
    }

    #[test]
    fn test_missing_categorical_is_invalid_input() {
        let mut input = raw("A");
        input.property_type = None;

        let err = FeatureEncoder::new().encode(&reference(), &input).unwrap_err();
        assert!(matches!(err, RentError::InvalidInput { field: "property_type", .. }));

        let mut input = raw("A");
        input.neighborhood = Some("  ".to_string());
        assert!(FeatureEncoder::new().encode(&reference(), &input).is_err());
    }

    #[test]
    fn test_statistics_include_new_row() {
        let reference = ReferenceDataset::new(vec![
            record("A", "house", 100.0, 500.0, 1000.0),
            record("A", "house", 100.0, 500.0, 1000.0),
        ]);
        let mut input = raw("A");
        input.area_util = Some(200.0);

        let vector = FeatureEncoder::new().encode(&reference, &input).unwrap();
        // mean = 133.33, std = 47.14 -> (200 - 133.33) / 47.14
        let expected = (200.0 - 400.0 / 3.0) / (20000.0f64 / 9.0).sqrt();
        assert!((vector[[0, 0]] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_reference_property_tax_is_masked_by_default() {
        // только у новой строки есть iptu, колонка становится константой
        let vector = FeatureEncoder::new().encode(&reference(), &raw("A")).unwrap();
        assert_eq!(vector[[0, 6]], 0.0);

        let full = FeatureEncoder::new()
            .with_reference_columns(FEATURE_COLUMNS)
            .encode(&reference(), &raw("A"))
            .unwrap();
        assert!(full[[0, 6]] < 0.0);
    }

    #[test]
    fn test_encode_reference_layout() {
        let encoder = FeatureEncoder::new();
        let matrix = encoder.encode_reference(&reference()).unwrap();

        assert_eq!(matrix.shape(), &[3, 12]);
        for row in matrix.rows() {
            assert_eq!(row.slice(s![7..10]).sum(), 1.0);
            assert_eq!(row.slice(s![10..12]).sum(), 1.0);
        }
        assert!(encoder.encode_reference(&ReferenceDataset::empty()).is_err());
    }
}
