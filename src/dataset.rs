//! Справочный датасет аренды

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RentError, Result};
use crate::types::{FilterOptions, RentalRecord, FEATURE_COLUMNS};

/// Неизменяемый набор исторических записей.
/// Загружается один раз и передается в кодировщик явно.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceDataset {
    records: Vec<RentalRecord>,
}

impl ReferenceDataset {
    pub fn new(records: Vec<RentalRecord>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Чтение CSV: заголовок + колонки в фиксированном порядке
    /// (район, тип, 7 числовых), 10-я колонка - аренда, остальные игнорируются
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| RentError::DatasetUnavailable(format!("{}: {}", path.display(), e)))?;

        let dataset = Self::from_csv_reader(reader)?;
        tracing::info!(
            "Reference dataset loaded from {}: {} rows",
            path.display(),
            dataset.len()
        );
        Ok(dataset)
    }

    /// Загрузка при старте сервера. Без файла сервер работает с пустым набором,
    /// второе значение - сообщение для ответа 503 на /api/predict.
    pub fn load_or_empty(path: impl AsRef<Path>) -> (Self, Option<String>) {
        let path = path.as_ref();
        match Self::from_csv_path(path) {
            Ok(dataset) => (dataset, None),
            Err(e) => {
                tracing::error!("{}", e);
                (
                    Self::empty(),
                    Some(format!("File `{}` was not found", path.display())),
                )
            }
        }
    }

    pub fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut records = Vec::new();

        for (line, row) in reader.records().enumerate() {
            let row = row.map_err(|e| RentError::DatasetUnavailable(e.to_string()))?;
            if row.len() < FEATURE_COLUMNS {
                return Err(RentError::DatasetUnavailable(format!(
                    "row {}: expected at least {} columns, got {}",
                    line + 1,
                    FEATURE_COLUMNS,
                    row.len()
                )));
            }

            let number = |idx: usize| -> Result<Option<f64>> {
                parse_number(row.get(idx).unwrap_or("")).map_err(|value| {
                    RentError::DatasetUnavailable(format!(
                        "row {}, column {}: `{}` is not a number",
                        line + 1,
                        idx,
                        value
                    ))
                })
            };

            records.push(RentalRecord {
                neighborhood: parse_label(row.get(0)),
                property_type: parse_label(row.get(1)),
                area_util: number(2)?,
                bathrooms: number(3)?,
                suites: number(4)?,
                bedrooms: number(5)?,
                garage_spots: number(6)?,
                condo_fee: number(7)?,
                property_tax_year: number(8)?,
                rent: if row.len() > FEATURE_COLUMNS {
                    number(FEATURE_COLUMNS)?
                } else {
                    None
                },
            });
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[RentalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Уникальные районы в порядке появления
    pub fn neighborhoods(&self) -> Vec<String> {
        self.unique_labels(0)
    }

    /// Уникальные типы недвижимости в порядке появления
    pub fn property_types(&self) -> Vec<String> {
        self.unique_labels(1)
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            neighborhoods: self.neighborhoods(),
            property_types: self.property_types(),
        }
    }

    fn unique_labels(&self, column: usize) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.records
            .iter()
            .filter_map(|r| r.categorical(column))
            .filter(|label| seen.insert(*label))
            .map(str::to_string)
            .collect()
    }
}

fn parse_label(cell: Option<&str>) -> Option<String> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Пустая ячейка или NaN - пропуск
fn parse_number(cell: &str) -> std::result::Result<Option<f64>, String> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    cell.parse::<f64>()
        .map(Some)
        .map_err(|_| cell.to_string())
}
