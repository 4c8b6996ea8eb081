/// Типы данных для оценки аренды

use serde::{Deserialize, Serialize};

/// Числовые признаки в порядке колонок датасета
pub const NUMERIC_FEATURES: [&str; 7] = [
    "area_util",
    "bathrooms",
    "suites",
    "bedrooms",
    "garage_spots",
    "condo_fee",
    "property_tax_year",
];

/// Категориальные признаки в порядке one-hot блоков
pub const CATEGORICAL_FEATURES: [&str; 2] = ["neighborhood", "property_type"];

/// Полное число колонок-признаков в файле датасета
pub const FEATURE_COLUMNS: usize = 9;

/// Историческая запись об аренде (строка справочного датасета)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalRecord {
    pub neighborhood: Option<String>,
    pub property_type: Option<String>,
    pub area_util: Option<f64>,
    pub bathrooms: Option<f64>,
    pub suites: Option<f64>,
    pub bedrooms: Option<f64>,
    pub garage_spots: Option<f64>,
    pub condo_fee: Option<f64>,
    pub property_tax_year: Option<f64>,
    /// Целевая переменная (месячная аренда), если есть в файле
    #[serde(default)]
    pub rent: Option<f64>,
}

impl RentalRecord {
    /// Категориальная колонка по индексу (0 - район, 1 - тип)
    pub fn categorical(&self, idx: usize) -> Option<&str> {
        match idx {
            0 => self.neighborhood.as_deref(),
            1 => self.property_type.as_deref(),
            _ => None,
        }
    }

    /// Числовая колонка по индексу в NUMERIC_FEATURES
    pub fn numeric(&self, idx: usize) -> Option<f64> {
        match idx {
            0 => self.area_util,
            1 => self.bathrooms,
            2 => self.suites,
            3 => self.bedrooms,
            4 => self.garage_spots,
            5 => self.condo_fee,
            6 => self.property_tax_year,
            _ => None,
        }
        .filter(|v| v.is_finite())
    }
}

/// Ввод пользователя: одна запись с теми же 9 полями.
/// Числовые поля могут отсутствовать, категориальные - обязательны.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub neighborhood: Option<String>,
    pub property_type: Option<String>,
    pub area_util: Option<f64>,
    pub bathrooms: Option<f64>,
    pub suites: Option<f64>,
    pub bedrooms: Option<f64>,
    pub garage_spots: Option<f64>,
    pub condo_fee: Option<f64>,
    pub property_tax_year: Option<f64>,
}

impl From<RawRecord> for RentalRecord {
    fn from(raw: RawRecord) -> Self {
        Self {
            neighborhood: raw.neighborhood,
            property_type: raw.property_type,
            area_util: raw.area_util,
            bathrooms: raw.bathrooms,
            suites: raw.suites,
            bedrooms: raw.bedrooms,
            garage_spots: raw.garage_spots,
            condo_fee: raw.condo_fee,
            property_tax_year: raw.property_tax_year,
            rent: None,
        }
    }
}

/// Запрос от слоя представления.
/// Счетчики знаковые: отрицательное значение отклоняет validate, а не десериализация.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentRequest {
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub area_util: Option<f64>,
    #[serde(default = "default_bathrooms")]
    pub bathrooms: i64,
    #[serde(default = "default_suites")]
    pub suites: i64,
    #[serde(default = "default_bedrooms")]
    pub bedrooms: i64,
    #[serde(default = "default_garage_spots")]
    pub garage_spots: i64,
    #[serde(default)]
    pub condo_fee: f64,
    #[serde(default)]
    pub property_tax_year: f64,
}

fn default_bathrooms() -> i64 { 2 }
fn default_suites() -> i64 { 1 }
fn default_bedrooms() -> i64 { 2 }
fn default_garage_spots() -> i64 { 1 }

/// Ответ: оценка + эхо введенных атрибутов для отображения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub price: f64,
    pub formatted: String, // "R$ 1234.56"
    pub attributes: RentRequest,
}

/// Списки значений для выбора района и типа
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptions {
    pub neighborhoods: Vec<String>,
    pub property_types: Vec<String>,
}
