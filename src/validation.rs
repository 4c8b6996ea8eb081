//! Проверка запроса до вызова кодировщика

use crate::dataset::ReferenceDataset;
use crate::error::{RentError, Result};
use crate::types::{RawRecord, RentRequest};

impl RentRequest {
    /// Проверки в порядке формы; первая нарушенная возвращается как InvalidInput.
    /// Если датасет не пуст, район и тип должны быть из его словаря.
    pub fn validate(&self, dataset: &ReferenceDataset) -> Result<RawRecord> {
        let area_util = self
            .area_util
            .ok_or_else(|| RentError::invalid("area_util", "usable area is required"))?;
        if !area_util.is_finite() || area_util <= 0.0 {
            return Err(RentError::invalid("area_util", "usable area must be greater than zero"));
        }
        if !self.condo_fee.is_finite() || self.condo_fee < 0.0 {
            return Err(RentError::invalid("condo_fee", "condo fee cannot be negative"));
        }
        if !self.property_tax_year.is_finite() || self.property_tax_year < 0.0 {
            return Err(RentError::invalid("property_tax_year", "property tax cannot be negative"));
        }
        for (field, count) in [
            ("bathrooms", self.bathrooms),
            ("suites", self.suites),
            ("bedrooms", self.bedrooms),
            ("garage_spots", self.garage_spots),
        ] {
            if count < 0 {
                return Err(RentError::invalid(field, format!("{} cannot be negative", field)));
            }
        }

        let neighborhood = selected(self.neighborhood.as_deref())
            .ok_or_else(|| RentError::invalid("neighborhood", "a neighborhood must be selected"))?;
        let property_type = selected(self.property_type.as_deref())
            .ok_or_else(|| RentError::invalid("property_type", "a property type must be selected"))?;

        if !dataset.is_empty() {
            if !dataset.neighborhoods().iter().any(|n| n == neighborhood) {
                return Err(RentError::invalid(
                    "neighborhood",
                    format!("unknown neighborhood `{}`", neighborhood),
                ));
            }
            if !dataset.property_types().iter().any(|t| t == property_type) {
                return Err(RentError::invalid(
                    "property_type",
                    format!("unknown property type `{}`", property_type),
                ));
            }
        }

        Ok(RawRecord {
            neighborhood: Some(neighborhood.to_string()),
            property_type: Some(property_type.to_string()),
            area_util: Some(area_util),
            bathrooms: Some(self.bathrooms as f64),
            suites: Some(self.suites as f64),
            bedrooms: Some(self.bedrooms as f64),
            garage_spots: Some(self.garage_spots as f64),
            condo_fee: Some(self.condo_fee),
            property_tax_year: Some(self.property_tax_year),
        })
    }
}

fn selected(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
