//! One-hot кодирование категорий

use ndarray::Array2;

/// Словарь категорий одной колонки (отсортирован).
/// Неизвестные значения кодируются нулевым блоком.
#[derive(Debug, Clone, Default)]
pub struct OneHotEncoder {
    categories: Vec<String>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit<'a>(&mut self, values: impl IntoIterator<Item = Option<&'a str>>) {
        let mut categories: Vec<String> = values.into_iter().flatten().map(str::to_string).collect();
        categories.sort();
        categories.dedup();
        self.categories = categories;
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn width(&self) -> usize {
        self.categories.len()
    }

    /// Позиция категории в словаре
    pub fn index_of(&self, value: &str) -> Option<usize> {
        self.categories
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
    }

    pub fn transform(&self, values: &[Option<&str>]) -> Array2<f64> {
        let mut encoded = Array2::zeros((values.len(), self.width()));
        for (row, &value) in values.iter().enumerate() {
            if let Some(col) = value.and_then(|v| self.index_of(v)) {
                encoded[[row, col]] = 1.0;
            }
        }
        encoded
    }
}
