//! Конфигурация из переменных окружения

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::preprocessing::encoder::DEFAULT_REFERENCE_COLUMNS;

pub const ENV_DATASET_PATH: &str = "RENT_DATASET_PATH";
pub const ENV_SPLIT_PATH: &str = "RENT_SPLIT_PATH";
pub const ENV_BIND_ADDR: &str = "RENT_BIND_ADDR";
pub const ENV_RANDOM_STATE: &str = "RENT_RANDOM_STATE";
pub const ENV_REFERENCE_COLUMNS: &str = "RENT_REFERENCE_COLUMNS";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub dataset_path: PathBuf,
    pub split_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Seed для леса; без него каждое обучение случайно
    pub random_state: Option<u64>,
    pub reference_columns: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("./dataset_aluguel/base_aluguel.csv"),
            split_path: PathBuf::from("./dataset_aluguel/base_treino_teste.json"),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            random_state: None,
            reference_columns: DEFAULT_REFERENCE_COLUMNS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Значения берутся из lookup, отсутствующие - по умолчанию
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATASET_PATH) {
            config.dataset_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(ENV_SPLIT_PATH) {
            config.split_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = addr
                .parse()
                .map_err(|e| anyhow::anyhow!("{}=`{}`: {}", ENV_BIND_ADDR, addr, e))?;
        }
        if let Some(seed) = lookup(ENV_RANDOM_STATE) {
            config.random_state = Some(
                seed.parse()
                    .map_err(|e| anyhow::anyhow!("{}=`{}`: {}", ENV_RANDOM_STATE, seed, e))?,
            );
        }
        if let Some(columns) = lookup(ENV_REFERENCE_COLUMNS) {
            config.reference_columns = columns
                .parse()
                .map_err(|e| anyhow::anyhow!("{}=`{}`: {}", ENV_REFERENCE_COLUMNS, columns, e))?;
        }

        Ok(config)
    }
}
