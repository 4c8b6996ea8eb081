//! Rent ML - оценка месячной аренды по атрибутам недвижимости

pub mod config;
pub mod dataset;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod server;
pub mod types;
pub mod validation;

pub use config::AppConfig;
pub use dataset::ReferenceDataset;
pub use error::{RentError, Result};
pub use models::*;
pub use pipeline::RentEstimator;
pub use preprocessing::FeatureEncoder;
pub use types::*;
