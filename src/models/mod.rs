/// ML модели

pub mod forest;
pub mod regressor;
pub mod split;

pub use forest::{ForestParams, MaxFeatures, RandomForestRegressor};
pub use regressor::RentRegressor;
pub use split::{build_split, SplitFile, SplitSource, TrainTestSplit};
