/// API сервер оценки аренды

use std::sync::Arc;

use rent_ml::{
    server::{router, AppState},
    AppConfig, FeatureEncoder, ReferenceDataset, RentEstimator, RentRegressor, SplitFile,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;

    // Датасет загружается один раз; без файла сервер работает с пустым набором
    let (dataset, dataset_error) = ReferenceDataset::load_or_empty(&config.dataset_path);

    let encoder = FeatureEncoder::new().with_reference_columns(config.reference_columns);
    let split = SplitFile::new(&config.split_path);
    tracing::info!(
        "Split file: {}, reference columns: {}",
        split.path().display(),
        encoder.reference_columns()
    );

    let estimator = RentEstimator::new(
        Arc::new(dataset),
        encoder,
        RentRegressor::new(split).with_random_state(config.random_state),
    );

    let app = router(AppState::new(estimator, dataset_error));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
