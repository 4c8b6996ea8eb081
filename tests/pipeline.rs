use std::sync::Arc;

use rent_ml::{
    build_split, FeatureEncoder, RawRecord, ReferenceDataset, RentError, RentEstimator,
    RentRegressor, RentRequest, RentalRecord, SplitFile,
};

fn listing(bairro: &str, tipo: &str, area: f64, rent: f64) -> RentalRecord {
    RentalRecord {
        neighborhood: Some(bairro.to_string()),
        property_type: Some(tipo.to_string()),
        area_util: Some(area),
        bathrooms: Some(2.0),
        suites: Some(1.0),
        bedrooms: Some(2.0),
        garage_spots: Some(1.0),
        condo_fee: Some(area * 5.0),
        property_tax_year: Some(area * 12.0),
        rent: Some(rent),
    }
}

fn three_rows() -> ReferenceDataset {
    ReferenceDataset::new(vec![
        listing("A", "house", 120.0, 4800.0),
        listing("B", "apartment", 60.0, 2100.0),
        listing("C", "house", 90.0, 3300.0),
    ])
}

fn raw_record() -> RawRecord {
    RawRecord {
        neighborhood: Some("A".to_string()),
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
fn encode_then_predict_on_three_row_reference() {
    let dataset = three_rows();
    let encoder = FeatureEncoder::new();

    let encoded = encoder.encode(&dataset, &raw_record()).unwrap();
    assert_eq!(encoded.shape(), &[1, 12]);

    let split = build_split(&dataset, &encoder, 0.34, 11).unwrap();
    assert_eq!(split.n_features(), 12);

    let price = RentRegressor::new(split)
        .with_random_state(Some(5))
        .predict(&encoded)
        .unwrap();
    assert!(price.is_finite());
    assert!(price >= 0.0);
}

#[test]
fn estimator_reads_split_from_disk_on_each_call() {
    let dir = tempfile::tempdir().unwrap();
    let split_path = dir.path().join("base_treino_teste.json");

    let dataset = Arc::new(three_rows());
    let encoder = FeatureEncoder::new();
    build_split(&dataset, &encoder, 0.34, 2)
        .unwrap()
        .save(&split_path)
        .unwrap();

    let estimator = RentEstimator::new(
        dataset.clone(),
        encoder,
        RentRegressor::new(SplitFile::new(&split_path)),
    );

    let request = RentRequest {
        neighborhood: Some("C".to_string()),
        property_type: Some("house".to_string()),
        area_util: Some(100.0),
        bathrooms: 2,
        suites: 1,
        bedrooms: 3,
        garage_spots: 2,
        condo_fee: 450.0,
        property_tax_year: 1200.0,
    };

    let response = estimator.estimate(&request).unwrap();
    assert!(response.price.is_finite() && response.price >= 0.0);
    assert!(response.formatted.starts_with("R$ "));
    assert_eq!(response.attributes, request);

    // split удален - следующий запрос падает, модель не кэшируется
    std::fs::remove_file(&split_path).unwrap();
    let err = estimator.estimate(&request).unwrap_err();
    assert!(matches!(err, RentError::DataUnavailable(_)));
}

#[test]
fn invalid_request_never_reaches_the_model() {
    let estimator = RentEstimator::new(
        Arc::new(three_rows()),
        FeatureEncoder::new(),
        RentRegressor::new(SplitFile::new("/nonexistent/split.json")),
    );

    let request = RentRequest {
        neighborhood: Some("A".to_string()),
        property_type: Some("house".to_string()),
        area_util: Some(0.0),
        bathrooms: 1,
        suites: 0,
        bedrooms: 1,
        garage_spots: 0,
        condo_fee: 0.0,
        property_tax_year: 0.0,
    };

    let err = estimator.estimate(&request).unwrap_err();
    assert!(matches!(err, RentError::InvalidInput { field: "area_util", .. }));
}

#[test]
fn vocabulary_change_breaks_the_split_contract() {
    let dataset = three_rows();
    let encoder = FeatureEncoder::new();
    let split = build_split(&dataset, &encoder, 0.34, 3).unwrap();

    let mut records = dataset.records().to_vec();
    records.push(listing("D", "studio", 30.0, 1500.0));
    let grown = ReferenceDataset::new(records);

    let encoded = encoder.encode(&grown, &raw_record()).unwrap();
    assert_eq!(encoded.ncols(), 14);

    let err = RentRegressor::new(split).predict(&encoded).unwrap_err();
    assert!(matches!(err, RentError::DimensionMismatch { expected: 12, actual: 14 }));
}
