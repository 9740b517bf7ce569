// tests/web.rs
mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use predictd::reference_dataset::ReferenceDataset;
use predictd::predictweb::build_predict_router;
use predictd::{AppState, ServeMode};

use common::{
    app_with, app_with_predictor, get_json, iris_classifier, line_regressor, PanickingPredictor,
    RowSumPredictor,
};

#[tokio::test]
async fn predict_returns_input_and_prediction() {
    let app = app_with(ServeMode::Scalar, line_regressor());

    let (status, body) = get_json(&app, "/predict?x=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["input"], serde_json::json!(10.0));
    let prediction = body["prediction"].as_f64().expect("prediction is a number");
    assert!(prediction.is_finite());
    assert_eq!(body.as_object().unwrap().len(), 2);
}

#[tokio::test]
async fn input_echoes_any_finite_x() {
    let app = app_with(ServeMode::Scalar, line_regressor());

    for x in ["-100", "0", "0.5", "1e9", "-0.25"] {
        let (status, body) = get_json(&app, &format!("/predict?x={x}")).await;
        assert_eq!(status, StatusCode::OK, "x={x}");
        assert_eq!(body["input"].as_f64(), Some(x.parse::<f64>().unwrap()));
        assert!(body["prediction"].as_f64().unwrap().is_finite());
    }
}

#[tokio::test]
async fn omitted_x_matches_explicit_default() {
    let app = app_with(ServeMode::Scalar, line_regressor());

    let (_, implicit) = get_json(&app, "/predict").await;
    let (_, explicit) = get_json(&app, "/predict?x=0.0").await;
    assert_eq!(implicit, explicit);
    assert_eq!(implicit["input"], serde_json::json!(0.0));
}

#[tokio::test]
async fn non_numeric_x_is_a_client_error() {
    let app = app_with(ServeMode::Scalar, line_regressor());

    let (status, body) = get_json(&app, "/predict?x=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("error").is_some());

    // Still serving afterwards
    let (status, _) = get_json(&app, "/predict?x=1").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn non_finite_x_is_rejected() {
    let app = app_with(ServeMode::Scalar, line_regressor());

    for x in ["NaN", "inf", "-inf"] {
        let (status, body) = get_json(&app, &format!("/predict?x={x}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "x={x}");
        assert!(body["error"].as_str().unwrap().contains("finite"));
    }
}

#[tokio::test]
async fn feature_count_mismatch_is_a_server_error() {
    // Four-feature classifier behind the one-feature scalar contract
    let app = app_with(ServeMode::Scalar, iris_classifier());

    let (status, body) = get_json(&app, "/predict?x=5").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("expects 4, got 1"));
}

#[tokio::test]
async fn sample_mode_returns_labeled_row() {
    let app = app_with(ServeMode::Sample, iris_classifier());
    let dataset = ReferenceDataset::iris().unwrap();
    let mut names: Vec<String> = dataset.feature_names().to_vec();
    names.sort();

    for _ in 0..25 {
        let (status, body) = get_json(&app, "/predict").await;
        assert_eq!(status, StatusCode::OK);

        let actual = body["actual"].as_u64().expect("actual is an integer");
        assert!(actual <= 2);
        assert!(body["prediction"].as_f64().unwrap().is_finite());

        let input = body["input"].as_object().expect("input is a mapping");
        let keys: Vec<String> = input.keys().cloned().collect();
        assert_eq!(keys, names);
        // Iris measurements carry one decimal place; no f32 widening noise.
        for v in input.values() {
            let v = v.as_f64().unwrap();
            assert_eq!((v * 10.0).round() / 10.0, v, "value {v} lost its decimal form");
        }
    }
}

#[tokio::test]
async fn sample_mode_ignores_query() {
    let app = app_with(ServeMode::Sample, iris_classifier());

    let (status, body) = get_json(&app, "/predict?x=abc").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("actual").is_some());
}

#[tokio::test]
async fn sample_mode_predicts_on_the_sampled_features() {
    let dataset = ReferenceDataset::iris().unwrap();
    let names: Vec<&str> = dataset.feature_names().iter().map(String::as_str).collect();
    let app = app_with_predictor(ServeMode::Sample, Arc::new(RowSumPredictor::new(&names)));

    let (status, body) = get_json(&app, "/predict").await;
    assert_eq!(status, StatusCode::OK);
    let sum: f64 = body["input"]
        .as_object()
        .unwrap()
        .values()
        .map(|v| v.as_f64().unwrap())
        .sum();
    assert!((body["prediction"].as_f64().unwrap() - sum).abs() < 1e-9);
}

#[tokio::test]
async fn handler_panic_becomes_500() {
    let app = app_with_predictor(ServeMode::Scalar, Arc::new(PanickingPredictor::new()));

    let (status, body) = get_json(&app, "/predict?x=1").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("error").is_some());

    let (status, _) = get_json(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn healthz_reports_mode_and_model() {
    let app = app_with(ServeMode::Scalar, line_regressor());

    let (status, body) = get_json(&app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["mode"], "scalar");
    assert_eq!(body["model"]["kind"], "random_forest_regressor");
    assert_eq!(body["model"]["n_features"], 1);
}

#[tokio::test]
async fn sample_mode_without_dataset_is_a_server_error() {
    let artifact = iris_classifier();
    let summary = common::summary_for(&artifact);
    let state = AppState::with_dataset(ServeMode::Sample, Arc::new(artifact), summary, None);
    let app = build_predict_router(Arc::new(state));

    let (status, body) = get_json(&app, "/predict").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("reference dataset"));
}
