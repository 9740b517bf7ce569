#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt; // for .oneshot()

use predictd::feature_table::FeatureTable;
use predictd::model_artifact::{ModelArtifact, ModelSummary};
use predictd::predictweb::build_predict_router;
use predictd::reference_dataset::ReferenceDataset;
use predictd::training::{fit_reference_classifier, fit_regressor};
use predictd::{AppState, PredictResult, Predictor, ServeMode};

/// Regressor fitted on y = 2x + 1 over x in 0..40.
pub fn line_regressor() -> ModelArtifact {
    let xs: Vec<f64> = (0..40).map(f64::from).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
    let table = FeatureTable::new(xs.len(), 1, xs).expect("table");
    fit_regressor(&table, &ys, vec!["x".to_string()], 10).expect("fit regressor")
}

pub fn iris_classifier() -> ModelArtifact {
    let dataset = ReferenceDataset::iris().expect("iris");
    fit_reference_classifier(&dataset, 10).expect("fit classifier")
}

pub fn summary_for(artifact: &ModelArtifact) -> ModelSummary {
    ModelSummary {
        kind: artifact.estimator.kind().to_string(),
        n_features: artifact.n_features,
        sha256: "test".to_string(),
    }
}

pub fn app_with(mode: ServeMode, artifact: ModelArtifact) -> Router {
    let summary = summary_for(&artifact);
    let state = AppState::new(mode, Arc::new(artifact), summary).expect("app state");
    build_predict_router(Arc::new(state))
}

pub fn app_with_predictor(mode: ServeMode, predictor: Arc<dyn Predictor>) -> Router {
    let summary = ModelSummary {
        kind: "stub".to_string(),
        n_features: predictor.n_features(),
        sha256: "stub".to_string(),
    };
    let state = AppState::new(mode, predictor, summary).expect("app state");
    build_predict_router(Arc::new(state))
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let req = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

/// Predictor that panics on every call.
pub struct PanickingPredictor {
    names: Vec<String>,
}

impl PanickingPredictor {
    pub fn new() -> Self {
        Self {
            names: vec!["x".to_string()],
        }
    }
}

impl Predictor for PanickingPredictor {
    fn n_features(&self) -> usize {
        1
    }

    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict(&self, _table: &FeatureTable) -> PredictResult<Vec<f64>> {
        panic!("estimator blew up");
    }
}

/// Predictor returning the sum of each row, so responses are checkable by hand.
pub struct RowSumPredictor {
    names: Vec<String>,
}

impl RowSumPredictor {
    pub fn new(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

impl Predictor for RowSumPredictor {
    fn n_features(&self) -> usize {
        self.names.len()
    }

    fn feature_names(&self) -> &[String] {
        &self.names
    }

    fn predict(&self, table: &FeatureTable) -> PredictResult<Vec<f64>> {
        Ok((0..table.rows())
            .filter_map(|i| table.row(i))
            .map(|row| row.iter().sum())
            .collect())
    }
}
