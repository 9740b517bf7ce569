use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::Request,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::api_errors::AppError;
use crate::app_state::AppState;
use crate::config_loader::ServeMode;
use crate::errors::PredictError;
use crate::feature_table::FeatureTable;
use crate::model_artifact::ModelSummary;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PredictQuery {
    pub x: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ScalarPrediction {
    pub input: f64,
    pub prediction: f64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SampledPrediction {
    pub input: BTreeMap<String, f64>,
    pub prediction: f64,
    pub actual: u32,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PredictResponse {
    Scalar(ScalarPrediction),
    Sampled(SampledPrediction),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub mode: ServeMode,
    pub model: ModelSummary,
}

/// Router exposing `/predict` and `/healthz` over a shared, read-only state
pub fn build_predict_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", get(predict))
        .route("/healthz", get(healthz))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request<Body>| {
                tracing::info_span!(
                    "http",
                    method = %req.method(),
                    uri = %req.uri(),
                    request_id = %Uuid::new_v4(),
                )
            }),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[axum::debug_handler]
async fn predict(
    State(st): State<Arc<AppState>>,
    query: Result<Query<PredictQuery>, QueryRejection>,
) -> Result<Json<PredictResponse>, AppError> {
    let response = match st.mode {
        ServeMode::Scalar => {
            let Query(query) = query.map_err(|rejection| {
                warn!(%rejection, "rejected /predict query");
                AppError::bad_request(rejection.body_text())
            })?;
            PredictResponse::Scalar(predict_scalar(&st, query.x.unwrap_or(0.0))?)
        }
        ServeMode::Sample => PredictResponse::Sampled(predict_sampled(&st)?),
    };
    Ok(Json(response))
}

fn predict_scalar(st: &AppState, x: f64) -> Result<ScalarPrediction, AppError> {
    if !x.is_finite() {
        return Err(PredictError::validation("x", "must be a finite number").into());
    }
    let prediction = st
        .predictor
        .predict_one(&FeatureTable::scalar(x))
        .map_err(log_failure)?;
    debug!(input = x, prediction, "scalar prediction");
    Ok(ScalarPrediction {
        input: x,
        prediction,
    })
}

fn predict_sampled(st: &AppState) -> Result<SampledPrediction, AppError> {
    let dataset = st
        .dataset
        .as_ref()
        .ok_or_else(|| AppError::internal("reference dataset not loaded"))?;
    let row = dataset.sample(&mut rand::rng()).map_err(log_failure)?;
    let table = row.to_table().map_err(log_failure)?;
    let prediction = st.predictor.predict_one(&table).map_err(log_failure)?;
    debug!(prediction, actual = row.label, "sampled prediction");
    Ok(SampledPrediction {
        input: row.features,
        prediction,
        actual: row.label,
    })
}

fn log_failure(err: PredictError) -> AppError {
    error!(error = %err, "prediction failed");
    err.into()
}

async fn healthz(State(st): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        mode: st.mode,
        model: st.model.clone(),
    })
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(detail, "request handler panicked");
    AppError::internal("internal server error").into_response()
}
