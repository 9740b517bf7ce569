//! Library root for the `predictd` crate
//! A single-endpoint HTTP service answering predictions from a model loaded once at startup.

// Core error handling
pub mod api_errors;
pub mod errors;

// Model artifact and inference
pub mod feature_table;
pub mod model_artifact;
pub mod predictor;
pub mod reference_dataset;
pub mod training;

// Configuration & CLI
pub mod cli;
pub mod config_loader;

// Web server interface
pub mod app_state;
pub mod predictweb;

// Logging
pub mod log_sink;


pub use app_state::AppState;
pub use config_loader::{ServeMode, ServiceConfig};
pub use errors::{PredictError, PredictResult};
pub use feature_table::FeatureTable;
pub use model_artifact::{Estimator, LoadedModel, ModelArtifact};
pub use predictor::Predictor;
pub use reference_dataset::ReferenceDataset;
