use std::sync::Arc;

use tracing::warn;

use crate::config_loader::{ServeMode, ServiceConfig};
use crate::errors::PredictResult;
use crate::model_artifact::{ModelArtifact, ModelSummary};
use crate::predictor::Predictor;
use crate::reference_dataset::ReferenceDataset;

/// Everything a request handler can see. Immutable once built.
pub struct AppState {
    pub mode: ServeMode,
    pub predictor: Arc<dyn Predictor>,
    pub model: ModelSummary,
    pub dataset: Option<ReferenceDataset>,
}

impl AppState {
    pub fn new(
        mode: ServeMode,
        predictor: Arc<dyn Predictor>,
        model: ModelSummary,
    ) -> PredictResult<Self> {
        let dataset = match mode {
            ServeMode::Scalar => None,
            ServeMode::Sample => Some(ReferenceDataset::iris()?),
        };
        Ok(Self::with_dataset(mode, predictor, model, dataset))
    }

    pub fn with_dataset(
        mode: ServeMode,
        predictor: Arc<dyn Predictor>,
        model: ModelSummary,
        dataset: Option<ReferenceDataset>,
    ) -> Self {
        let expected = match (&mode, &dataset) {
            (ServeMode::Scalar, _) => Some(1),
            (ServeMode::Sample, Some(ds)) => Some(ds.n_features()),
            (ServeMode::Sample, None) => None,
        };
        match expected {
            Some(n) if n != predictor.n_features() => {
                // Served anyway; every /predict call will answer 500 until redeployed.
                warn!(
                    mode = %mode,
                    model_features = predictor.n_features(),
                    input_features = n,
                    "model feature count does not match the serving mode"
                );
            }
            None => warn!(mode = %mode, "no reference dataset; /predict will answer 500"),
            _ => {}
        }
        Self {
            mode,
            predictor,
            model,
            dataset,
        }
    }

    /// Load the configured artifact and assemble the state. Any error is fatal at startup.
    pub fn from_config(config: &ServiceConfig) -> PredictResult<Self> {
        let loaded = ModelArtifact::load(&config.model_path)?;
        let summary = loaded.summary();
        Self::new(config.mode, Arc::new(loaded), summary)
    }
}
