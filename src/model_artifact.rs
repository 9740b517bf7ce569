//! Model artifact loader
//!
//! An artifact is a fitted `smartcore` estimator wrapped in a small envelope
//! recording the feature layout it was trained on. The envelope is written as
//! JSON for `.json` paths and as bincode for everything else.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use smartcore::ensemble::random_forest_classifier::RandomForestClassifier;
use smartcore::ensemble::random_forest_regressor::RandomForestRegressor;
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::info;

use crate::errors::{PredictError, PredictResult};
use crate::feature_table::FeatureTable;
use crate::predictor::Predictor;

pub const FORMAT_VERSION: u32 = 1;

pub type ForestRegressor = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;
pub type ForestClassifier = RandomForestClassifier<f64, u32, DenseMatrix<f64>, Vec<u32>>;

#[derive(Serialize, Deserialize)]
pub enum Estimator {
    RandomForestRegressor(ForestRegressor),
    RandomForestClassifier(ForestClassifier),
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::RandomForestRegressor(_) => "random_forest_regressor",
            Estimator::RandomForestClassifier(_) => "random_forest_classifier",
        }
    }

    fn predict(&self, table: &FeatureTable) -> PredictResult<Vec<f64>> {
        let x = table.to_dense_matrix();
        match self {
            Estimator::RandomForestRegressor(model) => Ok(model.predict(&x)?),
            Estimator::RandomForestClassifier(model) => {
                let labels = model.predict(&x)?;
                Ok(labels.into_iter().map(f64::from).collect())
            }
        }
    }
}

impl fmt::Debug for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactEncoding {
    Json,
    Bincode,
}

impl ArtifactEncoding {
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ArtifactEncoding::Json,
            _ => ArtifactEncoding::Bincode,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    pub n_features: usize,
    pub feature_names: Vec<String>,
    pub trained_at: DateTime<Utc>,
    pub estimator: Estimator,
}

impl ModelArtifact {
    pub fn new(feature_names: Vec<String>, estimator: Estimator) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            n_features: feature_names.len(),
            feature_names,
            trained_at: Utc::now(),
            estimator,
        }
    }

    /// Read and decode an artifact. Called once, before the listener is bound.
    pub fn load(path: impl AsRef<Path>) -> PredictResult<LoadedModel> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let bytes = fs::read(path)
            .map_err(|e| PredictError::io(format!("reading model artifact {path_str}"), e))?;

        let artifact: ModelArtifact = match ArtifactEncoding::for_path(path) {
            ArtifactEncoding::Json => serde_json::from_slice(&bytes)
                .map_err(|e| PredictError::artifact(&path_str, e.to_string()))?,
            ArtifactEncoding::Bincode => bincode::deserialize(&bytes)
                .map_err(|e| PredictError::artifact(&path_str, e.to_string()))?,
        };
        artifact.check(&path_str)?;

        let sha256 = format!("{:x}", Sha256::digest(&bytes));
        info!(
            path = %path_str,
            kind = artifact.estimator.kind(),
            n_features = artifact.n_features,
            sha256 = %sha256,
            "model artifact loaded"
        );

        Ok(LoadedModel {
            path: path.to_path_buf(),
            sha256,
            artifact,
        })
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PredictResult<()> {
        let path = path.as_ref();
        let path_str = path.display().to_string();
        let bytes = match ArtifactEncoding::for_path(path) {
            ArtifactEncoding::Json => serde_json::to_vec(self)
                .map_err(|e| PredictError::artifact(&path_str, e.to_string()))?,
            ArtifactEncoding::Bincode => bincode::serialize(self)
                .map_err(|e| PredictError::artifact(&path_str, e.to_string()))?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| PredictError::io(format!("creating {}", parent.display()), e))?;
        }
        fs::write(path, bytes)
            .map_err(|e| PredictError::io(format!("writing model artifact {path_str}"), e))
    }

    fn check(&self, path_str: &str) -> PredictResult<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(PredictError::artifact(
                path_str,
                format!("unsupported format version {}", self.format_version),
            ));
        }
        if self.n_features == 0 || self.feature_names.len() != self.n_features {
            return Err(PredictError::artifact(
                path_str,
                format!(
                    "declares {} features but names {}",
                    self.n_features,
                    self.feature_names.len()
                ),
            ));
        }
        Ok(())
    }
}

impl Predictor for ModelArtifact {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, table: &FeatureTable) -> PredictResult<Vec<f64>> {
        if table.cols() != self.n_features {
            return Err(PredictError::shape_mismatch(self.n_features, table.cols()));
        }
        self.estimator.predict(table)
    }
}

/// An artifact together with where it came from.
#[derive(Debug)]
pub struct LoadedModel {
    pub path: PathBuf,
    pub sha256: String,
    pub artifact: ModelArtifact,
}

impl LoadedModel {
    pub fn summary(&self) -> ModelSummary {
        ModelSummary {
            kind: self.artifact.estimator.kind().to_string(),
            n_features: self.artifact.n_features,
            sha256: self.sha256.clone(),
        }
    }
}

impl Predictor for LoadedModel {
    fn n_features(&self) -> usize {
        self.artifact.n_features()
    }

    fn feature_names(&self) -> &[String] {
        self.artifact.feature_names()
    }

    fn predict(&self, table: &FeatureTable) -> PredictResult<Vec<f64>> {
        self.artifact.predict(table)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub kind: String,
    pub n_features: usize,
    pub sha256: String,
}
