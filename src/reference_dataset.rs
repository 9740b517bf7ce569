//! Bundled labeled dataset used by the `sample` serving mode.

use std::collections::BTreeMap;

use rand::Rng;

use crate::errors::{PredictError, PredictResult};
use crate::feature_table::FeatureTable;

#[derive(Debug, Clone)]
pub struct ReferenceDataset {
    feature_names: Vec<String>,
    features: Vec<f64>,
    labels: Vec<u32>,
}

/// One sampled row with its label split off.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    pub features: BTreeMap<String, f64>,
    pub values: Vec<f64>,
    pub label: u32,
}

impl LabeledRow {
    pub fn to_table(&self) -> PredictResult<FeatureTable> {
        FeatureTable::single_row(self.values.clone())
    }
}

impl ReferenceDataset {
    pub fn new(
        feature_names: Vec<String>,
        features: Vec<f64>,
        labels: Vec<u32>,
    ) -> PredictResult<Self> {
        let cols = feature_names.len();
        if cols == 0 || labels.is_empty() {
            return Err(PredictError::dataset("dataset has no rows or no features"));
        }
        if features.len() != labels.len() * cols {
            return Err(PredictError::dataset(format!(
                "{} feature values do not fill {} rows of {cols}",
                features.len(),
                labels.len()
            )));
        }
        Ok(Self {
            feature_names,
            features,
            labels,
        })
    }

    /// Fisher's Iris data as shipped with smartcore: 150 rows, 4 features, labels 0..=2.
    pub fn iris() -> PredictResult<Self> {
        let ds = smartcore::dataset::iris::load_dataset();
        let features = ds
            .data
            .iter()
            .map(|v| widen_exact(*v))
            .collect::<PredictResult<Vec<f64>>>()?;
        Self::new(ds.feature_names, features, ds.target)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// All rows as one table, for fitting.
    pub fn to_table(&self) -> PredictResult<FeatureTable> {
        FeatureTable::new(self.len(), self.n_features(), self.features.clone())
    }

    pub fn row(&self, i: usize) -> Option<LabeledRow> {
        let cols = self.n_features();
        let label = *self.labels.get(i)?;
        let values = self.features[i * cols..(i + 1) * cols].to_vec();
        let features = self
            .feature_names
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect();
        Some(LabeledRow {
            features,
            values,
            label,
        })
    }

    /// Draw one row uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PredictResult<LabeledRow> {
        if self.is_empty() {
            return Err(PredictError::dataset("cannot sample from an empty dataset"));
        }
        let i = rng.random_range(0..self.len());
        self.row(i)
            .ok_or_else(|| PredictError::dataset(format!("row {i} out of range")))
    }
}

/// f32 -> f64 through the shortest decimal form, so `0.2f32` becomes `0.2`
/// rather than `0.20000000298023224`.
fn widen_exact(v: f32) -> PredictResult<f64> {
    v.to_string()
        .parse::<f64>()
        .map_err(|e| PredictError::dataset(format!("feature value {v}: {e}")))
}
