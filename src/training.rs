//! Fitting helpers behind the `trainer` binary.
//!
//! The service itself never trains; these produce the artifacts it loads.

use std::path::Path;

use serde::Deserialize;
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use tracing::info;

use crate::errors::{PredictError, PredictResult};
use crate::feature_table::FeatureTable;
use crate::model_artifact::{Estimator, ModelArtifact};
use crate::reference_dataset::ReferenceDataset;

pub const DEFAULT_TREES: u16 = 100;

#[derive(Debug, Deserialize)]
struct XyRecord {
    x: f64,
    y: f64,
}

/// Read a CSV with `x` and `y` columns into a one-feature table and its targets.
pub fn read_xy_csv(path: impl AsRef<Path>) -> PredictResult<(FeatureTable, Vec<f64>)> {
    let path = path.as_ref();
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|e| PredictError::dataset(format!("{}: {e}", path.display())))?;

    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for result in rdr.deserialize() {
        let record: XyRecord =
            result.map_err(|e| PredictError::dataset(format!("{}: {e}", path.display())))?;
        xs.push(record.x);
        ys.push(record.y);
    }
    if xs.is_empty() {
        return Err(PredictError::dataset(format!("{} has no rows", path.display())));
    }

    let table = FeatureTable::new(xs.len(), 1, xs)?;
    Ok((table, ys))
}

fn check_fit_inputs(table: &FeatureTable, n_targets: usize, feature_names: &[String]) -> PredictResult<()> {
    if table.rows() != n_targets {
        return Err(PredictError::validation(
            "targets",
            format!("{} rows but {n_targets} targets", table.rows()),
        ));
    }
    if table.cols() != feature_names.len() {
        return Err(PredictError::validation(
            "feature_names",
            format!("{} columns but {} names", table.cols(), feature_names.len()),
        ));
    }
    Ok(())
}

pub fn fit_regressor(
    table: &FeatureTable,
    targets: &[f64],
    feature_names: Vec<String>,
    n_trees: u16,
) -> PredictResult<ModelArtifact> {
    check_fit_inputs(table, targets.len(), &feature_names)?;
    let params = RandomForestRegressorParameters::default().with_n_trees(n_trees.into());
    let model = RandomForestRegressor::fit(&table.to_dense_matrix(), &targets.to_vec(), params)?;
    info!(rows = table.rows(), n_trees, "fitted random forest regressor");
    Ok(ModelArtifact::new(
        feature_names,
        Estimator::RandomForestRegressor(model),
    ))
}

pub fn fit_classifier(
    table: &FeatureTable,
    labels: &[u32],
    feature_names: Vec<String>,
    n_trees: u16,
) -> PredictResult<ModelArtifact> {
    check_fit_inputs(table, labels.len(), &feature_names)?;
    let params = RandomForestClassifierParameters::default().with_n_trees(n_trees.into());
    let model = RandomForestClassifier::fit(&table.to_dense_matrix(), &labels.to_vec(), params)?;
    info!(rows = table.rows(), n_trees, "fitted random forest classifier");
    Ok(ModelArtifact::new(
        feature_names,
        Estimator::RandomForestClassifier(model),
    ))
}

/// Classifier over the bundled reference dataset, for the `sample` serving mode.
pub fn fit_reference_classifier(dataset: &ReferenceDataset, n_trees: u16) -> PredictResult<ModelArtifact> {
    fit_classifier(
        &dataset.to_table()?,
        dataset.labels(),
        dataset.feature_names().to_vec(),
        n_trees,
    )
}
