use crate::errors::PredictResult;
use crate::feature_table::FeatureTable;

/// The single capability the service needs from a model: one value per row.
///
/// Implementations must be read-only after construction; the router shares
/// one instance across all request tasks.
pub trait Predictor: Send + Sync {
    fn n_features(&self) -> usize;

    fn feature_names(&self) -> &[String];

    /// Fails when `table.cols()` differs from [`Predictor::n_features`].
    fn predict(&self, table: &FeatureTable) -> PredictResult<Vec<f64>>;

    /// Prediction for a one-row table.
    fn predict_one(&self, table: &FeatureTable) -> PredictResult<f64> {
        self.predict(table)?
            .into_iter()
            .next()
            .ok_or_else(|| crate::errors::PredictError::estimator("estimator returned no rows"))
    }
}
