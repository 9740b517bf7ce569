use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::errors::{PredictError, PredictResult};

/// Row-major 2-D numeric table: rows are samples, columns are features.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl FeatureTable {
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> PredictResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(PredictError::validation(
                "feature_table",
                "table must have at least one row and one column",
            ));
        }
        if values.len() != rows * cols {
            return Err(PredictError::validation(
                "feature_table",
                format!("expected {} values for {rows}x{cols}, got {}", rows * cols, values.len()),
            ));
        }
        Ok(Self { rows, cols, values })
    }

    /// `[[x]]`
    pub fn scalar(x: f64) -> Self {
        Self {
            rows: 1,
            cols: 1,
            values: vec![x],
        }
    }

    pub fn single_row(values: Vec<f64>) -> PredictResult<Self> {
        let cols = values.len();
        Self::new(1, cols, values)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn row(&self, i: usize) -> Option<&[f64]> {
        if i >= self.rows {
            return None;
        }
        Some(&self.values[i * self.cols..(i + 1) * self.cols])
    }

    pub(crate) fn to_dense_matrix(&self) -> DenseMatrix<f64> {
        DenseMatrix::new(self.rows, self.cols, self.values.clone(), false)
    }
}
