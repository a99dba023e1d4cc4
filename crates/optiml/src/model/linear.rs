//! Linear model data structure.

use ndarray::{Array2, ArrayView1, ArrayView2, s};

/// Linear booster model (weights + bias).
///
/// The weights are stored as an `Array2<f32>` with shape
/// `[n_features + 1, n_groups]`:
///
/// ```text
/// weights[[feature, group]] → coefficient
/// weights[[n_features, group]] → bias (last row)
/// ```
///
/// # Example
///
/// ```
/// use optiml::model::LinearModel;
/// use ndarray::array;
///
/// // 2 features, 1 output group
/// let model = LinearModel::new(array![[0.5], [10.0], [1.0]]);
///
/// assert_eq!(model.n_features(), 2);
/// assert_eq!(model.predict_row(&[30.0, 1.0], &[0.0]), vec![26.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    weights: Array2<f32>,
}

impl LinearModel {
    /// Create a linear model from a weight matrix whose last row holds the biases.
    ///
    /// # Panics
    ///
    /// Panics if the array has no rows (the bias row is mandatory).
    pub fn new(weights: Array2<f32>) -> Self {
        assert!(weights.nrows() >= 1, "weights must have at least 1 row (bias)");
        Self { weights }
    }

    /// Create a linear model from a flat feature-major, group-minor array.
    ///
    /// Returns `None` if `values.len() != (n_features + 1) * n_groups`.
    pub fn from_flat(values: Vec<f32>, n_features: usize, n_groups: usize) -> Option<Self> {
        Array2::from_shape_vec((n_features + 1, n_groups), values)
            .ok()
            .map(|weights| Self { weights })
    }

    /// Number of input features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.weights.nrows() - 1
    }

    /// Number of output groups.
    #[inline]
    pub fn n_groups(&self) -> usize {
        self.weights.ncols()
    }

    #[inline]
    pub fn weight(&self, feature: usize, group: usize) -> f32 {
        self.weights[[feature, group]]
    }

    #[inline]
    pub fn bias(&self, group: usize) -> f32 {
        self.weights[[self.n_features(), group]]
    }

    /// All biases, one per group.
    #[inline]
    pub fn biases(&self) -> ArrayView1<'_, f32> {
        self.weights.row(self.n_features())
    }

    /// The weight matrix without the bias row, shape `[n_features, n_groups]`.
    #[inline]
    pub fn weight_matrix(&self) -> ArrayView2<'_, f32> {
        self.weights.slice(s![..self.n_features(), ..])
    }

    /// Flat feature-major, group-minor copy of all weights including biases.
    pub fn to_flat(&self) -> Vec<f32> {
        self.weights.iter().copied().collect()
    }

    /// Predict raw margins for a single row.
    ///
    /// `output[g] = base_score[g] + bias[g] + Σ features[f] · weight[f, g]`.
    /// NaN features are treated as missing and contribute nothing.
    pub fn predict_row(&self, features: &[f32], base_score: &[f32]) -> Vec<f32> {
        let weights = self.weight_matrix();

        (0..self.n_groups())
            .map(|group| {
                let dot: f32 = features
                    .iter()
                    .zip(weights.column(group))
                    .filter(|(x, _)| !x.is_nan())
                    .map(|(x, w)| x * w)
                    .sum();
                let base = base_score.get(group).copied().unwrap_or(0.0);
                base + self.bias(group) + dot
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn predict_row_regression() {
        // y = 0.5 * x0 + 0.3 * x1 + 0.1
        let model = LinearModel::new(array![[0.5], [0.3], [0.1]]);

        let output = model.predict_row(&[2.0, 3.0], &[0.0]);
        assert_eq!(output.len(), 1);
        assert_abs_diff_eq!(output[0], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn predict_row_with_base_score() {
        let model = LinearModel::new(array![[0.5], [0.3], [0.1]]);

        let output = model.predict_row(&[2.0, 3.0], &[0.5]);
        assert_abs_diff_eq!(output[0], 2.5, epsilon = 1e-6);
    }

    #[test]
    fn predict_row_multigroup() {
        let model = LinearModel::new(array![
            [0.1, 0.2], // feature 0
            [0.3, 0.4], // feature 1
            [0.0, 1.0], // bias
        ]);

        let output = model.predict_row(&[1.0, 1.0], &[0.0, 0.0]);
        assert_abs_diff_eq!(output[0], 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(output[1], 1.6, epsilon = 1e-6);
    }

    #[test]
    fn missing_features_contribute_nothing() {
        let model = LinearModel::new(array![[2.0], [3.0], [1.0]]);
        let output = model.predict_row(&[f32::NAN, 1.0], &[0.0]);
        assert_abs_diff_eq!(output[0], 4.0, epsilon = 1e-6);
    }

    #[test]
    fn flat_layout_roundtrips() {
        let values = vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let model = LinearModel::from_flat(values.clone(), 2, 2).expect("valid shape");

        assert_eq!(model.weight(1, 0), 0.3);
        assert_eq!(model.bias(1), 0.6);
        assert_eq!(model.to_flat(), values);
        assert!(LinearModel::from_flat(vec![0.0; 5], 2, 2).is_none());
    }
}
