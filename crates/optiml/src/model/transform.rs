//! Output transformation for inference.
//!
//! The [`OutputTransform`] enum defines how raw model outputs (margins)
//! for a single row are converted into scores. It is persisted with the
//! model so that prediction doesn't require the training objective.

/// Inference-time output transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputTransform {
    /// No transformation; output = margin.
    #[default]
    Identity,

    /// Logistic sigmoid: output = 1 / (1 + exp(-margin)).
    Sigmoid,

    /// Softmax over all output groups of the row.
    Softmax,
}

impl OutputTransform {
    /// Apply the transformation in-place to the outputs of one row.
    ///
    /// NaN and Inf inputs propagate through without panics.
    #[inline]
    pub fn apply(&self, outputs: &mut [f32]) {
        match self {
            OutputTransform::Identity => {}
            OutputTransform::Sigmoid => {
                for x in outputs.iter_mut() {
                    *x = sigmoid(*x);
                }
            }
            OutputTransform::Softmax => softmax_inplace(outputs),
        }
    }

    /// Score at which a single-output binary model flips to the positive class.
    ///
    /// Sigmoid outputs are probabilities, everything else is a margin.
    #[inline]
    pub fn binary_threshold(&self) -> f32 {
        match self {
            OutputTransform::Sigmoid => 0.5,
            OutputTransform::Identity | OutputTransform::Softmax => 0.0,
        }
    }
}

/// Numerically stable sigmoid.
#[inline]
fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-500.0, 500.0);
    if clamped >= 0.0 {
        1.0 / (1.0 + (-clamped).exp())
    } else {
        let e = clamped.exp();
        e / (1.0 + e)
    }
}

/// Softmax in-place, shifted by the row max.
#[inline]
fn softmax_inplace(row: &mut [f32]) {
    if row.is_empty() {
        return;
    }

    let max = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

    let mut sum = 0.0f32;
    for x in row.iter_mut() {
        *x = (*x - max).exp();
        sum += *x;
    }

    if sum > 0.0 {
        for x in row.iter_mut() {
            *x /= sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn identity_is_noop() {
        let mut outputs = vec![1.0, -2.0, 3.5];
        OutputTransform::Identity.apply(&mut outputs);
        assert_eq!(outputs, vec![1.0, -2.0, 3.5]);
    }

    #[test]
    fn sigmoid_zero_is_half() {
        let mut outputs = vec![0.0];
        OutputTransform::Sigmoid.apply(&mut outputs);
        assert_abs_diff_eq!(outputs[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn sigmoid_extremes_are_stable() {
        let mut outputs = vec![f32::NEG_INFINITY, -100.0, 100.0, f32::INFINITY];
        OutputTransform::Sigmoid.apply(&mut outputs);
        assert!(outputs[0] < 0.001);
        assert!(outputs[1] < 0.001);
        assert!(outputs[2] > 0.999);
        assert!(outputs[3] > 0.999);
    }

    #[test]
    fn softmax_sums_to_one_and_keeps_order() {
        let mut outputs = vec![100.0, 200.0, 300.0];
        OutputTransform::Softmax.apply(&mut outputs);

        let sum: f32 = outputs.iter().sum();
        assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-6);
        assert!(outputs[2] > 0.99);
    }

    #[test]
    fn thresholds() {
        assert_eq!(OutputTransform::Sigmoid.binary_threshold(), 0.5);
        assert_eq!(OutputTransform::Identity.binary_threshold(), 0.0);
    }
}
