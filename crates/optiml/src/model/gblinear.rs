//! Linear booster model.

use super::Predictor;
use super::linear::LinearModel;
use super::meta::ModelMeta;
use super::transform::OutputTransform;

/// Gradient-boosted linear model.
#[derive(Debug, Clone, PartialEq)]
pub struct GBLinearModel {
    meta: ModelMeta,
    linear: LinearModel,
    base_score: Vec<f32>,
    output_transform: OutputTransform,
}

impl GBLinearModel {
    pub fn new(
        meta: ModelMeta,
        linear: LinearModel,
        base_score: Vec<f32>,
        output_transform: OutputTransform,
    ) -> Self {
        Self {
            meta,
            linear,
            base_score,
            output_transform,
        }
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn linear(&self) -> &LinearModel {
        &self.linear
    }

    pub fn base_score(&self) -> &[f32] {
        &self.base_score
    }

    pub fn output_transform(&self) -> OutputTransform {
        self.output_transform
    }
}

impl Predictor for GBLinearModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn output_transform(&self) -> OutputTransform {
        self.output_transform
    }

    fn predict_scores(&self, features: &[f32]) -> Vec<f32> {
        let mut scores = self.linear.predict_row(features, &self.base_score);
        self.output_transform.apply(&mut scores);
        scores
    }
}
