//! Tree-ensemble model.

use super::Predictor;
use super::forest::Forest;
use super::meta::ModelMeta;
use super::transform::OutputTransform;

/// Gradient-boosted decision tree model: a forest plus the metadata and
/// output transform needed to turn margins into a prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct GBDTModel {
    meta: ModelMeta,
    forest: Forest,
    output_transform: OutputTransform,
}

impl GBDTModel {
    pub fn new(meta: ModelMeta, forest: Forest, output_transform: OutputTransform) -> Self {
        Self {
            meta,
            forest,
            output_transform,
        }
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn output_transform(&self) -> OutputTransform {
        self.output_transform
    }
}

impl Predictor for GBDTModel {
    fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    fn output_transform(&self) -> OutputTransform {
        self.output_transform
    }

    fn predict_scores(&self, features: &[f32]) -> Vec<f32> {
        let mut scores = self.forest.predict_row(features);
        self.output_transform.apply(&mut scores);
        scores
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PredictionValue;
    use crate::model::tree::Tree;
    use ndarray::array;

    #[test]
    fn binary_classifier_reports_class_label() {
        let forest = Forest::for_regression().with_tree(Tree::constant(2.0), 0);
        let model = GBDTModel::new(
            ModelMeta::for_binary_classification(1).with_class_labels(["no", "yes"]),
            forest,
            OutputTransform::Sigmoid,
        );

        let predictions = model.predict(array![[0.0f32]].view());
        assert_eq!(predictions, vec![PredictionValue::Label("yes".into())]);
    }

    #[test]
    fn regression_reports_raw_margin() {
        let forest = Forest::for_regression()
            .with_base_score(vec![1.5])
            .with_tree(Tree::constant(2.0), 0);
        let model = GBDTModel::new(
            ModelMeta::for_regression(1),
            forest,
            OutputTransform::Identity,
        );

        let predictions = model.predict(array![[0.0f32]].view());
        assert_eq!(predictions, vec![PredictionValue::Number(3.5)]);
    }
}
