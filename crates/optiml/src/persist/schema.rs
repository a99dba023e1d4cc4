//! Schema types for model serialization.
//!
//! These types provide a stable serialization format independent of runtime
//! types, so that the two can evolve separately and every model read from
//! disk goes through validation on its way to the runtime representation.

use serde::{Deserialize, Serialize};

/// Top-level envelope of a persisted model.
///
/// The `model` payload is kept as raw JSON until `model_type` has been
/// inspected, so that an unknown type is reported as such rather than as a
/// shape mismatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEnvelope {
    /// Format version of the envelope and payload.
    pub format_version: u32,
    /// `"gbdt"` or `"gblinear"`.
    pub model_type: String,
    /// Model payload.
    pub model: serde_json::Value,
}

/// Task type for model output interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKindSchema {
    Regression,
    BinaryClassification,
    MulticlassClassification,
    Ranking,
}

/// Model metadata schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetaSchema {
    /// Task type.
    pub task: TaskKindSchema,
    /// Number of features.
    pub num_features: usize,
    /// Number of classes (for multiclass).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_classes: Option<usize>,
    /// Feature names (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    /// Class labels for classifiers (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_labels: Option<Vec<String>>,
}

/// Category mapping schema for categorical splits.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CategoriesSchema {
    /// Node indices that have category sets.
    pub node_indices: Vec<u32>,
    /// Categories going right, one set per entry of `node_indices`.
    pub category_sets: Vec<Vec<u32>>,
}

/// Tree schema (SoA layout).
///
/// A node is a leaf when its `children_left` entry is 0; the root can never
/// be a child, so 0 doubles as the "no child" marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSchema {
    /// Number of nodes (internal + leaves).
    pub num_nodes: u32,
    /// Split feature index for each node.
    pub split_indices: Vec<u32>,
    /// Split threshold for each node.
    pub thresholds: Vec<f64>,
    /// Left child index for each node.
    pub children_left: Vec<u32>,
    /// Right child index for each node.
    pub children_right: Vec<u32>,
    /// Default direction (true = left) for each node.
    pub default_left: Vec<bool>,
    /// Leaf value for each node (ignored on internal nodes).
    pub leaf_values: Vec<f64>,
    /// Optional category mappings for categorical splits.
    #[serde(default, skip_serializing_if = "is_categories_empty")]
    pub categories: CategoriesSchema,
}

fn is_categories_empty(c: &CategoriesSchema) -> bool {
    c.node_indices.is_empty()
}

/// Forest schema (collection of trees).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestSchema {
    /// Trees in iteration order.
    pub trees: Vec<TreeSchema>,
    /// Output group of each tree (defaults to group 0 for all trees).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree_groups: Option<Vec<usize>>,
    /// Number of output groups.
    pub n_groups: usize,
    /// Base score(s), one per group.
    pub base_score: Vec<f64>,
}

/// Output transform schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputTransformSchema {
    Identity,
    Sigmoid,
    Softmax,
}

/// Linear weight schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearWeightsSchema {
    /// `(num_features + 1) * num_groups` values, feature-major, group-minor.
    /// The last `num_groups` values are the biases.
    pub values: Vec<f64>,
    pub num_features: usize,
    pub num_groups: usize,
}

/// Full GBDT model schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GBDTModelSchema {
    pub meta: ModelMetaSchema,
    pub forest: ForestSchema,
    /// Defaults to identity when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_transform: Option<OutputTransformSchema>,
}

impl GBDTModelSchema {
    /// Model type string.
    pub const MODEL_TYPE: &'static str = "gbdt";
}

/// Full GBLinear model schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GBLinearModelSchema {
    pub meta: ModelMetaSchema,
    pub weights: LinearWeightsSchema,
    /// Base score(s), one per group.
    pub base_score: Vec<f64>,
    /// Defaults to identity when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_transform: Option<OutputTransformSchema>,
}

impl GBLinearModelSchema {
    /// Model type string.
    pub const MODEL_TYPE: &'static str = "gblinear";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_kind_serde() {
        let json = serde_json::to_string(&TaskKindSchema::BinaryClassification).unwrap();
        assert_eq!(json, r#""binary_classification""#);

        let parsed: TaskKindSchema = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TaskKindSchema::BinaryClassification);
    }

    #[test]
    fn model_meta_optional_fields() {
        let meta = ModelMetaSchema {
            task: TaskKindSchema::Regression,
            num_features: 10,
            num_classes: None,
            feature_names: None,
            class_labels: None,
        };

        let json = serde_json::to_string(&meta).unwrap();
        assert!(!json.contains("num_classes"));
        assert!(!json.contains("feature_names"));
        assert!(!json.contains("class_labels"));

        let parsed: ModelMetaSchema =
            serde_json::from_str(r#"{"task":"regression","num_features":3}"#).unwrap();
        assert_eq!(parsed.num_features, 3);
        assert!(parsed.feature_names.is_none());
    }

    #[test]
    fn categories_skip_when_empty() {
        let tree = TreeSchema {
            num_nodes: 1,
            split_indices: vec![0],
            thresholds: vec![0.0],
            children_left: vec![0],
            children_right: vec![0],
            default_left: vec![false],
            leaf_values: vec![1.0],
            categories: CategoriesSchema::default(),
        };

        let json = serde_json::to_string(&tree).unwrap();
        assert!(!json.contains("categories"));
    }
}
