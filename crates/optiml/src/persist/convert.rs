//! Conversion between runtime types and schema types.
//!
//! Runtime → schema conversions are lossless `From` impls. Schema → runtime
//! conversions are `TryFrom` impls that validate everything traversal and
//! prediction later rely on, so a model that converts cleanly can never
//! index out of bounds at predict time.

use super::error::ReadError;
use super::schema::{
    CategoriesSchema, ForestSchema, GBDTModelSchema, GBLinearModelSchema, LinearWeightsSchema,
    ModelMetaSchema, OutputTransformSchema, TaskKindSchema, TreeSchema,
};
use crate::model::{
    CategoriesStorage, Forest, GBDTModel, GBLinearModel, LinearModel, ModelMeta, OutputTransform,
    SplitType, TaskKind, Tree,
};

// =============================================================================
// TaskKind / OutputTransform conversions
// =============================================================================

impl From<TaskKind> for TaskKindSchema {
    fn from(task: TaskKind) -> Self {
        match task {
            TaskKind::Regression => TaskKindSchema::Regression,
            TaskKind::BinaryClassification => TaskKindSchema::BinaryClassification,
            TaskKind::MulticlassClassification { .. } => TaskKindSchema::MulticlassClassification,
            TaskKind::Ranking => TaskKindSchema::Ranking,
        }
    }
}

impl From<OutputTransform> for OutputTransformSchema {
    fn from(transform: OutputTransform) -> Self {
        match transform {
            OutputTransform::Identity => Self::Identity,
            OutputTransform::Sigmoid => Self::Sigmoid,
            OutputTransform::Softmax => Self::Softmax,
        }
    }
}

impl From<OutputTransformSchema> for OutputTransform {
    fn from(schema: OutputTransformSchema) -> Self {
        match schema {
            OutputTransformSchema::Identity => Self::Identity,
            OutputTransformSchema::Sigmoid => Self::Sigmoid,
            OutputTransformSchema::Softmax => Self::Softmax,
        }
    }
}

// =============================================================================
// ModelMeta conversions
// =============================================================================

impl From<&ModelMeta> for ModelMetaSchema {
    fn from(meta: &ModelMeta) -> Self {
        let num_classes = match meta.task {
            TaskKind::MulticlassClassification { n_classes } => Some(n_classes),
            _ => None,
        };

        ModelMetaSchema {
            task: meta.task.into(),
            num_features: meta.n_features,
            num_classes,
            feature_names: meta.feature_names.clone(),
            class_labels: meta.class_labels.clone(),
        }
    }
}

impl TryFrom<ModelMetaSchema> for ModelMeta {
    type Error = ReadError;

    fn try_from(schema: ModelMetaSchema) -> Result<Self, Self::Error> {
        let task = match schema.task {
            TaskKindSchema::Regression => TaskKind::Regression,
            TaskKindSchema::BinaryClassification => TaskKind::BinaryClassification,
            TaskKindSchema::Ranking => TaskKind::Ranking,
            TaskKindSchema::MulticlassClassification => match schema.num_classes {
                Some(n_classes) if n_classes >= 2 => {
                    TaskKind::MulticlassClassification { n_classes }
                }
                Some(n_classes) => {
                    return Err(ReadError::Validation(format!(
                        "multiclass model needs at least 2 classes, got {n_classes}"
                    )));
                }
                None => {
                    return Err(ReadError::Validation(
                        "multiclass model is missing num_classes".into(),
                    ));
                }
            },
        };

        if let Some(names) = &schema.feature_names
            && names.len() != schema.num_features
        {
            return Err(ReadError::Validation(format!(
                "model has {} features but {} feature names",
                schema.num_features,
                names.len()
            )));
        }

        if let Some(labels) = &schema.class_labels {
            let expected = match task {
                TaskKind::BinaryClassification => Some(2),
                TaskKind::MulticlassClassification { n_classes } => Some(n_classes),
                TaskKind::Regression | TaskKind::Ranking => None,
            };
            match expected {
                Some(expected) if labels.len() != expected => {
                    return Err(ReadError::Validation(format!(
                        "model has {expected} classes but {} class labels",
                        labels.len()
                    )));
                }
                None => {
                    return Err(ReadError::Validation(
                        "class labels are only valid for classification models".into(),
                    ));
                }
                Some(_) => {}
            }
        }

        Ok(ModelMeta {
            task,
            n_features: schema.num_features,
            feature_names: schema.feature_names,
            class_labels: schema.class_labels,
        })
    }
}

// =============================================================================
// Tree conversions
// =============================================================================

impl From<&Tree> for TreeSchema {
    fn from(tree: &Tree) -> Self {
        let n_nodes = tree.n_nodes();

        let mut split_indices = Vec::with_capacity(n_nodes);
        let mut thresholds = Vec::with_capacity(n_nodes);
        let mut children_left = Vec::with_capacity(n_nodes);
        let mut children_right = Vec::with_capacity(n_nodes);
        let mut default_left = Vec::with_capacity(n_nodes);
        let mut leaf_values = Vec::with_capacity(n_nodes);
        let mut categories = CategoriesSchema::default();

        for node in 0..n_nodes as u32 {
            let leaf = tree.is_leaf(node);
            split_indices.push(tree.split_index(node));
            thresholds.push(tree.split_threshold(node) as f64);
            // 0 marks a leaf in the persisted layout
            children_left.push(if leaf { 0 } else { tree.left_child(node) });
            children_right.push(if leaf { 0 } else { tree.right_child(node) });
            default_left.push(tree.default_left(node));
            leaf_values.push(tree.leaf_value(node) as f64);

            if !leaf && tree.split_type(node) == SplitType::Categorical {
                categories.node_indices.push(node);
                categories
                    .category_sets
                    .push(tree.categories().categories_for_node(node));
            }
        }

        TreeSchema {
            num_nodes: n_nodes as u32,
            split_indices,
            thresholds,
            children_left,
            children_right,
            default_left,
            leaf_values,
            categories,
        }
    }
}

impl TryFrom<TreeSchema> for Tree {
    type Error = ReadError;

    fn try_from(schema: TreeSchema) -> Result<Self, Self::Error> {
        let n_nodes = schema.num_nodes as usize;

        if schema.categories.node_indices.len() != schema.categories.category_sets.len() {
            return Err(ReadError::Validation(format!(
                "categories have {} node indices but {} category sets",
                schema.categories.node_indices.len(),
                schema.categories.category_sets.len()
            )));
        }

        let mut split_types = vec![SplitType::Numeric; n_nodes];
        for &node in &schema.categories.node_indices {
            match split_types.get_mut(node as usize) {
                Some(split_type) => *split_type = SplitType::Categorical,
                None => {
                    return Err(ReadError::Validation(format!(
                        "categorical split on node {node} but the tree has {n_nodes} nodes"
                    )));
                }
            }
        }

        let categories = if schema.categories.node_indices.is_empty() {
            CategoriesStorage::empty()
        } else {
            CategoriesStorage::from_sets(
                n_nodes,
                schema
                    .categories
                    .node_indices
                    .iter()
                    .copied()
                    .zip(schema.categories.category_sets.iter().map(Vec::as_slice)),
            )
        };

        // A node is a leaf iff its left child is 0; the root is never a child.
        let is_leaf: Vec<bool> = schema.children_left.iter().map(|&left| left == 0).collect();

        let tree = Tree::new(
            schema.split_indices,
            schema.thresholds.into_iter().map(|t| t as f32).collect(),
            schema.children_left,
            schema.children_right,
            schema.default_left,
            is_leaf,
            schema.leaf_values.into_iter().map(|v| v as f32).collect(),
            split_types,
            categories,
        );

        tree.validate()
            .map_err(|e| ReadError::Validation(e.to_string()))?;
        Ok(tree)
    }
}

// =============================================================================
// Forest conversions
// =============================================================================

impl From<&Forest> for ForestSchema {
    fn from(forest: &Forest) -> Self {
        ForestSchema {
            trees: forest.trees().map(TreeSchema::from).collect(),
            tree_groups: if forest.n_groups() > 1 {
                Some(forest.tree_groups().iter().map(|&g| g as usize).collect())
            } else {
                None
            },
            n_groups: forest.n_groups() as usize,
            base_score: forest.base_score().iter().map(|&s| s as f64).collect(),
        }
    }
}

impl TryFrom<ForestSchema> for Forest {
    type Error = ReadError;

    fn try_from(schema: ForestSchema) -> Result<Self, Self::Error> {
        if schema.n_groups == 0 {
            return Err(ReadError::Validation("forest has no output groups".into()));
        }

        let tree_groups: Vec<u32> = match schema.tree_groups {
            Some(groups) if groups.len() != schema.trees.len() => {
                return Err(ReadError::Validation(format!(
                    "forest has {} trees but {} tree group assignments",
                    schema.trees.len(),
                    groups.len()
                )));
            }
            Some(groups) => groups
                .into_iter()
                .map(|g| {
                    u32::try_from(g).map_err(|_| {
                        ReadError::Validation(format!("tree group {g} is out of range"))
                    })
                })
                .collect::<Result<_, _>>()?,
            None => vec![0; schema.trees.len()],
        };
        let n_groups = u32::try_from(schema.n_groups).map_err(|_| {
            ReadError::Validation(format!("{} output groups is out of range", schema.n_groups))
        })?;

        let mut forest = Forest::new(n_groups)
            .with_base_score(schema.base_score.iter().map(|&s| s as f32).collect());

        for (tree_idx, (tree_schema, group)) in
            schema.trees.into_iter().zip(tree_groups).enumerate()
        {
            let tree = Tree::try_from(tree_schema)
                .map_err(|e| ReadError::Validation(format!("tree {tree_idx}: {e}")))?;
            forest.push_tree(tree, group);
        }

        forest
            .validate()
            .map_err(|e| ReadError::Validation(e.to_string()))?;
        Ok(forest)
    }
}

// =============================================================================
// Model conversions
// =============================================================================

impl From<&GBDTModel> for GBDTModelSchema {
    fn from(model: &GBDTModel) -> Self {
        GBDTModelSchema {
            meta: model.meta().into(),
            forest: model.forest().into(),
            output_transform: Some(model.output_transform().into()),
        }
    }
}

impl TryFrom<GBDTModelSchema> for GBDTModel {
    type Error = ReadError;

    fn try_from(schema: GBDTModelSchema) -> Result<Self, Self::Error> {
        let meta = ModelMeta::try_from(schema.meta)?;
        let forest = Forest::try_from(schema.forest)?;

        check_groups(&meta, forest.n_groups() as usize)?;

        if let Some(max_split) = forest.trees().filter_map(Tree::max_split_index).max()
            && max_split as usize >= meta.n_features
        {
            return Err(ReadError::Validation(format!(
                "tree splits on feature {max_split} but the model has {} features",
                meta.n_features
            )));
        }

        let output_transform = schema
            .output_transform
            .map(OutputTransform::from)
            .unwrap_or_default();

        Ok(GBDTModel::new(meta, forest, output_transform))
    }
}

impl From<&GBLinearModel> for GBLinearModelSchema {
    fn from(model: &GBLinearModel) -> Self {
        let linear = model.linear();
        GBLinearModelSchema {
            meta: model.meta().into(),
            weights: LinearWeightsSchema {
                values: linear.to_flat().into_iter().map(f64::from).collect(),
                num_features: linear.n_features(),
                num_groups: linear.n_groups(),
            },
            base_score: model.base_score().iter().map(|&s| s as f64).collect(),
            output_transform: Some(model.output_transform().into()),
        }
    }
}

impl TryFrom<GBLinearModelSchema> for GBLinearModel {
    type Error = ReadError;

    fn try_from(schema: GBLinearModelSchema) -> Result<Self, Self::Error> {
        let meta = ModelMeta::try_from(schema.meta)?;
        let LinearWeightsSchema {
            values,
            num_features,
            num_groups,
        } = schema.weights;

        if num_features != meta.n_features {
            return Err(ReadError::Validation(format!(
                "weights cover {num_features} features but the model has {}",
                meta.n_features
            )));
        }
        check_groups(&meta, num_groups)?;

        let n_values = values.len();
        let linear = LinearModel::from_flat(
            values.into_iter().map(|v| v as f32).collect(),
            num_features,
            num_groups,
        )
        .ok_or_else(|| {
            ReadError::Validation(format!(
                "expected {} weights for {num_features} features and {num_groups} groups, got {n_values}",
                (num_features + 1) * num_groups
            ))
        })?;

        if schema.base_score.len() != num_groups {
            return Err(ReadError::Validation(format!(
                "model has {num_groups} output groups but {} base scores",
                schema.base_score.len()
            )));
        }

        let output_transform = schema
            .output_transform
            .map(OutputTransform::from)
            .unwrap_or_default();

        Ok(GBLinearModel::new(
            meta,
            linear,
            schema.base_score.into_iter().map(|s| s as f32).collect(),
            output_transform,
        ))
    }
}

/// Output group count must agree with the task, except that a binary
/// classifier may carry one score per class.
fn check_groups(meta: &ModelMeta, n_groups: usize) -> Result<(), ReadError> {
    let expected = meta.n_groups();
    let binary_per_class = meta.task == TaskKind::BinaryClassification && n_groups == 2;
    if n_groups == expected || binary_per_class {
        Ok(())
    } else {
        Err(ReadError::Validation(format!(
            "{:?} model expects {expected} output groups, found {n_groups}",
            meta.task
        )))
    }
}
