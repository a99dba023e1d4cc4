//! Runtime models and the single-row prediction interface.
//!
//! # Key Types
//!
//! - [`Model`]: a loaded predictor, either a tree ensemble or a linear booster
//! - [`Predictor`]: the prediction entry point used by the engine
//! - [`PredictionValue`]: the scalar handed back to the user
//!
//! Models are loaded from the native JSON format, see [`crate::persist`].

mod categories;
mod forest;
mod gbdt;
mod gblinear;
mod linear;
mod meta;
mod transform;
mod tree;

use std::fmt;

use ndarray::ArrayView2;

pub use categories::{CategoriesStorage, float_to_category};
pub use forest::{Forest, ForestValidationError};
pub use gbdt::GBDTModel;
pub use gblinear::GBLinearModel;
pub use linear::LinearModel;
pub use meta::{ModelMeta, TaskKind};
pub use transform::OutputTransform;
pub use tree::{NodeId, SplitType, Tree, TreeValidationError};

// =============================================================================
// Predictor
// =============================================================================

/// Single-row prediction interface.
///
/// Implementors provide per-row scores; [`Predictor::predict`] turns them
/// into one [`PredictionValue`] per input row.
pub trait Predictor {
    /// Metadata describing the expected input and the task.
    fn meta(&self) -> &ModelMeta;

    /// Transform applied by [`predict_scores`](Self::predict_scores).
    fn output_transform(&self) -> OutputTransform;

    /// Transformed scores for one row, one per output group.
    fn predict_scores(&self, features: &[f32]) -> Vec<f32>;

    /// Predict every row of a `[n_rows, n_features]` matrix.
    fn predict(&self, features: ArrayView2<'_, f32>) -> Vec<PredictionValue> {
        features
            .rows()
            .into_iter()
            .map(|row| {
                let scores = self.predict_scores(&row.to_vec());
                PredictionValue::from_scores(self.meta(), self.output_transform(), &scores)
            })
            .collect()
    }
}

// =============================================================================
// PredictionValue
// =============================================================================

/// A single prediction as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionValue {
    /// Regression output, ranking score, or class index when a classifier
    /// has no class labels.
    Number(f32),
    /// Class label of a classifier.
    Label(String),
}

impl PredictionValue {
    /// Interpret the transformed scores of one row according to the task.
    pub fn from_scores(meta: &ModelMeta, transform: OutputTransform, scores: &[f32]) -> Self {
        let class = match meta.task {
            TaskKind::Regression | TaskKind::Ranking => {
                return Self::Number(scores.first().copied().unwrap_or(f32::NAN));
            }
            TaskKind::BinaryClassification if scores.len() == 1 => {
                usize::from(scores[0] >= transform.binary_threshold())
            }
            TaskKind::BinaryClassification | TaskKind::MulticlassClassification { .. } => {
                argmax(scores)
            }
        };

        match meta.class_labels.as_ref().and_then(|labels| labels.get(class)) {
            Some(label) => Self::Label(label.clone()),
            None => Self::Number(class as f32),
        }
    }
}

impl fmt::Display for PredictionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers keep a trailing ".0" so they read as scores, not labels.
            Self::Number(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{v:.1}")
            }
            Self::Number(v) => write!(f, "{v}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

fn argmax(scores: &[f32]) -> usize {
    scores
        .iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best, best_score), (idx, &score)| {
            if score > best_score {
                (idx, score)
            } else {
                (best, best_score)
            }
        })
        .0
}

// =============================================================================
// Model
// =============================================================================

/// A loaded model of any supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// Tree ensemble.
    Gbdt(GBDTModel),
    /// Linear booster.
    GbLinear(GBLinearModel),
}

impl Model {
    /// Model type string as used in the persisted envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gbdt(_) => "gbdt",
            Self::GbLinear(_) => "gblinear",
        }
    }

    pub fn into_gbdt(self) -> Option<GBDTModel> {
        match self {
            Self::Gbdt(model) => Some(model),
            Self::GbLinear(_) => None,
        }
    }

    pub fn into_gblinear(self) -> Option<GBLinearModel> {
        match self {
            Self::GbLinear(model) => Some(model),
            Self::Gbdt(_) => None,
        }
    }

    fn inner(&self) -> &dyn Predictor {
        match self {
            Self::Gbdt(model) => model,
            Self::GbLinear(model) => model,
        }
    }
}

impl Predictor for Model {
    fn meta(&self) -> &ModelMeta {
        self.inner().meta()
    }

    fn output_transform(&self) -> OutputTransform {
        self.inner().output_transform()
    }

    fn predict_scores(&self, features: &[f32]) -> Vec<f32> {
        self.inner().predict_scores(features)
    }
}

impl From<GBDTModel> for Model {
    fn from(model: GBDTModel) -> Self {
        Self::Gbdt(model)
    }
}

impl From<GBLinearModel> for Model {
    fn from(model: GBLinearModel) -> Self {
        Self::GbLinear(model)
    }
}
