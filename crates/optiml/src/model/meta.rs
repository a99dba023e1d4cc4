//! Model metadata.
//!
//! Shared metadata types describing what a packaged model expects as input
//! and how its raw outputs should be read back as a prediction.

/// Type of machine learning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskKind {
    /// Regression (continuous target).
    #[default]
    Regression,
    /// Binary classification (2 classes).
    BinaryClassification,
    /// Multi-class classification (3+ classes).
    MulticlassClassification {
        /// Number of classes.
        n_classes: usize,
    },
    /// Ranking task. Scores are reported as-is.
    Ranking,
}

impl TaskKind {
    /// Returns the number of output groups for this task.
    pub fn n_groups(&self) -> usize {
        match self {
            Self::Regression => 1,
            Self::BinaryClassification => 1,
            Self::MulticlassClassification { n_classes } => *n_classes,
            Self::Ranking => 1,
        }
    }

    /// Returns true if this is a classification task.
    pub fn is_classification(&self) -> bool {
        matches!(
            self,
            Self::BinaryClassification | Self::MulticlassClassification { .. }
        )
    }
}

/// Shared metadata for all model types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMeta {
    /// Task type.
    pub task: TaskKind,
    /// Number of input features.
    pub n_features: usize,
    /// Feature names in model input order (optional).
    ///
    /// When present, input rows are aligned to the model by column name
    /// instead of by position.
    pub feature_names: Option<Vec<String>>,
    /// Human readable class labels for classification tasks (optional).
    pub class_labels: Option<Vec<String>>,
}

impl ModelMeta {
    /// Create metadata for a regression task.
    pub fn for_regression(n_features: usize) -> Self {
        Self {
            task: TaskKind::Regression,
            n_features,
            ..Default::default()
        }
    }

    /// Create metadata for binary classification.
    pub fn for_binary_classification(n_features: usize) -> Self {
        Self {
            task: TaskKind::BinaryClassification,
            n_features,
            ..Default::default()
        }
    }

    /// Create metadata for multi-class classification.
    pub fn for_multiclass(n_features: usize, n_classes: usize) -> Self {
        Self {
            task: TaskKind::MulticlassClassification { n_classes },
            n_features,
            ..Default::default()
        }
    }

    /// Number of output groups.
    pub fn n_groups(&self) -> usize {
        self.task.n_groups()
    }

    /// Set feature names.
    pub fn with_feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Set class labels.
    pub fn with_class_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.class_labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_kind_n_groups() {
        assert_eq!(TaskKind::Regression.n_groups(), 1);
        assert_eq!(TaskKind::BinaryClassification.n_groups(), 1);
        assert_eq!(
            TaskKind::MulticlassClassification { n_classes: 5 }.n_groups(),
            5
        );
    }

    #[test]
    fn meta_builders() {
        let meta = ModelMeta::for_binary_classification(2)
            .with_feature_names(["age", "sex"])
            .with_class_labels(["no", "yes"]);

        assert!(meta.task.is_classification());
        assert_eq!(meta.n_groups(), 1);
        assert_eq!(
            meta.feature_names.as_deref(),
            Some(&["age".to_string(), "sex".to_string()][..])
        );
        assert_eq!(meta.class_labels.as_ref().map(Vec::len), Some(2));
    }
}
