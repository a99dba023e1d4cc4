//! Forest of decision trees with per-group base scores.

use super::tree::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("forest has {n_groups} output groups but {len} base scores")]
    BaseScoreLenMismatch { n_groups: u32, len: usize },
    #[error("forest has {n_trees} trees but {len} tree group assignments")]
    TreeGroupsLenMismatch { n_trees: usize, len: usize },
    #[error("tree {tree_idx} is assigned to group {group} but the forest has {n_groups} groups")]
    TreeGroupOutOfRange {
        tree_idx: usize,
        group: u32,
        n_groups: u32,
    },
    #[error("tree {tree_idx}: {error}")]
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// Forest of decision trees.
///
/// Each tree contributes to exactly one output group; multi-class models
/// carry one group per class.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    tree_groups: Vec<u32>,
    n_groups: u32,
    base_score: Vec<f32>,
}

impl Forest {
    /// Create an empty forest with the given number of groups.
    pub fn new(n_groups: u32) -> Self {
        Self {
            trees: Vec::new(),
            tree_groups: Vec::new(),
            n_groups,
            base_score: vec![0.0; n_groups as usize],
        }
    }

    /// Create a forest for regression (single output group).
    pub fn for_regression() -> Self {
        Self::new(1)
    }

    /// Set the base score for all groups.
    pub fn with_base_score(mut self, base_score: Vec<f32>) -> Self {
        self.base_score = base_score;
        self
    }

    /// Add a tree to the forest.
    pub fn push_tree(&mut self, tree: Tree, group: u32) {
        self.trees.push(tree);
        self.tree_groups.push(group);
    }

    /// Builder-style [`push_tree`](Self::push_tree).
    pub fn with_tree(mut self, tree: Tree, group: u32) -> Self {
        self.push_tree(tree, group);
        self
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn n_groups(&self) -> u32 {
        self.n_groups
    }

    #[inline]
    pub fn base_score(&self) -> &[f32] {
        &self.base_score
    }

    #[inline]
    pub fn tree_groups(&self) -> &[u32] {
        &self.tree_groups
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Validate structural invariants (trees, group assignments, base score).
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if self.base_score.len() != self.n_groups as usize {
            return Err(ForestValidationError::BaseScoreLenMismatch {
                n_groups: self.n_groups,
                len: self.base_score.len(),
            });
        }
        if self.tree_groups.len() != self.trees.len() {
            return Err(ForestValidationError::TreeGroupsLenMismatch {
                n_trees: self.trees.len(),
                len: self.tree_groups.len(),
            });
        }

        for (tree_idx, &group) in self.tree_groups.iter().enumerate() {
            if group >= self.n_groups {
                return Err(ForestValidationError::TreeGroupOutOfRange {
                    tree_idx,
                    group,
                    n_groups: self.n_groups,
                });
            }
        }

        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }

        Ok(())
    }

    /// Predict raw margins for a single row of features.
    ///
    /// Returns one value per output group: the group's base score plus the
    /// leaf values of every tree assigned to it.
    pub fn predict_row(&self, features: &[f32]) -> Vec<f32> {
        let mut output = self.base_score.clone();
        for (tree, &group) in self.trees.iter().zip(&self.tree_groups) {
            output[group as usize] += tree.predict_row(features);
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::categories::CategoriesStorage;
    use crate::model::tree::SplitType;

    fn stump(feature: u32, threshold: f32, left: f32, right: f32) -> Tree {
        Tree::new(
            vec![feature, 0, 0],
            vec![threshold, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![0.0, left, right],
            vec![SplitType::Numeric; 3],
            CategoriesStorage::empty(),
        )
    }

    #[test]
    fn regression_sums_trees_and_base_score() {
        let forest = Forest::for_regression()
            .with_base_score(vec![0.5])
            .with_tree(stump(0, 1.0, 1.0, 2.0), 0)
            .with_tree(stump(1, 0.0, 10.0, 20.0), 0);

        assert_eq!(forest.validate(), Ok(()));
        assert_eq!(forest.predict_row(&[0.0, 1.0]), vec![0.5 + 1.0 + 20.0]);
        assert_eq!(forest.predict_row(&[2.0, -1.0]), vec![0.5 + 2.0 + 10.0]);
    }

    #[test]
    fn multiclass_accumulates_per_group() {
        let forest = Forest::new(3)
            .with_tree(Tree::constant(1.0), 0)
            .with_tree(Tree::constant(2.0), 1)
            .with_tree(Tree::constant(3.0), 2)
            .with_tree(Tree::constant(4.0), 1);

        assert_eq!(forest.predict_row(&[]), vec![1.0, 6.0, 3.0]);
    }

    #[test]
    fn group_out_of_range_is_rejected() {
        let forest = Forest::new(2).with_tree(Tree::constant(1.0), 2);
        assert!(matches!(
            forest.validate(),
            Err(ForestValidationError::TreeGroupOutOfRange { group: 2, .. })
        ));
    }

    #[test]
    fn base_score_len_is_checked() {
        let forest = Forest::new(2).with_base_score(vec![0.0]);
        assert_eq!(
            forest.validate(),
            Err(ForestValidationError::BaseScoreLenMismatch { n_groups: 2, len: 1 })
        );
    }
}
