//! Structure-of-arrays decision tree.
//!
//! This module provides:
//! - [`Tree`]: immutable tree storage and single-row traversal
//! - [`TreeValidationError`]: structural validation errors

// Tree construction takes one array per node attribute.
#![allow(clippy::too_many_arguments)]

use super::categories::{CategoriesStorage, float_to_category};

/// Node index local to a tree (0 = root).
pub type NodeId = u32;

/// Type of split in a decision tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitType {
    /// Numeric split: go left if value < threshold.
    #[default]
    Numeric,
    /// Categorical split: go right if the category is in the node's set.
    Categorical,
}

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    /// Tree has no nodes.
    #[error("tree has no nodes")]
    EmptyTree,
    /// A per-node array does not have one entry per node.
    #[error("{field} has {len} entries, expected {n_nodes}")]
    LenMismatch {
        field: &'static str,
        len: usize,
        n_nodes: usize,
    },
    /// A child pointer references an out-of-bounds node.
    #[error("node {node} has {side} child {child} but the tree has {n_nodes} nodes")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    /// A node references itself as a child.
    #[error("node {node} references itself as a child")]
    SelfLoop { node: NodeId },
    /// A node was reached by more than one path.
    #[error("node {node} is reachable by more than one path")]
    DuplicateVisit { node: NodeId },
    /// A node exists in storage but is unreachable from the root.
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
    split_types: Box<[SplitType]>,
    categories: CategoriesStorage,
}

impl Tree {
    /// Create a new tree from parallel arrays.
    ///
    /// Every array holds one entry per node. Call [`Tree::validate`] before
    /// traversing a tree that came from untrusted input.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f32>,
        split_types: Vec<SplitType>,
        categories: CategoriesStorage,
    ) -> Self {
        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            split_types: split_types.into_boxed_slice(),
            categories,
        }
    }

    /// A tree with a single leaf.
    pub fn constant(value: f32) -> Self {
        Self::new(
            vec![0],
            vec![0.0],
            vec![0],
            vec![0],
            vec![false],
            vec![true],
            vec![value],
            vec![SplitType::Numeric],
            CategoriesStorage::empty(),
        )
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.split_indices.len()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn split_type(&self, node: NodeId) -> SplitType {
        self.split_types[node as usize]
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    #[inline]
    pub fn categories(&self) -> &CategoriesStorage {
        &self.categories
    }

    /// Largest feature index referenced by a split, if any.
    pub fn max_split_index(&self) -> Option<u32> {
        (0..self.n_nodes() as NodeId)
            .filter(|&n| !self.is_leaf(n))
            .map(|n| self.split_index(n))
            .max()
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Traverse the tree to the leaf reached by `features`.
    ///
    /// NaN values (and features past the end of the slice) follow the
    /// node's default direction.
    pub fn traverse_to_leaf(&self, features: &[f32]) -> NodeId {
        let mut node: NodeId = 0;

        while !self.is_leaf(node) {
            let fvalue = features
                .get(self.split_index(node) as usize)
                .copied()
                .unwrap_or(f32::NAN);

            node = if fvalue.is_nan() {
                if self.default_left(node) {
                    self.left_child(node)
                } else {
                    self.right_child(node)
                }
            } else {
                match self.split_type(node) {
                    SplitType::Numeric => {
                        if fvalue < self.split_threshold(node) {
                            self.left_child(node)
                        } else {
                            self.right_child(node)
                        }
                    }
                    SplitType::Categorical => match float_to_category(fvalue) {
                        Some(category) if self.categories.category_goes_right(node, category) => {
                            self.right_child(node)
                        }
                        _ => self.left_child(node),
                    },
                }
            };
        }

        node
    }

    /// Leaf value reached by a single row of features.
    #[inline]
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.leaf_value(self.traverse_to_leaf(features))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate the structural invariants traversal relies on.
    ///
    /// Checks array lengths, child bounds, and that the nodes form a tree
    /// rooted at node 0 (no cycles, no shared children, nothing orphaned).
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        let lengths = [
            ("thresholds", self.split_thresholds.len()),
            ("children_left", self.left_children.len()),
            ("children_right", self.right_children.len()),
            ("default_left", self.default_left.len()),
            ("is_leaf", self.is_leaf.len()),
            ("leaf_values", self.leaf_values.len()),
            ("split_types", self.split_types.len()),
        ];
        for (field, len) in lengths {
            if len != n_nodes {
                return Err(TreeValidationError::LenMismatch {
                    field,
                    len,
                    n_nodes,
                });
            }
        }
        if !self.categories.is_empty() && self.categories.n_segments() != n_nodes {
            return Err(TreeValidationError::LenMismatch {
                field: "categories",
                len: self.categories.n_segments(),
                n_nodes,
            });
        }

        let mut visited = vec![false; n_nodes];
        let mut stack: Vec<NodeId> = vec![0];

        while let Some(node) = stack.pop() {
            if visited[node as usize] {
                return Err(TreeValidationError::DuplicateVisit { node });
            }
            visited[node as usize] = true;

            if self.is_leaf(node) {
                continue;
            }

            for (side, child) in [
                ("left", self.left_child(node)),
                ("right", self.right_child(node)),
            ] {
                if child == node {
                    return Err(TreeValidationError::SelfLoop { node });
                }
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
                stack.push(child);
            }
        }

        match visited.iter().position(|&v| !v) {
            Some(node) => Err(TreeValidationError::UnreachableNode { node: node as NodeId }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// root: x0 < 0.5 ? leaf(1.0) : leaf(2.0), missing goes left
    fn stump() -> Tree {
        Tree::new(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![0.0, 1.0, 2.0],
            vec![SplitType::Numeric; 3],
            CategoriesStorage::empty(),
        )
    }

    /// root: category of x1 in {1, 3} ? leaf(10.0) : leaf(-10.0)
    fn categorical_stump() -> Tree {
        Tree::new(
            vec![1, 0, 0],
            vec![0.0, 0.0, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![false, false, false],
            vec![false, true, true],
            vec![0.0, -10.0, 10.0],
            vec![SplitType::Categorical, SplitType::Numeric, SplitType::Numeric],
            CategoriesStorage::from_sets(3, [(0u32, &[1u32, 3][..])]),
        )
    }

    #[test]
    fn numeric_split_routes_by_threshold() {
        let tree = stump();
        assert_eq!(tree.predict_row(&[0.2]), 1.0);
        assert_eq!(tree.predict_row(&[0.5]), 2.0);
        assert_eq!(tree.predict_row(&[f32::NAN]), 1.0);
        // Missing feature column follows the default direction too
        assert_eq!(tree.predict_row(&[]), 1.0);
    }

    #[test]
    fn categorical_split_routes_members_right() {
        let tree = categorical_stump();
        assert_eq!(tree.predict_row(&[0.0, 1.0]), 10.0);
        assert_eq!(tree.predict_row(&[0.0, 3.0]), 10.0);
        assert_eq!(tree.predict_row(&[0.0, 2.0]), -10.0);
        assert_eq!(tree.predict_row(&[0.0, 1.5]), -10.0);
        // default_left = false
        assert_eq!(tree.predict_row(&[0.0, f32::NAN]), 10.0);
    }

    #[test]
    fn valid_trees_pass() {
        assert_eq!(stump().validate(), Ok(()));
        assert_eq!(categorical_stump().validate(), Ok(()));
        assert_eq!(Tree::constant(3.0).validate(), Ok(()));
        assert_eq!(stump().max_split_index(), Some(0));
        assert_eq!(Tree::constant(3.0).max_split_index(), None);
    }

    #[test]
    fn out_of_bounds_child_is_rejected() {
        let tree = Tree::new(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![7, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![0.0, 1.0, 2.0],
            vec![SplitType::Numeric; 3],
            CategoriesStorage::empty(),
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::ChildOutOfBounds { side: "left", child: 7, .. })
        ));
    }

    #[test]
    fn shared_child_is_rejected() {
        let tree = Tree::new(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![1, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![0.0, 1.0, 2.0],
            vec![SplitType::Numeric; 3],
            CategoriesStorage::empty(),
        );
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::DuplicateVisit { node: 1 })
        );
    }

    #[test]
    fn orphan_node_is_rejected() {
        let tree = Tree::new(
            vec![0, 0],
            vec![0.0, 0.0],
            vec![0, 0],
            vec![0, 0],
            vec![false, false],
            vec![true, true],
            vec![1.0, 2.0],
            vec![SplitType::Numeric; 2],
            CategoriesStorage::empty(),
        );
        assert_eq!(
            tree.validate(),
            Err(TreeValidationError::UnreachableNode { node: 1 })
        );
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let tree = Tree::new(
            vec![0, 0, 0],
            vec![0.5, 0.0],
            vec![1, 0, 0],
            vec![2, 0, 0],
            vec![true, false, false],
            vec![false, true, true],
            vec![0.0, 1.0, 2.0],
            vec![SplitType::Numeric; 3],
            CategoriesStorage::empty(),
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::LenMismatch { field: "thresholds", .. })
        ));
    }
}
