//! Categorical split storage for tree nodes.
//!
//! Categorical splits are stored as bitsets of the categories that go
//! right. Categories not in the set go left.

// =============================================================================
// CategoriesStorage
// =============================================================================

/// Packed bitsets for the categorical splits of one tree.
///
/// - `bitsets`: flat array of u32 words for all categorical nodes
/// - `segments`: per-node `(start, size)` into `bitsets`, `(0, 0)` for
///   nodes without a categorical split
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoriesStorage {
    bitsets: Box<[u32]>,
    segments: Box<[(u32, u32)]>,
}

impl CategoriesStorage {
    /// Create empty categories storage.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build storage from per-node category lists.
    ///
    /// `sets` pairs a node index with the categories that go right at that
    /// node. `n_nodes` sizes the segment table.
    pub fn from_sets<'a, I>(n_nodes: usize, sets: I) -> Self
    where
        I: IntoIterator<Item = (u32, &'a [u32])>,
    {
        let mut bitsets = Vec::new();
        let mut segments = vec![(0u32, 0u32); n_nodes];

        for (node, categories) in sets {
            let words = categories_to_bitset(categories);
            let start = bitsets.len() as u32;
            segments[node as usize] = (start, words.len() as u32);
            bitsets.extend(words);
        }

        Self {
            bitsets: bitsets.into_boxed_slice(),
            segments: segments.into_boxed_slice(),
        }
    }

    /// Whether this storage has any categorical data.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bitsets.is_empty()
    }

    /// Number of nodes covered by the segment table.
    #[inline]
    pub fn n_segments(&self) -> usize {
        self.segments.len()
    }

    /// Check if a category is in the "right" set for a given node.
    #[inline]
    pub fn category_goes_right(&self, node: u32, category: u32) -> bool {
        let Some(&(start, size)) = self.segments.get(node as usize) else {
            return false;
        };

        // 32 categories per word
        let word_idx = category >> 5;
        let bit_idx = category & 31;
        if word_idx >= size {
            return false;
        }

        let word = self.bitsets[(start + word_idx) as usize];
        (word >> bit_idx) & 1 != 0
    }

    /// Get the bitset words for a specific node.
    #[inline]
    pub fn bitset_for_node(&self, node: u32) -> &[u32] {
        match self.segments.get(node as usize) {
            Some(&(start, size)) => &self.bitsets[start as usize..(start + size) as usize],
            None => &[],
        }
    }

    /// Categories that go right at `node`, in ascending order.
    pub fn categories_for_node(&self, node: u32) -> Vec<u32> {
        bitset_to_categories(self.bitset_for_node(node))
    }
}

// =============================================================================
// Bitset Utilities
// =============================================================================

/// Convert a feature value to a category index.
///
/// Categorical features are carried as `f32` holding a non-negative
/// integer. Negative or fractional values are not valid categories and
/// return `None`, which routes the sample left.
#[inline]
pub fn float_to_category(value: f32) -> Option<u32> {
    if value >= 0.0 && value == value.trunc() && value <= u32::MAX as f32 {
        Some(value as u32)
    } else {
        None
    }
}

fn categories_to_bitset(categories: &[u32]) -> Vec<u32> {
    let Some(&max_cat) = categories.iter().max() else {
        return Vec::new();
    };

    let mut words = vec![0u32; ((max_cat >> 5) + 1) as usize];
    for &cat in categories {
        words[(cat >> 5) as usize] |= 1u32 << (cat & 31);
    }
    words
}

fn bitset_to_categories(words: &[u32]) -> Vec<u32> {
    let mut cats = Vec::new();
    for (word_idx, &word) in words.iter().enumerate() {
        if word == 0 {
            continue;
        }
        let base = (word_idx as u32) * 32;
        for bit in 0..32 {
            if (word >> bit) & 1 != 0 {
                cats.push(base + bit);
            }
        }
    }
    cats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goes_right_only_for_members() {
        let storage = CategoriesStorage::from_sets(2, [(0u32, &[1u32, 3, 40][..])]);

        assert!(storage.category_goes_right(0, 1));
        assert!(storage.category_goes_right(0, 3));
        assert!(storage.category_goes_right(0, 40));
        assert!(!storage.category_goes_right(0, 0));
        assert!(!storage.category_goes_right(0, 2));
        assert!(!storage.category_goes_right(0, 1000));
        // Node without a categorical split
        assert!(!storage.category_goes_right(1, 1));
    }

    #[test]
    fn sets_survive_packing() {
        let storage = CategoriesStorage::from_sets(1, [(0u32, &[33u32, 2, 7][..])]);
        assert_eq!(storage.categories_for_node(0), vec![2, 7, 33]);
        assert_eq!(storage.bitset_for_node(0).len(), 2);
    }

    #[test]
    fn float_to_category_rejects_non_integers() {
        assert_eq!(float_to_category(3.0), Some(3));
        assert_eq!(float_to_category(0.0), Some(0));
        assert_eq!(float_to_category(-1.0), None);
        assert_eq!(float_to_category(1.5), None);
        assert_eq!(float_to_category(f32::NAN), None);
    }
}
