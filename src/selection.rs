//! Tracks which variants the user has marked for rendering.

use std::collections::BTreeSet;

use crate::error::CopyforgeError;

/// Ordered set of selected variant indices, bounded by the current sequence length.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    bound: usize,
    selected: BTreeSet<usize>,
}

impl SelectionTracker {
    /// Empty selection over a sequence of `bound` variants.
    pub fn new(bound: usize) -> Self {
        Self {
            bound,
            selected: BTreeSet::new(),
        }
    }

    /// Flips the selection state of `index`, returning whether it is now selected.
    pub fn toggle(&mut self, index: usize) -> Result<bool, CopyforgeError> {
        if index >= self.bound {
            return Err(CopyforgeError::Precondition(format!(
                "Variant {} does not exist (only {} generated)",
                index + 1,
                self.bound
            )));
        }
        if self.selected.remove(&index) {
            Ok(false)
        } else {
            self.selected.insert(index);
            Ok(true)
        }
    }

    /// Whether `index` is currently selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    /// Currently selected indices, ascending.
    pub fn current(&self) -> Vec<usize> {
        self.selected.iter().copied().collect()
    }

    /// Number of selected variants.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// True when nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Clears the selection, keeping the bound.
    pub fn reset(&mut self) {
        self.selected.clear();
    }

    /// Clears the selection and rebinds it to a new sequence length.
    pub fn rebind(&mut self, bound: usize) {
        self.bound = bound;
        self.reset();
    }
}
