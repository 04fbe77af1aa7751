//! Subsets of mesh elements.
use crate::{Grade, MAX_GRADE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A set of selected element ids per grade.
///
/// A selection restricts evaluation to a subset of the elements of a mesh. It holds no
/// reference to a mesh, so ids beyond the number of elements of a grade may be selected;
/// they are ignored when the selection is applied. Iteration is always in ascending id order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    selected: [BTreeSet<usize>; MAX_GRADE + 1],
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the given ids of a single grade to the selection.
    pub fn with_elements(mut self, grade: Grade, ids: impl IntoIterator<Item = usize>) -> Self {
        self.extend(grade, ids);
        self
    }

    /// Selects an element. Grades above the maximum grade are ignored.
    pub fn select(&mut self, grade: Grade, id: usize) {
        if let Some(set) = self.selected.get_mut(grade) {
            set.insert(id);
        }
    }

    pub fn extend(&mut self, grade: Grade, ids: impl IntoIterator<Item = usize>) {
        if let Some(set) = self.selected.get_mut(grade) {
            set.extend(ids);
        }
    }

    pub fn deselect(&mut self, grade: Grade, id: usize) -> bool {
        self.selected
            .get_mut(grade)
            .map(|set| set.remove(&id))
            .unwrap_or(false)
    }

    pub fn is_selected(&self, grade: Grade, id: usize) -> bool {
        self.selected
            .get(grade)
            .map(|set| set.contains(&id))
            .unwrap_or(false)
    }

    /// The selected ids of the given grade in ascending order, or `None` if no element of
    /// that grade is selected, in which case the selection stands for all elements of the grade.
    pub fn selected(&self, grade: Grade) -> Option<impl Iterator<Item = usize> + '_> {
        self.selected
            .get(grade)
            .filter(|set| !set.is_empty())
            .map(|set| set.iter().copied())
    }

    /// The number of selected elements of the given grade.
    pub fn len(&self, grade: Grade) -> usize {
        self.selected.get(grade).map(BTreeSet::len).unwrap_or(0)
    }

    pub fn is_empty(&self, grade: Grade) -> bool {
        self.len(grade) == 0
    }
}
