//! Comparison selection
//!
//! The set of tests picked for side-by-side comparison. The caller owns it;
//! there is no process-wide selection.

use crate::alignment::{align, Alignment};
use crate::config::LabConfig;
use crate::error::{LabError, SelectionError};
use crate::types::{Test, TestId};
use serde::{Deserialize, Serialize};

/// Bounded, ordered set of selected tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSelection {
    max_selected: usize,
    ids: Vec<TestId>,
}

impl Default for ComparisonSelection {
    fn default() -> Self {
        Self::new(3)
    }
}

impl ComparisonSelection {
    /// Create an empty selection holding at most `max_selected` tests
    #[inline]
    #[must_use]
    pub fn new(max_selected: usize) -> Self {
        Self {
            max_selected,
            ids: Vec::with_capacity(max_selected),
        }
    }

    /// Create an empty selection sized by configuration
    #[inline]
    #[must_use]
    pub fn from_config(config: &LabConfig) -> Self {
        Self::new(config.comparison.max_selected)
    }

    /// Add `id` if absent, remove it if present
    ///
    /// Returns whether `id` is selected afterwards. Adding to a full
    /// selection fails and leaves it unchanged.
    pub fn toggle(&mut self, id: TestId) -> Result<bool, SelectionError> {
        if let Some(position) = self.ids.iter().position(|s| *s == id) {
            self.ids.remove(position);
            return Ok(false);
        }
        if self.is_full() {
            return Err(SelectionError::Full(self.max_selected));
        }
        self.ids.push(id);
        Ok(true)
    }

    /// Drop every selected test
    #[inline]
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected identifiers in selection order
    #[inline]
    #[must_use]
    pub fn ids(&self) -> &[TestId] {
        &self.ids
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn contains(&self, id: TestId) -> bool {
        self.ids.contains(&id)
    }

    /// Number of selected tests
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if nothing is selected
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check if no further test can be added
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.ids.len() >= self.max_selected
    }

    /// Look up the selected tests in `tests`, in selection order
    pub fn resolve<'a>(&self, tests: &'a [Test]) -> Result<Vec<&'a Test>, SelectionError> {
        self.ids
            .iter()
            .map(|id| {
                tests
                    .iter()
                    .find(|t| t.id == Some(*id))
                    .ok_or(SelectionError::UnknownTest(*id))
            })
            .collect()
    }

    /// Align the selected tests
    pub fn align(&self, tests: &[Test]) -> Result<Alignment, LabError> {
        let selected: Vec<Test> = self.resolve(tests)?.into_iter().cloned().collect();
        Ok(align(&selected)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measurement::CompactionPoint;
    use crate::types::{TestType, UserId};
    use pretty_assertions::assert_eq;

    fn test(id: i64, test_type: TestType) -> Test {
        Test::new(test_type, UserId(1)).with_id(TestId(id))
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut selection = ComparisonSelection::new(3);
        assert_eq!(selection.toggle(TestId(1)), Ok(true));
        assert!(selection.contains(TestId(1)));
        assert_eq!(selection.toggle(TestId(1)), Ok(false));
        assert!(selection.is_empty());
    }

    #[test]
    fn full_selection_rejects_new_but_allows_removal() {
        let mut selection = ComparisonSelection::new(2);
        selection.toggle(TestId(1)).unwrap();
        selection.toggle(TestId(2)).unwrap();
        assert_eq!(selection.toggle(TestId(3)), Err(SelectionError::Full(2)));
        assert_eq!(selection.ids(), &[TestId(1), TestId(2)]);
        assert_eq!(selection.toggle(TestId(2)), Ok(false));
        assert_eq!(selection.toggle(TestId(3)), Ok(true));
    }

    #[test]
    fn sized_by_config() {
        let config = LabConfig::new().with_max_selected(1);
        let mut selection = ComparisonSelection::from_config(&config);
        selection.toggle(TestId(1)).unwrap();
        assert!(selection.is_full());
    }

    #[test]
    fn resolve_keeps_selection_order() {
        let tests = vec![test(1, TestType::Compaction), test(2, TestType::Compaction)];
        let mut selection = ComparisonSelection::default();
        selection.toggle(TestId(2)).unwrap();
        selection.toggle(TestId(1)).unwrap();
        let resolved: Vec<Option<TestId>> =
            selection.resolve(&tests).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(resolved, vec![Some(TestId(2)), Some(TestId(1))]);

        selection.clear();
        selection.toggle(TestId(9)).unwrap();
        assert_eq!(
            selection.resolve(&tests).unwrap_err(),
            SelectionError::UnknownTest(TestId(9))
        );
    }

    #[test]
    fn align_selected() {
        let a = test(1, TestType::Compaction).with_points(vec![CompactionPoint::new(10.0)
            .with_dry_density(1.8)
            .into()]);
        let b = test(2, TestType::BearingRatio);
        let tests = vec![a, b];

        let mut selection = ComparisonSelection::default();
        selection.toggle(TestId(1)).unwrap();
        let table = selection.align(&tests).unwrap();
        assert_eq!(table.rows.len(), 1);

        selection.toggle(TestId(2)).unwrap();
        assert!(matches!(selection.align(&tests), Err(LabError::Alignment(_))));
    }
}
