//! Projected-size level-of-detail selection
//!
//! A boundary node with a threshold table shows at most one child per frame:
//! the highest-detail level whose threshold the current projected size has
//! reached. Thresholds ascend with detail, so index 0 is the coarsest level.

use log::debug;

use crate::core::error::Error;
use crate::core::types::Result;

/// Strictly ascending projected-size thresholds, one per level.
#[derive(Clone, Debug, PartialEq)]
pub struct LodTable {
    thresholds: Vec<f64>,
}

impl LodTable {
    /// Validate and build a table.
    ///
    /// # Examples
    /// ```
    /// use rktri_bounds::scene::lod::LodTable;
    ///
    /// assert!(LodTable::new(vec![10.0, 200.0, 400.0]).is_ok());
    /// assert!(LodTable::new(vec![10.0, 10.0]).is_err());
    /// assert!(LodTable::new(vec![400.0, 200.0]).is_err());
    /// ```
    pub fn new(thresholds: Vec<f64>) -> Result<Self> {
        for (index, pair) in thresholds.windows(2).enumerate() {
            // Written as !(a < b) so NaN is rejected too
            if !(pair[0] < pair[1]) {
                return Err(Error::LevelsNotAscending {
                    index: index + 1,
                    previous: pair[0],
                    value: pair[1],
                });
            }
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.thresholds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.thresholds.is_empty()
    }

    /// Check the table against the number of children it dispatches to.
    ///
    /// A table needs one child per level, except that a single shared child
    /// (or none yet) is accepted for any table length.
    pub fn validate_children(&self, children: usize) -> Result<()> {
        if children > 1 && children != self.len() {
            return Err(Error::LevelCountMismatch {
                levels: self.len(),
                children,
            });
        }
        Ok(())
    }

    /// Highest level whose threshold does not exceed `size`.
    ///
    /// # Examples
    /// ```
    /// use rktri_bounds::scene::lod::LodTable;
    ///
    /// let table = LodTable::new(vec![10.0, 200.0, 400.0, 600.0]).unwrap();
    /// assert_eq!(table.select(250.0), Some(1));
    /// assert_eq!(table.select(1000.0), Some(3));
    /// assert_eq!(table.select(5.0), None); // too small to draw
    /// ```
    pub fn select(&self, size: f64) -> Option<usize> {
        self.thresholds.iter().rposition(|&t| t <= size)
    }
}

/// Selected level as reported to listeners: -1 for none.
pub fn level_index(level: Option<usize>) -> i32 {
    level.map_or(-1, |l| l as i32)
}

/// A change of selected level produced by one evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelTransition {
    pub previous: Option<usize>,
    pub current: Option<usize>,
}

/// Optional LOD table plus the level selected on the last evaluation.
#[derive(Clone, Debug, Default)]
pub struct LodSelector {
    table: Option<LodTable>,
    selected: Option<usize>,
}

impl LodSelector {
    /// Selector for an optional threshold list, validated against `children`.
    /// An empty list disables LOD.
    pub fn new(levels: Option<Vec<f64>>, children: usize) -> Result<Self> {
        let mut selector = Self::default();
        selector.set_levels(levels, children)?;
        Ok(selector)
    }

    /// Replace the table. On error the previous table and selection are kept.
    pub fn set_levels(&mut self, levels: Option<Vec<f64>>, children: usize) -> Result<()> {
        let table = match levels {
            Some(levels) if !levels.is_empty() => {
                let table = LodTable::new(levels)?;
                table.validate_children(children)?;
                Some(table)
            }
            _ => None,
        };
        debug!("LOD table set to {:?}", table.as_ref().map(LodTable::thresholds));
        self.table = table;
        Ok(())
    }

    /// Drop the table. The selection is cleared on the next update.
    pub fn clear(&mut self) {
        if self.table.take().is_some() {
            debug!("LOD table cleared");
        }
    }

    pub fn table(&self) -> Option<&LodTable> {
        self.table.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.table.is_some()
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select from a projected size; `None` clears the selection. Returns the
    /// transition if the selection changed.
    pub fn update(&mut self, size: Option<f64>) -> Option<LevelTransition> {
        let current = match (&self.table, size) {
            (Some(table), Some(size)) => table.select(size),
            _ => None,
        };
        let previous = std::mem::replace(&mut self.selected, current);
        (previous != current).then_some(LevelTransition { previous, current })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> LodTable {
        LodTable::new(vec![10.0, 200.0, 400.0, 600.0]).unwrap()
    }

    #[test]
    fn test_select_examples() {
        let t = table();
        assert_eq!(t.select(250.0), Some(1));
        assert_eq!(t.select(5.0), None);
        assert_eq!(t.select(1000.0), Some(3));
    }

    #[test]
    fn test_select_boundaries() {
        let t = table();
        assert_eq!(t.select(10.0), Some(0));
        assert_eq!(t.select(199.999), Some(0));
        assert_eq!(t.select(200.0), Some(1));
        assert_eq!(t.select(600.0), Some(3));
        assert_eq!(t.select(f64::NAN), None);
    }

    #[test]
    fn test_select_is_monotonic() {
        let t = table();
        let mut prev = None;
        for i in 0..800 {
            let level = t.select(i as f64);
            assert!(level >= prev, "selection went down at size {}", i);
            prev = level;
        }
    }

    #[test]
    fn test_rejects_duplicates_and_descending() {
        match LodTable::new(vec![1.0, 2.0, 2.0]) {
            Err(Error::LevelsNotAscending { index, previous, value }) => {
                assert_eq!(index, 2);
                assert_eq!(previous, 2.0);
                assert_eq!(value, 2.0);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(LodTable::new(vec![5.0, 1.0]).is_err());
        assert!(LodTable::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_validate_children() {
        let t = table();
        assert!(t.validate_children(4).is_ok());
        assert!(t.validate_children(1).is_ok());
        assert!(t.validate_children(0).is_ok());
        assert!(matches!(
            t.validate_children(3),
            Err(Error::LevelCountMismatch { levels: 4, children: 3 })
        ));
    }

    #[test]
    fn test_level_index() {
        assert_eq!(level_index(None), -1);
        assert_eq!(level_index(Some(2)), 2);
    }

    #[test]
    fn test_selector_transitions() {
        let mut selector = LodSelector::new(Some(vec![10.0, 200.0]), 2).unwrap();
        assert_eq!(selector.selected(), None);

        let change = selector.update(Some(50.0));
        assert_eq!(change, Some(LevelTransition { previous: None, current: Some(0) }));
        assert_eq!(selector.update(Some(60.0)), None);

        let change = selector.update(Some(300.0));
        assert_eq!(change, Some(LevelTransition { previous: Some(0), current: Some(1) }));

        let change = selector.update(Some(1.0));
        assert_eq!(change, Some(LevelTransition { previous: Some(1), current: None }));
        assert_eq!(selector.update(None), None);
    }

    #[test]
    fn test_selector_failed_reconfigure_keeps_state() {
        let mut selector = LodSelector::new(Some(vec![10.0, 200.0]), 2).unwrap();
        selector.update(Some(500.0));

        assert!(selector.set_levels(Some(vec![1.0, 2.0, 3.0]), 2).is_err());
        assert_eq!(selector.table().unwrap().thresholds(), &[10.0, 200.0]);
        assert_eq!(selector.selected(), Some(1));
    }

    #[test]
    fn test_clear_disables_and_next_update_drops_selection() {
        let mut selector = LodSelector::new(Some(vec![10.0, 200.0]), 2).unwrap();
        selector.update(Some(50.0));
        selector.clear();
        assert!(!selector.is_enabled());
        assert_eq!(selector.selected(), Some(0));

        let change = selector.update(Some(50.0));
        assert_eq!(change, Some(LevelTransition { previous: Some(0), current: None }));
    }

    #[test]
    fn test_empty_levels_disable_lod() {
        let selector = LodSelector::new(Some(Vec::new()), 3).unwrap();
        assert!(!selector.is_enabled());
        let selector = LodSelector::new(None, 3).unwrap();
        assert!(!selector.is_enabled());
    }
}
