//! Referential-integrity rules between sheets and categories
//!
//! These are pure functions; the server wires them to a store and to the
//! broadcaster.

use crate::error::{CatalogError, Result};
use catalog_types::Sheet;
use std::collections::HashSet;

/// Keep only the requested ids that name an existing category.
///
/// Unknown ids are dropped without error. Order follows `requested` and a
/// repeated id keeps its first position only.
pub fn filter_valid_category_refs(requested: &[i64], existing: &[i64]) -> Vec<i64> {
    let existing: HashSet<i64> = existing.iter().copied().collect();
    let mut seen = HashSet::new();
    requested
        .iter()
        .copied()
        .filter(|id| existing.contains(id) && seen.insert(*id))
        .collect()
}

/// Next id for a collection: one past the current maximum, `1` when empty.
///
/// Deleting the highest record frees its id for reuse. Fails when the
/// maximum is already `i64::MAX`.
pub fn allocate_id(ids: impl IntoIterator<Item = i64>) -> Result<i64> {
    ids.into_iter()
        .max()
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| CatalogError::validation("No ids left to allocate"))
}

/// Split sheets into `(referencing, unreferenced)` by `category_id`.
pub fn partition_by_reference(sheets: Vec<Sheet>, category_id: i64) -> (Vec<Sheet>, Vec<Sheet>) {
    sheets
        .into_iter()
        .partition(|sheet| sheet.references(category_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(id: i64, categories: Vec<i64>) -> Sheet {
        let mut sheet = Sheet::new(id, format!("Sheet {id}"), format!("http://{id}"));
        sheet.categories = categories;
        sheet
    }

    #[test]
    fn test_filter_drops_unknown_and_keeps_order() {
        assert_eq!(filter_valid_category_refs(&[3, 99, 1], &[1, 2, 3]), vec![3, 1]);
        assert_eq!(filter_valid_category_refs(&[1, 99], &[1]), vec![1]);
        assert!(filter_valid_category_refs(&[5], &[]).is_empty());
    }

    #[test]
    fn test_filter_collapses_duplicates() {
        assert_eq!(filter_valid_category_refs(&[2, 1, 2], &[1, 2]), vec![2, 1]);
    }

    #[test]
    fn test_allocate_id() {
        assert_eq!(allocate_id(Vec::new()).unwrap(), 1);
        assert_eq!(allocate_id(vec![1, 5, 3]).unwrap(), 6);
    }

    #[test]
    fn test_allocate_id_reuses_after_deleting_highest() {
        let mut ids = vec![1, 2, 3];
        ids.retain(|id| *id != 3);
        assert_eq!(allocate_id(ids).unwrap(), 3);
    }

    #[test]
    fn test_allocate_id_does_not_overflow() {
        let err = allocate_id(vec![1, i64::MAX]).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(allocate_id(vec![i64::MAX - 1]).unwrap(), i64::MAX);
    }

    #[test]
    fn test_partition_by_reference() {
        let sheets = vec![sheet(1, vec![1]), sheet(2, vec![2]), sheet(3, vec![2, 1]), sheet(4, vec![])];
        let (removed, survivors) = partition_by_reference(sheets, 1);
        let ids = |sheets: &[Sheet]| sheets.iter().map(|s| s.id).collect::<Vec<i64>>();
        assert_eq!(ids(&removed), vec![1, 3]);
        assert_eq!(ids(&survivors), vec![2, 4]);
    }
}
