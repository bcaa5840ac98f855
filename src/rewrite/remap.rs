//! Index remapper.
//!
//! Sort and distribution keys index into the output of the immediately
//! enclosing projection, so every projection rewrite must be mirrored
//! on the enclosing keys. Two distinct situations arise:
//!
//! - columns are *inserted* at a fixed point (static partitions):
//!   references at or past the insertion point shift right;
//! - columns are *reordered or padded* (destination schema
//!   reconciliation): every reference is looked up in an old-to-new
//!   column map, and a reference with no new position is an error.

use smol_str::format_smolstr;

use crate::errors::{AlignError, Entity};
use crate::ir::operator::CollationEntry;
use crate::ir::relation::DeclaredType;

/// Source of a single output column of a reconciled projection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ColumnMapEntry {
    /// The column at this old position survives at the new position.
    Keep(usize),
    /// No source column; a typed NULL literal is materialized.
    SynthesizeNull(DeclaredType),
}

/// Old-to-new column-position mapping produced by the reconciler.
///
/// Position `i` of the map describes where the `i`-th output column of
/// the rebuilt projection comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnIndexMap {
    entries: Vec<ColumnMapEntry>,
}

impl ColumnIndexMap {
    #[must_use]
    pub fn new(entries: Vec<ColumnMapEntry>) -> Self {
        ColumnIndexMap { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnMapEntry> {
        self.entries.iter()
    }

    /// New position of the column that used to live at `old`.
    #[must_use]
    pub fn position_of(&self, old: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| *entry == ColumnMapEntry::Keep(old))
    }
}

/// Shifts collation entries selected by the predicate by `delta`.
#[must_use]
pub fn shift_collation<F>(
    collation: &[CollationEntry],
    needs_shift: F,
    delta: usize,
) -> Vec<CollationEntry>
where
    F: Fn(usize) -> bool,
{
    collation
        .iter()
        .map(|entry| {
            let index = if needs_shift(entry.index) {
                entry.index + delta
            } else {
                entry.index
            };
            CollationEntry::new(index, entry.direction.clone())
        })
        .collect()
}

/// Shifts distribution keys selected by the predicate by `delta`.
#[must_use]
pub fn shift_dist_keys<F>(keys: &[usize], needs_shift: F, delta: usize) -> Vec<usize>
where
    F: Fn(usize) -> bool,
{
    keys.iter()
        .map(|key| if needs_shift(*key) { *key + delta } else { *key })
        .collect()
}

/// Remaps collation entries through an old-to-new column map.
///
/// # Errors
/// - A collation entry references a column the map dropped.
pub fn remap_collation(
    collation: &[CollationEntry],
    map: &ColumnIndexMap,
) -> Result<Vec<CollationEntry>, AlignError> {
    collation
        .iter()
        .map(|entry| {
            let index = map.position_of(entry.index).ok_or_else(|| {
                AlignError::DanglingReference(
                    Entity::Collation,
                    format_smolstr!("sort key at old position {}", entry.index),
                )
            })?;
            Ok(CollationEntry::new(index, entry.direction.clone()))
        })
        .collect()
}

/// Remaps distribution keys through an old-to-new column map.
///
/// # Errors
/// - A key references a column the map dropped.
pub fn remap_dist_keys(keys: &[usize], map: &ColumnIndexMap) -> Result<Vec<usize>, AlignError> {
    keys.iter()
        .map(|key| {
            map.position_of(*key).ok_or_else(|| {
                AlignError::DanglingReference(
                    Entity::DistributionKey,
                    format_smolstr!("distribution key at old position {key}"),
                )
            })
        })
        .collect()
}
