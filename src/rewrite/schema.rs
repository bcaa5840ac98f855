//! Destination schema reconciler.
//!
//! Handles `INSERT INTO t (col, ...)` with an explicit column list:
//! reorders the projection output into the destination's declared
//! order and pads omitted columns with typed NULL literals. The rebuilt
//! projection is stacked on top of the analyzed one, so kept columns
//! become plain positional references.

use itertools::Itertools;
use smol_str::{format_smolstr, SmolStr};

use crate::errors::{AlignError, Entity};
use crate::ir::expression::ScalarExpr;
use crate::ir::operator::{Projection, Relational};
use crate::ir::relation::DestinationTable;
use crate::rewrite::remap::{ColumnIndexMap, ColumnMapEntry};

/// Reorders and pads the projection to match the destination's declared
/// column order.
///
/// Returns the input projection unchanged (and no map) when the
/// explicit list is empty or already names the destination's columns in
/// declared order. Otherwise returns the stacked projection together
/// with the old-to-new column map the caller must apply to any
/// enclosing sort or distribution keys.
///
/// # Errors
/// - `DuplicatedValue`: the explicit list names a column twice.
/// - `UnsupportedTarget`: the destination is partitioned, or the list
///   names a column the destination does not declare.
/// - `Invalid`: the projection arity does not match the explicit list
///   (broken contract with the analyzer).
pub fn reconcile(
    projection: Projection,
    explicit_columns: &[SmolStr],
    table: &DestinationTable,
) -> Result<(Projection, Option<ColumnIndexMap>), AlignError> {
    if explicit_columns.is_empty() {
        return Ok((projection, None));
    }
    if let Some(dup) = explicit_columns.iter().duplicates().next() {
        return Err(AlignError::DuplicatedValue(format_smolstr!(
            "column {dup} in the insert column list"
        )));
    }
    if explicit_columns
        .iter()
        .eq(table.columns.iter().map(|col| &col.name))
    {
        return Ok((projection, None));
    }
    if table.is_partitioned() {
        return Err(AlignError::UnsupportedTarget(format_smolstr!(
            "insert column list on partitioned table {}",
            table.name(),
        )));
    }
    for name in explicit_columns {
        if !table.columns.iter().any(|col| col.name == *name) {
            return Err(AlignError::UnsupportedTarget(format_smolstr!(
                "column {name} is not declared on table {}",
                table.name(),
            )));
        }
    }
    if projection.arity() != explicit_columns.len() {
        return Err(AlignError::Invalid(
            Entity::Projection,
            Some(format_smolstr!(
                "{} expressions for an insert column list of {} names",
                projection.arity(),
                explicit_columns.len(),
            )),
        ));
    }

    // For each destination column: its position in the current
    // projection if selected, otherwise the declared type of the NULL
    // to materialize.
    let map = ColumnIndexMap::new(
        table
            .columns
            .iter()
            .map(|col| {
                match explicit_columns.iter().position(|name| *name == col.name) {
                    Some(index) => ColumnMapEntry::Keep(index),
                    None => ColumnMapEntry::SynthesizeNull(col.ty.clone()),
                }
            })
            .collect(),
    );

    let expressions = map
        .iter()
        .map(|entry| match entry {
            ColumnMapEntry::Keep(index) => {
                let col_type = projection.expressions[*index].resolved_type();
                ScalarExpr::column(*index, col_type)
            }
            ColumnMapEntry::SynthesizeNull(ty) => ScalarExpr::null_literal(ty.kind()),
        })
        .collect();
    let stacked = Projection::new(Box::new(Relational::Projection(projection)), expressions);
    Ok((stacked, Some(map)))
}
