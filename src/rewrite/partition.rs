//! Static partition injector.
//!
//! Statically-specified partition values never come from the source
//! query, so the analyzed projection has no expressions for them. They
//! are synthesized here as casted string literals and inserted right
//! before the trailing dynamic-partition block, preserving the relative
//! order of everything already present.

use crate::ir::expression::ScalarExpr;
use crate::ir::operator::Projection;
use crate::ir::relation::{DestinationTable, StaticPartitionSpec};

/// Number of partition columns computed by the query itself.
#[must_use]
pub fn dynamic_partition_count(table: &DestinationTable, spec: &StaticPartitionSpec) -> usize {
    table.partition_columns.len() - spec.len()
}

/// Position at which synthesized static partition columns start.
#[must_use]
pub fn static_insert_index(
    projection: &Projection,
    table: &DestinationTable,
    spec: &StaticPartitionSpec,
) -> usize {
    projection.arity() - dynamic_partition_count(table, spec)
}

/// Inserts `cast('<value>' as <declared type>)` columns for every static
/// partition, in the declared partition-column order.
///
/// The caller must afterwards shift any enclosing sort or distribution
/// keys at or past the returned pre-injection insert index by
/// `spec.len()`.
///
/// # Panics
/// - The spec names more columns than the table declares as partitions,
///   or the projection is narrower than the dynamic partition block.
///   Both are caller bugs: the analyzer guarantees the arities.
pub fn inject_static_partitions(
    projection: Projection,
    spec: &StaticPartitionSpec,
    table: &DestinationTable,
) -> Projection {
    assert!(
        spec.len() <= table.partition_columns.len(),
        "static partition spec wider than the declared partition list"
    );
    let num_dynamic = dynamic_partition_count(table, spec);
    assert!(
        projection.arity() >= num_dynamic,
        "projection narrower than the dynamic partition block"
    );
    let mut insert_index = projection.arity() - num_dynamic;
    let Projection {
        input,
        mut expressions,
        ..
    } = projection;
    for col in &table.partition_columns {
        let Some(value) = spec.get(&col.name) else {
            continue;
        };
        let literal = ScalarExpr::cast(ScalarExpr::string_literal(value), col.ty.clone());
        expressions.insert(insert_index, literal);
        insert_index += 1;
    }
    Projection::new(input, expressions)
}
