//! Insert-target alignment rewrite.
//!
//! Single-pass classify-and-dispatch over the plan shapes an analyzer
//! produces for an INSERT source query:
//!
//! - `Projection`
//! - `Sort(Projection)`
//! - `Sort(Distribution(Projection))`
//! - `Distribution(Projection)`
//!
//! Any other shape breaks the contract with the upstream analyzer and
//! is rejected. The rewrite steps execute in a fixed order: reconcile
//! the explicit destination schema, inject static partitions, insert
//! type coercions, then re-wrap the projection with freshly built sort
//! and distribution nodes whose keys were remapped or shifted in step.

pub mod coerce;
pub mod partition;
pub mod remap;
pub mod schema;

use smol_str::{format_smolstr, SmolStr};
use tracing::debug;

use crate::errors::AlignError;
use crate::ir::expression::TypeFactory;
use crate::ir::function::FunctionCatalog;
use crate::ir::operator::{
    CollationEntry, Distribution, Projection, Relational, Sort,
};
use crate::ir::relation::{DestinationTable, StaticPartitionSpec};
use crate::rewrite::partition::{inject_static_partitions, static_insert_index};
use crate::rewrite::remap::{
    remap_collation, remap_dist_keys, shift_collation, shift_dist_keys,
};

/// Decomposed legal plan shape: an innermost projection, optionally
/// wrapped by a distribution, optionally wrapped by a sort.
struct PlanParts {
    sort: Option<Vec<CollationEntry>>,
    dist: Option<(Vec<CollationEntry>, Vec<usize>)>,
    projection: Projection,
}

fn decompose(plan: Relational) -> Result<PlanParts, AlignError> {
    match plan {
        Relational::Projection(projection) => Ok(PlanParts {
            sort: None,
            dist: None,
            projection,
        }),
        Relational::Sort(Sort { input, collation }) => match *input {
            Relational::Projection(projection) => Ok(PlanParts {
                sort: Some(collation),
                dist: None,
                projection,
            }),
            Relational::Distribution(Distribution {
                input: dist_input,
                collation: dist_collation,
                keys,
            }) => match *dist_input {
                Relational::Projection(projection) => Ok(PlanParts {
                    sort: Some(collation),
                    dist: Some((dist_collation, keys)),
                    projection,
                }),
                other => Err(AlignError::UnexpectedPlanShape(format_smolstr!(
                    "expected a projection under the distribution, got a {}",
                    other.kind(),
                ))),
            },
            other => Err(AlignError::UnexpectedPlanShape(format_smolstr!(
                "expected a projection or a distribution under the sort, got a {}",
                other.kind(),
            ))),
        },
        Relational::Distribution(Distribution {
            input,
            collation,
            keys,
        }) => match *input {
            Relational::Projection(projection) => Ok(PlanParts {
                sort: None,
                dist: Some((collation, keys)),
                projection,
            }),
            other => Err(AlignError::UnexpectedPlanShape(format_smolstr!(
                "expected a projection under the distribution, got a {}",
                other.kind(),
            ))),
        },
        other => Err(AlignError::UnexpectedPlanShape(format_smolstr!(
            "expected a projection, sort or distribution root, got a {}",
            other.kind(),
        ))),
    }
}

/// Re-wraps the rewritten projection, innermost to outermost, with
/// freshly constructed nodes.
fn reassemble(parts: PlanParts) -> Relational {
    let PlanParts {
        sort,
        dist,
        projection,
    } = parts;
    let mut plan = Relational::Projection(projection);
    if let Some((collation, keys)) = dist {
        plan = Relational::Distribution(Distribution::new(Box::new(plan), collation, keys));
    }
    if let Some(collation) = sort {
        plan = Relational::Sort(Sort::new(Box::new(plan), collation));
    }
    plan
}

/// Rewrites an analyzed INSERT source plan so that its output columns
/// match the destination's declared order and types.
///
/// `explicit_columns` is the statement's `INSERT INTO t (col, ...)`
/// list (empty when absent); `static_spec` holds the statically
/// specified partition values (empty when absent). The input tree is
/// consumed; on failure it is dropped without partial mutation ever
/// escaping.
///
/// # Errors
/// - `UnexpectedPlanShape`: the plan is outside the supported set.
/// - `DuplicatedValue`, `UnsupportedTarget`, `DanglingReference`:
///   explicit-column-list reconciliation failed.
/// - `Invalid`: the static partition spec contradicts the declared
///   partition columns, or an analyzer contract was broken.
/// - `CoercionUnavailable`: no usable catalog function for a required
///   cast.
pub fn align_insert_plan(
    plan: Relational,
    table: &DestinationTable,
    explicit_columns: &[SmolStr],
    static_spec: &StaticPartitionSpec,
    catalog: &dyn FunctionCatalog,
    type_factory: &dyn TypeFactory,
) -> Result<Relational, AlignError> {
    let mut parts = decompose(plan)?;

    // 1. Explicit destination schema.
    let (projection, index_map) = schema::reconcile(parts.projection, explicit_columns, table)?;
    parts.projection = projection;
    if let Some(map) = index_map {
        debug!(
            table = table.name(),
            columns = map.len(),
            "reconciled explicit insert column list"
        );
        if let Some(collation) = parts.sort.take() {
            parts.sort = Some(remap_collation(&collation, &map)?);
        }
        if let Some((collation, keys)) = parts.dist.take() {
            parts.dist = Some((
                remap_collation(&collation, &map)?,
                remap_dist_keys(&keys, &map)?,
            ));
        }
    }

    // 2. Static partitions.
    if !static_spec.is_empty() {
        static_spec.validate_against(table)?;
        let insert_index = static_insert_index(&parts.projection, table, static_spec);
        let delta = static_spec.len();
        parts.projection = inject_static_partitions(parts.projection, static_spec, table);
        debug!(
            table = table.name(),
            insert_index, delta, "injected static partition columns"
        );
        let shifted = |index: usize| index >= insert_index;
        if let Some(collation) = parts.sort.take() {
            parts.sort = Some(shift_collation(&collation, shifted, delta));
        }
        if let Some((collation, keys)) = parts.dist.take() {
            parts.dist = Some((
                shift_collation(&collation, shifted, delta),
                shift_dist_keys(&keys, shifted, delta),
            ));
        }
    }

    // 3. Type coercions against the full append row.
    let target_types = table.declared_types();
    parts.projection = coerce::coerce(parts.projection, &target_types, catalog, type_factory)?;
    debug!(
        table = table.name(),
        arity = parts.projection.arity(),
        "aligned insert plan with the destination schema"
    );

    Ok(reassemble(parts))
}

#[cfg(test)]
mod tests;
