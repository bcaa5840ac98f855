//! Type coercion inserter.
//!
//! The final projection must produce exactly the destination's declared
//! types. The execution system implements casts with catalog functions,
//! so a kind mismatch becomes a conversion call; functions that need
//! the full declared type at bind time fall back to a structural cast.

use smol_str::format_smolstr;

use crate::errors::AlignError;
use crate::ir::expression::{ExprCopier, ScalarExpr, TypeFactory};
use crate::ir::function::FunctionCatalog;
use crate::ir::operator::Projection;
use crate::ir::relation::DeclaredType;

/// Wraps kind-mismatched projection columns into conversion casts.
///
/// Only primitive declared types are eligible; compound targets are
/// left as-is even on a mismatch. The projection is rebuilt only if at
/// least one column actually required coercion.
///
/// # Errors
/// - `CoercionUnavailable`: the catalog has no usable conversion
///   function for a required cast.
///
/// # Panics
/// - The projection arity differs from the target type list. The
///   orchestrator aligns both against the destination beforehand, so a
///   mismatch is an internal invariant violation.
pub fn coerce(
    projection: Projection,
    target_types: &[DeclaredType],
    catalog: &dyn FunctionCatalog,
    type_factory: &dyn TypeFactory,
) -> Result<Projection, AlignError> {
    assert_eq!(
        projection.arity(),
        target_types.len(),
        "projection and target types size mismatch"
    );
    let Projection {
        input,
        expressions,
        names,
    } = projection;
    let mut converted = Vec::with_capacity(expressions.len());
    for (expr, target) in expressions.into_iter().zip(target_types) {
        if expr.resolved_type() == target.kind() || !target.is_primitive() {
            converted.push(expr);
            continue;
        }
        converted.push(conversion_cast(expr, target, catalog, type_factory)?);
    }
    // Reassembled from the very parts it was taken apart into, so the
    // no-coercion path returns a structurally unchanged projection.
    Ok(Projection::new(input, converted).with_names(names))
}

fn conversion_cast(
    expr: ScalarExpr,
    target: &DeclaredType,
    catalog: &dyn FunctionCatalog,
    type_factory: &dyn TypeFactory,
) -> Result<ScalarExpr, AlignError> {
    let name = target.base_name();
    let Some(function) = catalog.lookup(name) else {
        return Err(AlignError::CoercionUnavailable(format_smolstr!("{name}")));
    };
    if !function.is_implemented() {
        return Err(AlignError::CoercionUnavailable(format_smolstr!("{name}")));
    }
    if function.is_parameter_settable() {
        // The function needs the full declared type (precision, scale)
        // at bind time, which the catalog cannot supply at this stage.
        return Ok(ScalarExpr::cast(expr, target.clone()));
    }
    let call = function.call(vec![expr], target.kind());
    Ok(ExprCopier::new(type_factory).copy(&call))
}
