//! Shared fixture helpers for unit tests.

use smol_str::SmolStr;

use crate::ir::expression::ScalarExpr;
use crate::ir::function::{FunctionDescriptor, Functions};
use crate::ir::operator::{Projection, Relational, Scan};
use crate::ir::relation::{Column, DeclaredType, DestinationTable, Type};

/// Destination `t (x integer, y integer)`, not partitioned.
#[must_use]
pub fn table_xy() -> DestinationTable {
    DestinationTable::new(
        "t",
        vec![
            Column::new("x", DeclaredType::Integer),
            Column::new("y", DeclaredType::Integer),
        ],
        vec![],
    )
    .unwrap()
}

/// Destination `t (x integer) partitioned by (p string, q string)`.
#[must_use]
pub fn table_partitioned() -> DestinationTable {
    DestinationTable::new(
        "t",
        vec![Column::new("x", DeclaredType::Integer)],
        vec![
            Column::new("p", DeclaredType::String),
            Column::new("q", DeclaredType::String),
        ],
    )
    .unwrap()
}

/// Catalog with ordinary casts for the scalar kinds, a
/// parameter-settable decimal cast and an unimplemented datetime cast.
#[must_use]
pub fn conversion_catalog() -> Functions {
    Functions::new()
        .with(FunctionDescriptor::new("boolean"))
        .with(FunctionDescriptor::new("double"))
        .with(FunctionDescriptor::new("integer"))
        .with(FunctionDescriptor::new("string"))
        .with(FunctionDescriptor::new("unsigned"))
        .with(FunctionDescriptor::new("decimal").parameter_settable())
        .with(FunctionDescriptor::new("datetime").without_implementation())
}

/// Projection over an opaque scan with one column reference per type.
#[must_use]
pub fn scan_projection(col_types: &[Type]) -> Projection {
    let expressions = col_types
        .iter()
        .enumerate()
        .map(|(position, ty)| ScalarExpr::column(position, ty.clone()))
        .collect();
    Projection::new(Box::new(Relational::Scan(Scan::new("src"))), expressions)
}

#[must_use]
pub fn names(raw: &[&str]) -> Vec<SmolStr> {
    raw.iter().map(|name| SmolStr::from(*name)).collect()
}
