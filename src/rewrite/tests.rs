use pretty_assertions::assert_eq;

use super::*;
use crate::ir::expression::{PlainTypeFactory, ScalarExpr};
use crate::ir::operator::Scan;
use crate::ir::relation::{DeclaredType, StaticPartitionSpec, Type};
use crate::ir::tests::{conversion_catalog, names, scan_projection, table_partitioned, table_xy};

fn no_columns() -> Vec<smol_str::SmolStr> {
    Vec::new()
}

fn align(
    plan: Relational,
    table: &crate::ir::relation::DestinationTable,
    explicit: &[smol_str::SmolStr],
    spec: &StaticPartitionSpec,
) -> Result<Relational, AlignError> {
    align_insert_plan(
        plan,
        table,
        explicit,
        spec,
        &conversion_catalog(),
        &PlainTypeFactory,
    )
}

/// Sort and distribution keys must index into the enclosed projection.
fn assert_keys_in_range(plan: &Relational) {
    let arity = plan
        .outermost_projection()
        .expect("aligned plan must contain a projection")
        .arity();
    let mut node = plan;
    loop {
        match node {
            Relational::Sort(Sort { input, collation }) => {
                assert!(collation.iter().all(|entry| entry.index < arity));
                node = input.as_ref();
            }
            Relational::Distribution(Distribution {
                input,
                collation,
                keys,
            }) => {
                assert!(collation.iter().all(|entry| entry.index < arity));
                assert!(keys.iter().all(|key| *key < arity));
                node = input.as_ref();
            }
            Relational::Projection(_) | Relational::Scan(_) => break,
        }
    }
}

#[test]
fn bare_projection_with_static_partition() {
    // Scenario B end-to-end, with a coercion on the data column.
    let table = table_partitioned();
    let spec = StaticPartitionSpec::new().with("p", "0");
    let plan = Relational::Projection(scan_projection(&[Type::Double, Type::String]));

    let aligned = align(plan, &table, &no_columns(), &spec).unwrap();
    let Relational::Projection(projection) = &aligned else {
        panic!("projection root expected");
    };
    assert_eq!(projection.arity(), table.output_arity());
    assert_eq!(
        projection.expressions[0],
        ScalarExpr::FunctionCall {
            name: "integer".into(),
            args: vec![ScalarExpr::column(0, Type::Double)],
            func_type: Type::Integer,
        },
    );
    assert_eq!(
        projection.expressions[1],
        ScalarExpr::cast(ScalarExpr::string_literal("0"), DeclaredType::String),
    );
    assert_eq!(projection.expressions[2], ScalarExpr::column(1, Type::String));
    assert_keys_in_range(&aligned);
}

#[test]
fn sort_keys_shift_past_insertion_point() {
    // Scenario C: 2-column projection, one static partition inserted at
    // index 1. A key below the insertion point stays, one at it shifts.
    let table = table_partitioned();
    let spec = StaticPartitionSpec::new().with("p", "0");
    let plan = Relational::Sort(Sort::new(
        Box::new(Relational::Projection(scan_projection(&[
            Type::Integer,
            Type::String,
        ]))),
        vec![CollationEntry::asc(0), CollationEntry::asc(1)],
    ));

    let aligned = align(plan, &table, &no_columns(), &spec).unwrap();
    let Relational::Sort(sort) = &aligned else {
        panic!("sort root expected");
    };
    assert_eq!(
        sort.collation,
        vec![CollationEntry::asc(0), CollationEntry::asc(2)],
    );
    assert_keys_in_range(&aligned);
}

#[test]
fn distribution_keys_shift_and_survive() {
    let table = table_partitioned();
    let spec = StaticPartitionSpec::new().with("p", "0");
    let plan = Relational::Distribution(Distribution::new(
        Box::new(Relational::Projection(scan_projection(&[
            Type::Integer,
            Type::String,
        ]))),
        vec![CollationEntry::asc(1)],
        vec![0, 1],
    ));

    let aligned = align(plan, &table, &no_columns(), &spec).unwrap();
    let Relational::Distribution(dist) = &aligned else {
        panic!("distribution root expected");
    };
    assert_eq!(dist.collation, vec![CollationEntry::asc(2)]);
    assert_eq!(dist.keys, vec![0, 2]);
    assert_keys_in_range(&aligned);
}

#[test]
fn sort_over_distribution_remaps_after_reconcile() {
    let table = table_xy();
    let plan = Relational::Sort(Sort::new(
        Box::new(Relational::Distribution(Distribution::new(
            Box::new(Relational::Projection(scan_projection(&[
                Type::Integer,
                Type::Integer,
            ]))),
            vec![],
            vec![0],
        ))),
        vec![CollationEntry::asc(1)],
    ));

    let aligned = align(plan, &table, &names(&["y", "x"]), &StaticPartitionSpec::new()).unwrap();
    let Relational::Sort(sort) = &aligned else {
        panic!("sort root expected");
    };
    // Old column 1 (x) now lives at position 0, old column 0 (y) at 1.
    assert_eq!(sort.collation, vec![CollationEntry::asc(0)]);
    let Relational::Distribution(dist) = sort.input.as_ref() else {
        panic!("distribution under the sort expected");
    };
    assert_eq!(dist.keys, vec![1]);
    assert_keys_in_range(&aligned);
}

#[test]
fn explicit_list_reorders_columns() {
    // Scenario A through the orchestrator.
    let table = table_xy();
    let plan = Relational::Projection(scan_projection(&[Type::Integer, Type::Integer]));
    let aligned = align(plan, &table, &names(&["y", "x"]), &StaticPartitionSpec::new()).unwrap();
    let Relational::Projection(projection) = &aligned else {
        panic!("projection root expected");
    };
    assert_eq!(
        projection.expressions,
        vec![
            ScalarExpr::column(1, Type::Integer),
            ScalarExpr::column(0, Type::Integer),
        ],
    );
    // The analyzed projection survives underneath the stacked one.
    assert_eq!(
        aligned.innermost_projection().unwrap().expressions,
        vec![
            ScalarExpr::column(0, Type::Integer),
            ScalarExpr::column(1, Type::Integer),
        ],
    );
}

#[test]
fn natural_order_list_returns_input_unchanged() {
    let table = table_xy();
    let projection = scan_projection(&[Type::Integer, Type::Integer]);
    let expected = projection.clone();
    let plan = Relational::Projection(projection);
    let aligned = align(plan, &table, &names(&["x", "y"]), &StaticPartitionSpec::new()).unwrap();
    assert_eq!(aligned, Relational::Projection(expected));
}

#[test]
fn sort_key_on_unselected_column_dangles() {
    // Sorting by a column not selected for insertion with an explicit
    // column list must fail, never silently produce a wrong plan.
    let table = table_xy();
    let plan = Relational::Sort(Sort::new(
        Box::new(Relational::Projection(scan_projection(&[Type::Integer]))),
        vec![CollationEntry::asc(1)],
    ));
    assert!(matches!(
        align(plan, &table, &names(&["y"]), &StaticPartitionSpec::new()).unwrap_err(),
        AlignError::DanglingReference(_, _),
    ));
}

#[test]
fn unexpected_shapes_rejected() {
    let table = table_xy();
    let scan = || Box::new(Relational::Scan(Scan::new("src")));

    let sort_over_sort = Relational::Sort(Sort::new(
        Box::new(Relational::Sort(Sort::new(scan(), vec![]))),
        vec![],
    ));
    assert!(matches!(
        align(
            sort_over_sort,
            &table,
            &no_columns(),
            &StaticPartitionSpec::new(),
        )
        .unwrap_err(),
        AlignError::UnexpectedPlanShape(_),
    ));

    let bare_scan = Relational::Scan(Scan::new("src"));
    assert!(matches!(
        align(bare_scan, &table, &no_columns(), &StaticPartitionSpec::new()).unwrap_err(),
        AlignError::UnexpectedPlanShape(_),
    ));

    let dist_over_scan = Relational::Distribution(Distribution::new(scan(), vec![], vec![0]));
    assert!(matches!(
        align(
            dist_over_scan,
            &table,
            &no_columns(),
            &StaticPartitionSpec::new(),
        )
        .unwrap_err(),
        AlignError::UnexpectedPlanShape(_),
    ));

    let sort_over_dist_over_scan = Relational::Sort(Sort::new(
        Box::new(Relational::Distribution(Distribution::new(
            scan(),
            vec![],
            vec![0],
        ))),
        vec![],
    ));
    assert!(matches!(
        align(
            sort_over_dist_over_scan,
            &table,
            &no_columns(),
            &StaticPartitionSpec::new(),
        )
        .unwrap_err(),
        AlignError::UnexpectedPlanShape(_),
    ));
}

#[test]
fn misaligned_static_spec_rejected() {
    let table = table_partitioned();
    // q static while p dynamic violates the prefix rule.
    let spec = StaticPartitionSpec::new().with("q", "1");
    let plan = Relational::Projection(scan_projection(&[Type::Integer, Type::String]));
    assert!(matches!(
        align(plan, &table, &no_columns(), &spec).unwrap_err(),
        AlignError::Invalid(_, _),
    ));
}

#[test]
fn output_arity_matches_destination() {
    // Column-count invariant across every legal shape.
    let table = table_partitioned();
    let spec = StaticPartitionSpec::new().with("p", "0");
    let shapes: Vec<Relational> = vec![
        Relational::Projection(scan_projection(&[Type::Integer, Type::String])),
        Relational::Sort(Sort::new(
            Box::new(Relational::Projection(scan_projection(&[
                Type::Integer,
                Type::String,
            ]))),
            vec![CollationEntry::asc(0)],
        )),
        Relational::Distribution(Distribution::new(
            Box::new(Relational::Projection(scan_projection(&[
                Type::Integer,
                Type::String,
            ]))),
            vec![],
            vec![0],
        )),
        Relational::Sort(Sort::new(
            Box::new(Relational::Distribution(Distribution::new(
                Box::new(Relational::Projection(scan_projection(&[
                    Type::Integer,
                    Type::String,
                ]))),
                vec![],
                vec![0],
            ))),
            vec![CollationEntry::asc(0)],
        )),
    ];
    for plan in shapes {
        let aligned = align(plan, &table, &no_columns(), &spec).unwrap();
        assert_eq!(
            aligned.outermost_projection().unwrap().arity(),
            table.output_arity(),
        );
        assert_keys_in_range(&aligned);
    }
}
