//! Relational operator module.
//!
//! The alignment rewriter only ever sees the small family of operators
//! an analyzer stacks on top of an INSERT source query: a projection,
//! optionally wrapped by a distribution and/or a sort. Everything below
//! the innermost projection is opaque and preserved untouched.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::ir::expression::ScalarExpr;

/// Required row order direction.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Single entry of a sort specification.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct CollationEntry {
    /// Column position in the enclosed projection output.
    pub index: usize,
    /// Order direction.
    pub direction: Direction,
}

impl CollationEntry {
    #[must_use]
    pub fn new(index: usize, direction: Direction) -> Self {
        CollationEntry { index, direction }
    }

    #[must_use]
    pub fn asc(index: usize) -> Self {
        CollationEntry::new(index, Direction::Ascending)
    }
}

/// Operator producing a fixed ordered list of output expressions.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Projection {
    /// Single input node.
    pub input: Box<Relational>,
    /// Output expressions, one per output column.
    pub expressions: Vec<ScalarExpr>,
    /// Output column names. Projections rebuilt by the rewriter carry
    /// an empty list: the contract with the execution layer is
    /// positional.
    pub names: Vec<SmolStr>,
}

impl Projection {
    /// Constructor for rewriter-made projections (no output names).
    #[must_use]
    pub fn new(input: Box<Relational>, expressions: Vec<ScalarExpr>) -> Self {
        Projection {
            input,
            expressions,
            names: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_names(mut self, names: Vec<SmolStr>) -> Self {
        self.names = names;
        self
    }

    /// Number of output columns.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.expressions.len()
    }
}

/// Operator requiring a row order from its input.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Sort {
    /// Single input node.
    pub input: Box<Relational>,
    /// Required row order.
    pub collation: Vec<CollationEntry>,
}

impl Sort {
    #[must_use]
    pub fn new(input: Box<Relational>, collation: Vec<CollationEntry>) -> Self {
        Sort { input, collation }
    }
}

/// Operator distributing rows across parallel writers.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Distribution {
    /// Single input node.
    pub input: Box<Relational>,
    /// Secondary sort applied within each distribution bucket.
    pub collation: Vec<CollationEntry>,
    /// Columns determining the distribution bucket of a row.
    pub keys: Vec<usize>,
}

impl Distribution {
    #[must_use]
    pub fn new(input: Box<Relational>, collation: Vec<CollationEntry>, keys: Vec<usize>) -> Self {
        Distribution {
            input,
            collation,
            keys,
        }
    }
}

/// Opaque subtree produced by the analyzer below the innermost
/// projection. The rewriter never descends into it.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub struct Scan {
    /// Source relation name.
    pub table: SmolStr,
}

impl Scan {
    #[must_use]
    pub fn new(table: &str) -> Self {
        Scan {
            table: table.into(),
        }
    }
}

/// Node of the owned, single-parent operator tree.
///
/// A closed enum rather than trait objects: every plan shape the
/// analyzer can produce must be handled exhaustively, and a missed
/// variant is a compile error instead of a run-time cast failure.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub enum Relational {
    Distribution(Distribution),
    Projection(Projection),
    Scan(Scan),
    Sort(Sort),
}

impl Relational {
    /// Operator name for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Relational::Distribution(_) => "distribution",
            Relational::Projection(_) => "projection",
            Relational::Scan(_) => "scan",
            Relational::Sort(_) => "sort",
        }
    }

    /// The projection closest to the source, if the tree has one.
    #[must_use]
    pub fn innermost_projection(&self) -> Option<&Projection> {
        match self {
            Relational::Projection(proj) => match proj.input.innermost_projection() {
                Some(inner) => Some(inner),
                None => Some(proj),
            },
            Relational::Distribution(Distribution { input, .. })
            | Relational::Sort(Sort { input, .. }) => input.innermost_projection(),
            Relational::Scan(_) => None,
        }
    }

    /// The projection closest to the root, if the tree has one.
    #[must_use]
    pub fn outermost_projection(&self) -> Option<&Projection> {
        match self {
            Relational::Projection(proj) => Some(proj),
            Relational::Distribution(Distribution { input, .. })
            | Relational::Sort(Sort { input, .. }) => input.outermost_projection(),
            Relational::Scan(_) => None,
        }
    }
}
