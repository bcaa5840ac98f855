use serde::Serialize;
use smol_str::{format_smolstr, SmolStr, ToSmolStr};
use std::fmt;

/// Reason or object of errors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Entity {
    /// sort specification of a Sort or Distribution node
    Collation,
    /// general variant for a column
    Column,
    /// distribution key of a Distribution node
    DistributionKey,
    /// corresponds to enum ScalarExpr
    Expression,
    /// corresponds to struct FunctionDescriptor
    Function,
    /// variant for node of tree
    Node,
    /// static partition specification
    PartitionSpec,
    /// corresponds to enum Relational
    Plan,
    /// corresponds to struct Projection
    Projection,
    /// corresponds to struct DestinationTable
    Table,
    /// general variant for type of some object
    Type,
    /// general variant for value of some object
    Value,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let p = match self {
            Entity::Collation => "collation".to_smolstr(),
            Entity::Column => "column".to_smolstr(),
            Entity::DistributionKey => "distribution key".to_smolstr(),
            Entity::Expression => "expression".to_smolstr(),
            Entity::Function => "function".to_smolstr(),
            Entity::Node => "node".to_smolstr(),
            Entity::PartitionSpec => "partition specification".to_smolstr(),
            Entity::Plan => "plan".to_smolstr(),
            Entity::Projection => "projection".to_smolstr(),
            Entity::Table => "table".to_smolstr(),
            Entity::Type => "type".to_smolstr(),
            Entity::Value => "value".to_smolstr(),
        };
        write!(f, "{p}")
    }
}

/// Action that failed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Action {
    Build,
    Create,
    Deserialize,
    Insert,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let p = match self {
            Action::Build => "build".to_smolstr(),
            Action::Create => "create".to_smolstr(),
            Action::Deserialize => "deserialize".to_smolstr(),
            Action::Insert => "insert".to_smolstr(),
        };
        write!(f, "{p}")
    }
}

/// Types of error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AlignError {
    /// A required cast has no usable conversion function in the catalog.
    /// Param names the missing or unimplemented function.
    CoercionUnavailable(SmolStr),
    /// A sort or distribution key points at a column that no longer
    /// exists after reconciliation.
    DanglingReference(Entity, SmolStr),
    /// Some value that is considered to be unique is duplicated.
    /// Param represents description.
    DuplicatedValue(SmolStr),
    /// Process of Action variant failed.
    /// Second param represents object of action.
    /// Third param represents reason of fail.
    FailedTo(Action, Option<Entity>, SmolStr),
    /// Object is invalid.
    /// Second param represents description and can be empty (None).
    Invalid(Entity, Option<SmolStr>),
    /// Object not found.
    /// Second param represents description or name that let to identify object.
    NotFound(Entity, SmolStr),
    /// The analyzer produced a plan outside the supported set of shapes.
    UnexpectedPlanShape(SmolStr),
    /// The combination of destination features is not supported.
    UnsupportedTarget(SmolStr),
}

impl fmt::Display for AlignError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let p: SmolStr = match self {
            AlignError::CoercionUnavailable(s) => {
                format_smolstr!("failed to get conversion function {s} for casting")
            }
            AlignError::DanglingReference(e, s) => {
                format_smolstr!("{e} references a non-existing column: {s}")
            }
            AlignError::DuplicatedValue(s) => format_smolstr!("duplicated value: {s}"),
            AlignError::FailedTo(a, e, s) => match e {
                Some(entity) => format_smolstr!("failed to {a} {entity}: {s}"),
                None => format_smolstr!("failed to {a} {s}"),
            },
            AlignError::Invalid(e, s) => match s {
                Some(msg) => format_smolstr!("invalid {e}: {msg}"),
                None => format_smolstr!("invalid {e}"),
            },
            AlignError::NotFound(e, s) => format_smolstr!("{e} {s} not found"),
            AlignError::UnexpectedPlanShape(s) => {
                format_smolstr!("unexpected plan shape: {s}")
            }
            AlignError::UnsupportedTarget(s) => format_smolstr!("unsupported target: {s}"),
        };
        write!(f, "{p}")
    }
}

impl std::error::Error for AlignError {}
