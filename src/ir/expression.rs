//! Expression module.
//!
//! Scalar expressions are the building blocks of a projection output.
//! Every node carries its resolved semantic type; the analyzer has
//! already type-checked the tree before it reaches this crate.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::ir::relation::{DeclaredType, Type};
use crate::ir::value::Value;

/// Scalar expression tree node.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub enum ScalarExpr {
    /// Structural type-system cast.
    ///
    /// Example: `cast('0' as string)`.
    Cast {
        /// Expression that must be casted to another type.
        child: Box<ScalarExpr>,
        /// Cast target type.
        to: DeclaredType,
    },
    /// Reference to the position in the incoming tuple.
    ColumnRef {
        /// Column position in the input output tuple.
        position: usize,
        /// Referred column type in the input tuple.
        col_type: Type,
    },
    /// Variable bound by a correlated sub-query.
    CorrelationVar {
        /// Correlation identifier assigned by the analyzer.
        id: usize,
        /// Variable type.
        var_type: Type,
    },
    /// Placeholder for a statement parameter bound at execution time.
    DynamicParam {
        /// Parameter ordinal.
        index: usize,
        /// Parameter type.
        param_type: Type,
    },
    /// Access to a field of a compound expression.
    ///
    /// Example: `t.point.x`.
    FieldAccess {
        /// Compound base expression.
        base: Box<ScalarExpr>,
        /// Field ordinal within the base type.
        field: usize,
        /// Field type.
        field_type: Type,
    },
    /// Function call expression.
    FunctionCall {
        /// Function name.
        name: SmolStr,
        /// Function arguments.
        args: Vec<ScalarExpr>,
        /// Function return type.
        func_type: Type,
    },
    /// Constant expression.
    ///
    /// Example: `42`.
    Literal {
        /// Contained value (boolean, number, string or null).
        value: Value,
        /// Literal type.
        lit_type: Type,
    },
    /// Reference into a local expression list of the enclosing program.
    LocalRef {
        /// Position in the local list.
        position: usize,
        /// Referred expression type.
        col_type: Type,
    },
    /// Reference to a whole input range (used by the analyzer while
    /// flattening sub-queries).
    RangeRef {
        /// Offset of the first referenced column.
        offset: usize,
        /// Range row type.
        ref_type: Type,
    },
}

impl ScalarExpr {
    /// Resolved semantic type of the node.
    #[must_use]
    pub fn resolved_type(&self) -> Type {
        match self {
            ScalarExpr::Cast { to, .. } => to.kind(),
            ScalarExpr::ColumnRef { col_type, .. } | ScalarExpr::LocalRef { col_type, .. } => {
                col_type.clone()
            }
            ScalarExpr::CorrelationVar { var_type, .. } => var_type.clone(),
            ScalarExpr::DynamicParam { param_type, .. } => param_type.clone(),
            ScalarExpr::FieldAccess { field_type, .. } => field_type.clone(),
            ScalarExpr::FunctionCall { func_type, .. } => func_type.clone(),
            ScalarExpr::Literal { lit_type, .. } => lit_type.clone(),
            ScalarExpr::RangeRef { ref_type, .. } => ref_type.clone(),
        }
    }

    /// Column reference constructor.
    #[must_use]
    pub fn column(position: usize, col_type: Type) -> Self {
        ScalarExpr::ColumnRef { position, col_type }
    }

    /// String literal constructor.
    #[must_use]
    pub fn string_literal(value: &str) -> Self {
        ScalarExpr::Literal {
            value: Value::String(value.into()),
            lit_type: Type::String,
        }
    }

    /// Typed NULL literal constructor.
    #[must_use]
    pub fn null_literal(ty: Type) -> Self {
        ScalarExpr::Literal {
            value: Value::Null,
            lit_type: ty,
        }
    }

    /// Structural cast constructor.
    #[must_use]
    pub fn cast(child: ScalarExpr, to: DeclaredType) -> Self {
        ScalarExpr::Cast {
            child: Box::new(child),
            to,
        }
    }
}

/// Re-derives types when an expression crosses a plan-fragment boundary.
///
/// Plans rewritten at different moments must not share mutable
/// type-registry state, so every copied node asks the factory for a
/// fresh type instead of aliasing the original one.
pub trait TypeFactory {
    fn copy_type(&self, ty: &Type) -> Type;

    fn copy_declared(&self, ty: &DeclaredType) -> DeclaredType;
}

/// Factory for self-contained types that carry no registry state.
#[derive(Clone, Debug, Default)]
pub struct PlainTypeFactory;

impl TypeFactory for PlainTypeFactory {
    fn copy_type(&self, ty: &Type) -> Type {
        ty.clone()
    }

    fn copy_declared(&self, ty: &DeclaredType) -> DeclaredType {
        ty.clone()
    }
}

/// Deep copier of scalar expression trees.
///
/// Rebuilds every node, re-deriving its type through the factory.
/// Literals are immutable and factory-independent, so they are passed
/// through unchanged. This is a total function over well-typed input.
pub struct ExprCopier<'f> {
    factory: &'f dyn TypeFactory,
}

impl<'f> ExprCopier<'f> {
    #[must_use]
    pub fn new(factory: &'f dyn TypeFactory) -> Self {
        ExprCopier { factory }
    }

    #[must_use]
    pub fn copy(&self, expr: &ScalarExpr) -> ScalarExpr {
        match expr {
            ScalarExpr::Cast { child, to } => ScalarExpr::Cast {
                child: Box::new(self.copy(child)),
                to: self.factory.copy_declared(to),
            },
            ScalarExpr::ColumnRef { position, col_type } => ScalarExpr::ColumnRef {
                position: *position,
                col_type: self.factory.copy_type(col_type),
            },
            ScalarExpr::CorrelationVar { id, var_type } => ScalarExpr::CorrelationVar {
                id: *id,
                var_type: self.factory.copy_type(var_type),
            },
            ScalarExpr::DynamicParam { index, param_type } => ScalarExpr::DynamicParam {
                index: *index,
                param_type: self.factory.copy_type(param_type),
            },
            ScalarExpr::FieldAccess {
                base,
                field,
                field_type,
            } => ScalarExpr::FieldAccess {
                base: Box::new(self.copy(base)),
                field: *field,
                field_type: self.factory.copy_type(field_type),
            },
            ScalarExpr::FunctionCall {
                name,
                args,
                func_type,
            } => ScalarExpr::FunctionCall {
                name: name.clone(),
                args: args.iter().map(|arg| self.copy(arg)).collect(),
                func_type: self.factory.copy_type(func_type),
            },
            ScalarExpr::Literal { .. } => expr.clone(),
            ScalarExpr::LocalRef { position, col_type } => ScalarExpr::LocalRef {
                position: *position,
                col_type: self.factory.copy_type(col_type),
            },
            ScalarExpr::RangeRef { offset, ref_type } => ScalarExpr::RangeRef {
                offset: *offset,
                ref_type: self.factory.copy_type(ref_type),
            },
        }
    }
}
