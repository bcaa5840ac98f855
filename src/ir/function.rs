//! Function catalog module.
//!
//! The execution system implements casts with regular functions, so the
//! coercion inserter has to consult an external catalog to build a
//! conversion call. Only the narrow read-only surface the rewriter
//! depends on is modelled here.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::ir::expression::ScalarExpr;
use crate::ir::relation::Type;

/// Catalog entry for a single conversion function.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct FunctionDescriptor {
    name: SmolStr,
    /// The function needs the full declared type (precision, scale) at
    /// bind time. The catalog cannot supply that at rewrite time, so
    /// such functions are bypassed with a structural cast.
    parameter_settable: bool,
    /// The catalog knows the name but has no executable body for it.
    implemented: bool,
}

impl FunctionDescriptor {
    #[must_use]
    pub fn new(name: &str) -> Self {
        FunctionDescriptor {
            name: name.into(),
            parameter_settable: false,
            implemented: true,
        }
    }

    #[must_use]
    pub fn parameter_settable(mut self) -> Self {
        self.parameter_settable = true;
        self
    }

    #[must_use]
    pub fn without_implementation(mut self) -> Self {
        self.implemented = false;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_parameter_settable(&self) -> bool {
        self.parameter_settable
    }

    #[must_use]
    pub fn is_implemented(&self) -> bool {
        self.implemented
    }

    /// Builds a call expression of this function.
    #[must_use]
    pub fn call(&self, args: Vec<ScalarExpr>, func_type: Type) -> ScalarExpr {
        ScalarExpr::FunctionCall {
            name: self.name.clone(),
            args,
            func_type,
        }
    }
}

/// Read-only lookup surface of the external function catalog.
pub trait FunctionCatalog {
    fn lookup(&self, name: &str) -> Option<&FunctionDescriptor>;
}

/// In-memory function registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Functions {
    funcs: AHashMap<SmolStr, FunctionDescriptor>,
}

impl Functions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, function: FunctionDescriptor) {
        self.funcs.insert(function.name.clone(), function);
    }

    #[must_use]
    pub fn with(mut self, function: FunctionDescriptor) -> Self {
        self.insert(function);
        self
    }
}

impl FunctionCatalog for Functions {
    fn lookup(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.funcs.get(name)
    }
}

#[cfg(test)]
mod tests;
