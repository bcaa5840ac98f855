//! Intermediate representation (IR) module.
//!
//! Contains the relational operator tree consumed by the alignment
//! rewriter and the scalar expressions it is built from. Unlike the
//! plans of a full planner, the trees here are owned and single-parent:
//! every rewrite step consumes its input tree and returns a new one.

pub mod expression;
pub mod function;
pub mod operator;
pub mod relation;
pub mod value;

#[cfg(test)]
pub mod tests;
