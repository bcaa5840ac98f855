//! Insert-target alignment rewriter for analyzed relational plans.
//!
//! The crate consumes a validated operator tree together with the
//! destination table metadata of an INSERT statement and produces a new
//! tree whose output columns match the destination's declared column
//! order and types. Statically-specified partition columns are injected
//! as literals, and any sort or distribution keys riding on top of the
//! plan are kept consistent with the rewritten projection.

pub mod errors;
pub mod ir;
pub mod rewrite;
