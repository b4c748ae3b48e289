//! Schema resolution module
//!
//! Resolves the caller's schema information into a column plan.
//!
//! # Sources
//!
//! - **None**: columns discovered from the union of record keys, sorted
//! - **Name list**: fixed columns, types inferred from values
//! - **Name map**: fixed columns renamed on output
//! - **Typed schema**: declared columns coerced to declared types, optionally aliased

mod plan;

pub use plan::{discover_columns, resolve, ColumnPlan, ColumnPlanEntry, ColumnPlanSource};

#[cfg(test)]
mod tests;
