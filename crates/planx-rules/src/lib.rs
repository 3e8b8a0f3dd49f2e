//! # planx-rules: Physical Plan Enumeration
//!
//! This crate implements the property-directed enumeration at the heart of
//! the optimizer: given a logical operator and the physical property its
//! parent requires, produce every physical implementation of that operator
//! together with the properties each implementation demands of its children.
//! A surrounding memoized top-down search drives this entry point, combines
//! candidates with child plans, and keeps the cheapest.
//!
//! ## Rule Modules
//!
//! - **`impl_join`**: Sort-merge, hash, and index-join candidates for a
//!   logical join, including the hint-forcing policy.
//! - **`index_join`**: Index usability analysis for the lookup side of an
//!   index join -- range templates, residual filters, deferred bounds.
//! - **`impl_agg`**: Hash and stream aggregation candidates.
//! - **`impl_simple`**: Pass-through and order-translating enumerators for
//!   selection, projection, limit, top-n, sort, union-all, lock,
//!   max-one-row, union-scan, and apply.
//! - **`sort_prefix`**: Shared order-prefix arithmetic.
//! - **`task`**: Pushed-down (cop) task finalization for eagerly built inner
//!   plans.
//!
//! ## Candidate Semantics
//!
//! An empty result means "this operator cannot satisfy the property" -- the
//! caller treats it as a dead branch, not an error. Candidate order is
//! deterministic so the caller's tie-breaking is reproducible.

pub mod impl_agg;
pub mod impl_join;
pub mod impl_simple;
pub mod index_join;
pub mod sort_prefix;
pub mod task;

use planx_core::logical::{LogicalOp, LogicalOperator};
use planx_core::physical::PhysicalPlan;
use planx_core::property::PhysicalProperty;
use planx_core::session::SessionCtx;

/// Enumerate every physical implementation of `p` that can satisfy `prop`.
///
/// Leaf operators never reach this function: data sources generate their
/// scan tasks directly in the search driver, so hitting one here is a
/// planner bug and panics.
pub fn exhaust_physical_plans(
    ctx: &SessionCtx,
    p: &LogicalOperator,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    match &p.op {
        LogicalOp::Join(join) => impl_join::exhaust_join(ctx, p, join, prop),
        LogicalOp::Aggregation(agg) => impl_agg::exhaust_aggregation(p, agg, prop),
        LogicalOp::Selection { conditions } => impl_simple::exhaust_selection(p, conditions, prop),
        LogicalOp::Projection { exprs } => impl_simple::exhaust_projection(p, exprs, prop),
        LogicalOp::Sort { by_items } => impl_simple::exhaust_sort(p, by_items, prop),
        LogicalOp::TopN {
            by_items,
            count,
            offset,
        } => impl_simple::exhaust_top_n(p, by_items, *count, *offset, prop),
        LogicalOp::Limit { count, offset } => {
            impl_simple::exhaust_limit(p, *count, *offset, prop)
        }
        LogicalOp::UnionAll => impl_simple::exhaust_union_all(p, prop),
        LogicalOp::Lock { lock } => impl_simple::exhaust_lock(p, *lock, prop),
        LogicalOp::MaxOneRow => impl_simple::exhaust_max_one_row(p, prop),
        LogicalOp::UnionScan { conditions } => {
            impl_simple::exhaust_union_scan(p, conditions, prop)
        }
        LogicalOp::Apply { join, cor_cols } => {
            impl_simple::exhaust_apply(ctx, p, join, cor_cols, prop)
        }
        LogicalOp::DataSource(_) => {
            panic!("exhaust_physical_plans reached a DataSource; leaves generate tasks in the search driver")
        }
    }
}
