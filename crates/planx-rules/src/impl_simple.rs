//! # Simple Operator Enumeration
//!
//! Enumerators for the operators with at most a couple of physical shapes:
//! pass-through operators forward the required property to their child;
//! order-sensitive operators translate or gate it; order-destroying
//! operators demand an empty property.

use planx_core::expr::{ByItem, Column, Expr};
use planx_core::logical::{LockType, LogicalJoin, LogicalOperator};
use planx_core::physical::{PhysicalOp, PhysicalPlan};
use planx_core::property::{PhysicalProperty, TaskType, WHOLE_TASK_TYPES};
use planx_core::session::SessionCtx;

use crate::impl_join::get_hash_join;
use crate::sort_prefix::{get_prop_by_order_by_items, match_items};

/// Selection filters rows without touching order or placement: one
/// candidate, property forwarded verbatim.
pub fn exhaust_selection(
    p: &LogicalOperator,
    conditions: &[Expr],
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    vec![PhysicalPlan::new(
        PhysicalOp::Selection {
            conditions: conditions.to_vec(),
        },
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![prop.clone()],
    )]
}

/// Map each requested order column through the projection: a plain column
/// passes, a scalar function blocks the push-down, a constant drops out
/// (any order holds over a constant).
fn try_to_get_child_prop(
    p: &LogicalOperator,
    exprs: &[Expr],
    prop: &PhysicalProperty,
) -> Option<PhysicalProperty> {
    let mut new_cols = Vec::with_capacity(prop.cols.len());
    for col in &prop.cols {
        let idx = p.schema.column_index(col)?;
        match &exprs[idx] {
            Expr::Column(child_col) => new_cols.push(child_col.clone()),
            Expr::ScalarFunction { .. } => return None,
            Expr::Constant { .. } => {}
        }
    }
    let mut new_prop = PhysicalProperty::with_cols(TaskType::Root, prop.expected_cnt, new_cols);
    new_prop.desc = prop.desc;
    Some(new_prop)
}

pub fn exhaust_projection(
    p: &LogicalOperator,
    exprs: &[Expr],
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    let Some(new_prop) = try_to_get_child_prop(p, exprs, prop) else {
        return Vec::new();
    };
    vec![PhysicalPlan::new(
        PhysicalOp::Projection {
            exprs: exprs.to_vec(),
        },
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![new_prop],
    )]
}

/// Limit destroys order. One candidate per task type, each asking its child
/// for at most `count + offset` rows.
pub fn exhaust_limit(
    p: &LogicalOperator,
    count: u64,
    offset: u64,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    if !prop.is_empty() {
        return Vec::new();
    }
    WHOLE_TASK_TYPES
        .iter()
        .map(|&task_tp| {
            PhysicalPlan::new(
                PhysicalOp::Limit { count, offset },
                p.schema.clone(),
                p.stats.clone(),
                vec![PhysicalProperty::new(task_tp, (count + offset) as f64)],
            )
        })
        .collect()
}

fn get_phys_top_n(
    p: &LogicalOperator,
    by_items: &[ByItem],
    count: u64,
    offset: u64,
) -> Vec<PhysicalPlan> {
    WHOLE_TASK_TYPES
        .iter()
        .map(|&task_tp| {
            PhysicalPlan::new(
                PhysicalOp::TopN {
                    by_items: by_items.to_vec(),
                    count,
                    offset,
                },
                p.schema.clone(),
                p.stats.clone(),
                vec![PhysicalProperty::new(task_tp, f64::INFINITY)],
            )
        })
        .collect()
}

/// When the child can deliver the top-n order itself, the top-n degrades to
/// a limit over ordered input.
fn get_phys_limits(
    p: &LogicalOperator,
    by_items: &[ByItem],
    count: u64,
    offset: u64,
) -> Vec<PhysicalPlan> {
    let Some(order_prop) = get_prop_by_order_by_items(by_items) else {
        return Vec::new();
    };
    WHOLE_TASK_TYPES
        .iter()
        .map(|&task_tp| {
            let mut child_prop = PhysicalProperty::with_cols(
                task_tp,
                (count + offset) as f64,
                order_prop.cols.clone(),
            );
            child_prop.desc = order_prop.desc;
            PhysicalPlan::new(
                PhysicalOp::Limit { count, offset },
                p.schema.clone(),
                p.stats.clone(),
                vec![child_prop],
            )
        })
        .collect()
}

pub fn exhaust_top_n(
    p: &LogicalOperator,
    by_items: &[ByItem],
    count: u64,
    offset: u64,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    if !match_items(prop, by_items) {
        return Vec::new();
    }
    let mut plans = get_phys_top_n(p, by_items, count, offset);
    plans.extend(get_phys_limits(p, by_items, count, offset));
    plans
}

fn get_physical_sort(
    p: &LogicalOperator,
    by_items: &[ByItem],
    prop: &PhysicalProperty,
) -> PhysicalPlan {
    PhysicalPlan::new(
        PhysicalOp::Sort {
            by_items: by_items.to_vec(),
        },
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![PhysicalProperty::new(TaskType::Root, f64::INFINITY)],
    )
}

/// A sort the child can satisfy natively: nothing runs at execution, the
/// order requirement just moves down.
fn get_nominal_sort(
    p: &LogicalOperator,
    by_items: &[ByItem],
    req_prop: &PhysicalProperty,
) -> Option<PhysicalPlan> {
    let mut child_prop = get_prop_by_order_by_items(by_items)?;
    child_prop.expected_cnt = req_prop.expected_cnt;
    Some(PhysicalPlan::new(
        PhysicalOp::NominalSort,
        p.schema.clone(),
        p.stats.clone(),
        vec![child_prop],
    ))
}

pub fn exhaust_sort(
    p: &LogicalOperator,
    by_items: &[ByItem],
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    if !match_items(prop, by_items) {
        return Vec::new();
    }
    let mut plans = Vec::with_capacity(2);
    plans.push(get_physical_sort(p, by_items, prop));
    if let Some(nominal) = get_nominal_sort(p, by_items, prop) {
        plans.push(nominal);
    }
    plans
}

// TODO: union-all drops any order today; a merging variant could keep it.
pub fn exhaust_union_all(p: &LogicalOperator, prop: &PhysicalProperty) -> Vec<PhysicalPlan> {
    if !prop.is_empty() {
        return Vec::new();
    }
    let ch_req_props = p
        .children
        .iter()
        .map(|_| PhysicalProperty::new(TaskType::Root, prop.expected_cnt))
        .collect();
    vec![PhysicalPlan::new(
        PhysicalOp::UnionAll,
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        ch_req_props,
    )]
}

pub fn exhaust_lock(
    p: &LogicalOperator,
    lock: LockType,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    vec![PhysicalPlan::new(
        PhysicalOp::Lock { lock },
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![prop.clone()],
    )]
}

/// The child budget of 2 lets the executor see the violating second row.
pub fn exhaust_max_one_row(p: &LogicalOperator, prop: &PhysicalProperty) -> Vec<PhysicalPlan> {
    if !prop.is_empty() {
        return Vec::new();
    }
    vec![PhysicalPlan::new(
        PhysicalOp::MaxOneRow,
        p.schema.clone(),
        p.stats.clone(),
        vec![PhysicalProperty::new(TaskType::Root, 2.0)],
    )]
}

pub fn exhaust_union_scan(
    p: &LogicalOperator,
    conditions: &[Expr],
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    vec![PhysicalPlan::new(
        PhysicalOp::UnionScan {
            conditions: conditions.to_vec(),
        },
        p.schema.clone(),
        p.stats.clone(),
        vec![prop.clone()],
    )]
}

/// Correlated execution: the outer (left) child streams, the inner side is
/// re-evaluated per outer row through a hash-join shape. Order can only be
/// promised on outer columns.
pub fn exhaust_apply(
    ctx: &SessionCtx,
    p: &LogicalOperator,
    join: &LogicalJoin,
    cor_cols: &[Column],
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    if !prop.all_cols_from_schema(&p.children[0].schema) {
        return Vec::new();
    }
    let hash_join = get_hash_join(ctx, p, join, prop, 1);
    let mut outer_prop = PhysicalProperty::with_cols(TaskType::Root, f64::INFINITY, prop.cols.clone());
    outer_prop.desc = prop.desc;
    let ch_req_props = vec![outer_prop, PhysicalProperty::new(TaskType::Root, f64::INFINITY)];
    vec![PhysicalPlan::new(
        PhysicalOp::Apply {
            join: Box::new(hash_join),
            outer_schema: cor_cols.to_vec(),
            right_ch_offset: p.children[0].schema.len(),
        },
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        ch_req_props,
    )]
}
