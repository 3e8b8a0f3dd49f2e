//! # Join Enumeration
//!
//! A logical join can become a sort-merge join, an index join, or a hash
//! join. Each family has its own applicability rules:
//!
//! ## Sort-Merge Join
//!
//! Fires when some ordering a child can deliver lines up with a prefix of
//! the join keys. Both key lists are realigned to that prefix; equalities
//! outside it degrade to general predicates. Under a merge-join hint with no
//! natural candidate, an *enforced* merge join is produced instead: the key
//! lists are reordered to the required property and the children are asked
//! for explicitly sorted input.
//!
//! ## Index Join
//!
//! Fires when the inner side is a data source (possibly under a union scan)
//! with a usable primary key or secondary index; see `index_join`.
//!
//! ## Hash Join
//!
//! The fallback for any equi-join, but it destroys order, so it only fires
//! under an empty required property. The build side follows the join type;
//! inner joins try both orientations.
//!
//! ## Hint Policy
//!
//! A merge-join or hash-join hint collapses the result to that family. An
//! index-inner hint makes the matching index-join orientation exclusive when
//! it produced a plan at all.

use planx_core::expr::{Column, Expr};
use planx_core::logical::{JoinHints, JoinType, LogicalJoin, LogicalOperator};
use planx_core::physical::{PhysicalOp, PhysicalPlan};
use planx_core::property::{PhysicalProperty, TaskType};
use planx_core::schema::Schema;
use planx_core::session::SessionCtx;

use crate::index_join::get_index_join_by_outer_idx;
use crate::sort_prefix::{find_max_prefix_len, keys_by_offsets, max_sort_prefix};

/// All join candidates for `p` under `prop`, hint policy applied.
pub fn exhaust_join(
    ctx: &SessionCtx,
    p: &LogicalOperator,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    let merge_joins = get_merge_join(p, join, prop);
    if join.prefer_join_type.contains(JoinHints::MERGE_JOIN) {
        return merge_joins;
    }
    let mut joins = Vec::with_capacity(5);
    joins.extend(merge_joins);

    let (index_joins, forced) = try_to_get_index_join(ctx, p, join, prop);
    if forced {
        return index_joins;
    }
    joins.extend(index_joins);

    let hash_joins = get_hash_joins(ctx, p, join, prop);
    if join.prefer_join_type.contains(JoinHints::HASH_JOIN) {
        return hash_joins;
    }
    joins.extend(hash_joins);
    joins
}

/// The properties a merge join must request from its children, or `None`
/// when the required property rules this candidate out.
fn try_to_get_child_req_prop(
    join_type: JoinType,
    left_keys: &[Column],
    right_keys: &[Column],
    prop: &PhysicalProperty,
) -> Option<[PhysicalProperty; 2]> {
    let l_prop = PhysicalProperty::with_cols(TaskType::Root, f64::INFINITY, left_keys.to_vec());
    let r_prop = PhysicalProperty::with_cols(TaskType::Root, f64::INFINITY, right_keys.to_vec());
    if !prop.is_empty() {
        // Merge join fits massive ordered data; a descending scan forecloses
        // the cheap forward read.
        if prop.desc {
            return None;
        }
        if !prop.is_prefix(&l_prop) && !prop.is_prefix(&r_prop) {
            return None;
        }
        // Outer-side nulls perturb the opposite side's ordering.
        if prop.is_prefix(&r_prop) && join_type == JoinType::LeftOuter {
            return None;
        }
        if prop.is_prefix(&l_prop) && join_type == JoinType::RightOuter {
            return None;
        }
    }
    Some([l_prop, r_prop])
}

/// Equal conditions whose index is not in `offsets` become general
/// predicates of the merge join.
fn move_equal_to_other_conditions(join: &LogicalJoin, offsets: &[usize]) -> Vec<Expr> {
    let mut other_conds = join.other_conditions.clone();
    for (i, eq_cond) in join.equal_conditions.iter().enumerate() {
        if !offsets.contains(&i) {
            other_conds.push(eq_cond.clone());
        }
    }
    other_conds
}

fn get_merge_join(
    p: &LogicalOperator,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    let mut joins = Vec::with_capacity(join.left_properties.len());
    // left_properties caches every ordering the left child could provide.
    for lhs_child_property in &join.left_properties {
        let offsets = max_sort_prefix(lhs_child_property, &join.left_join_keys);
        if offsets.is_empty() {
            continue;
        }

        let left_keys = &lhs_child_property[..offsets.len()];
        let right_keys =
            Schema::new(join.right_join_keys.clone()).columns_by_indices(&offsets);

        let prefix_len = find_max_prefix_len(&join.right_properties, &right_keys);
        if prefix_len == 0 {
            continue;
        }

        let left_keys = left_keys[..prefix_len].to_vec();
        let right_keys = right_keys[..prefix_len].to_vec();
        let offsets = &offsets[..prefix_len];

        let Some(child_props) = try_to_get_child_req_prop(join.join_type, &left_keys, &right_keys, prop)
        else {
            continue;
        };
        let merge_join = PhysicalPlan::new(
            PhysicalOp::MergeJoin {
                join_type: join.join_type,
                left_keys,
                right_keys,
                left_conditions: join.left_conditions.clone(),
                right_conditions: join.right_conditions.clone(),
                other_conditions: move_equal_to_other_conditions(join, offsets),
                default_values: join.default_values.clone(),
            },
            p.schema.clone(),
            p.stats.scale_by_expect_cnt(prop.expected_cnt),
            child_props.to_vec(),
        );
        joins.push(merge_join);
    }
    // With the merge-join hint set and no join key in any child ordering,
    // fall back to an enforced merge join.
    if joins.is_empty() && join.prefer_join_type.contains(JoinHints::MERGE_JOIN) {
        return get_enforced_merge_join(p, join, prop);
    }

    joins
}

/// A merge join whose children are explicitly sorted to the required
/// property. Each property column must claim a distinct join-key position;
/// otherwise no enforced plan exists.
fn get_enforced_merge_join(
    p: &LogicalOperator,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    let mut offsets: Vec<usize> = Vec::with_capacity(join.left_join_keys.len());
    for col in &prop.cols {
        let mut claimed = false;
        for pos in 0..join.left_join_keys.len() {
            if !col.equal(&join.left_join_keys[pos]) && !col.equal(&join.right_join_keys[pos]) {
                continue;
            }
            if offsets.contains(&pos) {
                continue;
            }
            offsets.push(pos);
            claimed = true;
            break;
        }
        if !claimed {
            return Vec::new();
        }
    }
    let left_keys = keys_by_offsets(&join.left_join_keys, &offsets);
    let right_keys = keys_by_offsets(&join.right_join_keys, &offsets);
    let mut l_prop = PhysicalProperty::with_cols(TaskType::Root, f64::INFINITY, left_keys.clone());
    l_prop.enforced = true;
    l_prop.desc = prop.desc;
    let mut r_prop = PhysicalProperty::with_cols(TaskType::Root, f64::INFINITY, right_keys.clone());
    r_prop.enforced = true;
    r_prop.desc = prop.desc;

    let enforced = PhysicalPlan::new(
        PhysicalOp::MergeJoin {
            join_type: join.join_type,
            left_keys,
            right_keys,
            left_conditions: join.left_conditions.clone(),
            right_conditions: join.right_conditions.clone(),
            other_conditions: join.other_conditions.clone(),
            default_values: join.default_values.clone(),
        },
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        vec![l_prop, r_prop],
    );
    vec![enforced]
}

fn get_hash_joins(
    ctx: &SessionCtx,
    p: &LogicalOperator,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    // Hash join doesn't promise any orders.
    if !prop.is_empty() {
        return Vec::new();
    }
    let mut joins = Vec::with_capacity(2);
    match join.join_type {
        JoinType::Semi
        | JoinType::AntiSemi
        | JoinType::LeftOuterSemi
        | JoinType::AntiLeftOuterSemi
        | JoinType::LeftOuter => joins.push(get_hash_join(ctx, p, join, prop, 1)),
        JoinType::RightOuter => joins.push(get_hash_join(ctx, p, join, prop, 0)),
        JoinType::Inner => {
            joins.push(get_hash_join(ctx, p, join, prop, 1));
            joins.push(get_hash_join(ctx, p, join, prop, 0));
        }
    }
    joins
}

/// One hash-join candidate with the given build side. The build side must be
/// materialized fully; the probe side inherits the parent's row budget.
pub(crate) fn get_hash_join(
    ctx: &SessionCtx,
    p: &LogicalOperator,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
    inner_idx: usize,
) -> PhysicalPlan {
    let mut ch_req_props = vec![PhysicalProperty::default(), PhysicalProperty::default()];
    ch_req_props[inner_idx] = PhysicalProperty::new(TaskType::Root, f64::INFINITY);
    ch_req_props[1 - inner_idx] = PhysicalProperty::new(TaskType::Root, prop.expected_cnt);
    PhysicalPlan::new(
        PhysicalOp::HashJoin {
            join_type: join.join_type,
            equal_conditions: join.equal_conditions.clone(),
            left_conditions: join.left_conditions.clone(),
            right_conditions: join.right_conditions.clone(),
            other_conditions: join.other_conditions.clone(),
            default_values: join.default_values.clone(),
            concurrency: ctx.vars.hash_join_concurrency,
            inner_child_idx: inner_idx,
        },
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        ch_req_props,
    )
}

/// Index-join candidates plus whether a hint made them exclusive.
///
/// Join type fixes which orientations are meaningful: left-outer-ish joins
/// and semijoins can only drive from the left, right-outer joins only from
/// the right, and inner joins try both. Without a deciding hint, the inner
/// join prefers driving from the smaller child.
fn try_to_get_index_join(
    ctx: &SessionCtx,
    p: &LogicalOperator,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
) -> (Vec<PhysicalPlan>, bool) {
    if join.equal_conditions.is_empty() {
        return (Vec::new(), false);
    }
    let right_as_outer = join.prefer_join_type.contains(JoinHints::LEFT_AS_INDEX_INNER);
    let left_as_outer = join.prefer_join_type.contains(JoinHints::RIGHT_AS_INDEX_INNER);
    match join.join_type {
        JoinType::Semi
        | JoinType::AntiSemi
        | JoinType::LeftOuterSemi
        | JoinType::AntiLeftOuterSemi
        | JoinType::LeftOuter => {
            let joins = get_index_join_by_outer_idx(ctx, p, join, prop, 0);
            if !joins.is_empty() && left_as_outer {
                return (joins, true);
            }
            (joins, false)
        }
        JoinType::RightOuter => {
            let joins = get_index_join_by_outer_idx(ctx, p, join, prop, 1);
            if !joins.is_empty() && right_as_outer {
                return (joins, true);
            }
            (joins, false)
        }
        JoinType::Inner => {
            let lhs_cardinality = p.children[0].stats.count();
            let rhs_cardinality = p.children[1].stats.count();

            let left_joins = get_index_join_by_outer_idx(ctx, p, join, prop, 0);
            if left_as_outer && !left_joins.is_empty() {
                return (left_joins, true);
            }

            let right_joins = get_index_join_by_outer_idx(ctx, p, join, prop, 1);
            if right_as_outer && !right_joins.is_empty() {
                return (right_joins, true);
            }

            // Drive from the smaller side: fewer outer rows, fewer lookups.
            if !left_joins.is_empty() && lhs_cardinality < rhs_cardinality {
                return (left_joins, false);
            }
            if !right_joins.is_empty() && rhs_cardinality < lhs_cardinality {
                return (right_joins, false);
            }

            let mut joins = left_joins;
            joins.extend(right_joins);
            (joins, false)
        }
    }
}
