//! # Aggregation Enumeration
//!
//! Two implementations of a logical aggregation:
//!
//! - **Hash aggregate**: works on any input order but destroys it, so it only
//!   fires under an empty required property. One candidate per task type.
//! - **Stream aggregate**: consumes input grouped by its sort order. It needs
//!   every GROUP BY item to be a plain column, no final-mode aggregate, and a
//!   child ordering that covers all group-by columns. The child's row budget
//!   scales by the input-to-output ratio: producing `expected_cnt` groups
//!   takes proportionally more input rows.

use planx_core::logical::{AggMode, LogicalAggregation, LogicalOperator};
use planx_core::physical::{PhysicalOp, PhysicalPlan};
use planx_core::property::{PhysicalProperty, TaskType, WHOLE_TASK_TYPES};

use crate::sort_prefix::max_sort_prefix;

pub fn exhaust_aggregation(
    p: &LogicalOperator,
    agg: &LogicalAggregation,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    let mut aggs = Vec::with_capacity(agg.possible_properties.len() + WHOLE_TASK_TYPES.len());
    aggs.extend(get_hash_aggs(p, agg, prop));
    aggs.extend(get_stream_aggs(p, agg, prop));
    aggs
}

fn get_hash_aggs(
    p: &LogicalOperator,
    agg: &LogicalAggregation,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    if !prop.is_empty() {
        return Vec::new();
    }
    WHOLE_TASK_TYPES
        .iter()
        .map(|&task_tp| {
            PhysicalPlan::new(
                PhysicalOp::HashAgg {
                    group_by_items: agg.group_by_items.clone(),
                    agg_funcs: agg.agg_funcs.clone(),
                },
                p.schema.clone(),
                p.stats.scale_by_expect_cnt(prop.expected_cnt),
                vec![PhysicalProperty::new(task_tp, f64::INFINITY)],
            )
        })
        .collect()
}

fn get_stream_aggs(
    p: &LogicalOperator,
    agg: &LogicalAggregation,
    prop: &PhysicalProperty,
) -> Vec<PhysicalPlan> {
    if agg.possible_properties.is_empty() {
        return Vec::new();
    }
    // A final-mode aggregate consumes partial states; its input shape is
    // already fixed.
    if agg.agg_funcs.iter().any(|f| f.mode == AggMode::Final) {
        return Vec::new();
    }
    // GROUP BY a + b is not interested in any order.
    if agg.group_by_cols.len() != agg.group_by_items.len() {
        return Vec::new();
    }

    let child_expected_cnt =
        (prop.expected_cnt * agg.input_count / p.stats.row_count).max(prop.expected_cnt);

    let mut stream_aggs = Vec::with_capacity(agg.possible_properties.len() * 2);
    for possible_child_property in &agg.possible_properties {
        let offsets = max_sort_prefix(possible_child_property, &agg.group_by_cols);
        if offsets.len() != agg.group_by_cols.len() {
            continue;
        }

        let child_prop = PhysicalProperty {
            task_tp: TaskType::Root,
            cols: possible_child_property[..offsets.len()].to_vec(),
            desc: prop.desc,
            expected_cnt: child_expected_cnt,
            enforced: false,
        };
        if !prop.is_prefix(&child_prop) {
            continue;
        }

        // A double read cannot keep the scan pair ordered, so it never
        // serves a stream aggregate.
        for task_tp in [TaskType::CopSingleRead, TaskType::Root] {
            let mut copied_child_prop = child_prop.clone();
            copied_child_prop.task_tp = task_tp;
            stream_aggs.push(PhysicalPlan::new(
                PhysicalOp::StreamAgg {
                    group_by_items: agg.group_by_items.clone(),
                    agg_funcs: agg.agg_funcs.clone(),
                },
                p.schema.clone(),
                p.stats.scale_by_expect_cnt(prop.expected_cnt),
                vec![copied_child_prop],
            ));
        }
    }
    stream_aggs
}
