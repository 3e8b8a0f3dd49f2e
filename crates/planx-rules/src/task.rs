//! # Cop-Task Finalization
//!
//! Inner plans of an index join are built eagerly, scan-side first. A
//! `CopTask` collects the pushed-down pieces -- an index scan, a table scan,
//! or both -- and `finish_cop_task` seals them under the matching reader
//! operator: single read for a lone table or index scan, double read when an
//! index scan must look rows up in the table afterwards.

use planx_core::expr::Expr;
use planx_core::physical::{PhysicalOp, PhysicalPlan};
use planx_core::stats::StatsInfo;

#[derive(Debug)]
pub struct CopTask {
    pub index_plan: Option<PhysicalPlan>,
    pub table_plan: Option<PhysicalPlan>,
    /// True once the index side needs no further pushed-down operators.
    pub index_plan_finished: bool,
}

/// Seal a cop task under its reader.
///
/// Panics when the task is empty; callers always seed at least one scan.
pub fn finish_cop_task(task: CopTask) -> PhysicalPlan {
    match (task.index_plan, task.table_plan) {
        (Some(index_plan), Some(table_plan)) => {
            let schema = table_plan.schema.clone();
            let stats = table_plan.stats.clone();
            PhysicalPlan::new(
                PhysicalOp::IndexLookUpReader {
                    index_plan: Box::new(index_plan),
                    table_plan: Box::new(table_plan),
                },
                schema,
                stats,
                Vec::new(),
            )
        }
        (Some(index_plan), None) => {
            let schema = index_plan.schema.clone();
            let stats = index_plan.stats.clone();
            PhysicalPlan::new(
                PhysicalOp::IndexReader {
                    index_plan: Box::new(index_plan),
                },
                schema,
                stats,
                Vec::new(),
            )
        }
        (None, Some(table_plan)) => {
            let schema = table_plan.schema.clone();
            let stats = table_plan.stats.clone();
            PhysicalPlan::new(
                PhysicalOp::TableReader {
                    table_plan: Box::new(table_plan),
                },
                schema,
                stats,
                Vec::new(),
            )
        }
        (None, None) => panic!("finish_cop_task called on an empty cop task"),
    }
}

/// Wrap `plan` in a pushed-down selection when there are conditions to apply.
pub fn attach_selection(plan: PhysicalPlan, conditions: &[Expr], stats: StatsInfo) -> PhysicalPlan {
    if conditions.is_empty() {
        return plan;
    }
    let schema = plan.schema.clone();
    let mut sel = PhysicalPlan::new(
        PhysicalOp::Selection {
            conditions: conditions.to_vec(),
        },
        schema,
        stats,
        Vec::new(),
    );
    sel.children.push(plan);
    sel
}
