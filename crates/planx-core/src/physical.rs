//! # Physical Plan Skeletons
//!
//! Candidates produced by enumeration. A `PhysicalPlan` is a value: the
//! operator variant with its data, the output schema, a scaled row-count
//! estimate, and -- the heart of property-directed search --
//! `children_req_props`, one required property per child. Skeletons carry no
//! execution logic and no back-pointers into the logical tree.
//!
//! `children` is normally empty; the search driver attaches the winning
//! child plans after costing. The exception is the index-join inner side,
//! which enumeration builds eagerly (readers wrap their pushed-down scan
//! plans, and a union scan wraps its reader), because the inner shape is
//! part of the candidate itself.

use serde::{Deserialize, Serialize};

use crate::catalog::{IndexInfo, TableInfo};
use crate::expr::{ByItem, Column, Datum, Expr};
use crate::logical::{AggFuncDesc, JoinType, LockType};
use crate::property::PhysicalProperty;
use crate::range_filter::ColumnWithComparisons;
use crate::ranger::Range;
use crate::schema::Schema;
use crate::stats::StatsInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalPlan {
    pub op: PhysicalOp,
    pub schema: Schema,
    pub stats: StatsInfo,
    /// What each child must guarantee; length equals the operator's arity.
    pub children_req_props: Vec<PhysicalProperty>,
    /// Pre-built children, only populated for eagerly constructed inner
    /// plans (see module docs).
    pub children: Vec<PhysicalPlan>,
}

impl PhysicalPlan {
    pub fn new(
        op: PhysicalOp,
        schema: Schema,
        stats: StatsInfo,
        children_req_props: Vec<PhysicalProperty>,
    ) -> Self {
        Self {
            op,
            schema,
            stats,
            children_req_props,
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> PhysicalOpKind {
        self.op.kind()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PhysicalOp {
    MergeJoin {
        join_type: JoinType,
        left_keys: Vec<Column>,
        right_keys: Vec<Column>,
        left_conditions: Vec<Expr>,
        right_conditions: Vec<Expr>,
        other_conditions: Vec<Expr>,
        default_values: Vec<Datum>,
    },
    HashJoin {
        join_type: JoinType,
        equal_conditions: Vec<Expr>,
        left_conditions: Vec<Expr>,
        right_conditions: Vec<Expr>,
        other_conditions: Vec<Expr>,
        default_values: Vec<Datum>,
        concurrency: usize,
        /// Which child is materialized into the hash table.
        inner_child_idx: usize,
    },
    IndexJoin {
        join_type: JoinType,
        /// Which child drives the lookups.
        outer_idx: usize,
        outer_join_keys: Vec<Column>,
        inner_join_keys: Vec<Column>,
        left_conditions: Vec<Expr>,
        right_conditions: Vec<Expr>,
        other_conditions: Vec<Expr>,
        default_values: Vec<Datum>,
        /// The fully built lookup side (a reader, possibly under a union
        /// scan).
        inner_plan: Box<PhysicalPlan>,
        /// For each retained join key, the index column it fills.
        key_off_to_idx_off: Vec<usize>,
        /// Range template; join-key slots are placeholders filled per outer
        /// row. Empty when the inner side is a PK lookup.
        ranges: Vec<Range>,
        /// Deferred outer-driven bounds on the next index column, if any.
        compare_filters: Option<ColumnWithComparisons>,
    },
    TableScan {
        table: TableInfo,
        ranges: Vec<Range>,
        /// Predicates evaluated at the storage layer.
        filter_conditions: Vec<Expr>,
        /// Outer join keys whose values decide the scan range at runtime.
        range_decided_by: Vec<Column>,
    },
    IndexScan {
        table: TableInfo,
        index: IndexInfo,
        ranges: Vec<Range>,
        filter_conditions: Vec<Expr>,
        range_decided_by: Vec<Column>,
        keep_order: bool,
    },
    /// Single-read wrapper over a pushed-down table scan.
    TableReader { table_plan: Box<PhysicalPlan> },
    /// Single-read wrapper over a pushed-down index scan.
    IndexReader { index_plan: Box<PhysicalPlan> },
    /// Double-read wrapper: index scan feeding a table lookup.
    IndexLookUpReader {
        index_plan: Box<PhysicalPlan>,
        table_plan: Box<PhysicalPlan>,
    },
    UnionScan { conditions: Vec<Expr> },
    Selection { conditions: Vec<Expr> },
    Projection { exprs: Vec<Expr> },
    Limit { count: u64, offset: u64 },
    TopN { by_items: Vec<ByItem>, count: u64, offset: u64 },
    Sort { by_items: Vec<ByItem> },
    /// A sort satisfied entirely by the child's ordering; emits nothing at
    /// execution.
    NominalSort,
    UnionAll,
    Lock { lock: LockType },
    MaxOneRow,
    Apply {
        /// The hash-join shape modelling the correlated execution.
        join: Box<PhysicalPlan>,
        /// Outer columns the inner side reads per iteration.
        outer_schema: Vec<Column>,
        right_ch_offset: usize,
    },
    HashAgg {
        group_by_items: Vec<Expr>,
        agg_funcs: Vec<AggFuncDesc>,
    },
    StreamAgg {
        group_by_items: Vec<Expr>,
        agg_funcs: Vec<AggFuncDesc>,
    },
}

/// Kind discriminant for assertions and dispatch without inspecting fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhysicalOpKind {
    MergeJoin,
    HashJoin,
    IndexJoin,
    TableScan,
    IndexScan,
    TableReader,
    IndexReader,
    IndexLookUpReader,
    UnionScan,
    Selection,
    Projection,
    Limit,
    TopN,
    Sort,
    NominalSort,
    UnionAll,
    Lock,
    MaxOneRow,
    Apply,
    HashAgg,
    StreamAgg,
}

impl PhysicalOp {
    pub fn kind(&self) -> PhysicalOpKind {
        match self {
            PhysicalOp::MergeJoin { .. } => PhysicalOpKind::MergeJoin,
            PhysicalOp::HashJoin { .. } => PhysicalOpKind::HashJoin,
            PhysicalOp::IndexJoin { .. } => PhysicalOpKind::IndexJoin,
            PhysicalOp::TableScan { .. } => PhysicalOpKind::TableScan,
            PhysicalOp::IndexScan { .. } => PhysicalOpKind::IndexScan,
            PhysicalOp::TableReader { .. } => PhysicalOpKind::TableReader,
            PhysicalOp::IndexReader { .. } => PhysicalOpKind::IndexReader,
            PhysicalOp::IndexLookUpReader { .. } => PhysicalOpKind::IndexLookUpReader,
            PhysicalOp::UnionScan { .. } => PhysicalOpKind::UnionScan,
            PhysicalOp::Selection { .. } => PhysicalOpKind::Selection,
            PhysicalOp::Projection { .. } => PhysicalOpKind::Projection,
            PhysicalOp::Limit { .. } => PhysicalOpKind::Limit,
            PhysicalOp::TopN { .. } => PhysicalOpKind::TopN,
            PhysicalOp::Sort { .. } => PhysicalOpKind::Sort,
            PhysicalOp::NominalSort => PhysicalOpKind::NominalSort,
            PhysicalOp::UnionAll => PhysicalOpKind::UnionAll,
            PhysicalOp::Lock { .. } => PhysicalOpKind::Lock,
            PhysicalOp::MaxOneRow => PhysicalOpKind::MaxOneRow,
            PhysicalOp::Apply { .. } => PhysicalOpKind::Apply,
            PhysicalOp::HashAgg { .. } => PhysicalOpKind::HashAgg,
            PhysicalOp::StreamAgg { .. } => PhysicalOpKind::StreamAgg,
        }
    }
}
