//! # Logical Operators
//!
//! The logical tree consumed by enumeration. Operators are a tagged sum
//! (`LogicalOp`) wrapped by `LogicalOperator`, which carries what every node
//! has: an output schema, a derived row-count estimate, and children. The
//! tree is read-only to the enumeration core.

use serde::{Deserialize, Serialize};

use crate::catalog::{IndexInfo, TableInfo};
use crate::expr::{ByItem, Column, Datum, Expr};
use crate::schema::Schema;
use crate::stats::{StatisticTable, StatsInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
    Semi,
    AntiSemi,
    LeftOuterSemi,
    AntiLeftOuterSemi,
}

/// User hints pinning the join algorithm, as a bitset. Multiple hints can be
/// set at once; enumeration resolves conflicts by checking them in a fixed
/// order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinHints(u32);

impl JoinHints {
    pub const MERGE_JOIN: JoinHints = JoinHints(1);
    pub const HASH_JOIN: JoinHints = JoinHints(1 << 1);
    /// Use the left child as the index-join inner (lookup) side.
    pub const LEFT_AS_INDEX_INNER: JoinHints = JoinHints(1 << 2);
    /// Use the right child as the index-join inner (lookup) side.
    pub const RIGHT_AS_INDEX_INNER: JoinHints = JoinHints(1 << 3);

    pub fn none() -> Self {
        Self::default()
    }

    pub fn contains(self, other: JoinHints) -> bool {
        self.0 & other.0 != 0
    }

    pub fn with(self, other: JoinHints) -> Self {
        JoinHints(self.0 | other.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalJoin {
    pub join_type: JoinType,
    /// Equi-predicates `left_join_keys[i] = right_join_keys[i]`; the three
    /// vectors stay index-aligned.
    pub equal_conditions: Vec<Expr>,
    pub left_join_keys: Vec<Column>,
    pub right_join_keys: Vec<Column>,
    pub left_conditions: Vec<Expr>,
    pub right_conditions: Vec<Expr>,
    pub other_conditions: Vec<Expr>,
    /// Padding values for outer joins.
    pub default_values: Vec<Datum>,
    pub prefer_join_type: JoinHints,
    /// Orderings the left child can plausibly deliver, precomputed by
    /// logical analysis.
    pub left_properties: Vec<Vec<Column>>,
    pub right_properties: Vec<Vec<Column>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggFunc {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    FirstRow,
}

/// Evaluation mode of an aggregate: `Final` consumes partial states produced
/// below and therefore pins the aggregation shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggMode {
    Partial,
    Final,
    Complete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggFuncDesc {
    pub func: AggFunc,
    pub args: Vec<Expr>,
    pub mode: AggMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalAggregation {
    pub group_by_items: Vec<Expr>,
    pub agg_funcs: Vec<AggFuncDesc>,
    /// The group-by items that are plain columns. When shorter than
    /// `group_by_items`, some item is an expression and no input order can
    /// serve the grouping.
    pub group_by_cols: Vec<Column>,
    /// Orderings the child can plausibly deliver.
    pub possible_properties: Vec<Vec<Column>>,
    /// Input row-count estimate, used to scale the child's row budget.
    pub input_count: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockType {
    ForUpdate,
    InShareMode,
}

/// One way of reading a table: the row store itself or a secondary index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccessPath {
    Table,
    Index(IndexInfo),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub table_info: TableInfo,
    pub possible_access_paths: Vec<AccessPath>,
    /// Predicates already pushed to the storage layer.
    pub pushed_down_conds: Vec<Expr>,
    pub statistic_table: StatisticTable,
}

impl DataSource {
    /// The clustered integer primary key column, when the table's handle is
    /// a declared PK. Resolved against the data source's output schema.
    pub fn pk_is_handle_col(&self, schema: &Schema) -> Option<Column> {
        if !self.table_info.pk_is_handle {
            return None;
        }
        let pk_info = self.table_info.columns.iter().find(|c| c.pk)?;
        schema.columns.iter().find(|c| c.name == pk_info.name).cloned()
    }

    pub fn has_table_path(&self) -> bool {
        self.possible_access_paths
            .iter()
            .any(|p| matches!(p, AccessPath::Table))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogicalOp {
    DataSource(DataSource),
    Selection { conditions: Vec<Expr> },
    Projection { exprs: Vec<Expr> },
    Join(LogicalJoin),
    Aggregation(LogicalAggregation),
    Sort { by_items: Vec<ByItem> },
    TopN { by_items: Vec<ByItem>, count: u64, offset: u64 },
    Limit { count: u64, offset: u64 },
    UnionAll,
    Lock { lock: LockType },
    MaxOneRow,
    /// Merges uncommitted in-transaction changes over a base scan.
    UnionScan { conditions: Vec<Expr> },
    /// Correlated subquery execution; `join` describes the decorrelated join
    /// shape and `cor_cols` the outer columns the inner side reads.
    Apply { join: LogicalJoin, cor_cols: Vec<Column> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicalOperator {
    pub op: LogicalOp,
    pub schema: Schema,
    pub stats: StatsInfo,
    pub children: Vec<LogicalOperator>,
}

impl LogicalOperator {
    pub fn new(
        op: LogicalOp,
        schema: Schema,
        stats: StatsInfo,
        children: Vec<LogicalOperator>,
    ) -> Self {
        Self {
            op,
            schema,
            stats,
            children,
        }
    }

    pub fn as_data_source(&self) -> Option<&DataSource> {
        match &self.op {
            LogicalOp::DataSource(ds) => Some(ds),
            _ => None,
        }
    }
}
