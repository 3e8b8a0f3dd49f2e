//! # Physical Properties
//!
//! A `PhysicalProperty` is the contract a parent plan asks of a child: where
//! the child must run (`TaskType`), an order prefix it must deliver, and an
//! upper bound on the rows the parent will consume. Properties flow down the
//! tree during top-down search; each enumeration function decides whether an
//! algorithm can satisfy the requested property and what it must in turn
//! request from its own children.
//!
//! ## The Empty Property
//!
//! An empty property (`cols` empty) means "any order is fine". Operators that
//! destroy order (hash join, hash aggregate, limit) only fire under an empty
//! property; order-preserving operators translate the property and pass it
//! down.
//!
//! ## Enforced Orders
//!
//! `enforced` marks a property the child cannot be expected to produce
//! natively -- the search driver must place an explicit sort above the child
//! to realize it. Enumeration only sets this for hint-forced merge joins.

use serde::{Deserialize, Serialize};

use crate::expr::Column;
use crate::schema::Schema;

/// Where an operator's computation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// On the coordinator.
    #[default]
    Root,
    /// Pushed down as a single range read.
    CopSingleRead,
    /// Pushed down as an index read followed by a table lookup.
    CopDoubleRead,
}

/// Every placement an operator may be asked to run at.
pub const WHOLE_TASK_TYPES: [TaskType; 3] = [
    TaskType::CopSingleRead,
    TaskType::CopDoubleRead,
    TaskType::Root,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalProperty {
    pub task_tp: TaskType,
    /// Required order prefix; empty means no order requirement.
    pub cols: Vec<Column>,
    /// Whether the prefix is descending.
    pub desc: bool,
    /// Upper bound on rows the parent will consume; `f64::INFINITY` means
    /// the parent reads everything.
    pub expected_cnt: f64,
    /// True when an explicit sort must be inserted above the child.
    pub enforced: bool,
}

impl Default for PhysicalProperty {
    fn default() -> Self {
        Self {
            task_tp: TaskType::Root,
            cols: Vec::new(),
            desc: false,
            expected_cnt: f64::INFINITY,
            enforced: false,
        }
    }
}

impl PhysicalProperty {
    pub fn new(task_tp: TaskType, expected_cnt: f64) -> Self {
        Self {
            task_tp,
            expected_cnt,
            ..Default::default()
        }
    }

    pub fn with_cols(task_tp: TaskType, expected_cnt: f64, cols: Vec<Column>) -> Self {
        Self {
            task_tp,
            cols,
            expected_cnt,
            ..Default::default()
        }
    }

    /// No order requirement.
    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }

    /// Whether this property's order is a prefix of `other`'s, in the same
    /// direction. An empty property is a prefix of everything.
    pub fn is_prefix(&self, other: &PhysicalProperty) -> bool {
        if self.cols.len() > other.cols.len() || self.desc != other.desc {
            return false;
        }
        self.cols
            .iter()
            .zip(other.cols.iter())
            .all(|(a, b)| a.equal(b))
    }

    /// Whether every required order column comes from `schema`.
    pub fn all_cols_from_schema(&self, schema: &Schema) -> bool {
        self.cols.iter().all(|c| schema.contains(c))
    }
}
