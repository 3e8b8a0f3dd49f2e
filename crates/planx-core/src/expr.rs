//! # Scalar Expression Types
//!
//! This module defines the expression layer consumed by plan enumeration:
//!
//! ## Columns
//! A `Column` carries a stable `unique_id` assigned during name resolution.
//! Two columns are the same column iff their ids are equal -- equality and
//! hashing never look at the name or the type. The `index` field is the
//! column's position in its owning row layout and is only used when an
//! expression is evaluated against a concrete row.
//!
//! ## Datums
//! `Datum` is the runtime value type. It includes the `MinNotNull` and
//! `MaxValue` sentinels used as open range endpoints. `f64` is wrapped in
//! `OrderedFloat` so datums are `Eq` and `Hash`.
//!
//! ## Expressions
//! `Expr` is a small recursive tree: column references, typed constants, and
//! scalar functions (comparisons, `IN`, and integer/float arithmetic).
//! Enumeration never executes plans, but it does evaluate constant arguments
//! while building range templates and evaluates outer-driven bounds per row,
//! so `Expr::eval` covers exactly that surface.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::PlanError;

/// Type of a column or constant. Only the facets the enumeration core reads
/// are modeled: integer signedness (PK range construction) and enough kind
/// information to order datums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Int { unsigned: bool },
    Float,
    Str,
}

impl FieldType {
    pub fn is_unsigned(&self) -> bool {
        matches!(self, FieldType::Int { unsigned: true })
    }
}

/// A resolved column reference.
///
/// Identity is the `unique_id`; everything else is payload. Operators share
/// columns by identity, so the prefix/containment checks in property and
/// index analysis must not compare structurally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub unique_id: i64,
    /// Position in the owning row layout, used for row access.
    pub index: usize,
    pub name: String,
    pub ret_type: FieldType,
}

impl Column {
    pub fn equal(&self, other: &Column) -> bool {
        self.unique_id == other.unique_id
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id == other.unique_id
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_id.hash(state);
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Runtime scalar value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Datum {
    /// SQL NULL.
    Null,
    /// Smallest non-null value; open lower endpoint of a column range.
    MinNotNull,
    /// Largest possible value; open upper endpoint of a column range.
    MaxValue,
    Int(i64),
    UInt(u64),
    Float(OrderedFloat<f64>),
    Str(String),
}

impl Datum {
    /// Total order over datums: `Null < MinNotNull < concrete < MaxValue`.
    /// Numeric kinds compare numerically across each other; remaining
    /// mixed-kind pairs fall back to a stable kind order.
    pub fn cmp_order(&self, other: &Datum) -> Ordering {
        let (lr, rr) = (self.rank(), other.rank());
        if lr != rr {
            return lr.cmp(&rr);
        }
        match (self, other) {
            (Datum::Int(a), Datum::Int(b)) => a.cmp(b),
            (Datum::UInt(a), Datum::UInt(b)) => a.cmp(b),
            (Datum::Float(a), Datum::Float(b)) => a.cmp(b),
            (Datum::Str(a), Datum::Str(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => OrderedFloat(x).cmp(&OrderedFloat(y)),
                _ => a.kind_id().cmp(&b.kind_id()),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Datum::Null => 0,
            Datum::MinNotNull => 1,
            Datum::MaxValue => 3,
            _ => 2,
        }
    }

    fn kind_id(&self) -> u8 {
        match self {
            Datum::Null => 0,
            Datum::MinNotNull => 1,
            Datum::Int(_) => 2,
            Datum::UInt(_) => 3,
            Datum::Float(_) => 4,
            Datum::Str(_) => 5,
            Datum::MaxValue => 6,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Int(v) => Some(*v as f64),
            Datum::UInt(v) => Some(*v as f64),
            Datum::Float(v) => Some(v.0),
            _ => None,
        }
    }
}

/// A materialized row, indexed by `Column::index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<Datum>,
}

impl Row {
    pub fn new(values: Vec<Datum>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&Datum> {
        self.values.get(index)
    }
}

/// Scalar function names understood by the enumeration core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarFuncName {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    Plus,
    Minus,
}

impl ScalarFuncName {
    /// The mirrored comparison used to normalize `expr op col` into
    /// `col op' expr`. Only the four inequality comparisons have a mirror.
    pub fn symmetric(self) -> Option<ScalarFuncName> {
        match self {
            ScalarFuncName::Lt => Some(ScalarFuncName::Gt),
            ScalarFuncName::Gt => Some(ScalarFuncName::Lt),
            ScalarFuncName::Le => Some(ScalarFuncName::Ge),
            ScalarFuncName::Ge => Some(ScalarFuncName::Le),
            _ => None,
        }
    }

    pub fn is_compare(self) -> bool {
        matches!(
            self,
            ScalarFuncName::Lt | ScalarFuncName::Le | ScalarFuncName::Gt | ScalarFuncName::Ge
        )
    }
}

/// Scalar expressions used in predicates, join conditions, and sort keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    Column(Column),
    Constant { value: Datum, ret_type: FieldType },
    ScalarFunction {
        func: ScalarFuncName,
        args: Vec<Expr>,
        ret_type: FieldType,
    },
}

impl Expr {
    pub fn new_function(func: ScalarFuncName, ret_type: FieldType, args: Vec<Expr>) -> Expr {
        Expr::ScalarFunction { func, args, ret_type }
    }

    pub fn constant(value: Datum, ret_type: FieldType) -> Expr {
        Expr::Constant { value, ret_type }
    }

    pub fn as_column(&self) -> Option<&Column> {
        match self {
            Expr::Column(c) => Some(c),
            _ => None,
        }
    }

    /// Evaluate against a row. Columns read `row[col.index]`; arithmetic
    /// covers integer and float plus/minus. Comparisons and `IN` are never
    /// evaluated here -- they are handed to the range builder instead.
    pub fn eval(&self, row: &Row) -> Result<Datum, PlanError> {
        match self {
            Expr::Column(c) => row
                .get(c.index)
                .cloned()
                .ok_or_else(|| PlanError::Eval(format!("column {} not present in row", c.name))),
            Expr::Constant { value, .. } => Ok(value.clone()),
            Expr::ScalarFunction { func, args, .. } => match func {
                ScalarFuncName::Plus | ScalarFuncName::Minus => {
                    if args.len() != 2 {
                        return Err(PlanError::Eval("arithmetic needs two arguments".into()));
                    }
                    let lhs = args[0].eval(row)?;
                    let rhs = args[1].eval(row)?;
                    eval_arith(*func, &lhs, &rhs)
                }
                other => Err(PlanError::UnsupportedExpr(format!("{other:?}"))),
            },
        }
    }
}

fn eval_arith(func: ScalarFuncName, lhs: &Datum, rhs: &Datum) -> Result<Datum, PlanError> {
    match (lhs, rhs) {
        (Datum::Null, _) | (_, Datum::Null) => Ok(Datum::Null),
        (Datum::Int(a), Datum::Int(b)) => {
            let v = match func {
                ScalarFuncName::Plus => a.checked_add(*b),
                _ => a.checked_sub(*b),
            };
            v.map(Datum::Int)
                .ok_or_else(|| PlanError::Eval("integer overflow".into()))
        }
        (a, b) => {
            let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
                return Err(PlanError::Eval(format!("cannot combine {a:?} and {b:?}")));
            };
            let v = match func {
                ScalarFuncName::Plus => x + y,
                _ => x - y,
            };
            Ok(Datum::Float(OrderedFloat(v)))
        }
    }
}

/// All distinct columns referenced by an expression, in first-seen order.
pub fn extract_columns(expr: &Expr) -> Vec<Column> {
    let mut cols = Vec::new();
    collect_columns(expr, &mut cols);
    cols
}

fn collect_columns(expr: &Expr, out: &mut Vec<Column>) {
    match expr {
        Expr::Column(c) => {
            if !out.iter().any(|o| o.equal(c)) {
                out.push(c.clone());
            }
        }
        Expr::Constant { .. } => {}
        Expr::ScalarFunction { args, .. } => {
            for arg in args {
                collect_columns(arg, out);
            }
        }
    }
}

/// Whether the two column slices share any column, by identity.
pub fn column_slice_is_intersect(lhs: &[Column], rhs: &[Column]) -> bool {
    lhs.iter().any(|l| rhs.iter().any(|r| l.equal(r)))
}

/// One `ORDER BY` / `GROUP BY` item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ByItem {
    pub expr: Expr,
    pub desc: bool,
}
