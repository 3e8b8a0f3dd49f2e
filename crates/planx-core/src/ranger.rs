//! # Scan Ranges
//!
//! Range construction services for index-join analysis. A `Range` is a pair
//! of datum vectors -- one slot per index column -- with per-end exclusion
//! flags. Ranges produced here are *templates*: leading slots may be left as
//! placeholders to be filled per driving outer row at execution time.
//!
//! The builders work on single-column conditions only. Multi-column
//! composition (interleaving join-key slots with equality/in constants) is
//! the analyzer's job.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::{PlanError, Result};
use crate::expr::{extract_columns, Column, Datum, Expr, FieldType, Row, ScalarFuncName};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub low_val: Vec<Datum>,
    pub high_val: Vec<Datum>,
    pub low_exclude: bool,
    pub high_exclude: bool,
}

impl Range {
    /// A single-column point range `[v, v]`.
    pub fn point(v: Datum) -> Range {
        Range {
            low_val: vec![v.clone()],
            high_val: vec![v],
            low_exclude: false,
            high_exclude: false,
        }
    }
}

/// The full range of an integer handle column.
pub fn full_int_range(unsigned: bool) -> Vec<Range> {
    let (low, high) = if unsigned {
        (Datum::UInt(0), Datum::UInt(u64::MAX))
    } else {
        (Datum::Int(i64::MIN), Datum::Int(i64::MAX))
    };
    vec![Range {
        low_val: vec![low],
        high_val: vec![high],
        low_exclude: false,
        high_exclude: false,
    }]
}

/// The full range of any column, null included.
pub fn full_range() -> Vec<Range> {
    vec![Range {
        low_val: vec![Datum::Null],
        high_val: vec![Datum::MaxValue],
        low_exclude: false,
        high_exclude: false,
    }]
}

/// A normalized single-column condition: the comparison already rewritten to
/// put the column on the left, with its constant operand(s) evaluated.
enum ColumnCond {
    Point(Vec<Datum>),
    Bound(ScalarFuncName, Datum),
}

fn decompose(cond: &Expr) -> Result<ColumnCond> {
    let Expr::ScalarFunction { func, args, .. } = cond else {
        return Err(PlanError::UnsupportedExpr("not a scalar function".into()));
    };
    let empty = Row::default();
    match func {
        ScalarFuncName::Eq => {
            if args.len() != 2 {
                return Err(PlanError::UnsupportedExpr("malformed equality".into()));
            }
            let value_expr = if args[0].as_column().is_some() { &args[1] } else { &args[0] };
            Ok(ColumnCond::Point(vec![value_expr.eval(&empty)?]))
        }
        ScalarFuncName::In => {
            let values = args[1..]
                .iter()
                .map(|arg| arg.eval(&empty))
                .collect::<Result<Vec<_>>>()?;
            Ok(ColumnCond::Point(values))
        }
        ScalarFuncName::Lt | ScalarFuncName::Le | ScalarFuncName::Gt | ScalarFuncName::Ge => {
            if args.len() != 2 {
                return Err(PlanError::UnsupportedExpr("malformed comparison".into()));
            }
            if args[0].as_column().is_some() {
                Ok(ColumnCond::Bound(*func, args[1].eval(&empty)?))
            } else {
                let mirrored = func.symmetric().unwrap_or(*func);
                Ok(ColumnCond::Bound(mirrored, args[0].eval(&empty)?))
            }
        }
        other => Err(PlanError::UnsupportedExpr(format!("{other:?}"))),
    }
}

/// Build the ranges of one column from conditions on it.
///
/// Equality and `IN` conditions intersect into a point set; inequality
/// conditions tighten the bounds. The result is a sorted sequence of
/// non-overlapping ranges, possibly empty when the conditions contradict.
pub fn build_column_range(conds: &[Expr], _col_type: &FieldType) -> Result<Vec<Range>> {
    let mut low = (Datum::MinNotNull, false);
    let mut high = (Datum::MaxValue, false);
    let mut points: Option<Vec<Datum>> = None;

    for cond in conds {
        match decompose(cond)? {
            ColumnCond::Point(values) => {
                points = Some(match points {
                    None => values,
                    Some(prev) => prev
                        .into_iter()
                        .filter(|v| values.iter().any(|w| w == v))
                        .collect(),
                });
            }
            ColumnCond::Bound(op, value) => match op {
                ScalarFuncName::Lt => tighten_high(&mut high, value, true),
                ScalarFuncName::Le => tighten_high(&mut high, value, false),
                ScalarFuncName::Gt => tighten_low(&mut low, value, true),
                ScalarFuncName::Ge => tighten_low(&mut low, value, false),
                _ => unreachable!("decompose only yields comparison bounds"),
            },
        }
    }

    if let Some(mut values) = points {
        values.sort_by(|a, b| a.cmp_order(b));
        values.dedup();
        return Ok(values
            .into_iter()
            .filter(|v| within(v, &low, &high))
            .map(Range::point)
            .collect());
    }

    match low.0.cmp_order(&high.0) {
        Ordering::Greater => Ok(vec![]),
        Ordering::Equal if low.1 || high.1 => Ok(vec![]),
        _ => Ok(vec![Range {
            low_val: vec![low.0],
            high_val: vec![high.0],
            low_exclude: low.1,
            high_exclude: high.1,
        }]),
    }
}

fn tighten_high(high: &mut (Datum, bool), value: Datum, exclude: bool) {
    match value.cmp_order(&high.0) {
        Ordering::Less => *high = (value, exclude),
        Ordering::Equal => high.1 = high.1 || exclude,
        Ordering::Greater => {}
    }
}

fn tighten_low(low: &mut (Datum, bool), value: Datum, exclude: bool) {
    match value.cmp_order(&low.0) {
        Ordering::Greater => *low = (value, exclude),
        Ordering::Equal => low.1 = low.1 || exclude,
        Ordering::Less => {}
    }
}

fn within(v: &Datum, low: &(Datum, bool), high: &(Datum, bool)) -> bool {
    let above = match v.cmp_order(&low.0) {
        Ordering::Greater => true,
        Ordering::Equal => !low.1,
        Ordering::Less => false,
    };
    let below = match v.cmp_order(&high.0) {
        Ordering::Less => true,
        Ordering::Equal => !high.1,
        Ordering::Greater => false,
    };
    above && below
}

/// Whether `cond` can drive a static range on `col`: a comparison between
/// `col` and a column-free expression, or `col IN (constants)`.
fn is_access_cond(cond: &Expr, col: &Column) -> bool {
    let Expr::ScalarFunction { func, args, .. } = cond else {
        return false;
    };
    match func {
        ScalarFuncName::Eq
        | ScalarFuncName::Lt
        | ScalarFuncName::Le
        | ScalarFuncName::Gt
        | ScalarFuncName::Ge => {
            if args.len() != 2 {
                return false;
            }
            let col_left = args[0].as_column().is_some_and(|c| c.equal(col));
            let col_right = args[1].as_column().is_some_and(|c| c.equal(col));
            (col_left && extract_columns(&args[1]).is_empty())
                || (col_right && extract_columns(&args[0]).is_empty())
        }
        ScalarFuncName::In => {
            args.first().and_then(Expr::as_column).is_some_and(|c| c.equal(col))
                && args[1..].iter().all(|a| extract_columns(a).is_empty())
        }
        _ => false,
    }
}

/// Split conditions into those usable as a static range on `col` and the rest.
pub fn detach_conds_for_table_range(conds: &[Expr], col: &Column) -> (Vec<Expr>, Vec<Expr>) {
    let mut accesses = Vec::new();
    let mut remained = Vec::new();
    for cond in conds {
        if is_access_cond(cond, col) {
            accesses.push(cond.clone());
        } else {
            remained.push(cond.clone());
        }
    }
    (accesses, remained)
}

/// Claim one equality/`IN` condition per column, in column order, stopping at
/// the first column that has none.
///
/// Returns `(accesses, filters, new_conds)`: the claimed conditions aligned
/// to the column prefix, the subset of them that must additionally stay as
/// post-scan filters (prefix-length index columns cannot fully cover their
/// predicate), and the conditions left unclaimed.
pub fn extract_eq_and_in_condition(
    conds: &[Expr],
    cols: &[Column],
    lengths: &[Option<usize>],
) -> (Vec<Expr>, Vec<Expr>, Vec<Expr>) {
    let mut used = vec![false; conds.len()];
    let mut accesses = Vec::new();
    let mut filters = Vec::new();
    for (i, col) in cols.iter().enumerate() {
        let found = conds.iter().enumerate().find(|(j, cond)| {
            !used[*j] && is_eq_or_in(cond) && is_access_cond(cond, col)
        });
        let Some((j, cond)) = found else {
            break;
        };
        used[j] = true;
        accesses.push(cond.clone());
        if lengths.get(i).copied().flatten().is_some() {
            filters.push(cond.clone());
        }
    }
    let new_conds = conds
        .iter()
        .zip(used.iter())
        .filter(|(_, &u)| !u)
        .map(|(c, _)| c.clone())
        .collect();
    (accesses, filters, new_conds)
}

fn is_eq_or_in(cond: &Expr) -> bool {
    matches!(
        cond,
        Expr::ScalarFunction {
            func: ScalarFuncName::Eq | ScalarFuncName::In,
            ..
        }
    )
}
