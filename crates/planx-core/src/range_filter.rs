//! # Deferred Range Filters
//!
//! An index join may find comparisons on the first index column past the
//! equi-joined prefix whose bound depends on the driving outer row, e.g.
//! `inner.c < outer.d + 1`. Such a comparison cannot become a static range;
//! instead the join keeps a `ColumnWithComparisons` bundle and rebuilds the
//! inner scan range once per outer row.
//!
//! The bundle also knows which outer columns feed any of its bounds
//! (`affected_col_schema`), so the executor can compare consecutive outer
//! rows and skip the rebuild when the bounds cannot have changed.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::Result;
use crate::expr::{Column, Datum, Expr, Row, ScalarFuncName};
use crate::ranger::{self, Range};
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnWithComparisons {
    /// The index column being constrained.
    pub target_col: Column,
    pub op_types: Vec<ScalarFuncName>,
    /// One bound expression per comparison; evaluated against the outer row.
    pub op_args: Vec<Expr>,
    /// Union of all outer columns read by any bound expression.
    pub affected_col_schema: Schema,
}

impl ColumnWithComparisons {
    pub fn new(target_col: Column) -> Self {
        Self {
            target_col,
            op_types: Vec::new(),
            op_args: Vec::new(),
            affected_col_schema: Schema::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.op_types.is_empty()
    }

    /// Record one comparison `target_col op arg`.
    pub fn append_comparison(&mut self, op: ScalarFuncName, arg: Expr, affected_cols: &[Column]) {
        self.op_types.push(op);
        self.op_args.push(arg);
        for col in affected_cols {
            if self.affected_col_schema.contains(col) {
                continue;
            }
            self.affected_col_schema.append(col.clone());
        }
    }

    /// Lexicographic comparison of two outer rows over the affected columns.
    /// Equal rows produce identical bounds, so the range rebuild can be
    /// skipped.
    pub fn compare_row(&self, lhs: &Row, rhs: &Row) -> Ordering {
        for col in &self.affected_col_schema.columns {
            let l = lhs.get(col.index).unwrap_or(&Datum::Null);
            let r = rhs.get(col.index).unwrap_or(&Datum::Null);
            let ord = l.cmp_order(r);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Materialize the ranges of `target_col` for one outer row: evaluate
    /// each bound expression, substitute it as a typed constant, and hand
    /// the synthesized comparisons to the range builder.
    pub fn build_ranges_by_row(&self, row: &Row) -> Result<Vec<Range>> {
        let mut exprs = Vec::with_capacity(self.op_types.len());
        for (op, arg) in self.op_types.iter().zip(self.op_args.iter()) {
            let value = arg.eval(row)?;
            exprs.push(Expr::new_function(
                *op,
                self.target_col.ret_type,
                vec![
                    Expr::Column(self.target_col.clone()),
                    Expr::constant(value, self.target_col.ret_type),
                ],
            ));
        }
        ranger::build_column_range(&exprs, &self.target_col.ret_type)
    }

    /// Rewrite the bound expressions' column offsets against the concrete
    /// outer schema, once the join's row layout is known.
    pub fn resolve_indices(&mut self, schema: &Schema) {
        for arg in &mut self.op_args {
            resolve_expr_indices(arg, schema);
        }
        for col in &mut self.affected_col_schema.columns {
            if let Some(off) = schema.column_index(col) {
                col.index = off;
            }
        }
    }
}

fn resolve_expr_indices(expr: &mut Expr, schema: &Schema) {
    match expr {
        Expr::Column(col) => {
            if let Some(off) = schema.column_index(col) {
                col.index = off;
            }
        }
        Expr::Constant { .. } => {}
        Expr::ScalarFunction { args, .. } => {
            for arg in args {
                resolve_expr_indices(arg, schema);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::FieldType;

    fn col(id: i64, index: usize, name: &str) -> Column {
        Column {
            unique_id: id,
            index,
            name: name.into(),
            ret_type: FieldType::Int { unsigned: false },
        }
    }

    #[test]
    fn test_append_comparison_dedupes_affected_cols() {
        let target = col(1, 0, "c");
        let outer = col(10, 0, "o");
        let mut cwc = ColumnWithComparisons::new(target);
        cwc.append_comparison(
            ScalarFuncName::Lt,
            Expr::Column(outer.clone()),
            &[outer.clone()],
        );
        cwc.append_comparison(ScalarFuncName::Ge, Expr::Column(outer.clone()), &[outer]);
        assert_eq!(cwc.op_types.len(), 2);
        assert_eq!(cwc.affected_col_schema.len(), 1);
    }

    #[test]
    fn test_compare_row_orders_by_affected_schema() {
        let target = col(1, 0, "c");
        let outer = col(10, 1, "o");
        let mut cwc = ColumnWithComparisons::new(target);
        cwc.append_comparison(ScalarFuncName::Lt, Expr::Column(outer.clone()), &[outer]);

        // Differ in slot 0, which no bound reads: still equal.
        let a = Row::new(vec![Datum::Int(1), Datum::Int(5)]);
        let b = Row::new(vec![Datum::Int(2), Datum::Int(5)]);
        assert_eq!(cwc.compare_row(&a, &b), Ordering::Equal);

        let c = Row::new(vec![Datum::Int(1), Datum::Int(7)]);
        assert_eq!(cwc.compare_row(&a, &c), Ordering::Less);
    }

    #[test]
    fn test_build_ranges_by_row() {
        let target = col(1, 0, "c");
        let outer = col(10, 1, "o");
        let mut cwc = ColumnWithComparisons::new(target);
        // c < o  and  c >= o - 3
        cwc.append_comparison(ScalarFuncName::Lt, Expr::Column(outer.clone()), &[outer.clone()]);
        cwc.append_comparison(
            ScalarFuncName::Ge,
            Expr::new_function(
                ScalarFuncName::Minus,
                FieldType::Int { unsigned: false },
                vec![
                    Expr::Column(outer.clone()),
                    Expr::constant(Datum::Int(3), FieldType::Int { unsigned: false }),
                ],
            ),
            &[outer],
        );

        let row = Row::new(vec![Datum::Null, Datum::Int(10)]);
        let ranges = cwc.build_ranges_by_row(&row).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].low_val, vec![Datum::Int(7)]);
        assert_eq!(ranges[0].high_val, vec![Datum::Int(10)]);
        assert!(!ranges[0].low_exclude);
        assert!(ranges[0].high_exclude);
    }
}
