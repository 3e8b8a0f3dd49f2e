//! # Index-Join Analysis
//!
//! Decides whether the inner side of a join can be driven by index lookups
//! and, if so, builds the complete inner plan and the range template the
//! executor fills per outer row.
//!
//! ## Primary-Key Fast Path
//!
//! When the inner table's integer primary key is the row handle and some
//! join key equals it, a PK lookup touches exactly one row per outer value.
//! That is never worse than any secondary index, so analysis stops there.
//!
//! ## Secondary-Index Analysis
//!
//! For each candidate index, `analyze_lookup_filters` computes how many
//! leading index columns can be pinned: join keys fill their matching
//! positions, pushed-down equality/`IN` predicates fill the holes between
//! them, and the first unpinned column may still take a static range or a
//! set of outer-driven comparison bounds. Indexes are compared by how many
//! leading columns their template pins; the first-seen index wins ties.
//!
//! Analysis failures (expression evaluation, range construction) are logged
//! at warning level and the index is skipped -- a join always has the hash
//! fallback, so a broken index is never fatal.

use tracing::warn;

use planx_core::catalog::{index_info_to_cols, IndexColumn, IndexInfo, TableInfo};
use planx_core::error::{PlanError, Result};
use planx_core::expr::{column_slice_is_intersect, extract_columns, Column, Datum, Expr, Row};
use planx_core::logical::{AccessPath, DataSource, LogicalJoin, LogicalOp, LogicalOperator};
use planx_core::physical::{PhysicalOp, PhysicalPlan};
use planx_core::property::{PhysicalProperty, TaskType};
use planx_core::range_filter::ColumnWithComparisons;
use planx_core::ranger::{self, Range};
use planx_core::schema::Schema;
use planx_core::session::SessionCtx;
use planx_core::stats::StatsInfo;

use crate::task::{attach_selection, finish_cop_task, CopTask};

/// Outcome of analyzing one index for lookup use.
struct LookUpAnalysis {
    ranges: Vec<Range>,
    /// For each index column, the join key pinning it, if any.
    idx_off_to_key_off: Vec<Option<usize>>,
    /// Predicates that must stay as post-scan filters.
    remained: Vec<Expr>,
    compare_filters: Option<ColumnWithComparisons>,
}

/// Index-join candidates with the given child as the driving outer side.
pub fn get_index_join_by_outer_idx(
    _ctx: &SessionCtx,
    p: &LogicalOperator,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
    outer_idx: usize,
) -> Vec<PhysicalPlan> {
    let inner_child = &p.children[1 - outer_idx];
    let (outer_join_keys, inner_join_keys) = if outer_idx == 0 {
        (&join.left_join_keys, &join.right_join_keys)
    } else {
        (&join.right_join_keys, &join.left_join_keys)
    };

    // The inner side must be a data source, possibly under a union scan.
    let (ds_node, us_conds) = match &inner_child.op {
        LogicalOp::DataSource(_) => (inner_child, None),
        LogicalOp::UnionScan { conditions } => match inner_child.children.first() {
            Some(child) if child.as_data_source().is_some() => (child, Some(conditions.as_slice())),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    let Some(ds) = ds_node.as_data_source() else {
        return Vec::new();
    };

    if let Some(pk_col) = ds.pk_is_handle_col(&ds_node.schema) {
        if ds.has_table_path() {
            let mut key_off_to_idx_off: Vec<Option<usize>> = vec![None; inner_join_keys.len()];
            let mut pk_matched = false;
            for (i, key) in inner_join_keys.iter().enumerate() {
                if key.equal(&pk_col) {
                    pk_matched = true;
                    key_off_to_idx_off[i] = Some(0);
                }
            }
            if pk_matched {
                // One row per PK value: never worse than a secondary index.
                let inner_plan =
                    construct_inner_table_scan(ds, ds_node, &pk_col, outer_join_keys, us_conds);
                return construct_index_join(
                    p,
                    join,
                    prop,
                    inner_join_keys,
                    outer_join_keys,
                    outer_idx,
                    inner_plan,
                    Vec::new(),
                    &key_off_to_idx_off,
                    None,
                );
            }
        }
    }

    let mut best: Option<(IndexInfo, usize, LookUpAnalysis)> = None;
    for path in &ds.possible_access_paths {
        let AccessPath::Index(index_info) = path else {
            continue;
        };
        match analyze_lookup_filters(index_info, ds, &ds_node.schema, inner_join_keys) {
            Ok(Some(analysis)) => {
                // Compare indexes by how many leading columns the template
                // pins. There are cases like `t1.a = t2.a and b > 2 and
                // b < 1` where the conditions are valid yet the range set is
                // empty; an empty range set cannot drive lookups.
                let used_cols = analysis.ranges.first().map(|r| r.low_val.len()).unwrap_or(0);
                let best_used = best.as_ref().map(|(_, used, _)| *used).unwrap_or(0);
                if !analysis.ranges.is_empty() && used_cols > best_used {
                    best = Some((index_info.clone(), used_cols, analysis));
                }
            }
            Ok(None) => {}
            Err(err) => {
                warn!(index = %index_info.name, error = %err, "index unusable for index join");
            }
        }
    }

    if let Some((index_info, _, analysis)) = best {
        let mut key_off_to_idx_off: Vec<Option<usize>> = vec![None; inner_join_keys.len()];
        for (idx_off, key_off) in analysis.idx_off_to_key_off.iter().enumerate() {
            if let Some(key_off) = key_off {
                key_off_to_idx_off[*key_off] = Some(idx_off);
            }
        }
        let inner_plan = construct_inner_index_scan(
            ds,
            ds_node,
            &index_info,
            &analysis.remained,
            outer_join_keys,
            us_conds,
        );
        return construct_index_join(
            p,
            join,
            prop,
            inner_join_keys,
            outer_join_keys,
            outer_idx,
            inner_plan,
            analysis.ranges,
            &key_off_to_idx_off,
            analysis.compare_filters,
        );
    }
    Vec::new()
}

/// Wrap a built inner plan into an index-join candidate. Join keys without a
/// pinned index column revert to general predicates.
#[allow(clippy::too_many_arguments)]
fn construct_index_join(
    p: &LogicalOperator,
    join: &LogicalJoin,
    prop: &PhysicalProperty,
    inner_join_keys: &[Column],
    outer_join_keys: &[Column],
    outer_idx: usize,
    inner_plan: PhysicalPlan,
    ranges: Vec<Range>,
    key_off_to_idx_off: &[Option<usize>],
    mut compare_filters: Option<ColumnWithComparisons>,
) -> Vec<PhysicalPlan> {
    let outer_schema = &p.children[outer_idx].schema;
    // Index join promises order only on outer columns.
    if !prop.all_cols_from_schema(outer_schema) {
        return Vec::new();
    }
    // Deferred bounds read the driving outer row; pin their column offsets
    // to the outer child's layout now that it is fixed.
    if let Some(cwc) = compare_filters.as_mut() {
        cwc.resolve_indices(outer_schema);
    }
    let mut ch_req_props = vec![PhysicalProperty::default(), PhysicalProperty::default()];
    ch_req_props[outer_idx] = PhysicalProperty {
        task_tp: TaskType::Root,
        cols: prop.cols.clone(),
        desc: prop.desc,
        expected_cnt: prop.expected_cnt,
        enforced: false,
    };

    let mut new_inner_keys = Vec::with_capacity(inner_join_keys.len());
    let mut new_outer_keys = Vec::with_capacity(outer_join_keys.len());
    let mut new_key_off = Vec::with_capacity(key_off_to_idx_off.len());
    let mut new_other_conds = join.other_conditions.clone();
    for (key_off, idx_off) in key_off_to_idx_off.iter().enumerate() {
        match idx_off {
            Some(idx_off) => {
                new_inner_keys.push(inner_join_keys[key_off].clone());
                new_outer_keys.push(outer_join_keys[key_off].clone());
                new_key_off.push(*idx_off);
            }
            None => new_other_conds.push(join.equal_conditions[key_off].clone()),
        }
    }

    let index_join = PhysicalPlan::new(
        PhysicalOp::IndexJoin {
            join_type: join.join_type,
            outer_idx,
            outer_join_keys: new_outer_keys,
            inner_join_keys: new_inner_keys,
            left_conditions: join.left_conditions.clone(),
            right_conditions: join.right_conditions.clone(),
            other_conditions: new_other_conds,
            default_values: join.default_values.clone(),
            inner_plan: Box::new(inner_plan),
            key_off_to_idx_off: new_key_off,
            ranges,
            compare_filters,
        },
        p.schema.clone(),
        p.stats.scale_by_expect_cnt(prop.expected_cnt),
        ch_req_props,
    );
    vec![index_join]
}

/// Inner plan for a PK-handle lookup: a full-int-range table scan whose
/// concrete range is decided per outer row at execution.
fn construct_inner_table_scan(
    ds: &DataSource,
    ds_node: &LogicalOperator,
    pk: &Column,
    outer_join_keys: &[Column],
    us_conds: Option<&[Expr]>,
) -> PhysicalPlan {
    let ranges = ranger::full_int_range(pk.ret_type.is_unsigned());
    let row_count = match ds.statistic_table.columns.get(&pk.unique_id) {
        Some(hist) if !ds.statistic_table.pseudo => {
            hist.avg_count_per_value(ds.statistic_table.count)
        }
        _ => ds.statistic_table.pseudo_avg_count_per_value(),
    };
    let stats = StatsInfo {
        row_count,
        use_pseudo: ds.statistic_table.pseudo,
    };
    let ts = PhysicalPlan::new(
        PhysicalOp::TableScan {
            table: ds.table_info.clone(),
            ranges,
            filter_conditions: ds.pushed_down_conds.clone(),
            range_decided_by: outer_join_keys.to_vec(),
        },
        ds_node.schema.clone(),
        stats,
        Vec::new(),
    );
    let table_plan = attach_selection(ts, &ds.pushed_down_conds, ds_node.stats.clone());
    let task = CopTask {
        index_plan: None,
        table_plan: Some(table_plan),
        index_plan_finished: true,
    };
    let reader = finish_cop_task(task);
    construct_inner_union_scan(us_conds, reader)
}

/// Inner plan for a secondary-index lookup. Residual filters split between
/// the index side and the table side; a table lookup is added when the index
/// does not cover the schema.
fn construct_inner_index_scan(
    ds: &DataSource,
    ds_node: &LogicalOperator,
    index: &IndexInfo,
    remained_conds: &[Expr],
    outer_join_keys: &[Column],
    us_conds: Option<&[Expr]>,
) -> PhysicalPlan {
    let row_count = match ds.statistic_table.indices.get(&index.id) {
        Some(hist) if !ds.statistic_table.pseudo => {
            hist.avg_count_per_value(ds.statistic_table.count)
        }
        _ => ds.statistic_table.pseudo_avg_count_per_value(),
    };
    let stats = StatsInfo {
        row_count,
        use_pseudo: ds.statistic_table.pseudo,
    };

    // The index scan exposes the schema columns the index key carries.
    let index_schema = Schema::new(
        index
            .columns
            .iter()
            .filter_map(|ic| ds_node.schema.columns.iter().find(|c| c.name == ic.name))
            .cloned()
            .collect(),
    );
    let is = PhysicalPlan::new(
        PhysicalOp::IndexScan {
            table: ds.table_info.clone(),
            index: index.clone(),
            ranges: ranger::full_range(),
            filter_conditions: remained_conds.to_vec(),
            range_decided_by: outer_join_keys.to_vec(),
            keep_order: false,
        },
        index_schema,
        stats.clone(),
        Vec::new(),
    );

    let covering = is_covering_index(
        &ds_node.schema.columns,
        &index.columns,
        ds.table_info.pk_is_handle,
        &ds.table_info,
    );
    let (index_conds, table_conds) =
        split_index_filter_conditions(remained_conds, &index.columns, &ds.table_info);

    let mut task = CopTask {
        index_plan: Some(attach_selection(is, &index_conds, stats.clone())),
        table_plan: None,
        index_plan_finished: false,
    };
    if !covering {
        // Double read: look the remaining columns up in the table.
        let ts = PhysicalPlan::new(
            PhysicalOp::TableScan {
                table: ds.table_info.clone(),
                ranges: Vec::new(),
                filter_conditions: Vec::new(),
                range_decided_by: Vec::new(),
            },
            ds_node.schema.clone(),
            stats,
            Vec::new(),
        );
        task.table_plan = Some(attach_selection(ts, &table_conds, ds_node.stats.clone()));
    }
    let reader = finish_cop_task(task);
    construct_inner_union_scan(us_conds, reader)
}

/// Re-wrap the reader in a union scan when the logical inner side had one.
fn construct_inner_union_scan(us_conds: Option<&[Expr]>, reader: PhysicalPlan) -> PhysicalPlan {
    let Some(conds) = us_conds else {
        return reader;
    };
    // The reader's stats are more accurate than the logical union scan's.
    let mut us = PhysicalPlan::new(
        PhysicalOp::UnionScan {
            conditions: conds.to_vec(),
        },
        reader.schema.clone(),
        reader.stats.clone(),
        Vec::new(),
    );
    us.children.push(reader);
    us
}

/// Whether the index key carries every schema column, so no table lookup is
/// needed. The integer PK handle is always available from the key.
fn is_covering_index(
    schema_cols: &[Column],
    index_cols: &[IndexColumn],
    pk_is_handle: bool,
    table: &TableInfo,
) -> bool {
    for col in schema_cols {
        if pk_is_handle && table.columns.iter().any(|ci| ci.pk && ci.name == col.name) {
            continue;
        }
        let covered = index_cols
            .iter()
            .any(|ic| ic.name == col.name && ic.length.is_none());
        if !covered {
            return false;
        }
    }
    true
}

/// Split residual filters by where they can run: a condition whose columns
/// are all full-length index columns (or the PK handle) evaluates on the
/// index side, the rest after the table lookup.
fn split_index_filter_conditions(
    conds: &[Expr],
    index_cols: &[IndexColumn],
    table: &TableInfo,
) -> (Vec<Expr>, Vec<Expr>) {
    let mut index_conds = Vec::new();
    let mut table_conds = Vec::new();
    for cond in conds {
        let on_index = extract_columns(cond).iter().all(|col| {
            index_cols
                .iter()
                .any(|ic| ic.name == col.name && ic.length.is_none())
                || (table.pk_is_handle
                    && table.columns.iter().any(|ci| ci.pk && ci.name == col.name))
        });
        if on_index {
            index_conds.push(cond.clone());
        } else {
            table_conds.push(cond.clone());
        }
    }
    (index_conds, table_conds)
}

/// Decide whether `index` can drive lookups for the join and derive the
/// range template, the key/index alignment, and the residual filters.
fn analyze_lookup_filters(
    index: &IndexInfo,
    ds: &DataSource,
    ds_schema: &Schema,
    inner_join_keys: &[Column],
) -> Result<Option<LookUpAnalysis>> {
    let (idx_cols, col_lengths) = index_info_to_cols(ds_schema, index);
    if idx_cols.is_empty() {
        return Ok(None);
    }
    let key_schema = Schema::new(inner_join_keys.to_vec());
    let mut idx_off_to_key_off = Vec::with_capacity(idx_cols.len());
    let mut possible_used_keys = Vec::with_capacity(idx_cols.len());
    let mut not_key_idx_cols = Vec::with_capacity(idx_cols.len());
    let mut not_key_idx_cols_len = Vec::with_capacity(idx_cols.len());
    let mut matched_key_cnt = 0;
    for (i, idx_col) in idx_cols.iter().enumerate() {
        let key_off = key_schema.column_index(idx_col);
        idx_off_to_key_off.push(key_off);
        if key_off.is_some() {
            matched_key_cnt += 1;
            possible_used_keys.push(idx_col.clone());
            continue;
        }
        not_key_idx_cols.push(idx_col.clone());
        not_key_idx_cols_len.push(col_lengths[i]);
    }
    if matched_key_cnt == 0 {
        return Ok(None);
    }
    // Index position of the rightmost matched join key. Every non-key hole
    // at or before it must be pinned by an eq/in predicate, or the key
    // there can never reach the range.
    let mut last_matched_pos = 0;
    for (pos, key_off) in idx_off_to_key_off.iter().enumerate() {
        if key_off.is_some() {
            last_matched_pos = pos;
        }
    }

    // Conditions touching a join-key column stay as post-scan filters; the
    // rest may participate in range construction.
    let mut remained = Vec::with_capacity(ds.pushed_down_conds.len());
    let mut range_filter_candidates = Vec::with_capacity(ds.pushed_down_conds.len());
    for inner_filter in &ds.pushed_down_conds {
        let affected_cols = extract_columns(inner_filter);
        if column_slice_is_intersect(&affected_cols, &possible_used_keys) {
            remained.push(inner_filter.clone());
        } else {
            range_filter_candidates.push(inner_filter.clone());
        }
    }

    let (not_key_eq_and_in, remained_eq_and_in, range_filter_candidates) =
        ranger::extract_eq_and_in_condition(
            &range_filter_candidates,
            &not_key_idx_cols,
            &not_key_idx_cols_len,
        );
    if not_key_eq_and_in.len() + matched_key_cnt < last_matched_pos + 1 {
        return Ok(None);
    }
    remained.extend(remained_eq_and_in);

    let next_col_pos = matched_key_cnt + not_key_eq_and_in.len();
    // All index columns pinned: a pure point template.
    if next_col_pos == idx_cols.len() {
        let ranges =
            build_template_range(&idx_off_to_key_off, matched_key_cnt, &not_key_eq_and_in, None, false)?;
        return Ok(Some(LookUpAnalysis {
            ranges,
            idx_off_to_key_off,
            remained,
            compare_filters: None,
        }));
    }

    let next_col = &idx_cols[next_col_pos];
    let mut next_col_cmp_filters = ColumnWithComparisons::new(next_col.clone());
    'candidates: for filter in &range_filter_candidates {
        let Expr::ScalarFunction { func, args, .. } = filter else {
            continue;
        };
        if !func.is_compare() || args.len() != 2 {
            continue;
        }
        let (op, bound_arg) = if args[0].as_column().is_some_and(|c| c.equal(next_col)) {
            (*func, &args[1])
        } else if args[1].as_column().is_some_and(|c| c.equal(next_col)) {
            let Some(mirrored) = func.symmetric() else {
                continue;
            };
            (mirrored, &args[0])
        } else {
            continue;
        };
        let affected_cols = extract_columns(bound_arg);
        if affected_cols.is_empty() {
            continue;
        }
        // Usable only when the bound is driven entirely by outer columns.
        for col in &affected_cols {
            if ds_schema.contains(col) {
                continue 'candidates;
            }
        }
        next_col_cmp_filters.append_comparison(op, bound_arg.clone(), &affected_cols);
    }

    if next_col_cmp_filters.is_empty() {
        // No outer-driven bound; fall back to a static range on the next
        // column.
        let (col_accesses, col_remained) =
            ranger::detach_conds_for_table_range(&range_filter_candidates, next_col);
        remained.extend(col_remained);
        if col_lengths[next_col_pos].is_some() {
            remained.extend(col_accesses.iter().cloned());
        }
        let next_col_range = ranger::build_column_range(&col_accesses, &next_col.ret_type)?;
        let ranges = build_template_range(
            &idx_off_to_key_off,
            matched_key_cnt,
            &not_key_eq_and_in,
            Some(next_col_range),
            false,
        )?;
        return Ok(Some(LookUpAnalysis {
            ranges,
            idx_off_to_key_off,
            remained,
            compare_filters: None,
        }));
    }

    let ranges =
        build_template_range(&idx_off_to_key_off, matched_key_cnt, &not_key_eq_and_in, None, true)?;
    Ok(Some(LookUpAnalysis {
        ranges,
        idx_off_to_key_off,
        remained,
        compare_filters: Some(next_col_cmp_filters),
    }))
}

/// Build the range template: `point_length` leading slots (join keys as
/// placeholders, eq/in constants filled in), extended by one slot exactly
/// when a next-column range or an outer-driven comparison is present.
/// `IN` lists expand to one range per value.
fn build_template_range(
    idx_off_to_key_off: &[Option<usize>],
    matched_key_cnt: usize,
    eq_and_in_funcs: &[Expr],
    next_col_range: Option<Vec<Range>>,
    have_extra_col: bool,
) -> Result<Vec<Range>> {
    let point_length = matched_key_cnt + eq_and_in_funcs.len();
    let mut ranges: Vec<Range> = match next_col_range {
        Some(col_ranges) => col_ranges
            .into_iter()
            .map(|col_ran| {
                let mut low_val = vec![Datum::Null; point_length];
                let mut high_val = vec![Datum::Null; point_length];
                low_val.push(col_ran.low_val.into_iter().next().unwrap_or(Datum::Null));
                high_val.push(col_ran.high_val.into_iter().next().unwrap_or(Datum::Null));
                Range {
                    low_val,
                    high_val,
                    // The exclude status follows the extra column's range.
                    low_exclude: col_ran.low_exclude,
                    high_exclude: col_ran.high_exclude,
                }
            })
            .collect(),
        None => {
            let width = if have_extra_col { point_length + 1 } else { point_length };
            vec![Range {
                low_val: vec![Datum::Null; width],
                high_val: vec![Datum::Null; width],
                low_exclude: false,
                high_exclude: false,
            }]
        }
    };

    let empty_row = Row::default();
    let mut i = 0;
    let mut j = 0;
    while j < eq_and_in_funcs.len() {
        // This position is occupied by a join key.
        if idx_off_to_key_off.get(i).copied().flatten().is_some() {
            i += 1;
            continue;
        }
        let Expr::ScalarFunction { args, .. } = &eq_and_in_funcs[j] else {
            return Err(PlanError::UnsupportedExpr(
                "eq/in access condition is not a scalar function".into(),
            ));
        };
        if args.len() < 2 {
            return Err(PlanError::UnsupportedExpr("malformed eq/in condition".into()));
        }
        let const_arg = if args[0].as_column().is_some() { &args[1] } else { &args[0] };
        let value = const_arg.eval(&empty_row)?;
        for ran in &mut ranges {
            ran.low_val[i] = value.clone();
            ran.high_val[i] = value.clone();
        }
        // Each extra value in an IN list multiplies the template.
        let cur_range_len = ranges.len();
        for arg_idx in 2..args.len() {
            let value = args[arg_idx].eval(&empty_row)?;
            let mut new_ranges = Vec::with_capacity(cur_range_len);
            for old_idx in 0..cur_range_len {
                let mut new_range = ranges[old_idx].clone();
                new_range.low_val[i] = value.clone();
                new_range.high_val[i] = value.clone();
                new_ranges.push(new_range);
            }
            ranges.extend(new_ranges);
        }
        i += 1;
        j += 1;
    }
    Ok(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use planx_core::expr::{FieldType, ScalarFuncName};

    fn col(id: i64, name: &str) -> Column {
        Column {
            unique_id: id,
            index: id as usize,
            name: name.into(),
            ret_type: FieldType::Int { unsigned: false },
        }
    }

    fn int_ty() -> FieldType {
        FieldType::Int { unsigned: false }
    }

    fn eq_const(c: &Column, v: i64) -> Expr {
        Expr::new_function(
            ScalarFuncName::Eq,
            int_ty(),
            vec![Expr::Column(c.clone()), Expr::constant(Datum::Int(v), int_ty())],
        )
    }

    fn in_list(c: &Column, vs: &[i64]) -> Expr {
        let mut args = vec![Expr::Column(c.clone())];
        args.extend(vs.iter().map(|&v| Expr::constant(Datum::Int(v), int_ty())));
        Expr::new_function(ScalarFuncName::In, int_ty(), args)
    }

    #[test]
    fn test_build_template_range_pure_points() {
        // Index (k, b): k is a join key, b = 7.
        let key_offs = vec![Some(0), None];
        let ranges =
            build_template_range(&key_offs, 1, &[eq_const(&col(2, "b"), 7)], None, false).unwrap();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].low_val.len(), 2);
        assert_eq!(ranges[0].low_val[0], Datum::Null); // key placeholder
        assert_eq!(ranges[0].low_val[1], Datum::Int(7));
        assert_eq!(ranges[0].high_val[1], Datum::Int(7));
    }

    #[test]
    fn test_build_template_range_in_expansion() {
        // Index (b, k): b IN (1, 2, 3) fills the hole before the key.
        let key_offs = vec![None, Some(0)];
        let ranges =
            build_template_range(&key_offs, 1, &[in_list(&col(2, "b"), &[1, 2, 3])], None, false)
                .unwrap();
        assert_eq!(ranges.len(), 3);
        let values: Vec<&Datum> = ranges.iter().map(|r| &r.low_val[0]).collect();
        assert_eq!(values, vec![&Datum::Int(1), &Datum::Int(2), &Datum::Int(3)]);
        for r in &ranges {
            assert_eq!(r.low_val.len(), 2);
            assert_eq!(r.low_val[1], Datum::Null);
        }
    }

    #[test]
    fn test_build_template_range_extra_col_widths() {
        let key_offs = vec![Some(0)];

        // Deferred comparison present: one extra slot, placeholder values.
        let with_cmp = build_template_range(&key_offs, 1, &[], None, true).unwrap();
        assert_eq!(with_cmp[0].low_val.len(), 2);

        // Static next-column range: extra slot takes the range's bounds.
        let next = vec![Range {
            low_val: vec![Datum::Int(1)],
            high_val: vec![Datum::Int(9)],
            low_exclude: false,
            high_exclude: true,
        }];
        let with_range = build_template_range(&key_offs, 1, &[], Some(next), false).unwrap();
        assert_eq!(with_range[0].low_val.len(), 2);
        assert_eq!(with_range[0].high_val[1], Datum::Int(9));
        assert!(with_range[0].high_exclude);

        // Neither: exactly the point slots.
        let bare = build_template_range(&key_offs, 1, &[], None, false).unwrap();
        assert_eq!(bare[0].low_val.len(), 1);
    }

    #[test]
    fn test_split_index_filter_conditions() {
        let table = TableInfo {
            id: 1,
            name: "t".into(),
            columns: vec![],
            pk_is_handle: false,
        };
        let index_cols = vec![
            IndexColumn { name: "a".into(), length: None },
            IndexColumn { name: "p".into(), length: Some(4) },
        ];
        let on_full = eq_const(&col(1, "a"), 1);
        let on_prefix = eq_const(&col(2, "p"), 2);
        let (index_conds, table_conds) =
            split_index_filter_conditions(&[on_full, on_prefix], &index_cols, &table);
        assert_eq!(index_conds.len(), 1);
        assert_eq!(table_conds.len(), 1);
    }
}
