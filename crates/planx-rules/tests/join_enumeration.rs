//! Join enumeration scenarios: sort-merge alignment, hash-join gating,
//! hint forcing, and the inner-join index orientation tie-break.
//!
//! Each test builds a small logical join over two table leaves, runs the
//! enumeration entry point under a required property, and checks the
//! candidate families and their child requirements.

use planx_core::catalog::{ColumnInfo, TableInfo};
use planx_core::expr::{Column, Expr, FieldType, ScalarFuncName};
use planx_core::logical::{
    AccessPath, DataSource, JoinHints, JoinType, LogicalJoin, LogicalOp, LogicalOperator,
};
use planx_core::physical::{PhysicalOp, PhysicalOpKind, PhysicalPlan};
use planx_core::property::{PhysicalProperty, TaskType};
use planx_core::schema::Schema;
use planx_core::session::SessionCtx;
use planx_core::stats::{StatisticTable, StatsInfo};
use planx_rules::exhaust_physical_plans;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn int_ty() -> FieldType {
    FieldType::Int { unsigned: false }
}

fn col(id: i64, name: &str) -> Column {
    Column {
        unique_id: id,
        index: id as usize,
        name: name.into(),
        ret_type: int_ty(),
    }
}

fn eq_cond(l: &Column, r: &Column) -> Expr {
    Expr::new_function(
        ScalarFuncName::Eq,
        int_ty(),
        vec![Expr::Column(l.clone()), Expr::Column(r.clone())],
    )
}

/// A table leaf with no usable access paths beyond the row store.
fn table_leaf(id: i64, name: &str, cols: &[Column], rows: f64) -> LogicalOperator {
    let ds = DataSource {
        table_info: TableInfo {
            id,
            name: name.into(),
            columns: vec![],
            pk_is_handle: false,
        },
        possible_access_paths: vec![AccessPath::Table],
        pushed_down_conds: vec![],
        statistic_table: StatisticTable {
            count: rows,
            pseudo: true,
            ..Default::default()
        },
    };
    LogicalOperator::new(
        LogicalOp::DataSource(ds),
        Schema::new(cols.to_vec()),
        StatsInfo::new(rows),
        vec![],
    )
}

/// A table leaf whose first column is the clustered integer primary key.
fn pk_table_leaf(id: i64, name: &str, pk: &Column, extra: &[Column], rows: f64) -> LogicalOperator {
    let ds = DataSource {
        table_info: TableInfo {
            id,
            name: name.into(),
            columns: vec![ColumnInfo {
                name: pk.name.clone(),
                field_type: pk.ret_type,
                pk: true,
            }],
            pk_is_handle: true,
        },
        possible_access_paths: vec![AccessPath::Table],
        pushed_down_conds: vec![],
        statistic_table: StatisticTable {
            count: rows,
            pseudo: true,
            ..Default::default()
        },
    };
    let mut schema_cols = vec![pk.clone()];
    schema_cols.extend(extra.iter().cloned());
    LogicalOperator::new(
        LogicalOp::DataSource(ds),
        Schema::new(schema_cols),
        StatsInfo::new(rows),
        vec![],
    )
}

fn join_op(
    join_type: JoinType,
    left: LogicalOperator,
    right: LogicalOperator,
    left_keys: Vec<Column>,
    right_keys: Vec<Column>,
) -> LogicalOperator {
    let equal_conditions = left_keys
        .iter()
        .zip(right_keys.iter())
        .map(|(l, r)| eq_cond(l, r))
        .collect();
    let schema = left.schema.merge(&right.schema);
    let stats = StatsInfo::new(left.stats.row_count.max(right.stats.row_count));
    LogicalOperator::new(
        LogicalOp::Join(LogicalJoin {
            join_type,
            equal_conditions,
            left_join_keys: left_keys,
            right_join_keys: right_keys,
            left_conditions: vec![],
            right_conditions: vec![],
            other_conditions: vec![],
            default_values: vec![],
            prefer_join_type: JoinHints::none(),
            left_properties: vec![],
            right_properties: vec![],
        }),
        schema,
        stats,
        vec![left, right],
    )
}

fn with_join<F: FnOnce(&mut LogicalJoin)>(mut op: LogicalOperator, f: F) -> LogicalOperator {
    if let LogicalOp::Join(join) = &mut op.op {
        f(join);
    }
    op
}

fn of_kind(plans: &[PhysicalPlan], kind: PhysicalOpKind) -> Vec<&PhysicalPlan> {
    plans.iter().filter(|p| p.kind() == kind).collect()
}

fn ids(cols: &[Column]) -> Vec<i64> {
    cols.iter().map(|c| c.unique_id).collect()
}

fn empty_prop() -> PhysicalProperty {
    PhysicalProperty::default()
}

fn sort_prop(cols: &[Column], desc: bool) -> PhysicalProperty {
    let mut prop = PhysicalProperty::with_cols(TaskType::Root, f64::INFINITY, cols.to_vec());
    prop.desc = desc;
    prop
}

/// Two-table inner join `A(x, y) JOIN B(x, y)` on both columns, each child
/// able to deliver its keys in order.
fn two_key_join(join_type: JoinType) -> LogicalOperator {
    let (ax, ay) = (col(1, "a.x"), col(2, "a.y"));
    let (bx, by) = (col(11, "b.x"), col(12, "b.y"));
    let left = table_leaf(1, "a", &[ax.clone(), ay.clone()], 100.0);
    let right = table_leaf(2, "b", &[bx.clone(), by.clone()], 100.0);
    let op = join_op(
        join_type,
        left,
        right,
        vec![ax.clone(), ay.clone()],
        vec![bx.clone(), by.clone()],
    );
    with_join(op, |j| {
        j.left_properties = vec![vec![ax, ay]];
        j.right_properties = vec![vec![bx, by]];
    })
}

// ---------------------------------------------------------------------------
// Sort-merge candidates
// ---------------------------------------------------------------------------

#[test]
fn test_merge_join_under_empty_prop() {
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::Inner);
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());

    let merges = of_kind(&plans, PhysicalOpKind::MergeJoin);
    assert_eq!(merges.len(), 1);
    let PhysicalOp::MergeJoin {
        left_keys,
        right_keys,
        other_conditions,
        ..
    } = &merges[0].op
    else {
        panic!("expected merge join");
    };
    assert_eq!(ids(left_keys), vec![1, 2]);
    assert_eq!(ids(right_keys), vec![11, 12]);
    assert!(other_conditions.is_empty());

    // Children are asked to deliver the keys in ascending order.
    assert_eq!(merges[0].children_req_props.len(), 2);
    assert_eq!(ids(&merges[0].children_req_props[0].cols), vec![1, 2]);
    assert_eq!(ids(&merges[0].children_req_props[1].cols), vec![11, 12]);
    assert!(!merges[0].children_req_props[0].desc);

    // Inner join under an empty prop also offers both hash orientations.
    assert_eq!(of_kind(&plans, PhysicalOpKind::HashJoin).len(), 2);

    // children_req_props length always equals the operator arity.
    for plan in &plans {
        assert_eq!(plan.children_req_props.len(), 2);
    }
}

#[test]
fn test_merge_join_under_sort_prop() {
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::Inner);
    let prop = sort_prop(&[col(1, "a.x")], false);
    let plans = exhaust_physical_plans(&ctx, &op, &prop);

    // Hash join is gated out by the non-empty property.
    assert!(of_kind(&plans, PhysicalOpKind::HashJoin).is_empty());
    let merges = of_kind(&plans, PhysicalOpKind::MergeJoin);
    assert_eq!(merges.len(), 1);
    // The required order is a prefix of the left child's requirement.
    assert!(prop.is_prefix(&merges[0].children_req_props[0]));
}

#[test]
fn test_merge_join_rejects_descending_prop() {
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::Inner);
    let prop = sort_prop(&[col(1, "a.x")], true);
    let plans = exhaust_physical_plans(&ctx, &op, &prop);
    assert!(plans.is_empty());
}

#[test]
fn test_merge_join_truncates_to_usable_prefix() {
    // The left child can only deliver order on x: the y equality degrades
    // to a general predicate.
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::Inner);
    let op = with_join(op, |j| {
        j.left_properties = vec![vec![col(1, "a.x")]];
        j.right_properties = vec![vec![col(11, "b.x")]];
    });
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());

    let merges = of_kind(&plans, PhysicalOpKind::MergeJoin);
    assert_eq!(merges.len(), 1);
    let PhysicalOp::MergeJoin {
        left_keys,
        right_keys,
        other_conditions,
        ..
    } = &merges[0].op
    else {
        panic!("expected merge join");
    };
    assert_eq!(ids(left_keys), vec![1]);
    assert_eq!(ids(right_keys), vec![11]);
    assert_eq!(other_conditions.len(), 1);
}

#[test]
fn test_merge_join_outer_side_order_restrictions() {
    // A left-outer join cannot promise order on right-side keys: outer rows
    // without a match pad the right side with nulls.
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::LeftOuter);
    let prop = sort_prop(&[col(11, "b.x")], false);
    let plans = exhaust_physical_plans(&ctx, &op, &prop);
    assert!(of_kind(&plans, PhysicalOpKind::MergeJoin).is_empty());
}

// ---------------------------------------------------------------------------
// Hint forcing
// ---------------------------------------------------------------------------

#[test]
fn test_merge_join_hint_is_exclusive() {
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::Inner);
    let op = with_join(op, |j| {
        j.prefer_join_type = JoinHints::MERGE_JOIN;
    });
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());
    assert!(!plans.is_empty());
    assert!(plans.iter().all(|p| p.kind() == PhysicalOpKind::MergeJoin));
}

#[test]
fn test_hash_join_hint_is_exclusive() {
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::Inner);
    let op = with_join(op, |j| {
        j.prefer_join_type = JoinHints::HASH_JOIN;
    });
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());
    assert_eq!(plans.len(), 2);
    assert!(plans.iter().all(|p| p.kind() == PhysicalOpKind::HashJoin));
}

#[test]
fn test_enforced_merge_join_reorders_keys() {
    // Merge-join hint with no usable child ordering: the join is enforced,
    // keys reordered so the required column leads.
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::Inner);
    let op = with_join(op, |j| {
        j.prefer_join_type = JoinHints::MERGE_JOIN;
        j.left_properties = vec![];
        j.right_properties = vec![];
    });
    let prop = sort_prop(&[col(2, "a.y")], false);
    let plans = exhaust_physical_plans(&ctx, &op, &prop);

    assert_eq!(plans.len(), 1);
    let PhysicalOp::MergeJoin {
        left_keys,
        right_keys,
        ..
    } = &plans[0].op
    else {
        panic!("expected merge join");
    };
    assert_eq!(ids(left_keys), vec![2, 1]);
    assert_eq!(ids(right_keys), vec![12, 11]);
    for child_prop in &plans[0].children_req_props {
        assert!(child_prop.enforced);
        assert!(!child_prop.desc);
    }
}

#[test]
fn test_enforced_merge_join_rejects_foreign_column() {
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::Inner);
    let op = with_join(op, |j| {
        j.prefer_join_type = JoinHints::MERGE_JOIN;
        j.left_properties = vec![];
        j.right_properties = vec![];
    });
    // c99 is not a join key on either side.
    let prop = sort_prop(&[col(99, "zzz")], false);
    assert!(exhaust_physical_plans(&ctx, &op, &prop).is_empty());
}

#[test]
fn test_enforced_merge_join_rejects_duplicate_claims() {
    // Both property columns resolve to the same join-key position; the
    // second cannot claim a distinct one.
    let ctx = SessionCtx::default();
    let (ax, bx) = (col(1, "a.x"), col(11, "b.x"));
    let left = table_leaf(1, "a", &[ax.clone()], 100.0);
    let right = table_leaf(2, "b", &[bx.clone()], 100.0);
    let op = join_op(JoinType::Inner, left, right, vec![ax.clone()], vec![bx.clone()]);
    let op = with_join(op, |j| {
        j.prefer_join_type = JoinHints::MERGE_JOIN;
    });
    let prop = sort_prop(&[ax, bx], false);
    assert!(exhaust_physical_plans(&ctx, &op, &prop).is_empty());
}

// ---------------------------------------------------------------------------
// Hash-join orientation by join type
// ---------------------------------------------------------------------------

#[test]
fn test_hash_join_build_side_follows_join_type() {
    let ctx = SessionCtx::default();

    let op = two_key_join(JoinType::LeftOuter);
    let op = with_join(op, |j| {
        j.left_properties = vec![];
        j.right_properties = vec![];
    });
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());
    let hashes = of_kind(&plans, PhysicalOpKind::HashJoin);
    assert_eq!(hashes.len(), 1);
    let PhysicalOp::HashJoin {
        inner_child_idx, ..
    } = &hashes[0].op
    else {
        panic!("expected hash join");
    };
    assert_eq!(*inner_child_idx, 1);

    let op = two_key_join(JoinType::RightOuter);
    let op = with_join(op, |j| {
        j.left_properties = vec![];
        j.right_properties = vec![];
    });
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());
    let hashes = of_kind(&plans, PhysicalOpKind::HashJoin);
    assert_eq!(hashes.len(), 1);
    let PhysicalOp::HashJoin {
        inner_child_idx, ..
    } = &hashes[0].op
    else {
        panic!("expected hash join");
    };
    assert_eq!(*inner_child_idx, 0);
}

#[test]
fn test_hash_join_child_budgets() {
    // The build side must materialize fully; the probe side inherits the
    // parent's budget.
    let ctx = SessionCtx::default();
    let op = two_key_join(JoinType::LeftOuter);
    let op = with_join(op, |j| {
        j.left_properties = vec![];
        j.right_properties = vec![];
    });
    let mut prop = empty_prop();
    prop.expected_cnt = 50.0;
    let plans = exhaust_physical_plans(&ctx, &op, &prop);
    let hashes = of_kind(&plans, PhysicalOpKind::HashJoin);
    assert_eq!(hashes[0].children_req_props[0].expected_cnt, 50.0);
    assert!(hashes[0].children_req_props[1].expected_cnt.is_infinite());
}

// ---------------------------------------------------------------------------
// Index-join orientation
// ---------------------------------------------------------------------------

/// Inner join where both sides are PK tables, so both orientations could
/// drive lookups.
fn pk_pk_join(lhs_rows: f64, rhs_rows: f64) -> LogicalOperator {
    let a_id = col(1, "id");
    let b_id = col(11, "id");
    let left = pk_table_leaf(1, "a", &a_id, &[], lhs_rows);
    let right = pk_table_leaf(2, "b", &b_id, &[], rhs_rows);
    join_op(JoinType::Inner, left, right, vec![a_id], vec![b_id])
}

#[test]
fn test_inner_join_drives_from_smaller_side() {
    // lhs has 1000 rows, rhs 10: lookups should be driven by the right
    // side's few rows, probing into the left.
    let ctx = SessionCtx::default();
    let op = pk_pk_join(1000.0, 10.0);
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());

    let index_joins = of_kind(&plans, PhysicalOpKind::IndexJoin);
    assert!(!index_joins.is_empty());
    for plan in &index_joins {
        let PhysicalOp::IndexJoin { outer_idx, .. } = &plan.op else {
            panic!("expected index join");
        };
        assert_eq!(*outer_idx, 1);
    }
    // Not hint-forced: hash joins still appear alongside.
    assert_eq!(of_kind(&plans, PhysicalOpKind::HashJoin).len(), 2);
}

#[test]
fn test_inner_join_emits_both_orientations_on_equal_cardinality() {
    let ctx = SessionCtx::default();
    let op = pk_pk_join(100.0, 100.0);
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());
    let mut outer_idxs: Vec<usize> = of_kind(&plans, PhysicalOpKind::IndexJoin)
        .iter()
        .map(|p| match &p.op {
            PhysicalOp::IndexJoin { outer_idx, .. } => *outer_idx,
            _ => unreachable!(),
        })
        .collect();
    outer_idxs.sort_unstable();
    assert_eq!(outer_idxs, vec![0, 1]);
}

#[test]
fn test_single_usable_side_wins_without_force() {
    // Only the right child has a usable PK; index joins must all drive from
    // the left, and the selection is not hint-forced.
    let ctx = SessionCtx::default();
    let ax = col(1, "a.x");
    let b_id = col(11, "id");
    let left = table_leaf(1, "a", &[ax.clone()], 100.0);
    let right = pk_table_leaf(2, "b", &b_id, &[], 1000.0);
    let op = join_op(JoinType::Inner, left, right, vec![ax], vec![b_id]);
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());

    let index_joins = of_kind(&plans, PhysicalOpKind::IndexJoin);
    assert!(!index_joins.is_empty());
    for plan in &index_joins {
        let PhysicalOp::IndexJoin { outer_idx, .. } = &plan.op else {
            panic!("expected index join");
        };
        assert_eq!(*outer_idx, 0);
    }
    assert!(!of_kind(&plans, PhysicalOpKind::HashJoin).is_empty());
}

#[test]
fn test_index_inner_hint_forces_orientation() {
    // LEFT_AS_INDEX_INNER pins the left child as the lookup side, i.e. the
    // right child drives. The hint makes the result exclusive.
    let ctx = SessionCtx::default();
    let op = pk_pk_join(100.0, 100.0);
    let op = with_join(op, |j| {
        j.prefer_join_type = JoinHints::LEFT_AS_INDEX_INNER;
    });
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());
    assert!(!plans.is_empty());
    for plan in &plans {
        let PhysicalOp::IndexJoin { outer_idx, .. } = &plan.op else {
            panic!("hint should collapse the set to index joins");
        };
        assert_eq!(*outer_idx, 1);
    }
}

#[test]
fn test_left_outer_join_only_drives_from_left() {
    let ctx = SessionCtx::default();
    let ax = col(1, "a.x");
    let b_id = col(11, "id");
    let left = table_leaf(1, "a", &[ax.clone()], 100.0);
    let right = pk_table_leaf(2, "b", &b_id, &[], 1000.0);
    let op = join_op(JoinType::LeftOuter, left, right, vec![ax], vec![b_id]);
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());

    for plan in of_kind(&plans, PhysicalOpKind::IndexJoin) {
        let PhysicalOp::IndexJoin { outer_idx, .. } = &plan.op else {
            panic!("expected index join");
        };
        assert_eq!(*outer_idx, 0);
    }
}

#[test]
fn test_no_equal_condition_means_no_index_join() {
    let ctx = SessionCtx::default();
    let ax = col(1, "a.x");
    let b_id = col(11, "id");
    let left = table_leaf(1, "a", &[ax], 100.0);
    let right = pk_table_leaf(2, "b", &b_id, &[], 1000.0);
    let op = join_op(JoinType::Inner, left, right, vec![], vec![]);
    let plans = exhaust_physical_plans(&ctx, &op, &empty_prop());
    assert!(of_kind(&plans, PhysicalOpKind::IndexJoin).is_empty());
}
