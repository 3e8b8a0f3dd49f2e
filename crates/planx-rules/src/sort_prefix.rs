//! # Order-Prefix Arithmetic
//!
//! Shared helpers for reasoning about sort prefixes: how much of a wanted
//! ordering a set of available columns can serve, how far candidate
//! orderings agree with a key list, and how to realign key lists by a
//! matched-offset vector.

use planx_core::expr::{ByItem, Column, Expr};
use planx_core::property::{PhysicalProperty, TaskType};
use planx_core::schema::Schema;

/// The longest prefix of `sort_cols` whose columns all appear in `all_cols`,
/// returned as their offsets into `all_cols`. Stops at the first miss; a
/// later match cannot help once the prefix is broken.
pub fn max_sort_prefix(sort_cols: &[Column], all_cols: &[Column]) -> Vec<usize> {
    let tmp_schema = Schema::new(all_cols.to_vec());
    let mut offsets = Vec::with_capacity(sort_cols.len());
    for sort_col in sort_cols {
        match tmp_schema.column_index(sort_col) {
            Some(offset) => offsets.push(offset),
            None => return offsets,
        }
    }
    offsets
}

/// The largest `k` such that some candidate ordering starts with
/// `keys[..k]`, compared by column identity.
pub fn find_max_prefix_len(candidates: &[Vec<Column>], keys: &[Column]) -> usize {
    let mut max_len = 0;
    for candidate_keys in candidates {
        let mut matched_len = 0;
        for (i, key) in keys.iter().enumerate() {
            if i < candidate_keys.len() && key.equal(&candidate_keys[i]) {
                matched_len += 1;
            } else {
                break;
            }
        }
        if matched_len > max_len {
            max_len = matched_len;
        }
    }
    max_len
}

/// Reorder `keys` so the entries at `offsets` come first (in offset order),
/// followed by the remaining keys in their original order.
pub fn keys_by_offsets(keys: &[Column], offsets: &[usize]) -> Vec<Column> {
    let mut new_keys = Vec::with_capacity(keys.len());
    for &offset in offsets {
        new_keys.push(keys[offset].clone());
    }
    for (pos, key) in keys.iter().enumerate() {
        if !offsets.contains(&pos) {
            new_keys.push(key.clone());
        }
    }
    new_keys
}

/// Turn ORDER BY items into a property, when possible: every item must be a
/// plain column and the direction must be uniform.
pub fn get_prop_by_order_by_items(items: &[ByItem]) -> Option<PhysicalProperty> {
    let mut cols = Vec::with_capacity(items.len());
    let mut desc = false;
    for (i, item) in items.iter().enumerate() {
        let col = item.expr.as_column()?;
        cols.push(col.clone());
        desc = item.desc;
        if i > 0 && item.desc != items[i - 1].desc {
            return None;
        }
    }
    let mut prop = PhysicalProperty::with_cols(TaskType::Root, f64::INFINITY, cols);
    prop.desc = desc;
    Some(prop)
}

/// Whether `items` can produce the order `prop` asks for: the property's
/// columns must match the leading items exactly, direction included.
pub fn match_items(prop: &PhysicalProperty, items: &[ByItem]) -> bool {
    if items.len() < prop.cols.len() {
        return false;
    }
    for (i, col) in prop.cols.iter().enumerate() {
        let sort_item = &items[i];
        if sort_item.desc != prop.desc {
            return false;
        }
        match &sort_item.expr {
            Expr::Column(c) if c.equal(col) => {}
            _ => return false,
        }
    }
    true
}
