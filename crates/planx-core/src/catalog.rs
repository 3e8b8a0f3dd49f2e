//! # Table and Index Metadata
//!
//! Catalog metadata consumed by index-join analysis: table definitions with
//! their primary-key handle flag, and index definitions whose columns may be
//! prefix-length. A prefix-length index column can seed a range but never
//! fully covers its predicate, so conditions on it must also remain as
//! post-scan filters.

use serde::{Deserialize, Serialize};

use crate::expr::{Column, FieldType};
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub field_type: FieldType,
    /// Whether this column is the declared primary key.
    pub pk: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    pub id: i64,
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    /// True when the integer primary key doubles as the row handle, making
    /// PK point lookups a plain table read.
    pub pk_is_handle: bool,
}

/// One column of an index definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    /// `Some(n)` when only the first `n` bytes are indexed.
    pub length: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub id: i64,
    pub name: String,
    pub columns: Vec<IndexColumn>,
}

/// Resolve an index's columns against a concrete schema by name. Stops at
/// the first index column the schema does not expose: a partially resolved
/// suffix cannot participate in range construction anyway.
pub fn index_info_to_cols(schema: &Schema, index: &IndexInfo) -> (Vec<Column>, Vec<Option<usize>>) {
    let mut cols = Vec::with_capacity(index.columns.len());
    let mut lengths = Vec::with_capacity(index.columns.len());
    for idx_col in &index.columns {
        let Some(col) = schema.columns.iter().find(|c| c.name == idx_col.name) else {
            break;
        };
        cols.push(col.clone());
        lengths.push(idx_col.length);
    }
    (cols, lengths)
}
