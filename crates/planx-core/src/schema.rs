//! # Schemas
//!
//! A `Schema` is an ordered set of columns with identity-based membership.
//! Enumeration leans on three lookups: the offset of a column, containment,
//! and projection by offsets (used to realign join keys).

use serde::{Deserialize, Serialize};

use crate::expr::Column;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Offset of `col` in this schema, by identity.
    pub fn column_index(&self, col: &Column) -> Option<usize> {
        self.columns.iter().position(|c| c.equal(col))
    }

    pub fn contains(&self, col: &Column) -> bool {
        self.column_index(col).is_some()
    }

    /// Project the columns at the given offsets, in offset order.
    pub fn columns_by_indices(&self, offsets: &[usize]) -> Vec<Column> {
        offsets
            .iter()
            .filter_map(|&off| self.columns.get(off).cloned())
            .collect()
    }

    pub fn append(&mut self, col: Column) {
        self.columns.push(col);
    }

    /// Concatenation of two schemas, left columns first.
    pub fn merge(&self, other: &Schema) -> Schema {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Schema { columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::FieldType;

    fn col(id: i64) -> Column {
        Column {
            unique_id: id,
            index: id as usize,
            name: format!("c{id}"),
            ret_type: FieldType::Int { unsigned: false },
        }
    }

    #[test]
    fn test_column_index_by_identity() {
        let schema = Schema::new(vec![col(1), col(2), col(3)]);
        let mut probe = col(2);
        probe.name = "renamed".into();
        assert_eq!(schema.column_index(&probe), Some(1));
        assert_eq!(schema.column_index(&col(9)), None);
    }

    #[test]
    fn test_columns_by_indices_keeps_offset_order() {
        let schema = Schema::new(vec![col(1), col(2), col(3)]);
        let picked = schema.columns_by_indices(&[2, 0]);
        assert_eq!(picked[0].unique_id, 3);
        assert_eq!(picked[1].unique_id, 1);
    }
}
