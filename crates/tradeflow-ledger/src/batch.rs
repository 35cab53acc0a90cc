//! # Write Batches
//!
//! A status change is a delete followed by a reinsert of the same key. A
//! cross-document fan-out is several of those. Both are expressed as one
//! [`WriteBatch`] so the store can apply them atomically.

use crate::row::{Row, RowKey};

/// One mutation inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Insert a row. Fails the batch if the key is already present.
    Insert { table: String, row: Row },
    /// Delete a row. Deleting an absent key is a no-op.
    Delete { table: String, key: RowKey },
}

/// Ordered mutations applied all-or-nothing by [`crate::LedgerStore::commit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an insert.
    pub fn insert(&mut self, table: &str, row: Row) -> &mut Self {
        self.ops.push(WriteOp::Insert {
            table: table.to_string(),
            row,
        });
        self
    }

    /// Queue a delete.
    pub fn delete(&mut self, table: &str, key: RowKey) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            table: table.to_string(),
            key,
        });
        self
    }

    /// Queue a delete-then-insert of `row` under its own key.
    pub fn replace(&mut self, table: &str, row: Row) -> &mut Self {
        self.delete(table, row.key.clone());
        self.insert(table, row)
    }

    /// Append another batch's operations.
    pub fn extend(&mut self, other: WriteBatch) -> &mut Self {
        self.ops.extend(other.ops);
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Consume the batch into its operations.
    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_queues_delete_then_insert() {
        let row = Row {
            key: RowKey::new("DOC", "1000"),
            columns: vec![],
        };
        let mut batch = WriteBatch::new();
        batch.replace("BLTable", row.clone());
        let ops = batch.into_ops();
        assert_eq!(
            ops,
            vec![
                WriteOp::Delete {
                    table: "BLTable".into(),
                    key: row.key.clone()
                },
                WriteOp::Insert {
                    table: "BLTable".into(),
                    row
                },
            ]
        );
    }

    #[test]
    fn extend_preserves_order() {
        let mut a = WriteBatch::new();
        a.delete("BLTable", RowKey::new("DOC", "1"));
        let mut b = WriteBatch::new();
        b.delete("PLTable", RowKey::new("DOC", "1"));
        a.extend(b);
        assert_eq!(a.len(), 2);
        match &a.into_ops()[1] {
            WriteOp::Delete { table, .. } => assert_eq!(table, "PLTable"),
            other => panic!("unexpected op {other:?}"),
        }
    }
}
