//! Pagination options shared by the list operations.

use rusqlite::types::Value;

/// Initial capacity for collected rows; the vector grows as needed.
pub(crate) const LIST_INITIAL_CAPACITY: usize = 10;

/// Query options for listing entity rows.
///
/// Rows come back in insertion order. `limit: None` returns every row after
/// `offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ListQuery {
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset,
        }
    }

    /// Appends `LIMIT`/`OFFSET` clauses and their bind values.
    pub(crate) fn apply(&self, sql: &mut String, bind_values: &mut Vec<Value>) {
        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if self.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(self.offset)));
            }
        } else if self.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(self.offset)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ListQuery;
    use rusqlite::types::Value;

    #[test]
    fn default_query_adds_no_clauses() {
        let mut sql = String::from("SELECT 1");
        let mut values = Vec::new();
        ListQuery::default().apply(&mut sql, &mut values);
        assert_eq!(sql, "SELECT 1");
        assert!(values.is_empty());
    }

    #[test]
    fn offset_without_limit_uses_unbounded_limit() {
        let mut sql = String::from("SELECT 1");
        let mut values = Vec::new();
        let query = ListQuery {
            limit: None,
            offset: 3,
        };
        query.apply(&mut sql, &mut values);
        assert_eq!(sql, "SELECT 1 LIMIT -1 OFFSET ?");
        assert_eq!(values, vec![Value::Integer(3)]);
    }

    #[test]
    fn page_binds_limit_then_offset() {
        let mut sql = String::new();
        let mut values = Vec::new();
        ListQuery::page(2, 4).apply(&mut sql, &mut values);
        assert_eq!(sql, " LIMIT ? OFFSET ?");
        assert_eq!(values, vec![Value::Integer(2), Value::Integer(4)]);
    }
}
