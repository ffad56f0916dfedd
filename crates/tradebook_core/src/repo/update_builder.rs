//! Partial-update statement construction.
//!
//! # Responsibility
//! - Turn the present fields of a patch into one parameter-bound
//!   `UPDATE ... SET ... WHERE <id> = ?` statement.
//!
//! # Invariants
//! - Column and table names are `'static` schema constants; values are only
//!   ever bound, never formatted into the statement text.
//! - Assignments keep the order in which fields were offered.
//! - An update with no present field builds nothing.

use crate::repo::id_allocator::EntityKind;
use rusqlite::types::Value;

/// Accumulates `column = ?N` assignments for one entity table.
#[derive(Debug)]
pub(crate) struct UpdateBuilder {
    kind: EntityKind,
    assignments: Vec<(&'static str, Value)>,
}

/// A built statement plus its positional bind values.
#[derive(Debug, PartialEq)]
pub(crate) struct UpdateStatement {
    pub sql: String,
    pub values: Vec<Value>,
}

impl UpdateBuilder {
    pub(crate) fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            assignments: Vec::new(),
        }
    }

    /// Adds `column = value` when `value` is present.
    pub(crate) fn set<T: Into<Value>>(mut self, column: &'static str, value: Option<T>) -> Self {
        if let Some(value) = value {
            self.assignments.push((column, value.into()));
        }
        self
    }

    /// Builds the statement filtered by `id`, or `None` without assignments.
    pub(crate) fn build(self, id: &str) -> Option<UpdateStatement> {
        if self.assignments.is_empty() {
            return None;
        }

        let mut clauses = Vec::with_capacity(self.assignments.len());
        let mut values = Vec::with_capacity(self.assignments.len() + 1);
        for (index, (column, value)) in self.assignments.into_iter().enumerate() {
            clauses.push(format!("{column} = ?{}", index + 1));
            values.push(value);
        }
        values.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?{};",
            self.kind.table(),
            clauses.join(", "),
            self.kind.id_column(),
            values.len()
        );
        Some(UpdateStatement { sql, values })
    }
}
