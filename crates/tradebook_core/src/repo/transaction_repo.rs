//! Transaction repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and owner-filtered queries over `transactions`.
//! - Own the cascade cleanup used when a user or company is deleted.
//!
//! # Invariants
//! - Id allocation and insert run in one write scope (see `write_scope`).
//! - Referenced user/company ids are not checked before insert.
//! - Timestamps persist as `YYYY-MM-DD HH:MM:SS`.

use crate::model::transaction::{
    NewTransaction, Transaction, TransactionPatch, DATETIME_FORMAT,
};
use crate::repo::error::{logged, RepoError, RepoResult};
use crate::repo::id_allocator::{next_id, EntityKind};
use crate::repo::list_query::{ListQuery, LIST_INITIAL_CAPACITY};
use crate::repo::schema_guard::ensure_connection_ready;
use crate::repo::update_builder::UpdateBuilder;
use crate::repo::write_scope::in_write_scope;
use chrono::NaiveDateTime;
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TRANSACTION_SELECT_SQL: &str = "SELECT
    transaction_id,
    user_id,
    company_id,
    number_of_shares,
    transaction_datetime
FROM transactions";

/// Which foreign key a transaction is matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TransactionOwner {
    User,
    Company,
}

impl TransactionOwner {
    fn column(self) -> &'static str {
        match self {
            Self::User => "user_id",
            Self::Company => "company_id",
        }
    }
}

/// Repository interface for transaction operations.
pub trait TransactionRepository {
    /// Allocates a `T<n>` id, inserts the row, returns the stored record.
    fn create_transaction(&self, input: &NewTransaction) -> RepoResult<Transaction>;
    fn get_transaction(&self, transaction_id: &str) -> RepoResult<Option<Transaction>>;
    /// Returns every transaction in insertion order.
    fn get_all_transactions(&self) -> RepoResult<Vec<Transaction>>;
    fn list_transactions(&self, query: &ListQuery) -> RepoResult<Vec<Transaction>>;
    fn get_transactions_by_user(&self, user_id: &str) -> RepoResult<Vec<Transaction>>;
    fn get_transactions_by_company(&self, company_id: &str) -> RepoResult<Vec<Transaction>>;
    fn get_transactions_by_user_and_company(
        &self,
        user_id: &str,
        company_id: &str,
    ) -> RepoResult<Vec<Transaction>>;
    /// Writes only the present patch fields.
    fn update_transaction(&self, transaction_id: &str, patch: &TransactionPatch)
        -> RepoResult<()>;
    fn delete_transaction(&self, transaction_id: &str) -> RepoResult<()>;
}

/// SQLite-backed transaction repository.
pub struct SqliteTransactionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTransactionRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[EntityKind::Transaction])?;
        Ok(Self { conn })
    }

    fn insert_transaction(&self, input: &NewTransaction) -> RepoResult<Transaction> {
        input.validate()?;
        let transaction_datetime = input.resolved_datetime();

        let transaction_id = in_write_scope(self.conn, |conn| {
            let transaction_id = next_id(
                conn,
                EntityKind::Transaction,
                EntityKind::Transaction.prefix(),
            )?;
            conn.execute(
                "INSERT INTO transactions (
                    transaction_id,
                    user_id,
                    company_id,
                    number_of_shares,
                    transaction_datetime
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    transaction_id.as_str(),
                    input.user_id.as_str(),
                    input.company_id.as_str(),
                    input.number_of_shares,
                    transaction_datetime.format(DATETIME_FORMAT).to_string(),
                ],
            )?;
            Ok(transaction_id)
        })?;

        Ok(Transaction {
            transaction_id,
            user_id: input.user_id.clone(),
            company_id: input.company_id.clone(),
            number_of_shares: input.number_of_shares,
            transaction_datetime,
        })
    }

    fn fetch_transaction(&self, transaction_id: &str) -> RepoResult<Option<Transaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TRANSACTION_SELECT_SQL} WHERE transaction_id = ?1;"
        ))?;
        let mut rows = stmt.query([transaction_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_transaction_row(row)?));
        }

        Ok(None)
    }

    fn apply_patch(&self, transaction_id: &str, patch: &TransactionPatch) -> RepoResult<()> {
        if patch.is_empty() {
            return Err(RepoError::NoFieldsToUpdate(EntityKind::Transaction));
        }
        patch.validate()?;
        let statement = UpdateBuilder::new(EntityKind::Transaction)
            .set("user_id", patch.user_id.clone())
            .set("company_id", patch.company_id.clone())
            .set("number_of_shares", patch.number_of_shares)
            .set(
                "transaction_datetime",
                patch
                    .transaction_datetime
                    .map(|value| value.format(DATETIME_FORMAT).to_string()),
            )
            .build(transaction_id)
            .ok_or(RepoError::NoFieldsToUpdate(EntityKind::Transaction))?;

        let changed = self
            .conn
            .execute(&statement.sql, params_from_iter(statement.values))?;
        if changed == 0 {
            return Err(RepoError::not_found(
                EntityKind::Transaction,
                transaction_id,
            ));
        }

        Ok(())
    }

    fn remove_transaction(&self, transaction_id: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE transaction_id = ?1;",
            [transaction_id],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(
                EntityKind::Transaction,
                transaction_id,
            ));
        }

        Ok(())
    }

    fn query_transactions(
        &self,
        filter_sql: &str,
        mut bind_values: Vec<Value>,
        query: &ListQuery,
    ) -> RepoResult<Vec<Transaction>> {
        let mut sql = format!("{TRANSACTION_SELECT_SQL}{filter_sql} ORDER BY rowid ASC");
        query.apply(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut transactions = Vec::with_capacity(LIST_INITIAL_CAPACITY);
        while let Some(row) = rows.next()? {
            transactions.push(parse_transaction_row(row)?);
        }

        Ok(transactions)
    }

    fn query_by_owner(
        &self,
        owner: TransactionOwner,
        owner_id: &str,
    ) -> RepoResult<Vec<Transaction>> {
        self.query_transactions(
            &format!(" WHERE {} = ?", owner.column()),
            vec![Value::Text(owner_id.to_string())],
            &ListQuery::default(),
        )
    }
}

impl TransactionRepository for SqliteTransactionRepository<'_> {
    fn create_transaction(&self, input: &NewTransaction) -> RepoResult<Transaction> {
        let result = self.insert_transaction(input);
        let id = result
            .as_ref()
            .map_or_else(|_| "-".to_string(), |created| created.transaction_id.clone());
        logged("transaction_create", &id, result)
    }

    fn get_transaction(&self, transaction_id: &str) -> RepoResult<Option<Transaction>> {
        logged(
            "transaction_get",
            transaction_id,
            self.fetch_transaction(transaction_id),
        )
    }

    fn get_all_transactions(&self) -> RepoResult<Vec<Transaction>> {
        self.list_transactions(&ListQuery::default())
    }

    fn list_transactions(&self, query: &ListQuery) -> RepoResult<Vec<Transaction>> {
        logged(
            "transaction_list",
            "*",
            self.query_transactions("", Vec::new(), query),
        )
    }

    fn get_transactions_by_user(&self, user_id: &str) -> RepoResult<Vec<Transaction>> {
        logged(
            "transaction_list_by_user",
            user_id,
            self.query_by_owner(TransactionOwner::User, user_id),
        )
    }

    fn get_transactions_by_company(&self, company_id: &str) -> RepoResult<Vec<Transaction>> {
        logged(
            "transaction_list_by_company",
            company_id,
            self.query_by_owner(TransactionOwner::Company, company_id),
        )
    }

    fn get_transactions_by_user_and_company(
        &self,
        user_id: &str,
        company_id: &str,
    ) -> RepoResult<Vec<Transaction>> {
        let result = self.query_transactions(
            " WHERE user_id = ? AND company_id = ?",
            vec![
                Value::Text(user_id.to_string()),
                Value::Text(company_id.to_string()),
            ],
            &ListQuery::default(),
        );
        logged(
            "transaction_list_by_user_and_company",
            &format!("{user_id}/{company_id}"),
            result,
        )
    }

    fn update_transaction(
        &self,
        transaction_id: &str,
        patch: &TransactionPatch,
    ) -> RepoResult<()> {
        logged(
            "transaction_update",
            transaction_id,
            self.apply_patch(transaction_id, patch),
        )
    }

    fn delete_transaction(&self, transaction_id: &str) -> RepoResult<()> {
        logged(
            "transaction_delete",
            transaction_id,
            self.remove_transaction(transaction_id),
        )
    }
}

/// Removes every transaction owned by `owner_id`, best-effort.
///
/// Failures are logged and swallowed so the parent delete still runs.
pub(crate) fn cascade_delete_transactions(
    conn: &Connection,
    owner: TransactionOwner,
    owner_id: &str,
) {
    let result = conn.execute(
        &format!("DELETE FROM transactions WHERE {} = ?1;", owner.column()),
        [owner_id],
    );
    match result {
        Ok(removed) => info!(
            "event=cascade_delete module=repo status=ok owner_column={} owner_id={} removed={}",
            owner.column(),
            owner_id,
            removed
        ),
        Err(err) => warn!(
            "event=cascade_delete module=repo status=error owner_column={} owner_id={} error={}",
            owner.column(),
            owner_id,
            err
        ),
    }
}

fn parse_transaction_row(row: &Row<'_>) -> RepoResult<Transaction> {
    let datetime_text: String = row.get("transaction_datetime")?;
    let transaction_datetime = NaiveDateTime::parse_from_str(&datetime_text, DATETIME_FORMAT)
        .map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid datetime `{datetime_text}` in transactions.transaction_datetime"
            ))
        })?;

    Ok(Transaction {
        transaction_id: row.get("transaction_id")?,
        user_id: row.get("user_id")?,
        company_id: row.get("company_id")?,
        number_of_shares: row.get("number_of_shares")?,
        transaction_datetime,
    })
}
