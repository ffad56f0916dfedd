//! User repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `users` table.
//! - Cascade transaction cleanup before removing a user.
//!
//! # Invariants
//! - Write paths validate input before any SQL runs.
//! - `balance` is bound as two-place decimal text and read back through
//!   `printf('%.2f', ...)`, so values round-trip without float noise.
//! - Cascade cleanup is best-effort and not atomic with the user delete.

use crate::model::user::{NewUser, User, UserPatch, DATE_FORMAT};
use crate::repo::error::{logged, RepoError, RepoResult};
use crate::repo::id_allocator::{next_id, EntityKind};
use crate::repo::list_query::{ListQuery, LIST_INITIAL_CAPACITY};
use crate::repo::schema_guard::ensure_connection_ready;
use crate::repo::transaction_repo::{cascade_delete_transactions, TransactionOwner};
use crate::repo::update_builder::UpdateBuilder;
use crate::repo::write_scope::in_write_scope;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::str::FromStr;

const USER_SELECT_SQL: &str = "SELECT
    user_id,
    firstname,
    lastname,
    date_of_birth,
    address,
    printf('%.2f', balance) AS balance
FROM users";

/// Repository interface for user CRUD operations.
pub trait UserRepository {
    /// Allocates a `U<n>` id, inserts the row, returns the stored record.
    fn create_user(&self, input: &NewUser) -> RepoResult<User>;
    fn get_user(&self, user_id: &str) -> RepoResult<Option<User>>;
    /// Returns every user in insertion order.
    fn get_all_users(&self) -> RepoResult<Vec<User>>;
    fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>>;
    /// Writes only the present patch fields.
    fn update_user(&self, user_id: &str, patch: &UserPatch) -> RepoResult<()>;
    /// Deletes the user's transactions, then the user.
    fn delete_user(&self, user_id: &str) -> RepoResult<()>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    ///
    /// Checks the `transactions` table too, since deletes cascade into it.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[EntityKind::User, EntityKind::Transaction])?;
        Ok(Self { conn })
    }

    fn insert_user(&self, input: &NewUser) -> RepoResult<User> {
        let balance = input.validate()?;

        let user_id = in_write_scope(self.conn, |conn| {
            let user_id = next_id(conn, EntityKind::User, EntityKind::User.prefix())?;
            conn.execute(
                "INSERT INTO users (
                    user_id,
                    firstname,
                    lastname,
                    date_of_birth,
                    address,
                    balance
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    user_id.as_str(),
                    input.firstname.as_str(),
                    input.lastname.as_str(),
                    input.date_of_birth.format(DATE_FORMAT).to_string(),
                    input.address.as_str(),
                    balance.to_string(),
                ],
            )?;
            Ok(user_id)
        })?;

        Ok(User {
            user_id,
            firstname: input.firstname.clone(),
            lastname: input.lastname.clone(),
            date_of_birth: input.date_of_birth,
            address: input.address.clone(),
            balance,
        })
    }

    fn fetch_user(&self, user_id: &str) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE user_id = ?1;"))?;
        let mut rows = stmt.query([user_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }

        Ok(None)
    }

    fn query_users(&self, query: &ListQuery) -> RepoResult<Vec<User>> {
        let mut sql = format!("{USER_SELECT_SQL} ORDER BY rowid ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        query.apply(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut users = Vec::with_capacity(LIST_INITIAL_CAPACITY);
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }

        Ok(users)
    }

    fn apply_patch(&self, user_id: &str, patch: &UserPatch) -> RepoResult<()> {
        if patch.is_empty() {
            return Err(RepoError::NoFieldsToUpdate(EntityKind::User));
        }
        let balance = patch.validate()?;
        let statement = UpdateBuilder::new(EntityKind::User)
            .set("firstname", patch.firstname.clone())
            .set("lastname", patch.lastname.clone())
            .set(
                "date_of_birth",
                patch
                    .date_of_birth
                    .map(|value| value.format(DATE_FORMAT).to_string()),
            )
            .set("address", patch.address.clone())
            .set("balance", balance.map(|value| value.to_string()))
            .build(user_id)
            .ok_or(RepoError::NoFieldsToUpdate(EntityKind::User))?;

        let changed = self
            .conn
            .execute(&statement.sql, params_from_iter(statement.values))?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::User, user_id));
        }

        Ok(())
    }

    fn remove_user(&self, user_id: &str) -> RepoResult<()> {
        cascade_delete_transactions(self.conn, TransactionOwner::User, user_id);

        let changed = self
            .conn
            .execute("DELETE FROM users WHERE user_id = ?1;", [user_id])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::User, user_id));
        }

        Ok(())
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn create_user(&self, input: &NewUser) -> RepoResult<User> {
        let result = self.insert_user(input);
        let id = result
            .as_ref()
            .map_or_else(|_| "-".to_string(), |created| created.user_id.clone());
        logged("user_create", &id, result)
    }

    fn get_user(&self, user_id: &str) -> RepoResult<Option<User>> {
        logged("user_get", user_id, self.fetch_user(user_id))
    }

    fn get_all_users(&self) -> RepoResult<Vec<User>> {
        self.list_users(&ListQuery::default())
    }

    fn list_users(&self, query: &ListQuery) -> RepoResult<Vec<User>> {
        logged("user_list", "*", self.query_users(query))
    }

    fn update_user(&self, user_id: &str, patch: &UserPatch) -> RepoResult<()> {
        logged("user_update", user_id, self.apply_patch(user_id, patch))
    }

    fn delete_user(&self, user_id: &str) -> RepoResult<()> {
        logged("user_delete", user_id, self.remove_user(user_id))
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let date_text: String = row.get("date_of_birth")?;
    let date_of_birth = NaiveDate::parse_from_str(&date_text, DATE_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!("invalid date `{date_text}` in users.date_of_birth"))
    })?;

    let balance_text: String = row.get("balance")?;
    let balance = Decimal::from_str(&balance_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid balance `{balance_text}` in users.balance"))
    })?;

    Ok(User {
        user_id: row.get("user_id")?,
        firstname: row.get("firstname")?,
        lastname: row.get("lastname")?,
        date_of_birth,
        address: row.get("address")?,
        balance,
    })
}
