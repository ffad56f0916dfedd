//! Company repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Write paths validate input before any SQL runs.
//! - Deleting a company first removes its transactions, best-effort.

use crate::model::company::{Company, CompanyPatch, NewCompany};
use crate::repo::error::{logged, RepoError, RepoResult};
use crate::repo::id_allocator::{next_id, EntityKind};
use crate::repo::list_query::{ListQuery, LIST_INITIAL_CAPACITY};
use crate::repo::schema_guard::ensure_connection_ready;
use crate::repo::transaction_repo::{cascade_delete_transactions, TransactionOwner};
use crate::repo::update_builder::UpdateBuilder;
use crate::repo::write_scope::in_write_scope;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const COMPANY_SELECT_SQL: &str = "SELECT company_id, name, location FROM companies";

/// Repository interface for company CRUD operations.
pub trait CompanyRepository {
    fn create_company(&self, input: &NewCompany) -> RepoResult<Company>;
    fn get_company(&self, company_id: &str) -> RepoResult<Option<Company>>;
    fn get_all_companies(&self) -> RepoResult<Vec<Company>>;
    fn list_companies(&self, query: &ListQuery) -> RepoResult<Vec<Company>>;
    fn update_company(&self, company_id: &str, patch: &CompanyPatch) -> RepoResult<()>;
    fn delete_company(&self, company_id: &str) -> RepoResult<()>;
}

/// SQLite-backed company repository.
pub struct SqliteCompanyRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompanyRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &[EntityKind::Company, EntityKind::Transaction])?;
        Ok(Self { conn })
    }

    fn insert_company(&self, input: &NewCompany) -> RepoResult<Company> {
        input.validate()?;

        let company_id = in_write_scope(self.conn, |conn| {
            let company_id = next_id(conn, EntityKind::Company, EntityKind::Company.prefix())?;
            conn.execute(
                "INSERT INTO companies (company_id, name, location) VALUES (?1, ?2, ?3);",
                params![
                    company_id.as_str(),
                    input.name.as_str(),
                    input.location.as_str()
                ],
            )?;
            Ok(company_id)
        })?;

        Ok(Company {
            company_id,
            name: input.name.clone(),
            location: input.location.clone(),
        })
    }

    fn fetch_company(&self, company_id: &str) -> RepoResult<Option<Company>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPANY_SELECT_SQL} WHERE company_id = ?1;"))?;
        let mut rows = stmt.query([company_id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_company_row(row)?));
        }

        Ok(None)
    }

    fn query_companies(&self, query: &ListQuery) -> RepoResult<Vec<Company>> {
        let mut sql = format!("{COMPANY_SELECT_SQL} ORDER BY rowid ASC");
        let mut bind_values: Vec<Value> = Vec::new();
        query.apply(&mut sql, &mut bind_values);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut companies = Vec::with_capacity(LIST_INITIAL_CAPACITY);
        while let Some(row) = rows.next()? {
            companies.push(parse_company_row(row)?);
        }

        Ok(companies)
    }

    fn apply_patch(&self, company_id: &str, patch: &CompanyPatch) -> RepoResult<()> {
        if patch.is_empty() {
            return Err(RepoError::NoFieldsToUpdate(EntityKind::Company));
        }
        patch.validate()?;
        let statement = UpdateBuilder::new(EntityKind::Company)
            .set("name", patch.name.clone())
            .set("location", patch.location.clone())
            .build(company_id)
            .ok_or(RepoError::NoFieldsToUpdate(EntityKind::Company))?;

        let changed = self
            .conn
            .execute(&statement.sql, params_from_iter(statement.values))?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Company, company_id));
        }

        Ok(())
    }

    fn remove_company(&self, company_id: &str) -> RepoResult<()> {
        cascade_delete_transactions(self.conn, TransactionOwner::Company, company_id);

        let changed = self
            .conn
            .execute("DELETE FROM companies WHERE company_id = ?1;", [company_id])?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Company, company_id));
        }

        Ok(())
    }
}

impl CompanyRepository for SqliteCompanyRepository<'_> {
    fn create_company(&self, input: &NewCompany) -> RepoResult<Company> {
        let result = self.insert_company(input);
        let id = result
            .as_ref()
            .map_or_else(|_| "-".to_string(), |created| created.company_id.clone());
        logged("company_create", &id, result)
    }

    fn get_company(&self, company_id: &str) -> RepoResult<Option<Company>> {
        logged("company_get", company_id, self.fetch_company(company_id))
    }

    fn get_all_companies(&self) -> RepoResult<Vec<Company>> {
        self.list_companies(&ListQuery::default())
    }

    fn list_companies(&self, query: &ListQuery) -> RepoResult<Vec<Company>> {
        logged("company_list", "*", self.query_companies(query))
    }

    fn update_company(&self, company_id: &str, patch: &CompanyPatch) -> RepoResult<()> {
        logged(
            "company_update",
            company_id,
            self.apply_patch(company_id, patch),
        )
    }

    fn delete_company(&self, company_id: &str) -> RepoResult<()> {
        logged("company_delete", company_id, self.remove_company(company_id))
    }
}

fn parse_company_row(row: &Row<'_>) -> RepoResult<Company> {
    Ok(Company {
        company_id: row.get("company_id")?,
        name: row.get("name")?,
        location: row.get("location")?,
    })
}
