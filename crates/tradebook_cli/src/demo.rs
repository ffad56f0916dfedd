//! Linear CRUD walkthrough over users, companies and transactions.

use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime};
use log::warn;
use rusqlite::Connection;
use rust_decimal::Decimal;
use tradebook_core::{
    CompanyPatch, CompanyRepository, NewCompany, NewTransaction, NewUser, RepoResult,
    SqliteCompanyRepository, SqliteTransactionRepository, SqliteUserRepository,
    TransactionPatch, TransactionRepository, UserPatch, UserRepository, DATETIME_FORMAT,
    DATE_FORMAT,
};

const RULE: &str = "==================================================";

pub fn run(conn: &Connection) -> anyhow::Result<()> {
    let users = SqliteUserRepository::try_new(conn)?;
    let companies = SqliteCompanyRepository::try_new(conn)?;
    let transactions = SqliteTransactionRepository::try_new(conn)?;

    section("USER CRUD OPERATIONS");
    println!("1. Creating users...");
    for input in [
        NewUser::new(
            "John",
            "Doe",
            date("1990-05-15")?,
            "123 Main St, New York, NY",
        )
        .with_balance(Decimal::new(150050, 2)),
        NewUser::new(
            "Jane",
            "Smith",
            date("1985-08-22")?,
            "456 Oak Ave, Los Angeles, CA",
        )
        .with_balance(Decimal::new(250075, 2)),
    ] {
        if let Some(user) = report("create user", users.create_user(&input)) {
            println!(
                "Created user: {} - {} {}",
                user.user_id, user.firstname, user.lastname
            );
        }
    }

    println!("\n2. Reading all users...");
    for user in report("list users", users.get_all_users()).unwrap_or_default() {
        println!("  {user}");
    }

    println!("\n3. Reading single user (U1)...");
    if let Some(Some(user)) = report("get user", users.get_user("U1")) {
        println!(
            "  Found: {} {}, Balance: ${:.2}",
            user.firstname, user.lastname, user.balance
        );
    }

    println!("\n4. Updating user U1...");
    let patch = UserPatch {
        address: Some("789 Pine Rd, Boston, MA".to_string()),
        balance: Some(Decimal::new(200000, 2)),
        ..UserPatch::default()
    };
    report("update user", users.update_user("U1", &patch));
    if let Some(Some(user)) = report("get user", users.get_user("U1")) {
        println!(
            "  Updated: {} {}, New Balance: ${:.2}, New Address: {}",
            user.firstname, user.lastname, user.balance, user.address
        );
    }

    section("COMPANY CRUD OPERATIONS");
    println!("1. Creating companies...");
    for input in [
        NewCompany::new("Tech Solutions Inc", "San Francisco, CA"),
        NewCompany::new("Global Industries Ltd", "New York, NY"),
    ] {
        if let Some(company) = report("create company", companies.create_company(&input)) {
            println!("Created company: {} - {}", company.company_id, company.name);
        }
    }

    println!("\n2. Reading all companies...");
    for company in report("list companies", companies.get_all_companies()).unwrap_or_default() {
        println!("  {company}");
    }

    println!("\n3. Reading single company (C1)...");
    if let Some(Some(company)) = report("get company", companies.get_company("C1")) {
        println!("  Found: {}, Location: {}", company.name, company.location);
    }

    println!("\n4. Updating company C1...");
    let patch = CompanyPatch {
        location: Some("Seattle, WA".to_string()),
        ..CompanyPatch::default()
    };
    report("update company", companies.update_company("C1", &patch));
    if let Some(Some(company)) = report("get company", companies.get_company("C1")) {
        println!(
            "  Updated: {}, New Location: {}",
            company.name, company.location
        );
    }

    section("TRANSACTION CRUD OPERATIONS");
    println!("1. Creating transactions...");
    for input in [
        NewTransaction::new("U1", "C1", 100).at(datetime("2024-01-15 10:30:00")?),
        NewTransaction::new("U1", "C2", 50),
        NewTransaction::new("U2", "C1", 200).at(datetime("2024-01-16 14:45:00")?),
    ] {
        if let Some(created) =
            report("create transaction", transactions.create_transaction(&input))
        {
            println!(
                "Created transaction: ID {}, User {}, Company {}, Shares: {}",
                created.transaction_id,
                created.user_id,
                created.company_id,
                created.number_of_shares
            );
        }
    }

    println!("\n2. Reading all transactions...");
    for transaction in
        report("list transactions", transactions.get_all_transactions()).unwrap_or_default()
    {
        println!("  {transaction}");
    }

    println!("\n3. Reading single transaction (T1)...");
    if let Some(Some(found)) = report("get transaction", transactions.get_transaction("T1")) {
        println!(
            "  Found: User {}, Company {}, Shares: {}",
            found.user_id, found.company_id, found.number_of_shares
        );
    }

    println!("\n4. Updating transaction T1...");
    let patch = TransactionPatch {
        number_of_shares: Some(150),
        ..TransactionPatch::default()
    };
    report(
        "update transaction",
        transactions.update_transaction("T1", &patch),
    );
    if let Some(Some(found)) = report("get transaction", transactions.get_transaction("T1")) {
        println!("  Updated: Shares changed to {}", found.number_of_shares);
    }

    section("Final State");
    println!("All Users:");
    for user in report("list users", users.get_all_users()).unwrap_or_default() {
        println!(
            "  {}: {} {}, Balance: ${:.2}",
            user.user_id, user.firstname, user.lastname, user.balance
        );
    }

    println!("\nAll Companies:");
    for company in report("list companies", companies.get_all_companies()).unwrap_or_default() {
        println!("  {company}");
    }

    println!("\nAll Transactions:");
    for transaction in
        report("list transactions", transactions.get_all_transactions()).unwrap_or_default()
    {
        println!("  {transaction}");
    }

    Ok(())
}

fn section(title: &str) {
    println!("\n{RULE}");
    println!("{title}");
    println!("{RULE}\n");
}

/// Prints a failed step to stderr and lets the walkthrough continue.
fn report<T>(step: &str, result: RepoResult<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("event=demo_step module=cli status=error step={step} error={err}");
            eprintln!("{step} failed: {err}");
            None
        }
    }
}

fn date(text: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .with_context(|| format!("invalid walkthrough date `{text}`"))
}

fn datetime(text: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .with_context(|| format!("invalid walkthrough timestamp `{text}`"))
}
