use chrono::{Local, NaiveDateTime, Timelike};
use tradebook_core::db::{open_db_in_memory, open_db_with, DbOptions, DbTarget};
use tradebook_core::{
    EntityKind, ListQuery, NewTransaction, RepoError, SqliteTransactionRepository,
    TransactionPatch, TransactionRepository, DATETIME_FORMAT,
};

fn at(text: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).unwrap()
}

fn seed(repo: &SqliteTransactionRepository<'_>) {
    repo.create_transaction(&NewTransaction::new("U1", "C1", 100).at(at("2024-01-15 10:30:00")))
        .unwrap();
    repo.create_transaction(&NewTransaction::new("U1", "C2", 50).at(at("2024-01-15 11:00:00")))
        .unwrap();
    repo.create_transaction(&NewTransaction::new("U2", "C1", 200).at(at("2024-01-16 14:45:00")))
        .unwrap();
}

#[test]
fn explicit_datetime_is_stored_exactly() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();

    let created = repo
        .create_transaction(&NewTransaction::new("U1", "C1", 100).at(at("2024-01-15 10:30:00")))
        .unwrap();
    assert_eq!(created.transaction_id, "T1");

    let loaded = repo.get_transaction("T1").unwrap().unwrap();
    assert_eq!(loaded, created);
    let stored: String = conn
        .query_row(
            "SELECT transaction_datetime FROM transactions WHERE transaction_id = 'T1';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stored, "2024-01-15 10:30:00");
}

#[test]
fn missing_datetime_defaults_to_current_local_time() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();

    let before = Local::now().naive_local().with_nanosecond(0).unwrap();
    let created = repo
        .create_transaction(&NewTransaction::new("U1", "C2", 50))
        .unwrap();
    let after = Local::now().naive_local();

    let loaded = repo.get_transaction(&created.transaction_id).unwrap().unwrap();
    assert_eq!(loaded.transaction_datetime, created.transaction_datetime);
    assert_eq!(loaded.transaction_datetime.nanosecond(), 0);
    assert!(loaded.transaction_datetime >= before);
    assert!(loaded.transaction_datetime <= after);
}

#[test]
fn zero_and_negative_share_counts_are_valid() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();

    let zero = repo
        .create_transaction(&NewTransaction::new("U1", "C1", 0))
        .unwrap();
    let sold = repo
        .create_transaction(&NewTransaction::new("U1", "C1", -25))
        .unwrap();

    assert_eq!(
        repo.get_transaction(&zero.transaction_id)
            .unwrap()
            .unwrap()
            .number_of_shares,
        0
    );
    assert_eq!(
        repo.get_transaction(&sold.transaction_id)
            .unwrap()
            .unwrap()
            .number_of_shares,
        -25
    );
}

#[test]
fn update_share_count_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    seed(&repo);

    let patch = TransactionPatch {
        number_of_shares: Some(150),
        ..TransactionPatch::default()
    };
    repo.update_transaction("T1", &patch).unwrap();

    let loaded = repo.get_transaction("T1").unwrap().unwrap();
    assert_eq!(loaded.number_of_shares, 150);
    assert_eq!(loaded.user_id, "U1");
    assert_eq!(loaded.company_id, "C1");
    assert_eq!(loaded.transaction_datetime, at("2024-01-15 10:30:00"));
}

#[test]
fn any_share_count_can_be_written_by_update() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    seed(&repo);

    let patch = TransactionPatch {
        number_of_shares: Some(-999_999),
        ..TransactionPatch::default()
    };
    repo.update_transaction("T2", &patch).unwrap();

    assert_eq!(
        repo.get_transaction("T2").unwrap().unwrap().number_of_shares,
        -999_999
    );
}

#[test]
fn update_can_move_and_retime_a_transaction() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    seed(&repo);

    let patch = TransactionPatch {
        user_id: Some("U7".to_string()),
        transaction_datetime: Some(at("2025-03-01 09:00:00")),
        ..TransactionPatch::default()
    };
    repo.update_transaction("T3", &patch).unwrap();

    let loaded = repo.get_transaction("T3").unwrap().unwrap();
    assert_eq!(loaded.user_id, "U7");
    assert_eq!(loaded.company_id, "C1");
    assert_eq!(loaded.number_of_shares, 200);
    assert_eq!(loaded.transaction_datetime, at("2025-03-01 09:00:00"));
}

#[test]
fn empty_patch_and_missing_id_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    seed(&repo);

    assert!(matches!(
        repo.update_transaction("T1", &TransactionPatch::default()),
        Err(RepoError::NoFieldsToUpdate(EntityKind::Transaction))
    ));

    let patch = TransactionPatch {
        number_of_shares: Some(1),
        ..TransactionPatch::default()
    };
    assert!(matches!(
        repo.update_transaction("T99", &patch),
        Err(RepoError::NotFound {
            kind: EntityKind::Transaction,
            ..
        })
    ));
    assert!(matches!(
        repo.delete_transaction("T99"),
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn owner_filters_return_matching_rows_in_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    seed(&repo);

    let ids = |rows: Vec<tradebook_core::Transaction>| -> Vec<String> {
        rows.into_iter().map(|row| row.transaction_id).collect()
    };

    assert_eq!(ids(repo.get_transactions_by_user("U1").unwrap()), vec!["T1", "T2"]);
    assert_eq!(ids(repo.get_transactions_by_company("C1").unwrap()), vec!["T1", "T3"]);
    assert_eq!(
        ids(repo.get_transactions_by_user_and_company("U2", "C1").unwrap()),
        vec!["T3"]
    );
    assert!(repo.get_transactions_by_user("U9").unwrap().is_empty());
}

#[test]
fn list_transactions_pages() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    seed(&repo);

    assert_eq!(repo.get_all_transactions().unwrap().len(), 3);
    let page = repo.list_transactions(&ListQuery::page(1, 1)).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].transaction_id, "T2");
}

#[test]
fn delete_removes_only_the_target() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    seed(&repo);

    repo.delete_transaction("T2").unwrap();

    assert!(repo.get_transaction("T2").unwrap().is_none());
    assert_eq!(repo.get_all_transactions().unwrap().len(), 2);
}

#[test]
fn references_are_not_checked_by_default() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();

    let orphan = repo
        .create_transaction(&NewTransaction::new("U404", "C404", 10))
        .unwrap();

    assert_eq!(orphan.transaction_id, "T1");
    assert_eq!(repo.get_transaction("T1").unwrap().unwrap().user_id, "U404");
}

#[test]
fn enforced_foreign_keys_reject_orphan_references() {
    let options = DbOptions {
        enforce_foreign_keys: true,
        ..DbOptions::default()
    };
    let conn = open_db_with(&DbTarget::Memory, &options).unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();

    let err = repo
        .create_transaction(&NewTransaction::new("U404", "C404", 10))
        .unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.get_all_transactions().unwrap().is_empty());
}

#[test]
fn oversized_reference_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();

    let err = repo
        .create_transaction(&NewTransaction::new("U".repeat(20), "C1", 1))
        .unwrap_err();

    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn corrupt_datetime_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    conn.execute(
        "INSERT INTO transactions VALUES ('T1', 'U1', 'C1', 5, 'yesterday');",
        [],
    )
    .unwrap();

    assert!(matches!(
        repo.get_transaction("T1"),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn display_matches_listing_format() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteTransactionRepository::try_new(&conn).unwrap();
    seed(&repo);

    let first = repo.get_transaction("T1").unwrap().unwrap();
    assert_eq!(
        first.to_string(),
        "Transaction T1: User U1 -> Company C1, Shares: 100, DateTime: 2024-01-15 10:30:00"
    );
}
