use tradebook_core::db::open_db_in_memory;
use tradebook_core::{
    CompanyPatch, CompanyRepository, EntityKind, ListQuery, NewCompany, RepoError,
    SqliteCompanyRepository, ValidationError,
};

fn tech() -> NewCompany {
    NewCompany::new("Tech Solutions Inc", "San Francisco, CA")
}

fn global() -> NewCompany {
    NewCompany::new("Global Industries Ltd", "New York, NY")
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();

    let first = repo.create_company(&tech()).unwrap();
    let second = repo.create_company(&global()).unwrap();

    assert_eq!(first.company_id, "C1");
    assert_eq!(second.company_id, "C2");
    assert_eq!(repo.get_company("C1").unwrap().unwrap(), first);
    assert_eq!(first.to_string(), "C1: Tech Solutions Inc, Location: San Francisco, CA");
}

#[test]
fn get_missing_company_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();

    assert!(repo.get_company("C1").unwrap().is_none());
    assert!(repo.get_all_companies().unwrap().is_empty());
}

#[test]
fn update_location_keeps_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();
    repo.create_company(&tech()).unwrap();

    let patch = CompanyPatch {
        location: Some("Seattle, WA".to_string()),
        ..CompanyPatch::default()
    };
    repo.update_company("C1", &patch).unwrap();

    let loaded = repo.get_company("C1").unwrap().unwrap();
    assert_eq!(loaded.name, "Tech Solutions Inc");
    assert_eq!(loaded.location, "Seattle, WA");
}

#[test]
fn update_both_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();
    repo.create_company(&tech()).unwrap();

    let patch = CompanyPatch {
        name: Some("Tech Holdings".to_string()),
        location: Some("Austin, TX".to_string()),
    };
    repo.update_company("C1", &patch).unwrap();

    let loaded = repo.get_company("C1").unwrap().unwrap();
    assert_eq!(loaded.name, "Tech Holdings");
    assert_eq!(loaded.location, "Austin, TX");
}

#[test]
fn empty_patch_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();
    let created = repo.create_company(&tech()).unwrap();

    let err = repo
        .update_company("C1", &CompanyPatch::default())
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::NoFieldsToUpdate(EntityKind::Company)
    ));
    assert_eq!(repo.get_company("C1").unwrap().unwrap(), created);
}

#[test]
fn update_and_delete_missing_company_return_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();

    let patch = CompanyPatch {
        name: Some("Nobody".to_string()),
        ..CompanyPatch::default()
    };
    assert!(matches!(
        repo.update_company("C3", &patch),
        Err(RepoError::NotFound {
            kind: EntityKind::Company,
            ..
        })
    ));
    assert!(matches!(
        repo.delete_company("C3"),
        Err(RepoError::NotFound { .. })
    ));
}

#[test]
fn oversized_location_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();
    repo.create_company(&tech()).unwrap();

    let patch = CompanyPatch {
        location: Some("l".repeat(200)),
        ..CompanyPatch::default()
    };
    let err = repo.update_company("C1", &patch).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::TooLong {
            field: "location",
            ..
        })
    ));
    assert_eq!(
        repo.get_company("C1").unwrap().unwrap().location,
        "San Francisco, CA"
    );
}

#[test]
fn limit_counts_characters() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();

    let name = "é".repeat(199);
    let created = repo
        .create_company(&NewCompany::new(name.clone(), "Lyon"))
        .unwrap();

    assert_eq!(repo.get_company(&created.company_id).unwrap().unwrap().name, name);
}

#[test]
fn list_companies_pages_in_insertion_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();
    for _ in 0..4 {
        repo.create_company(&global()).unwrap();
    }

    let page = repo.list_companies(&ListQuery::page(3, 2)).unwrap();
    let ids: Vec<&str> = page.iter().map(|company| company.company_id.as_str()).collect();
    assert_eq!(ids, vec!["C3", "C4"]);
}

#[test]
fn deleted_company_id_is_reused_when_it_was_the_highest() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCompanyRepository::try_new(&conn).unwrap();
    repo.create_company(&tech()).unwrap();
    repo.create_company(&global()).unwrap();

    repo.delete_company("C2").unwrap();
    assert!(repo.get_company("C2").unwrap().is_none());

    let again = repo.create_company(&global()).unwrap();
    assert_eq!(again.company_id, "C2");
}
