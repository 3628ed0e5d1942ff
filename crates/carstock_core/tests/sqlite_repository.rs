use carstock_core::{CarFields, CarRepository, Column, SqliteCarRepository, SqliteStore};
use rusqlite::Connection;

fn named(name: &str) -> CarFields {
    CarFields::new()
        .with_text(Column::Name, name)
        .with_integer(Column::Year, 2020)
        .with_integer(Column::SellingPrice, 500_000)
        .with_integer(Column::KmDriven, 1_000)
        .with_text(Column::Fuel, "Petrol")
        .with_text(Column::SellerType, "Dealer")
        .with_text(Column::Transmission, "Manual")
        .with_text(Column::Owner, "First Owner")
}

#[test]
fn alpha_beta_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteCarRepository::new(SqliteStore::new(dir.path().join("cars.sqlite3")));

    let alpha = repo.create(&named("Alpha")).unwrap();
    let beta = repo.create(&named("Beta")).unwrap();

    assert_eq!(repo.search("name", "pha"), vec![alpha.clone()]);
    assert_eq!(repo.get_all(), vec![alpha.clone(), beta.clone()]);

    repo.delete(alpha.id).unwrap();
    let remaining = repo.get_all();
    assert_eq!(remaining, vec![beta.clone()]);
    assert_eq!(remaining[0].id, beta.id);
    assert!(repo.get_by_id(alpha.id).is_none());
}

#[test]
fn deleted_ids_are_never_reused() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteCarRepository::new(SqliteStore::new(dir.path().join("cars.sqlite3")));

    let first = repo.create(&named("First")).unwrap();
    repo.delete(first.id).unwrap();
    let second = repo.create(&named("Second")).unwrap();

    assert!(second.id > first.id);
    assert!(repo.get_by_id(first.id).is_none());
}

#[test]
fn data_persists_across_repository_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cars.sqlite3");

    let created = SqliteCarRepository::new(SqliteStore::new(&path))
        .create(&named("Persisted"))
        .unwrap();
    let reopened = SqliteCarRepository::new(SqliteStore::new(&path));

    assert_eq!(reopened.get_by_id(created.id), Some(created));
}

#[test]
fn update_writes_bound_values_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cars.sqlite3");
    let repo = SqliteCarRepository::new(SqliteStore::new(&path));
    let car = repo.create(&named("Quote")).unwrap();

    let tricky = "O'Brien\"; DROP TABLE cars; --";
    let updated = repo
        .update(car.id, &CarFields::new().with_text(Column::Owner, tricky))
        .unwrap();
    assert_eq!(updated.owner.as_deref(), Some(tricky));

    let conn = Connection::open(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM cars;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn search_attributes_include_id() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteCarRepository::new(SqliteStore::new(dir.path().join("cars.sqlite3")));

    let attributes = repo.search_attributes();
    assert_eq!(attributes.first().map(String::as_str), Some("id"));
    assert_eq!(attributes.len(), 9);
}
