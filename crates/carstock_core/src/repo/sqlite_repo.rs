//! SQLite-backed car repository.
//!
//! # Responsibility
//! - Provide the repository contract over the single `cars` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Column names in SQL text come only from the `Column` allow-list.
//! - Every attribute value is a bound parameter.
//! - Identifiers are auto-assigned and never recycled.
//! - One connection per operation; update/delete are read-then-write.
//! - Text search folds case with `str::to_lowercase`, as the CSV backend does.

use super::{degrade, Backend, CarRepository, RepoResult};
use crate::model::car::{
    parse_integer_text, Car, CarFields, CarId, Column, ColumnKind, FieldValue,
};
use crate::store::{SqliteStore, LOWER_FN};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const CAR_SELECT_SQL: &str = "SELECT
    id,
    name,
    year,
    selling_price,
    km_driven,
    fuel,
    seller_type,
    transmission,
    owner
FROM cars";

/// Repository over the SQLite `cars` table.
#[derive(Debug, Clone)]
pub struct SqliteCarRepository {
    store: SqliteStore,
}

impl SqliteCarRepository {
    pub fn new(store: SqliteStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    fn try_create(&self, fields: &CarFields) -> RepoResult<Option<Car>> {
        let conn = self.store.connect()?;
        let columns = Column::ATTRIBUTES
            .iter()
            .map(|column| column.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=Column::ATTRIBUTES.len())
            .map(|index| format!("?{index}"))
            .collect::<Vec<_>>()
            .join(", ");
        let values = Column::ATTRIBUTES
            .iter()
            .map(|column| match fields.get(*column) {
                Some(value) => bind_value(*column, value),
                // name is NOT NULL; a missing name is stored empty.
                None if *column == Column::Name => Value::Text(String::new()),
                None => Value::Null,
            })
            .collect::<Vec<_>>();

        conn.execute(
            &format!("INSERT INTO cars ({columns}) VALUES ({placeholders});"),
            params_from_iter(values),
        )?;
        let id = conn.last_insert_rowid();
        info!("event=car_create module=repo status=ok backend=sqlite id={id}");

        fetch_car(&conn, id)
    }

    fn try_get_all(&self) -> RepoResult<Vec<Car>> {
        let conn = self.store.connect()?;
        query_cars(&conn, &format!("{CAR_SELECT_SQL} ORDER BY id ASC;"), [])
    }

    fn try_get_by_id(&self, id: CarId) -> RepoResult<Option<Car>> {
        let conn = self.store.connect()?;
        fetch_car(&conn, id)
    }

    fn try_update(&self, id: CarId, fields: &CarFields) -> RepoResult<Option<Car>> {
        let conn = self.store.connect()?;
        let Some(existing) = fetch_car(&conn, id)? else {
            warn!("event=car_update module=repo status=not_found backend=sqlite id={id}");
            return Ok(None);
        };
        if fields.is_empty() {
            return Ok(Some(existing));
        }

        let mut assignments = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len() + 1);
        for (index, (column, value)) in fields.iter().enumerate() {
            assignments.push(format!("{} = ?{}", column.as_str(), index + 1));
            values.push(bind_value(column, value));
        }
        values.push(Value::Integer(id));

        conn.execute(
            &format!(
                "UPDATE cars SET {} WHERE id = ?{};",
                assignments.join(", "),
                values.len()
            ),
            params_from_iter(values),
        )?;
        info!(
            "event=car_update module=repo status=ok backend=sqlite id={id} fields={}",
            fields.len()
        );

        fetch_car(&conn, id)
    }

    fn try_delete(&self, id: CarId) -> RepoResult<Option<Car>> {
        let conn = self.store.connect()?;
        let Some(existing) = fetch_car(&conn, id)? else {
            warn!("event=car_delete module=repo status=not_found backend=sqlite id={id}");
            return Ok(None);
        };

        conn.execute("DELETE FROM cars WHERE id = ?1;", params![id])?;
        info!("event=car_delete module=repo status=ok backend=sqlite id={id}");
        Ok(Some(existing))
    }

    fn try_search(&self, attribute: &str, value: &str) -> RepoResult<Vec<Car>> {
        let Some(column) = Column::parse(attribute) else {
            warn!("event=car_search module=repo status=ignored backend=sqlite reason=unknown_attribute attribute={attribute}");
            return Ok(Vec::new());
        };

        let conn = self.store.connect()?;
        match column.kind() {
            ColumnKind::Integer => {
                let Some(number) = parse_integer_text(value) else {
                    warn!("event=car_search module=repo status=rejected backend=sqlite reason=invalid_number attribute={attribute}");
                    return Ok(Vec::new());
                };
                query_cars(
                    &conn,
                    &format!(
                        "{CAR_SELECT_SQL} WHERE {} = ?1 ORDER BY id ASC;",
                        column.as_str()
                    ),
                    params![number],
                )
            }
            // Missing values search as empty text, the way CSV cells do.
            ColumnKind::Text => query_cars(
                &conn,
                &format!(
                    "{CAR_SELECT_SQL} WHERE instr({LOWER_FN}(ifnull({}, '')), ?1) > 0 ORDER BY id ASC;",
                    column.as_str()
                ),
                params![value.to_lowercase()],
            ),
        }
    }
}

impl CarRepository for SqliteCarRepository {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn create(&self, fields: &CarFields) -> Option<Car> {
        degrade(Backend::Sqlite, "create", self.try_create(fields), None)
    }

    fn get_all(&self) -> Vec<Car> {
        degrade(Backend::Sqlite, "get_all", self.try_get_all(), Vec::new())
    }

    fn get_by_id(&self, id: CarId) -> Option<Car> {
        degrade(Backend::Sqlite, "get_by_id", self.try_get_by_id(id), None)
    }

    fn update(&self, id: CarId, fields: &CarFields) -> Option<Car> {
        degrade(Backend::Sqlite, "update", self.try_update(id, fields), None)
    }

    fn delete(&self, id: CarId) -> Option<Car> {
        degrade(Backend::Sqlite, "delete", self.try_delete(id), None)
    }

    fn search(&self, attribute: &str, value: &str) -> Vec<Car> {
        degrade(
            Backend::Sqlite,
            "search",
            self.try_search(attribute, value),
            Vec::new(),
        )
    }

    fn search_attributes(&self) -> Vec<String> {
        Column::ALL
            .iter()
            .map(|column| column.as_str().to_string())
            .collect()
    }
}

fn fetch_car(conn: &Connection, id: CarId) -> RepoResult<Option<Car>> {
    let car = conn
        .query_row(
            &format!("{CAR_SELECT_SQL} WHERE id = ?1;"),
            params![id],
            parse_car_row,
        )
        .optional()?;
    Ok(car)
}

fn query_cars(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Car>> {
    let mut stmt = conn.prepare(sql)?;
    let cars = stmt
        .query_map(params, parse_car_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(cars)
}

fn parse_car_row(row: &Row<'_>) -> rusqlite::Result<Car> {
    Ok(Car {
        id: row.get("id")?,
        name: row.get("name")?,
        year: row.get("year")?,
        selling_price: row.get("selling_price")?,
        km_driven: row.get("km_driven")?,
        fuel: row.get("fuel")?,
        seller_type: row.get("seller_type")?,
        transmission: row.get("transmission")?,
        owner: row.get("owner")?,
    })
}

fn bind_value(column: Column, value: &FieldValue) -> Value {
    match column.kind() {
        ColumnKind::Integer => value.as_integer().map_or(Value::Null, Value::Integer),
        ColumnKind::Text => Value::Text(value.to_cell()),
    }
}
