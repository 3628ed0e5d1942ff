//! CSV-backed car repository.
//!
//! # Responsibility
//! - Map CSV rows to `Car` records by header name.
//! - Run every operation as load snapshot, operate, persist snapshot.
//!
//! # Invariants
//! - A record identifier is its zero-based row position.
//! - Deleting row k shifts every later row down by one position.
//! - Updates only touch columns present in the file header.

use super::{degrade, Backend, CarRepository, RepoResult, SearchPredicate};
use crate::model::car::{parse_integer_text, Car, CarFields, CarId, Column};
use crate::store::{CsvStore, CsvTable};
use log::{info, warn};

/// Repository over one CSV file.
#[derive(Debug, Clone)]
pub struct CsvCarRepository {
    store: CsvStore,
}

impl CsvCarRepository {
    pub fn new(store: CsvStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &CsvStore {
        &self.store
    }

    fn try_create(&self, fields: &CarFields) -> RepoResult<Option<Car>> {
        let mut table = self.store.load()?;
        let mut values = Vec::new();
        for (column, value) in fields.iter() {
            let index = table.ensure_column(column.as_str());
            values.push((index, value.to_cell()));
        }

        let row = table.push_row(Vec::new());
        for (index, value) in values {
            table.set_cell(row, index, value);
        }

        self.store.save(&table)?;
        info!("event=car_create module=repo status=ok backend=csv position={row}");
        Ok(HeaderLayout::of(&table).car_at(&table, row))
    }

    fn try_get_all(&self) -> RepoResult<Vec<Car>> {
        let table = self.store.load()?;
        let layout = HeaderLayout::of(&table);
        Ok((0..table.len())
            .filter_map(|row| layout.car_at(&table, row))
            .collect())
    }

    fn try_get_by_id(&self, id: CarId) -> RepoResult<Option<Car>> {
        let table = self.store.load()?;
        Ok(position_of(id, &table).and_then(|row| HeaderLayout::of(&table).car_at(&table, row)))
    }

    fn try_update(&self, id: CarId, fields: &CarFields) -> RepoResult<Option<Car>> {
        let mut table = self.store.load()?;
        let Some(row) = position_of(id, &table) else {
            warn!("event=car_update module=repo status=not_found backend=csv position={id}");
            return Ok(None);
        };

        for (column, value) in fields.iter() {
            match table.column_index(column.as_str()) {
                Some(index) => {
                    table.set_cell(row, index, value.to_cell());
                }
                None => warn!(
                    "event=car_update module=repo status=skipped backend=csv reason=unknown_column column={column}"
                ),
            }
        }

        if !fields.is_empty() {
            self.store.save(&table)?;
            info!("event=car_update module=repo status=ok backend=csv position={row}");
        }
        Ok(HeaderLayout::of(&table).car_at(&table, row))
    }

    fn try_delete(&self, id: CarId) -> RepoResult<Option<Car>> {
        let mut table = self.store.load()?;
        let Some(row) = position_of(id, &table) else {
            warn!("event=car_delete module=repo status=not_found backend=csv position={id}");
            return Ok(None);
        };

        let snapshot = HeaderLayout::of(&table).car_at(&table, row);
        table.remove_row(row);
        self.store.save(&table)?;
        info!("event=car_delete module=repo status=ok backend=csv position={row}");
        Ok(snapshot)
    }

    fn try_search(&self, attribute: &str, value: &str) -> RepoResult<Vec<Car>> {
        let table = self.store.load()?;
        let Some(index) = table.column_index(attribute) else {
            warn!("event=car_search module=repo status=ignored backend=csv reason=unknown_attribute attribute={attribute}");
            return Ok(Vec::new());
        };

        let kind = Column::parse(attribute).map(Column::kind);
        let Some(predicate) = SearchPredicate::new(kind, value) else {
            warn!("event=car_search module=repo status=ignored backend=csv reason=invalid_number attribute={attribute}");
            return Ok(Vec::new());
        };

        let layout = HeaderLayout::of(&table);
        Ok((0..table.len())
            .filter(|row| predicate.matches(table.cell(*row, index).unwrap_or_default()))
            .filter_map(|row| layout.car_at(&table, row))
            .collect())
    }
}

impl CarRepository for CsvCarRepository {
    fn backend(&self) -> Backend {
        Backend::Csv
    }

    fn create(&self, fields: &CarFields) -> Option<Car> {
        degrade(Backend::Csv, "create", self.try_create(fields), None)
    }

    fn get_all(&self) -> Vec<Car> {
        degrade(Backend::Csv, "get_all", self.try_get_all(), Vec::new())
    }

    fn get_by_id(&self, id: CarId) -> Option<Car> {
        degrade(Backend::Csv, "get_by_id", self.try_get_by_id(id), None)
    }

    fn update(&self, id: CarId, fields: &CarFields) -> Option<Car> {
        degrade(Backend::Csv, "update", self.try_update(id, fields), None)
    }

    fn delete(&self, id: CarId) -> Option<Car> {
        degrade(Backend::Csv, "delete", self.try_delete(id), None)
    }

    fn search(&self, attribute: &str, value: &str) -> Vec<Car> {
        degrade(
            Backend::Csv,
            "search",
            self.try_search(attribute, value),
            Vec::new(),
        )
    }

    fn search_attributes(&self) -> Vec<String> {
        degrade(
            Backend::Csv,
            "search_attributes",
            self.store
                .load()
                .map(|table| table.headers().to_vec())
                .map_err(Into::into),
            Vec::new(),
        )
    }
}

/// Header positions of the known car columns in one table.
struct HeaderLayout {
    indices: Vec<(Column, usize)>,
}

impl HeaderLayout {
    fn of(table: &CsvTable) -> Self {
        let indices = Column::ATTRIBUTES
            .into_iter()
            .filter_map(|column| {
                table
                    .column_index(column.as_str())
                    .map(|index| (column, index))
            })
            .collect();
        Self { indices }
    }

    fn car_at(&self, table: &CsvTable, row: usize) -> Option<Car> {
        if row >= table.len() {
            return None;
        }
        let mut car = Car::empty(CarId::try_from(row).ok()?);
        for (column, index) in &self.indices {
            let cell = table.cell(row, *index).unwrap_or_default().trim();
            let text = (!cell.is_empty()).then(|| cell.to_string());
            match column {
                Column::Name => car.name = cell.to_string(),
                Column::Year => car.year = parse_integer_text(cell),
                Column::SellingPrice => car.selling_price = parse_integer_text(cell),
                Column::KmDriven => car.km_driven = parse_integer_text(cell),
                Column::Fuel => car.fuel = text,
                Column::SellerType => car.seller_type = text,
                Column::Transmission => car.transmission = text,
                Column::Owner => car.owner = text,
                Column::Id => {}
            }
        }
        Some(car)
    }
}

fn position_of(id: CarId, table: &CsvTable) -> Option<usize> {
    usize::try_from(id).ok().filter(|row| *row < table.len())
}

#[cfg(test)]
mod tests {
    use super::CsvCarRepository;
    use crate::model::car::{CarFields, Column};
    use crate::repo::CarRepository;
    use crate::store::CsvStore;

    #[test]
    fn update_skips_columns_missing_from_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cars.csv");
        std::fs::write(&path, "name,year\nAlto,2010\n").unwrap();
        let repo = CsvCarRepository::new(CsvStore::new(&path));

        let updated = repo
            .update(
                0,
                &CarFields::new()
                    .with_integer(Column::Year, 2012)
                    .with_text(Column::Fuel, "Petrol"),
            )
            .unwrap();

        assert_eq!(updated.year, Some(2012));
        assert_eq!(updated.fuel, None);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "name,year\nAlto,2012\n"
        );
    }

    #[test]
    fn negative_position_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvCarRepository::new(CsvStore::new(dir.path().join("cars.csv")));
        repo.create(&CarFields::new().with_text(Column::Name, "Alto"))
            .unwrap();

        assert!(repo.get_by_id(-1).is_none());
        assert!(repo.delete(-1).is_none());
    }

    #[test]
    fn unreadable_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = CsvCarRepository::new(CsvStore::new(dir.path()));

        assert!(repo.get_all().is_empty());
        assert!(repo.get_by_id(0).is_none());
        assert!(repo.search("name", "x").is_empty());
    }
}
