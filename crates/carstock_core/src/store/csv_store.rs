//! Whole-file CSV table store.
//!
//! # Responsibility
//! - Read the full car CSV file (header + rows) into memory.
//! - Rewrite the full file from memory.
//!
//! # Invariants
//! - A missing file loads as an empty table with the default car header.
//! - Columns the application does not know are carried through unchanged.
//! - Saves go through a sibling temp file and a rename.

use super::StoreResult;
use crate::model::car::Column;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use log::{debug, error, info, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// In-memory copy of one CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn with_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Empty table with the eight car attribute columns.
    pub fn for_cars() -> Self {
        Self::with_headers(Column::ATTRIBUTES.iter().map(|column| column.as_str()))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|values| values.get(column))
            .map(String::as_str)
    }

    /// Returns the index of `name`, appending an empty column when absent.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    /// Appends a row, padding or truncating it to the header width.
    pub fn push_row(&mut self, mut values: Vec<String>) -> usize {
        values.resize(self.headers.len(), String::new());
        self.rows.push(values);
        self.rows.len() - 1
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: String) -> bool {
        match self.rows.get_mut(row).and_then(|values| values.get_mut(column)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// Removes a row; later rows shift down by one position.
    pub fn remove_row(&mut self, row: usize) -> Option<Vec<String>> {
        if row < self.rows.len() {
            Some(self.rows.remove(row))
        } else {
            None
        }
    }
}

/// Accessor for one CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole table.
    ///
    /// # Errors
    /// - I/O failures other than a missing file.
    /// - Malformed CSV content.
    pub fn load(&self) -> StoreResult<CsvTable> {
        let started_at = Instant::now();
        let mut reader = match ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::Headers)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(err) if is_not_found(&err) => {
                warn!(
                    "event=csv_load module=store status=missing path={}",
                    self.path.display()
                );
                return Ok(CsvTable::for_cars());
            }
            Err(err) => {
                error!(
                    "event=csv_load module=store status=error path={} error={}",
                    self.path.display(),
                    err
                );
                return Err(err.into());
            }
        };

        let headers = reader
            .headers()?
            .iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        let mut table = if headers.is_empty() {
            CsvTable::for_cars()
        } else {
            CsvTable::with_headers(headers)
        };

        for record in reader.records() {
            let record = record?;
            table.push_row(record.iter().map(str::to_string).collect());
        }

        debug!(
            "event=csv_load module=store status=ok rows={} duration_ms={}",
            table.len(),
            started_at.elapsed().as_millis()
        );
        Ok(table)
    }

    /// Rewrites the whole file from `table`.
    pub fn save(&self, table: &CsvTable) -> StoreResult<()> {
        let started_at = Instant::now();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = temp_path_for(&self.path);
        let result = write_table(&temp_path, table)
            .and_then(|()| fs::rename(&temp_path, &self.path).map_err(Into::into));

        match result {
            Ok(()) => {
                info!(
                    "event=csv_save module=store status=ok rows={} duration_ms={}",
                    table.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                let _ = fs::remove_file(&temp_path);
                error!(
                    "event=csv_save module=store status=error path={} error={}",
                    self.path.display(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn write_table(path: &Path, table: &CsvTable) -> StoreResult<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(table.headers())?;
    for row in table.rows() {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn is_not_found(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(io) if io.kind() == ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::{CsvStore, CsvTable};

    #[test]
    fn missing_file_loads_default_header() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("absent.csv"));

        let table = store.load().unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers()[0], "name");
        assert_eq!(table.headers().len(), 8);
    }

    #[test]
    fn save_then_load_keeps_extra_columns() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("nested").join("cars.csv"));

        let mut table = CsvTable::with_headers(["name", "colour"]);
        table.push_row(vec!["Swift, VDI".to_string(), "red".to_string()]);
        store.save(&table).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn short_rows_are_padded_to_header_width() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        std::fs::write(&path, "name,year,fuel\nAlto,2010\n").unwrap();

        let table = CsvStore::new(&path).load().unwrap();
        assert_eq!(table.rows()[0], vec!["Alto", "2010", ""]);
    }

    #[test]
    fn remove_row_shifts_later_rows() {
        let mut table = CsvTable::with_headers(["name"]);
        table.push_row(vec!["a".to_string()]);
        table.push_row(vec!["b".to_string()]);
        table.push_row(vec!["c".to_string()]);

        assert_eq!(table.remove_row(0), Some(vec!["a".to_string()]));
        assert_eq!(table.cell(0, 0), Some("b"));
        assert_eq!(table.remove_row(5), None);
    }

    #[test]
    fn ensure_column_pads_existing_rows() {
        let mut table = CsvTable::with_headers(["name"]);
        table.push_row(vec!["a".to_string()]);

        let index = table.ensure_column("owner");
        assert_eq!(index, 1);
        assert_eq!(table.cell(0, 1), Some(""));
        assert_eq!(table.ensure_column("name"), 0);
    }
}
