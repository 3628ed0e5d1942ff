//! Car domain model.
//!
//! # Responsibility
//! - Define the logical `Car` record shared by every storage backend.
//! - Own the column allow-list used for updates and dynamic search SQL.
//! - Parse raw `(key, value)` input into typed `CarFields`.
//!
//! # Invariants
//! - `Column` is the only source of column names that may reach SQL text.
//! - `id` is never part of `CarFields`; identifiers are assigned by storage.
//! - Enumerated attributes (fuel, seller type, ...) are free text.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Record identifier.
///
/// Row position for the CSV backend, surrogate key for the SQLite backend.
pub type CarId = i64;

/// Suggested values for the `fuel` attribute.
pub const FUEL_HINTS: &[&str] = &["Petrol", "Diesel", "CNG", "LPG", "Electric"];
/// Suggested values for the `seller_type` attribute.
pub const SELLER_TYPE_HINTS: &[&str] = &["Individual", "Dealer", "Trustmark Dealer"];
/// Suggested values for the `transmission` attribute.
pub const TRANSMISSION_HINTS: &[&str] = &["Manual", "Automatic"];
/// Suggested values for the `owner` attribute.
pub const OWNER_HINTS: &[&str] = &[
    "First Owner",
    "Second Owner",
    "Third Owner",
    "Fourth & Above Owner",
    "Test Drive Car",
];

/// Storage type of a column, used to pick the search matching policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Text,
}

/// Closed allow-list of car columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Id,
    Name,
    Year,
    SellingPrice,
    KmDriven,
    Fuel,
    SellerType,
    Transmission,
    Owner,
}

impl Column {
    /// Every column, in canonical order.
    pub const ALL: [Column; 9] = [
        Column::Id,
        Column::Name,
        Column::Year,
        Column::SellingPrice,
        Column::KmDriven,
        Column::Fuel,
        Column::SellerType,
        Column::Transmission,
        Column::Owner,
    ];

    /// Attribute columns a caller must supply on create (everything but `id`).
    pub const ATTRIBUTES: [Column; 8] = [
        Column::Name,
        Column::Year,
        Column::SellingPrice,
        Column::KmDriven,
        Column::Fuel,
        Column::SellerType,
        Column::Transmission,
        Column::Owner,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Year => "year",
            Column::SellingPrice => "selling_price",
            Column::KmDriven => "km_driven",
            Column::Fuel => "fuel",
            Column::SellerType => "seller_type",
            Column::Transmission => "transmission",
            Column::Owner => "owner",
        }
    }

    /// Resolves a column from its storage name. Matching is exact.
    pub fn parse(name: &str) -> Option<Column> {
        Column::ALL
            .into_iter()
            .find(|column| column.as_str() == name)
    }

    pub fn kind(self) -> ColumnKind {
        match self {
            Column::Id | Column::Year | Column::SellingPrice | Column::KmDriven => {
                ColumnKind::Integer
            }
            Column::Name
            | Column::Fuel
            | Column::SellerType
            | Column::Transmission
            | Column::Owner => ColumnKind::Text,
        }
    }

    /// Human label for prompts, e.g. `selling_price` -> `Selling price`.
    pub fn label(self) -> String {
        let spaced = self.as_str().replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

impl FieldValue {
    /// Renders the value the way it is written to a CSV cell.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Integer(value) => value.to_string(),
            FieldValue::Text(value) => value.clone(),
        }
    }

    /// Integer view of the value; text is parsed leniently.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            FieldValue::Text(text) => parse_integer_text(text),
        }
    }
}

/// Input validation failure reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField(Column),
    InvalidNumber { column: Column, value: String },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(column) => write!(f, "missing required field `{column}`"),
            Self::InvalidNumber { column, value } => {
                write!(f, "`{value}` is not a valid number for `{column}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Attribute mapping passed to create/update.
///
/// Only attribute columns can be present; `id` and unknown keys are dropped
/// while building.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarFields {
    values: BTreeMap<Column, FieldValue>,
}

impl CarFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds fields from raw string pairs.
    ///
    /// Unknown keys and `id` are ignored. Blank values are skipped so a form
    /// can leave a field untouched.
    ///
    /// # Errors
    /// - `InvalidNumber` when an integer column holds non-numeric text.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, ValidationError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut fields = Self::new();
        for (key, value) in pairs {
            fields.insert_raw(key.as_ref(), value.as_ref())?;
        }
        Ok(fields)
    }

    /// Inserts one raw value, returning whether the key was accepted.
    pub fn insert_raw(&mut self, key: &str, raw: &str) -> Result<bool, ValidationError> {
        let Some(column) = Column::parse(key.trim()) else {
            warn!("event=fields_parse module=model status=ignored reason=unknown_key key={key}");
            return Ok(false);
        };
        if column == Column::Id {
            warn!("event=fields_parse module=model status=ignored reason=immutable_key key=id");
            return Ok(false);
        }
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(false);
        }
        let value = match column.kind() {
            ColumnKind::Integer => FieldValue::Integer(parse_integer(column, trimmed)?),
            ColumnKind::Text => FieldValue::Text(trimmed.to_string()),
        };
        self.values.insert(column, value);
        Ok(true)
    }

    pub fn with_text(mut self, column: Column, value: impl Into<String>) -> Self {
        self.set(column, FieldValue::Text(value.into()));
        self
    }

    pub fn with_integer(mut self, column: Column, value: i64) -> Self {
        self.set(column, FieldValue::Integer(value));
        self
    }

    /// Sets a value; writes to `id` are ignored.
    pub fn set(&mut self, column: Column, value: FieldValue) {
        if column != Column::Id {
            self.values.insert(column, value);
        }
    }

    pub fn get(&self, column: Column) -> Option<&FieldValue> {
        self.values.get(&column)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &FieldValue)> {
        self.values.iter().map(|(column, value)| (*column, value))
    }

    /// Checks that every attribute column is present.
    pub fn require_complete(&self) -> Result<(), ValidationError> {
        match Column::ATTRIBUTES
            .into_iter()
            .find(|column| !self.values.contains_key(column))
        {
            Some(missing) => Err(ValidationError::MissingField(missing)),
            None => Ok(()),
        }
    }
}

/// Logical car record returned by every repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: CarId,
    pub name: String,
    pub year: Option<i64>,
    pub selling_price: Option<i64>,
    pub km_driven: Option<i64>,
    pub fuel: Option<String>,
    pub seller_type: Option<String>,
    pub transmission: Option<String>,
    pub owner: Option<String>,
}

impl Car {
    /// Creates an empty record with the given identifier.
    pub fn empty(id: CarId) -> Self {
        Self {
            id,
            name: String::new(),
            year: None,
            selling_price: None,
            km_driven: None,
            fuel: None,
            seller_type: None,
            transmission: None,
            owner: None,
        }
    }

    /// Builds a record from fields; absent attributes stay empty.
    pub fn from_fields(id: CarId, fields: &CarFields) -> Self {
        let mut car = Self::empty(id);
        car.apply(fields);
        car
    }

    /// Overwrites the attributes present in `fields`.
    pub fn apply(&mut self, fields: &CarFields) {
        for (column, value) in fields.iter() {
            match (column, value) {
                (Column::Name, FieldValue::Text(text)) => self.name = text.clone(),
                (Column::Name, FieldValue::Integer(number)) => self.name = number.to_string(),
                (Column::Year, value) => self.year = value.as_integer(),
                (Column::SellingPrice, value) => self.selling_price = value.as_integer(),
                (Column::KmDriven, value) => self.km_driven = value.as_integer(),
                (Column::Fuel, value) => self.fuel = Some(value.to_cell()),
                (Column::SellerType, value) => self.seller_type = Some(value.to_cell()),
                (Column::Transmission, value) => self.transmission = Some(value.to_cell()),
                (Column::Owner, value) => self.owner = Some(value.to_cell()),
                (Column::Id, _) => {}
            }
        }
    }

    /// Returns the attribute value of `column` as display text.
    pub fn value_text(&self, column: Column) -> Option<String> {
        match column {
            Column::Id => Some(self.id.to_string()),
            Column::Name => Some(self.name.clone()),
            Column::Year => self.year.map(|value| value.to_string()),
            Column::SellingPrice => self.selling_price.map(|value| value.to_string()),
            Column::KmDriven => self.km_driven.map(|value| value.to_string()),
            Column::Fuel => self.fuel.clone(),
            Column::SellerType => self.seller_type.clone(),
            Column::Transmission => self.transmission.clone(),
            Column::Owner => self.owner.clone(),
        }
    }
}

/// Parses integer input, accepting whole floats such as `2017.0`.
pub fn parse_integer(column: Column, raw: &str) -> Result<i64, ValidationError> {
    parse_integer_text(raw).ok_or_else(|| ValidationError::InvalidNumber {
        column,
        value: raw.to_string(),
    })
}

pub(crate) fn parse_integer_text(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    // Spreadsheet exports write whole numbers as `2017.0`.
    let (whole, fraction) = trimmed.split_once('.')?;
    if fraction.is_empty() || !fraction.bytes().all(|byte| byte == b'0') {
        return None;
    }
    whole.parse::<i64>().ok()
}
