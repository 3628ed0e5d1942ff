//! Plain-text rendering of car records.

use carstock_core::{Car, Column};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct CarRow {
    #[tabled(rename = "#")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Year")]
    year: String,
    #[tabled(rename = "Selling price")]
    selling_price: String,
    #[tabled(rename = "Km driven")]
    km_driven: String,
    #[tabled(rename = "Fuel")]
    fuel: String,
    #[tabled(rename = "Seller type")]
    seller_type: String,
    #[tabled(rename = "Transmission")]
    transmission: String,
    #[tabled(rename = "Owner")]
    owner: String,
}

impl From<&Car> for CarRow {
    fn from(car: &Car) -> Self {
        let text = |column: Column| car.value_text(column).unwrap_or_default();
        Self {
            id: car.id,
            name: car.name.clone(),
            year: text(Column::Year),
            selling_price: text(Column::SellingPrice),
            km_driven: text(Column::KmDriven),
            fuel: text(Column::Fuel),
            seller_type: text(Column::SellerType),
            transmission: text(Column::Transmission),
            owner: text(Column::Owner),
        }
    }
}

/// Renders cars as a table.
pub fn car_table(cars: &[Car]) -> String {
    Table::new(cars.iter().map(CarRow::from)).to_string()
}

/// Renders one car as `Label: value` lines, led by its identifier.
pub fn car_details(car: &Car, identifier_label: &str) -> String {
    let mut lines = vec![format!("{}: {}", capitalize(identifier_label), car.id)];
    for column in Column::ATTRIBUTES {
        lines.push(format!(
            "{}: {}",
            column.label(),
            car.value_text(column).unwrap_or_default()
        ));
    }
    lines.join("\n")
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
