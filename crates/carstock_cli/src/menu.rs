//! Interactive CRUD menu.
//!
//! # Responsibility
//! - Translate menu choices and typed answers into `CarService` calls.
//! - Print plain messages; storage details stay in the log files.
//!
//! # Invariants
//! - Create asks for every attribute; update treats blank answers as "keep".
//! - Numeric prompts re-ask until they get a number (or blank on update).

use crate::prompt::Prompt;
use crate::render::{car_details, car_table};
use carstock_core::model::car::{
    parse_integer, FUEL_HINTS, OWNER_HINTS, SELLER_TYPE_HINTS, TRANSMISSION_HINTS,
};
use carstock_core::{
    Backend, CarFields, CarId, CarRepository, CarService, Column, ColumnKind, FieldValue,
    ServiceError,
};
use log::info;
use std::io::{self, Write};

const MENU_ITEMS: [&str; 7] = [
    "List all cars",
    "Show a car",
    "Add a new car",
    "Update a car",
    "Delete a car",
    "Search cars",
    "Quit",
];

/// Asks which backend to use; `None` means the user chose to quit.
pub fn choose_backend(prompt: &mut impl Prompt, out: &mut impl Write) -> io::Result<Option<Backend>> {
    let items = vec!["CSV".to_string(), "SQLite".to_string(), "Quit".to_string()];
    let backend = match prompt.select("Choose the data source", &items)? {
        0 => Backend::Csv,
        1 => Backend::Sqlite,
        _ => return Ok(None),
    };
    writeln!(out, "Selected data source: {}", items[backend_index(backend)])?;
    Ok(Some(backend))
}

fn backend_index(backend: Backend) -> usize {
    match backend {
        Backend::Csv => 0,
        Backend::Sqlite => 1,
    }
}

/// Menu loop bound to one service, prompt and output.
pub struct Menu<'a, R: CarRepository, P: Prompt, W: Write> {
    service: &'a CarService<R>,
    prompt: &'a mut P,
    out: &'a mut W,
}

impl<'a, R: CarRepository, P: Prompt, W: Write> Menu<'a, R, P, W> {
    pub fn new(service: &'a CarService<R>, prompt: &'a mut P, out: &'a mut W) -> Self {
        Self {
            service,
            prompt,
            out,
        }
    }

    /// Runs until the user picks "Quit".
    pub fn run(&mut self) -> io::Result<()> {
        let items = MENU_ITEMS
            .iter()
            .map(|item| item.to_string())
            .collect::<Vec<_>>();
        loop {
            let count = self.service.count();
            if count == 0 {
                writeln!(self.out, "\n(No cars in the database yet)")?;
            } else {
                writeln!(self.out, "\n(Current number of cars: {count})")?;
            }

            match self.prompt.select("Car inventory", &items)? {
                0 => self.list()?,
                1 => self.show()?,
                2 => self.create()?,
                3 => self.update()?,
                4 => self.delete()?,
                5 => self.search()?,
                _ => {
                    writeln!(self.out, "Goodbye!")?;
                    info!("event=menu_exit module=cli status=ok");
                    return Ok(());
                }
            }
        }
    }

    fn list(&mut self) -> io::Result<()> {
        let cars = self.service.list();
        if cars.is_empty() {
            writeln!(self.out, "No cars in the database.")
        } else {
            writeln!(self.out, "{}", car_table(&cars))
        }
    }

    fn show(&mut self) -> io::Result<()> {
        let Some(id) = self.ask_identifier("show")? else {
            return Ok(());
        };
        let label = self.service.identifier_label();
        match self.service.get(id) {
            Some(car) => writeln!(self.out, "{}", car_details(&car, label)),
            None => writeln!(self.out, "No car found at {label} {id}."),
        }
    }

    fn create(&mut self) -> io::Result<()> {
        let fields = self.ask_fields(false)?;
        match self.service.create(&fields) {
            Ok(car) => writeln!(
                self.out,
                "New car added at {} {}.",
                self.service.identifier_label(),
                car.id
            ),
            Err(ServiceError::Validation(err)) => writeln!(
                self.out,
                "Incomplete data ({err}). Every field is required to add a car."
            ),
            Err(err) => writeln!(self.out, "Could not add the car: {err}"),
        }
    }

    fn update(&mut self) -> io::Result<()> {
        let Some(id) = self.ask_identifier("update")? else {
            return Ok(());
        };
        let label = self.service.identifier_label();
        let Some(current) = self.service.get(id) else {
            return writeln!(self.out, "No car found at {label} {id} to update.");
        };

        writeln!(self.out, "{}", car_details(&current, label))?;
        writeln!(self.out, "Leave a field blank to keep its value.")?;
        let fields = self.ask_fields(true)?;
        if fields.is_empty() {
            return writeln!(self.out, "No changes provided.");
        }
        match self.service.update(id, &fields) {
            Some(_) => writeln!(self.out, "Car at {label} {id} updated."),
            None => writeln!(self.out, "Could not update the car at {label} {id}."),
        }
    }

    fn delete(&mut self) -> io::Result<()> {
        let Some(id) = self.ask_identifier("delete")? else {
            return Ok(());
        };
        let label = self.service.identifier_label();
        match self.service.delete(id) {
            Some(_) => writeln!(self.out, "Car at {label} {id} deleted."),
            None => writeln!(
                self.out,
                "No car found at {label} {id}, or the deletion failed."
            ),
        }
    }

    fn search(&mut self) -> io::Result<()> {
        let attributes = self.service.search_attributes();
        if attributes.is_empty() {
            return writeln!(self.out, "No searchable attributes available.");
        }
        let labels = attributes
            .iter()
            .map(|name| match Column::parse(name) {
                Some(column) => column.label(),
                None => name.clone(),
            })
            .collect::<Vec<_>>();

        let choice = self.prompt.select("Search by", &labels)?;
        let value = self
            .prompt
            .input(&format!("Value to search for in '{}'", labels[choice]))?;

        let results = self.service.search(&attributes[choice], value.trim());
        if results.is_empty() {
            writeln!(self.out, "No car matches your search.")
        } else {
            writeln!(self.out, "{}", car_table(&results))
        }
    }

    /// Reads an identifier; `None` after printing a message when unusable.
    fn ask_identifier(&mut self, action: &str) -> io::Result<Option<CarId>> {
        let count = self.service.count();
        if count == 0 {
            writeln!(self.out, "No car to {action}.")?;
            return Ok(None);
        }

        let label = self.service.identifier_label();
        let question = match self.service.backend() {
            Backend::Csv => format!("Enter the {label} of the car to {action} (0-{})", count - 1),
            Backend::Sqlite => format!("Enter the {label} of the car to {action}"),
        };
        let answer = self.prompt.input(&question)?;
        match answer.trim().parse::<CarId>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                writeln!(self.out, "Invalid {label}. Please enter a number.")?;
                Ok(None)
            }
        }
    }

    fn ask_fields(&mut self, is_update: bool) -> io::Result<CarFields> {
        let mut fields = CarFields::new();
        for column in Column::ATTRIBUTES {
            let question = match hints(column) {
                Some(hints) => format!("{} ({})", column.label(), hints.join(", ")),
                None => column.label(),
            };
            if let Some(value) = self.ask_value(column, &question, is_update)? {
                fields.set(column, value);
            }
        }
        Ok(fields)
    }

    fn ask_value(
        &mut self,
        column: Column,
        question: &str,
        is_update: bool,
    ) -> io::Result<Option<FieldValue>> {
        loop {
            let answer = self.prompt.input(question)?;
            let trimmed = answer.trim();
            if trimmed.is_empty() && (is_update || column.kind() == ColumnKind::Text) {
                return Ok(None);
            }
            match column.kind() {
                ColumnKind::Text => return Ok(Some(FieldValue::Text(trimmed.to_string()))),
                ColumnKind::Integer => match parse_integer(column, trimmed) {
                    Ok(number) => return Ok(Some(FieldValue::Integer(number))),
                    Err(_) => writeln!(
                        self.out,
                        "Invalid {}. Please enter a number.",
                        column.label().to_lowercase()
                    )?,
                },
            }
        }
    }
}

fn hints(column: Column) -> Option<&'static [&'static str]> {
    match column {
        Column::Fuel => Some(FUEL_HINTS),
        Column::SellerType => Some(SELLER_TYPE_HINTS),
        Column::Transmission => Some(TRANSMISSION_HINTS),
        Column::Owner => Some(OWNER_HINTS),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{choose_backend, Menu};
    use crate::prompt::scripted::ScriptedPrompt;
    use carstock_core::{
        Backend, CarFields, CarRepository, CarService, Column, CsvCarRepository, CsvStore,
        SqliteCarRepository, SqliteStore,
    };

    const ADD_SWIFT: [&str; 9] = [
        "2",
        "Maruti Swift Dzire VDI",
        "2014",
        "450000",
        "145500",
        "Diesel",
        "Individual",
        "Manual",
        "First Owner",
    ];

    fn run_script<R: CarRepository>(
        service: &CarService<R>,
        answers: &[&str],
    ) -> String {
        let mut prompt = ScriptedPrompt::new(answers);
        let mut out = Vec::new();
        Menu::new(service, &mut prompt, &mut out).run().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn backend_choice_maps_to_backends() {
        let mut out = Vec::new();
        let mut prompt = ScriptedPrompt::new(&["1"]);
        assert_eq!(
            choose_backend(&mut prompt, &mut out).unwrap(),
            Some(Backend::Sqlite)
        );
        let mut prompt = ScriptedPrompt::new(&["2"]);
        assert_eq!(choose_backend(&mut prompt, &mut out).unwrap(), None);
    }

    #[test]
    fn add_then_list_on_csv() {
        let dir = tempfile::tempdir().unwrap();
        let service = CarService::new(CsvCarRepository::new(CsvStore::new(
            dir.path().join("cars.csv"),
        )));

        let mut answers = ADD_SWIFT.to_vec();
        answers.extend(["0", "6"]);
        let output = run_script(&service, &answers);

        assert!(output.contains("New car added at index 0."));
        assert!(output.contains("(Current number of cars: 1)"));
        assert!(output.contains("Maruti Swift Dzire VDI"));
        assert!(output.ends_with("Goodbye!\n"));
    }

    #[test]
    fn numeric_prompt_reasks_on_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let service = CarService::new(CsvCarRepository::new(CsvStore::new(
            dir.path().join("cars.csv"),
        )));

        let output = run_script(
            &service,
            &[
                "2", "Alto", "abc", "2010", "", "60000", "70000", "Petrol", "Individual",
                "Manual", "First Owner", "6",
            ],
        );

        assert!(output.contains("Invalid year. Please enter a number."));
        assert!(output.contains("Invalid selling price. Please enter a number."));
        assert_eq!(service.get(0).unwrap().year, Some(2010));
    }

    #[test]
    fn blank_text_on_create_reports_incomplete_data() {
        let dir = tempfile::tempdir().unwrap();
        let service = CarService::new(CsvCarRepository::new(CsvStore::new(
            dir.path().join("cars.csv"),
        )));

        let output = run_script(
            &service,
            &["2", "Alto", "2010", "60000", "70000", "", "Individual", "Manual", "First Owner", "6"],
        );

        assert!(output.contains("Incomplete data (missing required field `fuel`)"));
        assert_eq!(service.count(), 0);
    }

    #[test]
    fn update_keeps_blank_fields_on_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let service = CarService::new(SqliteCarRepository::new(SqliteStore::new(
            dir.path().join("cars.sqlite3"),
        )));
        let car = service
            .create(
                &CarFields::from_pairs([
                    ("name", "Beta"),
                    ("year", "2019"),
                    ("selling_price", "500000"),
                    ("km_driven", "1000"),
                    ("fuel", "Petrol"),
                    ("seller_type", "Dealer"),
                    ("transmission", "Manual"),
                    ("owner", "First Owner"),
                ])
                .unwrap(),
            )
            .unwrap();

        let id = car.id.to_string();
        let output = run_script(
            &service,
            &["3", &id, "", "", "480000", "", "", "", "", "Second Owner", "6"],
        );

        assert!(output.contains(&format!("Car at ID {id} updated.")));
        let updated = service.get(car.id).unwrap();
        assert_eq!(updated.selling_price, Some(480_000));
        assert_eq!(updated.owner.as_deref(), Some("Second Owner"));
        assert_eq!(updated.name, "Beta");
    }

    #[test]
    fn search_and_delete_by_position() {
        let dir = tempfile::tempdir().unwrap();
        let service = CarService::new(CsvCarRepository::new(CsvStore::new(
            dir.path().join("cars.csv"),
        )));
        for name in ["Alpha", "Beta"] {
            service
                .repo()
                .create(&CarFields::new().with_text(Column::Name, name));
        }

        let output = run_script(&service, &["5", "0", "pha", "4", "0", "1", "9", "6"]);

        assert!(output.contains("Alpha"));
        assert!(output.contains("Car at index 0 deleted."));
        assert!(output.contains("No car found at index 9."));
        assert_eq!(service.get(0).unwrap().name, "Beta");
    }

    #[test]
    fn invalid_identifier_prints_message() {
        let dir = tempfile::tempdir().unwrap();
        let service = CarService::new(CsvCarRepository::new(CsvStore::new(
            dir.path().join("cars.csv"),
        )));
        service
            .repo()
            .create(&CarFields::new().with_text(Column::Name, "Alpha"));

        let output = run_script(&service, &["1", "first", "6"]);
        assert!(output.contains("Invalid index. Please enter a number."));
    }
}
