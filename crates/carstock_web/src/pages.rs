//! HTML pages.
//!
//! # Invariants
//! - Every record value and user-supplied string passes through `escape`.

use carstock_core::{Car, Column};

pub(crate) fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n\
         <body>\n<h1>{title}</h1>\n{body}\n<p><a href=\"/\">Back to inventory</a></p>\n</body>\n</html>\n",
        title = escape(title)
    )
}

fn cell(car: &Car, column: Column) -> String {
    escape(&car.value_text(column).unwrap_or_default())
}

fn car_rows(cars: &[Car], identifier_label: &str) -> String {
    if cars.is_empty() {
        return "<p>No cars found.</p>".to_string();
    }

    let mut html = format!("<table>\n<tr><th>{}</th>", escape(identifier_label));
    for column in Column::ATTRIBUTES {
        html.push_str(&format!("<th>{}</th>", escape(&column.label())));
    }
    html.push_str("</tr>\n");

    for car in cars {
        html.push_str(&format!(
            "<tr><td><a href=\"/cars/{id}\">{id}</a></td>",
            id = car.id
        ));
        for column in Column::ATTRIBUTES {
            html.push_str(&format!("<td>{}</td>", cell(car, column)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>");
    html
}

fn field_inputs(car: Option<&Car>) -> String {
    let mut html = String::new();
    for column in Column::ATTRIBUTES {
        let placeholder = car.map(|car| cell(car, column)).unwrap_or_default();
        html.push_str(&format!(
            "<label>{label} <input name=\"{name}\" placeholder=\"{placeholder}\"></label><br>\n",
            label = escape(&column.label()),
            name = column.as_str(),
        ));
    }
    html
}

fn search_form(attributes: &[String]) -> String {
    let mut options = String::new();
    for attribute in attributes {
        options.push_str(&format!(
            "<option value=\"{value}\">{value}</option>",
            value = escape(attribute)
        ));
    }
    format!(
        "<form method=\"get\" action=\"/search\">\n<select name=\"attribute\">{options}</select>\n\
         <input name=\"value\">\n<button type=\"submit\">Search</button>\n</form>"
    )
}

/// Inventory listing with the create and search forms.
pub fn index_page(cars: &[Car], attributes: &[String], identifier_label: &str) -> String {
    let body = format!(
        "<p>{count} car(s)</p>\n{table}\n<h2>Search</h2>\n{search}\n<h2>Add a car</h2>\n\
         <form method=\"post\" action=\"/cars\">\n{inputs}<button type=\"submit\">Add</button>\n</form>",
        count = cars.len(),
        table = car_rows(cars, identifier_label),
        search = search_form(attributes),
        inputs = field_inputs(None),
    );
    layout("Car inventory", &body)
}

/// One car with its update and delete forms.
pub fn detail_page(car: &Car, identifier_label: &str) -> String {
    let mut details = String::from("<dl>\n");
    for column in Column::ATTRIBUTES {
        details.push_str(&format!(
            "<dt>{}</dt><dd>{}</dd>\n",
            escape(&column.label()),
            cell(car, column)
        ));
    }
    details.push_str("</dl>");

    let body = format!(
        "{details}\n<h2>Update</h2>\n<p>Leave a field blank to keep its value.</p>\n\
         <form method=\"post\" action=\"/cars/{id}\">\n{inputs}<button type=\"submit\">Save</button>\n</form>\n\
         <form method=\"post\" action=\"/cars/{id}/delete\"><button type=\"submit\">Delete</button></form>",
        id = car.id,
        inputs = field_inputs(Some(car)),
    );
    let label = match identifier_label.chars().next() {
        Some(first) => first.to_uppercase().chain(identifier_label.chars().skip(1)).collect(),
        None => String::new(),
    };
    layout(&format!("{label} {}: {}", car.id, car.name), &body)
}

pub fn search_page(attribute: &str, value: &str, cars: &[Car], identifier_label: &str) -> String {
    let body = format!(
        "<p>Results for <code>{}</code> matching <code>{}</code></p>\n{}",
        escape(attribute),
        escape(value),
        car_rows(cars, identifier_label)
    );
    layout("Search results", &body)
}

/// Plain message page used for errors.
pub fn message_page(title: &str, message: &str) -> String {
    layout(title, &format!("<p>{}</p>", escape(message)))
}

#[cfg(test)]
mod tests {
    use super::{detail_page, escape, index_page, message_page};
    use carstock_core::Car;

    #[test]
    fn escape_replaces_markup() {
        assert_eq!(
            escape("<b>\"O'Brien\" & co</b>"),
            "&lt;b&gt;&quot;O&#39;Brien&quot; &amp; co&lt;/b&gt;"
        );
    }

    #[test]
    fn record_values_are_escaped() {
        let car = Car {
            name: "<script>alert(1)</script>".to_string(),
            ..Car::empty(2)
        };

        let page = index_page(&[car.clone()], &["name".to_string()], "index");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));

        let detail = detail_page(&car, "ID");
        assert!(detail.contains("<title>ID 2: &lt;script&gt;"));
        assert!(detail.contains("action=\"/cars/2/delete\""));
    }

    #[test]
    fn empty_listing_says_so() {
        let page = index_page(&[], &[], "ID");
        assert!(page.contains("No cars found."));
        assert!(page.contains("action=\"/cars\""));
    }

    #[test]
    fn message_page_escapes_text() {
        assert!(message_page("Not found", "no <car>").contains("no &lt;car&gt;"));
    }
}
