//! Spreadsheet CSV export to contacts.

pub mod columns;
pub mod csv;
pub mod mapper;

pub use columns::{ColumnNames, Field};
pub use mapper::MapOptions;

use crate::contact::Contact;

/// Tokenize a CSV export and map its rows, header row first.
///
/// Text with fewer than two rows yields no contacts.
pub fn parse_contacts(text: &str, options: &MapOptions) -> Vec<Contact> {
    let rows = csv::parse(text);
    match rows.split_first() {
        Some((header, data)) if !data.is_empty() => mapper::map_all(header, data, options),
        _ => Vec::new(),
    }
}
