//! Lenient CSV tokenizer for spreadsheet exports.
//!
//! Accepts quoted fields with doubled-quote escaping, LF or CRLF line
//! endings and raw newlines/commas inside quotes. Input is never rejected:
//! an unterminated quote simply runs to the end of the text.

const BOM: char = '\u{feff}';

/// Split CSV text into rows of cells.
///
/// Rows may have different lengths. A trailing line break does not produce
/// an extra empty row, but a final row without one is still emitted.
pub fn parse(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    cell.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                other => cell.push(other),
            }
            continue;
        }

        match ch {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut cell)),
            '\n' => {
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                row.push(std::mem::take(&mut cell));
                rows.push(std::mem::take(&mut row));
            }
            // lone carriage return
            '\r' => {}
            other => cell.push(other),
        }
    }

    if !cell.is_empty() || !row.is_empty() {
        row.push(cell);
        rows.push(row);
    }

    rows
}
