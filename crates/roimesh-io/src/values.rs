//! ROI value tables.
//!
//! A value table is a delimited text file with one label and one number per
//! row. The first row may be a header naming the columns:
//!
//! ```text
//! roi,overlap
//! 1,0.20
//! 2,0.80
//! ```
//!
//! Recognized header names (case-insensitive):
//!
//! | Column | Names                                          |
//! |--------|------------------------------------------------|
//! | label  | `label`, `roi`, `region`, `id`, `index`        |
//! | value  | `value`, `score`, `overlap`, `weight`, `magnitude` |
//!
//! Without a matching header the first two columns are used. A first row
//! that parses as numbers is kept as data. Rows that are too short or hold a
//! non-numeric field or a zero label are skipped one by one. Commas
//! separate fields unless the first line contains a tab and no comma.

use std::io::BufRead;
use std::path::Path;

use roimesh_core::{Label, ValueTable};
use tracing::{debug, trace};

use crate::IoResult;

/// Header names that identify the label column.
pub const LABEL_ALIASES: [&str; 5] = ["label", "roi", "region", "id", "index"];

/// Header names that identify the value column.
pub const VALUE_ALIASES: [&str; 5] = ["value", "score", "overlap", "weight", "magnitude"];

/// Reads a value table from a file. See the module docs for the format.
///
/// An unparseable file yields an empty table, not an error; only I/O and
/// encoding failures are errors.
pub fn read<P: AsRef<Path>>(path: P) -> IoResult<ValueTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let table = parse(std::io::BufReader::new(file))?;
    debug!(path = %path.display(), rows = table.len(), "read value table");
    Ok(table)
}

/// Parses a value table from a reader.
pub fn parse<R: BufRead>(reader: R) -> IoResult<ValueTable> {
    let mut lines = reader.lines();
    let mut table = ValueTable::new();

    let first = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => return Ok(table),
        }
    };
    let first = first.strip_prefix('\u{feff}').unwrap_or(&first).to_string();
    let delimiter = if first.contains('\t') && !first.contains(',') { '\t' } else { ',' };

    let header = split_record(&first, delimiter);
    let (label_col, value_col) = detect_columns(&header);
    trace!(label_col, value_col, delimiter = ?delimiter, "value table columns");

    // The header row counts as data when it parses.
    if let Some((label, value)) = parse_row(&header, label_col, value_col) {
        table.insert(label, value);
    }

    for (n, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields = split_record(&line, delimiter);
        if fields.len() < 2 {
            trace!(line = n + 2, "short row skipped");
            continue;
        }
        match parse_row(&fields, label_col, value_col) {
            Some((label, value)) => table.insert(label, value),
            None => trace!(line = n + 2, "malformed row skipped"),
        }
    }
    Ok(table)
}

/// Label and value column indices for a header row; the last alias match wins.
pub fn detect_columns<S: AsRef<str>>(header: &[S]) -> (usize, usize) {
    let mut label_col = 0;
    let mut value_col = 1;
    for (i, name) in header.iter().enumerate() {
        let name = name.as_ref().trim().to_ascii_lowercase();
        if LABEL_ALIASES.contains(&name.as_str()) {
            label_col = i;
        }
        if VALUE_ALIASES.contains(&name.as_str()) {
            value_col = i;
        }
    }
    (label_col, value_col)
}

fn parse_row(fields: &[String], label_col: usize, value_col: usize) -> Option<(Label, f64)> {
    let label: f64 = fields.get(label_col)?.trim().parse().ok()?;
    let value: f64 = fields.get(value_col)?.trim().parse().ok()?;
    Some((Label::from_value(label)?, value))
}

/// Splits one record, honoring double-quoted fields with `""` escapes.
fn split_record(line: &str, delimiter: char) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            c if c == delimiter && !quoted => fields.push(std::mem::take(&mut field)),
            c => field.push(c),
        }
    }
    fields.push(field);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(text: &str) -> ValueTable {
        parse(text.as_bytes()).unwrap()
    }

    #[test]
    fn header_aliases_pick_columns() {
        let t = parse_str("name,Overlap,ROI\nputamen,0.5,3\ncaudate,0.25,4\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.get(Label(3.0)), Some(0.5));
        assert_eq!(t.get(Label(4.0)), Some(0.25));
    }

    #[test]
    fn numeric_first_row_is_data() {
        let t = parse_str("1,0.2\n2,0.8\n");
        assert_eq!(t.get(Label(1.0)), Some(0.2));
        assert_eq!(t.get(Label(2.0)), Some(0.8));
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let t = parse_str("label,value\n1,0.5\n2\n3,abc\n0,1.0\nx,2\n5,0.75\n");
        let got: Vec<_> = t.iter().collect();
        assert_eq!(got, vec![(Label(1.0), 0.5), (Label(5.0), 0.75)]);
    }

    #[test]
    fn fractional_labels_are_keys() {
        let t = parse_str("label,value\n1.5,0.25\n2,0.75\n");
        assert_eq!(t.get(Label(1.5)), Some(0.25));
        assert_eq!(t.get(Label(2.0)), Some(0.75));
    }

    #[test]
    fn tab_separated_and_bom() {
        let t = parse_str("\u{feff}region\tscore\n10\t1.5\n11\t-2\n");
        assert_eq!(t.get(Label(10.0)), Some(1.5));
        assert_eq!(t.get(Label(11.0)), Some(-2.0));
    }

    #[test]
    fn quoted_fields() {
        let t = parse_str("\"id\",\"weight\"\n\"7\",\"0.125\"\n");
        assert_eq!(t.get(Label(7.0)), Some(0.125));
        assert_eq!(split_record("a,\"b,\"\"c\"\"\",d", ','), vec!["a", "b,\"c\"", "d"]);
    }

    #[test]
    fn nothing_valid_gives_empty_table() {
        assert!(parse_str("").is_empty());
        assert!(parse_str("label,value\nfoo,bar\n").is_empty());
    }

    #[test]
    fn duplicate_label_keeps_last() {
        let t = parse_str("1,0.1\n1,0.9\n");
        assert_eq!(t.get(Label(1.0)), Some(0.9));
    }

    #[test]
    fn read_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.csv");
        std::fs::write(&path, "roi,value\n1,0.2\n2,0.8\n").unwrap();
        let t = read(&path).unwrap();
        assert_eq!(t.min_max(), Some((0.2, 0.8)));
    }
}
