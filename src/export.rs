//! CSV export of combined records.
//!
//! Two columns, `Name,Number`, one row per record in combined order.
//! UTF-8 throughout; a byte-order mark is prepended by default so
//! spreadsheet software detects the encoding.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::record::Record;

/// CSV header row.
const CSV_HEADER: [&str; 2] = ["Name", "Number"];

/// UTF-8 byte-order mark.
const BOM: &str = "\u{FEFF}";

/// Conventional output filename.
pub const DEFAULT_CSV_FILENAME: &str = "leaderboard_data_combined.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub byte_order_mark: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            byte_order_mark: true,
        }
    }
}

/// Quotes a field when it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn write_row(out: &mut String, fields: &[&str]) {
    let row = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&row);
    out.push('\n');
}

/// Serializes records to CSV bytes. Absent values become empty fields.
pub fn to_csv(records: &[Record], options: &CsvOptions) -> Vec<u8> {
    let mut out = String::new();
    if options.byte_order_mark {
        out.push_str(BOM);
    }

    write_row(&mut out, &CSV_HEADER);
    for record in records {
        let score = record.score().map(|s| s.to_string()).unwrap_or_default();
        write_row(&mut out, &[record.name().unwrap_or_default(), score.as_str()]);
    }

    out.into_bytes()
}

/// Writes the CSV to `output_path`, replacing any existing file.
pub fn write_csv(records: &[Record], options: &CsvOptions, output_path: &Path) -> Result<()> {
    let bytes = to_csv(records, options);

    let mut file = File::create(output_path)
        .context(format!("Failed to create CSV file: {}", output_path.display()))?;

    file.write_all(&bytes).context("Failed to write CSV data")?;

    Ok(())
}
