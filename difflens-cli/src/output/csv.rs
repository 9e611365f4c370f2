//! CSV output formatting for data export.

/// CSV output formatter
pub struct CsvOutput;

impl CsvOutput {
    /// Format a header row followed by one row per record.
    pub fn from_rows(headers: &[&str], rows: &[Vec<String>]) -> String {
        let mut output = headers.join(",");

        for row in rows {
            output.push('\n');
            let cells: Vec<String> = row.iter().map(|cell| Self::escape_value(cell)).collect();
            output.push_str(&cells.join(","));
        }

        output
    }

    /// Escape a string value for CSV
    ///
    /// Wraps in quotes if the value contains comma, newline, or quote.
    /// Doubles any existing quotes.
    pub fn escape_value(s: &str) -> String {
        if s.contains(',') || s.contains('\n') || s.contains('\r') || s.contains('"') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}
