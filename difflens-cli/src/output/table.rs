//! Table output formatting using the `tabled` crate

use super::OutputConfig;
use tabled::{
    builder::Builder,
    settings::{object::Columns, style::Style, Alignment, Modify, Width},
};

/// Table output formatter
pub struct TableOutput;

impl TableOutput {
    /// Format a simple key-value table
    pub fn format_key_value(pairs: &[(&str, String)], config: &OutputConfig) -> String {
        let mut builder = Builder::default();

        for (key, value) in pairs {
            builder.push_record([*key, value.as_str()]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());
        table.with(Modify::new(Columns::first()).with(Alignment::right()));

        if config.should_truncate() {
            table.with(Width::wrap(config.effective_width()));
        }

        table.to_string()
    }

    /// Create a simple table from rows of strings
    pub fn from_rows(headers: &[&str], rows: &[Vec<String>], config: &OutputConfig) -> String {
        if rows.is_empty() {
            return "(no results)".to_string();
        }

        let mut builder = Builder::default();
        builder.push_record(headers.iter().copied());

        for row in rows {
            builder.push_record(row.iter().map(|s| s.as_str()));
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        if config.should_truncate() {
            table.with(Width::wrap(config.effective_width()));
        }

        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[test]
    fn test_key_value_table() {
        let pairs = vec![
            ("API", "orders-api".to_string()),
            ("Files changed", "2".to_string()),
        ];

        let config = OutputConfig::new(OutputFormat::Table);
        let output = TableOutput::format_key_value(&pairs, &config);

        assert!(output.contains("Files changed"));
        assert!(output.contains("orders-api"));
    }

    #[test]
    fn test_from_rows() {
        let headers = vec!["Path", "Severity"];
        let rows = vec![
            vec!["a.xml".to_string(), "LOW".to_string()],
            vec!["b.java".to_string(), "NONE".to_string()],
        ];

        let config = OutputConfig::new(OutputFormat::Table).without_truncation();
        let output = TableOutput::from_rows(&headers, &rows, &config);

        assert!(output.contains("Path"));
        assert!(output.contains("Severity"));
        assert!(output.contains("a.xml"));
        assert!(output.contains("NONE"));
    }

    #[test]
    fn test_empty_rows() {
        let config = OutputConfig::new(OutputFormat::Table);
        assert_eq!(TableOutput::from_rows(&["Path"], &[], &config), "(no results)");
    }
}
