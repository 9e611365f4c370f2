//! Canonicalize command - show the canonical form of a single line

use colored::Colorize;
use difflens_core::xml::{canonicalize, try_canonicalize};
use serde::Serialize;

use crate::output::{CsvOutput, Output, OutputConfig, OutputFormat, Outputter};

#[derive(Debug, Serialize)]
pub struct CanonicalForm {
    pub input: String,
    pub canonical: String,
    /// Whether the line parsed as XML
    pub parsed: bool,
    /// Why parsing failed, when it was attempted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CanonicalForm {
    pub fn new(line: &str, xml_mode: bool) -> Self {
        let trimmed = line.trim();
        let reason = if xml_mode && !trimmed.is_empty() {
            try_canonicalize(trimmed).err().map(|e| e.to_string())
        } else {
            None
        };

        Self {
            input: line.to_string(),
            canonical: canonicalize(line, xml_mode),
            parsed: xml_mode && !trimmed.is_empty() && reason.is_none(),
            reason,
        }
    }
}

impl Outputter for CanonicalForm {
    fn to_table(&self, _config: &OutputConfig) -> String {
        let mut output = self.canonical.clone();
        if let Some(reason) = &self.reason {
            output.push_str(&format!("\n{} {}", "literal:".yellow(), reason.dimmed()));
        }
        output
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        CsvOutput::from_rows(
            &["input", "canonical", "parsed"],
            &[vec![
                self.input.clone(),
                self.canonical.clone(),
                self.parsed.to_string(),
            ]],
        )
    }
}

/// Run the canonicalize command
pub fn run(line: &str, no_xml: bool, format: OutputFormat) -> anyhow::Result<()> {
    Output::new(CanonicalForm::new(line, !no_xml), format).render()
}
