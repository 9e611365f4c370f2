//! Classify command - explain the verdict for every line of one diff body

use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use difflens_core::xml::is_xml_path;
use difflens_core::{explain_body, LineCounts, PatternSet, Severity, Verdict};
use serde::Serialize;

use super::{extra_patterns, read_input, severity_label};
use crate::config::DifflensConfig;
use crate::output::{
    truncate, CsvOutput, Output, OutputConfig, OutputFormat, Outputter, TableOutput,
};

#[derive(Debug, Args)]
pub struct ClassifyArgs {
    /// Unified diff body of a single file (`-` for stdin)
    pub diff: PathBuf,

    /// Repository path of the file; decides whether XML matching applies
    /// (defaults to the diff file name)
    #[arg(long)]
    pub path: Option<String>,

    /// Ignore changed lines that match (repeatable, `regex:` prefix for regex)
    #[arg(long = "ignore-content", value_name = "PATTERN")]
    pub ignore_content: Vec<String>,

    /// File with one content-ignore pattern per line
    #[arg(long, value_name = "FILE")]
    pub content_patterns_file: Option<PathBuf>,

    /// Treat XML attribute reordering as a format-only change
    #[arg(long)]
    pub xml_attribute_order: bool,
}

/// One changed line and what happened to it.
#[derive(Debug, Serialize)]
pub struct LineReport {
    pub kind: &'static str,
    #[serde(skip)]
    pub marker: char,
    pub verdict: Verdict,
    /// First content pattern that matched, for `pattern` verdicts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyReport {
    pub path: String,
    pub xml_mode: bool,
    #[serde(flatten)]
    pub counts: LineCounts,
    pub severity: Severity,
    pub lines: Vec<LineReport>,
}

impl ClassifyReport {
    pub fn new(
        body: &str,
        path: &str,
        patterns: &PatternSet,
        ignore_attribute_order: bool,
    ) -> Self {
        let mut counts = LineCounts::default();
        let lines = explain_body(body, path, patterns, ignore_attribute_order)
            .into_iter()
            .map(|(line, verdict)| {
                counts.record(&line, verdict);
                let pattern = match verdict {
                    Verdict::Pattern => patterns.find(&line.trimmed).map(|p| p.source()),
                    _ => None,
                };
                LineReport {
                    kind: line.kind.as_str(),
                    marker: line.kind.marker(),
                    verdict,
                    pattern,
                    text: line.raw,
                }
            })
            .collect();

        Self {
            path: path.to_string(),
            xml_mode: ignore_attribute_order && is_xml_path(path),
            severity: counts.severity(),
            counts,
            lines,
        }
    }
}

impl Outputter for ClassifyReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let mut output = format!("{}", self.path.cyan().bold());
        if self.xml_mode {
            output.push_str(&format!(" {}", "(xml-aware)".dimmed()));
        }
        output.push_str("\n\n");

        // Leave room for the marker, verdict and pattern columns
        let text_width = config.effective_width().saturating_sub(40).max(20);
        let rows: Vec<Vec<String>> = self
            .lines
            .iter()
            .map(|line| {
                let text = if config.should_truncate() {
                    truncate(&line.text, text_width)
                } else {
                    line.text.clone()
                };
                vec![
                    line.marker.to_string(),
                    line.verdict.as_str().to_string(),
                    line.pattern.clone().unwrap_or_default(),
                    text,
                ]
            })
            .collect();
        output.push_str(&TableOutput::from_rows(
            &["", "Verdict", "Pattern", "Line"],
            &rows,
            config,
        ));
        output.push_str("\n\n");

        let pairs = vec![
            ("Additions", self.counts.additions.to_string()),
            ("Deletions", self.counts.deletions.to_string()),
            ("Valid", self.counts.valid.to_string()),
            ("Ignored", self.counts.ignored.to_string()),
            ("Format-only", self.counts.format_only.to_string()),
        ];
        output.push_str(&TableOutput::format_key_value(&pairs, config));
        output.push_str(&format!(
            "\n{} {}",
            "Severity:".cyan(),
            severity_label(self.severity)
        ));
        output
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        let rows: Vec<Vec<String>> = self
            .lines
            .iter()
            .map(|line| {
                vec![
                    line.kind.to_string(),
                    line.verdict.as_str().to_string(),
                    line.pattern.clone().unwrap_or_default(),
                    line.text.clone(),
                ]
            })
            .collect();
        CsvOutput::from_rows(&["kind", "verdict", "pattern", "text"], &rows)
    }
}

/// Run the classify command
pub fn run(
    args: &ClassifyArgs,
    config: &DifflensConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let body = read_input(&args.diff)?;
    let path = args
        .path
        .clone()
        .unwrap_or_else(|| args.diff.display().to_string());

    let extra = extra_patterns(&args.ignore_content, args.content_patterns_file.as_deref())?;
    let patterns = PatternSet::from_entries(config.content_patterns(&extra))?;
    let toggle = args.xml_attribute_order || config.ignore_attribute_order();

    Output::new(ClassifyReport::new(&body, &path, &patterns, toggle), format).render()
}
