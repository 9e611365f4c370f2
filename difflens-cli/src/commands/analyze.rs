//! Analyze command - classify a whole repository comparison
//!
//! Reads one compare payload for the code repository and, optionally, one
//! for the configuration repository, then reports which files carry real
//! changes and how severe they are.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use difflens_core::types::SeveritySummary;
use difflens_core::{
    analyze, AnalysisRequest, AnalysisResult, ComparePayload, DiffEntry, FileChange, Severity,
};
use serde::Serialize;

use super::{extra_patterns, read_input, severity_label};
use crate::config::DifflensConfig;
use crate::output::{CsvOutput, Output, OutputConfig, OutputFormat, Outputter, TableOutput};

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Compare payload of the code repository (JSON, `-` for stdin)
    #[arg(long, value_name = "FILE")]
    pub code: PathBuf,

    /// Compare payload of the configuration repository (JSON)
    #[arg(long, value_name = "FILE")]
    pub config_diff: Option<PathBuf>,

    /// Name of the API or service under review
    #[arg(long, default_value = "")]
    pub api_name: String,

    /// Branch being merged
    #[arg(long, default_value = "")]
    pub source_branch: String,

    /// Branch being merged into
    #[arg(long, default_value = "")]
    pub target_branch: String,

    /// Code repository identifier, echoed into the report
    #[arg(long)]
    pub code_repo: Option<String>,

    /// Configuration repository identifier, echoed into the report
    #[arg(long)]
    pub config_repo: Option<String>,

    /// Skip files whose path matches (repeatable, `regex:` prefix for regex)
    #[arg(long = "ignore-file", value_name = "PATTERN")]
    pub ignore_files: Vec<String>,

    /// Ignore changed lines that match (repeatable, `regex:` prefix for regex)
    #[arg(long = "ignore-content", value_name = "PATTERN")]
    pub ignore_content: Vec<String>,

    /// File with one file-ignore pattern per line
    #[arg(long, value_name = "FILE")]
    pub ignore_patterns_file: Option<PathBuf>,

    /// File with one content-ignore pattern per line
    #[arg(long, value_name = "FILE")]
    pub content_patterns_file: Option<PathBuf>,

    /// Treat XML attribute reordering as a format-only change
    #[arg(long)]
    pub xml_attribute_order: bool,

    /// Exit with an error when any code file reaches this severity
    #[arg(long, value_name = "SEVERITY")]
    pub fail_on: Option<Severity>,
}

/// Analysis result as printed by the CLI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub generated_at: DateTime<Utc>,
    pub summary: SeveritySummary,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

impl AnalysisReport {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            generated_at: Utc::now(),
            summary: result.summary(),
            result,
        }
    }
}

/// Short status word for a file.
fn status(change: &FileChange) -> &'static str {
    if change.error.is_some() {
        "error"
    } else if change.is_new_file {
        "new"
    } else if change.is_deleted_file {
        "deleted"
    } else if change.is_renamed_file {
        "renamed"
    } else {
        "modified"
    }
}

impl Outputter for AnalysisReport {
    fn to_table(&self, config: &OutputConfig) -> String {
        let result = &self.result;
        let mut output = String::new();

        let title = if result.api_name.is_empty() {
            "difflens".to_string()
        } else {
            result.api_name.clone()
        };
        output.push_str(&format!("{}", title.cyan().bold()));
        if !result.source_branch.is_empty() || !result.target_branch.is_empty() {
            output.push_str(&format!(
                " {} {} {}",
                result.source_branch.yellow(),
                "->".dimmed(),
                result.target_branch.yellow()
            ));
        }
        output.push_str("\n\n");

        let rows: Vec<Vec<String>> = result
            .file_changes
            .iter()
            .map(|c| {
                vec![
                    c.path.clone(),
                    c.file_type.as_str().to_string(),
                    status(c).to_string(),
                    format!("+{} -{}", c.additions, c.deletions),
                    c.valid_changed_lines.to_string(),
                    c.ignored_lines.to_string(),
                    c.severity.as_str().to_string(),
                ]
            })
            .collect();
        output.push_str(&TableOutput::from_rows(
            &["Path", "Type", "Status", "Lines", "Valid", "Ignored", "Severity"],
            &rows,
            config,
        ));
        output.push_str("\n\n");

        let highest = self
            .summary
            .highest()
            .map(|s| severity_label(s).to_string())
            .unwrap_or_else(|| "-".to_string());
        let pairs = vec![
            ("Files changed", result.total_files_changed.to_string()),
            ("Code", result.code_changes_count.to_string()),
            ("Config", result.config_changes_count.to_string()),
            ("Ignored files", result.ignored_files.len().to_string()),
            ("Valid lines", result.total_valid_lines().to_string()),
            ("Ignored lines", result.total_ignored_lines().to_string()),
        ];
        output.push_str(&TableOutput::format_key_value(&pairs, config));
        output.push_str(&format!("\n{} {}", "Highest severity:".cyan(), highest));

        if !result.ignored_files.is_empty() {
            output.push_str(&format!("\n\n{}\n", "Ignored files:".cyan().bold()));
            for path in &result.ignored_files {
                output.push_str(&format!("  {}\n", path.dimmed()));
            }
        }

        let errors: Vec<&FileChange> = result
            .file_changes
            .iter()
            .filter(|c| c.error.is_some())
            .collect();
        if !errors.is_empty() {
            output.push_str(&format!("\n\n{}\n", "Errors:".red().bold()));
            for change in errors {
                output.push_str(&format!(
                    "  {} {}\n",
                    change.path,
                    change.error.as_deref().unwrap_or_default().red()
                ));
            }
        }

        output.trim_end().to_string()
    }

    fn to_csv(&self, _config: &OutputConfig) -> String {
        let rows: Vec<Vec<String>> = self
            .result
            .file_changes
            .iter()
            .map(|c| {
                vec![
                    c.path.clone(),
                    c.old_path.clone().unwrap_or_default(),
                    c.file_type.as_str().to_string(),
                    status(c).to_string(),
                    c.additions.to_string(),
                    c.deletions.to_string(),
                    c.valid_changed_lines.to_string(),
                    c.ignored_lines.to_string(),
                    c.severity.as_str().to_string(),
                    c.error.clone().unwrap_or_default(),
                ]
            })
            .collect();

        CsvOutput::from_rows(
            &[
                "path",
                "old_path",
                "type",
                "status",
                "additions",
                "deletions",
                "valid",
                "ignored",
                "severity",
                "error",
            ],
            &rows,
        )
    }
}

fn load_entries(path: &Path) -> anyhow::Result<Vec<DiffEntry>> {
    let json = read_input(path)?;
    let payload = ComparePayload::from_json(&json)
        .with_context(|| format!("{} is not a compare payload", path.display()))?;
    Ok(payload.into_entries())
}

/// Build the engine request from flags layered over the config file.
pub fn build_request(
    args: &AnalyzeArgs,
    config: &DifflensConfig,
) -> anyhow::Result<AnalysisRequest> {
    let config_from_stdin = args
        .config_diff
        .as_deref()
        .is_some_and(|p| p.as_os_str() == "-");
    if args.code.as_os_str() == "-" && config_from_stdin {
        bail!("Only one of --code and --config-diff can read from stdin");
    }

    let file_extra = extra_patterns(&args.ignore_files, args.ignore_patterns_file.as_deref())?;
    let content_extra =
        extra_patterns(&args.ignore_content, args.content_patterns_file.as_deref())?;

    Ok(AnalysisRequest {
        api_name: args.api_name.clone(),
        code_repo: args.code_repo.clone(),
        config_repo: args.config_repo.clone(),
        source_branch: args.source_branch.clone(),
        target_branch: args.target_branch.clone(),
        code_diffs: load_entries(&args.code)?,
        config_diffs: args.config_diff.as_deref().map(load_entries).transpose()?,
        file_patterns: config.file_patterns(&file_extra),
        content_patterns: config.content_patterns(&content_extra),
        ignore_attribute_order: args.xml_attribute_order || config.ignore_attribute_order(),
    })
}

/// Run the analyze command
pub fn run(
    args: &AnalyzeArgs,
    config: &DifflensConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let request = build_request(args, config)?;
    let result = analyze(&request)?;

    let report = AnalysisReport::new(result);
    let breach = args
        .fail_on
        .zip(report.summary.highest())
        .filter(|(threshold, highest)| highest >= threshold);

    Output::new(report, format).render()?;

    if let Some((threshold, highest)) = breach {
        bail!(
            "Highest severity {} reached the --fail-on threshold {}",
            highest,
            threshold
        );
    }
    Ok(())
}
