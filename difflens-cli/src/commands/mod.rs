//! Command implementations for difflens CLI
//!
//! Each command module provides a `run` function that executes the command logic.

pub mod analyze;
pub mod canonicalize;
pub mod classify;
pub mod completions;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use difflens_core::Severity;
use std::io::Read;
use std::path::Path;

/// Read a file, or stdin when the path is `-`.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Read a newline-separated pattern file. Blank lines are dropped.
pub(crate) fn read_pattern_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read pattern file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Patterns from an optional pattern file followed by repeated flags.
pub(crate) fn extra_patterns(
    flags: &[String],
    file: Option<&Path>,
) -> anyhow::Result<Vec<String>> {
    let mut patterns = match file {
        Some(path) => read_pattern_file(path)?,
        None => Vec::new(),
    };
    patterns.extend(flags.iter().cloned());
    Ok(patterns)
}

/// Severity label colored by urgency.
pub(crate) fn severity_label(severity: Severity) -> ColoredString {
    match severity {
        Severity::None => severity.as_str().dimmed(),
        Severity::Low => severity.as_str().green(),
        Severity::Medium => severity.as_str().yellow(),
        Severity::Critical => severity.as_str().red().bold(),
    }
}
