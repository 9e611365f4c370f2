//! Line classification for a single file.

use serde::{Deserialize, Serialize};

use crate::diff::{parse_diff_body, DiffLine};
use crate::matcher::mark_format_only;
use crate::patterns::PatternSet;
use crate::types::Severity;
use crate::xml::is_xml_path;

/// Per-file line counts.
///
/// `valid + ignored == additions + deletions` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounts {
    pub additions: usize,
    pub deletions: usize,
    pub valid: usize,
    pub ignored: usize,
    /// Lines ignored because they were half of a format-only pair
    pub format_only: usize,
}

impl LineCounts {
    pub fn severity(&self) -> Severity {
        Severity::from_valid_lines(self.valid)
    }

    pub fn total(&self) -> usize {
        self.additions + self.deletions
    }

    /// Tally one line under its verdict.
    pub fn record(&mut self, line: &DiffLine, verdict: Verdict) {
        if line.is_added() {
            self.additions += 1;
        } else {
            self.deletions += 1;
        }

        match verdict {
            Verdict::FormatOnly => {
                self.ignored += 1;
                self.format_only += 1;
            }
            Verdict::Pattern => self.ignored += 1,
            Verdict::Valid => self.valid += 1,
        }
    }
}

/// Why a changed line was or was not counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Half of a reorder-only pair
    FormatOnly,
    /// Matched a content ignore pattern
    Pattern,
    /// Counts as a real change
    Valid,
}

impl Verdict {
    /// Decide a single, already-matched line.
    pub fn of(line: &DiffLine, patterns: &PatternSet) -> Self {
        if line.format_only {
            Verdict::FormatOnly
        } else if patterns.is_match(&line.trimmed) {
            Verdict::Pattern
        } else {
            Verdict::Valid
        }
    }

    pub fn is_ignored(&self) -> bool {
        !matches!(self, Verdict::Valid)
    }

    /// Same spelling as the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::FormatOnly => "format_only",
            Verdict::Pattern => "pattern",
            Verdict::Valid => "valid",
        }
    }
}

/// Count valid and ignored lines among already-matched diff lines.
///
/// Format-only lines are ignored outright; the rest are ignored when any
/// content pattern matches their trimmed text.
pub fn classify_lines(lines: &[DiffLine], patterns: &PatternSet) -> LineCounts {
    let mut counts = LineCounts::default();

    for line in lines {
        counts.record(line, Verdict::of(line, patterns));
    }

    counts
}

/// Parse a body and run XML-aware pairing when it applies.
fn matched_lines(
    body: &str,
    path: &str,
    ignore_attribute_order: bool,
) -> (Vec<DiffLine>, bool, usize) {
    let xml_mode = ignore_attribute_order && is_xml_path(path);
    let mut lines = parse_diff_body(body);
    let pairs = mark_format_only(&mut lines, xml_mode);
    (lines, xml_mode, pairs)
}

/// Per-line verdicts for a diff body, in diff order.
pub fn explain_body(
    body: &str,
    path: &str,
    patterns: &PatternSet,
    ignore_attribute_order: bool,
) -> Vec<(DiffLine, Verdict)> {
    let (lines, _, _) = matched_lines(body, path, ignore_attribute_order);
    lines
        .into_iter()
        .map(|line| {
            let verdict = Verdict::of(&line, patterns);
            (line, verdict)
        })
        .collect()
}

/// Classify the diff body of one file.
///
/// XML-aware pairing runs only when `ignore_attribute_order` is set and the
/// path ends in `.xml`.
pub fn classify_body(
    body: &str,
    path: &str,
    patterns: &PatternSet,
    ignore_attribute_order: bool,
) -> LineCounts {
    let (lines, xml_mode, pairs) = matched_lines(body, path, ignore_attribute_order);
    let counts = classify_lines(&lines, patterns);

    tracing::debug!(
        path,
        xml_mode,
        pairs,
        valid = counts.valid,
        ignored = counts.ignored,
        "classified file"
    );
    counts
}
