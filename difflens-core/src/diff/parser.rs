//! Diff body parsing.

use serde::{Deserialize, Serialize};

/// Prefixes of header lines that never count as content, even though some of
/// them start with `+` or `-`.
const HEADER_PREFIXES: &[&str] = &["+++", "---", "diff --git", "index "];

/// Direction of a changed line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineKind {
    Added,
    Removed,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Added => "added",
            LineKind::Removed => "removed",
        }
    }

    /// Diff marker for this direction.
    pub fn marker(&self) -> char {
        match self {
            LineKind::Added => '+',
            LineKind::Removed => '-',
        }
    }
}

/// A single added or removed line of a diff body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffLine {
    /// Added or removed
    pub kind: LineKind,

    /// Line content with the marker stripped
    pub raw: String,

    /// `raw` with surrounding whitespace trimmed
    pub trimmed: String,

    /// Set by the semantic matcher when the line is one half of a
    /// reorder-only pair
    pub format_only: bool,
}

impl DiffLine {
    /// Create a line from its content (marker already stripped).
    pub fn new(kind: LineKind, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
            trimmed: raw.trim().to_string(),
            format_only: false,
        }
    }

    pub fn is_added(&self) -> bool {
        self.kind == LineKind::Added
    }

    pub fn is_removed(&self) -> bool {
        self.kind == LineKind::Removed
    }
}

/// Check whether a line is diff envelope noise.
fn is_header(line: &str) -> bool {
    HEADER_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
}

/// Split a diff body into its added and removed lines, in encounter order.
///
/// Context lines, hunk headers (`@@ ... @@`), blank lines and anything else
/// without a `+`/`-` marker are dropped.
pub fn parse_diff_body(body: &str) -> Vec<DiffLine> {
    body.lines()
        .filter(|line| !is_header(line))
        .filter_map(|line| {
            if let Some(rest) = line.strip_prefix('-') {
                Some(DiffLine::new(LineKind::Removed, rest))
            } else {
                line.strip_prefix('+')
                    .map(|rest| DiffLine::new(LineKind::Added, rest))
            }
        })
        .collect()
}
