//! Result records produced by the engine.

use serde::{Deserialize, Serialize};

/// Valid-line count at which a file becomes MEDIUM.
pub const SEVERITY_MEDIUM_THRESHOLD: usize = 10;

/// Valid-line count at which a file becomes CRITICAL.
pub const SEVERITY_CRITICAL_THRESHOLD: usize = 50;

/// How much reviewer attention a file needs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    /// Every changed line was ignored
    #[default]
    None,
    Low,
    Medium,
    Critical,
}

impl Severity {
    /// Derive severity from the number of valid changed lines.
    pub fn from_valid_lines(valid: usize) -> Self {
        match valid {
            0 => Severity::None,
            n if n < SEVERITY_MEDIUM_THRESHOLD => Severity::Low,
            n if n < SEVERITY_CRITICAL_THRESHOLD => Severity::Medium,
            _ => Severity::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::Critical => "CRITICAL",
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "NONE" => Ok(Severity::None),
            "LOW" => Ok(Severity::Low),
            "MEDIUM" => Ok(Severity::Medium),
            "CRITICAL" => Ok(Severity::Critical),
            other => Err(format!(
                "unknown severity '{other}' (expected none, low, medium or critical)"
            )),
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which repository of the comparison a file came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    /// Primary repository, classified line by line
    #[default]
    Code,
    /// Secondary configuration repository, tallied only
    Config,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Code => "CODE",
            FileType::Config => "CONFIG",
        }
    }
}

/// Classification of one changed file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    /// New path of the file
    pub path: String,

    /// Previous path, when the host reported one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,

    #[serde(rename = "type")]
    pub file_type: FileType,

    pub is_new_file: bool,
    pub is_deleted_file: bool,
    pub is_renamed_file: bool,

    /// Hunk text prefixed with a reconstructed git header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_content: Option<String>,

    /// Number of added lines in the body
    pub additions: usize,

    /// Number of removed lines in the body
    pub deletions: usize,

    pub valid_changed_lines: usize,
    pub ignored_lines: usize,
    pub severity: Severity,

    /// Per-file failure; the rest of the run is unaffected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileChange {
    /// Create an empty change record for a path.
    pub fn new(path: impl Into<String>, file_type: FileType) -> Self {
        Self {
            path: path.into(),
            file_type,
            ..Self::default()
        }
    }

    /// Whether the file counts toward the run totals.
    ///
    /// New and deleted files always do; modified files only when at least one
    /// changed line survived classification.
    pub fn is_significant(&self) -> bool {
        self.is_new_file || self.is_deleted_file || self.valid_changed_lines > 0
    }
}

/// Files per severity, for summaries.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeveritySummary {
    pub none: usize,
    pub low: usize,
    pub medium: usize,
    pub critical: usize,
}

impl SeveritySummary {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::None => self.none += 1,
            Severity::Low => self.low += 1,
            Severity::Medium => self.medium += 1,
            Severity::Critical => self.critical += 1,
        }
    }

    /// Highest severity present, if any file was recorded.
    pub fn highest(&self) -> Option<Severity> {
        [
            (self.critical, Severity::Critical),
            (self.medium, Severity::Medium),
            (self.low, Severity::Low),
            (self.none, Severity::None),
        ]
        .into_iter()
        .find(|(count, _)| *count > 0)
        .map(|(_, severity)| severity)
    }
}

/// Aggregated outcome of one repository comparison.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub api_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_repo: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_repo: Option<String>,

    pub source_branch: String,
    pub target_branch: String,

    /// Classified files in diff order (code files first, then config files)
    pub file_changes: Vec<FileChange>,

    /// Paths skipped by file-ignore patterns
    pub ignored_files: Vec<String>,

    pub total_files_changed: usize,
    pub code_changes_count: usize,
    pub config_changes_count: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn new(
        api_name: impl Into<String>,
        source_branch: impl Into<String>,
        target_branch: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
            ..Self::default()
        }
    }

    /// Append a file and update the totals.
    ///
    /// CODE files count only when significant. CONFIG files skip line
    /// classification and count unless they carry an error.
    pub fn add_file_change(&mut self, change: FileChange) {
        let counted = match change.file_type {
            FileType::Code => change.is_significant(),
            FileType::Config => change.error.is_none(),
        };

        if counted {
            self.total_files_changed += 1;
            match change.file_type {
                FileType::Code => self.code_changes_count += 1,
                FileType::Config => self.config_changes_count += 1,
            }
        }

        self.file_changes.push(change);
    }

    /// Record a path skipped by the file-ignore patterns.
    pub fn add_ignored_file(&mut self, path: impl Into<String>) {
        self.ignored_files.push(path.into());
    }

    /// Severity counts over the CODE files.
    pub fn summary(&self) -> SeveritySummary {
        let mut summary = SeveritySummary::default();
        for change in self.code_changes() {
            summary.record(change.severity);
        }
        summary
    }

    pub fn code_changes(&self) -> impl Iterator<Item = &FileChange> {
        self.file_changes
            .iter()
            .filter(|c| c.file_type == FileType::Code)
    }

    /// Sum of valid changed lines across all files.
    pub fn total_valid_lines(&self) -> usize {
        self.file_changes.iter().map(|c| c.valid_changed_lines).sum()
    }

    /// Sum of ignored lines across all files.
    pub fn total_ignored_lines(&self) -> usize {
        self.file_changes.iter().map(|c| c.ignored_lines).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_boundaries() {
        assert_eq!(Severity::from_valid_lines(0), Severity::None);
        assert_eq!(Severity::from_valid_lines(1), Severity::Low);
        assert_eq!(Severity::from_valid_lines(9), Severity::Low);
        assert_eq!(Severity::from_valid_lines(10), Severity::Medium);
        assert_eq!(Severity::from_valid_lines(49), Severity::Medium);
        assert_eq!(Severity::from_valid_lines(50), Severity::Critical);
        assert_eq!(Severity::from_valid_lines(10_000), Severity::Critical);
    }

    #[test]
    fn test_severity_serializes_uppercase() {
        let json = serde_json::to_string(&Severity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
        assert_eq!(Severity::Medium.to_string(), "MEDIUM");
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("critical".parse::<Severity>(), Ok(Severity::Critical));
        assert_eq!("Medium".parse::<Severity>(), Ok(Severity::Medium));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_file_change_json_shape() {
        let mut change = FileChange::new("a.xml", FileType::Code);
        change.valid_changed_lines = 3;
        change.severity = Severity::Low;

        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["path"], "a.xml");
        assert_eq!(json["type"], "CODE");
        assert_eq!(json["validChangedLines"], 3);
        assert_eq!(json["severity"], "LOW");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_add_file_change_counts_significant_code() {
        let mut result = AnalysisResult::new("orders-api", "develop", "main");

        let mut modified = FileChange::new("a.java", FileType::Code);
        modified.valid_changed_lines = 2;
        result.add_file_change(modified);

        // All lines ignored: listed but not counted
        let mut cosmetic = FileChange::new("b.xml", FileType::Code);
        cosmetic.ignored_lines = 4;
        result.add_file_change(cosmetic);

        let mut created = FileChange::new("c.txt", FileType::Code);
        created.is_new_file = true;
        result.add_file_change(created);

        result.add_file_change(FileChange::new("app.properties", FileType::Config));

        assert_eq!(result.file_changes.len(), 4);
        assert_eq!(result.total_files_changed, 3);
        assert_eq!(result.code_changes_count, 2);
        assert_eq!(result.config_changes_count, 1);
    }

    #[test]
    fn test_errored_config_listed_not_counted() {
        let mut result = AnalysisResult::default();

        let mut broken = FileChange::new("", FileType::Config);
        broken.error = Some("diff entry has no path".to_string());
        result.add_file_change(broken);

        assert_eq!(result.file_changes.len(), 1);
        assert_eq!(result.total_files_changed, 0);
        assert_eq!(result.config_changes_count, 0);
    }

    #[test]
    fn test_summary_over_code_files() {
        let mut result = AnalysisResult::default();
        for valid in [0, 3, 12, 80] {
            let mut change = FileChange::new(format!("f{valid}"), FileType::Code);
            change.valid_changed_lines = valid;
            change.severity = Severity::from_valid_lines(valid);
            result.add_file_change(change);
        }
        result.add_file_change(FileChange::new("cfg", FileType::Config));

        let summary = result.summary();
        assert_eq!(summary.none, 1);
        assert_eq!(summary.low, 1);
        assert_eq!(summary.medium, 1);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.highest(), Some(Severity::Critical));
        assert_eq!(result.total_valid_lines(), 95);
    }

    #[test]
    fn test_empty_summary() {
        assert_eq!(SeveritySummary::default().highest(), None);
    }
}
