//! Analysis of a whole repository comparison.
//!
//! The repository host returns one compare payload per repository. Code
//! repository files are filtered by path, classified line by line and
//! counted as CODE; configuration repository files are filtered and tallied
//! as CONFIG without looking at their content.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::classifier::classify_body;
use crate::diff::synthetic_header;
use crate::error::Result;
use crate::patterns::PatternSet;
use crate::types::{AnalysisResult, FileChange, FileType};

/// One file of a compare payload, in the GitLab compare shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    #[serde(default)]
    pub new_path: String,
    #[serde(default)]
    pub old_path: Option<String>,
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
    #[serde(default)]
    pub renamed_file: bool,
    /// Hunk text without the git header
    #[serde(default)]
    pub diff: Option<String>,
}

impl DiffEntry {
    /// Entry for a modified file.
    pub fn modified(path: impl Into<String>, diff: impl Into<String>) -> Self {
        Self {
            new_path: path.into(),
            diff: Some(diff.into()),
            ..Self::default()
        }
    }

    /// Path the file is reported under: the new path, or the old one for
    /// hosts that leave it empty on deletion.
    pub fn display_path(&self) -> Option<&str> {
        if !self.new_path.is_empty() {
            return Some(&self.new_path);
        }
        self.old_path.as_deref().filter(|p| !p.is_empty())
    }

    fn previous_path(&self) -> Option<&str> {
        self.old_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// One file of a GitHub compare response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GitHubFile {
    pub filename: String,
    #[serde(default)]
    pub previous_filename: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub patch: Option<String>,
}

impl From<GitHubFile> for DiffEntry {
    fn from(file: GitHubFile) -> Self {
        let renamed = file.status == "renamed";
        Self {
            old_path: file.previous_filename.or_else(|| Some(file.filename.clone())),
            new_file: file.status == "added",
            deleted_file: file.status == "removed",
            renamed_file: renamed,
            diff: file.patch,
            new_path: file.filename,
        }
    }
}

/// A repository-compare response from either supported host.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ComparePayload {
    /// GitLab: `{"diffs": [...]}`
    #[serde(default)]
    pub diffs: Vec<DiffEntry>,
    /// GitHub: `{"files": [...]}`
    #[serde(default)]
    pub files: Vec<GitHubFile>,
}

impl ComparePayload {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Normalize into diff entries, preserving payload order.
    pub fn into_entries(self) -> Vec<DiffEntry> {
        let mut entries = self.diffs;
        entries.extend(self.files.into_iter().map(DiffEntry::from));
        entries
    }
}

/// Everything needed to analyze one comparison.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisRequest {
    pub api_name: String,
    pub code_repo: Option<String>,
    pub config_repo: Option<String>,
    pub source_branch: String,
    pub target_branch: String,
    pub code_diffs: Vec<DiffEntry>,
    /// Present only when a configuration repository was compared
    pub config_diffs: Option<Vec<DiffEntry>>,
    /// Paths matching any of these are skipped entirely
    pub file_patterns: Vec<String>,
    /// Changed lines matching any of these are ignored
    pub content_patterns: Vec<String>,
    pub ignore_attribute_order: bool,
}

/// Compiled, shareable settings for a run.
#[derive(Clone, Debug, Default)]
pub struct AnalysisOptions {
    pub file_patterns: PatternSet,
    pub content_patterns: PatternSet,
    pub ignore_attribute_order: bool,
}

impl AnalysisOptions {
    /// Compile both pattern lists, rejecting the first invalid regex.
    pub fn compile<S: AsRef<str>>(
        file_patterns: &[S],
        content_patterns: &[S],
        ignore_attribute_order: bool,
    ) -> Result<Self> {
        Ok(Self {
            file_patterns: PatternSet::from_entries(file_patterns)?,
            content_patterns: PatternSet::from_entries(content_patterns)?,
            ignore_attribute_order,
        })
    }

    /// Whether the file-ignore patterns exclude this entry.
    pub fn is_path_ignored(&self, entry: &DiffEntry) -> bool {
        self.file_patterns.is_match(&entry.new_path)
            || entry
                .previous_path()
                .is_some_and(|p| self.file_patterns.is_match(p))
    }
}

/// What happened to one code entry.
enum Outcome {
    Skipped(String),
    Classified(FileChange),
}

fn base_change(entry: &DiffEntry, path: &str, file_type: FileType) -> FileChange {
    let mut change = FileChange::new(path, file_type);
    change.old_path = entry.previous_path().map(str::to_string);
    change.is_new_file = entry.new_file;
    change.is_deleted_file = entry.deleted_file;
    change.is_renamed_file = entry.renamed_file;
    change
}

/// Classify one code repository entry.
pub fn classify_entry(entry: &DiffEntry, options: &AnalysisOptions) -> FileChange {
    let Some(path) = entry.display_path() else {
        let mut change = FileChange::new("", FileType::Code);
        change.error = Some("diff entry has no path".to_string());
        return change;
    };

    let mut change = base_change(entry, path, FileType::Code);
    let body = entry.diff.as_deref().unwrap_or_default();

    if !body.is_empty() {
        let header = synthetic_header(
            path,
            entry.previous_path(),
            entry.new_file,
            entry.deleted_file,
        );
        change.diff_content = Some(format!("{header}{body}"));
    }

    let counts = classify_body(
        body,
        path,
        &options.content_patterns,
        options.ignore_attribute_order,
    );
    change.additions = counts.additions;
    change.deletions = counts.deletions;
    change.valid_changed_lines = counts.valid;
    change.ignored_lines = counts.ignored;
    change.severity = counts.severity();
    change
}

fn process_code_entry(entry: &DiffEntry, options: &AnalysisOptions) -> Outcome {
    if options.is_path_ignored(entry) {
        return Outcome::Skipped(entry.display_path().unwrap_or_default().to_string());
    }
    Outcome::Classified(classify_entry(entry, options))
}

/// Analyze a comparison with already-compiled options.
///
/// Code entries are classified in parallel; results keep payload order.
pub fn analyze_with(request: &AnalysisRequest, options: &AnalysisOptions) -> AnalysisResult {
    let start = Instant::now();

    let mut result = AnalysisResult::new(
        request.api_name.clone(),
        request.source_branch.clone(),
        request.target_branch.clone(),
    );
    result.code_repo = request.code_repo.clone();
    result.config_repo = request.config_repo.clone();

    let outcomes: Vec<Outcome> = request
        .code_diffs
        .par_iter()
        .map(|entry| process_code_entry(entry, options))
        .collect();

    for outcome in outcomes {
        match outcome {
            Outcome::Skipped(path) => {
                tracing::debug!(path = %path, "path matched file-ignore pattern");
                result.add_ignored_file(path);
            }
            Outcome::Classified(change) => {
                if let Some(err) = &change.error {
                    tracing::warn!(error = %err, "file could not be classified");
                }
                result.add_file_change(change);
            }
        }
    }

    // Configuration files are tallied without line classification
    for entry in request.config_diffs.iter().flatten() {
        if options.is_path_ignored(entry) {
            result.add_ignored_file(entry.display_path().unwrap_or_default());
            continue;
        }
        match entry.display_path() {
            Some(path) => result.add_file_change(base_change(entry, path, FileType::Config)),
            None => {
                tracing::warn!("config diff entry has no path");
                let mut change = FileChange::new("", FileType::Config);
                change.error = Some("diff entry has no path".to_string());
                result.add_file_change(change);
            }
        }
    }

    tracing::info!(
        api = %result.api_name,
        files = result.file_changes.len(),
        total = result.total_files_changed,
        code = result.code_changes_count,
        config = result.config_changes_count,
        ignored = result.ignored_files.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "analysis complete"
    );
    result
}

/// Analyze a comparison.
///
/// Pattern lists are compiled before any file is looked at; an invalid
/// regular expression rejects the whole request.
pub fn analyze(request: &AnalysisRequest) -> Result<AnalysisResult> {
    let options = AnalysisOptions::compile(
        &request.file_patterns,
        &request.content_patterns,
        request.ignore_attribute_order,
    )?;
    Ok(analyze_with(request, &options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Severity;
    use crate::Error;

    fn request(code: Vec<DiffEntry>) -> AnalysisRequest {
        AnalysisRequest {
            api_name: "orders-api".to_string(),
            source_branch: "release/1.2".to_string(),
            target_branch: "main".to_string(),
            code_diffs: code,
            ..AnalysisRequest::default()
        }
    }

    #[test]
    fn test_gitlab_payload() {
        let json = r#"{"diffs": [{"new_path": "a.xml", "old_path": "a.xml", "new_file": false,
            "deleted_file": false, "renamed_file": false, "diff": "@@ -1 +1 @@\n-x\n+y\n"}]}"#;
        let entries = ComparePayload::from_json(json).unwrap().into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].new_path, "a.xml");
        assert_eq!(entries[0].diff.as_deref(), Some("@@ -1 +1 @@\n-x\n+y\n"));
    }

    #[test]
    fn test_github_payload() {
        let json = r#"{"files": [
            {"filename": "new.txt", "status": "added", "patch": "+hello"},
            {"filename": "b.txt", "previous_filename": "a.txt", "status": "renamed"},
            {"filename": "gone.txt", "status": "removed", "patch": "-bye"}
        ]}"#;
        let entries = ComparePayload::from_json(json).unwrap().into_entries();
        assert_eq!(entries.len(), 3);
        assert!(entries[0].new_file);
        assert!(entries[1].renamed_file);
        assert_eq!(entries[1].old_path.as_deref(), Some("a.txt"));
        assert!(entries[2].deleted_file);
    }

    #[test]
    fn test_invalid_payload() {
        assert!(matches!(
            ComparePayload::from_json("not json"),
            Err(Error::Payload(_))
        ));
    }

    #[test]
    fn test_invalid_regex_rejects_request() {
        let mut req = request(vec![DiffEntry::modified("a.txt", "+x\n")]);
        req.content_patterns = vec!["regex:(".to_string()];
        assert!(matches!(analyze(&req), Err(Error::InvalidPattern { .. })));

        let mut req = request(vec![DiffEntry::modified("a.txt", "+x\n")]);
        req.file_patterns = vec!["regex:[z-a]".to_string()];
        assert!(analyze(&req).is_err());
    }

    #[test]
    fn test_path_filter_skips_file() {
        let mut req = request(vec![
            DiffEntry::modified("package-lock.json", "+x\n"),
            DiffEntry::modified("src/app.js", "+y\n"),
        ]);
        req.file_patterns = vec!["package-lock".to_string()];

        let result = analyze(&req).unwrap();
        assert_eq!(result.file_changes.len(), 1);
        assert_eq!(result.file_changes[0].path, "src/app.js");
        assert_eq!(result.ignored_files, vec!["package-lock.json"]);
        assert_eq!(result.total_files_changed, 1);
    }

    #[test]
    fn test_old_path_filter() {
        let mut entry = DiffEntry::modified("src/renamed.txt", "+x\n");
        entry.old_path = Some("generated/orig.txt".to_string());
        let mut req = request(vec![entry]);
        req.file_patterns = vec!["regex:^generated/".to_string()];

        let result = analyze(&req).unwrap();
        assert!(result.file_changes.is_empty());
        assert_eq!(result.total_files_changed, 0);
    }

    #[test]
    fn test_classified_entry_has_header_and_counts() {
        let req = request(vec![DiffEntry::modified(
            "flow.xml",
            "@@ -1 +1 @@\n-<a x=\"1\" y=\"2\"/>\n+<a y=\"2\" x=\"1\"/>\n+<b/>\n",
        )]);

        let result = analyze(&AnalysisRequest {
            ignore_attribute_order: true,
            ..req
        })
        .unwrap();
        let change = &result.file_changes[0];

        assert_eq!(change.file_type, FileType::Code);
        assert_eq!(change.ignored_lines, 2);
        assert_eq!(change.valid_changed_lines, 1);
        assert_eq!(change.severity, Severity::Low);
        assert_eq!(change.additions, 2);
        assert_eq!(change.deletions, 1);
        assert!(change
            .diff_content
            .as_deref()
            .unwrap()
            .starts_with("diff --git a/flow.xml b/flow.xml\n--- a/flow.xml\n+++ b/flow.xml\n@@"));
    }

    #[test]
    fn test_config_files_tallied_without_classification() {
        let mut req = request(vec![]);
        req.config_repo = Some("orders-config".to_string());
        req.config_diffs = Some(vec![
            DiffEntry::modified("dev.properties", "+a=1\n+b=2\n"),
            DiffEntry::modified("ignored.properties", "+c=3\n"),
        ]);
        req.file_patterns = vec!["ignored".to_string()];

        let result = analyze(&req).unwrap();
        assert_eq!(result.config_changes_count, 1);
        assert_eq!(result.total_files_changed, 1);
        let change = &result.file_changes[0];
        assert_eq!(change.file_type, FileType::Config);
        assert_eq!(change.valid_changed_lines, 0);
        assert!(change.diff_content.is_none());
        assert_eq!(result.ignored_files, vec!["ignored.properties"]);
    }

    #[test]
    fn test_missing_path_reported_per_file() {
        let req = request(vec![
            DiffEntry {
                diff: Some("+x\n".to_string()),
                ..DiffEntry::default()
            },
            DiffEntry::modified("ok.txt", "+y\n"),
        ]);

        let result = analyze(&req).unwrap();
        assert_eq!(result.file_changes.len(), 2);
        assert!(result.file_changes[0].error.is_some());
        assert_eq!(result.file_changes[1].valid_changed_lines, 1);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_pathless_config_entry_not_counted() {
        let mut req = request(Vec::new());
        req.config_diffs = Some(vec![
            DiffEntry {
                diff: Some("-a=1\n+a=2\n".to_string()),
                ..DiffEntry::default()
            },
            DiffEntry::modified("dev.properties", "+b=1\n"),
        ]);

        let result = analyze(&req).unwrap();
        assert_eq!(result.file_changes.len(), 2);
        assert_eq!(result.file_changes[0].file_type, FileType::Config);
        assert!(result.file_changes[0].error.is_some());
        assert_eq!(result.total_files_changed, 1);
        assert_eq!(result.config_changes_count, 1);
        assert_eq!(result.code_changes_count, 0);
    }

    #[test]
    fn test_order_preserved_across_parallel_classification() {
        let entries: Vec<DiffEntry> = (0..64)
            .map(|i| DiffEntry::modified(format!("f{i:02}.txt"), "+x\n".repeat(i + 1)))
            .collect();
        let result = analyze(&request(entries)).unwrap();

        for (i, change) in result.file_changes.iter().enumerate() {
            assert_eq!(change.path, format!("f{i:02}.txt"));
            assert_eq!(change.valid_changed_lines, i + 1);
        }
    }
}
