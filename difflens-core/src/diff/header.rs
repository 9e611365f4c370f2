//! Synthetic git header reconstruction.
//!
//! Compare APIs return only the hunk text per file. Viewers expect a full
//! `git diff` envelope, so one is rebuilt from the file metadata.

/// Build the `diff --git` header for a file.
///
/// `old_path` falls back to `path` when absent or empty. The returned string
/// ends with a newline so the hunk body can be appended directly.
pub fn synthetic_header(
    path: &str,
    old_path: Option<&str>,
    is_new_file: bool,
    is_deleted_file: bool,
) -> String {
    let old = old_path.filter(|p| !p.is_empty()).unwrap_or(path);

    let mut header = format!("diff --git a/{} b/{}\n", old, path);
    if is_new_file {
        header.push_str("new file mode 100644\n");
        header.push_str("--- /dev/null\n");
        header.push_str(&format!("+++ b/{}\n", path));
    } else if is_deleted_file {
        header.push_str("deleted file mode 100644\n");
        header.push_str(&format!("--- a/{}\n", old));
        header.push_str("+++ /dev/null\n");
    } else {
        header.push_str(&format!("--- a/{}\n", old));
        header.push_str(&format!("+++ b/{}\n", path));
    }
    header
}
