//! difflens configuration loading from `.difflensrc.toml`.
//!
//! Configuration is optional. Every section falls back to defaults, and
//! command-line flags are merged on top of whatever the file provides.
//!
//! # Example Configuration
//!
//! ```toml
//! [ignore]
//! files = ["regex:^docs/", "CHANGELOG.md"]
//! content = ["regex:^\\s*<!--", "TODO"]
//!
//! [xml]
//! ignore_attribute_order = true
//!
//! [output]
//! format = "table"
//! color = true
//! ```

use serde::Deserialize;
use std::path::Path;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".difflensrc.toml";

/// Root configuration structure loaded from `.difflensrc.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct DifflensConfig {
    /// Ignore patterns for paths and changed lines.
    #[serde(default)]
    pub ignore: IgnoreSettings,

    /// XML handling.
    #[serde(default)]
    pub xml: XmlSettings,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Ignore pattern lists.
///
/// Entries use the same syntax as the command-line flags: plain text is a
/// substring match, a `regex:` prefix makes the rest a regular expression.
#[derive(Debug, Deserialize, Default)]
pub struct IgnoreSettings {
    /// Paths matching any of these are skipped entirely.
    #[serde(default)]
    pub files: Vec<String>,

    /// Changed lines matching any of these are ignored.
    #[serde(default)]
    pub content: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct XmlSettings {
    /// Treat attribute reordering in `.xml` files as a format-only change.
    #[serde(default)]
    pub ignore_attribute_order: bool,
}

/// Output formatting preferences.
///
/// Command-line flags (e.g., `--format json`) override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table`, `json` or `csv`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output.
    ///
    /// Defaults to `true` when stdout is a TTY.
    #[serde(default)]
    pub color: Option<bool>,
}

impl DifflensConfig {
    /// Load configuration from `.difflensrc.toml` in the given directory.
    ///
    /// A missing file yields defaults. Read and parse errors are logged as
    /// warnings and also yield defaults.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    /// File ignore patterns from the config followed by `extra`, without
    /// duplicates.
    pub fn file_patterns(&self, extra: &[String]) -> Vec<String> {
        merge_patterns(&self.ignore.files, extra)
    }

    /// Content ignore patterns from the config followed by `extra`, without
    /// duplicates.
    pub fn content_patterns(&self, extra: &[String]) -> Vec<String> {
        merge_patterns(&self.ignore.content, extra)
    }

    /// Whether XML attribute order is ignored unless a flag turns it on.
    pub fn ignore_attribute_order(&self) -> bool {
        self.xml.ignore_attribute_order
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured color preference, or `None` to auto-detect.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}

fn merge_patterns(configured: &[String], extra: &[String]) -> Vec<String> {
    let mut patterns = configured.to_vec();
    for pattern in extra {
        if !patterns.contains(pattern) {
            patterns.push(pattern.clone());
        }
    }
    patterns
}
