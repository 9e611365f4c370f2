//! difflens core - change classification engine.
//!
//! This crate decides which lines of a repository comparison actually matter
//! to a reviewer. It consumes already-fetched unified-diff bodies and returns
//! per-file counts of meaningful and ignored lines together with a severity.
//!
//! # Features
//!
//! - **Diff body parsing**: Extract added/removed lines, skipping git headers
//! - **Ignore patterns**: Literal substrings or `regex:` prefixed expressions
//! - **XML canonicalization**: Attribute order is normalized so that pure
//!   reordering of XML attributes is not reported as a change
//! - **Multiset pairing**: Removed/added lines with equal canonical forms are
//!   paired as format-only changes
//! - **Parallel analysis**: Files of one comparison are classified via Rayon
//!
//! # Usage
//!
//! ```
//! use difflens_core::{classifier, patterns::PatternSet};
//!
//! let patterns = PatternSet::parse("TODO").unwrap();
//! let body = "-<a x=\"1\" y=\"2\"/>\n+<a y=\"2\" x=\"1\"/>\n";
//! let counts = classifier::classify_body(body, "mule/flow.xml", &patterns, true);
//!
//! assert_eq!(counts.valid, 0);
//! assert_eq!(counts.ignored, 2);
//! ```

pub mod analyzer;
pub mod classifier;
pub mod diff;
pub mod error;
pub mod matcher;
pub mod patterns;
pub mod types;
pub mod xml;

pub use analyzer::{analyze, AnalysisOptions, AnalysisRequest, ComparePayload, DiffEntry};
pub use classifier::{classify_body, explain_body, LineCounts, Verdict};
pub use error::{Error, Result};
pub use patterns::{IgnorePattern, PatternSet};
pub use types::{AnalysisResult, FileChange, FileType, Severity};
