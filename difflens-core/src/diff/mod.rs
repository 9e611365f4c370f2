//! Unified diff handling.
//!
//! The engine never computes diffs itself. It receives the hunk text produced
//! upstream by the repository host and only needs two things from it:
//!
//! - the ordered added/removed lines ([`parser`])
//! - a reconstructed git header for display ([`header`])

pub mod header;
pub mod parser;

pub use header::synthetic_header;
pub use parser::{parse_diff_body, DiffLine, LineKind};
