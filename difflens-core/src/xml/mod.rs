//! XML fragment canonicalization.
//!
//! Diff lines from `.xml` files are parsed one at a time. When a line is a
//! well-formed fragment, its canonical form has every element's attributes
//! sorted by name, which makes attribute reordering invisible to the
//! semantic matcher. Lines that do not parse keep their literal text.

pub mod canonical;
pub mod tree;

pub use canonical::{canonicalize, try_canonicalize, FragmentError};

/// Whether XML-aware matching applies to a path (`.xml`, case-insensitive).
pub fn is_xml_path(path: &str) -> bool {
    path.to_ascii_lowercase().ends_with(".xml")
}
