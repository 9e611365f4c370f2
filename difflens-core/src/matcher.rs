//! Semantic equivalence matching.
//!
//! A removed line and an added line with byte-equal canonical forms are the
//! same statement written differently (for XML: attributes reordered). Such
//! pairs are flagged format-only and never count as real changes.
//!
//! Pairing is greedy and follows diff order: every canonical form is a bag
//! of remaining counts, and each line takes the first available partner.
//! Lines with equal canonical forms are interchangeable, so only the number
//! of pairs is observable.

use std::collections::HashMap;

use crate::diff::DiffLine;
use crate::xml::canonicalize;

/// Multiset of canonical forms with decrement-on-take semantics.
#[derive(Debug, Default)]
struct FormBag<'a> {
    counts: HashMap<&'a str, usize>,
}

impl<'a> FormBag<'a> {
    fn from_forms(forms: impl IntoIterator<Item = &'a str>) -> Self {
        let mut counts = HashMap::new();
        for form in forms {
            *counts.entry(form).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Remove one occurrence of `form`, returning whether one was left.
    fn take(&mut self, form: &str) -> bool {
        match self.counts.get_mut(form) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// Flag removed/added pairs whose canonical forms are equal.
///
/// Does nothing unless `xml_mode` is on. Returns the number of pairs found;
/// every pair marks exactly one added and one removed line.
pub fn mark_format_only(lines: &mut [DiffLine], xml_mode: bool) -> usize {
    if !xml_mode {
        return 0;
    }

    let forms: Vec<String> = lines
        .iter()
        .map(|line| canonicalize(&line.trimmed, true))
        .collect();

    // Added lines claim removed forms in diff order
    let mut removed = FormBag::from_forms(
        lines
            .iter()
            .zip(&forms)
            .filter(|(line, _)| line.is_removed())
            .map(|(_, form)| form.as_str()),
    );
    let mut added_paired = vec![false; lines.len()];
    for (i, line) in lines.iter().enumerate() {
        if line.is_added() && removed.take(&forms[i]) {
            added_paired[i] = true;
        }
    }

    // Removed lines claim the forms of paired added lines, again in diff order
    let mut paired = FormBag::from_forms(
        added_paired
            .iter()
            .zip(&forms)
            .filter(|(is_paired, _)| **is_paired)
            .map(|(_, form)| form.as_str()),
    );
    let mut removed_paired = vec![false; lines.len()];
    for (i, line) in lines.iter().enumerate() {
        if line.is_removed() && paired.take(&forms[i]) {
            removed_paired[i] = true;
        }
    }

    let mut pairs = 0;
    for (i, line) in lines.iter_mut().enumerate() {
        if added_paired[i] || removed_paired[i] {
            line.format_only = true;
            if line.is_added() {
                pairs += 1;
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parse_diff_body;

    fn flags(lines: &[DiffLine]) -> Vec<bool> {
        lines.iter().map(|l| l.format_only).collect()
    }

    #[test]
    fn test_reordered_attributes_paired() {
        let mut lines = parse_diff_body("-<a x=\"1\" y=\"2\"/>\n+<a y=\"2\" x=\"1\"/>\n");
        assert_eq!(mark_format_only(&mut lines, true), 1);
        assert_eq!(flags(&lines), vec![true, true]);
    }

    #[test]
    fn test_xml_mode_off_pairs_nothing() {
        let mut lines = parse_diff_body("-<a x=\"1\"/>\n+<a x=\"1\"/>\n");
        assert_eq!(mark_format_only(&mut lines, false), 0);
        assert_eq!(flags(&lines), vec![false, false]);
    }

    #[test]
    fn test_changed_value_not_paired() {
        let mut lines = parse_diff_body("-<a x=\"1\" y=\"2\"/>\n+<a y=\"3\" x=\"1\"/>\n");
        assert_eq!(mark_format_only(&mut lines, true), 0);
        assert_eq!(flags(&lines), vec![false, false]);
    }

    #[test]
    fn test_reorder_with_different_text_escaping_paired() {
        let body = "-<a y=\"2\" x=\"1\">1 > 0</a>\n+<a x=\"1\" y=\"2\">1 &gt; 0</a>\n";
        let mut lines = parse_diff_body(body);
        assert_eq!(mark_format_only(&mut lines, true), 1);
        assert_eq!(flags(&lines), vec![true, true]);
    }

    #[test]
    fn test_cdata_end_in_text_matches_only_literally() {
        let body = "-<a y=\"2\" x=\"1\">]]></a>\n+<a x=\"1\" y=\"2\">]]></a>\n";
        let mut lines = parse_diff_body(body);
        assert_eq!(mark_format_only(&mut lines, true), 0);
        assert_eq!(flags(&lines), vec![false, false]);

        let mut lines = parse_diff_body("-<a>]]></a>\n+<a>]]></a>\n");
        assert_eq!(mark_format_only(&mut lines, true), 1);
    }

    #[test]
    fn test_duplicate_removed_pairs_once() {
        let body = "-<a x=\"1\" y=\"2\"/>\n-<a y=\"2\" x=\"1\"/>\n+<a x=\"1\" y=\"2\"/>\n";
        let mut lines = parse_diff_body(body);

        assert_eq!(mark_format_only(&mut lines, true), 1);
        // First removed line in diff order takes the pair
        assert_eq!(flags(&lines), vec![true, false, true]);
    }

    #[test]
    fn test_duplicate_added_pairs_once() {
        let body = "+<b/>\n-<b></b>\n+<b/>\n";
        let mut lines = parse_diff_body(body);

        assert_eq!(mark_format_only(&mut lines, true), 1);
        assert_eq!(flags(&lines), vec![true, true, false]);
    }

    #[test]
    fn test_pairing_ignores_position() {
        let body = "-<c b=\"2\" a=\"1\"/>\n-unrelated\n+something else\n+<c a=\"1\" b=\"2\"/>\n";
        let mut lines = parse_diff_body(body);

        assert_eq!(mark_format_only(&mut lines, true), 1);
        assert_eq!(flags(&lines), vec![true, false, false, true]);
    }

    #[test]
    fn test_identical_text_lines_pair() {
        // Whitespace-only moves also canonicalize equal
        let mut lines = parse_diff_body("-    plain text\n+plain text\n");
        assert_eq!(mark_format_only(&mut lines, true), 1);
    }

    #[test]
    fn test_only_one_side_present() {
        let mut lines = parse_diff_body("+<a/>\n+<b/>\n");
        assert_eq!(mark_format_only(&mut lines, true), 0);

        let mut lines = parse_diff_body("-<a/>\n");
        assert_eq!(mark_format_only(&mut lines, true), 0);
    }

    #[test]
    fn test_form_bag_never_negative() {
        let mut bag = FormBag::from_forms(["x"]);
        assert!(bag.take("x"));
        assert!(!bag.take("x"));
        assert!(!bag.take("y"));
    }
}
