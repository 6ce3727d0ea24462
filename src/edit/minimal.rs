//! Minimal edit: The smallest contiguous replacement between two strings.
//!
//! The computation trims the common prefix and the common suffix and reports
//! the differing middle region. It is the slow path of every content update
//! that is neither a pure append nor a language switch.
//!
//! # Boundaries
//!
//! The scan runs over UTF-8 bytes and both boundaries are then snapped
//! outward to `char` boundaries. When two strings diverge inside a
//! multi-byte character (for example two emoji sharing their leading
//! bytes) the replacement covers the whole character rather than a
//! fragment of it.

use std::ops::Range;

/// A single range replacement turning `prev` into `next`.
///
/// Offsets are byte offsets. `prev[start..end_prev]` is replaced by
/// `next[start..end_next]`, which is carried in `replace_text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinimalEdit {
    /// Length of the common prefix.
    pub start: usize,
    /// Exclusive end of the replaced region in the previous string.
    pub end_prev: usize,
    /// Exclusive end of the inserted region in the next string.
    pub end_next: usize,
    /// Text replacing `prev[start..end_prev]`.
    pub replace_text: String,
}

impl MinimalEdit {
    /// Region of the previous string that is replaced.
    pub const fn prev_range(&self) -> Range<usize> {
        self.start..self.end_prev
    }

    /// Region of the next string that is inserted.
    pub const fn next_range(&self) -> Range<usize> {
        self.start..self.end_next
    }

    /// Whether the edit only inserts text.
    pub const fn is_insertion(&self) -> bool {
        self.start == self.end_prev
    }

    /// Whether the edit only removes text.
    pub const fn is_deletion(&self) -> bool {
        self.start == self.end_next
    }

    /// Apply the edit to `prev`, producing the next string.
    pub fn apply(&self, prev: &str) -> String {
        let mut out =
            String::with_capacity(prev.len() - (self.end_prev - self.start) + self.replace_text.len());
        out.push_str(&prev[..self.start]);
        out.push_str(&self.replace_text);
        out.push_str(&prev[self.end_prev..]);
        out
    }
}

/// Compute the minimal single-range edit from `prev` to `next`.
///
/// Returns `None` iff the strings are identical. Runs in
/// `O(min(|prev|, |next|))` and allocates only the replacement text.
pub fn compute_minimal_edit(prev: &str, next: &str) -> Option<MinimalEdit> {
    if prev == next {
        return None;
    }

    let a = prev.as_bytes();
    let b = next.as_bytes();
    let max_prefix = a.len().min(b.len());

    let mut start = 0;
    while start < max_prefix && a[start] == b[start] {
        start += 1;
    }
    while !(prev.is_char_boundary(start) && next.is_char_boundary(start)) {
        start -= 1;
    }

    // Suffix scan never crosses back over the prefix.
    let mut end_prev = a.len();
    let mut end_next = b.len();
    while end_prev > start && end_next > start && a[end_prev - 1] == b[end_next - 1] {
        end_prev -= 1;
        end_next -= 1;
    }
    while !(prev.is_char_boundary(end_prev) && next.is_char_boundary(end_next)) {
        end_prev += 1;
        end_next += 1;
    }

    Some(MinimalEdit {
        start,
        end_prev,
        end_next,
        replace_text: next[start..end_next].to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_is_none() {
        assert_eq!(compute_minimal_edit("", ""), None);
        assert_eq!(compute_minimal_edit("fn main() {}", "fn main() {}"), None);
    }

    #[test]
    fn test_middle_replace() {
        let edit = compute_minimal_edit("aXc", "aYc").unwrap();
        assert_eq!(edit.start, 1);
        assert_eq!(edit.end_prev, 2);
        assert_eq!(edit.end_next, 2);
        assert_eq!(edit.replace_text, "Y");
    }

    #[test]
    fn test_append_and_prepend() {
        let edit = compute_minimal_edit("line1\n", "line1\nline2\n").unwrap();
        assert_eq!(edit.start, 6);
        assert!(edit.is_insertion());
        assert_eq!(edit.replace_text, "line2\n");

        let edit = compute_minimal_edit("fn main() {}", "// header\nfn main() {}").unwrap();
        assert_eq!(edit.start, 0);
        assert_eq!(edit.end_prev, 0);
        assert_eq!(edit.replace_text, "// header\n");
    }

    #[test]
    fn test_deletion() {
        let edit = compute_minimal_edit("abcdef", "abef").unwrap();
        assert!(edit.is_deletion());
        assert_eq!(edit.prev_range(), 2..4);
        assert_eq!(edit.replace_text, "");
    }

    #[test]
    fn test_suffix_does_not_overlap_prefix() {
        // "aa" -> "aaa": prefix consumes both bytes, suffix must not reuse them.
        let edit = compute_minimal_edit("aa", "aaa").unwrap();
        assert_eq!(edit.start, 2);
        assert_eq!(edit.end_prev, 2);
        assert_eq!(edit.replace_text, "a");
    }

    #[test]
    fn test_to_and_from_empty() {
        let edit = compute_minimal_edit("", "hello").unwrap();
        assert_eq!(edit.prev_range(), 0..0);
        assert_eq!(edit.replace_text, "hello");

        let edit = compute_minimal_edit("hello", "").unwrap();
        assert_eq!(edit.prev_range(), 0..5);
        assert_eq!(edit.replace_text, "");
    }

    #[test]
    fn test_divergence_inside_multibyte_char_widens() {
        // U+1F600 and U+1F601 share their first three UTF-8 bytes.
        let prev = "ok \u{1F600}!";
        let next = "ok \u{1F601}!";
        let edit = compute_minimal_edit(prev, next).unwrap();
        assert_eq!(edit.start, 3);
        assert_eq!(edit.replace_text, "\u{1F601}");
        assert_eq!(edit.apply(prev), next);
    }

    proptest! {
        #[test]
        fn prop_identity(a in ".{0,40}") {
            prop_assert_eq!(compute_minimal_edit(&a, &a), None);
        }

        #[test]
        fn prop_pure_append(a in ".{0,40}", suffix in ".{1,20}") {
            let b = format!("{a}{suffix}");
            let edit = compute_minimal_edit(&a, &b).unwrap();
            prop_assert_eq!(edit.start, a.len());
            prop_assert_eq!(edit.replace_text, suffix);
        }

        #[test]
        fn prop_pure_prepend(prefix in "[xyz]{1,10}", a in "[ab\u{e9}\n]{0,30}") {
            // Disjoint alphabets: the prefix never shares a first char with `a`.
            let b = format!("{prefix}{a}");
            let edit = compute_minimal_edit(&a, &b).unwrap();
            prop_assert_eq!(edit.start, 0);
            prop_assert_eq!(edit.end_prev, 0);
            prop_assert_eq!(edit.replace_text, prefix);
        }

        #[test]
        fn prop_apply_reconstructs(a in "[ab\u{e9}\u{1F600}\n]{0,24}", b in "[ab\u{e9}\u{1F600}\n]{0,24}") {
            match compute_minimal_edit(&a, &b) {
                None => prop_assert_eq!(&a, &b),
                Some(edit) => prop_assert_eq!(edit.apply(&a), b),
            }
        }
    }
}
