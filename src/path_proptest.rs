//! Property-based tests for label and path functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{label_for, relative_slash_path, title_case};
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    // ============================================================================
    // label_for property tests
    // ============================================================================

    proptest! {
        /// Property: labels never contain the separators they replace
        #[test]
        fn label_never_contains_separators(name in "[a-zA-Z0-9_-]{1,24}") {
            let label = label_for(Path::new(&name), &BTreeMap::new());
            prop_assert!(!label.contains('-'));
            prop_assert!(!label.contains('_'));
        }

        /// Property: label_for is total over arbitrary strings
        #[test]
        fn label_is_total(input in ".*") {
            let _ = label_for(Path::new(&input), &BTreeMap::new());
        }

        /// Property: a Markdown extension never survives in the label
        #[test]
        fn label_strips_markdown_extension(stem in "[a-z][a-z0-9]{0,12}") {
            let label = label_for(Path::new(&format!("{}.md", stem)), &BTreeMap::new());
            prop_assert_eq!(label, title_case(&stem));
        }

        /// Property: an override keyed by the derived label always wins
        #[test]
        fn label_override_wins(stem in "[a-z]{1,12}", display in "[A-Z]{1,12}") {
            let derived = title_case(&stem);
            let mut labels = BTreeMap::new();
            labels.insert(derived, display.clone());
            let label = label_for(Path::new(&format!("docs/{}.md", stem)), &labels);
            prop_assert_eq!(label, display);
        }

        /// Property: title_case is idempotent
        #[test]
        fn title_case_is_idempotent(input in "[a-zA-Z ]{0,32}") {
            let once = title_case(&input);
            prop_assert_eq!(title_case(&once), once.clone());
        }
    }

    // ============================================================================
    // relative_slash_path property tests
    // ============================================================================

    proptest! {
        /// Property: joined segments come back joined with forward slashes
        #[test]
        fn relative_path_joins_with_slashes(segments in prop::collection::vec("[a-z0-9]{1,8}", 1..6)) {
            let root = PathBuf::from("/root");
            let mut path = root.clone();
            for segment in &segments {
                path.push(segment);
            }
            let relative = relative_slash_path(&path, &root).unwrap();
            prop_assert_eq!(relative, segments.join("/"));
        }
    }
}
