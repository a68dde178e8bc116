//! Well-formedness rules, normalization and segment classification.

use super::lexer::lexes_cleanly;
use crate::types::{
    Category, LOOSE_BINDING, PROBE_NAME, SINGLE_MATCH, TIGHT_BINDING, TYPE_PATH_SEPARATOR,
};

/// Returns true if `key` is a well-formed resource key.
///
/// A well-formed key is non-empty, does not start with a tight delimiter,
/// does not end with any delimiter, has no doubled tight delimiters or
/// doubled single-match tokens and contains no whitespace.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with(TIGHT_BINDING)
        && !key.ends_with(TIGHT_BINDING)
        && !key.ends_with(LOOSE_BINDING)
        && !key.contains("..")
        && !key.contains("??")
        && lexes_cleanly(key)
}

/// Rewrites every delimiter run that contains a loose delimiter into a
/// single loose delimiter, so `a.*b`, `a*.b` and `a**b` all become `a*b`.
///
/// Runs made only of tight delimiters are copied unchanged.
pub fn normalize_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len());
    let mut run = String::new();

    for ch in key.chars() {
        if ch == TIGHT_BINDING || ch == LOOSE_BINDING {
            run.push(ch);
            continue;
        }
        flush_delimiter_run(&mut normalized, &mut run);
        normalized.push(ch);
    }
    flush_delimiter_run(&mut normalized, &mut run);

    normalized
}

fn flush_delimiter_run(out: &mut String, run: &mut String) {
    if run.is_empty() {
        return;
    }
    if run.contains(LOOSE_BINDING) {
        out.push(LOOSE_BINDING);
    } else {
        out.push_str(run);
    }
    run.clear();
}

/// Returns true if `name` may be used to register an object.
///
/// Registration names are lowercase-first, contain no delimiters, no
/// single-match token, no type-path separator and no whitespace.
pub fn is_valid_name(name: &str) -> bool {
    let Some(first) = name.chars().next() else {
        return false;
    };
    !first.is_uppercase()
        && !name.contains(TIGHT_BINDING)
        && !name.contains(LOOSE_BINDING)
        && !name.contains(SINGLE_MATCH)
        && !name.contains(TYPE_PATH_SEPARATOR)
        && !name.chars().any(char::is_whitespace)
        && name != PROBE_NAME
}

/// Classifies a single segment.
pub fn classify_segment(segment: &str) -> Category {
    if segment == SINGLE_MATCH {
        return Category::SingleMatch;
    }
    let uppercase_first = segment.chars().next().is_some_and(char::is_uppercase);
    if uppercase_first || segment.contains(TYPE_PATH_SEPARATOR) {
        Category::ByType
    } else {
        Category::ByName
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_keys() {
        for key in [
            "a",
            "frame.a",
            "*frame.a",
            "*widgets/Button.label",
            "?.a",
            "a*?.b",
            "a.*b",
        ] {
            assert!(is_valid_key(key), "{key} should be valid");
        }
    }

    #[test]
    fn rejects_ill_formed_keys() {
        for key in [
            "", ".a", "a.", "a*", "*", "a..b", "a.??.b", "a b", "a.\tb", "a\n",
        ] {
            assert!(!is_valid_key(key), "{key:?} should be rejected");
        }
    }

    #[test]
    fn normalize_collapses_mixed_delimiters() {
        assert_eq!(normalize_key("a.*b"), "a*b");
        assert_eq!(normalize_key("a*.b"), "a*b");
        assert_eq!(normalize_key(".*a"), "*a");
        assert_eq!(normalize_key("a.*.b"), "a*b");
        assert_eq!(normalize_key("a**b"), "a*b");
        assert_eq!(normalize_key("a.b*c"), "a.b*c");
    }

    #[test]
    fn normalize_is_idempotent() {
        for key in ["a.*b", "*.a*.b.*c", "a.b.c", "*x", "a*.?.*B/c", "a..b"] {
            let once = normalize_key(key);
            assert_eq!(normalize_key(&once), once, "normalizing {key} twice");
        }
    }

    #[test]
    fn registration_names() {
        assert!(is_valid_name("button1"));
        assert!(is_valid_name("_private"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("Button"));
        assert!(!is_valid_name("a.b"));
        assert!(!is_valid_name("a*b"));
        assert!(!is_valid_name("a?"));
        assert!(!is_valid_name("widgets/button"));
        assert!(!is_valid_name("two words"));
        assert!(!is_valid_name(PROBE_NAME));
    }

    #[test]
    fn segment_classification() {
        assert_eq!(classify_segment("frame"), Category::ByName);
        assert_eq!(classify_segment("Frame"), Category::ByType);
        assert_eq!(classify_segment("awt/frame"), Category::ByType);
        assert_eq!(classify_segment("?"), Category::SingleMatch);
        assert_eq!(classify_segment("a?"), Category::ByName);
    }
}
