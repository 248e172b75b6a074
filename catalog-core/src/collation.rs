//! Locale-aware string ordering for catalog sorting
//!
//! Orders text alphabetically the way a reader expects rather than by raw
//! byte value: accents and case are folded for the primary comparison and
//! only used to break ties.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold text into its primary collation key
///
/// Applies NFKD decomposition, drops combining marks and lowercases.
pub fn collation_key(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two strings in natural alphabetic order
///
/// "apple" < "Banana" < "cafe" < "Cafe" < "café"
pub fn compare(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| compare_accents(a, b))
        .then_with(|| compare_case(a, b))
}

// Secondary level: unaccented before accented
fn compare_accents(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| -> String { s.nfd().flat_map(char::to_lowercase).collect() };
    fold(a).cmp(&fold(b))
}

// Tertiary level: lowercase before uppercase
fn compare_case(a: &str, b: &str) -> Ordering {
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        match (ca.is_lowercase(), cb.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return ca.cmp(&cb),
        }
    }
    a.chars().count().cmp(&b.chars().count())
}

/// Case-insensitive substring test
///
/// An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_is_folded() {
        assert_eq!(compare("apple", "Banana"), Ordering::Less);
        assert_eq!(compare("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_byte_order_would_differ() {
        // Raw byte order puts every uppercase letter first
        assert!("Zebra" < "apple");
        assert_eq!(compare("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn test_accents_fold_to_base_letter() {
        assert_eq!(compare("éclair", "fudge"), Ordering::Less);
        assert_eq!(compare("cafe", "café"), Ordering::Less);
        assert_eq!(compare("café", "cafes"), Ordering::Less);
        assert_eq!(compare("Cafe", "café"), Ordering::Less);
    }

    #[test]
    fn test_lowercase_before_uppercase_on_tie() {
        assert_eq!(compare("labour", "Labour"), Ordering::Less);
        assert_eq!(compare("Labour", "labour"), Ordering::Greater);
        assert_eq!(compare("Labour", "Labour"), Ordering::Equal);
    }

    #[test]
    fn test_collation_key() {
        assert_eq!(collation_key("NSS 75th Round – Health"), "nss 75th round – health");
        assert_eq!(collation_key("Café"), "cafe");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Periodic Labour Force Survey", "LABOUR"));
        assert!(contains_ignore_case("plfs", ""));
        assert!(!contains_ignore_case("hces", "plfs"));
    }
}
