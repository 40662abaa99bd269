//! Naming conventions mapping a requested type onto a candidate
//! implementation name.
//!
//! A convention is a pattern built from three tokens:
//!
//! - `${class}`: the simple name of the requested type
//! - `${package}`: its full namespace
//! - `${package-N}`: the namespace without its `N` trailing segments
//!
//! Each token is substituted at its first occurrence only. A pattern that
//! repeats a token keeps the later occurrences verbatim.
//!
//! # Examples
//!
//! ```rust
//! use ferrous_injector::naming::apply_pattern;
//! use ferrous_injector::QualifiedName;
//!
//! let name = QualifiedName::parse("a.b.X");
//! assert_eq!(apply_pattern(&name, "${package}.${class}Impl"), "a.b.XImpl");
//! assert_eq!(apply_pattern(&name, "${package-1}.${class}Impl"), "a.XImpl");
//! assert_eq!(apply_pattern(&name, "${package-2}.${class}Impl"), "XImpl");
//! ```

use crate::key::QualifiedName;

/// Token replaced by the simple type name.
pub const CLASS_TOKEN: &str = "${class}";
/// Token replaced by the full namespace.
pub const PACKAGE_TOKEN: &str = "${package}";
const PACKAGE_LEVEL_PREFIX: &str = "${package-";

/// Conventions used when a builder defines none.
pub const DEFAULT_CONVENTIONS: [&str; 2] = ["${package}.${class}Impl", "${package}.impl.${class}Impl"];

/// Applies `pattern` to `name` and returns the candidate implementation name.
pub fn apply_pattern(name: &QualifiedName, pattern: &str) -> String {
    let expanded = if pattern.contains(PACKAGE_TOKEN) {
        replace_first(pattern, PACKAGE_TOKEN, name.namespace())
    } else if let Some(token) = package_level_token(pattern) {
        let mut namespace = name.namespace().to_string();
        for _ in 0..package_level(pattern) {
            if namespace.is_empty() {
                break;
            }
            namespace = cut_last_level(&namespace).to_string();
        }
        replace_first(pattern, token, &namespace)
    } else {
        pattern.to_string()
    };

    let expanded = replace_first(&expanded, CLASS_TOKEN, name.simple_name());
    match expanded.strip_prefix('.') {
        Some(rest) => rest.to_string(),
        None => expanded,
    }
}

/// Number of trailing namespace levels a `${package-N}` token removes, or 0
/// when the pattern has no such token.
///
/// A token without digits counts as 0; an oversized count saturates.
pub fn package_level(pattern: &str) -> usize {
    let Some(start) = pattern.find(PACKAGE_LEVEL_PREFIX) else {
        return 0;
    };
    let digits: String = pattern[start + PACKAGE_LEVEL_PREFIX.len()..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse().unwrap_or(usize::MAX)
}

/// Removes the last dot-delimited segment: `aaa.bbb.ccc` -> `aaa.bbb`.
/// A namespace without a dot collapses to the empty namespace.
pub fn cut_last_level(namespace: &str) -> &str {
    match namespace.rfind('.') {
        Some(i) => &namespace[..i],
        None => "",
    }
}

/// The `${package-N}` token, up to and including the next closing brace.
/// Without a closing brace the pattern is left as written.
fn package_level_token(pattern: &str) -> Option<&str> {
    let start = pattern.find(PACKAGE_LEVEL_PREFIX)?;
    let end = pattern[start..].find('}')?;
    Some(&pattern[start..start + end + 1])
}

fn replace_first(s: &str, token: &str, value: &str) -> String {
    s.replacen(token, value, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ab_x() -> QualifiedName {
        QualifiedName::parse("a.b.X")
    }

    #[test]
    fn test_literal_cases() {
        assert_eq!(apply_pattern(&ab_x(), "${package}.${class}Impl"), "a.b.XImpl");
        assert_eq!(apply_pattern(&ab_x(), "${package-1}.${class}Impl"), "a.XImpl");
        assert_eq!(apply_pattern(&ab_x(), "${package-2}.${class}Impl"), "XImpl");
    }

    #[test]
    fn test_level_beyond_namespace_clamps() {
        assert_eq!(apply_pattern(&ab_x(), "${package-7}.impl.${class}Impl"), "impl.XImpl");
        assert_eq!(
            apply_pattern(&ab_x(), "${package-99999999999999999999999}.${class}"),
            "X"
        );
    }

    #[test]
    fn test_first_occurrence_only() {
        assert_eq!(
            apply_pattern(&ab_x(), "${package}.${class}.${class}"),
            "a.b.X.${class}"
        );
        assert_eq!(
            apply_pattern(&ab_x(), "${package}.${package}.${class}"),
            "a.b.${package}.X"
        );
    }

    #[test]
    fn test_plain_package_wins_over_level_token() {
        assert_eq!(
            apply_pattern(&ab_x(), "${package}.${package-1}.${class}"),
            "a.b.${package-1}.X"
        );
    }

    #[test]
    fn test_only_one_leading_separator_stripped() {
        let root = QualifiedName::parse("X");
        assert_eq!(apply_pattern(&root, "${package}.${class}Impl"), "XImpl");
        assert_eq!(apply_pattern(&root, "${package}..${class}Impl"), ".XImpl");
    }

    #[test]
    fn test_package_level_parsing() {
        assert_eq!(package_level("${package-3}.${class}"), 3);
        assert_eq!(package_level("${package}.${class}"), 0);
        assert_eq!(package_level("${package-}.${class}"), 0);
    }

    #[test]
    fn test_unterminated_level_token_left_verbatim() {
        assert_eq!(apply_pattern(&ab_x(), "${class}Impl.${package-1"), "XImpl.${package-1");
    }

    #[test]
    fn test_cut_last_level() {
        assert_eq!(cut_last_level("aaa.bbb.ccc"), "aaa.bbb");
        assert_eq!(cut_last_level("aaa"), "");
        assert_eq!(cut_last_level(""), "");
    }

    #[test]
    fn test_empty_pattern() {
        assert_eq!(apply_pattern(&ab_x(), ""), "");
    }
}
