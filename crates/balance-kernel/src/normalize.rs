//! Student name normalization.
//!
//! Names arrive from several sources that disagree on case, accents,
//! spacing, and token order ("Novak Ana" vs "Ana Novak"). Every equality
//! check in the kernel goes through [`StudentKey`].
//!
//! ## Known limitation
//!
//! Token order is only canonicalized for names with exactly two tokens.
//! "Ana Marija Novak" and "Novak Ana Marija" produce different keys; there
//! is no reliable way to tell a middle name from a particle or a double
//! surname without more data than the directory carries.

use std::fmt;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Normalized identity of a student, used for every comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentKey(String);

impl StudentKey {
    /// Build the key for a raw name as written in any source.
    pub fn from_name(raw: &str) -> Self {
        let folded = fold(&reorder_comma(raw));
        let mut tokens: Vec<&str> = folded.split(' ').filter(|t| !t.is_empty()).collect();
        if tokens.len() == 2 {
            tokens.sort_unstable();
        }
        Self(tokens.join(" "))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StudentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StudentKey {
    fn from(raw: &str) -> Self {
        Self::from_name(raw)
    }
}

/// Case, accent, and whitespace folding without any token reordering.
///
/// NFD decomposition, combining marks dropped, runs of whitespace collapsed
/// to one space, trimmed, lowercased.
pub fn fold(raw: &str) -> String {
    let stripped: String = raw.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Rewrite "Last, First" as "First Last". Other inputs come back trimmed.
pub fn reorder_comma(raw: &str) -> String {
    let trimmed = raw.trim();
    if !trimmed.contains(',') {
        return trimmed.to_string();
    }
    let parts: Vec<&str> = trimmed
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match parts.as_slice() {
        [last, first, ..] => format!("{} {}", first, last),
        _ => trimmed.replace(',', ""),
    }
}

/// Number of whitespace-separated tokens after comma reordering.
pub fn token_count(raw: &str) -> usize {
    reorder_comma(raw).split_whitespace().count()
}

/// True when the name has at least a first and a last token.
pub fn is_full_name(raw: &str) -> bool {
    token_count(raw) >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_strips_accents_and_spacing() {
        assert_eq!(fold("  Krýdová   NIKOLA "), "krydova nikola");
        assert_eq!(fold("Šimon\tČech"), "simon cech");
    }

    #[test]
    fn test_two_token_order_is_ignored() {
        assert_eq!(
            StudentKey::from_name("Novak Ana"),
            StudentKey::from_name("ana  NOVÁK")
        );
    }

    #[test]
    fn test_comma_form() {
        assert_eq!(reorder_comma("Novak, Ana"), "Ana Novak");
        assert_eq!(
            StudentKey::from_name("Novak, Ana"),
            StudentKey::from_name("Ana Novak")
        );
        assert_eq!(reorder_comma("Novak,"), "Novak");
    }

    #[test]
    fn test_three_tokens_keep_order() {
        assert_ne!(
            StudentKey::from_name("Ana Marija Novak"),
            StudentKey::from_name("Novak Ana Marija")
        );
        assert_eq!(
            StudentKey::from_name("Ana Marija Novak"),
            StudentKey::from_name("ana marija  novák")
        );
    }

    #[test]
    fn test_full_name_check() {
        assert!(is_full_name("Ana Novak"));
        assert!(is_full_name("Novak, Ana"));
        assert!(!is_full_name("Ana"));
        assert!(!is_full_name("   "));
    }
}
