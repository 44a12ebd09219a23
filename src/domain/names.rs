//! Author name normalization and identifier matching.
//!
//! Names are the identity key of the collaboration graph, so every name that
//! enters it goes through [`normalize_name`] first.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

fn annotation_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(\d+\)").expect("annotation pattern is valid"))
}

/// Removes parenthesized publication counts, `"Jane Doe (42)"` -> `"Jane Doe"`.
///
/// Non-numeric parentheses are part of the name (`"Tse-Hsun (Peter) Chen"`).
pub fn strip_annotation(name: &str) -> String {
    collapse_whitespace(&annotation_pattern().replace_all(name, ""))
}

/// NFKD decomposition with combining marks dropped: `"Guéheneuc"` -> `"Gueheneuc"`.
pub fn fold_diacritics(name: &str) -> String {
    name.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

fn collapse_whitespace(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn normalize_name(name: &str) -> String {
    collapse_whitespace(&fold_diacritics(&strip_annotation(name)))
}

/// One entry of an author-search response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorCandidate {
    pub name: String,
    pub pid: Option<String>,
}

/// First candidate carrying an identifier whose normalized name equals the
/// normalized query.
pub fn pick_exact_match<'a>(display_name: &str, candidates: &'a [AuthorCandidate]) -> Option<&'a str> {
    let wanted = normalize_name(display_name);
    candidates
        .iter()
        .filter(|c| normalize_name(&c.name) == wanted)
        .find_map(|c| c.pid.as_deref())
}
