use serde::{Deserialize, Serialize};

/// Characters that separate tags inside a single free-form string
const TAG_DELIMITERS: [char; 3] = [',', '|', '&'];

/// A tag field that arrives either as one delimited string or as a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagField {
    One(String),
    Many(Vec<String>),
}

/// Lowercase and trim a single token
#[inline]
pub fn normalize_token(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Split a delimited string into normalized tokens
///
/// `"CBT, DBT | Mindfulness"` becomes `["cbt", "dbt", "mindfulness"]`.
pub fn split_tags(raw: &str) -> Vec<String> {
    dedup(raw.split(&TAG_DELIMITERS[..]).map(normalize_token))
}

/// Normalize an already-split list of tags
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    dedup(tags.iter().map(|t| normalize_token(t.as_ref())))
}

/// Normalize an optional tag field into a token list
///
/// Absent and empty input both give an empty list. Order of first
/// occurrence is preserved.
pub fn normalize_field(field: Option<&TagField>) -> Vec<String> {
    match field {
        None => Vec::new(),
        Some(TagField::One(raw)) => split_tags(raw),
        Some(TagField::Many(items)) => normalize_tags(items),
    }
}

/// True when either token contains the other; empty tokens never match
#[inline]
pub fn tokens_overlap(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

fn dedup(tokens: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for token in tokens {
        if !token.is_empty() && !out.contains(&token) {
            out.push(token);
        }
    }
    out
}
