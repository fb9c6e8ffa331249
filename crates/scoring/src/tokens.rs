//! Identifier-aware matching.
//!
//! Table and column identifiers are compared as sets of word tokens, never as
//! raw strings, so short query terms cannot hit the middle of a word
//! ("at" vs "Status"). Free-text values use plain substring matching.

use std::collections::BTreeSet;

/// Default shortest term allowed to match a token by prefix.
pub const MIN_PREFIX_LEN: usize = 3;

/// Split an identifier on separators and lower-to-upper case transitions.
///
/// `student_id`, `Student ID`, `StudentID` and `student-id` all yield
/// `{"student", "id"}`.
pub fn tokenize_identifier(identifier: &str) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in identifier.chars() {
        if c.is_alphanumeric() {
            if c.is_uppercase() && prev_lower && !current.is_empty() {
                tokens.insert(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
            // a digit continues the lowercase run: "address2Line" splits before "L"
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        } else {
            if !current.is_empty() {
                tokens.insert(std::mem::take(&mut current));
            }
            prev_lower = false;
        }
    }
    if !current.is_empty() {
        tokens.insert(current);
    }
    tokens
}

/// Match a query term against pre-tokenized identifier tokens: exact token
/// equality, or prefix of a token when the term has at least
/// `min_prefix_len` characters.
pub fn token_match_tokens(term: &str, tokens: &BTreeSet<String>, min_prefix_len: usize) -> bool {
    let term = term.to_lowercase();
    if tokens.contains(&term) {
        return true;
    }
    term.chars().count() >= min_prefix_len && tokens.iter().any(|t| t.starts_with(&term))
}

/// [`token_match_tokens`] with the default prefix length.
pub fn token_match(term: &str, identifier: &str) -> bool {
    token_match_tokens(term, &tokenize_identifier(identifier), MIN_PREFIX_LEN)
}

/// Case-insensitive substring test used for sample and top values.
pub fn value_contains(value: &str, term: &str) -> bool {
    !term.is_empty() && value.to_lowercase().contains(&term.to_lowercase())
}

/// The term itself followed by its plausible singular form.
///
/// One rule applies, first match wins: "-ies" to "-y", "-es" after a
/// sibilant, then a bare "-s" (never after "ss").
pub fn singular_forms(term: &str) -> Vec<String> {
    let mut forms = vec![term.to_string()];
    let singular = if term.len() > 4 && term.ends_with("ies") {
        term.strip_suffix("ies").map(|stem| format!("{}y", stem))
    } else if term.len() > 3
        && ["sses", "xes", "zes", "ches", "shes"].iter().any(|end| term.ends_with(end))
    {
        term.strip_suffix("es").map(str::to_string)
    } else if term.len() > 3 && !term.ends_with("ss") {
        term.strip_suffix('s').map(str::to_string)
    } else {
        None
    };
    if let Some(s) = singular.filter(|s| !s.is_empty() && s != term) {
        forms.push(s);
    }
    forms
}

/// Return the synonym (from an already lower-cased list) that `term` names,
/// either exactly or through a singular form.
pub fn match_synonym<'a>(term: &str, synonyms: &'a [String]) -> Option<&'a str> {
    let forms = singular_forms(term);
    synonyms
        .iter()
        .find(|s| forms.iter().any(|f| f == *s))
        .map(String::as_str)
}
