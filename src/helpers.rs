use anyhow::{Error, anyhow};
use strsim::levenshtein;

/// Find the most similar ID from a list of candidates
pub fn find_similar_id<'a>(target: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&candidate| (candidate, levenshtein(target, candidate)))
        .filter(|(_, distance)| *distance <= 2)
        .min_by_key(|(_, distance)| *distance)
        .map(|(id, _)| id)
}

/// "Book not found" error, with a suggestion when a close ID exists.
pub fn book_not_found(id: &str, candidates: &[&str]) -> Error {
    match find_similar_id(id, candidates) {
        Some(suggestion) => anyhow!("Book not found: {id}\nDid you mean: {suggestion}"),
        None => anyhow!("Book not found: {id}"),
    }
}
