//! Additive relevance heuristic

use super::query::ParsedQuery;
use crate::models::Place;

const FULL_NAME_MATCH: f64 = 10.0;
const TOKEN_IN_NAME: f64 = 5.0;
const TOKEN_IN_TAG: f64 = 4.0;
const TOKEN_IN_DESCRIPTION: f64 = 3.0;

/// Token length used for catalogue places
pub const CATALOGUE_MIN_TOKEN: usize = 3;
/// Token length used for user posts, which are matched more permissively
pub const POST_MIN_TOKEN: usize = 2;

/// Score a place against a query. Zero means "no match".
///
/// Points are whole numbers; the rating bonus is added as-is, so a 4.5 star
/// place outranks a 4 star one with the same textual hits.
#[must_use]
pub fn relevance(place: &Place, query: &ParsedQuery, min_token_len: usize) -> f64 {
    let name = place.name.to_lowercase();
    let description = place.description.to_lowercase();
    let tags: Vec<String> = place.tags.iter().map(|t| t.to_lowercase()).collect();

    let mut score = 0.0;

    if name.contains(query.lower.as_str()) {
        score += FULL_NAME_MATCH;
    }

    for token in query.tokens(min_token_len) {
        if name.contains(token) {
            score += TOKEN_IN_NAME;
        }
        if description.contains(token) {
            score += TOKEN_IN_DESCRIPTION;
        }
        if tags.iter().any(|tag| tag.contains(token)) {
            score += TOKEN_IN_TAG;
        }
    }

    if let Some(rating) = place.rating {
        score += rating.max(0.0);
    }

    score
}
