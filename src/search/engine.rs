//! Query-to-results matcher
//!
//! Takes a free-text query plus the catalogue and the user posts visible to
//! the caller, and returns a ranked, de-duplicated list of places. Pure and
//! synchronous: the same inputs always produce the same ordered output.

use std::collections::HashSet;

use tracing::debug;

use super::keywords::SearchKeywords;
use super::query::ParsedQuery;
use super::scoring::{CATALOGUE_MIN_TOKEN, POST_MIN_TOKEN, relevance};
use crate::catalogue::hotels;
use crate::models::Place;

/// Default number of hotels returned by the cheap/expensive shortcut
pub const DEFAULT_SHORTCUT_SIZE: usize = 5;

/// Search configured with keyword tables and the shortcut hotel list
#[derive(Debug, Clone)]
pub struct Matcher {
    keywords: SearchKeywords,
    hotels: Vec<Place>,
    shortcut_size: usize,
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(
            SearchKeywords::default(),
            hotels::stuttgart_hotels(),
            DEFAULT_SHORTCUT_SIZE,
        )
    }
}

impl Matcher {
    #[must_use]
    pub fn new(mut keywords: SearchKeywords, hotels: Vec<Place>, shortcut_size: usize) -> Self {
        keywords.normalize();
        Self {
            keywords,
            hotels,
            shortcut_size,
        }
    }

    #[must_use]
    pub fn parse(&self, query: &str) -> ParsedQuery {
        ParsedQuery::parse(query, &self.keywords)
    }

    /// Rank `places` and `user_posts` against `query`
    #[must_use]
    pub fn search(&self, places: &[Place], query: &str, user_posts: &[Place]) -> Vec<Place> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let parsed = self.parse(query);
        debug!(
            category = ?parsed.category,
            price_limit = ?parsed.price_limit,
            "parsed search query"
        );

        if let Some(shortcut) = self.hotel_shortcut(&parsed) {
            debug!(count = shortcut.len(), "hotel shortcut answered query");
            return shortcut;
        }

        let catalogue_hits = places
            .iter()
            .filter(|place| catalogue_matches(place, &parsed))
            .map(|place| (place, relevance(place, &parsed, CATALOGUE_MIN_TOKEN)));

        let post_hits = user_posts
            .iter()
            .filter(|post| post_matches(post, &parsed))
            .map(|post| (post, relevance(post, &parsed, POST_MIN_TOKEN)));

        let mut scored: Vec<(&Place, f64)> = catalogue_hits
            .chain(post_hits)
            .filter(|(_, score)| *score > 0.0)
            .collect();

        // stable: equal scores keep catalogue-then-posts insertion order
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut seen: HashSet<&str> = HashSet::new();
        let mut results = Vec::with_capacity(scored.len());
        for (place, _) in scored {
            if seen.insert(place.id.as_str()) {
                results.push(place.clone());
            }
        }

        debug!(count = results.len(), "search finished");
        results
    }

    /// Lodging plus a cheap/expensive signal bypasses general matching
    fn hotel_shortcut(&self, query: &ParsedQuery) -> Option<Vec<Place>> {
        if !query.mentions_any(&self.keywords.lodging) {
            return None;
        }
        if query.mentions_any(&self.keywords.cheap) {
            return Some(hotels::cheapest(&self.hotels, self.shortcut_size));
        }
        if query.mentions_any(&self.keywords.expensive) {
            return Some(hotels::priciest(&self.hotels, self.shortcut_size));
        }
        None
    }
}

/// Search with the built-in keyword tables and hotel list
#[must_use]
pub fn search(all_places: &[Place], query: &str, user_posts: &[Place]) -> Vec<Place> {
    Matcher::default().search(all_places, query, user_posts)
}

fn lower_tags(place: &Place) -> impl Iterator<Item = String> + '_ {
    place.tags.iter().map(|t| t.to_lowercase())
}

fn within_price(place: &Place, query: &ParsedQuery) -> bool {
    match (query.price_limit, place.price) {
        (Some(limit), Some(price)) => price <= limit,
        _ => true,
    }
}

fn catalogue_matches(place: &Place, query: &ParsedQuery) -> bool {
    if let Some(category) = query.category
        && place.category != category
    {
        // a tag spelled out in the query lets a place cross categories
        let tag_in_query = lower_tags(place)
            .any(|tag| !tag.trim().is_empty() && query.lower.contains(tag.as_str()));
        if !tag_in_query {
            return false;
        }
    }

    if !within_price(place, query) {
        return false;
    }

    let mut tokens = query.tokens(CATALOGUE_MIN_TOKEN).peekable();
    if tokens.peek().is_none() {
        return true;
    }

    let name = place.name.to_lowercase();
    let description = place.description.to_lowercase();
    let tags: Vec<String> = lower_tags(place).collect();
    tokens.any(|token| {
        name.contains(token)
            || description.contains(token)
            || tags.iter().any(|tag| tag.contains(token))
    })
}

fn post_matches(post: &Place, query: &ParsedQuery) -> bool {
    if !within_price(post, query) {
        return false;
    }

    if query.category == Some(post.category) {
        return true;
    }

    let mut tokens = query.tokens(POST_MIN_TOKEN).peekable();
    if tokens.peek().is_none() {
        return true;
    }

    let name = post.name.to_lowercase();
    let description = post.description.to_lowercase();
    let address = post.address.as_deref().unwrap_or_default().to_lowercase();
    let tags: Vec<String> = lower_tags(post).collect();
    tokens.any(|token| {
        name.contains(token)
            || description.contains(token)
            || address.contains(token)
            || tags.iter().any(|tag| tag.contains(token))
    })
}
