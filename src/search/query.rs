//! Query parsing: category guess, price ceiling and tokens

use std::sync::LazyLock;

use regex::Regex;

use super::keywords::SearchKeywords;
use crate::models::Category;

/// Ordered price phrases; the first one that matches wins.
static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)less than ([0-9]+)",
        r"(?i)under ([0-9]+)",
        r"(?i)below ([0-9]+)",
        r"(?i)moins de ([0-9]+)",
        r"(?i)max ([0-9]+)",
        r"(?i)([0-9]+)\s*(?:€|euros?|eur)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("price pattern must compile"))
    .collect()
});

/// A query parsed once per search call
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedQuery {
    pub raw: String,
    pub lower: String,
    pub category: Option<Category>,
    pub price_limit: Option<f64>,
}

impl ParsedQuery {
    #[must_use]
    pub fn parse(raw: &str, keywords: &SearchKeywords) -> Self {
        let lower = raw.to_lowercase();
        Self {
            raw: raw.to_string(),
            category: detect_category(&lower, keywords),
            price_limit: extract_price_limit(raw),
            lower,
        }
    }

    /// Whitespace-separated lowercase words at least `min_len` characters long
    pub fn tokens(&self, min_len: usize) -> impl Iterator<Item = &str> {
        tokens(&self.lower, min_len)
    }

    #[must_use]
    pub fn mentions_any(&self, keywords: &[String]) -> bool {
        keywords.iter().any(|k| self.lower.contains(k.as_str()))
    }
}

pub fn tokens(lower: &str, min_len: usize) -> impl Iterator<Item = &str> {
    lower
        .split_whitespace()
        .filter(move |w| w.chars().count() >= min_len)
}

/// First category (in table order) with a keyword inside the lowercased query
#[must_use]
pub fn detect_category(lower_query: &str, keywords: &SearchKeywords) -> Option<Category> {
    keywords
        .categories
        .iter()
        .find(|entry| entry.keywords.iter().any(|k| lower_query.contains(k.as_str())))
        .map(|entry| entry.category)
}

/// Price ceiling from phrases like "under 20" or "15 euros"
#[must_use]
pub fn extract_price_limit(query: &str) -> Option<f64> {
    PRICE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(query)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok())
    })
}
