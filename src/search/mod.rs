//! Natural-language place search
//!
//! - keywords: category and hotel-shortcut keyword tables
//! - query: category/price extraction and tokenisation
//! - scoring: additive relevance heuristic
//! - engine: filtering, shortcut, ranking and de-duplication

pub mod engine;
pub mod keywords;
pub mod query;
pub mod scoring;

pub use engine::{DEFAULT_SHORTCUT_SIZE, Matcher, search};
pub use keywords::{CategoryKeywords, SearchKeywords};
pub use query::{ParsedQuery, detect_category, extract_price_limit};
pub use scoring::relevance;
