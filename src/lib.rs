//! boba-map - location discovery service
//!
//! Natural-language place search over a static catalogue and live user
//! posts, plus the post board, place reviews and communities around it,
//! served as a JSON API.

pub mod api;
pub mod cache;
pub mod catalogue;
pub mod communities;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod posts;
pub mod reviews;
pub mod search;
pub mod state;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use catalogue::{Catalogue, PlaceFilter};
pub use config::BobaConfig;
pub use error::BobaError;
pub use models::{Category, Coordinates, Place};
pub use search::{Matcher, search};
pub use state::{AppState, SearchResponse};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, BobaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
