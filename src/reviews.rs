//! Reviews for arbitrary places, keyed by normalised name

use chrono::Utc;
use tracing::debug;

use crate::models::{NewReview, PlaceReview, ReviewSummary, UserId, average_rating};
use crate::{BobaError, Result};

/// Lowercase, trim and collapse internal whitespace runs
#[must_use]
pub fn normalize_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Default)]
pub struct ReviewLedger {
    reviews: Vec<PlaceReview>,
    next_id: u64,
}

impl ReviewLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a review, replacing the user's earlier one for the same place.
    ///
    /// Returns the stored review and whether it replaced an existing one.
    pub fn submit(&mut self, user_id: UserId, input: NewReview) -> Result<(PlaceReview, bool)> {
        let place_name = input
            .place_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| BobaError::validation("Missing placeName"))?;
        let rating = input
            .rating
            .filter(|r| (1..=5).contains(r))
            .and_then(|r| u8::try_from(r).ok())
            .ok_or_else(|| BobaError::validation("Rating must be between 1 and 5"))?;
        let comment = input.comment.filter(|c| !c.trim().is_empty());
        let place_key = normalize_key(&place_name);

        if let Some(existing) = self
            .reviews
            .iter_mut()
            .find(|r| r.place_key == place_key && r.user_id == user_id)
        {
            existing.rating = rating;
            existing.comment = comment;
            debug!(%place_key, user_id, "review updated");
            return Ok((existing.clone(), true));
        }

        self.next_id += 1;
        let review = PlaceReview {
            id: self.next_id,
            place_key,
            place_name,
            place_category: input.place_category.filter(|c| !c.is_empty()),
            user_id,
            rating,
            comment,
            created_at: Utc::now(),
        };
        debug!(place_key = %review.place_key, user_id, "review added");
        self.reviews.push(review.clone());
        Ok((review, false))
    }

    /// Aggregate reviews for a place name, newest first
    pub fn summary(&self, name: &str) -> Result<ReviewSummary> {
        if name.trim().is_empty() {
            return Err(BobaError::validation("Missing name parameter"));
        }
        let place_key = normalize_key(name);
        let matching: Vec<&PlaceReview> = self
            .reviews
            .iter()
            .filter(|r| r.place_key == place_key)
            .collect();

        let place_name = matching
            .first()
            .map_or_else(|| name.to_string(), |r| r.place_name.clone());
        let rating = average_rating(matching.iter().map(|r| r.rating));

        Ok(ReviewSummary {
            place_key,
            place_name,
            rating,
            review_count: matching.len(),
            reviews: matching.into_iter().rev().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn review(name: &str, rating: i64) -> NewReview {
        NewReview {
            place_name: Some(name.to_string()),
            rating: Some(rating),
            ..NewReview::default()
        }
    }

    #[rstest]
    #[case("Kebab House", "kebab house")]
    #[case("  Kebab   House \t", "kebab house")]
    #[case("KÖNIGSBAU", "königsbau")]
    fn test_normalize_key(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(normalize_key(name), expected);
    }

    #[test]
    fn test_submit_upserts_per_user_and_key() {
        let mut ledger = ReviewLedger::new();
        let (first, updated) = ledger.submit(1, review("Kebab House", 3)).unwrap();
        assert!(!updated);

        let (second, updated) = ledger.submit(1, review("kebab  house", 5)).unwrap();
        assert!(updated);
        assert_eq!(second.id, first.id);
        assert_eq!(second.rating, 5);

        ledger.submit(2, review("Kebab House", 4)).unwrap();
        let summary = ledger.summary("KEBAB HOUSE").unwrap();
        assert_eq!(summary.review_count, 2);
        assert_eq!(summary.rating, Some(4.5));
        assert_eq!(summary.place_name, "Kebab House");
        assert_eq!(summary.reviews[0].user_id, 2);
    }

    #[rstest]
    #[case(review("Kebab House", 0))]
    #[case(review("Kebab House", 6))]
    #[case(review("   ", 3))]
    #[case(NewReview { rating: None, ..review("Kebab House", 3) })]
    fn test_submit_validation(#[case] input: NewReview) {
        let mut ledger = ReviewLedger::new();
        assert!(matches!(
            ledger.submit(1, input),
            Err(BobaError::Validation { .. })
        ));
    }

    #[test]
    fn test_summary_for_unknown_place() {
        let ledger = ReviewLedger::new();
        let summary = ledger.summary("Nowhere Bar").unwrap();
        assert_eq!(summary.place_key, "nowhere bar");
        assert_eq!(summary.place_name, "Nowhere Bar");
        assert_eq!(summary.rating, None);
        assert!(summary.reviews.is_empty());
        assert!(ledger.summary(" ").is_err());
    }
}
