//! Reviews for any place, keyed by its normalised name

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceReview {
    pub id: u64,
    pub place_key: String,
    pub place_name: String,
    pub place_category: Option<String>,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub place_name: Option<String>,
    pub place_category: Option<String>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub place_key: String,
    pub place_name: String,
    pub rating: Option<f64>,
    pub review_count: usize,
    pub reviews: Vec<PlaceReview>,
}
