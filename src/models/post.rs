//! User posts and the feedback attached to them

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::place::{Category, Coordinates, Place};

pub type UserId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventRecurrence {
    Once,
    Daily,
    Weekly,
    Monthly,
}

/// A user announcement pinned on the map
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub user_id: UserId,
    pub community_id: Option<u64>,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub lat: f64,
    pub lng: f64,
    pub address: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub event_date: Option<NaiveDate>,
    #[serde(with = "hhmm", default)]
    pub event_time: Option<NaiveTime>,
    pub event_recurrence: Option<EventRecurrence>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a post. Everything is optional so that missing
/// fields surface as a validation message instead of a decoder rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub address: Option<String>,
    pub price: Option<f64>,
    pub image_url: Option<String>,
    pub community_id: Option<u64>,
    pub event_date: Option<String>,
    pub event_time: Option<String>,
    pub event_recurrence: Option<EventRecurrence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: u64,
    pub post_id: u64,
    pub user_id: UserId,
    pub rating: u8,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A post together with its aggregated feedback
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub rating: Option<f64>,
    pub feedback_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetail {
    #[serde(flatten)]
    pub view: PostView,
    pub feedbacks: Vec<Feedback>,
}

impl PostView {
    /// Convert into the place shape consumed by the search matcher
    #[must_use]
    pub fn to_place(&self) -> Place {
        let post = &self.post;
        Place {
            id: format!("post-{}", post.id),
            name: post.title.clone(),
            description: post.description.clone(),
            category: post.category,
            coordinates: Coordinates::new(post.lat, post.lng),
            price: post.price,
            currency: None,
            rating: self.rating,
            address: post.address.clone(),
            tags: Vec::new(),
            image_url: post.image_url.clone(),
            is_user_post: true,
        }
    }
}

/// Average of 1-5 star ratings, `None` when there are none
#[must_use]
pub fn average_rating<I: IntoIterator<Item = u8>>(ratings: I) -> Option<f64> {
    let (sum, count) = ratings
        .into_iter()
        .fold((0u32, 0u32), |(s, c), r| (s + u32::from(r), c + 1));
    (count > 0).then(|| f64::from(sum) / f64::from(count))
}

/// Event times travel as "HH:MM"
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&t.format(FORMAT).to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}
