//! Place model shared by the catalogue, user posts and the search matcher

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::BobaError;

/// Fixed set of place categories.
///
/// Declaration order matters: category detection walks the keyword table in
/// this order and the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Accommodation,
    Food,
    Event,
    Service,
    Activity,
    Transport,
    Nightlife,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Accommodation,
        Category::Food,
        Category::Event,
        Category::Service,
        Category::Activity,
        Category::Transport,
        Category::Nightlife,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Accommodation => "accommodation",
            Category::Food => "food",
            Category::Event => "event",
            Category::Service => "service",
            Category::Activity => "activity",
            Category::Transport => "transport",
            Category::Nightlife => "nightlife",
        }
    }

    /// Users cannot publish transport posts.
    #[must_use]
    pub fn accepts_posts(self) -> bool {
        self != Category::Transport
    }

    #[must_use]
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = BobaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| {
                BobaError::validation(format!(
                    "Invalid category: {s}. Valid: {}",
                    Self::valid_names()
                ))
            })
    }
}

/// Geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance in kilometres
    #[must_use]
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: self.lat,
                longitude: self.lng,
            },
            haversine::Location {
                latitude: other.lat,
                longitude: other.lng,
            },
            haversine::Units::Kilometers,
        )
    }

    /// Format as "lat, lng" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// A point of interest, either from the catalogue or converted from a user post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_user_post: bool,
}

impl Place {
    /// Create a bare place with no commercial attributes
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: Category,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            category,
            coordinates,
            price: None,
            currency: None,
            rating: None,
            address: None,
            tags: Vec::new(),
            image_url: None,
            is_user_post: false,
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Display price, "Free" for zero, empty when unknown
    #[must_use]
    pub fn format_price(&self) -> String {
        match self.price {
            None => String::new(),
            Some(p) if p == 0.0 => "Free".to_string(),
            Some(p) => format!("{p}{}", self.currency.as_deref().unwrap_or("€")),
        }
    }
}
