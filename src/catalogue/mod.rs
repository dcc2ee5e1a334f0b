//! Static place catalogue
//!
//! Places come from a JSON seed file plus the built-in hotel list. The
//! catalogue is loaded once at start-up and never mutated afterwards.

pub mod hotels;

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{Category, Coordinates, Place};
use crate::{BobaError, Result};

/// One record of the JSON seed file
#[derive(Debug, Deserialize)]
pub struct RawPlace {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    pub lat: f64,
    pub lng: f64,
    pub price: Option<f64>,
    pub rating: Option<f64>,
    pub address: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl RawPlace {
    /// Convert a seed record into a catalogue place
    pub fn to_place(&self, id: String) -> Result<Place> {
        let category: Category = self.category.parse()?;

        if let Some(price) = self.price
            && price < 0.0
        {
            return Err(BobaError::validation(format!(
                "Negative price {price} for {}",
                self.name
            )));
        }

        let coordinates = Coordinates::new(self.lat, self.lng);
        if !coordinates.is_valid() {
            return Err(BobaError::validation(format!(
                "Coordinates out of range for {}: {}",
                self.name,
                coordinates.format_coordinates()
            )));
        }

        let mut place = Place::new(
            id,
            self.name.clone(),
            self.description.clone().unwrap_or_default(),
            category,
            coordinates,
        )
        .with_tags(self.tags.iter().cloned());
        place.price = self.price;
        place.rating = self.rating;
        place.address = self.address.clone();
        Ok(place)
    }
}

/// Filters accepted by the place listing
#[derive(Debug, Clone, Default)]
pub struct PlaceFilter {
    pub category: Option<Category>,
    /// Places without a price are kept
    pub max_price: Option<f64>,
    pub limit: Option<usize>,
    pub near: Option<(Coordinates, f64)>,
}

#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    places: Vec<Place>,
}

impl Catalogue {
    #[must_use]
    pub fn new(places: Vec<Place>) -> Self {
        Self { places }
    }

    /// Load the seed file, optionally appending the built-in hotels.
    ///
    /// A missing file yields a catalogue with only the hotels.
    pub fn load<P: AsRef<Path>>(path: P, include_hotels: bool) -> Result<Self> {
        let path = path.as_ref();
        let mut places = if path.exists() {
            info!("Loading places from: {:?}", path);
            let content = fs::read_to_string(path)?;
            Self::parse_json(&content)?
        } else {
            warn!("Places file {:?} not found, starting without seed places", path);
            Vec::new()
        };

        if include_hotels {
            for hotel in hotels::stuttgart_hotels() {
                if !places.iter().any(|p| p.id == hotel.id) {
                    places.push(hotel);
                }
            }
        }

        info!("Catalogue ready with {} places", places.len());
        Ok(Self { places })
    }

    /// Parse a JSON array of seed records, skipping invalid entries
    pub fn parse_json(content: &str) -> Result<Vec<Place>> {
        let raw: Vec<RawPlace> = serde_json::from_str(content)
            .map_err(|e| BobaError::validation(format!("Failed to parse places file: {e}")))?;

        let mut places = Vec::with_capacity(raw.len());
        let mut parse_errors = 0;

        for (index, record) in raw.iter().enumerate() {
            match record.to_place(format!("place-{}", index + 1)) {
                Ok(place) => places.push(place),
                Err(e) => {
                    warn!("Skipping place {:?}: {}", record.name, e);
                    parse_errors += 1;
                }
            }
        }

        info!(
            "Parsed {} places ({} skipped)",
            places.len(),
            parse_errors
        );

        Ok(places)
    }

    #[must_use]
    pub fn places(&self) -> &[Place] {
        &self.places
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Apply listing filters in catalogue order
    #[must_use]
    pub fn filter(&self, filter: &PlaceFilter) -> Vec<&Place> {
        let matching = self.places.iter().filter(|place| {
            filter.category.is_none_or(|c| place.category == c)
                && match (filter.max_price, place.price) {
                    (Some(max), Some(price)) => price <= max,
                    _ => true,
                }
                && filter
                    .near
                    .as_ref()
                    .is_none_or(|(center, radius)| place.coordinates.distance_km(center) <= *radius)
        });

        match filter.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SEED: &str = r#"[
        {"name": "Kebab House", "description": "Turkish kebab", "category": "food",
         "lat": 48.7758, "lng": 9.1829, "price": 8, "rating": 4.5, "tags": ["kebab"]},
        {"name": "Broken", "category": "museum", "lat": 48.0, "lng": 9.0},
        {"name": "Negative", "category": "food", "lat": 48.0, "lng": 9.0, "price": -3},
        {"name": "Jazz Keller", "category": "nightlife", "lat": 48.7731, "lng": 9.1771}
    ]"#;

    #[test]
    fn test_parse_json_skips_invalid_records() {
        let places = Catalogue::parse_json(SEED).unwrap();
        assert_eq!(places.len(), 2);
        assert_eq!(places[0].id, "place-1");
        assert_eq!(places[0].category, Category::Food);
        assert_eq!(places[0].price, Some(8.0));
        // ids follow file position, not the number of accepted records
        assert_eq!(places[1].id, "place-4");
        assert_eq!(places[1].description, "");
        assert!(places[1].tags.is_empty());
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        assert!(matches!(
            Catalogue::parse_json("{not json"),
            Err(BobaError::Validation { .. })
        ));
    }

    #[test]
    fn test_load_from_file_with_hotels() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SEED.as_bytes()).unwrap();

        let catalogue = Catalogue::load(file.path(), true).unwrap();
        assert_eq!(catalogue.len(), 12);

        let without_hotels = Catalogue::load(file.path(), false).unwrap();
        assert_eq!(without_hotels.len(), 2);
    }

    #[test]
    fn test_missing_file_keeps_hotels_only() {
        let catalogue = Catalogue::load("does/not/exist.json", true).unwrap();
        assert_eq!(catalogue.len(), 10);
    }

    #[test]
    fn test_filter_by_category_price_and_limit() {
        let catalogue = Catalogue::new(hotels::stuttgart_hotels());

        let cheap = catalogue.filter(&PlaceFilter {
            max_price: Some(40.0),
            ..PlaceFilter::default()
        });
        assert_eq!(cheap.len(), 3);

        let limited = catalogue.filter(&PlaceFilter {
            category: Some(Category::Accommodation),
            limit: Some(4),
            ..PlaceFilter::default()
        });
        assert_eq!(limited.len(), 4);

        let food = catalogue.filter(&PlaceFilter {
            category: Some(Category::Food),
            ..PlaceFilter::default()
        });
        assert!(food.is_empty());
    }

    #[test]
    fn test_filter_by_radius() {
        let catalogue = Catalogue::new(hotels::stuttgart_hotels());
        // around Stuttgart Hauptbahnhof
        let center = Coordinates::new(48.7840, 9.1820);
        let nearby = catalogue.filter(&PlaceFilter {
            near: Some((center, 0.5)),
            ..PlaceFilter::default()
        });
        assert!(!nearby.is_empty());
        assert!(nearby.iter().all(|p| p.coordinates.distance_km(&center) <= 0.5));
        assert!(nearby.len() < catalogue.len());
    }
}
