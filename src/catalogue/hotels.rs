//! Built-in Stuttgart hotel list backing the cheap/expensive shortcut

use crate::models::{Category, Coordinates, Place};

/// Hotels under this price count as cheap
pub const CHEAP_BELOW: f64 = 50.0;
/// Hotels at or above this price count as expensive
pub const EXPENSIVE_FROM: f64 = 150.0;

struct HotelSeed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    lat: f64,
    lng: f64,
    price: f64,
    rating: f64,
    address: &'static str,
    tags: &'static [&'static str],
}

const HOTELS: [HotelSeed; 10] = [
    HotelSeed {
        id: "hotel-cheap-1",
        name: "Jugendherberge Stuttgart International",
        description: "Youth hostel in the heart of Stuttgart. Dorms from 25€/night. Free WiFi, breakfast included.",
        lat: 48.7823,
        lng: 9.1751,
        price: 25.0,
        rating: 4.2,
        address: "Haußmannstraße 27, 70188 Stuttgart",
        tags: &["hostel", "budget", "cheap", "backpacker", "dorm", "wifi", "breakfast"],
    },
    HotelSeed {
        id: "hotel-cheap-2",
        name: "Alex 30 Hostel",
        description: "Modern hostel near city center. Private rooms from 35€. Great atmosphere for travelers.",
        lat: 48.7695,
        lng: 9.1707,
        price: 35.0,
        rating: 4.5,
        address: "Alexanderstraße 30, 70184 Stuttgart",
        tags: &["hostel", "modern", "cheap", "budget", "private room"],
    },
    HotelSeed {
        id: "hotel-cheap-3",
        name: "A&O Stuttgart City",
        description: "Budget hotel chain. Clean rooms starting at 39€. Perfect for short stays.",
        lat: 48.7834,
        lng: 9.1823,
        price: 39.0,
        rating: 3.8,
        address: "Rosensteinstraße 16, 70191 Stuttgart",
        tags: &["hotel", "budget", "cheap", "chain", "clean"],
    },
    HotelSeed {
        id: "hotel-cheap-4",
        name: "Ibis Budget Stuttgart City Nord",
        description: "No-frills hotel with essential comfort. Rooms from 42€. Near public transport.",
        lat: 48.7912,
        lng: 9.1789,
        price: 42.0,
        rating: 3.6,
        address: "Heilbronner Straße 88, 70191 Stuttgart",
        tags: &["hotel", "budget", "cheap", "ibis", "transport"],
    },
    HotelSeed {
        id: "hotel-cheap-5",
        name: "B&B Hotel Stuttgart-Bad Cannstatt",
        description: "Simple and affordable. Double rooms from 49€. Free parking available.",
        lat: 48.8012,
        lng: 9.2134,
        price: 49.0,
        rating: 4.0,
        address: "Wildunger Straße 2, 70372 Stuttgart",
        tags: &["hotel", "budget", "cheap", "parking", "simple"],
    },
    HotelSeed {
        id: "hotel-expensive-1",
        name: "Le Méridien Stuttgart",
        description: "5-star luxury in the city center. Rooftop bar with panoramic views. Spa & wellness.",
        lat: 48.78421,
        lng: 9.18894,
        price: 189.0,
        rating: 4.7,
        address: "Willy-Brandt-Straße 30, 70173 Stuttgart",
        tags: &["hotel", "luxury", "expensive", "5-star", "spa", "rooftop", "premium"],
    },
    HotelSeed {
        id: "hotel-expensive-2",
        name: "Steigenberger Graf Zeppelin",
        description: "Historic grand hotel since 1931. Elegant rooms, Michelin restaurant, prime location.",
        lat: 48.7832,
        lng: 9.1812,
        price: 215.0,
        rating: 4.8,
        address: "Arnulf-Klett-Platz 7, 70173 Stuttgart",
        tags: &["hotel", "luxury", "expensive", "historic", "restaurant", "premium", "5-star"],
    },
    HotelSeed {
        id: "hotel-expensive-3",
        name: "Waldhotel Stuttgart",
        description: "Tranquil forest retreat with city views. Gourmet dining, infinity pool, tennis courts.",
        lat: 48.7645,
        lng: 9.1534,
        price: 245.0,
        rating: 4.9,
        address: "Guts-Muths-Weg 18, 70597 Stuttgart",
        tags: &["hotel", "luxury", "expensive", "forest", "pool", "gourmet", "premium"],
    },
    HotelSeed {
        id: "hotel-expensive-4",
        name: "Der Zauberlehrling",
        description: "Boutique design hotel. Each room uniquely themed. Award-winning architecture.",
        lat: 48.7712,
        lng: 9.1678,
        price: 175.0,
        rating: 4.6,
        address: "Rosenstraße 38, 70182 Stuttgart",
        tags: &["hotel", "luxury", "expensive", "boutique", "design", "unique", "premium"],
    },
    HotelSeed {
        id: "hotel-expensive-5",
        name: "Althoff Hotel am Schlossgarten",
        description: "Elegant 5-star overlooking Schlossgarten park. Michelin-starred restaurant, spa.",
        lat: 48.7867,
        lng: 9.1856,
        price: 265.0,
        rating: 4.8,
        address: "Schillerstraße 23, 70173 Stuttgart",
        tags: &["hotel", "luxury", "expensive", "5-star", "park", "michelin", "spa", "premium"],
    },
];

/// The full built-in hotel list, cheap entries first
#[must_use]
pub fn stuttgart_hotels() -> Vec<Place> {
    HOTELS
        .iter()
        .map(|h| {
            let mut place = Place::new(
                h.id,
                h.name,
                h.description,
                Category::Accommodation,
                Coordinates::new(h.lat, h.lng),
            )
            .with_price(h.price)
            .with_rating(h.rating)
            .with_address(h.address)
            .with_tags(h.tags.iter().copied());
            place.currency = Some("EUR".to_string());
            place
        })
        .collect()
}

/// Up to `limit` hotels priced under [`CHEAP_BELOW`], cheapest first
#[must_use]
pub fn cheapest(hotels: &[Place], limit: usize) -> Vec<Place> {
    let mut cheap: Vec<Place> = hotels
        .iter()
        .filter(|h| h.price.is_some_and(|p| p < CHEAP_BELOW))
        .cloned()
        .collect();
    cheap.sort_by(|a, b| price_of(a).total_cmp(&price_of(b)));
    cheap.truncate(limit);
    cheap
}

/// Up to `limit` hotels priced at or above [`EXPENSIVE_FROM`], priciest first
#[must_use]
pub fn priciest(hotels: &[Place], limit: usize) -> Vec<Place> {
    let mut expensive: Vec<Place> = hotels
        .iter()
        .filter(|h| h.price.is_some_and(|p| p >= EXPENSIVE_FROM))
        .cloned()
        .collect();
    expensive.sort_by(|a, b| price_of(b).total_cmp(&price_of(a)));
    expensive.truncate(limit);
    expensive
}

fn price_of(place: &Place) -> f64 {
    place.price.unwrap_or_default()
}
