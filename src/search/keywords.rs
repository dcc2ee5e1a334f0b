//! Keyword tables driving category detection and the hotel shortcut
//!
//! These are plain data so deployments can localise or tune them from the
//! config file; the defaults below are what the service ships with.

use serde::{Deserialize, Serialize};

use crate::models::Category;

/// Keywords that point a query at one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub category: Category,
    pub keywords: Vec<String>,
}

/// Every keyword list the matcher consults.
///
/// `categories` is ordered: detection returns the first entry with a hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchKeywords {
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryKeywords>,
    #[serde(default = "default_lodging")]
    pub lodging: Vec<String>,
    #[serde(default = "default_cheap")]
    pub cheap: Vec<String>,
    #[serde(default = "default_expensive")]
    pub expensive: Vec<String>,
}

impl Default for SearchKeywords {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            lodging: default_lodging(),
            cheap: default_cheap(),
            expensive: default_expensive(),
        }
    }
}

impl SearchKeywords {
    /// Every keyword across all lists, used for validation
    pub fn all_keywords(&self) -> impl Iterator<Item = &str> {
        self.categories
            .iter()
            .flat_map(|c| c.keywords.iter())
            .chain(self.lodging.iter())
            .chain(self.cheap.iter())
            .chain(self.expensive.iter())
            .map(String::as_str)
    }

    /// Lowercase every keyword so matching against a lowercased query works
    pub fn normalize(&mut self) {
        let lower = |list: &mut Vec<String>| {
            for keyword in list.iter_mut() {
                *keyword = keyword.to_lowercase();
            }
        };
        for entry in &mut self.categories {
            lower(&mut entry.keywords);
        }
        lower(&mut self.lodging);
        lower(&mut self.cheap);
        lower(&mut self.expensive);
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| (*w).to_string()).collect()
}

fn default_categories() -> Vec<CategoryKeywords> {
    let table: [(Category, &[&str]); 7] = [
        (
            Category::Accommodation,
            &[
                "hostel",
                "hotel",
                "sleep",
                "stay",
                "room",
                "bed",
                "night",
                "accommodation",
                "lodge",
            ],
        ),
        (
            Category::Food,
            &[
                "eat",
                "food",
                "restaurant",
                "kebab",
                "döner",
                "pizza",
                "burger",
                "cafe",
                "coffee",
                "breakfast",
                "lunch",
                "dinner",
            ],
        ),
        (
            Category::Event,
            &[
                "event",
                "meetup",
                "concert",
                "festival",
                "party",
                "conference",
                "bitcoin",
                "crypto",
                "blockchain",
                "ethereum",
            ],
        ),
        (
            Category::Service,
            &[
                "coworking",
                "library",
                "wifi",
                "work",
                "study",
                "office",
                "freelancer",
            ],
        ),
        (
            Category::Activity,
            &[
                "learn", "music", "sport", "gym", "yoga", "dance", "class", "lesson", "course",
            ],
        ),
        (
            Category::Transport,
            &["bus", "train", "metro", "bike", "car", "taxi", "uber"],
        ),
        (
            Category::Nightlife,
            &[
                "bar", "club", "drink", "cocktail", "beer", "wine", "party", "night",
            ],
        ),
    ];

    table
        .into_iter()
        .map(|(category, keywords)| CategoryKeywords {
            category,
            keywords: words(keywords),
        })
        .collect()
}

fn default_lodging() -> Vec<String> {
    words(&[
        "hotel",
        "hostel",
        "accommodation",
        "lodging",
        "stay",
        "sleep",
        "room",
    ])
}

fn default_cheap() -> Vec<String> {
    words(&[
        "cheap",
        "budget",
        "affordable",
        "inexpensive",
        "low cost",
        "pas cher",
    ])
}

fn default_expensive() -> Vec<String> {
    words(&[
        "expensive",
        "luxury",
        "premium",
        "fancy",
        "high-end",
        "5-star",
    ])
}
