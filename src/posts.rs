//! In-memory post board with per-user feedback

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{debug, info};

use crate::models::{
    Category, Coordinates, Feedback, NewPost, Post, PostDetail, PostView, UserId, average_rating,
};
use crate::{BobaError, Result};

#[derive(Debug, Default)]
pub struct PostBoard {
    posts: BTreeMap<u64, Post>,
    feedbacks: Vec<Feedback>,
    next_post_id: u64,
    next_feedback_id: u64,
}

/// Trim and drop empty strings
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parsed and validated fields of a new post
struct ValidPost {
    title: String,
    description: String,
    category: Category,
    coordinates: Coordinates,
    event_date: Option<NaiveDate>,
    event_time: Option<NaiveTime>,
}

fn validate(input: &NewPost) -> Result<ValidPost> {
    let (Some(title), Some(description), Some(category), Some(lat), Some(lng)) = (
        non_empty(input.title.clone()),
        non_empty(input.description.clone()),
        non_empty(input.category.clone()),
        input.lat,
        input.lng,
    ) else {
        return Err(BobaError::validation(
            "Missing required fields: title, description, category, lat, lng",
        ));
    };

    let category: Category = category.parse()?;
    if !category.accepts_posts() {
        let allowed: Vec<&str> = Category::ALL
            .iter()
            .filter(|c| c.accepts_posts())
            .map(|c| c.as_str())
            .collect();
        return Err(BobaError::validation(format!(
            "Invalid category. Must be one of: {}",
            allowed.join(", ")
        )));
    }

    let coordinates = Coordinates::new(lat, lng);
    if !coordinates.is_valid() {
        return Err(BobaError::validation("Coordinates out of range"));
    }

    if input.price.is_some_and(|p| p < 0.0) {
        return Err(BobaError::validation("Price cannot be negative"));
    }

    let event_date = non_empty(input.event_date.clone())
        .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
        .transpose()
        .map_err(|_| BobaError::validation("Event date must be YYYY-MM-DD"))?;
    let event_time = non_empty(input.event_time.clone())
        .map(|t| NaiveTime::parse_from_str(&t, "%H:%M"))
        .transpose()
        .map_err(|_| BobaError::validation("Event time must be HH:MM"))?;

    Ok(ValidPost {
        title,
        description,
        category,
        coordinates,
        event_date,
        event_time,
    })
}

impl PostBoard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a new post.
    ///
    /// Community membership is checked by the caller, which owns the directory.
    pub fn create(&mut self, user_id: UserId, input: NewPost) -> Result<PostView> {
        let valid = validate(&input)?;

        self.next_post_id += 1;
        let now = Utc::now();
        let post = Post {
            id: self.next_post_id,
            user_id,
            community_id: input.community_id,
            title: valid.title,
            description: valid.description,
            category: valid.category,
            lat: valid.coordinates.lat,
            lng: valid.coordinates.lng,
            address: non_empty(input.address),
            price: input.price,
            image_url: non_empty(input.image_url),
            event_date: valid.event_date,
            event_time: valid.event_time,
            event_recurrence: input.event_recurrence,
            created_at: now,
            updated_at: now,
        };

        info!(post_id = post.id, user_id, category = %post.category, "post created");
        self.posts.insert(post.id, post.clone());
        Ok(PostView {
            post,
            rating: None,
            feedback_count: 0,
        })
    }

    fn view(&self, post: &Post) -> PostView {
        let ratings: Vec<u8> = self
            .feedbacks_for(post.id)
            .map(|f| f.rating)
            .collect();
        PostView {
            post: post.clone(),
            rating: average_rating(ratings.iter().copied()),
            feedback_count: ratings.len(),
        }
    }

    fn feedbacks_for(&self, post_id: u64) -> impl Iterator<Item = &Feedback> {
        self.feedbacks.iter().filter(move |f| f.post_id == post_id)
    }

    /// All posts, newest first, optionally restricted to one category
    #[must_use]
    pub fn list(&self, category: Option<Category>) -> Vec<PostView> {
        self.posts
            .values()
            .rev()
            .filter(|p| category.is_none_or(|c| p.category == c))
            .map(|p| self.view(p))
            .collect()
    }

    pub fn get(&self, post_id: u64) -> Result<PostDetail> {
        let post = self
            .posts
            .get(&post_id)
            .ok_or_else(|| BobaError::not_found("Post not found"))?;
        Ok(PostDetail {
            view: self.view(post),
            feedbacks: self.feedbacks_for(post_id).cloned().collect(),
        })
    }

    /// Delete a post owned by `user_id` together with its feedback
    pub fn delete(&mut self, user_id: UserId, post_id: u64) -> Result<()> {
        match self.posts.get(&post_id) {
            Some(post) if post.user_id == user_id => {}
            _ => return Err(BobaError::not_found("Post not found or not authorized")),
        }
        self.posts.remove(&post_id);
        self.feedbacks.retain(|f| f.post_id != post_id);
        info!(post_id, user_id, "post deleted");
        Ok(())
    }

    /// Add feedback, or replace the user's earlier feedback on the same post
    pub fn add_feedback(
        &mut self,
        user_id: UserId,
        post_id: u64,
        rating: Option<i64>,
        comment: Option<String>,
    ) -> Result<Feedback> {
        if !self.posts.contains_key(&post_id) {
            return Err(BobaError::not_found("Post not found"));
        }
        let rating = rating
            .filter(|r| (1..=5).contains(r))
            .and_then(|r| u8::try_from(r).ok())
            .ok_or_else(|| BobaError::validation("Rating must be between 1 and 5"))?;
        let comment = non_empty(comment);

        if let Some(existing) = self
            .feedbacks
            .iter_mut()
            .find(|f| f.post_id == post_id && f.user_id == user_id)
        {
            existing.rating = rating;
            existing.comment = comment;
            debug!(post_id, user_id, "feedback updated");
            return Ok(existing.clone());
        }

        self.next_feedback_id += 1;
        let feedback = Feedback {
            id: self.next_feedback_id,
            post_id,
            user_id,
            rating,
            comment,
            created_at: Utc::now(),
        };
        self.feedbacks.push(feedback.clone());
        debug!(post_id, user_id, "feedback added");
        Ok(feedback)
    }

    /// Drop every post linked to a community, returning how many went
    pub fn remove_by_community(&mut self, community_id: u64) -> usize {
        let doomed: Vec<u64> = self
            .posts
            .values()
            .filter(|p| p.community_id == Some(community_id))
            .map(|p| p.id)
            .collect();
        for id in &doomed {
            self.posts.remove(id);
        }
        self.feedbacks.retain(|f| !doomed.contains(&f.post_id));
        doomed.len()
    }
}
