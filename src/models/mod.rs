//! Data models for the boba-map service
//!
//! Organised by concern:
//! - Place: catalogue entries and the shape the search matcher works on
//! - Post: user announcements and their feedback
//! - Community: groups, memberships and join requests
//! - Review: ratings for arbitrary places keyed by name

pub mod community;
pub mod place;
pub mod post;
pub mod review;

// Re-export all public types for convenient access
pub use community::{
    Community, CommunitySummary, JoinOutcome, JoinRequest, LeaveOutcome, Membership, NewCommunity,
    RequestAction, RequestStatus, Role,
};
pub use place::{Category, Coordinates, Place};
pub use post::{
    EventRecurrence, Feedback, NewPost, Post, PostDetail, PostView, UserId, average_rating,
};
pub use review::{NewReview, PlaceReview, ReviewSummary};
