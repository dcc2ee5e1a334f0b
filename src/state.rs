//! Shared application state
//!
//! One `AppState` lives behind an `Arc` for the whole server. Operations that
//! touch more than one store live here so lock order stays fixed: communities
//! before posts. Every write to posts, feedback or communities bumps the
//! revision counter that keys the search cache.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::PersistentCache;
use crate::catalogue::{Catalogue, hotels};
use crate::communities::{CommunityDirectory, ListScope};
use crate::config::BobaConfig;
use crate::models::{
    Category, CommunitySummary, Feedback, JoinOutcome, JoinRequest, LeaveOutcome, NewCommunity,
    NewPost, NewReview, Place, PlaceReview, PostDetail, PostView, RequestAction, ReviewSummary,
    UserId,
};
use crate::posts::PostBoard;
use crate::reviews::ReviewLedger;
use crate::search::Matcher;
use crate::{BobaError, Result};

/// Body of a search response; also what the cache stores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<Place>,
}

#[derive(Debug)]
pub struct AppState {
    pub config: BobaConfig,
    pub catalogue: Catalogue,
    pub matcher: Matcher,
    pub posts: RwLock<PostBoard>,
    pub communities: RwLock<CommunityDirectory>,
    pub reviews: RwLock<ReviewLedger>,
    cache: Option<PersistentCache>,
    revision: AtomicU64,
    /// Revision and time of the last cache sweep
    last_sweep: Mutex<(u64, Instant)>,
}

impl AppState {
    #[must_use]
    pub fn new(config: BobaConfig, catalogue: Catalogue, cache: Option<PersistentCache>) -> Self {
        let matcher = Matcher::new(
            config.search.keywords.clone(),
            hotels::stuttgart_hotels(),
            config.search.shortcut_size,
        );
        Self {
            config,
            catalogue,
            matcher,
            posts: RwLock::new(PostBoard::new()),
            communities: RwLock::new(CommunityDirectory::new()),
            reviews: RwLock::new(ReviewLedger::new()),
            cache,
            revision: AtomicU64::new(0),
            last_sweep: Mutex::new((0, Instant::now())),
        }
    }

    /// Load the catalogue and open the cache described by `config`.
    ///
    /// A cache that fails to open is logged and left out.
    pub fn from_config(config: BobaConfig) -> anyhow::Result<Self> {
        let catalogue = Catalogue::load(
            &config.catalogue.places_path,
            config.catalogue.include_hotels,
        )
        .with_context(|| {
            format!(
                "Failed to load places from {}",
                config.catalogue.places_path
            )
        })?;

        let cache = if config.cache.enabled {
            let ttl = Duration::from_secs(config.cache.ttl_seconds);
            match PersistentCache::open(&config.cache.location, ttl) {
                Ok(cache) => {
                    info!("Search cache at {} (ttl {:?})", config.cache.location, ttl);
                    Some(cache)
                }
                Err(e) => {
                    warn!("Search cache disabled: {e:#}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self::new(config, catalogue, cache))
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    fn bump_revision(&self) {
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    /// A sweep is due once the revision moved or a cache TTL has passed.
    fn sweep_due(&self, revision: u64) -> bool {
        let ttl = Duration::from_secs(self.config.cache.ttl_seconds);
        let Ok(mut last) = self.last_sweep.lock() else {
            return false;
        };
        if last.0 == revision && last.1.elapsed() < ttl {
            return false;
        }
        *last = (revision, Instant::now());
        true
    }

    /// Run a search over the catalogue plus the posts `viewer` may see
    pub async fn search(&self, query: &str, viewer: Option<UserId>) -> SearchResponse {
        let viewer_key = viewer.map_or_else(|| "anon".to_string(), |u| u.to_string());
        let revision = self.revision();
        let prefix = format!("search:{revision}:");
        let key = format!("{prefix}{viewer_key}:{query}");

        if let Some(cache) = &self.cache {
            match cache.get::<SearchResponse>(&key).await {
                Ok(Some(hit)) => {
                    debug!(count = hit.count, "search served from cache");
                    return hit;
                }
                Ok(None) => {}
                Err(e) => warn!("Search cache read failed: {e:#}"),
            }
        }

        let user_posts: Vec<Place> = self
            .visible_posts(viewer, None)
            .await
            .iter()
            .map(PostView::to_place)
            .collect();
        let results = self
            .matcher
            .search(self.catalogue.places(), query, &user_posts);
        let response = SearchResponse {
            query: query.to_string(),
            count: results.len(),
            results,
        };

        if let Some(cache) = &self.cache {
            if self.sweep_due(revision)
                && let Err(e) = cache.sweep(&prefix).await
            {
                warn!("Search cache sweep failed: {e:#}");
            }
            if let Err(e) = cache.put(&key, &response).await {
                warn!("Search cache write failed: {e:#}");
            }
        }
        response
    }

    /// Posts `viewer` may see, newest first
    pub async fn visible_posts(
        &self,
        viewer: Option<UserId>,
        category: Option<Category>,
    ) -> Vec<PostView> {
        let communities = self.communities.read().await;
        let posts = self.posts.read().await;
        posts
            .list(category)
            .into_iter()
            .filter(|view| communities.can_view_post(&view.post, viewer))
            .collect()
    }

    pub async fn create_post(&self, user: UserId, input: NewPost) -> Result<PostView> {
        let communities = self.communities.read().await;
        if let Some(community_id) = input.community_id
            && !communities.is_member(community_id, user)
        {
            return Err(BobaError::forbidden(
                "You must be a member of the community to post in it",
            ));
        }
        let view = self.posts.write().await.create(user, input)?;
        self.bump_revision();
        Ok(view)
    }

    /// One post with its feedback; hidden posts read as missing
    pub async fn post_detail(&self, viewer: Option<UserId>, post_id: u64) -> Result<PostDetail> {
        let communities = self.communities.read().await;
        let detail = self.posts.read().await.get(post_id)?;
        if !communities.can_view_post(&detail.view.post, viewer) {
            return Err(BobaError::not_found("Post not found"));
        }
        Ok(detail)
    }

    pub async fn delete_post(&self, user: UserId, post_id: u64) -> Result<()> {
        self.posts.write().await.delete(user, post_id)?;
        self.bump_revision();
        Ok(())
    }

    pub async fn add_feedback(
        &self,
        user: UserId,
        post_id: u64,
        rating: Option<i64>,
        comment: Option<String>,
    ) -> Result<Feedback> {
        let communities = self.communities.read().await;
        let mut posts = self.posts.write().await;
        let visible = posts
            .get(post_id)
            .is_ok_and(|detail| communities.can_view_post(&detail.view.post, Some(user)));
        if !visible {
            return Err(BobaError::not_found("Post not found"));
        }
        let feedback = posts.add_feedback(user, post_id, rating, comment)?;
        self.bump_revision();
        Ok(feedback)
    }

    pub async fn create_community(
        &self,
        user: UserId,
        input: NewCommunity,
    ) -> Result<CommunitySummary> {
        let summary = self.communities.write().await.create(user, input)?;
        self.bump_revision();
        Ok(summary)
    }

    pub async fn list_communities(
        &self,
        scope: &ListScope,
        viewer: Option<UserId>,
    ) -> Vec<CommunitySummary> {
        self.communities.read().await.list(scope, viewer)
    }

    pub async fn join_community(
        &self,
        user: UserId,
        community_id: u64,
        message: Option<String>,
    ) -> Result<JoinOutcome> {
        let outcome = self
            .communities
            .write()
            .await
            .join(user, community_id, message)?;
        self.bump_revision();
        Ok(outcome)
    }

    /// Leave a community; the creator leaving also drops its posts
    pub async fn leave_community(&self, user: UserId, community_id: u64) -> Result<LeaveOutcome> {
        let mut communities = self.communities.write().await;
        let outcome = communities.leave(user, community_id)?;
        if outcome == LeaveOutcome::Deleted {
            let removed = self.posts.write().await.remove_by_community(community_id);
            info!(community_id, removed, "removed posts of deleted community");
        }
        self.bump_revision();
        Ok(outcome)
    }

    pub async fn pending_requests(&self, user: UserId, community_id: u64) -> Result<Vec<JoinRequest>> {
        self.communities
            .read()
            .await
            .pending_requests(user, community_id)
    }

    pub async fn respond_to_request(
        &self,
        user: UserId,
        community_id: u64,
        request_id: u64,
        action: RequestAction,
    ) -> Result<JoinRequest> {
        let request = self
            .communities
            .write()
            .await
            .respond(user, community_id, request_id, action)?;
        self.bump_revision();
        Ok(request)
    }

    pub async fn submit_review(&self, user: UserId, input: NewReview) -> Result<(PlaceReview, bool)> {
        self.reviews.write().await.submit(user, input)
    }

    pub async fn review_summary(&self, name: &str) -> Result<ReviewSummary> {
        self.reviews.read().await.summary(name)
    }
}
