//! JSON API mounted under `/api`

mod extract;

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

pub use extract::{ActingUser, JsonBody, MaybeUser, QueryParams, USER_HEADER};

use crate::catalogue::PlaceFilter;
use crate::communities::ListScope;
use crate::models::{
    Category, Coordinates, JoinOutcome, LeaveOutcome, NewCommunity, NewPost, NewReview,
    RequestAction, ReviewSummary,
};
use crate::state::{AppState, SearchResponse};
use crate::{BobaError, Result, VERSION};

type AppResult<T> = Result<Json<T>>;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search))
        .route("/places", get(list_places))
        .route("/places/reviews", get(review_summary).post(submit_review))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post).delete(delete_post))
        .route("/posts/{id}/feedback", post(add_feedback))
        .route("/communities", get(list_communities).post(create_community))
        .route(
            "/communities/{id}/join",
            post(join_community).delete(leave_community),
        )
        .route(
            "/communities/{id}/requests",
            get(pending_requests).post(respond_to_request),
        )
}

fn parse_id(raw: &str, what: &str) -> Result<u64> {
    raw.parse()
        .map_err(|_| BobaError::validation(format!("Invalid {what} ID")))
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>> {
    raw.filter(|c| !c.is_empty())
        .map(str::parse)
        .transpose()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": VERSION }))
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[instrument(skip(state))]
async fn search(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    QueryParams(params): QueryParams<SearchParams>,
) -> Json<SearchResponse> {
    Json(state.search(&params.q, viewer).await)
}

/// Raw listing parameters; parsed by hand for readable 400s
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacesParams {
    category: Option<String>,
    max_price: Option<String>,
    limit: Option<String>,
    lat: Option<String>,
    lng: Option<String>,
    radius_km: Option<String>,
}

fn parse_number(raw: &str, name: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| BobaError::validation(format!("{name} must be a number")))
}

impl PlacesParams {
    fn into_filter(self) -> Result<PlaceFilter> {
        let category = parse_category(self.category.as_deref())?;

        let max_price = self
            .max_price
            .as_deref()
            .map(|p| parse_number(p, "maxPrice"))
            .transpose()?;
        if max_price.is_some_and(|p| p < 0.0) {
            return Err(BobaError::validation("maxPrice cannot be negative"));
        }

        let limit = self
            .limit
            .as_deref()
            .map(|l| {
                l.trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|l| *l >= 1)
                    .ok_or_else(|| BobaError::validation("limit must be a positive integer"))
            })
            .transpose()?;

        let near = match (self.lat, self.lng, self.radius_km) {
            (None, None, None) => None,
            (Some(lat), Some(lng), Some(radius)) => {
                let center = Coordinates::new(
                    parse_number(&lat, "lat")?,
                    parse_number(&lng, "lng")?,
                );
                let radius = parse_number(&radius, "radiusKm")?;
                if !center.is_valid() || radius < 0.0 {
                    return Err(BobaError::validation("Coordinates or radius out of range"));
                }
                Some((center, radius))
            }
            _ => {
                return Err(BobaError::validation(
                    "lat, lng and radiusKm must be given together",
                ));
            }
        };

        Ok(PlaceFilter {
            category,
            max_price,
            limit,
            near,
        })
    }
}

#[instrument(skip(state))]
async fn list_places(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<PlacesParams>,
) -> AppResult<Value> {
    let filter = params.into_filter()?;
    let places = state.catalogue.filter(&filter);
    Ok(Json(json!({ "count": places.len(), "places": places })))
}

#[derive(Debug, Deserialize)]
struct ReviewParams {
    name: Option<String>,
}

async fn review_summary(
    State(state): State<Arc<AppState>>,
    QueryParams(params): QueryParams<ReviewParams>,
) -> AppResult<ReviewSummary> {
    let name = params.name.unwrap_or_default();
    Ok(Json(state.review_summary(&name).await?))
}

#[instrument(skip(state, input))]
async fn submit_review(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    JsonBody(input): JsonBody<NewReview>,
) -> AppResult<Value> {
    let (review, updated) = state.submit_review(user, input).await?;
    Ok(Json(json!({ "review": review, "updated": updated })))
}

#[derive(Debug, Deserialize)]
struct PostListParams {
    category: Option<String>,
}

async fn list_posts(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    QueryParams(params): QueryParams<PostListParams>,
) -> AppResult<Value> {
    let category = parse_category(params.category.as_deref())?;
    let posts = state.visible_posts(viewer, category).await;
    Ok(Json(json!({ "posts": posts })))
}

#[instrument(skip(state, input))]
async fn create_post(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    JsonBody(input): JsonBody<NewPost>,
) -> AppResult<Value> {
    let post = state.create_post(user, input).await?;
    Ok(Json(json!({ "post": post })))
}

async fn get_post(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> AppResult<Value> {
    let post = state.post_detail(viewer, parse_id(&id, "post")?).await?;
    Ok(Json(json!({ "post": post })))
}

#[instrument(skip(state))]
async fn delete_post(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(id): Path<String>,
) -> AppResult<Value> {
    state.delete_post(user, parse_id(&id, "post")?).await?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
struct FeedbackBody {
    rating: Option<i64>,
    comment: Option<String>,
}

#[instrument(skip(state, body))]
async fn add_feedback(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<FeedbackBody>,
) -> AppResult<Value> {
    let post_id = parse_id(&id, "post")?;
    let feedback = state
        .add_feedback(user, post_id, body.rating, body.comment)
        .await?;
    Ok(Json(json!({ "feedback": feedback })))
}

#[derive(Debug, Deserialize)]
struct CommunityParams {
    search: Option<String>,
    my: Option<String>,
}

async fn list_communities(
    State(state): State<Arc<AppState>>,
    MaybeUser(viewer): MaybeUser,
    QueryParams(params): QueryParams<CommunityParams>,
) -> Json<Value> {
    let scope = match (params.search.filter(|s| !s.is_empty()), params.my.as_deref()) {
        (Some(term), _) => ListScope::Search(term),
        (None, Some("true")) => ListScope::Mine,
        _ => ListScope::Public,
    };
    let communities = state.list_communities(&scope, viewer).await;
    Json(json!({ "communities": communities }))
}

#[instrument(skip(state, input))]
async fn create_community(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    JsonBody(input): JsonBody<NewCommunity>,
) -> AppResult<Value> {
    let community = state.create_community(user, input).await?;
    Ok(Json(json!({ "community": community })))
}

#[derive(Debug, Default, Deserialize)]
struct JoinBody {
    message: Option<String>,
}

/// The join body is optional; anything unreadable counts as empty
#[instrument(skip(state, body))]
async fn join_community(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(id): Path<String>,
    body: Bytes,
) -> AppResult<Value> {
    let community_id = parse_id(&id, "community")?;
    let message = serde_json::from_slice::<JoinBody>(&body)
        .unwrap_or_default()
        .message;

    let outcome = state.join_community(user, community_id, message).await?;
    let message = match outcome {
        JoinOutcome::Joined => "Successfully joined the community!",
        JoinOutcome::Pending => "Join request sent! Waiting for admin approval.",
    };
    Ok(Json(json!({ "success": true, "message": message, "status": outcome })))
}

#[instrument(skip(state))]
async fn leave_community(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(id): Path<String>,
) -> AppResult<Value> {
    let community_id = parse_id(&id, "community")?;
    let (message, deleted) = match state.leave_community(user, community_id).await? {
        LeaveOutcome::Deleted => ("Community deleted", true),
        LeaveOutcome::Left => ("Left the community", false),
    };
    Ok(Json(json!({ "success": true, "message": message, "deleted": deleted })))
}

async fn pending_requests(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(id): Path<String>,
) -> AppResult<Value> {
    let requests = state
        .pending_requests(user, parse_id(&id, "community")?)
        .await?;
    Ok(Json(json!({ "requests": requests })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RespondBody {
    request_id: Option<u64>,
    action: Option<String>,
}

#[instrument(skip(state, body))]
async fn respond_to_request(
    State(state): State<Arc<AppState>>,
    ActingUser(user): ActingUser,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<RespondBody>,
) -> AppResult<Value> {
    let community_id = parse_id(&id, "community")?;
    let action = match body.action.as_deref() {
        Some("accept") => Some(RequestAction::Accept),
        Some("reject") => Some(RequestAction::Reject),
        _ => None,
    };
    let (Some(request_id), Some(action)) = (body.request_id, action) else {
        return Err(BobaError::validation(
            "Provide requestId and action (accept/reject)",
        ));
    };

    state
        .respond_to_request(user, community_id, request_id, action)
        .await?;
    let message = match action {
        RequestAction::Accept => "Request accepted!",
        RequestAction::Reject => "Request rejected",
    };
    Ok(Json(json!({ "success": true, "message": message })))
}
