//! Router-level tests for the boba-map JSON API

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use boba_map::catalogue::hotels;
use boba_map::{AppState, BobaConfig, Catalogue, Category, Coordinates, Place};
use rstest::rstest;
use serde_json::{Value, json};
use tower::ServiceExt;

fn catalogue() -> Catalogue {
    let mut places = vec![
        Place::new(
            "place-1",
            "Kebab House",
            "Turkish kebab and falafel",
            Category::Food,
            Coordinates::new(48.7745, 9.1712),
        )
        .with_tags(["kebab", "turkish"])
        .with_rating(4.5)
        .with_price(7.0),
        Place::new(
            "place-2",
            "Quiet Inn",
            "Rooms near the station",
            Category::Accommodation,
            Coordinates::new(48.7840, 9.1820),
        )
        .with_price(80.0),
    ];
    places.extend(hotels::stuttgart_hotels());
    Catalogue::new(places)
}

fn app() -> Router {
    let state = AppState::new(BobaConfig::default(), catalogue(), None);
    boba_map::web::app(Arc::new(state))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<u64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.to_string());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn get(app: &Router, uri: &str, user: Option<u64>) -> (StatusCode, Value) {
    call(app, Method::GET, uri, user, None).await
}

async fn post(app: &Router, uri: &str, user: Option<u64>, body: Value) -> (StatusCode, Value) {
    call(app, Method::POST, uri, user, Some(body)).await
}

fn ids(results: &Value) -> Vec<String> {
    results
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(&app(), "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], boba_map::VERSION);
}

#[tokio::test]
async fn test_search_ranks_kebab_first() {
    let (status, body) = get(&app(), "/api/search?q=best%20kebab", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query"], "best kebab");
    let found = ids(&body["results"]);
    assert_eq!(found.first().map(String::as_str), Some("place-1"));
    assert!(!found.contains(&"place-2".to_string()));
    assert_eq!(body["count"], found.len());
}

#[tokio::test]
async fn test_search_cheap_hotel_shortcut() {
    let (_, body) = get(&app(), "/api/search?q=cheap%20hotel%20with%20kebab", None).await;
    assert_eq!(
        ids(&body["results"]),
        vec![
            "hotel-cheap-1",
            "hotel-cheap-2",
            "hotel-cheap-3",
            "hotel-cheap-4",
            "hotel-cheap-5"
        ]
    );
    assert_eq!(body["results"][0]["price"], 25.0);
}

#[tokio::test]
async fn test_empty_search() {
    let (status, body) = get(&app(), "/api/search?q=", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
    let (_, body) = get(&app(), "/api/search", None).await;
    assert_eq!(body["results"], json!([]));
}

#[tokio::test]
async fn test_list_places_filters() {
    let app = app();
    let (status, body) = get(&app, "/api/places?category=accommodation&maxPrice=40", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (_, body) = get(&app, "/api/places?limit=2", None).await;
    assert_eq!(body["count"], 2);

    let (_, body) = get(&app, "/api/places?lat=48.7745&lng=9.1712&radiusKm=0.1", None).await;
    assert_eq!(ids(&body["places"]), vec!["place-1"]);
}

#[rstest]
#[case("/api/places?category=museum")]
#[case("/api/places?maxPrice=-1")]
#[case("/api/places?maxPrice=cheap")]
#[case("/api/places?limit=0")]
#[case("/api/places?lat=48.7&lng=9.1")]
#[tokio::test]
async fn test_list_places_rejects_bad_params(#[case] uri: &str) {
    let (status, body) = get(&app(), uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_wrongly_typed_body_is_a_json_400() {
    let (status, body) = post(
        &app(),
        "/api/posts",
        Some(1),
        json!({
            "title": "Kebab pop-up",
            "description": "Street food",
            "category": "food",
            "lat": "abc",
            "lng": 9.18
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("lat"));
}

#[tokio::test]
async fn test_body_without_content_type_is_a_json_400() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/communities")
        .header("x-user-id", "1")
        .body(Body::from(json!({ "name": "Kebab fans" }).to_string()))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_duplicated_query_param_is_a_json_400() {
    let (status, body) = get(&app(), "/api/places?limit=1&limit=2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_post_lifecycle() {
    let app = app();
    let new_post = json!({
        "title": "Kebab pop-up",
        "description": "Street food stall this weekend",
        "category": "food",
        "lat": 48.775,
        "lng": 9.18,
        "price": 5,
        "eventDate": "2026-11-07",
        "eventTime": "18:00",
        "eventRecurrence": "once"
    });

    let (status, _) = post(&app, "/api/posts", None, new_post.clone()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post(&app, "/api/posts", Some(1), new_post).await;
    assert_eq!(status, StatusCode::OK);
    let id = body["post"]["id"].as_u64().unwrap();
    assert_eq!(body["post"]["eventTime"], "18:00");
    assert_eq!(body["post"]["rating"], Value::Null);

    let (status, _) = post(
        &app,
        &format!("/api/posts/{id}/feedback"),
        Some(2),
        json!({ "rating": 4, "comment": "tasty" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post(
        &app,
        &format!("/api/posts/{id}/feedback"),
        Some(2),
        json!({ "rating": 9 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = get(&app, &format!("/api/posts/{id}"), None).await;
    assert_eq!(body["post"]["feedbackCount"], 1);
    assert_eq!(body["post"]["rating"], 4.0);
    assert_eq!(body["post"]["feedbacks"][0]["comment"], "tasty");

    // the post joins the search pool
    let (_, body) = get(&app, "/api/search?q=kebab", None).await;
    assert!(ids(&body["results"]).contains(&format!("post-{id}")));

    let (status, _) = call(&app, Method::DELETE, &format!("/api/posts/{id}"), Some(2), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = call(&app, Method::DELETE, &format!("/api/posts/{id}"), Some(1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, body) = get(&app, "/api/posts", None).await;
    assert_eq!(body["posts"], json!([]));
}

#[rstest]
#[case(json!({ "description": "x", "category": "food", "lat": 1.0, "lng": 1.0 }))]
#[case(json!({ "title": "Bus", "description": "x", "category": "transport", "lat": 1.0, "lng": 1.0 }))]
#[case(json!({ "title": "Far", "description": "x", "category": "food", "lat": 91.0, "lng": 1.0 }))]
#[tokio::test]
async fn test_create_post_validation(#[case] body: Value) {
    let (status, body) = post(&app(), "/api/posts", Some(1), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_invalid_ids_are_bad_requests() {
    let (status, body) = get(&app(), "/api/posts/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("post"));
    let (status, _) = get(&app(), "/api/posts/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_place_reviews() {
    let app = app();
    let (status, body) = post(
        &app,
        "/api/places/reviews",
        Some(1),
        json!({ "placeName": "Kebab House", "placeCategory": "food", "rating": 5 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], false);

    let (_, body) = post(
        &app,
        "/api/places/reviews",
        Some(1),
        json!({ "placeName": "kebab  house", "rating": 3 }),
    )
    .await;
    assert_eq!(body["updated"], true);

    let (_, body) = get(&app, "/api/places/reviews?name=KEBAB%20HOUSE", None).await;
    assert_eq!(body["placeKey"], "kebab house");
    assert_eq!(body["reviewCount"], 1);
    assert_eq!(body["rating"], 3.0);

    let (status, _) = get(&app, "/api/places/reviews", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_private_community_flow() {
    let app = app();
    let (status, body) = post(
        &app,
        "/api/communities",
        Some(1),
        json!({ "name": "Secret Supper Club", "isPublic": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["community"]["userRole"], "admin");
    let id = body["community"]["id"].as_u64().unwrap();

    // members-only post stays hidden from outsiders
    let (status, _) = post(
        &app,
        "/api/posts",
        Some(1),
        json!({
            "title": "Supper at mine",
            "description": "Dinner for members",
            "category": "food",
            "lat": 48.77,
            "lng": 9.17,
            "communityId": id
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get(&app, "/api/posts", Some(2)).await;
    assert_eq!(body["posts"], json!([]));

    let (_, body) = call(
        &app,
        Method::POST,
        &format!("/api/communities/{id}/join"),
        Some(2),
        None,
    )
    .await;
    assert_eq!(body["status"], "pending");
    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/communities/{id}/join"),
        Some(2),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = get(&app, &format!("/api/communities/{id}/requests"), Some(2)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (_, body) = get(&app, &format!("/api/communities/{id}/requests"), Some(1)).await;
    let request_id = body["requests"][0]["id"].as_u64().unwrap();

    let (status, body) = post(
        &app,
        &format!("/api/communities/{id}/requests"),
        Some(1),
        json!({ "requestId": request_id, "action": "accept" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request accepted!");

    let (_, body) = get(&app, "/api/posts", Some(2)).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);

    let (_, body) = get(&app, "/api/communities?my=true", Some(2)).await;
    assert_eq!(body["communities"][0]["memberCount"], 2);

    // the creator leaving deletes the community and its posts
    let (_, body) = call(
        &app,
        Method::DELETE,
        &format!("/api/communities/{id}/join"),
        Some(1),
        None,
    )
    .await;
    assert_eq!(body["deleted"], true);
    let (_, body) = get(&app, "/api/posts", Some(1)).await;
    assert_eq!(body["posts"], json!([]));
}

#[tokio::test]
async fn test_respond_requires_valid_action() {
    let app = app();
    let (_, body) = post(&app, "/api/communities", Some(1), json!({ "name": "Nomads" })).await;
    let id = body["community"]["id"].as_u64().unwrap();
    let (status, _) = post(
        &app,
        &format!("/api/communities/{id}/requests"),
        Some(1),
        json!({ "requestId": 1, "action": "maybe" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
