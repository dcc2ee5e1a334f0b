//! Request extractors
//!
//! Identity is taken from the `x-user-id` header as-is; issuing and checking
//! sessions is left to whatever sits in front of the service. Body and query
//! rejections are turned into validation errors so they share the JSON error
//! shape.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;

use crate::BobaError;
use crate::models::UserId;

pub const USER_HEADER: &str = "x-user-id";

fn user_from_parts(parts: &Parts) -> Option<UserId> {
    parts
        .headers
        .get(USER_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// The caller, required
#[derive(Debug, Clone, Copy)]
pub struct ActingUser(pub UserId);

/// The caller, if the request names one
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<UserId>);

impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = BobaError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts)
            .map(ActingUser)
            .ok_or(BobaError::Unauthenticated)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_from_parts(parts)))
    }
}

/// JSON request body
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = BobaError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| BobaError::validation(rejection.body_text()))?;
        Ok(JsonBody(value))
    }
}

/// Query-string parameters
#[derive(Debug)]
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = BobaError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| BobaError::validation(rejection.body_text()))?;
        Ok(QueryParams(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use rstest::rstest;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Rating {
        stars: u8,
    }

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = axum::http::Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_HEADER, value);
        }
        builder.body(Body::empty()).unwrap().into_parts().0
    }

    #[rstest]
    #[case(Some("42"), Some(42))]
    #[case(Some(" 7 "), Some(7))]
    #[case(Some("bob"), None)]
    #[case(Some("-1"), None)]
    #[case(None, None)]
    fn test_user_from_header(#[case] header: Option<&str>, #[case] expected: Option<UserId>) {
        assert_eq!(user_from_parts(&parts(header)), expected);
    }

    #[tokio::test]
    async fn test_acting_user_requires_header() {
        let mut anonymous = parts(None);
        let rejected = ActingUser::from_request_parts(&mut anonymous, &()).await;
        assert!(matches!(rejected, Err(BobaError::Unauthenticated)));

        let mut named = parts(Some("3"));
        let user = ActingUser::from_request_parts(&mut named, &()).await.unwrap();
        assert_eq!(user.0, 3);
    }

    fn json_request(content_type: Option<&str>, body: &str) -> Request {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_json_body_accepts_valid_input() {
        let request = json_request(Some("application/json"), r#"{"stars": 4}"#);
        let JsonBody(rating) = JsonBody::<Rating>::from_request(request, &()).await.unwrap();
        assert_eq!(rating.stars, 4);
    }

    #[rstest]
    #[case(Some("application/json"), r#"{"stars": "four"}"#)]
    #[case(Some("application/json"), "{not json")]
    #[case(None, r#"{"stars": 4}"#)]
    #[case(Some("text/plain"), r#"{"stars": 4}"#)]
    #[tokio::test]
    async fn test_json_body_rejections_are_validation_errors(
        #[case] content_type: Option<&str>,
        #[case] body: &str,
    ) {
        let request = json_request(content_type, body);
        let rejected = JsonBody::<Rating>::from_request(request, &()).await;
        assert!(matches!(rejected, Err(BobaError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_query_params_rejections_are_validation_errors() {
        let mut good = axum::http::Request::builder()
            .uri("/?stars=5")
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0;
        let QueryParams(rating) = QueryParams::<Rating>::from_request_parts(&mut good, &())
            .await
            .unwrap();
        assert_eq!(rating.stars, 5);

        let mut bad = axum::http::Request::builder()
            .uri("/?stars=lots")
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0;
        let rejected = QueryParams::<Rating>::from_request_parts(&mut bad, &()).await;
        assert!(matches!(rejected, Err(BobaError::Validation { .. })));
    }
}
