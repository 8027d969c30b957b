//! `/promotions` resource handlers.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use models::promotion::{Promotion, BAD_DATA};
use serde_json::Value;
use service::promotion::PromotionFilter;
use tracing::info;

use crate::{errors::JsonApiError, routes::ServerState};

#[derive(Debug, Default, PartialEq)]
pub struct ListQuery {
    pub category: Option<String>,
    pub name: Option<String>,
    pub availability: Option<String>,
}

impl ListQuery {
    /// Repeated keys keep their first value; unknown keys are ignored.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut q = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "category" => &mut q.category,
                "name" => &mut q.name,
                "availability" => &mut q.availability,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        q
    }
}

/// Non-integer ids cannot name a promotion, so they read as not found.
fn parse_id(raw: &str) -> Result<i32, JsonApiError> {
    raw.parse::<i32>()
        .map_err(|_| JsonApiError::not_found(format!("Promotion with id '{raw}' was not found.")))
}

fn require_json(headers: &HeaderMap) -> Result<(), JsonApiError> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false);
    if is_json {
        Ok(())
    } else {
        Err(JsonApiError::unsupported_media_type("Content-Type must be application/json"))
    }
}

fn parse_body(body: Result<Bytes, BytesRejection>) -> Result<Value, JsonApiError> {
    let body = body?;
    serde_json::from_slice(&body).map_err(|_| JsonApiError::bad_request(BAD_DATA))
}

fn serialize_all(rows: &[Promotion]) -> Vec<Value> {
    rows.iter().map(Promotion::serialize).collect()
}

pub async fn list(
    State(state): State<ServerState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Value>>, JsonApiError> {
    let Query(pairs) = query?;
    let q = ListQuery::from_pairs(pairs);
    let filter = PromotionFilter::select(q.category, q.name, q.availability.as_deref())?;
    let rows = state.promotions.list(filter).await?;
    Ok(Json(serialize_all(&rows)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, JsonApiError> {
    let id = parse_id(&id)?;
    let promotion = state.promotions.require(id).await?;
    Ok(Json(promotion.serialize()))
}

pub async fn create(
    State(state): State<ServerState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<impl IntoResponse, JsonApiError> {
    require_json(&headers)?;
    let data = parse_body(body)?;
    let promotion = state.promotions.create(&data).await?;
    let id = promotion.id.unwrap_or_default();
    let location = format!("{}/promotions/{}", state.base_url(&headers), id);
    info!(id, %location, "promotion created");
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(promotion.serialize())))
}

pub async fn update(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, JsonApiError> {
    let id = parse_id(&id)?;
    let existing = state.promotions.require(id).await?;
    require_json(&headers)?;
    let data = parse_body(body)?;
    let promotion = state.promotions.replace(existing, &data).await?;
    Ok(Json(promotion.serialize()))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    let id = parse_id(&id)?;
    state.promotions.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_unavailable(
    State(state): State<ServerState>,
) -> Result<StatusCode, JsonApiError> {
    state.promotions.delete_unavailable().await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset(State(state): State<ServerState>) -> Result<StatusCode, JsonApiError> {
    state.promotions.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_content_type(v: &'static str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(header::CONTENT_TYPE, HeaderValue::from_static(v));
        h
    }

    #[test]
    fn json_content_type_variants() {
        assert!(require_json(&with_content_type("application/json")).is_ok());
        assert!(require_json(&with_content_type("application/json; charset=utf-8")).is_ok());
        assert!(require_json(&with_content_type("Application/JSON")).is_ok());
    }

    #[test]
    fn other_content_types_are_415() {
        for v in ["application/x-www-form-urlencoded", "text/plain", "application/jsonp"] {
            let err = require_json(&with_content_type(v)).unwrap_err();
            assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        }
        let err = require_json(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn ids_must_be_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("abc").unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(parse_id("99999999999").unwrap_err().status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn malformed_json_is_bad_request() {
        let err = parse_body(Ok(Bytes::from_static(b"{not json"))).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, BAD_DATA);
        assert!(parse_body(Ok(Bytes::new())).is_err());
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn repeated_query_keys_keep_first_value() {
        let q = ListQuery::from_pairs(pairs(&[
            ("category", "Fruit"),
            ("category", "Vegetable"),
            ("page", "2"),
            ("availability", "true"),
        ]));
        assert_eq!(q.category.as_deref(), Some("Fruit"));
        assert_eq!(q.name, None);
        assert_eq!(q.availability.as_deref(), Some("true"));
        assert_eq!(ListQuery::from_pairs(Vec::new()), ListQuery::default());
    }
}
