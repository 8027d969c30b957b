pub mod promotions;

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, Level};

use common::types::{Health, ServiceInfo};
use configs::ServerConfig;
use service::promotion::{PromotionService, SeaOrmPromotionRepository};

use crate::errors::JsonApiError;

pub type Promotions = PromotionService<SeaOrmPromotionRepository>;

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct ServerState {
    pub promotions: Arc<Promotions>,
    /// Origin used for links when a request carries no `Host` header.
    pub fallback_base: String,
}

/// Configured origin; wildcard bind addresses are shown as `localhost`.
pub fn fallback_base(server: &ServerConfig) -> String {
    let host = match server.host.as_str() {
        "0.0.0.0" | "::" => "localhost",
        other => other,
    };
    format!("http://{}:{}", host, server.port)
}

impl ServerState {
    pub fn new(promotions: Arc<Promotions>, server: &ServerConfig) -> Self {
        Self { promotions, fallback_base: fallback_base(server) }
    }

    /// `http://<Host>` of the current request, or the configured origin.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .filter(|h| !h.is_empty())
            .map(|h| format!("http://{h}"))
            .unwrap_or_else(|| self.fallback_base.clone())
    }
}

pub async fn index(State(state): State<ServerState>, headers: HeaderMap) -> Json<ServiceInfo> {
    Json(ServiceInfo::new(&state.base_url(&headers)))
}

pub async fn health(State(state): State<ServerState>, headers: HeaderMap) -> Json<Health> {
    Json(Health::new(format!("{}/health", state.base_url(&headers))))
}

async fn not_found() -> JsonApiError {
    JsonApiError::not_found("The requested URL was not found on the server.")
}

/// Axum answers unsupported verbs with an empty 405; give it the error body.
async fn envelope_method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }
    let allow = response.headers().get(header::ALLOW).cloned();
    let mut rewritten = JsonApiError::method_not_allowed().into_response();
    if let Some(allow) = allow {
        rewritten.headers_mut().insert(header::ALLOW, allow);
    }
    rewritten
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = %detail, "handler panicked");
    JsonApiError::internal().into_response()
}

/// Build the full application router.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let api = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/promotions", get(promotions::list).post(promotions::create))
        .route("/promotions/unavailable", delete(promotions::delete_unavailable))
        .route("/promotions/reset", delete(promotions::reset))
        .route(
            "/promotions/:id",
            get(promotions::get).put(promotions::update).delete(promotions::delete),
        )
        .fallback(not_found)
        .with_state(state);

    api.layer(
        ServiceBuilder::new()
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(
                        DefaultMakeSpan::new().level(Level::INFO).include_headers(false),
                    )
                    .on_request(DefaultOnRequest::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                    .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
            )
            .layer(cors)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::map_response(envelope_method_not_allowed)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn fallback_base_replaces_wildcard_host() {
        let cfg = ServerConfig::default();
        assert_eq!(fallback_base(&cfg), "http://localhost:5000");
        let cfg = ServerConfig { host: "10.1.2.3".into(), port: 8081, ..ServerConfig::default() };
        assert_eq!(fallback_base(&cfg), "http://10.1.2.3:8081");
    }

    #[tokio::test]
    async fn method_not_allowed_gets_envelope_and_keeps_allow() {
        let mut res = StatusCode::METHOD_NOT_ALLOWED.into_response();
        res.headers_mut().insert(header::ALLOW, HeaderValue::from_static("GET,POST"));
        let res = envelope_method_not_allowed(res).await;
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[header::ALLOW], "GET,POST");
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn other_responses_pass_through() {
        let res = envelope_method_not_allowed(StatusCode::NO_CONTENT.into_response()).await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(res.headers().get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn panics_become_500() {
        let res = panic_response(Box::new("boom"));
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
