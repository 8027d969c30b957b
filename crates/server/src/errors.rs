use axum::extract::rejection::{BytesRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

/// Uniform error body: `{"status": <code>, "error": "<reason>", "message": "<detail>"}`.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "The method is not allowed for the requested URL.",
        )
    }

    /// Generic 500; callers log the cause themselves.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "The server encountered an internal error.")
    }

    pub fn label(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("Error")
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "status": self.status.as_u16(),
            "error": self.label(),
            "message": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        if !e.is_client_error() {
            error!(error = %e, "promotion store operation failed");
            return Self::internal();
        }
        match e {
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Validation(msg) | ServiceError::Model(ModelError::Validation(msg)) => {
                Self::bad_request(msg)
            }
            other => Self::bad_request(other.to_string()),
        }
    }
}

// Extractor rejections keep axum's status but use the JSON envelope.
impl From<QueryRejection> for JsonApiError {
    fn from(r: QueryRejection) -> Self {
        Self::new(r.status(), r.body_text())
    }
}

impl From<BytesRejection> for JsonApiError {
    fn from(r: BytesRejection) -> Self {
        Self::new(r.status(), r.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_statuses() {
        let e: JsonApiError = ServiceError::Validation("bad".into()).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.message, "bad");

        let missing = ModelError::Validation("Invalid promotion: missing price".into());
        let e: JsonApiError = ServiceError::Model(missing).into();
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.message, "Invalid promotion: missing price");

        let e: JsonApiError = ServiceError::not_found(3).into();
        assert_eq!(e.status, StatusCode::NOT_FOUND);
        assert_eq!(e.label(), "Not Found");
    }

    #[test]
    fn store_failures_hide_details() {
        let e: JsonApiError = ServiceError::Db("connection refused to 10.0.0.7".into()).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!e.message.contains("10.0.0.7"));

        let e: JsonApiError = ServiceError::Model(ModelError::Db("boom".into())).into();
        assert_eq!(e.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn query_rejections_keep_status() {
        use axum::extract::Query;
        use axum::http::Uri;
        use std::collections::HashMap;

        let uri: Uri = "http://localhost/promotions?count=many".parse().unwrap();
        let rejection = Query::<HashMap<String, u32>>::try_from_uri(&uri).unwrap_err();
        let e = JsonApiError::from(rejection);
        assert_eq!(e.status, StatusCode::BAD_REQUEST);
        assert_eq!(e.label(), "Bad Request");
        assert!(e.message.contains("query string"));
    }

    #[test]
    fn labels_follow_status() {
        assert_eq!(JsonApiError::unsupported_media_type("x").label(), "Unsupported Media Type");
        assert_eq!(JsonApiError::method_not_allowed().label(), "Method Not Allowed");
        assert_eq!(JsonApiError::internal().label(), "Internal Server Error");
    }
}
