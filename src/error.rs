//! Error types for the onboarding preferences service.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Top-level error type for the service binary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Which onboarding operation failed. Selects the caller-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Fetch,
}

impl Operation {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::Save => "Failed to save preferences",
            Self::Fetch => "Failed to fetch preferences",
        }
    }
}

/// Errors surfaced by the onboarding handlers.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("No preferences found")]
    NotFound,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("{}: {source}", .op.failure_message())]
    Store {
        op: Operation,
        #[source]
        source: DatabaseError,
    },
}

impl OnboardingError {
    pub fn store(op: Operation, source: DatabaseError) -> Self {
        Self::Store { op, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::Store { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OnboardingError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Unauthorized => serde_json::json!({"error": "Unauthorized"}),
            Self::NotFound => serde_json::json!({"error": "No preferences found"}),
            Self::InvalidBody(details) => serde_json::json!({
                "error": "Invalid request body",
                "details": details,
            }),
            // The store message is passed through verbatim.
            Self::Store { op, source } => serde_json::json!({
                "error": op.failure_message(),
                "details": source.to_string(),
            }),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unauthorized_maps_to_401() {
        let resp = OnboardingError::Unauthorized.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!({"error": "Unauthorized"}));
    }

    #[tokio::test]
    async fn not_found_maps_to_404() {
        let resp = OnboardingError::NotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "No preferences found");
        assert!(json.get("details").is_none());
    }

    #[tokio::test]
    async fn store_failure_carries_operation_message_and_details() {
        let err = OnboardingError::store(
            Operation::Save,
            DatabaseError::Query("disk I/O error".into()),
        );
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["error"], "Failed to save preferences");
        assert_eq!(json["details"], "Query failed: disk I/O error");
    }

    #[test]
    fn fetch_failure_message() {
        let err = OnboardingError::store(Operation::Fetch, DatabaseError::Pool("gone".into()));
        assert_eq!(
            err.to_string(),
            "Failed to fetch preferences: Connection pool error: gone"
        );
    }
}
