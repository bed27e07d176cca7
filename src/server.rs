//! HTTP router assembly.

use std::sync::Arc;

use axum::http::HeaderName;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router, middleware};
use tower_http::trace::TraceLayer;

use crate::auth::{IdentityHeader, identity_from_header};
use crate::onboarding::{OnboardingRouteState, OnboardingService, onboarding_routes};
use crate::store::PreferenceStore;

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "onboarding-prefs"
    }))
}

/// Build the full application router.
///
/// `identity_header` is the trusted header the upstream session layer uses
/// to pass the authenticated user id.
pub fn app(store: Arc<dyn PreferenceStore>, identity_header: HeaderName) -> Router {
    let state = OnboardingRouteState {
        service: Arc::new(OnboardingService::new(store)),
    };

    Router::new()
        .route("/health", get(health))
        .merge(onboarding_routes(state))
        .layer(middleware::from_fn_with_state(
            IdentityHeader::new(identity_header),
            identity_from_header,
        ))
        .layer(TraceLayer::new_for_http())
}
