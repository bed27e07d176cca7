//! REST endpoints for saving and reading onboarding preferences.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::routing::get;
use axum::{Json, Router};

use super::model::OnboardingPreferences;
use super::service::OnboardingService;
use crate::auth::{CurrentUser, require_user};
use crate::error::OnboardingError;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub service: Arc<OnboardingService>,
}

/// POST /api/v1/onboarding
///
/// Replaces the caller's preferences. Responds `{"success": true}`.
/// An empty body saves empty preferences.
async fn save_preferences(
    State(state): State<OnboardingRouteState>,
    CurrentUser(user): CurrentUser,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<serde_json::Value>, OnboardingError> {
    // Identity is checked before the body so unauthenticated callers always get 401.
    let user_id = require_user(user.as_ref())?;
    let body = body.map_err(|e| OnboardingError::InvalidBody(e.body_text()))?;
    let prefs = parse_preferences(&body)?;

    state.service.save(&user_id, prefs).await?;
    Ok(Json(serde_json::json!({"success": true})))
}

/// Decode a save body. Blank means every field omitted.
fn parse_preferences(body: &[u8]) -> Result<OnboardingPreferences, OnboardingError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(OnboardingPreferences::default());
    }
    serde_json::from_slice(body).map_err(|e| OnboardingError::InvalidBody(e.to_string()))
}

/// GET /api/v1/onboarding
///
/// Returns the caller's preferences as a flat camelCase object, or 404.
async fn get_preferences(
    State(state): State<OnboardingRouteState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<OnboardingPreferences>, OnboardingError> {
    let user_id = require_user(user.as_ref())?;
    let prefs = state.service.fetch(&user_id).await?;
    Ok(Json(prefs))
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route(
            "/api/v1/onboarding",
            get(get_preferences).post(save_preferences),
        )
        .with_state(state)
}
