//! Onboarding preferences — what a user chose during first launch.
//!
//! One record per user. The API speaks camelCase (`displayName`), the store
//! snake_case (`display_name`); `model` owns the mapping between the two.

pub mod model;
pub mod routes;
pub mod service;

pub use model::{OnboardingPreferences, PreferenceFields, StoredPreferenceRecord, Theme, Units};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use service::OnboardingService;
