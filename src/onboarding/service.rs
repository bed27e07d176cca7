//! Onboarding service — save and fetch a user's preferences.
//!
//! The caller resolves identity first; both operations take an explicit
//! [`UserId`] and never look at request state.

use std::sync::Arc;

use tracing::{debug, error, info};

use super::model::{OnboardingPreferences, PreferenceFields};
use crate::auth::UserId;
use crate::error::{OnboardingError, Operation};
use crate::store::PreferenceStore;

pub struct OnboardingService {
    store: Arc<dyn PreferenceStore>,
}

impl OnboardingService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// Save `prefs` for `user`, replacing every stored field.
    ///
    /// Fields missing from `prefs` are written as null.
    pub async fn save(
        &self,
        user: &UserId,
        prefs: OnboardingPreferences,
    ) -> Result<(), OnboardingError> {
        let fields = PreferenceFields::from(prefs);

        self.store
            .upsert(user.as_str(), &fields)
            .await
            .map_err(|e| {
                error!(user_id = %user, error = %e, "Failed to save onboarding preferences");
                OnboardingError::store(Operation::Save, e)
            })?;

        info!(user_id = %user, "Onboarding preferences saved");
        Ok(())
    }

    /// Fetch the stored preferences for `user`.
    pub async fn fetch(&self, user: &UserId) -> Result<OnboardingPreferences, OnboardingError> {
        let record = self
            .store
            .find_by_user(user.as_str())
            .await
            .map_err(|e| {
                error!(user_id = %user, error = %e, "Failed to fetch onboarding preferences");
                OnboardingError::store(Operation::Fetch, e)
            })?;

        match record {
            Some(record) => Ok(record.into()),
            None => {
                debug!(user_id = %user, "No onboarding preferences stored");
                Err(OnboardingError::NotFound)
            }
        }
    }
}
