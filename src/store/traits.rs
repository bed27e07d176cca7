//! `PreferenceStore` trait — async interface to the preference collection.

use async_trait::async_trait;

use crate::error::DatabaseError;
use crate::onboarding::model::{PreferenceFields, StoredPreferenceRecord};

/// Backend-agnostic store for the `onboarding_preferences` collection.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Find the record for `user_id` (limit 1).
    async fn find_by_user(
        &self,
        user_id: &str,
    ) -> Result<Option<StoredPreferenceRecord>, DatabaseError>;

    /// Overwrite every mapped field of the record with id `id`.
    async fn update(&self, id: &str, fields: &PreferenceFields) -> Result<(), DatabaseError>;

    /// Insert a new record for `user_id`. Returns the store-assigned id.
    async fn create(
        &self,
        user_id: &str,
        fields: &PreferenceFields,
    ) -> Result<String, DatabaseError>;

    /// Insert-or-update keyed on `user_id`.
    ///
    /// The default runs `find_by_user` then `update` or `create`. That sequence
    /// is not atomic: two concurrent first saves for the same user can both
    /// take the create branch. Backends that can do this in one statement
    /// should override it.
    async fn upsert(&self, user_id: &str, fields: &PreferenceFields) -> Result<(), DatabaseError> {
        match self.find_by_user(user_id).await? {
            Some(existing) => self.update(&existing.id, fields).await,
            None => self.create(user_id, fields).await.map(|_| ()),
        }
    }
}
