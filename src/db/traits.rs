//! Saved-itinerary store abstraction
//!
//! [`ItineraryStore`] is the typed backend interface. [`PersistenceGateway`]
//! wraps a store and absorbs every failure into a sentinel (`[]`, `None`,
//! `false`), which is what the orchestrator consumes.
//!
//! # Example
//!
//! ```rust,ignore
//! use wayfarer::db::StoreProvider;
//!
//! let store = StoreProvider::Memory.create_store();
//! let gateway = PersistenceGateway::new(store);
//! let saved = gateway.list_saved_itineraries("user-1").await;
//! ```

use crate::types::{NewSavedItinerary, Result, SavedItinerary};
use async_trait::async_trait;
use std::sync::Arc;

/// Store provider configuration
#[derive(Debug, Clone, Default)]
pub enum StoreProvider {
    /// Process-local store, lost on exit
    #[default]
    Memory,
    /// Hosted Postgres through its PostgREST interface
    Supabase {
        url: Option<String>,
        anon_key: Option<String>,
        table: String,
    },
}

impl StoreProvider {
    pub fn create_store(&self) -> Arc<dyn ItineraryStore> {
        match self {
            StoreProvider::Memory => Arc::new(super::memory::MemoryStore::new()),
            StoreProvider::Supabase {
                url,
                anon_key,
                table,
            } => Arc::new(super::supabase::SupabaseStore::new(
                url.clone(),
                anon_key.clone(),
                table.clone(),
            )),
        }
    }
}

#[async_trait]
pub trait ItineraryStore: Send + Sync {
    /// Entries for `user_id`, most recent first.
    async fn list(&self, user_id: &str) -> Result<Vec<SavedItinerary>>;

    async fn create(&self, entry: &NewSavedItinerary) -> Result<SavedItinerary>;

    /// Delete by row id. A missing row is [`crate::AppError::NotFound`].
    async fn delete(&self, id: &str) -> Result<()>;

    async fn find_for_destination(
        &self,
        user_id: &str,
        destination_id: &str,
    ) -> Result<Option<SavedItinerary>>;
}

/// Best-effort facade over an [`ItineraryStore`].
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn ItineraryStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn ItineraryStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ItineraryStore> {
        &self.store
    }

    pub async fn list_saved_itineraries(&self, user_id: &str) -> Vec<SavedItinerary> {
        self.load_saved_itineraries(user_id).await.unwrap_or_default()
    }

    /// Like [`Self::list_saved_itineraries`], but `None` tells a failed load
    /// apart from an empty set.
    pub async fn load_saved_itineraries(&self, user_id: &str) -> Option<Vec<SavedItinerary>> {
        self.store
            .list(user_id)
            .await
            .inspect_err(|e| tracing::error!(user_id, "Failed to load saved itineraries: {}", e))
            .ok()
    }

    pub async fn create(&self, entry: &NewSavedItinerary) -> Option<SavedItinerary> {
        self.store
            .create(entry)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    destination_id = %entry.destination_id,
                    "Failed to save itinerary: {}",
                    e
                )
            })
            .ok()
    }

    pub async fn delete(&self, id: &str) -> bool {
        match self.store.delete(id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(id, "Failed to delete saved itinerary: {}", e);
                false
            }
        }
    }

    pub async fn find_existing(
        &self,
        user_id: &str,
        destination_id: &str,
    ) -> Option<SavedItinerary> {
        self.store
            .find_for_destination(user_id, destination_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(destination_id, "Existing itinerary lookup failed: {}", e);
                None
            })
    }
}
