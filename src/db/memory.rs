use crate::db::traits::ItineraryStore;
use crate::types::{AppError, NewSavedItinerary, Result, SavedItinerary};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

/// Process-local store used when no hosted backend is configured.
#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<SavedItinerary>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItineraryStore for MemoryStore {
    async fn list(&self, user_id: &str) -> Result<Vec<SavedItinerary>> {
        let rows = self.rows.read().await;
        let mut out: Vec<SavedItinerary> =
            rows.iter().filter(|r| r.user_id == user_id).cloned().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn create(&self, entry: &NewSavedItinerary) -> Result<SavedItinerary> {
        let row = SavedItinerary {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: entry.user_id.clone(),
            destination_id: entry.destination_id.clone(),
            destination_name: entry.destination_name.clone(),
            data: entry.data.clone(),
            created_at: Utc::now(),
        };
        self.rows.write().await.push(row.clone());
        Ok(row)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|r| r.id != id);
        if rows.len() == before {
            return Err(AppError::NotFound(format!("saved itinerary {}", id)));
        }
        Ok(())
    }

    async fn find_for_destination(
        &self,
        user_id: &str,
        destination_id: &str,
    ) -> Result<Option<SavedItinerary>> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .find(|r| r.user_id == user_id && r.destination_id == destination_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Itinerary;

    fn entry(user: &str, dest: &str) -> NewSavedItinerary {
        NewSavedItinerary {
            user_id: user.into(),
            destination_id: dest.into(),
            destination_name: dest.into(),
            data: Itinerary {
                destination_id: dest.into(),
                date: "2026-05-01".into(),
                total_budget: "¥100".into(),
                transport: "Metro".into(),
                items: vec![],
                highlights: vec![],
                ai_comment: None,
            },
        }
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let store = MemoryStore::new();
        let row = store.create(&entry("u1", "4")).await.unwrap();
        store.create(&entry("u2", "4")).await.unwrap();

        assert_eq!(store.list("u1").await.unwrap().len(), 1);
        assert!(store.find_for_destination("u1", "4").await.unwrap().is_some());

        store.delete(&row.id).await.unwrap();
        assert!(store.list("u1").await.unwrap().is_empty());
        assert!(matches!(store.delete(&row.id).await, Err(AppError::NotFound(_))));
    }
}
