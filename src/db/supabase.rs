use crate::db::traits::ItineraryStore;
use crate::types::{AppError, NewSavedItinerary, Result, SavedItinerary};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use std::time::Duration;

/// PostgREST client for the `saved_itineraries` table.
pub struct SupabaseStore {
    http: reqwest::Client,
    endpoint: Option<Endpoint>,
    table: String,
}

struct Endpoint {
    base_url: String,
    anon_key: String,
}

impl SupabaseStore {
    /// Missing URL or key leaves the store unconfigured; every call then fails.
    pub fn new(url: Option<String>, anon_key: Option<String>, table: String) -> Self {
        let endpoint = match (url, anon_key) {
            (Some(url), Some(key)) if !url.trim().is_empty() && !key.trim().is_empty() => {
                Some(Endpoint {
                    base_url: url.trim_end_matches('/').to_string(),
                    anon_key: key,
                })
            }
            _ => {
                tracing::warn!("Supabase URL or anon key missing; saved itineraries are disabled");
                None
            }
        };

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();

        Self {
            http,
            endpoint,
            table,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    fn endpoint(&self) -> Result<&Endpoint> {
        self.endpoint
            .as_ref()
            .ok_or_else(|| AppError::Config("persistence backend is not configured".to_string()))
    }

    fn table_url(&self, endpoint: &Endpoint) -> String {
        format!("{}/rest/v1/{}", endpoint.base_url, self.table)
    }

    fn authorize(&self, request: RequestBuilder, endpoint: &Endpoint) -> RequestBuilder {
        request
            .header("apikey", &endpoint.anon_key)
            .bearer_auth(&endpoint.anon_key)
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let resp = request
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("{} request failed: {}", what, e)))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Database(format!(
                "{} failed with status {}: {}",
                what,
                status.as_u16(),
                body
            )));
        }
        Ok(resp)
    }

    async fn rows(resp: Response, what: &str) -> Result<Vec<SavedItinerary>> {
        resp.json()
            .await
            .map_err(|e| AppError::Database(format!("Malformed {} response: {}", what, e)))
    }
}

#[async_trait]
impl ItineraryStore for SupabaseStore {
    async fn list(&self, user_id: &str) -> Result<Vec<SavedItinerary>> {
        let endpoint = self.endpoint()?;
        let request = self
            .http
            .get(self.table_url(endpoint))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("order", "created_at.desc".to_string()),
            ]);
        let resp = self.send(self.authorize(request, endpoint), "list").await?;
        let rows = Self::rows(resp, "list").await?;
        tracing::debug!(user_id, count = rows.len(), "Loaded saved itineraries");
        Ok(rows)
    }

    async fn create(&self, entry: &NewSavedItinerary) -> Result<SavedItinerary> {
        let endpoint = self.endpoint()?;
        let request = self
            .http
            .post(self.table_url(endpoint))
            .header("Prefer", "return=representation")
            .json(entry);
        let resp = self.send(self.authorize(request, endpoint), "insert").await?;
        Self::rows(resp, "insert")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Database("insert returned no row".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let endpoint = self.endpoint()?;
        let request = self
            .http
            .delete(self.table_url(endpoint))
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))]);
        let resp = self.send(self.authorize(request, endpoint), "delete").await?;
        if Self::rows(resp, "delete").await?.is_empty() {
            return Err(AppError::NotFound(format!("saved itinerary {}", id)));
        }
        Ok(())
    }

    async fn find_for_destination(
        &self,
        user_id: &str,
        destination_id: &str,
    ) -> Result<Option<SavedItinerary>> {
        let endpoint = self.endpoint()?;
        let request = self
            .http
            .get(self.table_url(endpoint))
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("destination_id", format!("eq.{}", destination_id)),
                ("limit", "1".to_string()),
            ]);
        let resp = self.send(self.authorize(request, endpoint), "lookup").await?;
        Ok(Self::rows(resp, "lookup").await?.into_iter().next())
    }
}
