//! Test doubles shared by the integration tests.
//!
//! - [`MockLLMClient`] replays scripted completions without any network
//! - [`ScriptedAi`] answers the travel operations directly
//! - [`FailingStore`] rejects every persistence call

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use wayfarer::ai::{DestinationSearch, TravelAi};
use wayfarer::db::{ItineraryStore, MemoryStore, PersistenceGateway};
use wayfarer::i18n::Language;
use wayfarer::llm::{GenerationOptions, LLMClient, ResponseSchema};
use wayfarer::subscription::{StubCheckout, SubscriptionManager};
use wayfarer::types::{
    AppError, AuthUser, Destination, Itinerary, ItineraryItem, Location, Message,
    NewSavedItinerary, Result, SavedItinerary,
};
use wayfarer::{AppOptions, OrchestratorConfig, TravelApp};

// ============= LLM Client =============

/// One recorded call to the mock client.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub system: String,
    /// Prompt text, or the last history entry for history calls
    pub prompt: String,
    pub schema: Option<String>,
}

/// Replays queued replies in order, then falls back to a fixed response.
pub struct MockLLMClient {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: String,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockLLMClient {
    pub fn new(response: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: response.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Serve `replies` first, one per call.
    pub fn scripted(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::new("")
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next(&self, call: RecordedCall) -> Result<String> {
        self.calls.lock().unwrap().push(call);
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None if self.fallback.is_empty() => {
                Err(AppError::Transport("mock has no reply left".to_string()))
            }
            None => Ok(self.fallback.clone()),
        }
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate_with_system(
        &self,
        system: &str,
        prompt: &str,
        _options: GenerationOptions,
    ) -> Result<String> {
        self.next(RecordedCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
            schema: None,
        })
    }

    async fn generate_with_history(
        &self,
        system: &str,
        messages: &[(String, String)],
        _options: GenerationOptions,
    ) -> Result<String> {
        let prompt = messages.last().map(|(_, c)| c.clone()).unwrap_or_default();
        self.next(RecordedCall {
            system: system.to_string(),
            prompt,
            schema: None,
        })
    }

    async fn generate_structured(
        &self,
        system: &str,
        prompt: &str,
        schema: &ResponseSchema,
        _options: GenerationOptions,
    ) -> Result<String> {
        self.next(RecordedCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
            schema: Some(schema.name.clone()),
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

// ============= Travel AI =============

/// Canned answers for the four travel operations.
pub struct ScriptedAi {
    pub advice: String,
    pub itinerary: Mutex<VecDeque<Option<Itinerary>>>,
    pub city: Option<Location>,
    pub destinations: Option<DestinationSearch>,
    /// Consumed before falling back to `destinations`
    pub destination_answers: Mutex<VecDeque<Option<DestinationSearch>>>,
    pub itinerary_calls: Mutex<Vec<(String, String, bool)>>,
    pub city_calls: AtomicUsize,
    pub advice_calls: AtomicUsize,
}

impl ScriptedAi {
    pub fn new() -> Self {
        Self {
            advice: "Here are some ideas.".to_string(),
            itinerary: Mutex::new(VecDeque::new()),
            city: None,
            destinations: None,
            destination_answers: Mutex::new(VecDeque::new()),
            itinerary_calls: Mutex::new(Vec::new()),
            city_calls: AtomicUsize::new(0),
            advice_calls: AtomicUsize::new(0),
        }
    }

    /// Queue itinerary answers; once drained every call yields `None`.
    pub fn with_itineraries(self, answers: Vec<Option<Itinerary>>) -> Self {
        *self.itinerary.lock().unwrap() = answers.into();
        self
    }

    pub fn with_city(mut self, city: Location) -> Self {
        self.city = Some(city);
        self
    }

    pub fn with_destinations(mut self, search: DestinationSearch) -> Self {
        self.destinations = Some(search);
        self
    }

    /// One answer per destination search, in order; then `destinations`.
    pub fn with_destination_answers(self, answers: Vec<Option<DestinationSearch>>) -> Self {
        *self.destination_answers.lock().unwrap() = answers.into();
        self
    }

    /// `(destination, preferences, had_previous)` per itinerary call.
    pub fn itinerary_requests(&self) -> Vec<(String, String, bool)> {
        self.itinerary_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TravelAi for ScriptedAi {
    async fn generate_advice(&self, text: &str, _context: &[Message], _lang: Language) -> String {
        self.advice_calls.fetch_add(1, Ordering::SeqCst);
        format!("{} ({})", self.advice, text)
    }

    async fn generate_itinerary(
        &self,
        destination_name: &str,
        preferences: &str,
        _lang: Language,
        previous: Option<&Itinerary>,
    ) -> Option<Itinerary> {
        self.itinerary_calls.lock().unwrap().push((
            destination_name.to_string(),
            preferences.to_string(),
            previous.is_some(),
        ));
        self.itinerary.lock().unwrap().pop_front().flatten()
    }

    async fn search_city(&self, _query: &str, _lang: Language) -> Option<Location> {
        self.city_calls.fetch_add(1, Ordering::SeqCst);
        self.city.clone()
    }

    async fn search_destinations(
        &self,
        _query: &str,
        _lang: Language,
        excluded_ids: &[String],
        max_results: usize,
    ) -> Option<DestinationSearch> {
        let answer = self
            .destination_answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.destinations.clone());
        answer.map(|mut search| {
            search.destinations.retain(|d| !excluded_ids.contains(&d.id));
            search.destinations.truncate(max_results);
            search
        })
    }
}

// ============= Stores =============

/// Every call fails as if the backend were down.
pub struct FailingStore;

#[async_trait]
impl ItineraryStore for FailingStore {
    async fn list(&self, _user_id: &str) -> Result<Vec<SavedItinerary>> {
        Err(AppError::Transport("connection refused".to_string()))
    }

    async fn create(&self, _entry: &NewSavedItinerary) -> Result<SavedItinerary> {
        Err(AppError::Database("insert failed with status 500".to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        Err(AppError::NotFound(format!("saved itinerary {}", id)))
    }

    async fn find_for_destination(
        &self,
        _user_id: &str,
        _destination_id: &str,
    ) -> Result<Option<SavedItinerary>> {
        Err(AppError::Transport("connection refused".to_string()))
    }
}

/// An in-memory store whose `list` can be switched off, for a backend that
/// goes down after the first load.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    list_down: AtomicBool,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_list_down(&self, down: bool) {
        self.list_down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl ItineraryStore for FlakyStore {
    async fn list(&self, user_id: &str) -> Result<Vec<SavedItinerary>> {
        if self.list_down.load(Ordering::SeqCst) {
            return Err(AppError::Transport("connection reset".to_string()));
        }
        self.inner.list(user_id).await
    }

    async fn create(&self, entry: &NewSavedItinerary) -> Result<SavedItinerary> {
        self.inner.create(entry).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.inner.delete(id).await
    }

    async fn find_for_destination(
        &self,
        user_id: &str,
        destination_id: &str,
    ) -> Result<Option<SavedItinerary>> {
        self.inner.find_for_destination(user_id, destination_id).await
    }
}

// ============= Fixtures =============

pub fn itinerary(label: &str) -> Itinerary {
    Itinerary {
        destination_id: String::new(),
        date: "2026-05-01".to_string(),
        total_budget: "¥300".to_string(),
        transport: "Metro".to_string(),
        items: vec![
            ItineraryItem {
                time: "09:00".to_string(),
                activity: format!("{} morning", label),
                description: "Arrive early".to_string(),
                lat: 39.8822,
                lng: 116.4066,
                transport_info: Some("Line 5".to_string()),
                ai_personalized_reason: None,
                cost: None,
            },
            ItineraryItem {
                time: "14:00".to_string(),
                activity: format!("{} afternoon", label),
                description: "Stroll".to_string(),
                lat: 39.9042,
                lng: 116.4074,
                transport_info: None,
                ai_personalized_reason: None,
                cost: Some("¥50".to_string()),
            },
        ],
        highlights: vec![label.to_string()],
        ai_comment: None,
    }
}

pub fn user() -> AuthUser {
    AuthUser {
        id: "user-1".to_string(),
        email: "traveler@example.com".to_string(),
        name: Some("Traveler".to_string()),
    }
}

pub fn tokyo() -> Location {
    Location::new("ai-tokyo", "Tokyo", "Japan", "HND", "🇯🇵")
}

pub fn memory_gateway() -> PersistenceGateway {
    PersistenceGateway::new(Arc::new(MemoryStore::new()))
}

pub fn failing_gateway() -> PersistenceGateway {
    PersistenceGateway::new(Arc::new(FailingStore))
}

pub fn subscriptions() -> SubscriptionManager {
    SubscriptionManager::in_memory(Arc::new(StubCheckout))
}

/// An app over an in-memory store and the given AI.
pub fn app_with(ai: Arc<ScriptedAi>) -> TravelApp {
    app_with_store(ai, memory_gateway())
}

pub fn app_with_store(ai: Arc<ScriptedAi>, persistence: PersistenceGateway) -> TravelApp {
    TravelApp::new(
        OrchestratorConfig::default(),
        persistence,
        subscriptions(),
        ai,
        AppOptions::default(),
    )
}

pub fn temple(app: &TravelApp) -> Destination {
    app.orchestrator()
        .catalog()
        .find("4")
        .cloned()
        .expect("temple in catalog")
}
