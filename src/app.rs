//! Application shell
//!
//! [`TravelApp`] wires the orchestrator to the surfaces and the AI gateway.
//! A renderer feeds it [`UiEvent`]s and reads view data back through the
//! accessors. Surface inboxes are pumped after every event, so commands
//! from the orchestrator are visible before `handle` returns.

use crate::ai::TravelAi;
use crate::db::PersistenceGateway;
use crate::i18n::Language;
use crate::orchestrator::{
    Notice, Orchestrator, OrchestratorConfig, SurfaceInboxes, ViewState,
};
use crate::subscription::{SubscriptionManager, SubscriptionPlan};
use crate::surfaces::{
    Bounds, ChatSurface, CityPicker, DetailSurface, MapEvent, MapMode, MapSurface, PlanRequest,
    SendTicket, DEFAULT_INTERACTION_THROTTLE,
};
use crate::types::{ActiveTab, AppError, AuthUser, Destination, Location, Result, ViewKind};
use std::sync::Arc;
use tokio::time::Duration;

/// Knobs for the shell itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppOptions {
    /// Ask the model for destinations beyond the catalog on every chat send
    pub destination_search: bool,
    pub max_search_results: usize,
    pub map_throttle: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            destination_search: false,
            max_search_results: 6,
            map_throttle: DEFAULT_INTERACTION_THROTTLE,
        }
    }
}

/// Everything a renderer can report.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SelectTab(ActiveTab),
    /// Send the given text from the chat box
    SubmitChat(String),
    QuickReply(usize),
    Regenerate(String),
    SelectKeyword(String),
    SetChatVisible(bool),
    MapInteraction(MapEvent),
    MapMoved(Bounds),
    SetMapMode(MapMode),
    /// Map search box over the catalog; an empty query clears it
    MapSearch(String),
    MarkerClicked(String),
    /// Detail back button or map exit, depending on the view
    Back,
    ExitMap,
    AdjustItinerary(String),
    RetryItinerary,
    UndoItinerary,
    SelectStop(usize),
    ToggleSave,
    OpenCityPicker,
    CitySearch(String),
    CityRegion(String),
    CityCountry(String),
    CityBack,
    CityChosen(Location),
    Login(AuthUser),
    Logout,
    OpenSaved(String),
    DeleteSaved(String),
    Subscribe(SubscriptionPlan),
    CancelSubscription,
    SetLanguage(Language),
}

pub struct TravelApp {
    orchestrator: Orchestrator,
    inboxes: SurfaceInboxes,
    chat: ChatSurface,
    map: MapSurface,
    detail: Option<DetailSurface>,
    picker: CityPicker,
    ai: Arc<dyn TravelAi>,
    options: AppOptions,
}

impl TravelApp {
    pub fn new(
        config: OrchestratorConfig,
        persistence: PersistenceGateway,
        subscription: SubscriptionManager,
        ai: Arc<dyn TravelAi>,
        options: AppOptions,
    ) -> Self {
        let language = config.language;
        let catalog = Arc::clone(&config.catalog);
        let (orchestrator, inboxes) = Orchestrator::new(config, persistence, subscription);
        Self {
            orchestrator,
            inboxes,
            chat: ChatSurface::new(language),
            map: MapSurface::new(catalog, options.map_throttle),
            detail: None,
            picker: CityPicker::default(),
            ai,
            options,
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn chat(&self) -> &ChatSurface {
        &self.chat
    }

    pub fn map(&self) -> &MapSurface {
        &self.map
    }

    pub fn detail(&self) -> Option<&DetailSurface> {
        self.detail.as_ref()
    }

    pub fn city_picker(&self) -> &CityPicker {
        &self.picker
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.orchestrator.take_notices()
    }

    /// Startup work: drop an expired subscription.
    pub async fn start(&mut self) {
        self.orchestrator.check_subscription().await;
    }

    pub async fn handle(&mut self, event: UiEvent) -> Result<()> {
        tracing::trace!(?event, "UI event");
        let outcome = self.dispatch(event).await;
        self.pump();
        self.sync_detail().await;
        outcome
    }

    async fn dispatch(&mut self, event: UiEvent) -> Result<()> {
        match event {
            UiEvent::SelectTab(tab) => self.orchestrator.select_tab(tab),
            UiEvent::SubmitChat(text) => {
                if let Some(ticket) = self.chat.begin_send(&text) {
                    self.chat.set_input("");
                    self.run_send(ticket).await;
                }
            }
            UiEvent::QuickReply(index) => {
                if let Some(ticket) = self.chat.quick_reply(index) {
                    self.run_send(ticket).await;
                }
            }
            UiEvent::Regenerate(message_id) => {
                if let Some(ticket) = self.chat.regenerate(&message_id) {
                    self.answer(ticket).await;
                }
            }
            UiEvent::SelectKeyword(keyword) => self.orchestrator.select_keyword(&keyword),
            UiEvent::SetChatVisible(visible) => self.orchestrator.set_chat_visible(visible),
            UiEvent::MapInteraction(event) => {
                if self.map.interaction(event) {
                    self.orchestrator.map_interacted();
                }
            }
            UiEvent::MapMoved(bounds) => self.map.user_moved(bounds),
            UiEvent::SetMapMode(mode) => self.map.set_mode(mode),
            UiEvent::MapSearch(query) => {
                let hits: Vec<Destination> = self
                    .orchestrator
                    .catalog()
                    .search(query.trim())
                    .into_iter()
                    .cloned()
                    .collect();
                tracing::debug!(query = %query, hits = hits.len(), "Map search");
                self.orchestrator.set_search_results(hits);
            }
            UiEvent::MarkerClicked(id) => {
                let destination = self
                    .map
                    .marker_clicked(&id)
                    .ok_or_else(|| AppError::InvalidInput(format!("no marker '{}'", id)))?;
                self.orchestrator.select_destination(destination)?;
            }
            UiEvent::Back => match self.orchestrator.view_kind() {
                ViewKind::Detail => self.orchestrator.exit_detail()?,
                ViewKind::Map => self.orchestrator.exit_map(),
                ViewKind::Welcome | ViewKind::UserCenter => {}
            },
            UiEvent::ExitMap => self.orchestrator.exit_map(),
            UiEvent::AdjustItinerary(request) => {
                let intent = self.orchestrator.intent().to_string();
                let detail = self.detail_mut()?;
                if let Some(req) = detail.begin_plan(Some(&request), &intent) {
                    self.run_plan(req).await;
                }
            }
            UiEvent::RetryItinerary => {
                if let Some(req) = self.detail_mut()?.retry() {
                    self.run_plan(req).await;
                }
            }
            UiEvent::UndoItinerary => {
                self.detail_mut()?.undo();
            }
            UiEvent::SelectStop(index) => {
                if self.detail_mut()?.select_stop(index).is_none() {
                    return Err(AppError::InvalidInput(format!("no stop {}", index)));
                }
            }
            UiEvent::ToggleSave => {
                let detail = self.detail.as_ref().ok_or(AppError::InvalidTransition {
                    from: self.orchestrator.view_kind(),
                    action: "toggle save",
                })?;
                let itinerary = detail
                    .itinerary()
                    .cloned()
                    .ok_or_else(|| AppError::InvalidInput("no itinerary to save".to_string()))?;
                let name = detail.destination().name.clone();
                let outcome = self.orchestrator.toggle_saved_itinerary(&itinerary, &name).await;
                tracing::debug!(?outcome, destination = %name, "Save toggled");
            }
            UiEvent::OpenCityPicker => self.picker.open(),
            UiEvent::CitySearch(query) => {
                self.picker.set_query(query);
                if let Some(lookup) = self.picker.begin_ai_lookup() {
                    let found = self
                        .ai
                        .search_city(&lookup.query, self.orchestrator.language())
                        .await;
                    self.picker.complete_ai_lookup(lookup, found);
                }
            }
            UiEvent::CityRegion(id) => {
                if !self.picker.enter_region(&id) {
                    return Err(AppError::InvalidInput(format!("unknown region '{}'", id)));
                }
            }
            UiEvent::CityCountry(id) => {
                if !self.picker.enter_country(&id) {
                    return Err(AppError::InvalidInput(format!("unknown country '{}'", id)));
                }
            }
            UiEvent::CityBack => self.picker.back(),
            UiEvent::CityChosen(location) => {
                let location = self.picker.select(location);
                self.orchestrator.pick_departure_city(location);
            }
            UiEvent::Login(user) => self.orchestrator.set_session(Some(user)).await,
            UiEvent::Logout => self.orchestrator.set_session(None).await,
            UiEvent::OpenSaved(id) => {
                let entry = self
                    .orchestrator
                    .saved_itineraries()
                    .iter()
                    .find(|s| s.id == id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(format!("saved itinerary '{}'", id)))?;
                self.orchestrator.select_saved_itinerary(&entry);
            }
            UiEvent::DeleteSaved(id) => {
                self.orchestrator.delete_saved_itinerary(&id).await;
            }
            UiEvent::Subscribe(plan) => {
                self.orchestrator.subscribe(plan).await;
            }
            UiEvent::CancelSubscription => {
                self.orchestrator.cancel_subscription().await;
            }
            UiEvent::SetLanguage(language) => {
                self.orchestrator.set_language(language);
                self.chat.set_language(language);
            }
        }
        Ok(())
    }

    fn detail_mut(&mut self) -> Result<&mut DetailSurface> {
        let from = self.orchestrator.view_kind();
        self.detail.as_mut().ok_or(AppError::InvalidTransition {
            from,
            action: "edit itinerary",
        })
    }

    /// A chat send doubles as a new travel intent.
    async fn run_send(&mut self, ticket: SendTicket) {
        self.orchestrator.submit_intent(&ticket.text);
        if self.options.destination_search {
            let excluded: Vec<String> = self
                .orchestrator
                .catalog()
                .all()
                .iter()
                .map(|d| d.id.clone())
                .collect();
            let found = self
                .ai
                .search_destinations(
                    &ticket.text,
                    self.orchestrator.language(),
                    &excluded,
                    self.options.max_search_results,
                )
                .await;
            if let Some(search) = found.filter(|s| !s.destinations.is_empty()) {
                self.orchestrator.set_search_results(search.destinations);
            }
        }
        self.pump();
        self.answer(ticket).await;
    }

    async fn answer(&mut self, ticket: SendTicket) {
        let reply = self
            .ai
            .generate_advice(&ticket.text, &ticket.context, self.orchestrator.language())
            .await;
        self.chat.complete_send(ticket, reply);
    }

    async fn run_plan(&mut self, request: PlanRequest) {
        let itinerary = self
            .ai
            .generate_itinerary(
                &request.destination_name,
                &request.preferences,
                self.orchestrator.language(),
                request.previous.as_ref(),
            )
            .await;
        if let Some(detail) = self.detail.as_mut() {
            detail.complete_plan(request, itinerary);
        }
    }

    fn pump(&mut self) {
        self.chat.drain(&mut self.inboxes.chat);
        self.map.drain(&mut self.inboxes.map);
    }

    /// Keep the detail surface in step with the view; entering a new
    /// destination starts planning right away.
    async fn sync_detail(&mut self) {
        let destination = match self.orchestrator.view() {
            ViewState::Detail { destination } => destination.clone(),
            _ => {
                self.detail = None;
                return;
            }
        };
        if self
            .detail
            .as_ref()
            .is_some_and(|d| d.destination().id == destination.id)
        {
            return;
        }
        let mut detail = DetailSurface::new(destination, self.orchestrator.language());
        let request = detail.begin_plan(None, self.orchestrator.intent());
        self.detail = Some(detail);
        if let Some(request) = request {
            self.run_plan(request).await;
        }
    }
}
