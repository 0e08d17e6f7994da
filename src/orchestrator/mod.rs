//! Application state machine
//!
//! The [`Orchestrator`] is the single authority for the current view, the
//! active tab, the selected destination, the departure city, the travel
//! intent and chat visibility. Surfaces never mutate that state directly:
//! they call operations here, and the orchestrator talks back through
//! [`ChatCommand`] and [`MapCommand`] inboxes.
//!
//! ```text
//!            submit_intent            select_destination
//!  Welcome ─────────────────▶ Map ─────────────────────▶ Detail
//!     ▲                        │  ◀─────────────────────    │
//!     └──────── exit_map ──────┘        exit_detail         │
//!                                                           │
//!  {Welcome, Map, Detail} ── select_tab(Trip) ──▶ UserCenter
//!  UserCenter ── select_tab(Explore) ──▶ Map if intent else Welcome
//! ```

pub mod commands;
pub mod lock;
pub mod notice;

use crate::catalog::{CityDirectory, Catalog};
use crate::db::PersistenceGateway;
use crate::i18n::Language;
use crate::subscription::{SubscriptionManager, SubscriptionPlan};
use crate::types::{
    ActiveTab, AppError, AuthUser, Destination, Itinerary, Location, NewSavedItinerary, Result,
    SavedItinerary, ViewKind,
};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::time::Duration;

pub use commands::{ChatCommand, MapCommand, SurfaceInboxes};
pub use lock::{InteractionLock, DEFAULT_LOCK_WINDOW};
pub use notice::{Notice, NoticeKind};

use commands::SurfaceOutboxes;

/// The active view. The selected destination only exists inside `Detail`.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Welcome,
    Map,
    Detail { destination: Destination },
    UserCenter,
}

impl ViewState {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewState::Welcome => ViewKind::Welcome,
            ViewState::Map => ViewKind::Map,
            ViewState::Detail { .. } => ViewKind::Detail,
            ViewState::UserCenter => ViewKind::UserCenter,
        }
    }
}

/// What a save toggle ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Saved,
    Removed,
    LoginRequired,
    /// The backend refused; the saved set is unchanged
    Failed,
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub language: Language,
    pub home: Location,
    pub lock_window: Duration,
    pub catalog: Arc<Catalog>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            language: Language::default(),
            home: CityDirectory::home_city(),
            lock_window: DEFAULT_LOCK_WINDOW,
            catalog: Catalog::builtin(),
        }
    }
}

pub struct Orchestrator {
    view: ViewState,
    tab: ActiveTab,
    intent: String,
    keyword: String,
    departure: Location,
    chat_visible: bool,
    lock: InteractionLock,
    language: Language,
    user: Option<AuthUser>,
    saved: Vec<SavedItinerary>,
    catalog: Arc<Catalog>,
    search_results: Vec<Destination>,
    persistence: PersistenceGateway,
    subscription: SubscriptionManager,
    notices: VecDeque<Notice>,
    outbox: SurfaceOutboxes,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        persistence: PersistenceGateway,
        subscription: SubscriptionManager,
    ) -> (Self, SurfaceInboxes) {
        let (outbox, inboxes) = SurfaceOutboxes::channel();
        let orchestrator = Self {
            view: ViewState::Welcome,
            tab: ActiveTab::Explore,
            intent: String::new(),
            keyword: String::new(),
            departure: config.home,
            chat_visible: true,
            lock: InteractionLock::new(config.lock_window),
            language: config.language,
            user: None,
            saved: Vec::new(),
            catalog: config.catalog,
            search_results: Vec::new(),
            persistence,
            subscription,
            notices: VecDeque::new(),
            outbox,
        };
        (orchestrator, inboxes)
    }

    // ============= Read Access =============

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_kind(&self) -> ViewKind {
        self.view.kind()
    }

    pub fn active_tab(&self) -> ActiveTab {
        self.tab
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn departure(&self) -> &Location {
        &self.departure
    }

    pub fn is_chat_visible(&self) -> bool {
        self.chat_visible
    }

    pub fn is_lock_engaged(&self) -> bool {
        self.lock.is_engaged()
    }

    pub fn selected_destination(&self) -> Option<&Destination> {
        match &self.view {
            ViewState::Detail { destination } => Some(destination),
            _ => None,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn search_results(&self) -> &[Destination] {
        &self.search_results
    }

    /// Saved itineraries, most recent first.
    pub fn saved_itineraries(&self) -> &[SavedItinerary] {
        &self.saved
    }

    pub fn is_saved(&self, destination_id: &str) -> bool {
        self.saved.iter().any(|s| s.destination_id == destination_id)
    }

    pub fn subscription(&self) -> &SubscriptionManager {
        &self.subscription
    }

    pub fn is_premium(&self) -> bool {
        self.subscription.is_premium(chrono::Utc::now())
    }

    /// Drain pending user-visible notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    // ============= Navigation =============

    fn set_view(&mut self, next: ViewState) {
        let from = self.view.kind();
        let to = next.kind();
        self.view = next;
        if to == ViewKind::UserCenter {
            self.tab = ActiveTab::Trip;
        } else {
            self.tab = ActiveTab::Explore;
        }
        if from != to {
            tracing::debug!(%from, %to, "View transition");
        }
        debug_assert_eq!(
            self.view.kind() == ViewKind::UserCenter,
            self.tab == ActiveTab::Trip
        );
    }

    pub fn select_tab(&mut self, tab: ActiveTab) {
        match tab {
            ActiveTab::Trip => self.set_view(ViewState::UserCenter),
            ActiveTab::Explore => {
                let leaving_detail = matches!(self.view, ViewState::Detail { .. });
                if self.intent.is_empty() {
                    self.set_view(ViewState::Welcome);
                } else {
                    self.set_view(ViewState::Map);
                    if leaving_detail {
                        self.outbox.map(MapCommand::ReturnFromDetail);
                    }
                }
                self.chat_visible = true;
            }
        }
    }

    /// Returns `false` (and changes nothing) for blank text. Any AI search
    /// results from an earlier intent are dropped.
    pub fn submit_intent(&mut self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.intent = text.to_string();
        self.lock.engage();
        self.set_view(ViewState::Map);
        self.chat_visible = true;
        // results belong to the previous intent's search
        if !self.search_results.is_empty() {
            self.search_results.clear();
            self.outbox.map(MapCommand::SetSearchResults(Vec::new()));
        }
        self.outbox.map(MapCommand::SetIntent(self.intent.clone()));
        tracing::info!(intent = %self.intent, "Travel intent submitted");
        true
    }

    /// The destination must come from the catalog or the current AI result set.
    pub fn select_destination(&mut self, destination: Destination) -> Result<()> {
        let known = self.catalog.contains(&destination.id)
            || self.search_results.iter().any(|d| d.id == destination.id);
        if !known {
            return Err(AppError::InvalidInput(format!(
                "unknown destination '{}'",
                destination.id
            )));
        }
        tracing::info!(destination = %destination.name, "Destination selected");
        self.set_view(ViewState::Detail { destination });
        self.chat_visible = false;
        Ok(())
    }

    pub fn exit_detail(&mut self) -> Result<()> {
        if !matches!(self.view, ViewState::Detail { .. }) {
            return Err(AppError::InvalidTransition {
                from: self.view.kind(),
                action: "exit detail",
            });
        }
        self.set_view(ViewState::Map);
        self.chat_visible = true;
        self.outbox.map(MapCommand::ReturnFromDetail);
        Ok(())
    }

    /// Back to the welcome view with no intent and an empty conversation.
    /// Safe to call from any view.
    pub fn exit_map(&mut self) {
        self.intent.clear();
        self.keyword.clear();
        self.search_results.clear();
        self.set_view(ViewState::Welcome);
        self.chat_visible = true;
        self.outbox.chat(ChatCommand::Clear);
        self.outbox.map(MapCommand::Reset);
    }

    /// Returns whether the chat was hidden.
    pub fn map_interacted(&mut self) -> bool {
        if self.view.kind() != ViewKind::Map || self.lock.is_engaged() {
            return false;
        }
        self.chat_visible = false;
        true
    }

    pub fn pick_departure_city(&mut self, location: Location) {
        tracing::info!(city = %location.city, code = %location.code, "Departure city changed");
        self.departure = location;
    }

    /// Welcome keyword chip: remember it and prefill the chat input.
    pub fn select_keyword(&mut self, keyword: &str) {
        self.keyword = keyword.to_string();
        self.outbox.chat(ChatCommand::Prefill(keyword.to_string()));
    }

    pub fn set_chat_visible(&mut self, visible: bool) {
        self.chat_visible = visible;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Install an AI search result set; it overrides intent filtering on the map.
    pub fn set_search_results(&mut self, results: Vec<Destination>) {
        self.search_results = results.clone();
        self.outbox.map(MapCommand::SetSearchResults(results));
    }

    /// Open the detail view for a saved entry. Entries whose destination is
    /// not in the catalog are ignored.
    pub fn select_saved_itinerary(&mut self, entry: &SavedItinerary) -> bool {
        let Some(destination) = self.catalog.find(&entry.destination_id).cloned() else {
            tracing::warn!(
                destination_id = %entry.destination_id,
                "Saved itinerary refers to a destination outside the catalog"
            );
            return false;
        };
        self.select_destination(destination).is_ok()
    }

    // ============= Session & Saved Itineraries =============

    /// Switch user; the saved set is reloaded wholesale or cleared.
    pub async fn set_session(&mut self, user: Option<AuthUser>) {
        let same_user = self.user.as_ref().map(|u| &u.id) == user.as_ref().map(|u| &u.id);
        if !same_user {
            self.saved.clear();
        }
        self.user = user;
        self.reload_saved().await;
    }

    /// A failed load keeps the current set and raises a notice.
    pub async fn reload_saved(&mut self) {
        let Some(user) = &self.user else {
            self.saved.clear();
            return;
        };
        let loaded = self.persistence.load_saved_itineraries(&user.id).await;
        match loaded {
            Some(rows) => self.saved = rows,
            None => self.push_notice(NoticeKind::LoadFailed),
        }
    }

    pub async fn toggle_saved_itinerary(
        &mut self,
        itinerary: &Itinerary,
        destination_name: &str,
    ) -> ToggleOutcome {
        let Some(user) = self.user.clone() else {
            self.push_notice(NoticeKind::LoginRequired);
            return ToggleOutcome::LoginRequired;
        };

        let existing = self
            .saved
            .iter()
            .find(|s| s.destination_id == itinerary.destination_id)
            .map(|s| s.id.clone());

        match existing {
            Some(id) => {
                if self.persistence.delete(&id).await {
                    self.saved.retain(|s| s.id != id);
                    tracing::info!(destination_id = %itinerary.destination_id, "Itinerary unsaved");
                    ToggleOutcome::Removed
                } else {
                    self.push_notice(NoticeKind::RemoveFailed);
                    ToggleOutcome::Failed
                }
            }
            None => {
                // the local set can lag the backend; adopt an existing row
                if let Some(row) = self
                    .persistence
                    .find_existing(&user.id, &itinerary.destination_id)
                    .await
                {
                    tracing::info!(destination_id = %row.destination_id, "Itinerary already saved");
                    self.saved.insert(0, row);
                    return ToggleOutcome::Saved;
                }
                let entry = NewSavedItinerary {
                    user_id: user.id,
                    destination_id: itinerary.destination_id.clone(),
                    destination_name: destination_name.to_string(),
                    data: itinerary.clone(),
                };
                match self.persistence.create(&entry).await {
                    Some(row) => {
                        tracing::info!(destination_id = %row.destination_id, "Itinerary saved");
                        self.saved.insert(0, row);
                        ToggleOutcome::Saved
                    }
                    None => {
                        self.push_notice(NoticeKind::SaveFailed);
                        ToggleOutcome::Failed
                    }
                }
            }
        }
    }

    /// User-center delete, followed by a full reload.
    pub async fn delete_saved_itinerary(&mut self, id: &str) -> bool {
        if self.user.is_none() {
            self.push_notice(NoticeKind::LoginRequired);
            return false;
        }
        let deleted = self.persistence.delete(id).await;
        if deleted {
            self.saved.retain(|s| s.id != id);
        } else {
            self.push_notice(NoticeKind::RemoveFailed);
        }
        self.reload_saved().await;
        deleted
    }

    // ============= Subscription =============

    pub async fn subscribe(&mut self, plan: SubscriptionPlan) -> bool {
        match self.subscription.subscribe(plan, chrono::Utc::now()).await {
            Ok(_) => {
                self.push_notice(NoticeKind::SubscriptionSucceeded);
                true
            }
            Err(e) => {
                tracing::error!("Subscription failed: {}", e);
                self.push_notice(NoticeKind::SubscriptionFailed);
                false
            }
        }
    }

    pub async fn cancel_subscription(&mut self) -> bool {
        match self.subscription.cancel().await {
            Ok(()) => {
                self.push_notice(NoticeKind::SubscriptionCanceled);
                true
            }
            Err(e) => {
                tracing::error!("Cancel subscription failed: {}", e);
                self.push_notice(NoticeKind::CancelFailed);
                false
            }
        }
    }

    /// Re-read the stored subscription, dropping it if expired.
    pub async fn check_subscription(&mut self) {
        if let Err(e) = self.subscription.check(chrono::Utc::now()).await {
            tracing::warn!("Subscription check failed: {}", e);
        }
    }

    fn push_notice(&mut self, kind: NoticeKind) {
        let notice = Notice::new(kind, self.language);
        if kind.is_error() {
            tracing::warn!(kind = ?kind, "{}", notice.message);
        }
        self.notices.push_back(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryStore, PersistenceGateway};
    use crate::subscription::StubCheckout;

    fn orchestrator() -> (Orchestrator, SurfaceInboxes) {
        Orchestrator::new(
            OrchestratorConfig::default(),
            PersistenceGateway::new(Arc::new(MemoryStore::new())),
            SubscriptionManager::in_memory(Arc::new(StubCheckout)),
        )
    }

    #[test]
    fn test_initial_state() {
        let (orch, _inboxes) = orchestrator();
        assert_eq!(orch.view_kind(), ViewKind::Welcome);
        assert_eq!(orch.active_tab(), ActiveTab::Explore);
        assert!(orch.is_chat_visible());
        assert_eq!(orch.departure().city, "Beijing");
        assert!(orch.selected_destination().is_none());
    }

    #[tokio::test]
    async fn test_submit_intent_sends_map_command() {
        let (mut orch, mut inboxes) = orchestrator();
        assert!(orch.submit_intent("beach"));
        assert_eq!(orch.view_kind(), ViewKind::Map);
        assert_eq!(
            inboxes.map.try_recv().unwrap(),
            MapCommand::SetIntent("beach".to_string())
        );
    }

    #[tokio::test]
    async fn test_new_intent_drops_previous_search_results() {
        let (mut orch, mut inboxes) = orchestrator();
        let mut found = Catalog::builtin().all()[0].clone();
        found.id = "ai-dest-1-0".into();
        orch.set_search_results(vec![found]);
        inboxes.map.try_recv().unwrap();

        orch.submit_intent("temple");

        assert!(orch.search_results().is_empty());
        assert_eq!(
            inboxes.map.try_recv().unwrap(),
            MapCommand::SetSearchResults(Vec::new())
        );
        assert_eq!(
            inboxes.map.try_recv().unwrap(),
            MapCommand::SetIntent("temple".to_string())
        );
    }

    #[test]
    fn test_exit_detail_outside_detail_is_rejected() {
        let (mut orch, _inboxes) = orchestrator();
        let err = orch.exit_detail().unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: ViewKind::Welcome,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_destination_is_rejected() {
        let (mut orch, _inboxes) = orchestrator();
        let mut stranger = orch.catalog().all()[0].clone();
        stranger.id = "not-in-catalog".to_string();
        assert!(orch.select_destination(stranger).is_err());
        assert_eq!(orch.view_kind(), ViewKind::Welcome);
    }

    #[test]
    fn test_search_results_make_destination_selectable() {
        let (mut orch, _inboxes) = orchestrator();
        let mut found = orch.catalog().all()[0].clone();
        found.id = "ai-dest-1-0".to_string();
        orch.set_search_results(vec![found.clone()]);
        orch.select_destination(found).unwrap();
        assert_eq!(orch.view_kind(), ViewKind::Detail);
    }

    #[test]
    fn test_keyword_prefills_chat() {
        let (mut orch, mut inboxes) = orchestrator();
        orch.select_keyword("Sunset views");
        assert_eq!(orch.keyword(), "Sunset views");
        assert_eq!(
            inboxes.chat.try_recv().unwrap(),
            ChatCommand::Prefill("Sunset views".to_string())
        );
    }
}
