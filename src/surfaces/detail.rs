//! Itinerary surface for the selected destination
//!
//! Planning is ticketed like chat sends, but a newer request supersedes an
//! older one instead of being refused: only the most recent ticket may
//! complete.

use crate::i18n::{Language, Translations};
use crate::surfaces::map::{Bounds, FIT_PADDING};
use crate::types::{Destination, Itinerary, ItineraryItem};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanStatus {
    /// Nothing requested yet
    Idle,
    Loading,
    Ready,
    /// The last request failed; the host shows a retry affordance
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    seq: u64,
    pub destination_name: String,
    pub preferences: String,
    /// Current itinerary sent along for micro-adjustment
    pub previous: Option<Itinerary>,
}

impl PlanRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug)]
pub struct DetailSurface {
    destination: Destination,
    language: Language,
    itinerary: Option<Itinerary>,
    previous: Option<Itinerary>,
    status: PlanStatus,
    started: bool,
    input: String,
    selected_stop: Option<usize>,
    last_preferences: Option<String>,
    next_seq: u64,
    latest: Option<u64>,
}

impl DetailSurface {
    pub fn new(destination: Destination, language: Language) -> Self {
        Self {
            destination,
            language,
            itinerary: None,
            previous: None,
            status: PlanStatus::Idle,
            started: false,
            input: String::new(),
            selected_stop: None,
            last_preferences: None,
            next_seq: 0,
            latest: None,
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn itinerary(&self) -> Option<&Itinerary> {
        self.itinerary.as_ref()
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    pub fn can_undo(&self) -> bool {
        self.previous.is_some()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Start (or adjust) the plan. `request` overrides the input box; the
    /// travel intent and then a default preference fill in when both are
    /// empty. Once a plan has started, an empty request does nothing.
    pub fn begin_plan(&mut self, request: Option<&str>, travel_intent: &str) -> Option<PlanRequest> {
        let typed = request
            .filter(|r| !r.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.input.trim().to_string());
        if typed.is_empty() && self.started {
            return None;
        }

        let preferences = if !typed.is_empty() {
            typed
        } else if !travel_intent.trim().is_empty() {
            travel_intent.to_string()
        } else {
            Translations::for_language(self.language)
                .default_preference
                .to_string()
        };
        self.input.clear();
        Some(self.issue(preferences))
    }

    /// Re-issue the last failed request.
    pub fn retry(&mut self) -> Option<PlanRequest> {
        if self.status != PlanStatus::Failed {
            return None;
        }
        let preferences = self.last_preferences.clone()?;
        Some(self.issue(preferences))
    }

    fn issue(&mut self, preferences: String) -> PlanRequest {
        self.started = true;
        self.status = PlanStatus::Loading;
        self.next_seq += 1;
        self.latest = Some(self.next_seq);
        self.last_preferences = Some(preferences.clone());
        PlanRequest {
            seq: self.next_seq,
            destination_name: self.destination.name.clone(),
            preferences,
            previous: self.itinerary.clone(),
        }
    }

    /// Accept the outcome of `request`. Stale requests are ignored and
    /// `false` is returned. A failure leaves the current itinerary and the
    /// undo target untouched.
    pub fn complete_plan(&mut self, request: PlanRequest, result: Option<Itinerary>) -> bool {
        if self.latest != Some(request.seq) {
            tracing::debug!(seq = request.seq, "Discarding stale itinerary response");
            return false;
        }
        self.latest = None;
        match result {
            Some(mut itinerary) => {
                itinerary.destination_id = self.destination.id.clone();
                self.previous = self.itinerary.replace(itinerary);
                self.selected_stop = None;
                self.status = PlanStatus::Ready;
            }
            None => {
                tracing::warn!(destination = %self.destination.name, "Itinerary unavailable");
                self.status = PlanStatus::Failed;
            }
        }
        true
    }

    /// One-step rollback to the itinerary before the last adjustment.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.previous.take() else {
            return false;
        };
        self.itinerary = Some(previous);
        self.selected_stop = None;
        self.status = PlanStatus::Ready;
        true
    }

    pub fn select_stop(&mut self, index: usize) -> Option<&ItineraryItem> {
        let item = self.itinerary.as_ref()?.items.get(index)?;
        self.selected_stop = Some(index);
        Some(item)
    }

    pub fn selected_stop(&self) -> Option<&ItineraryItem> {
        self.itinerary.as_ref()?.items.get(self.selected_stop?)
    }

    /// Fitted bounds of the route for the embedded map.
    pub fn route_bounds(&self) -> Option<Bounds> {
        let itinerary = self.itinerary.as_ref()?;
        Bounds::from_points(itinerary.items.iter().map(|i| (i.lat, i.lng))).map(|b| b.pad(FIT_PADDING))
    }

    /// Localized failure line for the retry affordance.
    pub fn failure_message(&self) -> Option<&'static str> {
        (self.status == PlanStatus::Failed)
            .then(|| Translations::for_language(self.language).itinerary_failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn temple() -> Destination {
        Catalog::builtin().find("4").unwrap().clone()
    }

    fn plan(label: &str) -> Itinerary {
        Itinerary {
            destination_id: String::new(),
            date: "2026-05-01".into(),
            total_budget: "¥100".into(),
            transport: "Metro".into(),
            items: vec![ItineraryItem {
                time: "09:00".into(),
                activity: label.into(),
                description: String::new(),
                lat: 39.88,
                lng: 116.40,
                transport_info: None,
                ai_personalized_reason: None,
                cost: None,
            }],
            highlights: vec![],
            ai_comment: None,
        }
    }

    #[test]
    fn test_preference_fallbacks() {
        let mut detail = DetailSurface::new(temple(), Language::En);
        let req = detail.begin_plan(None, "temple").unwrap();
        assert_eq!(req.preferences, "temple");
        assert_eq!(req.destination_name, "Temple of Heaven");

        let mut fresh = DetailSurface::new(temple(), Language::En);
        assert_eq!(fresh.begin_plan(None, "").unwrap().preferences, "Deep Experience");
    }

    #[test]
    fn test_empty_request_after_start_is_ignored() {
        let mut detail = DetailSurface::new(temple(), Language::En);
        let req = detail.begin_plan(None, "").unwrap();
        detail.complete_plan(req, Some(plan("a")));
        assert!(detail.begin_plan(None, "temple").is_none());
        detail.set_input("less walking");
        assert_eq!(detail.begin_plan(None, "").unwrap().preferences, "less walking");
    }

    #[test]
    fn test_failure_is_retryable_and_keeps_state() {
        let mut detail = DetailSurface::new(temple(), Language::En);
        let req = detail.begin_plan(None, "temple").unwrap();
        assert!(detail.complete_plan(req, None));
        assert_eq!(detail.status(), PlanStatus::Failed);
        assert!(detail.itinerary().is_none());
        assert!(detail.failure_message().is_some());

        let again = detail.retry().unwrap();
        assert_eq!(again.preferences, "temple");
        assert!(detail.complete_plan(again, Some(plan("a"))));
        assert_eq!(detail.status(), PlanStatus::Ready);
        assert_eq!(detail.itinerary().unwrap().destination_id, "4");
    }

    #[test]
    fn test_adjust_and_undo() {
        let mut detail = DetailSurface::new(temple(), Language::En);
        let first = detail.begin_plan(None, "").unwrap();
        detail.complete_plan(first, Some(plan("a")));

        let adjust = detail.begin_plan(Some("more food"), "").unwrap();
        assert_eq!(adjust.previous.as_ref().unwrap().items[0].activity, "a");

        // failed adjustment keeps the undo target absent and plan "a" current
        detail.complete_plan(adjust, None);
        assert!(!detail.can_undo());

        let adjust = detail.begin_plan(Some("more food"), "").unwrap();
        detail.complete_plan(adjust, Some(plan("b")));
        assert!(detail.can_undo());
        assert!(detail.undo());
        assert_eq!(detail.itinerary().unwrap().items[0].activity, "a");
        assert!(!detail.undo());
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut detail = DetailSurface::new(temple(), Language::En);
        let older = detail.begin_plan(Some("slow"), "").unwrap();
        let newer = detail.begin_plan(Some("fast"), "").unwrap();

        assert!(detail.complete_plan(newer, Some(plan("new"))));
        assert!(!detail.complete_plan(older, Some(plan("old"))));
        assert_eq!(detail.itinerary().unwrap().items[0].activity, "new");
    }

    #[test]
    fn test_route_bounds_and_stops() {
        let mut detail = DetailSurface::new(temple(), Language::En);
        assert!(detail.route_bounds().is_none());
        let req = detail.begin_plan(None, "").unwrap();
        detail.complete_plan(req, Some(plan("a")));
        assert!(detail.route_bounds().unwrap().contains(39.88, 116.40));
        assert_eq!(detail.select_stop(0).unwrap().activity, "a");
        assert!(detail.selected_stop().is_some());
        assert!(detail.select_stop(5).is_none());
    }
}
