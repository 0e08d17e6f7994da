//! Map surface model
//!
//! Decides which markers are shown and where the viewport sits. Rendering
//! tiles and marker HTML is left to the host.

use crate::catalog::Catalog;
use crate::i18n::{Language, Translations};
use crate::orchestrator::MapCommand;
use crate::types::{Destination, DestinationKind};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{Duration, Instant};

/// Padding applied around the marker set when fitting the viewport.
pub const FIT_PADDING: f64 = 0.3;

pub const DEFAULT_INTERACTION_THROTTLE: Duration = Duration::from_millis(200);

/// Geographic rectangle in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc, (lat, lng)| {
            Some(match acc {
                None => Bounds {
                    south: lat,
                    west: lng,
                    north: lat,
                    east: lng,
                },
                Some(b) => Bounds {
                    south: b.south.min(lat),
                    west: b.west.min(lng),
                    north: b.north.max(lat),
                    east: b.east.max(lng),
                },
            })
        })
    }

    /// Grow each side by `ratio` of the span on that axis.
    pub fn pad(self, ratio: f64) -> Self {
        let lat_buffer = (self.north - self.south).abs() * ratio;
        let lng_buffer = (self.east - self.west).abs() * ratio;
        Bounds {
            south: self.south - lat_buffer,
            west: self.west - lng_buffer,
            north: self.north + lat_buffer,
            east: self.east + lng_buffer,
        }
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.south..=self.north).contains(&lat) && (self.west..=self.east).contains(&lng)
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }
}

/// Category filter shown in the layers menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum MapMode {
    #[default]
    All,
    Only(DestinationKind),
}

impl MapMode {
    pub const ALL_MODES: [MapMode; 7] = [
        MapMode::All,
        MapMode::Only(DestinationKind::Destination),
        MapMode::Only(DestinationKind::Hsr),
        MapMode::Only(DestinationKind::Flight),
        MapMode::Only(DestinationKind::Drive),
        MapMode::Only(DestinationKind::Hotel),
        MapMode::Only(DestinationKind::Museum),
    ];

    pub fn label(self, lang: Language) -> &'static str {
        let t = Translations::for_language(lang);
        match self {
            MapMode::All => t.all_discovery,
            MapMode::Only(DestinationKind::Destination) => t.attractions,
            MapMode::Only(DestinationKind::Hsr) => t.hsr,
            MapMode::Only(DestinationKind::Flight) => t.flights,
            MapMode::Only(DestinationKind::Drive) => t.self_drive,
            MapMode::Only(DestinationKind::Hotel) => t.hotels,
            MapMode::Only(DestinationKind::Museum) => t.museums,
        }
    }
}

/// Raw pointer events from the map widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    Click,
    DragStart,
    ZoomStart,
}

/// Marker data ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub lat: f64,
    pub lng: f64,
    /// Price when known, otherwise the rating with its unit
    pub info: String,
    pub distance: String,
}

pub struct MapSurface {
    catalog: Arc<Catalog>,
    intent: String,
    search_results: Vec<Destination>,
    mode: MapMode,
    markers: Vec<Destination>,
    viewport: Option<Bounds>,
    saved_viewport: Option<Bounds>,
    throttle: Duration,
    last_interaction: Option<Instant>,
}

impl MapSurface {
    pub fn new(catalog: Arc<Catalog>, throttle: Duration) -> Self {
        let mut surface = Self {
            catalog,
            intent: String::new(),
            search_results: Vec::new(),
            mode: MapMode::All,
            markers: Vec::new(),
            viewport: None,
            saved_viewport: None,
            throttle,
            last_interaction: None,
        };
        surface.refresh();
        surface
    }

    pub fn markers(&self) -> &[Destination] {
        &self.markers
    }

    pub fn viewport(&self) -> Option<Bounds> {
        self.viewport
    }

    pub fn saved_viewport(&self) -> Option<Bounds> {
        self.saved_viewport
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn apply(&mut self, command: MapCommand) {
        match command {
            MapCommand::SetIntent(intent) => {
                self.intent = intent;
                self.refresh();
            }
            MapCommand::SetSearchResults(results) => {
                self.search_results = results;
                self.refresh();
            }
            MapCommand::ReturnFromDetail => self.return_from_detail(),
            MapCommand::Reset => {
                self.intent.clear();
                self.search_results.clear();
                self.mode = MapMode::All;
                self.refresh();
            }
        }
    }

    /// Apply every queued command.
    pub fn drain(&mut self, inbox: &mut UnboundedReceiver<MapCommand>) {
        while let Ok(command) = inbox.try_recv() {
            self.apply(command);
        }
    }

    pub fn set_mode(&mut self, mode: MapMode) {
        self.mode = mode;
        self.refresh();
    }

    fn derive_markers(&self) -> Vec<Destination> {
        if !self.search_results.is_empty() {
            return self.search_results.clone();
        }
        let picked = if !self.intent.trim().is_empty() {
            self.catalog.filter_by_intent(&self.intent)
        } else {
            match self.mode {
                MapMode::All => self.catalog.filter_by_kind(None),
                MapMode::Only(kind) => self.catalog.filter_by_kind(Some(kind)),
            }
        };
        picked.into_iter().cloned().collect()
    }

    /// Recompute markers; the viewport is re-fitted only if the set changed.
    /// Returns whether it changed.
    pub fn refresh(&mut self) -> bool {
        let next = self.derive_markers();
        let unchanged = next.len() == self.markers.len()
            && next.iter().zip(&self.markers).all(|(a, b)| a.id == b.id);
        if unchanged && self.viewport.is_some() {
            return false;
        }
        self.markers = next;
        if let Some(bounds) = Bounds::from_points(self.markers.iter().map(|d| (d.lat, d.lng))) {
            let fitted = bounds.pad(FIT_PADDING);
            self.viewport = Some(fitted);
            self.saved_viewport = Some(fitted);
        }
        true
    }

    /// The user panned or zoomed and the map settled at `bounds`.
    pub fn user_moved(&mut self, bounds: Bounds) {
        self.viewport = Some(bounds);
        self.saved_viewport = Some(bounds);
    }

    fn return_from_detail(&mut self) {
        if let Some(saved) = self.saved_viewport {
            self.viewport = Some(saved);
        }
    }

    /// Remember the viewport and hand back the clicked destination.
    pub fn marker_clicked(&mut self, id: &str) -> Option<Destination> {
        let destination = self.markers.iter().find(|d| d.id == id).cloned()?;
        self.saved_viewport = self.viewport;
        Some(destination)
    }

    /// Throttle pointer events; returns `true` when the event should be
    /// forwarded to the orchestrator.
    pub fn interaction(&mut self, event: MapEvent) -> bool {
        let now = Instant::now();
        let forward = self
            .last_interaction
            .is_none_or(|last| now.duration_since(last) >= self.throttle);
        if forward {
            self.last_interaction = Some(now);
            tracing::trace!(?event, "Map interaction forwarded");
        }
        forward
    }

    pub fn marker_views(&self, lang: Language) -> Vec<MarkerView> {
        let unit = Translations::for_language(lang).rating_unit;
        self.markers
            .iter()
            .map(|d| MarkerView {
                id: d.id.clone(),
                name: d.name.clone(),
                image_url: d.image_url.clone(),
                lat: d.lat,
                lng: d.lng,
                info: d
                    .price
                    .clone()
                    .unwrap_or_else(|| format!("{:.1} {}", d.rating, unit)),
                distance: d.distance.clone().unwrap_or_else(|| "12km".to_string()),
            })
            .collect()
    }
}
