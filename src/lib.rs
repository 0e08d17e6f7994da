//! # Wayfarer
//!
//! The orchestration core of an AI travel planner. A user states a travel
//! wish, browses matching destinations on a map, opens a destination to get
//! a generated day itinerary, adjusts it in conversation and saves it.
//!
//! The crate is headless: views are modelled as plain state machines
//! ([`surfaces`]) coordinated by the [`Orchestrator`], and a renderer drives
//! them through [`TravelApp`] with [`UiEvent`]s.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wayfarer::{TravelApp, UiEvent};
//! use wayfarer::utils::{config::Secrets, toml_config::WayfarerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = WayfarerConfig::load_or_default("wayfarer.toml")?;
//!     let secrets = Secrets::resolve(&config);
//!     let mut app = config.build_app(&secrets);
//!
//!     app.handle(UiEvent::SubmitChat("temple".into())).await?;
//!     for marker in app.map().markers() {
//!         println!("{}", marker.name);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`orchestrator`] - view state machine, interaction lock, surface commands
//! - [`surfaces`] - chat, map, detail and city picker models
//! - [`ai`] - travel operations over an [`LLMClient`]
//! - [`llm`] - OpenAI-compatible client and retry policy
//! - [`db`] - saved-itinerary stores (in-memory, PostgREST)
//! - [`catalog`] - built-in destinations and departure cities
//! - [`subscription`] - premium plans with a stub checkout
//! - [`i18n`] - English and Chinese strings
//! - [`types`] - shared data model and [`AppError`]
//!
//! ## Degradation
//!
//! Missing secrets are logged, never fatal. Without an AI key advice falls
//! back to a localized message and structured lookups return nothing;
//! without a persistence backend saving reports failure through a notice.

#![cfg_attr(docsrs, feature(doc_cfg))]

/// Travel-specific AI operations.
pub mod ai;
/// Application shell routing UI events.
pub mod app;
/// Built-in destination catalog and city directory.
pub mod catalog;
/// Command-line front end.
pub mod cli;
/// Saved-itinerary persistence.
pub mod db;
/// Localized strings.
pub mod i18n;
/// LLM client abstraction.
pub mod llm;
/// Central view state machine.
pub mod orchestrator;
/// Subscription tier.
pub mod subscription;
/// Surface state models.
pub mod surfaces;
/// Core types and errors.
pub mod types;
/// Configuration loading and wiring.
pub mod utils;

pub use ai::{AiGateway, TravelAi};
pub use app::{AppOptions, TravelApp, UiEvent};
pub use catalog::Catalog;
pub use db::{ItineraryStore, PersistenceGateway, StoreProvider};
pub use i18n::Language;
pub use llm::{LLMClient, Provider, RetryPolicy};
pub use orchestrator::{Orchestrator, OrchestratorConfig, ViewState};
pub use types::{AppError, Result};
pub use utils::toml_config::WayfarerConfig;
