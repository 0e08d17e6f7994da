//! Surface models driven by the orchestrator: chat, map, detail and the
//! departure city picker. Each owns its own local state and reacts to
//! commands from its inbox.

pub mod chat;
pub mod city_picker;
pub mod detail;
pub mod map;

pub use chat::{ChatSurface, SendTicket, Suggestion, SuggestionKind, CONTEXT_WINDOW};
pub use city_picker::{CityLookup, CityPicker, PickerLevel};
pub use detail::{DetailSurface, PlanRequest, PlanStatus};
pub use map::{Bounds, MapEvent, MapMode, MapSurface, MarkerView, DEFAULT_INTERACTION_THROTTLE, FIT_PADDING};
