//! Configuration: the `wayfarer.toml` schema and the wiring from it (plus
//! environment secrets) to a running [`crate::TravelApp`].

pub mod config;
pub mod toml_config;
