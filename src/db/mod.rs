//! Saved-itinerary persistence.
//!
//! - **Supabase**: hosted Postgres through PostgREST (`saved_itineraries` table)
//! - **Memory**: process-local fallback for offline development and tests

pub mod memory;
pub mod supabase;
pub mod traits;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;
pub use traits::{ItineraryStore, PersistenceGateway, StoreProvider};
