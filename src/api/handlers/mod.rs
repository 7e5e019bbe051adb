//! HTTP request handlers for API endpoints.

pub mod health;
pub mod lookup;
pub mod sightings;

pub use health::health_handler;
pub use lookup::lookup_handler;
pub use sightings::{create_sighting_handler, list_sightings_handler};
