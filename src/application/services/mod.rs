//! Business logic services for the application layer.

pub mod lookup_service;
pub mod sighting_service;

pub use lookup_service::LookupService;
pub use sighting_service::SightingService;
