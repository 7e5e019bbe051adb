//! Data Transfer Objects for API requests and responses.
//!
//! All DTOs use Serde for JSON serialization/deserialization and validator
//! for input validation. The wire format is camelCase to match the
//! existing client.

pub mod health;
pub mod lookup;
pub mod sightings;
