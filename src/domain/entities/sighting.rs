//! Sighting entity representing one logged bird observation.

use chrono::{DateTime, Utc};

/// A bird sighting logged by a user.
#[derive(Debug, Clone)]
pub struct Sighting {
    pub id: i64,
    pub user_id: String,
    pub species_code: String,
    pub com_name: String,
    pub sci_name: String,
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: String,
    pub observed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Input data for logging a new sighting.
#[derive(Debug, Clone)]
pub struct NewSighting {
    pub user_id: String,
    pub species_code: String,
    pub com_name: String,
    pub sci_name: String,
    pub location_name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: String,
    pub observed_at: DateTime<Utc>,
}
