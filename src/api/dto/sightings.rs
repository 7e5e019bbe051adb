//! DTOs for sighting endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Sighting;

/// Request to log one bird sighting.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSightingRequest {
    #[validate(length(min = 1, max = 64))]
    pub species_code: String,

    #[validate(length(min = 1, max = 200))]
    pub com_name: String,

    #[serde(default)]
    pub sci_name: String,

    #[serde(default)]
    pub location_name: String,

    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,

    pub observed_at: DateTime<Utc>,
}

/// One stored sighting.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingResponse {
    pub id: i64,
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

impl From<Sighting> for SightingResponse {
    fn from(s: Sighting) -> Self {
        Self {
            id: s.id,
            species_code: s.species_code,
            com_name: s.com_name,
            sci_name: s.sci_name,
            location_name: s.location_name,
            latitude: s.latitude,
            longitude: s.longitude,
            notes: s.notes,
            observed_at: s.observed_at,
            created_at: s.created_at,
        }
    }
}

/// List response, most recent observation first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SightingListResponse {
    pub sightings: Vec<SightingResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latitude_out_of_range_fails() {
        let request: CreateSightingRequest = serde_json::from_value(serde_json::json!({
            "speciesCode": "mallar3",
            "comName": "Mallard",
            "latitude": 100.0,
            "observedAt": "2025-05-01T10:00:00Z"
        }))
        .unwrap();

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_minimal_request_is_valid() {
        let request: CreateSightingRequest = serde_json::from_value(serde_json::json!({
            "speciesCode": "mallar3",
            "comName": "Mallard",
            "observedAt": "2025-05-01T10:00:00Z"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.sci_name, "");
    }
}
