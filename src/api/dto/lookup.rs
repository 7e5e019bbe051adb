//! DTOs for the batch photo lookup endpoint.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::BirdImage;

/// Request for photo data for one or more species codes.
///
/// `commonNames`/`scientificNames` map species codes to display names the
/// client already knows; they are stored opportunistically and improve
/// provider search accuracy.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LookupRequest {
    #[validate(length(min = 1, message = "speciesCodes must not be empty"))]
    pub species_codes: Vec<String>,

    #[serde(default)]
    pub common_names: HashMap<String, String>,

    #[serde(default)]
    pub scientific_names: HashMap<String, String>,
}

/// Response mapping each requested species code to its photo data.
///
/// `null` means "not available yet": still queued, processing, or failed.
/// Clients poll by re-requesting on later renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub photos_by_bird: HashMap<String, Option<BirdImage>>,
}
