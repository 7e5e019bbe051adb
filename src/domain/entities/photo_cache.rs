//! Cache entry entity for the bird photo pipeline.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Minutes a PROCESSING entry may sit before a lookup treats it as stuck.
pub const STALE_AFTER_MINUTES: i64 = 5;

/// Processing state of a cache entry.
///
/// Entries move `Pending -> Processing -> {Completed | Failed}`. A `Failed`
/// entry returns to `Pending` when a client requests it again; a stuck
/// `Processing` entry is reset to `Pending` by the staleness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PhotoStatus {
    /// Storage representation used in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }

    /// Parses a stored status string. Unknown values yield `None`;
    /// [`CacheEntry::from_raw`] maps those to `Pending`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(Self::Pending),
            "PROCESSING" => Some(Self::Processing),
            "COMPLETED" => Some(Self::Completed),
            "FAILED" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One cached photo lookup per species code.
///
/// `com_name` and `sci_name` use the empty string for "unknown"; they are
/// filled opportunistically by whichever caller learns them first and never
/// overwritten afterwards.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub species_code: String,
    pub status: PhotoStatus,
    pub com_name: String,
    pub sci_name: String,
    /// Single-URL field kept for entries written before the
    /// thumbnail/original split.
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub original_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Backoff gate: the worker must not pick the entry up before this time.
    pub process_after: Option<DateTime<Utc>>,
    pub priority: i32,
    pub error_count: i32,
    pub last_error: String,
}

/// Stored row shape with every non-key column optional.
///
/// Rows written by older revisions of the service may predate the
/// thumbnail/original split or lack bookkeeping columns entirely, so reads
/// go through [`CacheEntry::from_raw`] instead of assuming the current
/// schema.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct RawCacheEntry {
    pub species_code: Option<String>,
    pub status: Option<String>,
    pub com_name: Option<String>,
    pub sci_name: Option<String>,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub original_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub process_after: Option<DateTime<Utc>>,
    pub priority: Option<i32>,
    pub error_count: Option<i32>,
    pub last_error: Option<String>,
}

impl CacheEntry {
    /// Normalizes a raw stored row into a complete entry.
    ///
    /// Missing fields get defined defaults; a legacy `image_url` back-fills
    /// missing thumbnail/original URLs; unknown status strings normalize to
    /// `Pending` so old rows re-enter the queue instead of wedging.
    pub fn from_raw(raw: RawCacheEntry, species_code: &str) -> Self {
        let now = Utc::now();
        let legacy = raw.image_url.clone();

        Self {
            species_code: raw
                .species_code
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| species_code.to_string()),
            status: raw
                .status
                .as_deref()
                .and_then(PhotoStatus::parse)
                .unwrap_or(PhotoStatus::Pending),
            com_name: raw.com_name.unwrap_or_default(),
            sci_name: raw.sci_name.unwrap_or_default(),
            thumbnail_url: raw.thumbnail_url.or_else(|| legacy.clone()),
            original_url: raw.original_url.or_else(|| legacy.clone()),
            image_url: legacy,
            created_at: raw.created_at.unwrap_or(now),
            updated_at: raw.updated_at.unwrap_or(now),
            process_after: raw.process_after,
            priority: raw.priority.unwrap_or(1),
            error_count: raw.error_count.unwrap_or(0),
            last_error: raw.last_error.unwrap_or_default(),
        }
    }

    /// Resolved thumbnail, falling back to the legacy single-URL field.
    pub fn resolved_thumbnail(&self) -> Option<&str> {
        self.thumbnail_url
            .as_deref()
            .or(self.image_url.as_deref())
    }

    /// True when the entry holds a servable image.
    pub fn has_image(&self) -> bool {
        self.status == PhotoStatus::Completed && self.resolved_thumbnail().is_some()
    }

    /// True when a PROCESSING entry has sat past the staleness threshold,
    /// which means the worker run that claimed it likely died.
    pub fn is_stuck(&self, now: DateTime<Utc>) -> bool {
        self.status == PhotoStatus::Processing
            && now - self.created_at > Duration::minutes(STALE_AFTER_MINUTES)
    }

    /// Converts a completed entry into the client-facing image payload.
    pub fn to_bird_image(&self) -> Option<BirdImage> {
        let thumbnail = self.resolved_thumbnail()?.to_string();
        Some(BirdImage {
            species_code: self.species_code.clone(),
            com_name: self.com_name.clone(),
            image_url: self.image_url.clone().or_else(|| Some(thumbnail.clone())),
            thumbnail_url: Some(thumbnail),
            original_url: self
                .original_url
                .clone()
                .or_else(|| self.image_url.clone()),
        })
    }
}

/// Resolved photo data returned to clients for one species code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BirdImage {
    pub species_code: String,
    pub com_name: String,
    /// Deprecated single-URL field, mirrors the thumbnail for old clients.
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub original_url: Option<String>,
}
