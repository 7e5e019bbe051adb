//! PostgreSQL implementation of the sighting repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewSighting, Sighting};
use crate::domain::repositories::SightingRepository;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct SightingRow {
    id: i64,
    user_id: String,
    species_code: String,
    com_name: String,
    sci_name: String,
    location_name: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    notes: String,
    observed_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl From<SightingRow> for Sighting {
    fn from(r: SightingRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            species_code: r.species_code,
            com_name: r.com_name,
            sci_name: r.sci_name,
            location_name: r.location_name,
            latitude: r.latitude,
            longitude: r.longitude,
            notes: r.notes,
            observed_at: r.observed_at,
            created_at: r.created_at,
        }
    }
}

/// PostgreSQL repository for bird sightings.
pub struct PgSightingRepository {
    pool: Arc<PgPool>,
}

impl PgSightingRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SightingRepository for PgSightingRepository {
    async fn create(&self, new_sighting: NewSighting) -> Result<Sighting, AppError> {
        let row = sqlx::query_as::<_, SightingRow>(
            r#"
            INSERT INTO sightings
                (user_id, species_code, com_name, sci_name, location_name,
                 latitude, longitude, notes, observed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, user_id, species_code, com_name, sci_name, location_name,
                      latitude, longitude, notes, observed_at, created_at
            "#,
        )
        .bind(&new_sighting.user_id)
        .bind(&new_sighting.species_code)
        .bind(&new_sighting.com_name)
        .bind(&new_sighting.sci_name)
        .bind(&new_sighting.location_name)
        .bind(new_sighting.latitude)
        .bind(new_sighting.longitude)
        .bind(&new_sighting.notes)
        .bind(new_sighting.observed_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Sighting>, AppError> {
        let rows = sqlx::query_as::<_, SightingRow>(
            r#"
            SELECT id, user_id, species_code, com_name, sci_name, location_name,
                   latitude, longitude, notes, observed_at, created_at
            FROM sightings
            WHERE user_id = $1
            ORDER BY observed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
