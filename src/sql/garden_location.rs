//! Garden location operations for PostgreSQL database.
//!
//! Enum columns hold upper-case member names.

use sqlx::{Postgres, Transaction};

use super::{SqlResult, corrupt, db_error, delete_error};
use crate::{DataStoreError, GardenLocation, Record, ValidationError, Vocabulary};

#[derive(Debug, sqlx::FromRow)]
struct GardenLocationRow {
    id: i64,
    name: String,
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
    sun_exposure: String,
    wind_exposure: String,
    drainage: String,
    irrigation_zone_id: i64,
}

impl GardenLocationRow {
    fn into_location(self) -> Result<GardenLocation, ValidationError> {
        let mut location = GardenLocation::new(
            &self.name,
            self.latitude,
            self.longitude,
            self.sun_exposure.as_str(),
            self.wind_exposure.as_str(),
            self.drainage.as_str(),
            self.irrigation_zone_id,
        )?;
        location.set_elevation(self.elevation)?;
        Ok(location)
    }
}

impl TryFrom<GardenLocationRow> for Record<GardenLocation> {
    type Error = DataStoreError;

    fn try_from(row: GardenLocationRow) -> Result<Self, Self::Error> {
        let id = row.id;
        row.into_location()
            .map(|location| Record::new(id, location))
            .map_err(|e| corrupt("garden_locations", id, e))
    }
}

/// Creates a new garden location and returns its identifier.
///
/// Fails with [`DataStoreError::MissingReference`] if the irrigation zone does not exist.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    location: &GardenLocation,
) -> SqlResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO garden_locations
            (name, latitude, longitude, elevation, sun_exposure, wind_exposure, drainage, irrigation_zone_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(location.name())
    .bind(location.latitude())
    .bind(location.longitude())
    .bind(location.elevation())
    .bind(location.sun_exposure().name())
    .bind(location.wind_exposure().name())
    .bind(location.drainage().name())
    .bind(location.irrigation_zone_id())
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("creating garden location"))?;
    Ok(id)
}

/// Retrieves a garden location by identifier.
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> SqlResult<Option<Record<GardenLocation>>> {
    let row: Option<GardenLocationRow> = sqlx::query_as(
        r#"
        SELECT id, name, latitude, longitude, elevation, sun_exposure, wind_exposure, drainage,
               irrigation_zone_id
        FROM garden_locations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_error("getting garden location"))?;
    row.map(Record::try_from).transpose()
}

/// Lists every garden location in identifier order.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Record<GardenLocation>>> {
    let rows: Vec<GardenLocationRow> = sqlx::query_as(
        r#"
        SELECT id, name, latitude, longitude, elevation, sun_exposure, wind_exposure, drainage,
               irrigation_zone_id
        FROM garden_locations
        ORDER BY id
        "#,
    )
    .fetch_all(&mut **tx)
    .await
    .map_err(db_error("listing garden locations"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Lists the garden locations watered by an irrigation zone.
pub async fn list_for_zone(
    tx: &mut Transaction<'_, Postgres>,
    irrigation_zone_id: i64,
) -> SqlResult<Vec<Record<GardenLocation>>> {
    let rows: Vec<GardenLocationRow> = sqlx::query_as(
        r#"
        SELECT id, name, latitude, longitude, elevation, sun_exposure, wind_exposure, drainage,
               irrigation_zone_id
        FROM garden_locations
        WHERE irrigation_zone_id = $1
        ORDER BY id
        "#,
    )
    .bind(irrigation_zone_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(db_error("listing garden locations for zone"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Overwrites every column of a garden location. Returns false if no such location exists.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
    location: &GardenLocation,
) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE garden_locations
        SET name = $2, latitude = $3, longitude = $4, elevation = $5, sun_exposure = $6,
            wind_exposure = $7, drainage = $8, irrigation_zone_id = $9
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(location.name())
    .bind(location.latitude())
    .bind(location.longitude())
    .bind(location.elevation())
    .bind(location.sun_exposure().name())
    .bind(location.wind_exposure().name())
    .bind(location.drainage().name())
    .bind(location.irrigation_zone_id())
    .execute(&mut **tx)
    .await
    .map_err(db_error("updating garden location"))?;
    Ok(result.rows_affected() > 0)
}

/// Deletes a garden location. Returns false if no such location exists.
///
/// Fails with [`DataStoreError::InUse`] while plants or measurements reference it.
pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: i64) -> SqlResult<bool> {
    let result = sqlx::query("DELETE FROM garden_locations WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(delete_error("deleting garden location"))?;
    Ok(result.rows_affected() > 0)
}
