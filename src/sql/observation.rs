//! Observation operations for PostgreSQL database.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use super::{SqlResult, corrupt, db_error, delete_error};
use crate::{DataStoreError, Observation, Record, ValidationError, Vocabulary};

#[derive(Debug, sqlx::FromRow)]
struct ObservationRow {
    id: i64,
    plant_id: i64,
    timestamp: DateTime<Utc>,
    observation_type: String,
    numeric_value: Option<f64>,
    stage_value: Option<String>,
    notes: Option<String>,
    image_data: Option<String>,
    recorded_by: Option<String>,
}

impl ObservationRow {
    fn into_observation(self) -> Result<Observation, ValidationError> {
        let mut observation =
            Observation::new(self.plant_id, self.timestamp, self.observation_type.as_str())?;
        observation.set_numeric_value(self.numeric_value)?;
        observation.set_stage_value(self.stage_value.as_deref())?;
        observation.set_notes(self.notes.as_deref())?;
        observation.set_image_data(self.image_data.as_deref())?;
        observation.set_recorded_by(self.recorded_by.as_deref())?;
        Ok(observation)
    }
}

impl TryFrom<ObservationRow> for Record<Observation> {
    type Error = DataStoreError;

    fn try_from(row: ObservationRow) -> Result<Self, Self::Error> {
        let id = row.id;
        row.into_observation()
            .map(|observation| Record::new(id, observation))
            .map_err(|e| corrupt("observations", id, e))
    }
}

/// Creates a new observation and returns its identifier.
///
/// Fails with [`DataStoreError::MissingReference`] if the plant does not exist.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    observation: &Observation,
) -> SqlResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO observations
            (plant_id, timestamp, observation_type, numeric_value, stage_value, notes,
             image_data, recorded_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(observation.plant_id())
    .bind(observation.timestamp())
    .bind(observation.observation_type().name())
    .bind(observation.numeric_value())
    .bind(observation.stage_value().map(Vocabulary::name))
    .bind(observation.notes())
    .bind(observation.image_data())
    .bind(observation.recorded_by())
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("creating observation"))?;
    Ok(id)
}

/// Retrieves an observation by identifier.
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> SqlResult<Option<Record<Observation>>> {
    let row: Option<ObservationRow> = sqlx::query_as("SELECT * FROM observations WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error("getting observation"))?;
    row.map(Record::try_from).transpose()
}

/// Lists every observation in identifier order.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Record<Observation>>> {
    let rows: Vec<ObservationRow> = sqlx::query_as("SELECT * FROM observations ORDER BY id")
        .fetch_all(&mut **tx)
        .await
        .map_err(db_error("listing observations"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Lists the observations of a plant, oldest first.
pub async fn list_for_plant(
    tx: &mut Transaction<'_, Postgres>,
    plant_id: i64,
) -> SqlResult<Vec<Record<Observation>>> {
    let rows: Vec<ObservationRow> = sqlx::query_as(
        "SELECT * FROM observations WHERE plant_id = $1 ORDER BY timestamp, id",
    )
    .bind(plant_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(db_error("listing observations for plant"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Overwrites every column of an observation. Returns false if no such observation exists.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
    observation: &Observation,
) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE observations
        SET plant_id = $2, timestamp = $3, observation_type = $4, numeric_value = $5,
            stage_value = $6, notes = $7, image_data = $8, recorded_by = $9
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(observation.plant_id())
    .bind(observation.timestamp())
    .bind(observation.observation_type().name())
    .bind(observation.numeric_value())
    .bind(observation.stage_value().map(Vocabulary::name))
    .bind(observation.notes())
    .bind(observation.image_data())
    .bind(observation.recorded_by())
    .execute(&mut **tx)
    .await
    .map_err(db_error("updating observation"))?;
    Ok(result.rows_affected() > 0)
}

/// Deletes an observation. Returns false if no such observation exists.
pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: i64) -> SqlResult<bool> {
    let result = sqlx::query("DELETE FROM observations WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(delete_error("deleting observation"))?;
    Ok(result.rows_affected() > 0)
}
