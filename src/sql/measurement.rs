//! Measurement operations for PostgreSQL database.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};

use super::{SqlResult, corrupt, db_error, delete_error};
use crate::{DataStoreError, Measurement, Record, ValidationError, Vocabulary};

#[derive(Debug, sqlx::FromRow)]
struct MeasurementRow {
    id: i64,
    garden_location_id: i64,
    measurement_type: String,
    value: f64,
    unit: String,
    timestamp: DateTime<Utc>,
    period_minutes: Option<i32>,
    source: Option<String>,
    notes: Option<String>,
}

impl MeasurementRow {
    fn into_measurement(self) -> Result<Measurement, ValidationError> {
        let mut measurement = Measurement::new(
            self.garden_location_id,
            self.measurement_type.as_str(),
            self.value,
            self.unit.as_str(),
        )?;
        measurement.set_timestamp(self.timestamp);
        measurement.set_period_minutes(self.period_minutes.map(i64::from))?;
        measurement.set_source(self.source.as_deref())?;
        measurement.set_notes(self.notes.as_deref())?;
        Ok(measurement)
    }
}

impl TryFrom<MeasurementRow> for Record<Measurement> {
    type Error = DataStoreError;

    fn try_from(row: MeasurementRow) -> Result<Self, Self::Error> {
        let id = row.id;
        row.into_measurement()
            .map(|measurement| Record::new(id, measurement))
            .map_err(|e| corrupt("measurements", id, e))
    }
}

/// Creates a new measurement and returns its identifier.
///
/// Fails with [`DataStoreError::MissingReference`] if the garden location does not exist.
pub async fn create(
    tx: &mut Transaction<'_, Postgres>,
    measurement: &Measurement,
) -> SqlResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO measurements
            (garden_location_id, measurement_type, value, unit, timestamp, period_minutes,
             source, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(measurement.garden_location_id())
    .bind(measurement.measurement_type().name())
    .bind(measurement.value())
    .bind(measurement.unit().name())
    .bind(measurement.timestamp())
    .bind(measurement.period_minutes())
    .bind(measurement.source())
    .bind(measurement.notes())
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("creating measurement"))?;
    Ok(id)
}

/// Retrieves a measurement by identifier.
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> SqlResult<Option<Record<Measurement>>> {
    let row: Option<MeasurementRow> = sqlx::query_as("SELECT * FROM measurements WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error("getting measurement"))?;
    row.map(Record::try_from).transpose()
}

/// Lists every measurement in identifier order.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Record<Measurement>>> {
    let rows: Vec<MeasurementRow> = sqlx::query_as("SELECT * FROM measurements ORDER BY id")
        .fetch_all(&mut **tx)
        .await
        .map_err(db_error("listing measurements"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Lists the measurements taken at a garden location, oldest first.
pub async fn list_for_location(
    tx: &mut Transaction<'_, Postgres>,
    garden_location_id: i64,
) -> SqlResult<Vec<Record<Measurement>>> {
    let rows: Vec<MeasurementRow> = sqlx::query_as(
        "SELECT * FROM measurements WHERE garden_location_id = $1 ORDER BY timestamp, id",
    )
    .bind(garden_location_id)
    .fetch_all(&mut **tx)
    .await
    .map_err(db_error("listing measurements for location"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Overwrites every column of a measurement. Returns false if no such measurement exists.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
    measurement: &Measurement,
) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE measurements
        SET garden_location_id = $2, measurement_type = $3, value = $4, unit = $5,
            timestamp = $6, period_minutes = $7, source = $8, notes = $9
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(measurement.garden_location_id())
    .bind(measurement.measurement_type().name())
    .bind(measurement.value())
    .bind(measurement.unit().name())
    .bind(measurement.timestamp())
    .bind(measurement.period_minutes())
    .bind(measurement.source())
    .bind(measurement.notes())
    .execute(&mut **tx)
    .await
    .map_err(db_error("updating measurement"))?;
    Ok(result.rows_affected() > 0)
}

/// Deletes a measurement. Returns false if no such measurement exists.
pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: i64) -> SqlResult<bool> {
    let result = sqlx::query("DELETE FROM measurements WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(delete_error("deleting measurement"))?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveTime, TimeZone};

    use super::*;
    use crate::sql::tests::setup_test_db;
    use crate::{GardenLocation, IrrigationZone, MeasurementUnit, sql};

    #[tokio::test]
    async fn measurements_round_trip() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();
        let start = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let zone = IrrigationZone::new("Front beds", "1,3,5", start, 30, 2.5).unwrap();
        let zone_id = sql::irrigation_zone::create(&mut tx, &zone).await.unwrap();
        let location =
            GardenLocation::new("Bed", 40.0, -75.0, "FULL", "EXPOSED", "GOOD", zone_id).unwrap();
        let location_id = sql::garden_location::create(&mut tx, &location)
            .await
            .unwrap();

        let mut rain = Measurement::new(location_id, "RAINFALL", 12.0, "MILLIMETERS").unwrap();
        rain.set_timestamp(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());
        rain.set_period_minutes(Some(1440)).unwrap();
        rain.set_source(Some("gauge")).unwrap();
        let id = create(&mut tx, &rain).await.unwrap();

        let stored = get(&mut tx, id).await.unwrap().unwrap();
        assert_eq!(stored.entity, rain);
        assert_eq!(stored.entity.source(), Some("GAUGE"));

        rain.set_unit(MeasurementUnit::Inches).unwrap();
        rain.set_value(0.47).unwrap();
        assert!(update(&mut tx, id, &rain).await.unwrap());
        let for_location = list_for_location(&mut tx, location_id).await.unwrap();
        assert_eq!(for_location.len(), 1);
        assert_eq!(for_location[0].entity.unit(), MeasurementUnit::Inches);

        assert!(delete(&mut tx, id).await.unwrap());
        assert!(list(&mut tx).await.unwrap().is_empty());
        tx.commit().await.unwrap();
    }
}
