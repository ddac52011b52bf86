//! # Measurements
//!
//! An environmental reading taken at a garden location: temperature, soil moisture,
//! rainfall and so on. Readings carry their unit, an optional period they cover, and the
//! upper-cased identifier of the source that produced them.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use crate::extract::{JsonBody, PathParams};
use crate::payload::Payload;
use crate::record::{Data, Record};
use crate::validate::{self, ValidationResult};
use crate::vocabulary::IntoMember;
use crate::{ApiError, MeasurementType, MeasurementUnit, sql};

const RESOURCE: &str = "measurement";

/// One environmental reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    garden_location_id: i64,
    measurement_type: MeasurementType,
    value: f64,
    unit: MeasurementUnit,
    timestamp: DateTime<Utc>,
    period_minutes: Option<i32>,
    source: Option<String>,
    notes: Option<String>,
}

impl Measurement {
    /// Creates a measurement timestamped now.
    pub fn new(
        garden_location_id: i64,
        measurement_type: impl IntoMember<MeasurementType>,
        value: f64,
        unit: impl IntoMember<MeasurementUnit>,
    ) -> ValidationResult<Self> {
        Ok(Self {
            garden_location_id,
            measurement_type: measurement_type.into_member()?,
            value: validate::measurement_value(value)?,
            unit: unit.into_member()?,
            timestamp: validate::truncate_to_micros(Utc::now()),
            period_minutes: None,
            source: None,
            notes: None,
        })
    }

    /// Builds a measurement from a JSON request body. A missing timestamp means now.
    pub fn from_payload(p: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            garden_location_id: p.reference("garden_location_id")?,
            measurement_type: p.required_vocabulary("measurement_type")?,
            value: validate::measurement_value(p.required_number("value")?)?,
            unit: p.required_vocabulary("unit")?,
            timestamp: p
                .optional_timestamp("timestamp")?
                .unwrap_or_else(|| validate::truncate_to_micros(Utc::now())),
            period_minutes: p
                .optional_integer("period_minutes")?
                .map(validate::period_minutes)
                .transpose()?,
            source: p.source("source")?,
            notes: p.optional_text("notes", None)?,
        })
    }

    pub fn garden_location_id(&self) -> i64 {
        self.garden_location_id
    }

    pub fn measurement_type(&self) -> MeasurementType {
        self.measurement_type
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> MeasurementUnit {
        self.unit
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn period_minutes(&self) -> Option<i32> {
        self.period_minutes
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn set_garden_location_id(&mut self, id: i64) {
        self.garden_location_id = id;
    }

    pub fn set_measurement_type(
        &mut self,
        value: impl IntoMember<MeasurementType>,
    ) -> ValidationResult<()> {
        self.measurement_type = value.into_member()?;
        Ok(())
    }

    pub fn set_value(&mut self, value: f64) -> ValidationResult<()> {
        self.value = validate::measurement_value(value)?;
        Ok(())
    }

    pub fn set_unit(&mut self, value: impl IntoMember<MeasurementUnit>) -> ValidationResult<()> {
        self.unit = value.into_member()?;
        Ok(())
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = validate::truncate_to_micros(timestamp);
    }

    pub fn set_period_minutes(&mut self, value: Option<i64>) -> ValidationResult<()> {
        self.period_minutes = value.map(validate::period_minutes).transpose()?;
        Ok(())
    }

    pub fn set_source(&mut self, value: Option<&str>) -> ValidationResult<()> {
        self.source = validate::source(value)?;
        Ok(())
    }

    pub fn set_notes(&mut self, value: Option<&str>) -> ValidationResult<()> {
        self.notes = validate::optional_text("notes", value, None)?;
        Ok(())
    }

    /// Applies an already-validated partial update.
    pub fn apply(&mut self, update: MeasurementUpdate) {
        if let Some(id) = update.garden_location_id {
            self.garden_location_id = id;
        }
        if let Some(kind) = update.measurement_type {
            self.measurement_type = kind;
        }
        if let Some(value) = update.value {
            self.value = value;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        if let Some(timestamp) = update.timestamp {
            self.set_timestamp(timestamp);
        }
        if let Some(period) = update.period_minutes {
            self.period_minutes = period;
        }
        if let Some(source) = update.source {
            self.source = source;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
    }
}

/// A validated partial update. `None` leaves the field unchanged; `Some(None)` clears an
/// optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementUpdate {
    pub garden_location_id: Option<i64>,
    pub measurement_type: Option<MeasurementType>,
    pub value: Option<f64>,
    pub unit: Option<MeasurementUnit>,
    pub timestamp: Option<DateTime<Utc>>,
    pub period_minutes: Option<Option<i32>>,
    pub source: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl MeasurementUpdate {
    pub fn from_payload(p: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            garden_location_id: p.update("garden_location_id", Payload::reference)?,
            measurement_type: p.update("measurement_type", Payload::required_vocabulary)?,
            value: p.update("value", |p, f| {
                validate::measurement_value(p.required_number(f)?)
            })?,
            unit: p.update("unit", Payload::required_vocabulary)?,
            timestamp: p.update("timestamp", Payload::timestamp)?,
            period_minutes: p.update("period_minutes", |p, f| {
                p.optional_integer(f)?
                    .map(validate::period_minutes)
                    .transpose()
            })?,
            source: p.update("source", Payload::source)?,
            notes: p.update("notes", |p, f| p.optional_text(f, None))?,
        })
    }
}

//////////////////////////////////////////// HTTP Handlers /////////////////////////////////////////////

async fn list_measurements(
    State(pool): State<PgPool>,
) -> Result<Json<Data<Vec<Record<Measurement>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let measurements = sql::measurement::list(&mut tx).await?;
    tx.commit().await?;
    Ok(Json(Data::new(measurements)))
}

async fn create_measurement(
    State(pool): State<PgPool>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Data<Record<Measurement>>>), ApiError> {
    let measurement = Measurement::from_payload(&Payload::new(&body)?)?;

    let mut tx = pool.begin().await?;
    let id = sql::measurement::create(&mut tx, &measurement).await?;
    tx.commit().await?;

    tracing::info!(
        id,
        garden_location_id = measurement.garden_location_id(),
        kind = %measurement.measurement_type(),
        "recorded measurement"
    );
    Ok((
        StatusCode::CREATED,
        Json(Data::new(Record::new(id, measurement))),
    ))
}

async fn get_measurement(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Record<Measurement>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let measurement = sql::measurement::get(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound {
            resource: RESOURCE,
            id,
        })?;
    tx.commit().await?;
    Ok(Json(Data::new(measurement)))
}

async fn update_measurement(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody,
) -> Result<Json<Data<Record<Measurement>>>, ApiError> {
    let update = MeasurementUpdate::from_payload(&Payload::new(&body)?)?;
    let not_found = ApiError::NotFound {
        resource: RESOURCE,
        id,
    };

    let mut tx = pool.begin().await?;
    let Some(mut measurement) = sql::measurement::get(&mut tx, id).await? else {
        return Err(not_found);
    };
    measurement.entity.apply(update);
    if !sql::measurement::update(&mut tx, id, &measurement.entity).await? {
        return Err(not_found);
    }
    tx.commit().await?;

    tracing::info!(id, "updated measurement");
    Ok(Json(Data::new(measurement)))
}

async fn delete_measurement(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<StatusCode, ApiError> {
    let mut tx = pool.begin().await?;
    if !sql::measurement::delete(&mut tx, id).await? {
        return Err(ApiError::NotFound {
            resource: RESOURCE,
            id,
        });
    }
    tx.commit().await?;

    tracing::info!(id, "deleted measurement");
    Ok(StatusCode::NO_CONTENT)
}

////////////////////////////////////////////// Router //////////////////////////////////////////////////

/// Creates an Axum router with measurement endpoints.
pub fn create_measurement_router(pool: PgPool) -> Router {
    Router::new()
        .route(
            "/measurements",
            get(list_measurements).post(create_measurement),
        )
        .route(
            "/measurements/:id",
            get(get_measurement)
                .put(update_measurement)
                .delete(delete_measurement),
        )
        .with_state(pool)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;
    use crate::ValidationError;

    #[test]
    fn new_measurement_is_timestamped_now() {
        let before = validate::truncate_to_micros(Utc::now());
        let measurement = Measurement::new(2, "temperature", 21.5, "celsius").unwrap();
        assert!(measurement.timestamp() >= before);
        assert_eq!(measurement.timestamp().timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(measurement.measurement_type(), MeasurementType::Temperature);
        assert_eq!(measurement.unit(), MeasurementUnit::Celsius);
    }

    #[test]
    fn value_must_be_finite() {
        assert!(matches!(
            Measurement::new(2, "RAINFALL", f64::INFINITY, "MILLIMETERS"),
            Err(ValidationError::NotANumber { field: "value", .. })
        ));
        assert!(Measurement::new(2, "RAINFALL", -3.0, "MILLIMETERS").is_ok());
    }

    #[test]
    fn source_is_normalized() {
        let mut measurement = Measurement::new(2, "HUMIDITY", 55.0, "PERCENT").unwrap();
        measurement.set_source(Some("  station_7 ")).unwrap();
        assert_eq!(measurement.source(), Some("STATION_7"));
        assert!(measurement.set_source(Some(&"x".repeat(51))).is_err());
        assert_eq!(measurement.source(), Some("STATION_7"));
    }

    #[test]
    fn period_must_be_positive() {
        let mut measurement = Measurement::new(2, "RAINFALL", 4.0, "MILLIMETERS").unwrap();
        assert!(measurement.set_period_minutes(Some(0)).is_err());
        measurement.set_period_minutes(Some(1440)).unwrap();
        assert_eq!(measurement.period_minutes(), Some(1440));
    }

    #[test]
    fn from_payload_with_explicit_timestamp() {
        let body = json!({
            "garden_location_id": 2,
            "measurement_type": "SOIL_PH",
            "value": 6.8,
            "unit": "PH",
            "timestamp": "2024-05-01T06:30:00Z",
            "source": "manual",
        });
        let measurement = Measurement::from_payload(&Payload::new(&body).unwrap()).unwrap();
        assert_eq!(
            measurement.timestamp(),
            Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap()
        );
        assert_eq!(measurement.source(), Some("MANUAL"));
        assert_eq!(measurement.unit().to_string(), "PH");
    }

    #[test]
    fn timestamps_keep_microsecond_precision() {
        let body = json!({
            "garden_location_id": 2,
            "measurement_type": "TEMPERATURE",
            "value": 18.0,
            "unit": "CELSIUS",
            "timestamp": "2024-05-01T06:30:00.1234567Z",
        });
        let mut measurement = Measurement::from_payload(&Payload::new(&body).unwrap()).unwrap();
        assert_eq!(measurement.timestamp().timestamp_subsec_nanos(), 123_456_000);

        let fine = Utc.with_ymd_and_hms(2024, 5, 2, 7, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(999_999_999);
        measurement.set_timestamp(fine);
        assert_eq!(measurement.timestamp().timestamp_subsec_nanos(), 999_999_000);

        let defaulted = json!({
            "garden_location_id": 2,
            "measurement_type": "TEMPERATURE",
            "value": 18.0,
            "unit": "CELSIUS",
        });
        let measurement = Measurement::from_payload(&Payload::new(&defaulted).unwrap()).unwrap();
        assert_eq!(measurement.timestamp().timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn from_payload_rejects_unknown_unit() {
        let body = json!({
            "garden_location_id": 2,
            "measurement_type": "TEMPERATURE",
            "value": 20,
            "unit": "kelvin",
        });
        assert_eq!(
            Measurement::from_payload(&Payload::new(&body).unwrap()),
            Err(ValidationError::UnknownEnumValue {
                vocabulary: "measurement unit",
                value: "kelvin".to_string()
            })
        );
    }

    #[test]
    fn partial_update() {
        let mut measurement = Measurement::new(2, "HUMIDITY", 55.0, "PERCENT").unwrap();
        measurement.set_source(Some("sensor_3")).unwrap();
        let body = json!({"value": 60, "source": null});
        let update = MeasurementUpdate::from_payload(&Payload::new(&body).unwrap()).unwrap();
        measurement.apply(update);
        assert_eq!(measurement.value(), 60.0);
        assert_eq!(measurement.source(), None);
        assert_eq!(measurement.unit(), MeasurementUnit::Percent);
    }
}
