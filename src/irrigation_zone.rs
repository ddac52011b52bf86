//! # Irrigation Zones
//!
//! An irrigation zone waters one or more garden locations on a weekly schedule. Each zone
//! runs for `duration_minutes` starting at `start_time` on every scheduled weekday,
//! delivering `flow_rate_gpm` gallons per minute.
//!
//! ```rust
//! use chrono::NaiveTime;
//! use garden::{IrrigationZone, Weekday};
//!
//! let start = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
//! let zone = IrrigationZone::new("Front beds", ["Mon", "Wed", "Fri"], start, 30, 2.5).unwrap();
//! assert_eq!(zone.scheduled_days().to_canonical_string(), "1,3,5");
//! assert_eq!(zone.water_usage(), 75.0);
//! assert!(zone.is_scheduled_for_day(Weekday::Wednesday));
//! ```
//!
//! ## HTTP
//!
//! - `GET|POST /irrigation_zones`
//! - `GET|PUT|DELETE /irrigation_zones/:id`
//! - `GET /irrigation_zones/:id/garden_locations`
//! - `GET /irrigation_zones/:id/water_usage`
//! - `POST|DELETE /irrigation_zones/:id/scheduled_days/:day`

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveTime;
use serde::Serialize;
use sqlx::PgPool;

use crate::extract::{JsonBody, PathParams};
use crate::payload::Payload;
use crate::record::{Data, Record};
use crate::schedule::{DayInput, Schedule, ScheduleInput};
use crate::validate::{self, NAME_MAX_LEN, ValidationResult};
use crate::{ApiError, GardenLocation, Weekday, sql};

const RESOURCE: &str = "irrigation zone";

/// A watering schedule shared by one or more garden locations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrrigationZone {
    name: String,
    scheduled_days: Schedule,
    start_time: NaiveTime,
    duration_minutes: i32,
    flow_rate_gpm: f64,
}

impl IrrigationZone {
    /// Creates a zone, validating every field.
    pub fn new(
        name: &str,
        scheduled_days: impl Into<ScheduleInput>,
        start_time: NaiveTime,
        duration_minutes: i64,
        flow_rate_gpm: f64,
    ) -> ValidationResult<Self> {
        Ok(Self {
            name: validate::required_text("name", name, NAME_MAX_LEN)?,
            scheduled_days: Schedule::parse(scheduled_days)?,
            start_time: validate::truncate_to_seconds(start_time),
            duration_minutes: validate::duration_minutes(duration_minutes)?,
            flow_rate_gpm: validate::flow_rate_gpm(flow_rate_gpm)?,
        })
    }

    /// Builds a zone from a JSON request body.
    pub fn from_payload(payload: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            name: payload.required_text("name", NAME_MAX_LEN)?,
            scheduled_days: payload.schedule("scheduled_days")?,
            start_time: payload.time_of_day("start_time")?,
            duration_minutes: validate::duration_minutes(
                payload.required_integer("duration_minutes")?,
            )?,
            flow_rate_gpm: validate::flow_rate_gpm(payload.required_number("flow_rate_gpm")?)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheduled_days(&self) -> Schedule {
        self.scheduled_days
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn duration_minutes(&self) -> i32 {
        self.duration_minutes
    }

    pub fn flow_rate_gpm(&self) -> f64 {
        self.flow_rate_gpm
    }

    pub fn set_name(&mut self, name: &str) -> ValidationResult<()> {
        self.name = validate::required_text("name", name, NAME_MAX_LEN)?;
        Ok(())
    }

    pub fn set_scheduled_days(&mut self, days: impl Into<ScheduleInput>) -> ValidationResult<()> {
        self.scheduled_days = Schedule::parse(days)?;
        Ok(())
    }

    pub fn set_start_time(&mut self, start_time: NaiveTime) {
        self.start_time = validate::truncate_to_seconds(start_time);
    }

    pub fn set_duration_minutes(&mut self, minutes: i64) -> ValidationResult<()> {
        self.duration_minutes = validate::duration_minutes(minutes)?;
        Ok(())
    }

    pub fn set_flow_rate_gpm(&mut self, gpm: f64) -> ValidationResult<()> {
        self.flow_rate_gpm = validate::flow_rate_gpm(gpm)?;
        Ok(())
    }

    /// Gallons delivered by one watering cycle.
    pub fn water_usage(&self) -> f64 {
        f64::from(self.duration_minutes) * self.flow_rate_gpm
    }

    pub fn is_scheduled_for_day(&self, day: Weekday) -> bool {
        self.scheduled_days.is_scheduled_for_day(day)
    }

    pub fn add_scheduled_day(&mut self, day: impl Into<DayInput>) -> ValidationResult<()> {
        self.scheduled_days.add_day(day)
    }

    pub fn remove_scheduled_day(&mut self, day: impl Into<DayInput>) -> ValidationResult<()> {
        self.scheduled_days.remove_day(day)
    }

    /// Applies an already-validated partial update.
    pub fn apply(&mut self, update: IrrigationZoneUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(days) = update.scheduled_days {
            self.scheduled_days = days;
        }
        if let Some(start_time) = update.start_time {
            self.start_time = start_time;
        }
        if let Some(minutes) = update.duration_minutes {
            self.duration_minutes = minutes;
        }
        if let Some(gpm) = update.flow_rate_gpm {
            self.flow_rate_gpm = gpm;
        }
    }
}

/// A validated partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IrrigationZoneUpdate {
    pub name: Option<String>,
    pub scheduled_days: Option<Schedule>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<i32>,
    pub flow_rate_gpm: Option<f64>,
}

impl IrrigationZoneUpdate {
    pub fn from_payload(payload: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            name: payload.update("name", |p, f| p.required_text(f, NAME_MAX_LEN))?,
            scheduled_days: payload.update("scheduled_days", Payload::schedule)?,
            start_time: payload.update("start_time", Payload::time_of_day)?,
            duration_minutes: payload.update("duration_minutes", |p, f| {
                validate::duration_minutes(p.required_integer(f)?)
            })?,
            flow_rate_gpm: payload.update("flow_rate_gpm", |p, f| {
                validate::flow_rate_gpm(p.required_number(f)?)
            })?,
        })
    }
}

/// Response body of the water usage endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaterUsage {
    pub gallons: f64,
}

//////////////////////////////////////////// HTTP Handlers /////////////////////////////////////////////

async fn list_irrigation_zones(
    State(pool): State<PgPool>,
) -> Result<Json<Data<Vec<Record<IrrigationZone>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let zones = sql::irrigation_zone::list(&mut tx).await?;
    tx.commit().await?;
    Ok(Json(Data::new(zones)))
}

async fn create_irrigation_zone(
    State(pool): State<PgPool>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Data<Record<IrrigationZone>>>), ApiError> {
    let zone = IrrigationZone::from_payload(&Payload::new(&body)?)?;

    let mut tx = pool.begin().await?;
    let id = sql::irrigation_zone::create(&mut tx, &zone).await?;
    tx.commit().await?;

    tracing::info!(id, name = zone.name(), "created irrigation zone");
    Ok((StatusCode::CREATED, Json(Data::new(Record::new(id, zone)))))
}

async fn get_irrigation_zone(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Record<IrrigationZone>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let zone = fetch(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(Data::new(zone)))
}

async fn update_irrigation_zone(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody,
) -> Result<Json<Data<Record<IrrigationZone>>>, ApiError> {
    let update = IrrigationZoneUpdate::from_payload(&Payload::new(&body)?)?;

    let mut tx = pool.begin().await?;
    let mut zone = fetch(&mut tx, id).await?;
    zone.entity.apply(update);
    store(&mut tx, &zone).await?;
    tx.commit().await?;

    tracing::info!(id, "updated irrigation zone");
    Ok(Json(Data::new(zone)))
}

async fn delete_irrigation_zone(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<StatusCode, ApiError> {
    let mut tx = pool.begin().await?;
    if !sql::irrigation_zone::delete(&mut tx, id).await? {
        return Err(ApiError::NotFound {
            resource: RESOURCE,
            id,
        });
    }
    tx.commit().await?;

    tracing::info!(id, "deleted irrigation zone");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_zone_garden_locations(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Vec<Record<GardenLocation>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    let locations = sql::garden_location::list_for_zone(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(Data::new(locations)))
}

async fn get_water_usage(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<WaterUsage>>, ApiError> {
    let mut tx = pool.begin().await?;
    let zone = fetch(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(Data::new(WaterUsage {
        gallons: zone.entity.water_usage(),
    })))
}

async fn add_scheduled_day(
    State(pool): State<PgPool>,
    PathParams((id, day)): PathParams<(i64, String)>,
) -> Result<Json<Data<Record<IrrigationZone>>>, ApiError> {
    let day = Weekday::parse_token(&day)?;

    let mut tx = pool.begin().await?;
    let mut zone = fetch(&mut tx, id).await?;
    zone.entity.add_scheduled_day(day)?;
    store(&mut tx, &zone).await?;
    tx.commit().await?;

    tracing::info!(id, %day, "added scheduled day");
    Ok(Json(Data::new(zone)))
}

async fn remove_scheduled_day(
    State(pool): State<PgPool>,
    PathParams((id, day)): PathParams<(i64, String)>,
) -> Result<Json<Data<Record<IrrigationZone>>>, ApiError> {
    let day = Weekday::parse_token(&day)?;

    let mut tx = pool.begin().await?;
    let mut zone = fetch(&mut tx, id).await?;
    zone.entity.remove_scheduled_day(day)?;
    store(&mut tx, &zone).await?;
    tx.commit().await?;

    tracing::info!(id, %day, "removed scheduled day");
    Ok(Json(Data::new(zone)))
}

async fn fetch(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
) -> Result<Record<IrrigationZone>, ApiError> {
    sql::irrigation_zone::get(tx, id)
        .await?
        .ok_or(ApiError::NotFound {
            resource: RESOURCE,
            id,
        })
}

async fn store(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    zone: &Record<IrrigationZone>,
) -> Result<(), ApiError> {
    if !sql::irrigation_zone::update(tx, zone.id, &zone.entity).await? {
        return Err(ApiError::NotFound {
            resource: RESOURCE,
            id: zone.id,
        });
    }
    Ok(())
}

////////////////////////////////////////////// Router //////////////////////////////////////////////////

/// Creates an Axum router with irrigation zone endpoints.
pub fn create_irrigation_zone_router(pool: PgPool) -> Router {
    Router::new()
        .route(
            "/irrigation_zones",
            get(list_irrigation_zones).post(create_irrigation_zone),
        )
        .route(
            "/irrigation_zones/:id",
            get(get_irrigation_zone)
                .put(update_irrigation_zone)
                .delete(delete_irrigation_zone),
        )
        .route(
            "/irrigation_zones/:id/garden_locations",
            get(list_zone_garden_locations),
        )
        .route("/irrigation_zones/:id/water_usage", get(get_water_usage))
        .route(
            "/irrigation_zones/:id/scheduled_days/:day",
            post(add_scheduled_day).delete(remove_scheduled_day),
        )
        .with_state(pool)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ValidationError;

    fn six_am() -> NaiveTime {
        NaiveTime::from_hms_opt(6, 0, 0).unwrap()
    }

    fn front_beds() -> IrrigationZone {
        IrrigationZone::new("Front beds", ["Mon", "Wed", "Fri"], six_am(), 30, 2.5).unwrap()
    }

    #[test]
    fn new_zone_encodes_schedule() {
        let zone = front_beds();
        assert_eq!(zone.name(), "Front beds");
        assert_eq!(zone.scheduled_days().to_canonical_string(), "1,3,5");
        assert_eq!(zone.start_time(), six_am());
        assert_eq!(zone.water_usage(), 75.0);
    }

    #[test]
    fn new_zone_rejects_bad_fields() {
        assert_eq!(
            IrrigationZone::new(" ", "1", six_am(), 30, 2.5),
            Err(ValidationError::EmptyValue { field: "name" })
        );
        assert_eq!(
            IrrigationZone::new("Zone", Vec::<Weekday>::new(), six_am(), 30, 2.5),
            Err(ValidationError::EmptySchedule)
        );
        assert!(matches!(
            IrrigationZone::new("Zone", "1", six_am(), 0, 2.5),
            Err(ValidationError::OutOfRange { field: "duration_minutes", .. })
        ));
        assert!(matches!(
            IrrigationZone::new("Zone", "1", six_am(), 30, 0.0),
            Err(ValidationError::OutOfRange { field: "flow_rate_gpm", .. })
        ));
    }

    #[test]
    fn failed_setter_keeps_previous_value() {
        let mut zone = front_beds();
        assert!(zone.set_duration_minutes(500).is_err());
        assert_eq!(zone.duration_minutes(), 30);
        assert!(zone.set_scheduled_days("").is_err());
        assert_eq!(zone.scheduled_days().to_canonical_string(), "1,3,5");
        zone.set_flow_rate_gpm(1.5).unwrap();
        assert_eq!(zone.water_usage(), 45.0);
    }

    #[test]
    fn schedule_mutations() {
        let mut zone = front_beds();
        zone.add_scheduled_day("sun").unwrap();
        assert!(zone.is_scheduled_for_day(Weekday::Sunday));
        zone.remove_scheduled_day(Weekday::Monday).unwrap();
        assert_eq!(zone.scheduled_days().to_canonical_string(), "0,3,5");
        assert_eq!(
            zone.remove_scheduled_day("TUE"),
            Err(ValidationError::NotScheduled {
                day: Weekday::Tuesday
            })
        );
    }

    #[test]
    fn from_payload_accepts_strings_and_lists() {
        let body = json!({
            "name": "Back lawn",
            "scheduled_days": "TUE,THU",
            "start_time": "18:30",
            "duration_minutes": 45,
            "flow_rate_gpm": 4,
        });
        let zone = IrrigationZone::from_payload(&Payload::new(&body).unwrap()).unwrap();
        assert_eq!(zone.scheduled_days().to_canonical_string(), "2,4");
        assert_eq!(zone.start_time(), NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(zone.water_usage(), 180.0);
    }

    #[test]
    fn from_payload_requires_every_field() {
        let body = json!({"name": "Back lawn", "scheduled_days": [1]});
        assert_eq!(
            IrrigationZone::from_payload(&Payload::new(&body).unwrap()),
            Err(ValidationError::MissingField {
                field: "start_time"
            })
        );
    }

    #[test]
    fn partial_update_touches_only_present_fields() {
        let mut zone = front_beds();
        let body = json!({"duration_minutes": 10, "scheduled_days": ["SA"]});
        let update = IrrigationZoneUpdate::from_payload(&Payload::new(&body).unwrap()).unwrap();
        zone.apply(update);
        assert_eq!(zone.name(), "Front beds");
        assert_eq!(zone.duration_minutes(), 10);
        assert_eq!(zone.scheduled_days().to_canonical_string(), "6");
    }

    #[test]
    fn partial_update_rejects_null_required_field() {
        let body = json!({"name": null});
        assert_eq!(
            IrrigationZoneUpdate::from_payload(&Payload::new(&body).unwrap()),
            Err(ValidationError::MissingField { field: "name" })
        );
    }

    #[test]
    fn serializes_schedule_as_ordinals() {
        let value = serde_json::to_value(Record::new(3, front_beds())).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 3,
                "name": "Front beds",
                "scheduled_days": [1, 3, 5],
                "start_time": "06:00:00",
                "duration_minutes": 30,
                "flow_rate_gpm": 2.5,
            })
        );
    }
}
