//! # Garden Locations
//!
//! A garden location is a named spot with coordinates, growing conditions, and the
//! irrigation zone that waters it. Plants and environmental measurements hang off a
//! location.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use sqlx::PgPool;

use crate::extract::{JsonBody, PathParams};
use crate::payload::Payload;
use crate::record::{Data, Record};
use crate::validate::{self, NAME_MAX_LEN, ValidationResult};
use crate::vocabulary::IntoMember;
use crate::{ApiError, Drainage, Measurement, Plant, SunExposure, WindExposure, sql};

const RESOURCE: &str = "garden location";

/// A place in the garden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GardenLocation {
    name: String,
    latitude: f64,
    longitude: f64,
    elevation: Option<f64>,
    sun_exposure: SunExposure,
    wind_exposure: WindExposure,
    drainage: Drainage,
    irrigation_zone_id: i64,
}

impl GardenLocation {
    /// Creates a location with no elevation, validating every field.
    pub fn new(
        name: &str,
        latitude: f64,
        longitude: f64,
        sun_exposure: impl IntoMember<SunExposure>,
        wind_exposure: impl IntoMember<WindExposure>,
        drainage: impl IntoMember<Drainage>,
        irrigation_zone_id: i64,
    ) -> ValidationResult<Self> {
        Ok(Self {
            name: validate::required_text("name", name, NAME_MAX_LEN)?,
            latitude: validate::latitude(latitude)?,
            longitude: validate::longitude(longitude)?,
            elevation: None,
            sun_exposure: sun_exposure.into_member()?,
            wind_exposure: wind_exposure.into_member()?,
            drainage: drainage.into_member()?,
            irrigation_zone_id,
        })
    }

    /// Builds a location from a JSON request body.
    pub fn from_payload(payload: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            name: payload.required_text("name", NAME_MAX_LEN)?,
            latitude: validate::latitude(payload.required_number("latitude")?)?,
            longitude: validate::longitude(payload.required_number("longitude")?)?,
            elevation: validate::elevation(payload.optional_number("elevation")?)?,
            sun_exposure: payload.required_vocabulary("sun_exposure")?,
            wind_exposure: payload.required_vocabulary("wind_exposure")?,
            drainage: payload.required_vocabulary("drainage")?,
            irrigation_zone_id: payload.reference("irrigation_zone_id")?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// `(latitude, longitude)`.
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    pub fn elevation(&self) -> Option<f64> {
        self.elevation
    }

    pub fn sun_exposure(&self) -> SunExposure {
        self.sun_exposure
    }

    pub fn wind_exposure(&self) -> WindExposure {
        self.wind_exposure
    }

    pub fn drainage(&self) -> Drainage {
        self.drainage
    }

    pub fn irrigation_zone_id(&self) -> i64 {
        self.irrigation_zone_id
    }

    pub fn set_name(&mut self, name: &str) -> ValidationResult<()> {
        self.name = validate::required_text("name", name, NAME_MAX_LEN)?;
        Ok(())
    }

    pub fn set_latitude(&mut self, latitude: f64) -> ValidationResult<()> {
        self.latitude = validate::latitude(latitude)?;
        Ok(())
    }

    pub fn set_longitude(&mut self, longitude: f64) -> ValidationResult<()> {
        self.longitude = validate::longitude(longitude)?;
        Ok(())
    }

    /// Sets both coordinates, or neither.
    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) -> ValidationResult<()> {
        let latitude = validate::latitude(latitude)?;
        self.longitude = validate::longitude(longitude)?;
        self.latitude = latitude;
        Ok(())
    }

    pub fn set_elevation(&mut self, elevation: Option<f64>) -> ValidationResult<()> {
        self.elevation = validate::elevation(elevation)?;
        Ok(())
    }

    pub fn set_sun_exposure(&mut self, value: impl IntoMember<SunExposure>) -> ValidationResult<()> {
        self.sun_exposure = value.into_member()?;
        Ok(())
    }

    pub fn set_wind_exposure(
        &mut self,
        value: impl IntoMember<WindExposure>,
    ) -> ValidationResult<()> {
        self.wind_exposure = value.into_member()?;
        Ok(())
    }

    pub fn set_drainage(&mut self, value: impl IntoMember<Drainage>) -> ValidationResult<()> {
        self.drainage = value.into_member()?;
        Ok(())
    }

    pub fn set_irrigation_zone_id(&mut self, id: i64) {
        self.irrigation_zone_id = id;
    }

    /// Applies an already-validated partial update.
    pub fn apply(&mut self, update: GardenLocationUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(latitude) = update.latitude {
            self.latitude = latitude;
        }
        if let Some(longitude) = update.longitude {
            self.longitude = longitude;
        }
        if let Some(elevation) = update.elevation {
            self.elevation = elevation;
        }
        if let Some(sun) = update.sun_exposure {
            self.sun_exposure = sun;
        }
        if let Some(wind) = update.wind_exposure {
            self.wind_exposure = wind;
        }
        if let Some(drainage) = update.drainage {
            self.drainage = drainage;
        }
        if let Some(zone) = update.irrigation_zone_id {
            self.irrigation_zone_id = zone;
        }
    }
}

/// A validated partial update. `None` leaves the field unchanged; `Some(None)` clears an
/// optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GardenLocationUpdate {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<Option<f64>>,
    pub sun_exposure: Option<SunExposure>,
    pub wind_exposure: Option<WindExposure>,
    pub drainage: Option<Drainage>,
    pub irrigation_zone_id: Option<i64>,
}

impl GardenLocationUpdate {
    pub fn from_payload(payload: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            name: payload.update("name", |p, f| p.required_text(f, NAME_MAX_LEN))?,
            latitude: payload.update("latitude", |p, f| {
                validate::latitude(p.required_number(f)?)
            })?,
            longitude: payload.update("longitude", |p, f| {
                validate::longitude(p.required_number(f)?)
            })?,
            elevation: payload.update("elevation", |p, f| {
                validate::elevation(p.optional_number(f)?)
            })?,
            sun_exposure: payload.update("sun_exposure", Payload::required_vocabulary)?,
            wind_exposure: payload.update("wind_exposure", Payload::required_vocabulary)?,
            drainage: payload.update("drainage", Payload::required_vocabulary)?,
            irrigation_zone_id: payload.update("irrigation_zone_id", Payload::reference)?,
        })
    }
}

//////////////////////////////////////////// HTTP Handlers /////////////////////////////////////////////

async fn list_garden_locations(
    State(pool): State<PgPool>,
) -> Result<Json<Data<Vec<Record<GardenLocation>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let locations = sql::garden_location::list(&mut tx).await?;
    tx.commit().await?;
    Ok(Json(Data::new(locations)))
}

async fn create_garden_location(
    State(pool): State<PgPool>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Data<Record<GardenLocation>>>), ApiError> {
    let location = GardenLocation::from_payload(&Payload::new(&body)?)?;

    let mut tx = pool.begin().await?;
    let id = sql::garden_location::create(&mut tx, &location).await?;
    tx.commit().await?;

    tracing::info!(id, name = location.name(), "created garden location");
    Ok((
        StatusCode::CREATED,
        Json(Data::new(Record::new(id, location))),
    ))
}

async fn get_garden_location(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Record<GardenLocation>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let location = fetch(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(Data::new(location)))
}

async fn update_garden_location(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody,
) -> Result<Json<Data<Record<GardenLocation>>>, ApiError> {
    let update = GardenLocationUpdate::from_payload(&Payload::new(&body)?)?;

    let mut tx = pool.begin().await?;
    let mut location = fetch(&mut tx, id).await?;
    location.entity.apply(update);
    if !sql::garden_location::update(&mut tx, id, &location.entity).await? {
        return Err(ApiError::NotFound {
            resource: RESOURCE,
            id,
        });
    }
    tx.commit().await?;

    tracing::info!(id, "updated garden location");
    Ok(Json(Data::new(location)))
}

async fn delete_garden_location(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<StatusCode, ApiError> {
    let mut tx = pool.begin().await?;
    if !sql::garden_location::delete(&mut tx, id).await? {
        return Err(ApiError::NotFound {
            resource: RESOURCE,
            id,
        });
    }
    tx.commit().await?;

    tracing::info!(id, "deleted garden location");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_location_plants(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Vec<Record<Plant>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    let plants = sql::plant::list_for_location(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(Data::new(plants)))
}

async fn list_location_measurements(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Vec<Record<Measurement>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    let measurements = sql::measurement::list_for_location(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(Data::new(measurements)))
}

async fn fetch(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
) -> Result<Record<GardenLocation>, ApiError> {
    sql::garden_location::get(tx, id)
        .await?
        .ok_or(ApiError::NotFound {
            resource: RESOURCE,
            id,
        })
}

////////////////////////////////////////////// Router //////////////////////////////////////////////////

/// Creates an Axum router with garden location endpoints.
pub fn create_garden_location_router(pool: PgPool) -> Router {
    Router::new()
        .route(
            "/garden_locations",
            get(list_garden_locations).post(create_garden_location),
        )
        .route(
            "/garden_locations/:id",
            get(get_garden_location)
                .put(update_garden_location)
                .delete(delete_garden_location),
        )
        .route("/garden_locations/:id/plants", get(list_location_plants))
        .route(
            "/garden_locations/:id/measurements",
            get(list_location_measurements),
        )
        .with_state(pool)
}
