//! # Observations
//!
//! A timestamped observation of a single plant: a height, a health rating, a growth stage
//! and so on. `numeric_value` carries the reading for numeric observation types and
//! `stage_value` carries the stage for `GROWTH_STAGE` observations; the two are not
//! cross-checked against `observation_type`.

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
use crate::validate::{self, NAME_MAX_LEN, ValidationResult};
use crate::vocabulary::IntoMember;
use crate::{ApiError, GrowthStage, ObservationType, sql};

const RESOURCE: &str = "observation";

/// One observation of a plant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    plant_id: i64,
    timestamp: DateTime<Utc>,
    observation_type: ObservationType,
    numeric_value: Option<f64>,
    stage_value: Option<GrowthStage>,
    notes: Option<String>,
    image_data: Option<String>,
    recorded_by: Option<String>,
}

impl Observation {
    pub fn new(
        plant_id: i64,
        timestamp: DateTime<Utc>,
        observation_type: impl IntoMember<ObservationType>,
    ) -> ValidationResult<Self> {
        Ok(Self {
            plant_id,
            timestamp: validate::truncate_to_micros(timestamp),
            observation_type: observation_type.into_member()?,
            numeric_value: None,
            stage_value: None,
            notes: None,
            image_data: None,
            recorded_by: None,
        })
    }

    /// Builds an observation from a JSON request body.
    pub fn from_payload(p: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            plant_id: p.reference("plant_id")?,
            timestamp: p.timestamp("timestamp")?,
            observation_type: p.required_vocabulary("observation_type")?,
            numeric_value: p.optional_number("numeric_value")?,
            stage_value: p.optional_vocabulary("stage_value")?,
            notes: p.optional_text("notes", None)?,
            image_data: p.optional_text("image_data", None)?,
            recorded_by: p.optional_text("recorded_by", Some(NAME_MAX_LEN))?,
        })
    }

    pub fn plant_id(&self) -> i64 {
        self.plant_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn observation_type(&self) -> ObservationType {
        self.observation_type
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.numeric_value
    }

    pub fn stage_value(&self) -> Option<GrowthStage> {
        self.stage_value
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Base64-encoded image, if one was attached.
    pub fn image_data(&self) -> Option<&str> {
        self.image_data.as_deref()
    }

    pub fn recorded_by(&self) -> Option<&str> {
        self.recorded_by.as_deref()
    }

    pub fn set_plant_id(&mut self, id: i64) {
        self.plant_id = id;
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = validate::truncate_to_micros(timestamp);
    }

    pub fn set_observation_type(
        &mut self,
        value: impl IntoMember<ObservationType>,
    ) -> ValidationResult<()> {
        self.observation_type = value.into_member()?;
        Ok(())
    }

    pub fn set_numeric_value(&mut self, value: Option<f64>) -> ValidationResult<()> {
        self.numeric_value = value
            .map(|v| validate::finite("numeric_value", v))
            .transpose()?;
        Ok(())
    }

    pub fn set_stage_value<V: IntoMember<GrowthStage>>(
        &mut self,
        value: Option<V>,
    ) -> ValidationResult<()> {
        self.stage_value = value.map(IntoMember::into_member).transpose()?;
        Ok(())
    }

    pub fn set_notes(&mut self, value: Option<&str>) -> ValidationResult<()> {
        self.notes = validate::optional_text("notes", value, None)?;
        Ok(())
    }

    pub fn set_image_data(&mut self, value: Option<&str>) -> ValidationResult<()> {
        self.image_data = validate::optional_text("image_data", value, None)?;
        Ok(())
    }

    pub fn set_recorded_by(&mut self, value: Option<&str>) -> ValidationResult<()> {
        self.recorded_by = validate::optional_text("recorded_by", value, Some(NAME_MAX_LEN))?;
        Ok(())
    }

    /// Applies an already-validated partial update.
    pub fn apply(&mut self, update: ObservationUpdate) {
        if let Some(plant_id) = update.plant_id {
            self.plant_id = plant_id;
        }
        if let Some(timestamp) = update.timestamp {
            self.set_timestamp(timestamp);
        }
        if let Some(kind) = update.observation_type {
            self.observation_type = kind;
        }
        if let Some(value) = update.numeric_value {
            self.numeric_value = value;
        }
        if let Some(stage) = update.stage_value {
            self.stage_value = stage;
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(image) = update.image_data {
            self.image_data = image;
        }
        if let Some(recorded_by) = update.recorded_by {
            self.recorded_by = recorded_by;
        }
    }
}

/// A validated partial update. `None` leaves the field unchanged; `Some(None)` clears an
/// optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationUpdate {
    pub plant_id: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub observation_type: Option<ObservationType>,
    pub numeric_value: Option<Option<f64>>,
    pub stage_value: Option<Option<GrowthStage>>,
    pub notes: Option<Option<String>>,
    pub image_data: Option<Option<String>>,
    pub recorded_by: Option<Option<String>>,
}

impl ObservationUpdate {
    pub fn from_payload(p: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            plant_id: p.update("plant_id", Payload::reference)?,
            timestamp: p.update("timestamp", Payload::timestamp)?,
            observation_type: p.update("observation_type", Payload::required_vocabulary)?,
            numeric_value: p.update("numeric_value", Payload::optional_number)?,
            stage_value: p.update("stage_value", Payload::optional_vocabulary)?,
            notes: p.update("notes", |p, f| p.optional_text(f, None))?,
            image_data: p.update("image_data", |p, f| p.optional_text(f, None))?,
            recorded_by: p.update("recorded_by", |p, f| p.optional_text(f, Some(NAME_MAX_LEN)))?,
        })
    }
}

//////////////////////////////////////////// HTTP Handlers /////////////////////////////////////////////

async fn list_observations(
    State(pool): State<PgPool>,
) -> Result<Json<Data<Vec<Record<Observation>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let observations = sql::observation::list(&mut tx).await?;
    tx.commit().await?;
    Ok(Json(Data::new(observations)))
}

async fn create_observation(
    State(pool): State<PgPool>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Data<Record<Observation>>>), ApiError> {
    let observation = Observation::from_payload(&Payload::new(&body)?)?;

    let mut tx = pool.begin().await?;
    let id = sql::observation::create(&mut tx, &observation).await?;
    tx.commit().await?;

    tracing::info!(
        id,
        plant_id = observation.plant_id(),
        kind = %observation.observation_type(),
        "recorded observation"
    );
    Ok((
        StatusCode::CREATED,
        Json(Data::new(Record::new(id, observation))),
    ))
}

async fn get_observation(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Record<Observation>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let observation = sql::observation::get(&mut tx, id)
        .await?
        .ok_or(ApiError::NotFound {
            resource: RESOURCE,
            id,
        })?;
    tx.commit().await?;
    Ok(Json(Data::new(observation)))
}

async fn update_observation(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody,
) -> Result<Json<Data<Record<Observation>>>, ApiError> {
    let update = ObservationUpdate::from_payload(&Payload::new(&body)?)?;
    let not_found = ApiError::NotFound {
        resource: RESOURCE,
        id,
    };

    let mut tx = pool.begin().await?;
    let Some(mut observation) = sql::observation::get(&mut tx, id).await? else {
        return Err(not_found);
    };
    observation.entity.apply(update);
    if !sql::observation::update(&mut tx, id, &observation.entity).await? {
        return Err(not_found);
    }
    tx.commit().await?;

    tracing::info!(id, "updated observation");
    Ok(Json(Data::new(observation)))
}

async fn delete_observation(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<StatusCode, ApiError> {
    let mut tx = pool.begin().await?;
    if !sql::observation::delete(&mut tx, id).await? {
        return Err(ApiError::NotFound {
            resource: RESOURCE,
            id,
        });
    }
    tx.commit().await?;

    tracing::info!(id, "deleted observation");
    Ok(StatusCode::NO_CONTENT)
}

////////////////////////////////////////////// Router //////////////////////////////////////////////////

/// Creates an Axum router with observation endpoints.
pub fn create_observation_router(pool: PgPool) -> Router {
    Router::new()
        .route(
            "/observations",
            get(list_observations).post(create_observation),
        )
        .route(
            "/observations/:id",
            get(get_observation)
                .put(update_observation)
                .delete(delete_observation),
        )
        .with_state(pool)
}
