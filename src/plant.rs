//! # Plants
//!
//! A plant grows at one garden location. Beyond its name and three required
//! classifications (growth form, life cycle, primary use) every attribute is optional:
//!
//! ```rust
//! use garden::{Plant, UseCategory};
//!
//! let mut plant = Plant::new(1, "Tomato", "HERB", "annual", UseCategory::Vegetable).unwrap();
//! plant.set_variety(Some("Brandywine")).unwrap();
//! plant.set_hardiness_zone_min(Some(3)).unwrap();
//! assert!(plant.set_hardiness_zone_max(Some(14)).is_err());
//! assert_eq!(plant.hardiness_zone_max(), None);
//! ```
//!
//! Paired minimums and maximums are validated independently.

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
use crate::{ApiError, GrowthForm, LifeCycle, Observation, UseCategory, sql};

const RESOURCE: &str = "plant";

/// A plant growing at a garden location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plant {
    garden_location_id: i64,
    name: String,
    scientific_name: Option<String>,
    variety: Option<String>,
    growth_form: GrowthForm,
    life_cycle: LifeCycle,
    primary_use: UseCategory,
    secondary_use: Option<UseCategory>,
    expected_height_inches: Option<i32>,
    expected_spread_inches: Option<i32>,
    spacing_inches: Option<i32>,
    hardiness_zone_min: Option<i32>,
    hardiness_zone_max: Option<i32>,
    preferred_soil_ph_min: Option<f64>,
    preferred_soil_ph_max: Option<f64>,
    planting_depth_inches: Option<f64>,
    description: Option<String>,
    care_instructions: Option<String>,
    notes: Option<String>,
}

fn optional_name(field: &'static str, raw: Option<&str>) -> ValidationResult<Option<String>> {
    validate::optional_text(field, raw, Some(NAME_MAX_LEN))
}

fn optional_integer(field: &'static str, raw: Option<i64>) -> ValidationResult<Option<i32>> {
    raw.map(|v| validate::storable_integer(field, v)).transpose()
}

fn optional_zone(field: &'static str, raw: Option<i64>) -> ValidationResult<Option<i32>> {
    raw.map(|v| validate::hardiness_zone(field, v)).transpose()
}

fn optional_ph(field: &'static str, raw: Option<f64>) -> ValidationResult<Option<f64>> {
    raw.map(|v| validate::soil_ph(field, v)).transpose()
}

fn optional_float(field: &'static str, raw: Option<f64>) -> ValidationResult<Option<f64>> {
    raw.map(|v| validate::finite(field, v)).transpose()
}

impl Plant {
    /// Creates a plant with only its required attributes set.
    pub fn new(
        garden_location_id: i64,
        name: &str,
        growth_form: impl IntoMember<GrowthForm>,
        life_cycle: impl IntoMember<LifeCycle>,
        primary_use: impl IntoMember<UseCategory>,
    ) -> ValidationResult<Self> {
        Ok(Self {
            garden_location_id,
            name: validate::required_text("name", name, NAME_MAX_LEN)?,
            scientific_name: None,
            variety: None,
            growth_form: growth_form.into_member()?,
            life_cycle: life_cycle.into_member()?,
            primary_use: primary_use.into_member()?,
            secondary_use: None,
            expected_height_inches: None,
            expected_spread_inches: None,
            spacing_inches: None,
            hardiness_zone_min: None,
            hardiness_zone_max: None,
            preferred_soil_ph_min: None,
            preferred_soil_ph_max: None,
            planting_depth_inches: None,
            description: None,
            care_instructions: None,
            notes: None,
        })
    }

    /// Builds a plant from a JSON request body.
    pub fn from_payload(p: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            garden_location_id: p.reference("garden_location_id")?,
            name: p.required_text("name", NAME_MAX_LEN)?,
            scientific_name: p.optional_text("scientific_name", Some(NAME_MAX_LEN))?,
            variety: p.optional_text("variety", Some(NAME_MAX_LEN))?,
            growth_form: p.required_vocabulary("growth_form")?,
            life_cycle: p.required_vocabulary("life_cycle")?,
            primary_use: p.required_vocabulary("primary_use")?,
            secondary_use: p.optional_vocabulary("secondary_use")?,
            expected_height_inches: optional_integer(
                "expected_height_inches",
                p.optional_integer("expected_height_inches")?,
            )?,
            expected_spread_inches: optional_integer(
                "expected_spread_inches",
                p.optional_integer("expected_spread_inches")?,
            )?,
            spacing_inches: optional_integer("spacing_inches", p.optional_integer("spacing_inches")?)?,
            hardiness_zone_min: optional_zone(
                "hardiness_zone_min",
                p.optional_integer("hardiness_zone_min")?,
            )?,
            hardiness_zone_max: optional_zone(
                "hardiness_zone_max",
                p.optional_integer("hardiness_zone_max")?,
            )?,
            preferred_soil_ph_min: optional_ph(
                "preferred_soil_ph_min",
                p.optional_number("preferred_soil_ph_min")?,
            )?,
            preferred_soil_ph_max: optional_ph(
                "preferred_soil_ph_max",
                p.optional_number("preferred_soil_ph_max")?,
            )?,
            planting_depth_inches: p.optional_number("planting_depth_inches")?,
            description: p.optional_text("description", None)?,
            care_instructions: p.optional_text("care_instructions", None)?,
            notes: p.optional_text("notes", None)?,
        })
    }

    pub fn garden_location_id(&self) -> i64 {
        self.garden_location_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scientific_name(&self) -> Option<&str> {
        self.scientific_name.as_deref()
    }

    pub fn variety(&self) -> Option<&str> {
        self.variety.as_deref()
    }

    pub fn growth_form(&self) -> GrowthForm {
        self.growth_form
    }

    pub fn life_cycle(&self) -> LifeCycle {
        self.life_cycle
    }

    pub fn primary_use(&self) -> UseCategory {
        self.primary_use
    }

    pub fn secondary_use(&self) -> Option<UseCategory> {
        self.secondary_use
    }

    pub fn expected_height_inches(&self) -> Option<i32> {
        self.expected_height_inches
    }

    pub fn expected_spread_inches(&self) -> Option<i32> {
        self.expected_spread_inches
    }

    pub fn spacing_inches(&self) -> Option<i32> {
        self.spacing_inches
    }

    pub fn hardiness_zone_min(&self) -> Option<i32> {
        self.hardiness_zone_min
    }

    pub fn hardiness_zone_max(&self) -> Option<i32> {
        self.hardiness_zone_max
    }

    pub fn preferred_soil_ph_min(&self) -> Option<f64> {
        self.preferred_soil_ph_min
    }

    pub fn preferred_soil_ph_max(&self) -> Option<f64> {
        self.preferred_soil_ph_max
    }

    pub fn planting_depth_inches(&self) -> Option<f64> {
        self.planting_depth_inches
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn care_instructions(&self) -> Option<&str> {
        self.care_instructions.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn set_garden_location_id(&mut self, id: i64) {
        self.garden_location_id = id;
    }

    pub fn set_name(&mut self, name: &str) -> ValidationResult<()> {
        self.name = validate::required_text("name", name, NAME_MAX_LEN)?;
        Ok(())
    }

    pub fn set_scientific_name(&mut self, value: Option<&str>) -> ValidationResult<()> {
        self.scientific_name = optional_name("scientific_name", value)?;
        Ok(())
    }

    pub fn set_variety(&mut self, value: Option<&str>) -> ValidationResult<()> {
        self.variety = optional_name("variety", value)?;
        Ok(())
    }

    pub fn set_growth_form(&mut self, value: impl IntoMember<GrowthForm>) -> ValidationResult<()> {
        self.growth_form = value.into_member()?;
        Ok(())
    }

    pub fn set_life_cycle(&mut self, value: impl IntoMember<LifeCycle>) -> ValidationResult<()> {
        self.life_cycle = value.into_member()?;
        Ok(())
    }

    pub fn set_primary_use(&mut self, value: impl IntoMember<UseCategory>) -> ValidationResult<()> {
        self.primary_use = value.into_member()?;
        Ok(())
    }

    pub fn set_secondary_use<V: IntoMember<UseCategory>>(
        &mut self,
        value: Option<V>,
    ) -> ValidationResult<()> {
        self.secondary_use = value.map(IntoMember::into_member).transpose()?;
        Ok(())
    }

    pub fn set_expected_height_inches(&mut self, value: Option<i64>) -> ValidationResult<()> {
        self.expected_height_inches = optional_integer("expected_height_inches", value)?;
        Ok(())
    }

    pub fn set_expected_spread_inches(&mut self, value: Option<i64>) -> ValidationResult<()> {
        self.expected_spread_inches = optional_integer("expected_spread_inches", value)?;
        Ok(())
    }

    pub fn set_spacing_inches(&mut self, value: Option<i64>) -> ValidationResult<()> {
        self.spacing_inches = optional_integer("spacing_inches", value)?;
        Ok(())
    }

    pub fn set_hardiness_zone_min(&mut self, value: Option<i64>) -> ValidationResult<()> {
        self.hardiness_zone_min = optional_zone("hardiness_zone_min", value)?;
        Ok(())
    }

    pub fn set_hardiness_zone_max(&mut self, value: Option<i64>) -> ValidationResult<()> {
        self.hardiness_zone_max = optional_zone("hardiness_zone_max", value)?;
        Ok(())
    }

    pub fn set_preferred_soil_ph_min(&mut self, value: Option<f64>) -> ValidationResult<()> {
        self.preferred_soil_ph_min = optional_ph("preferred_soil_ph_min", value)?;
        Ok(())
    }

    pub fn set_preferred_soil_ph_max(&mut self, value: Option<f64>) -> ValidationResult<()> {
        self.preferred_soil_ph_max = optional_ph("preferred_soil_ph_max", value)?;
        Ok(())
    }

    pub fn set_planting_depth_inches(&mut self, value: Option<f64>) -> ValidationResult<()> {
        self.planting_depth_inches = optional_float("planting_depth_inches", value)?;
        Ok(())
    }

    pub fn set_description(&mut self, value: Option<&str>) {
        self.description = value.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    }

    pub fn set_care_instructions(&mut self, value: Option<&str>) {
        self.care_instructions = value.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    }

    pub fn set_notes(&mut self, value: Option<&str>) {
        self.notes = value.map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    }

    /// Applies an already-validated partial update.
    pub fn apply(&mut self, update: PlantUpdate) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        set(&mut self.garden_location_id, update.garden_location_id);
        set(&mut self.name, update.name);
        set(&mut self.scientific_name, update.scientific_name);
        set(&mut self.variety, update.variety);
        set(&mut self.growth_form, update.growth_form);
        set(&mut self.life_cycle, update.life_cycle);
        set(&mut self.primary_use, update.primary_use);
        set(&mut self.secondary_use, update.secondary_use);
        set(&mut self.expected_height_inches, update.expected_height_inches);
        set(&mut self.expected_spread_inches, update.expected_spread_inches);
        set(&mut self.spacing_inches, update.spacing_inches);
        set(&mut self.hardiness_zone_min, update.hardiness_zone_min);
        set(&mut self.hardiness_zone_max, update.hardiness_zone_max);
        set(&mut self.preferred_soil_ph_min, update.preferred_soil_ph_min);
        set(&mut self.preferred_soil_ph_max, update.preferred_soil_ph_max);
        set(&mut self.planting_depth_inches, update.planting_depth_inches);
        set(&mut self.description, update.description);
        set(&mut self.care_instructions, update.care_instructions);
        set(&mut self.notes, update.notes);
    }
}

/// A validated partial update. `None` leaves the field unchanged; `Some(None)` clears an
/// optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlantUpdate {
    pub garden_location_id: Option<i64>,
    pub name: Option<String>,
    pub scientific_name: Option<Option<String>>,
    pub variety: Option<Option<String>>,
    pub growth_form: Option<GrowthForm>,
    pub life_cycle: Option<LifeCycle>,
    pub primary_use: Option<UseCategory>,
    pub secondary_use: Option<Option<UseCategory>>,
    pub expected_height_inches: Option<Option<i32>>,
    pub expected_spread_inches: Option<Option<i32>>,
    pub spacing_inches: Option<Option<i32>>,
    pub hardiness_zone_min: Option<Option<i32>>,
    pub hardiness_zone_max: Option<Option<i32>>,
    pub preferred_soil_ph_min: Option<Option<f64>>,
    pub preferred_soil_ph_max: Option<Option<f64>>,
    pub planting_depth_inches: Option<Option<f64>>,
    pub description: Option<Option<String>>,
    pub care_instructions: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

fn integer_field(p: &Payload<'_>, f: &'static str) -> ValidationResult<Option<i32>> {
    optional_integer(f, p.optional_integer(f)?)
}

fn zone_field(p: &Payload<'_>, f: &'static str) -> ValidationResult<Option<i32>> {
    optional_zone(f, p.optional_integer(f)?)
}

fn ph_field(p: &Payload<'_>, f: &'static str) -> ValidationResult<Option<f64>> {
    optional_ph(f, p.optional_number(f)?)
}

fn name_field(p: &Payload<'_>, f: &'static str) -> ValidationResult<Option<String>> {
    p.optional_text(f, Some(NAME_MAX_LEN))
}

fn text_field(p: &Payload<'_>, f: &'static str) -> ValidationResult<Option<String>> {
    p.optional_text(f, None)
}

impl PlantUpdate {
    pub fn from_payload(p: &Payload<'_>) -> ValidationResult<Self> {
        Ok(Self {
            garden_location_id: p.update("garden_location_id", Payload::reference)?,
            name: p.update("name", |p, f| p.required_text(f, NAME_MAX_LEN))?,
            scientific_name: p.update("scientific_name", name_field)?,
            variety: p.update("variety", name_field)?,
            growth_form: p.update("growth_form", Payload::required_vocabulary)?,
            life_cycle: p.update("life_cycle", Payload::required_vocabulary)?,
            primary_use: p.update("primary_use", Payload::required_vocabulary)?,
            secondary_use: p.update("secondary_use", Payload::optional_vocabulary)?,
            expected_height_inches: p.update("expected_height_inches", integer_field)?,
            expected_spread_inches: p.update("expected_spread_inches", integer_field)?,
            spacing_inches: p.update("spacing_inches", integer_field)?,
            hardiness_zone_min: p.update("hardiness_zone_min", zone_field)?,
            hardiness_zone_max: p.update("hardiness_zone_max", zone_field)?,
            preferred_soil_ph_min: p.update("preferred_soil_ph_min", ph_field)?,
            preferred_soil_ph_max: p.update("preferred_soil_ph_max", ph_field)?,
            planting_depth_inches: p.update("planting_depth_inches", Payload::optional_number)?,
            description: p.update("description", text_field)?,
            care_instructions: p.update("care_instructions", text_field)?,
            notes: p.update("notes", text_field)?,
        })
    }
}

//////////////////////////////////////////// HTTP Handlers /////////////////////////////////////////////

async fn list_plants(
    State(pool): State<PgPool>,
) -> Result<Json<Data<Vec<Record<Plant>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let plants = sql::plant::list(&mut tx).await?;
    tx.commit().await?;
    Ok(Json(Data::new(plants)))
}

async fn create_plant(
    State(pool): State<PgPool>,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Data<Record<Plant>>>), ApiError> {
    let plant = Plant::from_payload(&Payload::new(&body)?)?;

    let mut tx = pool.begin().await?;
    let id = sql::plant::create(&mut tx, &plant).await?;
    tx.commit().await?;

    tracing::info!(id, name = plant.name(), "created plant");
    Ok((StatusCode::CREATED, Json(Data::new(Record::new(id, plant)))))
}

async fn get_plant(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Record<Plant>>>, ApiError> {
    let mut tx = pool.begin().await?;
    let plant = fetch(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(Data::new(plant)))
}

async fn update_plant(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody,
) -> Result<Json<Data<Record<Plant>>>, ApiError> {
    let update = PlantUpdate::from_payload(&Payload::new(&body)?)?;

    let mut tx = pool.begin().await?;
    let mut plant = fetch(&mut tx, id).await?;
    plant.entity.apply(update);
    if !sql::plant::update(&mut tx, id, &plant.entity).await? {
        return Err(ApiError::NotFound {
            resource: RESOURCE,
            id,
        });
    }
    tx.commit().await?;

    tracing::info!(id, "updated plant");
    Ok(Json(Data::new(plant)))
}

async fn delete_plant(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<StatusCode, ApiError> {
    let mut tx = pool.begin().await?;
    if !sql::plant::delete(&mut tx, id).await? {
        return Err(ApiError::NotFound {
            resource: RESOURCE,
            id,
        });
    }
    tx.commit().await?;

    tracing::info!(id, "deleted plant");
    Ok(StatusCode::NO_CONTENT)
}

async fn list_plant_observations(
    State(pool): State<PgPool>,
    PathParams(id): PathParams<i64>,
) -> Result<Json<Data<Vec<Record<Observation>>>>, ApiError> {
    let mut tx = pool.begin().await?;
    fetch(&mut tx, id).await?;
    let observations = sql::observation::list_for_plant(&mut tx, id).await?;
    tx.commit().await?;
    Ok(Json(Data::new(observations)))
}

async fn fetch(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    id: i64,
) -> Result<Record<Plant>, ApiError> {
    sql::plant::get(tx, id).await?.ok_or(ApiError::NotFound {
        resource: RESOURCE,
        id,
    })
}

////////////////////////////////////////////// Router //////////////////////////////////////////////////

/// Creates an Axum router with plant endpoints.
pub fn create_plant_router(pool: PgPool) -> Router {
    Router::new()
        .route("/plants", get(list_plants).post(create_plant))
        .route(
            "/plants/:id",
            get(get_plant).put(update_plant).delete(delete_plant),
        )
        .route("/plants/:id/observations", get(list_plant_observations))
        .with_state(pool)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ValidationError;

    fn tomato() -> Plant {
        Plant::new(1, "Tomato", GrowthForm::Herb, LifeCycle::Annual, UseCategory::Vegetable)
            .unwrap()
    }

    #[test]
    fn new_plant_has_no_optional_attributes() {
        let plant = tomato();
        assert_eq!(plant.name(), "Tomato");
        assert_eq!(plant.secondary_use(), None);
        assert_eq!(plant.hardiness_zone_min(), None);
        assert_eq!(plant.notes(), None);
    }

    #[test]
    fn required_enums_resolve_names() {
        let plant = Plant::new(1, "Oak", "tree", "Perennial", "shade").unwrap();
        assert_eq!(plant.growth_form(), GrowthForm::Tree);
        assert_eq!(plant.primary_use(), UseCategory::Shade);
        assert!(matches!(
            Plant::new(1, "Oak", "TREE", "forever", "SHADE"),
            Err(ValidationError::UnknownEnumValue {
                vocabulary: "life cycle",
                ..
            })
        ));
    }

    #[test]
    fn hardiness_zone_bounds() {
        let mut plant = tomato();
        assert!(plant.set_hardiness_zone_min(Some(0)).is_err());
        assert!(plant.set_hardiness_zone_max(Some(14)).is_err());
        plant.set_hardiness_zone_min(Some(1)).unwrap();
        plant.set_hardiness_zone_max(Some(13)).unwrap();
        assert_eq!(plant.hardiness_zone_min(), Some(1));
        assert_eq!(plant.hardiness_zone_max(), Some(13));
    }

    #[test]
    fn min_and_max_are_independent() {
        let mut plant = tomato();
        plant.set_hardiness_zone_min(Some(9)).unwrap();
        plant.set_hardiness_zone_max(Some(3)).unwrap();
        plant.set_preferred_soil_ph_min(Some(7.5)).unwrap();
        plant.set_preferred_soil_ph_max(Some(6.0)).unwrap();
        assert_eq!(plant.hardiness_zone_min(), Some(9));
        assert_eq!(plant.preferred_soil_ph_max(), Some(6.0));
    }

    #[test]
    fn soil_ph_bounds() {
        let mut plant = tomato();
        assert!(plant.set_preferred_soil_ph_min(Some(-1.0)).is_err());
        assert!(plant.set_preferred_soil_ph_max(Some(14.5)).is_err());
        plant.set_preferred_soil_ph_max(Some(14.0)).unwrap();
    }

    #[test]
    fn optional_text_limits() {
        let mut plant = tomato();
        assert!(matches!(
            plant.set_variety(Some(&"v".repeat(101))),
            Err(ValidationError::TooLong { field: "variety", .. })
        ));
        plant.set_scientific_name(Some("  Solanum lycopersicum ")).unwrap();
        assert_eq!(plant.scientific_name(), Some("Solanum lycopersicum"));
        plant.set_scientific_name(Some("   ")).unwrap();
        assert_eq!(plant.scientific_name(), None);
    }

    #[test]
    fn secondary_use_accepts_names_and_members() {
        let mut plant = tomato();
        plant.set_secondary_use(Some("pollinator")).unwrap();
        assert_eq!(plant.secondary_use(), Some(UseCategory::Pollinator));
        plant.set_secondary_use(None::<UseCategory>).unwrap();
        assert_eq!(plant.secondary_use(), None);
        assert!(plant.set_secondary_use(Some("weeds")).is_err());
    }

    #[test]
    fn from_payload_full() {
        let body = json!({
            "garden_location_id": 3,
            "name": "Lavender",
            "scientific_name": "Lavandula angustifolia",
            "growth_form": "SHRUB",
            "life_cycle": "PERENNIAL",
            "primary_use": "ORNAMENTAL",
            "secondary_use": "POLLINATOR",
            "expected_height_inches": 24,
            "spacing_inches": 18,
            "hardiness_zone_min": 5,
            "hardiness_zone_max": 9,
            "preferred_soil_ph_min": 6.5,
            "preferred_soil_ph_max": 7.5,
            "planting_depth_inches": 0.25,
            "care_instructions": "Full sun, lean soil.",
        });
        let plant = Plant::from_payload(&Payload::new(&body).unwrap()).unwrap();
        assert_eq!(plant.garden_location_id(), 3);
        assert_eq!(plant.secondary_use(), Some(UseCategory::Pollinator));
        assert_eq!(plant.hardiness_zone_max(), Some(9));
        assert_eq!(plant.expected_spread_inches(), None);
        assert_eq!(plant.care_instructions(), Some("Full sun, lean soil."));
    }

    #[test]
    fn from_payload_rejects_bad_zone() {
        let body = json!({
            "garden_location_id": 3,
            "name": "Lavender",
            "growth_form": "SHRUB",
            "life_cycle": "PERENNIAL",
            "primary_use": "ORNAMENTAL",
            "hardiness_zone_min": 0,
        });
        assert!(matches!(
            Plant::from_payload(&Payload::new(&body).unwrap()),
            Err(ValidationError::OutOfRange {
                field: "hardiness_zone_min",
                ..
            })
        ));
    }

    #[test]
    fn partial_update() {
        let mut plant = tomato();
        plant.set_notes(Some("staked"));
        plant.set_spacing_inches(Some(24)).unwrap();
        let body = json!({"notes": null, "variety": "Roma", "secondary_use": "fruit"});
        let update = PlantUpdate::from_payload(&Payload::new(&body).unwrap()).unwrap();
        plant.apply(update);
        assert_eq!(plant.notes(), None);
        assert_eq!(plant.variety(), Some("Roma"));
        assert_eq!(plant.secondary_use(), Some(UseCategory::Fruit));
        assert_eq!(plant.spacing_inches(), Some(24));
        assert_eq!(plant.name(), "Tomato");
    }

    #[test]
    fn partial_update_rejects_null_required_enum() {
        let body = json!({"growth_form": null});
        assert_eq!(
            PlantUpdate::from_payload(&Payload::new(&body).unwrap()),
            Err(ValidationError::MissingField {
                field: "growth_form"
            })
        );
    }
}
