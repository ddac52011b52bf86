//! Plant operations for PostgreSQL database.

use sqlx::{Postgres, Transaction};

use super::{SqlResult, corrupt, db_error, delete_error};
use crate::{DataStoreError, Plant, Record, ValidationError, Vocabulary};

#[derive(Debug, sqlx::FromRow)]
struct PlantRow {
    id: i64,
    garden_location_id: i64,
    name: String,
    scientific_name: Option<String>,
    variety: Option<String>,
    growth_form: String,
    life_cycle: String,
    primary_use: String,
    secondary_use: Option<String>,
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

impl PlantRow {
    fn into_plant(self) -> Result<Plant, ValidationError> {
        let mut plant = Plant::new(
            self.garden_location_id,
            &self.name,
            self.growth_form.as_str(),
            self.life_cycle.as_str(),
            self.primary_use.as_str(),
        )?;
        plant.set_scientific_name(self.scientific_name.as_deref())?;
        plant.set_variety(self.variety.as_deref())?;
        plant.set_secondary_use(self.secondary_use.as_deref())?;
        plant.set_expected_height_inches(self.expected_height_inches.map(i64::from))?;
        plant.set_expected_spread_inches(self.expected_spread_inches.map(i64::from))?;
        plant.set_spacing_inches(self.spacing_inches.map(i64::from))?;
        plant.set_hardiness_zone_min(self.hardiness_zone_min.map(i64::from))?;
        plant.set_hardiness_zone_max(self.hardiness_zone_max.map(i64::from))?;
        plant.set_preferred_soil_ph_min(self.preferred_soil_ph_min)?;
        plant.set_preferred_soil_ph_max(self.preferred_soil_ph_max)?;
        plant.set_planting_depth_inches(self.planting_depth_inches)?;
        plant.set_description(self.description.as_deref());
        plant.set_care_instructions(self.care_instructions.as_deref());
        plant.set_notes(self.notes.as_deref());
        Ok(plant)
    }
}

impl TryFrom<PlantRow> for Record<Plant> {
    type Error = DataStoreError;

    fn try_from(row: PlantRow) -> Result<Self, Self::Error> {
        let id = row.id;
        row.into_plant()
            .map(|plant| Record::new(id, plant))
            .map_err(|e| corrupt("plants", id, e))
    }
}

/// Creates a new plant and returns its identifier.
///
/// Fails with [`DataStoreError::MissingReference`] if the garden location does not exist.
pub async fn create(tx: &mut Transaction<'_, Postgres>, plant: &Plant) -> SqlResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO plants
            (garden_location_id, name, scientific_name, variety, growth_form, life_cycle,
             primary_use, secondary_use, expected_height_inches, expected_spread_inches,
             spacing_inches, hardiness_zone_min, hardiness_zone_max, preferred_soil_ph_min,
             preferred_soil_ph_max, planting_depth_inches, description, care_instructions, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
        RETURNING id
        "#,
    )
    .bind(plant.garden_location_id())
    .bind(plant.name())
    .bind(plant.scientific_name())
    .bind(plant.variety())
    .bind(plant.growth_form().name())
    .bind(plant.life_cycle().name())
    .bind(plant.primary_use().name())
    .bind(plant.secondary_use().map(Vocabulary::name))
    .bind(plant.expected_height_inches())
    .bind(plant.expected_spread_inches())
    .bind(plant.spacing_inches())
    .bind(plant.hardiness_zone_min())
    .bind(plant.hardiness_zone_max())
    .bind(plant.preferred_soil_ph_min())
    .bind(plant.preferred_soil_ph_max())
    .bind(plant.planting_depth_inches())
    .bind(plant.description())
    .bind(plant.care_instructions())
    .bind(plant.notes())
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("creating plant"))?;
    Ok(id)
}

/// Retrieves a plant by identifier.
pub async fn get(tx: &mut Transaction<'_, Postgres>, id: i64) -> SqlResult<Option<Record<Plant>>> {
    let row: Option<PlantRow> = sqlx::query_as("SELECT * FROM plants WHERE id = $1")
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(db_error("getting plant"))?;
    row.map(Record::try_from).transpose()
}

/// Lists every plant in identifier order.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Record<Plant>>> {
    let rows: Vec<PlantRow> = sqlx::query_as("SELECT * FROM plants ORDER BY id")
        .fetch_all(&mut **tx)
        .await
        .map_err(db_error("listing plants"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Lists the plants growing at a garden location.
pub async fn list_for_location(
    tx: &mut Transaction<'_, Postgres>,
    garden_location_id: i64,
) -> SqlResult<Vec<Record<Plant>>> {
    let rows: Vec<PlantRow> =
        sqlx::query_as("SELECT * FROM plants WHERE garden_location_id = $1 ORDER BY id")
            .bind(garden_location_id)
            .fetch_all(&mut **tx)
            .await
            .map_err(db_error("listing plants for location"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Overwrites every column of a plant. Returns false if no such plant exists.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
    plant: &Plant,
) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE plants
        SET garden_location_id = $2, name = $3, scientific_name = $4, variety = $5,
            growth_form = $6, life_cycle = $7, primary_use = $8, secondary_use = $9,
            expected_height_inches = $10, expected_spread_inches = $11, spacing_inches = $12,
            hardiness_zone_min = $13, hardiness_zone_max = $14, preferred_soil_ph_min = $15,
            preferred_soil_ph_max = $16, planting_depth_inches = $17, description = $18,
            care_instructions = $19, notes = $20
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(plant.garden_location_id())
    .bind(plant.name())
    .bind(plant.scientific_name())
    .bind(plant.variety())
    .bind(plant.growth_form().name())
    .bind(plant.life_cycle().name())
    .bind(plant.primary_use().name())
    .bind(plant.secondary_use().map(Vocabulary::name))
    .bind(plant.expected_height_inches())
    .bind(plant.expected_spread_inches())
    .bind(plant.spacing_inches())
    .bind(plant.hardiness_zone_min())
    .bind(plant.hardiness_zone_max())
    .bind(plant.preferred_soil_ph_min())
    .bind(plant.preferred_soil_ph_max())
    .bind(plant.planting_depth_inches())
    .bind(plant.description())
    .bind(plant.care_instructions())
    .bind(plant.notes())
    .execute(&mut **tx)
    .await
    .map_err(db_error("updating plant"))?;
    Ok(result.rows_affected() > 0)
}

/// Deletes a plant. Returns false if no such plant exists.
///
/// Fails with [`DataStoreError::InUse`] while observations reference the plant.
pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: i64) -> SqlResult<bool> {
    let result = sqlx::query("DELETE FROM plants WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(delete_error("deleting plant"))?;
    Ok(result.rows_affected() > 0)
}
