//! Irrigation zone operations for PostgreSQL database.
//!
//! The weekday schedule is stored as its canonical ordinal string (`"1,3,5"`).

use chrono::NaiveTime;
use sqlx::{Postgres, Transaction};

use super::{SqlResult, corrupt, db_error, delete_error};
use crate::schedule::Schedule;
use crate::{DataStoreError, IrrigationZone, Record};

#[derive(Debug, sqlx::FromRow)]
struct IrrigationZoneRow {
    id: i64,
    name: String,
    scheduled_days: String,
    start_time: NaiveTime,
    duration_minutes: i32,
    flow_rate_gpm: f64,
}

impl TryFrom<IrrigationZoneRow> for Record<IrrigationZone> {
    type Error = DataStoreError;

    fn try_from(row: IrrigationZoneRow) -> Result<Self, Self::Error> {
        let zone = Schedule::from_canonical(&row.scheduled_days).and_then(|days| {
            IrrigationZone::new(
                &row.name,
                days,
                row.start_time,
                i64::from(row.duration_minutes),
                row.flow_rate_gpm,
            )
        });
        zone.map(|zone| Record::new(row.id, zone))
            .map_err(|e| corrupt("irrigation_zones", row.id, e))
    }
}

/// Creates a new irrigation zone and returns its identifier.
///
/// # Examples
/// ```no_run
/// # use chrono::NaiveTime;
/// # use garden::{IrrigationZone, sql};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let start = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
/// let zone = IrrigationZone::new("Front beds", "M,W,F", start, 30, 2.5)?;
/// let mut tx = pool.begin().await?;
/// let id = sql::irrigation_zone::create(&mut tx, &zone).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```
pub async fn create(tx: &mut Transaction<'_, Postgres>, zone: &IrrigationZone) -> SqlResult<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO irrigation_zones (name, scheduled_days, start_time, duration_minutes, flow_rate_gpm)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(zone.name())
    .bind(zone.scheduled_days().to_canonical_string())
    .bind(zone.start_time())
    .bind(zone.duration_minutes())
    .bind(zone.flow_rate_gpm())
    .fetch_one(&mut **tx)
    .await
    .map_err(db_error("creating irrigation zone"))?;
    Ok(id)
}

/// Retrieves an irrigation zone by identifier.
pub async fn get(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
) -> SqlResult<Option<Record<IrrigationZone>>> {
    let row: Option<IrrigationZoneRow> = sqlx::query_as(
        r#"
        SELECT id, name, scheduled_days, start_time, duration_minutes, flow_rate_gpm
        FROM irrigation_zones
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(db_error("getting irrigation zone"))?;
    row.map(Record::try_from).transpose()
}

/// Lists every irrigation zone in identifier order.
pub async fn list(tx: &mut Transaction<'_, Postgres>) -> SqlResult<Vec<Record<IrrigationZone>>> {
    let rows: Vec<IrrigationZoneRow> = sqlx::query_as(
        r#"
        SELECT id, name, scheduled_days, start_time, duration_minutes, flow_rate_gpm
        FROM irrigation_zones
        ORDER BY id
        "#,
    )
    .fetch_all(&mut **tx)
    .await
    .map_err(db_error("listing irrigation zones"))?;
    rows.into_iter().map(Record::try_from).collect()
}

/// Overwrites every column of an irrigation zone. Returns false if no such zone exists.
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    id: i64,
    zone: &IrrigationZone,
) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE irrigation_zones
        SET name = $2, scheduled_days = $3, start_time = $4, duration_minutes = $5, flow_rate_gpm = $6
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(zone.name())
    .bind(zone.scheduled_days().to_canonical_string())
    .bind(zone.start_time())
    .bind(zone.duration_minutes())
    .bind(zone.flow_rate_gpm())
    .execute(&mut **tx)
    .await
    .map_err(db_error("updating irrigation zone"))?;
    Ok(result.rows_affected() > 0)
}

/// Deletes an irrigation zone. Returns false if no such zone exists.
///
/// Fails with [`DataStoreError::InUse`] while garden locations still reference the zone.
pub async fn delete(tx: &mut Transaction<'_, Postgres>, id: i64) -> SqlResult<bool> {
    let result = sqlx::query("DELETE FROM irrigation_zones WHERE id = $1")
        .bind(id)
        .execute(&mut **tx)
        .await
        .map_err(delete_error("deleting irrigation zone"))?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::tests::setup_test_db;

    fn zone(name: &str) -> IrrigationZone {
        let start = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        IrrigationZone::new(name, ["Mon", "Wed", "Fri"], start, 30, 2.5).unwrap()
    }

    #[tokio::test]
    async fn create_get_update_delete() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();

        let id = create(&mut tx, &zone("Front beds")).await.unwrap();
        let stored = get(&mut tx, id).await.unwrap().unwrap();
        assert_eq!(stored.entity, zone("Front beds"));
        assert_eq!(stored.entity.scheduled_days().to_canonical_string(), "1,3,5");

        let mut changed = stored.entity.clone();
        changed.set_name("Back beds").unwrap();
        changed.add_scheduled_day("SUN").unwrap();
        assert!(update(&mut tx, id, &changed).await.unwrap());
        let stored = get(&mut tx, id).await.unwrap().unwrap();
        assert_eq!(stored.entity.name(), "Back beds");
        assert_eq!(stored.entity.scheduled_days().to_canonical_string(), "0,1,3,5");

        assert!(delete(&mut tx, id).await.unwrap());
        assert!(get(&mut tx, id).await.unwrap().is_none());
        assert!(!delete(&mut tx, id).await.unwrap());
        assert!(!update(&mut tx, id, &changed).await.unwrap());

        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn list_in_id_order() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();
        let first = create(&mut tx, &zone("A")).await.unwrap();
        let second = create(&mut tx, &zone("B")).await.unwrap();
        let zones = list(&mut tx).await.unwrap();
        let ids: Vec<i64> = zones.iter().map(|z| z.id).collect();
        assert_eq!(ids, vec![first, second]);
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_rows_are_reported() {
        let pool = setup_test_db().await;
        let mut tx = pool.begin().await.unwrap();
        let id = create(&mut tx, &zone("Front beds")).await.unwrap();
        sqlx::query("UPDATE irrigation_zones SET scheduled_days = '' WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .unwrap();
        assert!(matches!(
            get(&mut tx, id).await,
            Err(DataStoreError::Corrupt(_))
        ));
        tx.commit().await.unwrap();
    }
}
