use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use garden::create_router;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A server whose pool never connects. Requests rejected before touching storage still work.
fn offline_server() -> TestServer {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/garden_unused")
        .unwrap();
    TestServer::new(create_router(pool)).unwrap()
}

/// A server backed by a fresh, migrated database reached through `TEST_DATABASE_URL`.
async fn database_server() -> TestServer {
    let base_url = std::env::var("TEST_DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/postgres".to_string());

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let db_name = format!("garden_api_{}_{}_{}", std::process::id(), timestamp, counter);

    let admin_pool = PgPool::connect(&base_url).await.unwrap();
    sqlx::query(&format!("CREATE DATABASE {}", db_name))
        .execute(&admin_pool)
        .await
        .unwrap();
    admin_pool.close().await;

    let mut parsed_url = url::Url::parse(&base_url).unwrap();
    parsed_url.set_path(&format!("/{}", db_name));
    let pool = PgPool::connect(parsed_url.as_str()).await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    TestServer::new(create_router(pool)).unwrap()
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

#[tokio::test]
async fn health_does_not_need_database() {
    let server = offline_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "ok"}));
}

#[tokio::test]
async fn invalid_zone_is_rejected_before_storage() {
    let server = offline_server();

    let response = server
        .post("/api/v1/irrigation_zones")
        .json(&json!({
            "name": "Front beds",
            "scheduled_days": [],
            "start_time": "06:00",
            "duration_minutes": 30,
            "flow_rate_gpm": 2.5,
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "EMPTY_SCHEDULE");

    let response = server
        .post("/api/v1/irrigation_zones")
        .json(&json!({
            "name": "Front beds",
            "scheduled_days": ["Mon", "Funday"],
            "start_time": "06:00",
            "duration_minutes": 30,
            "flow_rate_gpm": 2.5,
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_WEEKDAY_FORMAT");

    let response = server
        .post("/api/v1/irrigation_zones")
        .json(&json!({
            "name": "Front beds",
            "scheduled_days": "1,3,5",
            "start_time": "06:00",
            "duration_minutes": 121,
            "flow_rate_gpm": 2.5,
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "OUT_OF_RANGE");
}

#[tokio::test]
async fn invalid_location_is_rejected_before_storage() {
    let server = offline_server();

    let response = server
        .post("/api/v1/garden_locations")
        .json(&json!({
            "name": "North bed",
            "latitude": 91.0,
            "longitude": 0.0,
            "sun_exposure": "FULL",
            "wind_exposure": "EXPOSED",
            "drainage": "GOOD",
            "irrigation_zone_id": 1,
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(error_code(&body), "OUT_OF_RANGE");
    assert!(body["error"]["message"].as_str().unwrap().contains("latitude"));

    let response = server
        .post("/api/v1/garden_locations")
        .json(&json!({
            "name": "North bed",
            "latitude": 40.0,
            "longitude": -75.0,
            "sun_exposure": "SUNNY",
            "wind_exposure": "EXPOSED",
            "drainage": "GOOD",
            "irrigation_zone_id": 1,
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "UNKNOWN_ENUM_VALUE");
}

#[tokio::test]
async fn non_object_bodies_are_rejected() {
    let server = offline_server();
    let response = server.post("/api/v1/plants").json(&json!([1, 2, 3])).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_TYPE");
}

#[tokio::test]
async fn unparseable_ids_use_the_error_envelope() {
    let server = offline_server();

    let response = server.get("/api/v1/plants/abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_TYPE");

    let response = server
        .post("/api/v1/irrigation_zones/first/scheduled_days/MON")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_TYPE");
}

#[tokio::test]
async fn malformed_bodies_use_the_error_envelope() {
    let server = offline_server();

    let response = server
        .post("/api/v1/measurements")
        .bytes("{\"value\": ".into())
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(error_code(&body), "INVALID_TYPE");
    assert!(body["error"]["message"].as_str().is_some());

    let response = server.put("/api/v1/plants/1").text("{}").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_TYPE");
}

#[tokio::test]
async fn unknown_schedule_day_is_rejected_before_storage() {
    let server = offline_server();
    let response = server
        .post("/api/v1/irrigation_zones/1/scheduled_days/funday")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "INVALID_WEEKDAY_FORMAT");
}

#[tokio::test]
async fn irrigation_zone_lifecycle() {
    let server = database_server().await;

    let response = server
        .post("/api/v1/irrigation_zones")
        .json(&json!({
            "name": "Front beds",
            "scheduled_days": ["Mon", "Wed", "Fri"],
            "start_time": "06:00",
            "duration_minutes": 30,
            "flow_rate_gpm": 2.5,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    let zone_id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["scheduled_days"], json!([1, 3, 5]));
    assert_eq!(created["data"]["start_time"], json!("06:00:00"));

    let response = server
        .get(&format!("/api/v1/irrigation_zones/{}/water_usage", zone_id))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"data": {"gallons": 75.0}}));

    let response = server
        .post(&format!("/api/v1/irrigation_zones/{}/scheduled_days/SAT", zone_id))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["data"]["scheduled_days"],
        json!([1, 3, 5, 6])
    );

    let response = server
        .delete(&format!("/api/v1/irrigation_zones/{}/scheduled_days/2", zone_id))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "NOT_SCHEDULED");

    let response = server
        .put(&format!("/api/v1/irrigation_zones/{}", zone_id))
        .json(&json!({"scheduled_days": "SUNDAY"}))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["scheduled_days"], json!([0]));

    let response = server
        .delete(&format!("/api/v1/irrigation_zones/{}/scheduled_days/0", zone_id))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response.json::<Value>()), "LAST_DAY_REMOVAL");

    let response = server
        .post("/api/v1/garden_locations")
        .json(&json!({
            "name": "North bed",
            "latitude": 40.0,
            "longitude": -75.0,
            "sun_exposure": "partial_sun",
            "wind_exposure": "EXPOSED",
            "drainage": "GOOD",
            "irrigation_zone_id": zone_id,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let location = response.json::<Value>();
    assert_eq!(location["data"]["sun_exposure"], json!("PARTIAL_SUN"));
    assert_eq!(location["data"]["elevation"], Value::Null);

    let response = server
        .get(&format!("/api/v1/irrigation_zones/{}/garden_locations", zone_id))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 1);

    let response = server
        .delete(&format!("/api/v1/irrigation_zones/{}", zone_id))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(error_code(&response.json::<Value>()), "IN_USE");

    let response = server.get("/api/v1/irrigation_zones/999999").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_code(&response.json::<Value>()), "NOT_FOUND");
}

#[tokio::test]
async fn children_require_existing_parents() {
    let server = database_server().await;

    let response = server
        .post("/api/v1/measurements")
        .json(&json!({
            "garden_location_id": 424242,
            "measurement_type": "RAINFALL",
            "value": 12.0,
            "unit": "MILLIMETERS",
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(&response.json::<Value>()), "MISSING_REFERENCE");
}

#[tokio::test]
async fn measurement_timestamps_read_back_as_written() {
    let server = database_server().await;

    let response = server
        .post("/api/v1/irrigation_zones")
        .json(&json!({
            "name": "Back beds",
            "scheduled_days": "2,4",
            "start_time": "05:30",
            "duration_minutes": 20,
            "flow_rate_gpm": 1.5,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let zone_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/garden_locations")
        .json(&json!({
            "name": "Herb spiral",
            "latitude": 40.0,
            "longitude": -75.0,
            "sun_exposure": "FULL",
            "wind_exposure": "PROTECTED",
            "drainage": "GOOD",
            "irrigation_zone_id": zone_id,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let location_id = response.json::<Value>()["data"]["id"].as_i64().unwrap();

    let response = server
        .post("/api/v1/measurements")
        .json(&json!({
            "garden_location_id": location_id,
            "measurement_type": "TEMPERATURE",
            "value": 18.5,
            "unit": "CELSIUS",
            "timestamp": "2024-05-01T06:30:00.1234567Z",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    let measurement_id = created["data"]["id"].as_i64().unwrap();

    let response = server
        .get(&format!("/api/v1/measurements/{}", measurement_id))
        .await;
    response.assert_status_ok();
    let fetched = response.json::<Value>();
    assert_eq!(created["data"], fetched["data"]);

    let response = server
        .put(&format!("/api/v1/measurements/{}", measurement_id))
        .json(&json!({"timestamp": "2024-05-02T07:45:10.9999999Z"}))
        .await;
    response.assert_status_ok();
    let updated = response.json::<Value>();

    let response = server
        .get(&format!("/api/v1/measurements/{}", measurement_id))
        .await;
    response.assert_status_ok();
    assert_eq!(updated["data"], response.json::<Value>()["data"]);

    let response = server
        .post("/api/v1/measurements")
        .json(&json!({
            "garden_location_id": location_id,
            "measurement_type": "HUMIDITY",
            "value": 60.0,
            "unit": "PERCENT",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created = response.json::<Value>();
    let response = server
        .get(&format!(
            "/api/v1/measurements/{}",
            created["data"]["id"].as_i64().unwrap()
        ))
        .await;
    response.assert_status_ok();
    assert_eq!(created["data"], response.json::<Value>()["data"]);
}
