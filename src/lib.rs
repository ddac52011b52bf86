//! # Garden: Records for Garden Locations, Irrigation, Plants, and Their Measurements
//!
//! This crate keeps the records a gardener needs to run a garden: where the beds are, which
//! irrigation zone waters them and when, what is planted in them, what was observed about each
//! plant, and what was measured at each location.
//!
//! It provides:
//!
//! - **Typed records**: [`IrrigationZone`], [`GardenLocation`], [`Plant`], [`Observation`], and
//!   [`Measurement`] can only be constructed or changed through validating operations
//! - **Closed vocabularies**: every categorical attribute is a [`Vocabulary`] with stable,
//!   upper-case member names and a separate stored value
//! - **Weekday schedules**: irrigation days accept names, aliases, and ordinals and persist as
//!   a canonical ordinal string
//! - **HTTP API**: RESTful endpoints under `/api/v1` backed by PostgreSQL
//!
//! ## Core Concepts
//!
//! ### Validation
//! Field validators live in [`validate`] and report failures as [`ValidationError`]. A record
//! type never holds a value its validators would reject: setters either apply the change or
//! leave the record untouched and return the error.
//!
//! ### Relationships
//! A garden location is watered by one irrigation zone. Plants and measurements belong to a
//! garden location; observations belong to a plant. The database enforces these references, so
//! creating a child of a missing parent, or deleting a parent that still has children, is
//! refused.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HTTP API Layer (Axum routes)            │
//! ├─────────────────────────────────────────┤
//! │ Payload decoding (JSON → typed input)   │
//! ├─────────────────────────────────────────┤
//! │ Records (validated entity types)        │
//! ├─────────────────────────────────────────┤
//! │ Validators, vocabularies, schedules     │
//! ├─────────────────────────────────────────┤
//! │ Persistence (PostgreSQL via sqlx)       │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage Examples
//!
//! ### Irrigation Zones
//!
//! ```rust
//! use chrono::NaiveTime;
//! use garden::{IrrigationZone, Weekday};
//!
//! let start = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
//! let mut zone = IrrigationZone::new("Front beds", ["Mon", "Wed", "Fri"], start, 30, 2.5).unwrap();
//! assert_eq!(zone.water_usage(), 75.0);
//!
//! zone.add_scheduled_day("sat").unwrap();
//! assert!(zone.is_scheduled_for_day(Weekday::Saturday));
//! assert_eq!(zone.scheduled_days().to_canonical_string(), "1,3,5,6");
//! ```
//!
//! ### Vocabularies
//!
//! ```rust
//! use garden::{SunExposure, Vocabulary};
//!
//! let exposure = SunExposure::resolve("partial_sun").unwrap();
//! assert_eq!(exposure, SunExposure::PartialSun);
//! assert_eq!(exposure.name(), "PARTIAL_SUN");
//! assert_eq!(exposure.value(), "partial sun");
//! assert!(SunExposure::resolve("sunny").is_err());
//! ```

mod errors;
mod extract;
mod garden_location;
mod irrigation_zone;
mod measurement;
mod observation;
mod plant;
mod record;
mod router;
mod vocabulary;

/// Field validators shared by every record type.
pub mod validate;

/// Weekday sets and irrigation schedules.
pub mod schedule;

/// Typed access to JSON request bodies.
pub mod payload;

/// Daemon configuration resolved from flags, environment, and defaults.
pub mod config;

/// PostgreSQL persistence for every record type.
pub mod sql;

// CLI utility modules

/// Command-line interface utilities for program termination and output formatting.
pub mod cli_utils;

/// Command-line interface command handlers for gardenctl.
pub mod commands;

/// HTTP client utilities for interacting with the garden API.
pub mod http_utils;

pub use errors::{ApiError, DataStoreError, ErrorBody, ErrorDetail};
pub use garden_location::{GardenLocation, GardenLocationUpdate, create_garden_location_router};
pub use irrigation_zone::{
    IrrigationZone, IrrigationZoneUpdate, WaterUsage, create_irrigation_zone_router,
};
pub use measurement::{Measurement, MeasurementUpdate, create_measurement_router};
pub use observation::{Observation, ObservationUpdate, create_observation_router};
pub use plant::{Plant, PlantUpdate, create_plant_router};
pub use record::{Data, Record};
pub use router::create_router;
pub use schedule::{Schedule, Weekday, WeekdaySet};
pub use validate::{ValidationError, ValidationResult};
pub use vocabulary::{
    Drainage, GrowthForm, GrowthStage, IntoMember, LifeCycle, MeasurementType, MeasurementUnit,
    ObservationType, SunExposure, UseCategory, Vocabulary, WindExposure,
};
