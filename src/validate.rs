//! # Field Validation
//!
//! Pure validator functions for every attribute of the garden records. A validator takes a
//! raw value and returns either the normalized value or a [`ValidationError`]; validators
//! never touch external state.
//!
//! ## Rules
//!
//! - **Text**: blank after trimming is [`ValidationError::EmptyValue`], longer than the
//!   field maximum is [`ValidationError::TooLong`], otherwise the trimmed text.
//! - **Numbers**: non-finite input is [`ValidationError::NotANumber`]; values outside the
//!   closed interval of the field are [`ValidationError::OutOfRange`].
//! - **Times**: `HH:MM` or `HH:MM:SS` for times of day, RFC 3339 or naive ISO-8601 (read as
//!   UTC) for timestamps.
//!
//! ```rust
//! use garden::{ValidationError, validate};
//!
//! assert_eq!(validate::latitude(37.7749).unwrap(), 37.7749);
//! assert!(matches!(
//!     validate::latitude(90.5),
//!     Err(ValidationError::OutOfRange { field: "latitude", .. })
//! ));
//! assert_eq!(validate::required_text("name", "  Back bed ", 100).unwrap(), "Back bed");
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use thiserror::Error;

use crate::Weekday;

/// Maximum length of names, scientific names, varieties and `recorded_by`.
pub const NAME_MAX_LEN: usize = 100;
/// Maximum length of a measurement source identifier.
pub const SOURCE_MAX_LEN: usize = 50;

/// Inclusive bounds of a USDA hardiness zone.
pub const HARDINESS_ZONE_RANGE: (i64, i64) = (1, 13);
/// Inclusive bounds of a soil pH value.
pub const SOIL_PH_RANGE: (f64, f64) = (0.0, 14.0);
/// Inclusive bounds of an irrigation cycle in minutes.
pub const DURATION_MINUTES_RANGE: (i64, i64) = (1, 120);

/// Errors raised when a record attribute fails validation.
///
/// All variants are local, synchronous failures raised at the point of construction or
/// assignment. None are retried; the HTTP layer maps every variant to a client error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required text field is blank after trimming.
    #[error("{field} cannot be empty")]
    EmptyValue {
        /// The offending field.
        field: &'static str,
    },
    /// A text field exceeds its maximum length.
    #[error("{field} cannot exceed {max} characters (got {len})")]
    TooLong {
        /// The offending field.
        field: &'static str,
        /// The maximum number of characters.
        max: usize,
        /// The number of characters supplied.
        len: usize,
    },
    /// A numeric field received something that is not a usable number.
    #[error("{field} must be {expected}, got {value}")]
    NotANumber {
        /// The offending field.
        field: &'static str,
        /// What kind of number the field takes.
        expected: &'static str,
        /// The rejected input, rendered as text.
        value: String,
    },
    /// A numeric field is outside its allowed interval.
    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        /// The offending field.
        field: &'static str,
        /// The allowed interval, rendered as text.
        expected: &'static str,
        /// The rejected value, rendered as text.
        value: String,
    },
    /// A name does not belong to the vocabulary of an enum-typed field.
    #[error("invalid {vocabulary} value: {value:?}")]
    UnknownEnumValue {
        /// The vocabulary that was searched.
        vocabulary: &'static str,
        /// The rejected input.
        value: String,
    },
    /// A token of a weekday schedule is not a recognized weekday.
    #[error(
        "invalid weekday {token:?}: use a weekday name, an abbreviation such as MON or M, or an integer 0-6"
    )]
    InvalidWeekdayFormat {
        /// The rejected token.
        token: String,
    },
    /// A weekday schedule resolved to no days at all.
    #[error("scheduled days cannot be empty")]
    EmptySchedule,
    /// Removing a day would leave the schedule empty.
    #[error("cannot remove the last scheduled day")]
    LastDayRemoval,
    /// The day to remove is not part of the schedule.
    #[error("{day} is not in the schedule")]
    NotScheduled {
        /// The day that was asked for.
        day: Weekday,
    },
    /// A required field is absent or null.
    #[error("missing required field {field}")]
    MissingField {
        /// The absent field.
        field: &'static str,
    },
    /// A field holds a JSON value of the wrong type.
    #[error("{field} must be {expected}")]
    InvalidType {
        /// The offending field.
        field: &'static str,
        /// The expected JSON type.
        expected: &'static str,
    },
    /// A time of day could not be parsed.
    #[error("invalid time {value:?}: use HH:MM or HH:MM:SS")]
    InvalidTime {
        /// The rejected input.
        value: String,
    },
    /// A timestamp could not be parsed.
    #[error("invalid timestamp {value:?}: use ISO-8601, e.g. 2024-05-01T06:30:00Z")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
    },
}

impl ValidationError {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyValue { .. } => "EMPTY_VALUE",
            Self::TooLong { .. } => "TOO_LONG",
            Self::NotANumber { .. } => "NOT_A_NUMBER",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::UnknownEnumValue { .. } => "UNKNOWN_ENUM_VALUE",
            Self::InvalidWeekdayFormat { .. } => "INVALID_WEEKDAY_FORMAT",
            Self::EmptySchedule => "EMPTY_SCHEDULE",
            Self::LastDayRemoval => "LAST_DAY_REMOVAL",
            Self::NotScheduled { .. } => "NOT_SCHEDULED",
            Self::MissingField { .. } => "MISSING_FIELD",
            Self::InvalidType { .. } => "INVALID_TYPE",
            Self::InvalidTime { .. } => "INVALID_TIME",
            Self::InvalidTimestamp { .. } => "INVALID_TIMESTAMP",
        }
    }
}

/// Result type for validators.
pub type ValidationResult<T> = Result<T, ValidationError>;

////////////////////////////////////////////////// Text //////////////////////////////////////////////////

/// Validates a required text field: trimmed, non-empty, at most `max` characters.
pub fn required_text(field: &'static str, raw: &str, max: usize) -> ValidationResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyValue { field });
    }
    check_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Validates an optional text field. Blank input normalizes to `None`.
///
/// `max` of `None` leaves the length unbounded (free-form notes and descriptions).
pub fn optional_text(
    field: &'static str,
    raw: Option<&str>,
    max: Option<usize>,
) -> ValidationResult<Option<String>> {
    let Some(trimmed) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    if let Some(max) = max {
        check_length(field, trimmed, max)?;
    }
    Ok(Some(trimmed.to_string()))
}

/// Validates a measurement source: trimmed, upper-cased, at most 50 characters.
pub fn source(raw: Option<&str>) -> ValidationResult<Option<String>> {
    Ok(optional_text("source", raw, Some(SOURCE_MAX_LEN))?.map(|s| s.to_uppercase()))
}

fn check_length(field: &'static str, value: &str, max: usize) -> ValidationResult<()> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, max, len });
    }
    Ok(())
}

///////////////////////////////////////////////// Numbers ////////////////////////////////////////////////

/// Rejects NaN and infinities.
pub fn finite(field: &'static str, value: f64) -> ValidationResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotANumber {
            field,
            expected: "a number",
            value: value.to_string(),
        })
    }
}

fn within(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
    expected: &'static str,
) -> ValidationResult<f64> {
    let value = finite(field, value)?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            expected,
            value: value.to_string(),
        })
    }
}

fn integer_within(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
    expected: &'static str,
) -> ValidationResult<i32> {
    if (min..=max).contains(&value) {
        // Both bounds fit in an i32 at every call site.
        Ok(value as i32)
    } else {
        Err(ValidationError::OutOfRange {
            field,
            expected,
            value: value.to_string(),
        })
    }
}

/// Latitude in degrees, `[-90, 90]`.
pub fn latitude(value: f64) -> ValidationResult<f64> {
    within("latitude", value, -90.0, 90.0, "between -90 and 90 degrees")
}

/// Longitude in degrees, `[-180, 180]`.
pub fn longitude(value: f64) -> ValidationResult<f64> {
    within("longitude", value, -180.0, 180.0, "between -180 and 180 degrees")
}

/// Elevation above sea level, `>= 0` when present.
pub fn elevation(value: Option<f64>) -> ValidationResult<Option<f64>> {
    value
        .map(|v| within("elevation", v, 0.0, f64::MAX, "at or above sea level (>= 0)"))
        .transpose()
}

/// USDA hardiness zone, `[1, 13]`.
pub fn hardiness_zone(field: &'static str, value: i64) -> ValidationResult<i32> {
    let (min, max) = HARDINESS_ZONE_RANGE;
    integer_within(field, value, min, max, "between 1 and 13")
}

/// Soil pH, `[0, 14]`.
pub fn soil_ph(field: &'static str, value: f64) -> ValidationResult<f64> {
    let (min, max) = SOIL_PH_RANGE;
    within(field, value, min, max, "between 0 and 14")
}

/// Irrigation cycle length in minutes, `[1, 120]`.
pub fn duration_minutes(value: i64) -> ValidationResult<i32> {
    let (min, max) = DURATION_MINUTES_RANGE;
    integer_within("duration_minutes", value, min, max, "between 1 and 120 minutes")
}

/// Irrigation flow rate in gallons per minute, `> 0`.
pub fn flow_rate_gpm(value: f64) -> ValidationResult<f64> {
    let value = finite("flow_rate_gpm", value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange {
            field: "flow_rate_gpm",
            expected: "greater than 0 gallons per minute",
            value: value.to_string(),
        })
    }
}

/// Period a measurement covers in minutes, `> 0`.
pub fn period_minutes(value: i64) -> ValidationResult<i32> {
    integer_within(
        "period_minutes",
        value,
        1,
        i64::from(i32::MAX),
        "greater than 0 minutes",
    )
}

/// A measurement value: any finite number.
pub fn measurement_value(value: f64) -> ValidationResult<f64> {
    finite("value", value)
}

/// An integer with no domain bound other than fitting the storage column.
pub fn storable_integer(field: &'static str, value: i64) -> ValidationResult<i32> {
    i32::try_from(value).map_err(|_| ValidationError::OutOfRange {
        field,
        expected: "a 32-bit integer",
        value: value.to_string(),
    })
}

////////////////////////////////////////////////// Times /////////////////////////////////////////////////

/// Parses a time of day in `HH:MM` or `HH:MM:SS` form. Sub-second precision is dropped.
pub fn time_of_day(raw: &str) -> ValidationResult<NaiveTime> {
    let trimmed = raw.trim();
    let parsed = match trimmed.matches(':').count() {
        1 => NaiveTime::parse_from_str(trimmed, "%H:%M"),
        2 => NaiveTime::parse_from_str(trimmed, "%H:%M:%S%.f"),
        _ => {
            return Err(ValidationError::InvalidTime {
                value: raw.to_string(),
            });
        }
    };
    parsed
        .map(truncate_to_seconds)
        .map_err(|_| ValidationError::InvalidTime {
            value: raw.to_string(),
        })
}

/// Drops sub-second precision so times always render as `HH:MM:SS`.
pub fn truncate_to_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

/// Drops digits below the microsecond, the finest precision PostgreSQL stores.
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(ts.nanosecond() / 1_000 * 1_000).unwrap_or(ts)
}

/// Parses a timestamp. Accepts RFC 3339 (any offset, normalized to UTC), naive
/// `YYYY-MM-DDTHH:MM:SS[.f]` or `YYYY-MM-DD HH:MM:SS[.f]` read as UTC, and bare dates
/// read as UTC midnight. Sub-microsecond digits are dropped.
pub fn timestamp(raw: &str) -> ValidationResult<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(truncate_to_micros(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(truncate_to_micros(naive.and_utc()));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }
    Err(ValidationError::InvalidTimestamp {
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone};

    use super::*;

    #[test]
    fn required_text_trims() {
        assert_eq!(required_text("name", "  Herb Spiral  ", 100).unwrap(), "Herb Spiral");
    }

    #[test]
    fn required_text_rejects_blank() {
        assert_eq!(
            required_text("name", "   ", 100),
            Err(ValidationError::EmptyValue { field: "name" })
        );
        assert_eq!(
            required_text("name", "", 100),
            Err(ValidationError::EmptyValue { field: "name" })
        );
    }

    #[test]
    fn required_text_rejects_long_values() {
        let long = "x".repeat(101);
        assert_eq!(
            required_text("name", &long, 100),
            Err(ValidationError::TooLong {
                field: "name",
                max: 100,
                len: 101
            })
        );
        assert!(required_text("name", &"x".repeat(100), 100).is_ok());
    }

    #[test]
    fn length_counts_characters_after_trimming() {
        let padded = format!("  {}  ", "é".repeat(100));
        assert_eq!(required_text("name", &padded, 100).unwrap().chars().count(), 100);
    }

    #[test]
    fn optional_text_blank_is_none() {
        assert_eq!(optional_text("variety", Some("  "), Some(100)).unwrap(), None);
        assert_eq!(optional_text("variety", None, Some(100)).unwrap(), None);
        assert_eq!(
            optional_text("variety", Some(" Brandywine "), Some(100)).unwrap(),
            Some("Brandywine".to_string())
        );
        assert!(optional_text("notes", Some(&"n".repeat(10_000)), None).is_ok());
    }

    #[test]
    fn source_is_upper_cased() {
        assert_eq!(source(Some(" weather_api ")).unwrap(), Some("WEATHER_API".to_string()));
        assert!(matches!(
            source(Some(&"s".repeat(51))),
            Err(ValidationError::TooLong { field: "source", max: 50, .. })
        ));
        assert_eq!(source(None).unwrap(), None);
    }

    #[test]
    fn coordinates_bounds_are_inclusive() {
        assert_eq!(latitude(-90.0).unwrap(), -90.0);
        assert_eq!(latitude(90.0).unwrap(), 90.0);
        assert_eq!(longitude(-180.0).unwrap(), -180.0);
        assert_eq!(longitude(180.0).unwrap(), 180.0);
        assert!(matches!(latitude(-90.0001), Err(ValidationError::OutOfRange { .. })));
        assert!(matches!(longitude(180.5), Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn non_finite_is_not_a_number() {
        assert!(matches!(latitude(f64::NAN), Err(ValidationError::NotANumber { .. })));
        assert!(matches!(
            flow_rate_gpm(f64::INFINITY),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(matches!(
            measurement_value(f64::NEG_INFINITY),
            Err(ValidationError::NotANumber { field: "value", .. })
        ));
    }

    #[test]
    fn elevation_must_not_be_negative() {
        assert_eq!(elevation(None).unwrap(), None);
        assert_eq!(elevation(Some(0.0)).unwrap(), Some(0.0));
        assert!(matches!(
            elevation(Some(-0.5)),
            Err(ValidationError::OutOfRange { field: "elevation", .. })
        ));
    }

    #[test]
    fn hardiness_zone_bounds() {
        assert!(matches!(
            hardiness_zone("hardiness_zone_min", 0),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            hardiness_zone("hardiness_zone_max", 14),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert_eq!(hardiness_zone("hardiness_zone_min", 1).unwrap(), 1);
        assert_eq!(hardiness_zone("hardiness_zone_max", 13).unwrap(), 13);
    }

    #[test]
    fn soil_ph_bounds() {
        assert_eq!(soil_ph("preferred_soil_ph_min", 0.0).unwrap(), 0.0);
        assert_eq!(soil_ph("preferred_soil_ph_max", 14.0).unwrap(), 14.0);
        assert!(soil_ph("preferred_soil_ph_max", 14.01).is_err());
        assert!(soil_ph("preferred_soil_ph_min", -0.1).is_err());
    }

    #[test]
    fn duration_and_flow_rate() {
        assert!(duration_minutes(0).is_err());
        assert_eq!(duration_minutes(1).unwrap(), 1);
        assert_eq!(duration_minutes(120).unwrap(), 120);
        assert!(duration_minutes(121).is_err());
        assert!(flow_rate_gpm(0.0).is_err());
        assert!(flow_rate_gpm(-1.0).is_err());
        assert_eq!(flow_rate_gpm(0.1).unwrap(), 0.1);
    }

    #[test]
    fn period_must_be_positive() {
        assert!(period_minutes(0).is_err());
        assert!(period_minutes(-5).is_err());
        assert_eq!(period_minutes(1440).unwrap(), 1440);
        assert!(period_minutes(i64::from(i32::MAX) + 1).is_err());
    }

    #[test]
    fn storable_integer_fits_i32() {
        assert_eq!(storable_integer("spacing_inches", 18).unwrap(), 18);
        assert!(storable_integer("spacing_inches", i64::MAX).is_err());
    }

    #[test]
    fn time_of_day_formats() {
        assert_eq!(
            time_of_day("06:00").unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap()
        );
        assert_eq!(
            time_of_day("18:45:30").unwrap(),
            NaiveTime::from_hms_opt(18, 45, 30).unwrap()
        );
        assert_eq!(
            time_of_day("05:04:03.250").unwrap(),
            NaiveTime::from_hms_opt(5, 4, 3).unwrap()
        );
        assert!(matches!(time_of_day("6am"), Err(ValidationError::InvalidTime { .. })));
        assert!(matches!(time_of_day("25:00"), Err(ValidationError::InvalidTime { .. })));
        assert!(matches!(time_of_day("1:2:3:4"), Err(ValidationError::InvalidTime { .. })));
    }

    #[test]
    fn timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 6, 30, 0).unwrap();
        assert_eq!(timestamp("2024-05-01T06:30:00Z").unwrap(), expected);
        assert_eq!(timestamp("2024-05-01T08:30:00+02:00").unwrap(), expected);
        assert_eq!(timestamp("2024-05-01T06:30:00").unwrap(), expected);
        assert_eq!(timestamp("2024-05-01 06:30:00").unwrap(), expected);
        assert_eq!(timestamp("2024-05-01T06:30").unwrap(), expected);
        let midnight = timestamp("2024-05-01").unwrap();
        assert_eq!(midnight.day(), 1);
        assert!(matches!(
            timestamp("yesterday"),
            Err(ValidationError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn timestamps_are_truncated_to_microseconds() {
        let parsed = timestamp("2024-05-01T06:30:00.1234567Z").unwrap();
        assert_eq!(parsed.nanosecond(), 123_456_000);
        let naive = timestamp("2024-05-01 06:30:00.000000999").unwrap();
        assert_eq!(naive.nanosecond(), 0);
        let exact = timestamp("2024-05-01T06:30:00.654321Z").unwrap();
        assert_eq!(exact.nanosecond(), 654_321_000);
    }

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ValidationError::EmptySchedule.code(), "EMPTY_SCHEDULE");
        assert_eq!(
            ValidationError::NotScheduled {
                day: Weekday::Monday
            }
            .to_string(),
            "MONDAY is not in the schedule"
        );
    }
}
