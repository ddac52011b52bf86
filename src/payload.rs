//! Typed access to JSON request bodies.
//!
//! A [`Payload`] wraps the JSON object of a request and hands out validated values. This is
//! the only place raw strings become vocabulary members, schedules or times; entities only
//! ever see typed values.

use chrono::{DateTime, NaiveTime, Utc};
use serde_json::{Map, Value};

use crate::schedule::{Schedule, ScheduleInput};
use crate::validate::{self, ValidationError, ValidationResult};
use crate::Vocabulary;

/// A borrowed JSON object with validating accessors.
#[derive(Debug, Clone, Copy)]
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Payload<'a> {
    /// Wraps a request body, which must be a JSON object.
    pub fn new(body: &'a Value) -> ValidationResult<Self> {
        match body {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ValidationError::InvalidType {
                field: "body",
                expected: "a JSON object",
            }),
        }
    }

    /// True when the field is present, even if it is null.
    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    /// The raw value of a required field. Null counts as missing.
    pub fn required(&self, field: &'static str) -> ValidationResult<&'a Value> {
        self.get(field)
            .ok_or(ValidationError::MissingField { field })
    }

    /// Runs `parse` for a field only when the key is present in the body.
    ///
    /// This is the building block for partial updates: absent keys stay `None`.
    pub fn update<T>(
        &self,
        field: &'static str,
        parse: impl FnOnce(&Self, &'static str) -> ValidationResult<T>,
    ) -> ValidationResult<Option<T>> {
        if self.contains(field) {
            parse(self, field).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn required_text(&self, field: &'static str, max: usize) -> ValidationResult<String> {
        let raw = as_str(field, self.required(field)?)?;
        validate::required_text(field, raw, max)
    }

    pub fn optional_text(
        &self,
        field: &'static str,
        max: Option<usize>,
    ) -> ValidationResult<Option<String>> {
        let raw = self.get(field).map(|v| as_str(field, v)).transpose()?;
        validate::optional_text(field, raw, max)
    }

    /// Like [`Payload::optional_text`] for the measurement source, which is upper-cased.
    pub fn source(&self, field: &'static str) -> ValidationResult<Option<String>> {
        let raw = self.get(field).map(|v| as_str(field, v)).transpose()?;
        validate::source(raw)
    }

    pub fn required_number(&self, field: &'static str) -> ValidationResult<f64> {
        number(field, self.required(field)?)
    }

    pub fn optional_number(&self, field: &'static str) -> ValidationResult<Option<f64>> {
        self.get(field).map(|v| number(field, v)).transpose()
    }

    pub fn required_integer(&self, field: &'static str) -> ValidationResult<i64> {
        integer(field, self.required(field)?)
    }

    pub fn optional_integer(&self, field: &'static str) -> ValidationResult<Option<i64>> {
        self.get(field).map(|v| integer(field, v)).transpose()
    }

    pub fn required_vocabulary<T: Vocabulary>(&self, field: &'static str) -> ValidationResult<T> {
        vocabulary(self.required(field)?)
    }

    pub fn optional_vocabulary<T: Vocabulary>(
        &self,
        field: &'static str,
    ) -> ValidationResult<Option<T>> {
        self.get(field).map(vocabulary::<T>).transpose()
    }

    pub fn schedule(&self, field: &'static str) -> ValidationResult<Schedule> {
        let input = ScheduleInput::from_json(field, self.required(field)?)?;
        Schedule::parse(input)
    }

    pub fn time_of_day(&self, field: &'static str) -> ValidationResult<NaiveTime> {
        validate::time_of_day(as_str(field, self.required(field)?)?)
    }

    pub fn timestamp(&self, field: &'static str) -> ValidationResult<DateTime<Utc>> {
        validate::timestamp(as_str(field, self.required(field)?)?)
    }

    pub fn optional_timestamp(
        &self,
        field: &'static str,
    ) -> ValidationResult<Option<DateTime<Utc>>> {
        self.get(field)
            .map(|v| validate::timestamp(as_str(field, v)?))
            .transpose()
    }

    /// A referenced record identifier: a positive integer.
    pub fn reference(&self, field: &'static str) -> ValidationResult<i64> {
        let id = self.required_integer(field)?;
        if id < 1 {
            return Err(ValidationError::OutOfRange {
                field,
                expected: "a positive identifier",
                value: id.to_string(),
            });
        }
        Ok(id)
    }
}

fn as_str<'v>(field: &'static str, value: &'v Value) -> ValidationResult<&'v str> {
    value.as_str().ok_or(ValidationError::InvalidType {
        field,
        expected: "a string",
    })
}

fn number(field: &'static str, value: &Value) -> ValidationResult<f64> {
    match value.as_f64() {
        Some(n) => validate::finite(field, n),
        None => Err(ValidationError::NotANumber {
            field,
            expected: "a number",
            value: value.to_string(),
        }),
    }
}

fn integer(field: &'static str, value: &Value) -> ValidationResult<i64> {
    if let Some(n) = value.as_i64() {
        return Ok(n);
    }
    match value.as_f64() {
        Some(n) if n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 => {
            Ok(n as i64)
        }
        _ => Err(ValidationError::NotANumber {
            field,
            expected: "a whole number",
            value: value.to_string(),
        }),
    }
}

fn vocabulary<T: Vocabulary>(value: &Value) -> ValidationResult<T> {
    match value {
        Value::String(name) => T::resolve(name),
        other => Err(ValidationError::UnknownEnumValue {
            vocabulary: T::VOCABULARY,
            value: other.to_string(),
        }),
    }
}
