//! # Weekday Schedules
//!
//! Irrigation zones run on a set of weekdays. The set is persisted as a canonical string of
//! ordinals (`SUNDAY` = 0 through `SATURDAY` = 6), sorted ascending and joined by commas:
//!
//! ```rust
//! use garden::Schedule;
//!
//! let schedule = Schedule::parse(["Mon", "wed", "F"]).unwrap();
//! assert_eq!(schedule.to_canonical_string(), "1,3,5");
//! assert_eq!(Schedule::parse("3, 1,5").unwrap(), schedule);
//! ```
//!
//! Input tokens may be native [`Weekday`] values, integers 0-6, full names in any case, or
//! one of the fixed short aliases:
//!
//! | Day | Aliases |
//! |-----|---------|
//! | Sunday | `SUN`, `S`, `0` |
//! | Monday | `MON`, `M`, `1` |
//! | Tuesday | `TUE`, `T`, `2` |
//! | Wednesday | `WED`, `W`, `3` |
//! | Thursday | `THU`, `TH`, `4` |
//! | Friday | `FRI`, `F`, `5` |
//! | Saturday | `SAT`, `SA`, `6` |
//!
//! Aliases come from this table only; there is no prefix matching.

use std::fmt;

use serde::ser::SerializeSeq;
use serde_json::Value;

use crate::validate::{ValidationError, ValidationResult};
use crate::vocabulary::define_vocabulary;
use crate::Vocabulary;

define_vocabulary! {
    /// A day of the week. Declaration order gives the persisted ordinal.
    pub enum Weekday: "weekday" {
        Sunday = "SUNDAY" => "sunday",
        Monday = "MONDAY" => "monday",
        Tuesday = "TUESDAY" => "tuesday",
        Wednesday = "WEDNESDAY" => "wednesday",
        Thursday = "THURSDAY" => "thursday",
        Friday = "FRIDAY" => "friday",
        Saturday = "SATURDAY" => "saturday",
    }
}

const ALIASES: &[(&str, Weekday)] = &[
    ("SUN", Weekday::Sunday),
    ("S", Weekday::Sunday),
    ("0", Weekday::Sunday),
    ("MON", Weekday::Monday),
    ("M", Weekday::Monday),
    ("1", Weekday::Monday),
    ("TUE", Weekday::Tuesday),
    ("T", Weekday::Tuesday),
    ("2", Weekday::Tuesday),
    ("WED", Weekday::Wednesday),
    ("W", Weekday::Wednesday),
    ("3", Weekday::Wednesday),
    ("THU", Weekday::Thursday),
    ("TH", Weekday::Thursday),
    ("4", Weekday::Thursday),
    ("FRI", Weekday::Friday),
    ("F", Weekday::Friday),
    ("5", Weekday::Friday),
    ("SAT", Weekday::Saturday),
    ("SA", Weekday::Saturday),
    ("6", Weekday::Saturday),
];

impl Weekday {
    /// Looks up a weekday by its ordinal, `0` (Sunday) through `6` (Saturday).
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        usize::try_from(ordinal)
            .ok()
            .and_then(|idx| Self::ALL.get(idx))
            .copied()
    }

    /// Parses a single textual token: a full name or an alias.
    pub fn parse_token(token: &str) -> ValidationResult<Self> {
        let trimmed = token.trim();
        if let Ok(day) = Self::resolve(trimmed) {
            return Ok(day);
        }
        let upper = trimmed.to_ascii_uppercase();
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == upper)
            .map(|(_, day)| *day)
            .ok_or_else(|| ValidationError::InvalidWeekdayFormat {
                token: trimmed.to_string(),
            })
    }

    fn bit(self) -> u8 {
        1 << self.ordinal()
    }
}

////////////////////////////////////////////// WeekdaySet //////////////////////////////////////////////

/// A possibly-empty set of weekdays.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// The empty set.
    pub fn new() -> Self {
        Self(0)
    }

    /// Adds a day. Returns false if it was already present.
    pub fn insert(&mut self, day: Weekday) -> bool {
        let present = self.contains(day);
        self.0 |= day.bit();
        !present
    }

    /// Removes a day. Returns false if it was not present.
    pub fn remove(&mut self, day: Weekday) -> bool {
        let present = self.contains(day);
        self.0 &= !day.bit();
        present
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & day.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Iterates the days in ascending ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        Weekday::ALL.iter().copied().filter(|day| self.contains(*day))
    }

    /// Encodes the set in canonical form. The empty set encodes to `""`.
    pub fn encode(&self) -> String {
        self.iter()
            .map(|day| day.ordinal().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Decodes a persisted string. Each token must be an ordinal 0-6; `""` is the empty set.
    pub fn decode(persisted: &str) -> ValidationResult<Self> {
        let mut set = Self::new();
        if persisted.trim().is_empty() {
            return Ok(set);
        }
        for token in persisted.split(',') {
            let token = token.trim();
            let day = token
                .parse::<i64>()
                .ok()
                .and_then(Weekday::from_ordinal)
                .ok_or_else(|| ValidationError::InvalidWeekdayFormat {
                    token: token.to_string(),
                })?;
            set.insert(day);
        }
        Ok(set)
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = Self::new();
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/////////////////////////////////////////////// Inputs ///////////////////////////////////////////////

/// One element of a schedule input.
#[derive(Debug, Clone, PartialEq)]
pub enum DayInput {
    Day(Weekday),
    Ordinal(i64),
    Text(String),
}

impl DayInput {
    /// Resolves the element to a weekday.
    pub fn resolve(&self) -> ValidationResult<Weekday> {
        match self {
            Self::Day(day) => Ok(*day),
            Self::Ordinal(ordinal) => {
                Weekday::from_ordinal(*ordinal).ok_or_else(|| {
                    ValidationError::InvalidWeekdayFormat {
                        token: ordinal.to_string(),
                    }
                })
            }
            Self::Text(text) => Weekday::parse_token(text),
        }
    }

    /// Reads an element from JSON: a string or an integer.
    pub fn from_json(value: &Value) -> ValidationResult<Self> {
        match value {
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Number(number) => number.as_i64().map(Self::Ordinal).ok_or_else(|| {
                ValidationError::InvalidWeekdayFormat {
                    token: number.to_string(),
                }
            }),
            other => Err(ValidationError::InvalidWeekdayFormat {
                token: other.to_string(),
            }),
        }
    }
}

impl From<Weekday> for DayInput {
    fn from(day: Weekday) -> Self {
        Self::Day(day)
    }
}

impl From<i64> for DayInput {
    fn from(ordinal: i64) -> Self {
        Self::Ordinal(ordinal)
    }
}

impl From<i32> for DayInput {
    fn from(ordinal: i32) -> Self {
        Self::Ordinal(i64::from(ordinal))
    }
}

impl From<&str> for DayInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DayInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Everything a schedule can be built from.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleInput {
    /// A single string of comma-separated tokens.
    Delimited(String),
    /// A list of individual elements.
    Days(Vec<DayInput>),
}

impl ScheduleInput {
    /// Reads a schedule from JSON: either a comma-separated string or an array of elements.
    pub fn from_json(field: &'static str, value: &Value) -> ValidationResult<Self> {
        match value {
            Value::String(text) => Ok(Self::Delimited(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(DayInput::from_json)
                .collect::<ValidationResult<Vec<_>>>()
                .map(Self::Days),
            _ => Err(ValidationError::InvalidType {
                field,
                expected: "a list of weekdays or a comma-separated string",
            }),
        }
    }

    /// Resolves every element, yielding the (possibly empty) set.
    pub fn resolve(&self) -> ValidationResult<WeekdaySet> {
        let mut set = WeekdaySet::new();
        match self {
            Self::Delimited(text) => {
                for token in text.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                    set.insert(Weekday::parse_token(token)?);
                }
            }
            Self::Days(days) => {
                for day in days {
                    set.insert(day.resolve()?);
                }
            }
        }
        Ok(set)
    }
}

impl From<&str> for ScheduleInput {
    fn from(text: &str) -> Self {
        Self::Delimited(text.to_string())
    }
}

impl From<String> for ScheduleInput {
    fn from(text: String) -> Self {
        Self::Delimited(text)
    }
}

impl<T: Into<DayInput>> From<Vec<T>> for ScheduleInput {
    fn from(days: Vec<T>) -> Self {
        Self::Days(days.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DayInput>, const N: usize> From<[T; N]> for ScheduleInput {
    fn from(days: [T; N]) -> Self {
        Self::Days(days.into_iter().map(Into::into).collect())
    }
}

impl From<WeekdaySet> for ScheduleInput {
    fn from(set: WeekdaySet) -> Self {
        Self::Days(set.iter().map(DayInput::Day).collect())
    }
}

impl From<Schedule> for ScheduleInput {
    fn from(schedule: Schedule) -> Self {
        schedule.0.into()
    }
}

/// Encodes any accepted input to its canonical string.
///
/// Fails with [`ValidationError::EmptySchedule`] when nothing resolves to a day.
pub fn encode(input: impl Into<ScheduleInput>) -> ValidationResult<String> {
    Schedule::parse(input).map(|schedule| schedule.to_canonical_string())
}

////////////////////////////////////////////// Schedule //////////////////////////////////////////////

/// A non-empty set of weekdays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Schedule(WeekdaySet);

impl Schedule {
    /// Builds a schedule from any accepted input.
    pub fn parse(input: impl Into<ScheduleInput>) -> ValidationResult<Self> {
        let set = input.into().resolve()?;
        if set.is_empty() {
            return Err(ValidationError::EmptySchedule);
        }
        Ok(Self(set))
    }

    /// Builds a schedule from its persisted canonical string.
    pub fn from_canonical(persisted: &str) -> ValidationResult<Self> {
        let set = WeekdaySet::decode(persisted)?;
        Self::parse(set)
    }

    pub fn days(&self) -> WeekdaySet {
        self.0
    }

    pub fn is_scheduled_for_day(&self, day: Weekday) -> bool {
        self.0.contains(day)
    }

    /// Adds a day given in any accepted token format. Adding a present day is a no-op.
    pub fn add_day(&mut self, day: impl Into<DayInput>) -> ValidationResult<()> {
        let day = day.into().resolve()?;
        let mut set = self.0;
        set.insert(day);
        *self = Self::parse(set)?;
        Ok(())
    }

    /// Removes a day given in any accepted token format.
    ///
    /// A single-day schedule refuses every removal with [`ValidationError::LastDayRemoval`];
    /// otherwise an absent day is [`ValidationError::NotScheduled`].
    pub fn remove_day(&mut self, day: impl Into<DayInput>) -> ValidationResult<()> {
        let day = day.into().resolve()?;
        if self.0.len() <= 1 {
            return Err(ValidationError::LastDayRemoval);
        }
        let mut set = self.0;
        if !set.remove(day) {
            return Err(ValidationError::NotScheduled { day });
        }
        *self = Self::parse(set)?;
        Ok(())
    }

    pub fn to_canonical_string(&self) -> String {
        self.0.encode()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl serde::Serialize for Schedule {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for day in self.0.iter() {
            seq.serialize_element(&day.ordinal())?;
        }
        seq.end()
    }
}
