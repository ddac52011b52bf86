//! Wire shapes shared by every resource.

use serde::Serialize;

/// A stored entity together with its persistence-assigned identifier.
///
/// Serializes flat: `{"id": 7, "name": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record<T> {
    pub id: i64,
    #[serde(flatten)]
    pub entity: T,
}

impl<T> Record<T> {
    pub fn new(id: i64, entity: T) -> Self {
        Self { id, entity }
    }
}

/// The `{"data": ...}` envelope of every successful response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
