//! # Command Handlers
//!
//! Command handlers for the gardenctl CLI. Every resource shares the CRUD handlers in
//! `resource`; irrigation zones add their schedule and water-usage commands in `zone`.
//!
//! ## Structure
//!
//! - `resource` - list, get, create, update, delete and child listings for every resource
//! - `zone` - irrigation zone commands (water-usage, add-day, remove-day)
//! - `shared` - argument validation and the dispatch macro

pub mod resource;
pub mod shared;
pub mod zone;

pub use resource::{
    handle_location_command, handle_measurement_command, handle_observation_command,
    handle_plant_command,
};
pub use zone::handle_zone_command;

/// A resource collection exposed under `/api/v1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    IrrigationZone,
    GardenLocation,
    Plant,
    Observation,
    Measurement,
}

impl Resource {
    /// The collection path segment.
    pub fn path(self) -> &'static str {
        match self {
            Resource::IrrigationZone => "irrigation_zones",
            Resource::GardenLocation => "garden_locations",
            Resource::Plant => "plants",
            Resource::Observation => "observations",
            Resource::Measurement => "measurements",
        }
    }

    /// Human readable name used in error messages.
    pub fn label(self) -> &'static str {
        match self {
            Resource::IrrigationZone => "irrigation zone",
            Resource::GardenLocation => "garden location",
            Resource::Plant => "plant",
            Resource::Observation => "observation",
            Resource::Measurement => "measurement",
        }
    }

    /// Maps a child-listing subcommand to the nested collection it reads.
    pub fn child_path(self, subcommand: &str) -> Option<&'static str> {
        match (self, subcommand) {
            (Resource::IrrigationZone, "locations") => Some("garden_locations"),
            (Resource::GardenLocation, "plants") => Some("plants"),
            (Resource::GardenLocation, "measurements") => Some("measurements"),
            (Resource::Plant, "observations") => Some("observations"),
            _ => None,
        }
    }

    pub fn collection_url(self) -> String {
        self.path().to_string()
    }

    pub fn item_url(self, id: i64) -> String {
        format!("{}/{}", self.path(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        assert_eq!(Resource::Plant.collection_url(), "plants");
        assert_eq!(Resource::IrrigationZone.item_url(7), "irrigation_zones/7");
    }

    #[test]
    fn child_listings() {
        assert_eq!(
            Resource::IrrigationZone.child_path("locations"),
            Some("garden_locations")
        );
        assert_eq!(
            Resource::GardenLocation.child_path("measurements"),
            Some("measurements")
        );
        assert_eq!(Resource::Plant.child_path("observations"), Some("observations"));
        assert_eq!(Resource::Measurement.child_path("observations"), None);
    }
}
