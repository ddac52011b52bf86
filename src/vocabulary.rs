//! # Domain Vocabularies
//!
//! Closed, ordered sets of named values used by every classificatory field of the garden
//! records. Each vocabulary is a plain Rust enum whose members carry an upper-case name
//! (the form that crosses the HTTP boundary and is stored in the database) and a stable
//! human-readable value.
//!
//! Names resolve case-insensitively:
//!
//! ```rust
//! use garden::{SunExposure, Vocabulary};
//!
//! assert_eq!(SunExposure::resolve("full").unwrap(), SunExposure::Full);
//! assert_eq!(SunExposure::resolve("Partial_Shade").unwrap(), SunExposure::PartialShade);
//! assert!(SunExposure::resolve("bright").is_err());
//! ```

use crate::ValidationError;

/// A closed set of named domain values.
///
/// The member table is a `'static` slice; nothing ever mutates it.
pub trait Vocabulary: Sized + Copy + PartialEq + 'static {
    /// Human-readable name of the vocabulary, used in error messages.
    const VOCABULARY: &'static str;
    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// The upper-case member name.
    fn name(self) -> &'static str;

    /// The stable underlying value of the member.
    fn value(self) -> &'static str;

    /// Position of the member within [`Vocabulary::ALL`].
    fn ordinal(self) -> usize {
        Self::ALL
            .iter()
            .position(|member| *member == self)
            .unwrap_or_default()
    }

    /// Resolves a member by name, ignoring case and surrounding whitespace.
    fn resolve(raw: &str) -> Result<Self, ValidationError> {
        let wanted = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|member| member.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ValidationError::UnknownEnumValue {
                vocabulary: Self::VOCABULARY,
                value: raw.to_string(),
            })
    }
}

/// Anything an enum-typed field accepts: a member, or a member name.
pub trait IntoMember<V: Vocabulary> {
    fn into_member(self) -> Result<V, ValidationError>;
}

impl<V: Vocabulary> IntoMember<V> for V {
    fn into_member(self) -> Result<V, ValidationError> {
        Ok(self)
    }
}

impl<V: Vocabulary> IntoMember<V> for &str {
    fn into_member(self) -> Result<V, ValidationError> {
        V::resolve(self)
    }
}

/// Declares a vocabulary enum together with its [`Vocabulary`] impl, `Display`, `FromStr`
/// and name-based serde impls.
macro_rules! define_vocabulary {
    (
        $(#[$meta:meta])*
        $vis:vis enum $ty:ident : $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $name:literal => $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $ty {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::Vocabulary for $ty {
            const VOCABULARY: &'static str = $label;
            const ALL: &'static [Self] = &[ $( $ty::$variant ),+ ];

            fn name(self) -> &'static str {
                match self {
                    $( $ty::$variant => $name ),+
                }
            }

            fn value(self) -> &'static str {
                match self {
                    $( $ty::$variant => $value ),+
                }
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::Vocabulary::name(*self))
            }
        }

        impl std::str::FromStr for $ty {
            type Err = $crate::ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as $crate::Vocabulary>::resolve(s)
            }
        }

        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::Vocabulary::name(*self))
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
                <$ty as $crate::Vocabulary>::resolve(&raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use define_vocabulary;

define_vocabulary! {
    /// How much direct sun a garden location receives.
    pub enum SunExposure: "sun exposure" {
        Full = "FULL" => "full",
        PartialSun = "PARTIAL_SUN" => "partial sun",
        PartialShade = "PARTIAL_SHADE" => "partial shade",
        Dappled = "DAPPLED" => "dappled",
        FullShade = "FULL_SHADE" => "full shade",
    }
}

define_vocabulary! {
    /// How exposed a garden location is to wind.
    pub enum WindExposure: "wind exposure" {
        Exposed = "EXPOSED" => "exposed",
        PartiallyExposed = "PARTIALLY_EXPOSED" => "partially exposed",
        Protected = "PROTECTED" => "protected",
        Indoor = "INDOOR" => "indoor",
    }
}

define_vocabulary! {
    /// Soil drainage quality of a garden location.
    pub enum Drainage: "drainage" {
        Excellent = "EXCELLENT" => "excellent",
        Good = "GOOD" => "good",
        Poor = "POOR" => "poor",
    }
}

define_vocabulary! {
    /// Physical growth form and structure of a plant.
    pub enum GrowthForm: "growth form" {
        Tree = "TREE" => "TREE",
        Shrub = "SHRUB" => "SHRUB",
        Vine = "VINE" => "VINE",
        /// Non-woody plants.
        Herb = "HERB" => "HERB",
        Grass = "GRASS" => "GRASS",
        Fern = "FERN" => "FERN",
        Groundcover = "GROUNDCOVER" => "GROUNDCOVER",
    }
}

define_vocabulary! {
    /// Life cycle classification of a plant.
    pub enum LifeCycle: "life cycle" {
        /// Completes its life cycle in one growing season.
        Annual = "ANNUAL" => "ANNUAL",
        /// Completes its life cycle in two growing seasons.
        Biennial = "BIENNIAL" => "BIENNIAL",
        /// Lives for multiple years.
        Perennial = "PERENNIAL" => "PERENNIAL",
        /// Short-lived perennial.
        Ephemeral = "EPHEMERAL" => "EPHEMERAL",
    }
}

define_vocabulary! {
    /// Primary or secondary purpose of a plant.
    pub enum UseCategory: "use category" {
        Ornamental = "ORNAMENTAL" => "ORNAMENTAL",
        Vegetable = "VEGETABLE" => "VEGETABLE",
        Fruit = "FRUIT" => "FRUIT",
        HerbCulinary = "HERB_CULINARY" => "HERB_CULINARY",
        HerbMedicinal = "HERB_MEDICINAL" => "HERB_MEDICINAL",
        GroundCover = "GROUND_COVER" => "GROUND_COVER",
        Shade = "SHADE" => "SHADE",
        Privacy = "PRIVACY" => "PRIVACY",
        NativeHabitat = "NATIVE_HABITAT" => "NATIVE_HABITAT",
        Pollinator = "POLLINATOR" => "POLLINATOR",
    }
}

define_vocabulary! {
    /// Category of a plant observation.
    pub enum ObservationType: "observation type" {
        /// Height in inches.
        Height = "HEIGHT" => "HEIGHT",
        /// Spread in inches.
        Spread = "SPREAD" => "SPREAD",
        /// Health rating from 1 to 5.
        Health = "HEALTH" => "HEALTH",
        LeafCount = "LEAF_COUNT" => "LEAF_COUNT",
        FlowerCount = "FLOWER_COUNT" => "FLOWER_COUNT",
        FruitCount = "FRUIT_COUNT" => "FRUIT_COUNT",
        /// Current growth stage; see `stage_value`.
        GrowthStage = "GROWTH_STAGE" => "GROWTH_STAGE",
        /// Pest damage rating from 1 to 5.
        PestDamage = "PEST_DAMAGE" => "PEST_DAMAGE",
        /// Disease severity rating from 1 to 5.
        DiseaseSeverity = "DISEASE_SEVERITY" => "DISEASE_SEVERITY",
    }
}

define_vocabulary! {
    /// Growth stage of a plant.
    pub enum GrowthStage: "growth stage" {
        Seed = "SEED" => "SEED",
        Germination = "GERMINATION" => "GERMINATION",
        Seedling = "SEEDLING" => "SEEDLING",
        Vegetative = "VEGETATIVE" => "VEGETATIVE",
        Flowering = "FLOWERING" => "FLOWERING",
        Fruiting = "FRUITING" => "FRUITING",
        Dormant = "DORMANT" => "DORMANT",
        Dead = "DEAD" => "DEAD",
    }
}

define_vocabulary! {
    /// Kind of environmental measurement recorded at a garden location.
    pub enum MeasurementType: "measurement type" {
        Temperature = "TEMPERATURE" => "temperature",
        Humidity = "HUMIDITY" => "humidity",
        SoilMoisture = "SOIL_MOISTURE" => "soil moisture",
        SoilPh = "SOIL_PH" => "soil pH",
        Rainfall = "RAINFALL" => "rainfall",
        SolarRadiation = "SOLAR_RADIATION" => "solar radiation",
        WindSpeed = "WIND_SPEED" => "wind speed",
        SoilTemperature = "SOIL_TEMPERATURE" => "soil temperature",
        SoilConductivity = "SOIL_CONDUCTIVITY" => "soil conductivity",
        SoilSalinity = "SOIL_SALINITY" => "soil salinity",
    }
}

define_vocabulary! {
    /// Unit a measurement value is expressed in.
    pub enum MeasurementUnit: "measurement unit" {
        Celsius = "CELSIUS" => "°C",
        Fahrenheit = "FAHRENHEIT" => "°F",
        Percent = "PERCENT" => "%",
        Millimeters = "MILLIMETERS" => "mm",
        Inches = "INCHES" => "in",
        WattsPerSqm = "WATTS_PER_SQM" => "W/m²",
        MetersPerSec = "METERS_PER_SEC" => "m/s",
        KilometersPerHour = "KILOMETERS_PER_HOUR" => "km/h",
        MilesPerHour = "MILES_PER_HOUR" => "mph",
        Ph = "PH" => "pH",
        /// Conductivity.
        Microsiemens = "MICROSIEMENS" => "µS/cm",
        /// Salinity.
        Ppm = "PPM" => "ppm",
    }
}
