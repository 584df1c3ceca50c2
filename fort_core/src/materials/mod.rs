//! # Catalogs
//!
//! Static cost tables used by the cost pipeline. Every table is a closed
//! enum with an exhaustive `match`, so an unknown key can only appear at
//! the parsing boundary (`from_str_flexible`), never inside a calculation.
//!
//! - [`WallMaterial`] / [`WallThickness`]: gp per 10-ft wall section, hardness,
//!   and the maximum height each thickness supports
//! - [`RoofKind`]: multiplier on the base (wood, 1 ft) rate
//! - [`BuildingType`]: final-cost multiplier by purpose
//!
//! ## Example
//!
//! ```rust
//! use fort_core::materials::{WallMaterial, WallThickness, RoofKind, BuildingType};
//!
//! let rate = WallMaterial::Hardstone.cost_per_section(WallThickness::Ten);
//! assert_eq!(rate, Some(260));
//! assert_eq!(RoofKind::Slate.multiplier(), 2.0);
//! assert_eq!(BuildingType::Tower.multiplier(), 3.0);
//! ```

pub mod walls;

pub use walls::{WallMaterial, WallThickness, BASE_WOOD_RATE};

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{FortError, FortResult};

/// Roof covering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoofKind {
    Thatch,
    Wood,
    Slate,
}

impl RoofKind {
    pub const ALL: [RoofKind; 3] = [RoofKind::Thatch, RoofKind::Wood, RoofKind::Slate];

    /// Multiplier applied to the base wood rate per 10-ft square of roof
    pub fn multiplier(&self) -> f64 {
        match self {
            RoofKind::Thatch => 0.5,
            RoofKind::Wood => 1.0,
            RoofKind::Slate => 2.0,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RoofKind::Thatch => "thatch",
            RoofKind::Wood => "wood",
            RoofKind::Slate => "slate",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> FortResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "thatch" | "straw" => Ok(RoofKind::Thatch),
            "wood" | "timber" | "shingle" => Ok(RoofKind::Wood),
            "slate" | "tile" => Ok(RoofKind::Slate),
            _ => Err(FortError::invalid_input(
                "roof",
                s,
                "Unknown roof (expected thatch, wood or slate)",
            )),
        }
    }
}

impl FromStr for RoofKind {
    type Err = FortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoofKind::from_str_flexible(s)
    }
}

impl std::fmt::Display for RoofKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Purpose of the structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildingType {
    #[default]
    Castle,
    Tower,
    Temple,
    Guildhouse,
}

impl BuildingType {
    pub const ALL: [BuildingType; 4] = [
        BuildingType::Castle,
        BuildingType::Tower,
        BuildingType::Temple,
        BuildingType::Guildhouse,
    ];

    /// Final-cost multiplier
    pub fn multiplier(&self) -> f64 {
        match self {
            BuildingType::Castle => 1.0,
            BuildingType::Tower => 3.0,
            BuildingType::Temple => 1.5,
            BuildingType::Guildhouse => 2.0,
        }
    }

    /// Informational note explaining the multiplier, if any.
    ///
    /// The multiplier already accounts for it; the note adds no cost.
    pub fn cost_note(&self) -> Option<&'static str> {
        match self {
            BuildingType::Guildhouse => Some("exterior walls but double cost for utilities"),
            BuildingType::Tower => Some("triple cost for fittings"),
            BuildingType::Castle | BuildingType::Temple => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            BuildingType::Castle => "castle",
            BuildingType::Tower => "tower",
            BuildingType::Temple => "temple",
            BuildingType::Guildhouse => "guildhouse",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> FortResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "castle" | "keep" | "fort" => Ok(BuildingType::Castle),
            "tower" => Ok(BuildingType::Tower),
            "temple" | "shrine" => Ok(BuildingType::Temple),
            "guildhouse" | "guild" | "guildhall" => Ok(BuildingType::Guildhouse),
            _ => Err(FortError::invalid_input(
                "type",
                s,
                "Unknown building type (expected castle, tower, temple or guildhouse)",
            )),
        }
    }
}

impl FromStr for BuildingType {
    type Err = FortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BuildingType::from_str_flexible(s)
    }
}

impl std::fmt::Display for BuildingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
