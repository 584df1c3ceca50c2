//! Wall Materials and Thicknesses
//!
//! Cost of one 10-ft wall section (one course high) per material and
//! thickness, plus the hardness rating of each material.
//!
//! Not every material is offered at every thickness: timber tops out at
//! 5 ft and brick at 10 ft. Every material is offered at 1 ft, which is
//! what parapets are priced at.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{FortError, FortResult};

/// Wood at 1 ft: the rate floors and roofs are priced at regardless of wall material
pub const BASE_WOOD_RATE: u32 = 10;

/// Wall material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallMaterial {
    /// Timber palisade or framed walls
    Wood,
    /// Fired brick
    Brick,
    /// Soft stone (limestone, sandstone)
    Softstone,
    /// Hard stone (granite, basalt)
    Hardstone,
}

impl WallMaterial {
    /// All wall materials for selection lists
    pub const ALL: [WallMaterial; 4] = [
        WallMaterial::Wood,
        WallMaterial::Brick,
        WallMaterial::Softstone,
        WallMaterial::Hardstone,
    ];

    /// Catalog key (e.g., "hardstone")
    pub fn code(&self) -> &'static str {
        match self {
            WallMaterial::Wood => "wood",
            WallMaterial::Brick => "brick",
            WallMaterial::Softstone => "softstone",
            WallMaterial::Hardstone => "hardstone",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> FortResult<Self> {
        match s.trim().to_lowercase().replace([' ', '-', '_'], "").as_str() {
            "wood" | "timber" => Ok(WallMaterial::Wood),
            "brick" => Ok(WallMaterial::Brick),
            "softstone" | "soft" => Ok(WallMaterial::Softstone),
            "hardstone" | "hard" | "stone" => Ok(WallMaterial::Hardstone),
            _ => Err(FortError::invalid_input(
                "material",
                s,
                "Unknown material (expected wood, brick, softstone or hardstone)",
            )),
        }
    }

    /// Gold pieces per 10-ft wall section at the given thickness,
    /// or `None` when the material is not offered at that thickness.
    pub fn cost_per_section(&self, thickness: WallThickness) -> Option<u32> {
        use WallThickness::*;
        match (self, thickness) {
            (WallMaterial::Wood, One) => Some(BASE_WOOD_RATE),
            (WallMaterial::Wood, Five) => Some(45),
            (WallMaterial::Wood, Ten | Fifteen) => None,

            (WallMaterial::Brick, One) => Some(20),
            (WallMaterial::Brick, Five) => Some(80),
            (WallMaterial::Brick, Ten) => Some(150),
            (WallMaterial::Brick, Fifteen) => None,

            (WallMaterial::Softstone, One) => Some(25),
            (WallMaterial::Softstone, Five) => Some(100),
            (WallMaterial::Softstone, Ten) => Some(190),
            (WallMaterial::Softstone, Fifteen) => Some(270),

            (WallMaterial::Hardstone, One) => Some(35),
            (WallMaterial::Hardstone, Five) => Some(140),
            (WallMaterial::Hardstone, Ten) => Some(260),
            (WallMaterial::Hardstone, Fifteen) => Some(370),
        }
    }

    /// Section cost, failing with a validation error naming `field`
    pub fn require_cost(&self, thickness: WallThickness, field: &str) -> FortResult<u32> {
        self.cost_per_section(thickness).ok_or_else(|| {
            FortError::invalid_input(
                field,
                format!("{} at {} ft", self.code(), thickness.feet()),
                format!("{} walls are not built {} ft thick", self.display_name(), thickness.feet()),
            )
        })
    }

    /// Thicknesses this material is offered at
    pub fn thicknesses(&self) -> Vec<WallThickness> {
        WallThickness::ALL
            .into_iter()
            .filter(|t| self.cost_per_section(*t).is_some())
            .collect()
    }

    /// Hardness rating
    pub fn hardness(&self) -> u32 {
        match self {
            WallMaterial::Wood => 10,
            WallMaterial::Brick => 12,
            WallMaterial::Softstone => 14,
            WallMaterial::Hardstone => 16,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            WallMaterial::Wood => "Wood",
            WallMaterial::Brick => "Brick",
            WallMaterial::Softstone => "Soft stone",
            WallMaterial::Hardstone => "Hard stone",
        }
    }
}

impl FromStr for WallMaterial {
    type Err = FortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WallMaterial::from_str_flexible(s)
    }
}

impl std::fmt::Display for WallMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Allowed wall thicknesses.
///
/// Serializes as the plain number of feet; any other number is rejected
/// on deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum WallThickness {
    /// 1 ft
    One,
    /// 5 ft
    Five,
    /// 10 ft
    Ten,
    /// 15 ft
    Fifteen,
}

impl WallThickness {
    /// All thicknesses, thinnest first
    pub const ALL: [WallThickness; 4] = [
        WallThickness::One,
        WallThickness::Five,
        WallThickness::Ten,
        WallThickness::Fifteen,
    ];

    /// Thickness in feet
    pub fn feet(&self) -> u32 {
        match self {
            WallThickness::One => 1,
            WallThickness::Five => 5,
            WallThickness::Ten => 10,
            WallThickness::Fifteen => 15,
        }
    }

    /// Convert from feet, rejecting anything outside {1, 5, 10, 15}
    pub fn from_feet(feet: u32) -> FortResult<Self> {
        match feet {
            1 => Ok(WallThickness::One),
            5 => Ok(WallThickness::Five),
            10 => Ok(WallThickness::Ten),
            15 => Ok(WallThickness::Fifteen),
            _ => Err(FortError::invalid_input(
                "thickness_ft",
                feet.to_string(),
                "Thickness must be 1, 5, 10 or 15 ft",
            )),
        }
    }

    /// Maximum total wall height (ft) this thickness supports before a
    /// structural warning is raised
    pub fn max_height_ft(&self) -> u32 {
        match self {
            WallThickness::One => 40,
            WallThickness::Five => 60,
            WallThickness::Ten => 80,
            WallThickness::Fifteen => 120,
        }
    }
}

impl TryFrom<u32> for WallThickness {
    type Error = FortError;

    fn try_from(feet: u32) -> Result<Self, Self::Error> {
        WallThickness::from_feet(feet)
    }
}

impl From<WallThickness> for u32 {
    fn from(t: WallThickness) -> u32 {
        t.feet()
    }
}

impl FromStr for WallThickness {
    type Err = FortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches("ft").trim();
        let feet: u32 = trimmed.parse().map_err(|_| {
            FortError::invalid_input("thickness_ft", s, "Thickness must be a whole number of feet")
        })?;
        WallThickness::from_feet(feet)
    }
}

impl std::fmt::Display for WallThickness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ft", self.feet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thickness_rejects_unlisted_values() {
        for feet in [0, 2, 3, 4, 6, 9, 11, 14, 16, 20, 100] {
            assert!(WallThickness::from_feet(feet).is_err(), "{} ft accepted", feet);
        }
        for feet in [1, 5, 10, 15] {
            assert_eq!(WallThickness::from_feet(feet).unwrap().feet(), feet);
        }
    }

    #[test]
    fn test_thickness_serializes_as_feet() {
        let json = serde_json::to_string(&WallThickness::Ten).unwrap();
        assert_eq!(json, "10");
        assert!(serde_json::from_str::<WallThickness>("7").is_err());
        assert_eq!(serde_json::from_str::<WallThickness>("15").unwrap(), WallThickness::Fifteen);
    }

    #[test]
    fn test_hardstone_ten_foot_section() {
        assert_eq!(WallMaterial::Hardstone.cost_per_section(WallThickness::Ten), Some(260));
    }

    #[test]
    fn test_every_material_has_one_foot_rate() {
        for material in WallMaterial::ALL {
            assert!(material.cost_per_section(WallThickness::One).is_some());
        }
    }

    #[test]
    fn test_wood_not_offered_thick() {
        assert!(WallMaterial::Wood.require_cost(WallThickness::Ten, "floors[0]").is_err());
        assert_eq!(
            WallMaterial::Wood.thicknesses(),
            vec![WallThickness::One, WallThickness::Five]
        );
    }

    #[test]
    fn test_material_parsing() {
        assert_eq!(WallMaterial::from_str_flexible("Hard Stone").unwrap(), WallMaterial::Hardstone);
        assert_eq!("timber".parse::<WallMaterial>().unwrap(), WallMaterial::Wood);
        assert!(WallMaterial::from_str_flexible("adamantine").is_err());
    }

    #[test]
    fn test_thickness_parsing_accepts_unit_suffix() {
        assert_eq!("5ft".parse::<WallThickness>().unwrap(), WallThickness::Five);
        assert!("five".parse::<WallThickness>().is_err());
    }
}
