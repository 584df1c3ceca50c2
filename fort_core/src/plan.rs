//! # Plan Data Structures
//!
//! A [`Plan`] is an ordered stack of [`FloorSegment`]s (bottom to top) plus
//! everything that is priced or tracked alongside the walls: roof, parapet,
//! purpose, remoteness, income, upkeep and siege engines.
//!
//! ## Structure
//!
//! ```text
//! Plan
//! ├── floors: Vec<FloorSegment> (ground floor first)
//! ├── building_type / remote_multiplier (final-cost multipliers)
//! ├── roof / parapet (priced on the top floor)
//! ├── income / upkeep_gp_per_week (return on investment)
//! └── siege_engines: BTreeMap<String, SiegeEngine>
//! ```
//!
//! ## Example
//!
//! ```rust
//! use fort_core::plan::{FloorSegment, Plan};
//! use fort_core::geometry::Shape;
//! use fort_core::materials::{BuildingType, WallMaterial, WallThickness};
//!
//! let mut plan = Plan::new("Keep", BuildingType::Castle);
//! let floor = FloorSegment::new(Shape::Rectangle, 50, 20, WallThickness::Ten, WallMaterial::Hardstone)?;
//! plan.add_floor(floor)?;
//! assert_eq!(plan.total_height_ft(), 20);
//! # Ok::<(), fort_core::errors::FortError>(())
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculations::taper;
use crate::errors::{FortError, FortResult};
use crate::geometry::Shape;
use crate::materials::{BuildingType, RoofKind, WallMaterial, WallThickness};
use crate::siege::{self, EngineAction, EngineReport, SiegeEngine};

/// Largest side length or diameter accepted for a floor
pub const MAX_SIZE_FT: u32 = 1000;

/// Tallest single floor accepted
pub const MAX_FLOOR_HEIGHT_FT: u32 = 200;

/// Most floors a plan can stack
pub const MAX_FLOORS: usize = 100;

fn default_remote() -> f64 {
    1.0
}

/// One level of the structure.
///
/// ## JSON Example
///
/// ```json
/// {
///   "shape": "rectangle",
///   "size_ft": 50,
///   "height_ft": 20,
///   "thickness_ft": 10,
///   "material": "hardstone",
///   "entrances": 1,
///   "windows": 4
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSegment {
    pub shape: Shape,

    /// Side length (rectangle) or diameter (circle) in feet
    pub size_ft: u32,

    /// Wall height in feet, normally a multiple of 10
    pub height_ft: u32,

    pub thickness_ft: WallThickness,

    pub material: WallMaterial,

    /// 10-ft wall sections left open for doorways (rectangles only)
    #[serde(default)]
    pub entrances: u32,

    /// Cosmetic; no cost effect
    #[serde(default)]
    pub windows: u32,
}

impl FloorSegment {
    /// Create a validated floor with no entrances or windows.
    pub fn new(
        shape: Shape,
        size_ft: u32,
        height_ft: u32,
        thickness_ft: WallThickness,
        material: WallMaterial,
    ) -> FortResult<Self> {
        let floor = FloorSegment {
            shape,
            size_ft,
            height_ft,
            thickness_ft,
            material,
            entrances: 0,
            windows: 0,
        };
        floor.validate()?;
        Ok(floor)
    }

    pub fn validate(&self) -> FortResult<()> {
        self.check("floor")
    }

    /// Validate as the floor at `index`, naming it in any error
    pub fn validate_at(&self, index: usize) -> FortResult<()> {
        self.check(&format!("floors[{}]", index))
    }

    fn check(&self, prefix: &str) -> FortResult<()> {
        if self.size_ft == 0 {
            return Err(FortError::invalid_input(
                format!("{}.size_ft", prefix),
                self.size_ft.to_string(),
                "Footprint must be positive",
            ));
        }
        if self.size_ft > MAX_SIZE_FT {
            return Err(FortError::invalid_input(
                format!("{}.size_ft", prefix),
                self.size_ft.to_string(),
                format!("Footprint cannot exceed {} ft", MAX_SIZE_FT),
            ));
        }
        if self.height_ft == 0 {
            return Err(FortError::invalid_input(
                format!("{}.height_ft", prefix),
                self.height_ft.to_string(),
                "Height must be positive",
            ));
        }
        if self.height_ft > MAX_FLOOR_HEIGHT_FT {
            return Err(FortError::invalid_input(
                format!("{}.height_ft", prefix),
                self.height_ft.to_string(),
                format!("A single floor cannot exceed {} ft", MAX_FLOOR_HEIGHT_FT),
            ));
        }
        self.material
            .require_cost(self.thickness_ft, &format!("{}.thickness_ft", prefix))?;
        if self.shape == Shape::Circle && self.entrances > 0 {
            return Err(FortError::invalid_input(
                format!("{}.entrances", prefix),
                self.entrances.to_string(),
                "Entrance deductions apply to rectangular floors only",
            ));
        }
        Ok(())
    }
}

/// Weekly income the structure brings in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    /// What the income is from (e.g., "tolls", "tithes")
    pub label: String,
    pub gp_per_week: f64,
}

/// A named structure description.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub name: String,

    /// Bottom to top
    pub floors: Vec<FloorSegment>,

    pub building_type: BuildingType,

    /// Final-cost factor for hard-to-supply sites (1.0 = local)
    #[serde(default = "default_remote")]
    pub remote_multiplier: f64,

    #[serde(default)]
    pub roof: Option<RoofKind>,

    /// Half-height, half-cost 1-ft ring on top of the last floor
    #[serde(default)]
    pub parapet: bool,

    #[serde(default)]
    pub income: Option<Income>,

    #[serde(default)]
    pub upkeep_gp_per_week: f64,

    #[serde(default)]
    pub siege_engines: BTreeMap<String, SiegeEngine>,

    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Plan {
    /// Create an empty plan.
    pub fn new(name: impl Into<String>, building_type: BuildingType) -> Self {
        let now = Utc::now();
        Plan {
            name: name.into(),
            floors: Vec::new(),
            building_type,
            remote_multiplier: 1.0,
            roof: None,
            parapet: false,
            income: None,
            upkeep_gp_per_week: 0.0,
            siege_engines: BTreeMap::new(),
            created: now,
            modified: now,
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn top_floor(&self) -> Option<&FloorSegment> {
        self.floors.last()
    }

    pub fn ground_floor(&self) -> Option<&FloorSegment> {
        self.floors.first()
    }

    /// `EmptyPlan` unless at least one floor has been added
    pub fn require_floors(&self) -> FortResult<()> {
        if self.floors.is_empty() {
            return Err(FortError::EmptyPlan {
                plan: self.name.clone(),
            });
        }
        Ok(())
    }

    pub fn total_height_ft(&self) -> u32 {
        self.floors.iter().fold(0, |total, f| total.saturating_add(f.height_ft))
    }

    /// Validate every floor and the remoteness multiplier.
    pub fn validate(&self) -> FortResult<()> {
        check_floor_count(self.floors.len())?;
        for (index, floor) in self.floors.iter().enumerate() {
            floor.validate_at(index)?;
        }
        validate_remote(self.remote_multiplier)
    }

    /// Append a floor on top. Returns its index.
    pub fn add_floor(&mut self, floor: FloorSegment) -> FortResult<usize> {
        let index = self.floors.len();
        check_floor_count(index + 1)?;
        floor.validate_at(index)?;
        self.floors.push(floor);
        self.touch();
        Ok(index)
    }

    /// Append `count` copies of `floor`.
    pub fn add_floors(&mut self, floor: FloorSegment, count: u32) -> FortResult<()> {
        if count == 0 {
            return Err(FortError::invalid_input("count", "0", "Add at least one floor"));
        }
        check_floor_count(self.floors.len().saturating_add(count as usize))?;
        floor.validate_at(self.floors.len())?;
        for _ in 0..count {
            self.floors.push(floor.clone());
        }
        self.touch();
        Ok(())
    }

    pub fn set_roof(&mut self, roof: Option<RoofKind>) {
        self.roof = roof;
        self.touch();
    }

    pub fn set_parapet(&mut self, parapet: bool) {
        self.parapet = parapet;
        self.touch();
    }

    pub fn set_building_type(&mut self, building_type: BuildingType) {
        self.building_type = building_type;
        self.touch();
    }

    pub fn set_remote(&mut self, multiplier: f64) -> FortResult<()> {
        validate_remote(multiplier)?;
        self.remote_multiplier = multiplier;
        self.touch();
        Ok(())
    }

    /// Set the doorway deduction of a floor.
    pub fn set_gates(&mut self, floor_index: usize, count: u32) -> FortResult<()> {
        let floor = self.floor_mut(floor_index)?;
        let mut updated = floor.clone();
        updated.entrances = count;
        updated.validate_at(floor_index)?;
        *floor = updated;
        self.touch();
        Ok(())
    }

    pub fn set_windows(&mut self, floor_index: usize, count: u32) -> FortResult<()> {
        self.floor_mut(floor_index)?.windows = count;
        self.touch();
        Ok(())
    }

    pub fn set_income(&mut self, label: impl Into<String>, gp_per_week: f64) -> FortResult<()> {
        validate_weekly("income", gp_per_week)?;
        self.income = Some(Income {
            label: label.into(),
            gp_per_week,
        });
        self.touch();
        Ok(())
    }

    pub fn set_upkeep(&mut self, gp_per_week: f64) -> FortResult<()> {
        validate_weekly("upkeep", gp_per_week)?;
        self.upkeep_gp_per_week = gp_per_week;
        self.touch();
        Ok(())
    }

    /// Replace the floors with a tapered stack `total_height_ft` tall,
    /// using the ground floor as the template for footprint and material.
    pub fn taper(&mut self, total_height_ft: u32) -> FortResult<()> {
        let template = self.ground_floor().cloned().ok_or_else(|| FortError::EmptyPlan {
            plan: self.name.clone(),
        })?;
        let mut floors = taper::synthesize_floors(
            template.shape,
            template.size_ft,
            total_height_ft,
            template.material,
        )?;
        if let Some(ground) = floors.first_mut() {
            ground.entrances = template.entrances;
        }
        self.floors = floors;
        self.touch();
        Ok(())
    }

    /// Run a siege-engine action against this plan's engines.
    pub fn engine(&mut self, name: &str, action: EngineAction) -> FortResult<EngineReport> {
        let report = siege::apply_action(&mut self.siege_engines, name, action)?;
        if action != EngineAction::Status {
            self.touch();
        }
        Ok(report)
    }

    fn floor_mut(&mut self, index: usize) -> FortResult<&mut FloorSegment> {
        let count = self.floors.len();
        self.floors.get_mut(index).ok_or_else(|| {
            FortError::invalid_input(
                "floor",
                index.to_string(),
                format!("Plan has {} floor(s)", count),
            )
        })
    }
}

fn check_floor_count(count: usize) -> FortResult<()> {
    if count > MAX_FLOORS {
        return Err(FortError::invalid_input(
            "floors",
            count.to_string(),
            format!("A plan cannot have more than {} floors", MAX_FLOORS),
        ));
    }
    Ok(())
}

fn validate_remote(multiplier: f64) -> FortResult<()> {
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(FortError::invalid_input(
            "remote_multiplier",
            multiplier.to_string(),
            "Remoteness multiplier must be a finite number ≥ 0",
        ));
    }
    Ok(())
}

fn validate_weekly(field: &str, gp_per_week: f64) -> FortResult<()> {
    if !gp_per_week.is_finite() || gp_per_week < 0.0 {
        return Err(FortError::invalid_input(
            field,
            gp_per_week.to_string(),
            "Weekly amounts must be finite and not negative",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hardstone_floor() -> FloorSegment {
        FloorSegment::new(Shape::Rectangle, 50, 20, WallThickness::Ten, WallMaterial::Hardstone).unwrap()
    }

    #[test]
    fn test_floor_rejects_zero_dimensions() {
        assert!(FloorSegment::new(Shape::Rectangle, 0, 10, WallThickness::One, WallMaterial::Wood).is_err());
        assert!(FloorSegment::new(Shape::Rectangle, 30, 0, WallThickness::One, WallMaterial::Wood).is_err());
    }

    #[test]
    fn test_floor_rejects_oversized_dimensions() {
        let wide = FloorSegment::new(Shape::Rectangle, 1_100_000_000, 10, WallThickness::One, WallMaterial::Wood);
        assert!(wide.unwrap_err().is_validation());
        assert!(FloorSegment::new(Shape::Rectangle, MAX_SIZE_FT, 10, WallThickness::One, WallMaterial::Wood).is_ok());

        let tall = FloorSegment::new(Shape::Rectangle, 40, 3_000_000_000, WallThickness::One, WallMaterial::Wood);
        assert!(tall.unwrap_err().is_validation());
    }

    #[test]
    fn test_oversized_floor_in_loaded_plan_fails_validation() {
        let mut plan = Plan::new("Tall", BuildingType::Castle);
        let mut floor = hardstone_floor();
        floor.height_ft = 3_000_000_000;
        plan.floors = vec![floor.clone(), floor];
        assert_eq!(plan.total_height_ft(), u32::MAX);
        let err = crate::calculations::evaluate(&plan).unwrap_err();
        assert!(err.to_string().contains("floors[0].height_ft"));
    }

    #[test]
    fn test_floor_count_is_capped() {
        let mut plan = Plan::new("Stack", BuildingType::Castle);
        assert!(plan.add_floors(hardstone_floor(), u32::MAX).is_err());
        assert!(plan.floors.is_empty());
        plan.add_floors(hardstone_floor(), MAX_FLOORS as u32).unwrap();
        assert!(plan.add_floor(hardstone_floor()).is_err());
    }

    #[test]
    fn test_floor_rejects_unavailable_thickness() {
        let err = FloorSegment::new(Shape::Rectangle, 30, 10, WallThickness::Fifteen, WallMaterial::Wood).unwrap_err();
        match err {
            FortError::InvalidInput { field, .. } => assert_eq!(field, "floor.thickness_ft"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_floor_with_bad_thickness_fails_to_deserialize() {
        let json = r#"{"shape":"rectangle","size_ft":30,"height_ft":10,"thickness_ft":3,"material":"wood"}"#;
        assert!(serde_json::from_str::<FloorSegment>(json).is_err());
    }

    #[test]
    fn test_add_floor_names_offending_index() {
        let mut plan = Plan::new("Keep", BuildingType::Castle);
        plan.add_floor(hardstone_floor()).unwrap();
        let mut bad = hardstone_floor();
        bad.material = WallMaterial::Wood;
        match plan.add_floor(bad).unwrap_err() {
            FortError::InvalidInput { field, .. } => assert_eq!(field, "floors[1].thickness_ft"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(plan.floors.len(), 1);
    }

    #[test]
    fn test_add_floors_appends_copies() {
        let mut plan = Plan::new("Keep", BuildingType::Castle);
        plan.add_floors(hardstone_floor(), 3).unwrap();
        assert_eq!(plan.floors.len(), 3);
        assert_eq!(plan.total_height_ft(), 60);
        assert!(plan.add_floors(hardstone_floor(), 0).is_err());
    }

    #[test]
    fn test_gates_rejected_on_circles() {
        let mut plan = Plan::new("Round", BuildingType::Tower);
        let floor = FloorSegment::new(Shape::Circle, 40, 10, WallThickness::Five, WallMaterial::Brick).unwrap();
        plan.add_floor(floor).unwrap();
        assert!(plan.set_gates(0, 1).is_err());
        assert_eq!(plan.floors[0].entrances, 0);
        assert!(plan.set_gates(3, 1).is_err());
    }

    #[test]
    fn test_windows_are_recorded() {
        let mut plan = Plan::new("Keep", BuildingType::Castle);
        plan.add_floor(hardstone_floor()).unwrap();
        plan.set_windows(0, 6).unwrap();
        assert_eq!(plan.floors[0].windows, 6);
    }

    #[test]
    fn test_remote_and_weekly_validation() {
        let mut plan = Plan::new("Keep", BuildingType::Castle);
        assert!(plan.set_remote(-0.5).is_err());
        assert!(plan.set_remote(f64::NAN).is_err());
        plan.set_remote(1.5).unwrap();
        assert_eq!(plan.remote_multiplier, 1.5);
        assert!(plan.set_income("tolls", -1.0).is_err());
        plan.set_income("tolls", 120.0).unwrap();
        plan.set_upkeep(40.0).unwrap();
        assert_eq!(plan.income.as_ref().unwrap().gp_per_week, 120.0);
    }

    #[test]
    fn test_taper_uses_ground_floor_template() {
        let mut plan = Plan::new("Keep", BuildingType::Castle);
        let mut ground = FloorSegment::new(Shape::Rectangle, 60, 10, WallThickness::One, WallMaterial::Softstone).unwrap();
        ground.entrances = 1;
        plan.add_floor(ground).unwrap();

        plan.taper(70).unwrap();
        assert_eq!(plan.floors.len(), 7);
        assert_eq!(plan.floors[0].thickness_ft, WallThickness::Ten);
        assert_eq!(plan.floors[0].entrances, 1);
        assert_eq!(plan.floors[6].thickness_ft, WallThickness::One);
        assert!(plan.floors.iter().all(|f| f.material == WallMaterial::Softstone && f.size_ft == 60));
    }

    #[test]
    fn test_taper_needs_a_floor() {
        let mut plan = Plan::new("Empty", BuildingType::Castle);
        assert!(matches!(plan.taper(50), Err(FortError::EmptyPlan { .. })));
        assert!(plan.require_floors().is_err());
    }

    #[test]
    fn test_plan_serialization_defaults() {
        let plan = Plan::new("Keep", BuildingType::Temple);
        let json = serde_json::to_string(&plan).unwrap();
        let roundtrip: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.name, "Keep");
        assert_eq!(roundtrip.remote_multiplier, 1.0);
        assert!(roundtrip.roof.is_none());
    }
}
