//! # Taper Scheduler
//!
//! Default wall thickness for each 10-ft course of a wall, thickest at the
//! base:
//!
//! | Total height | Courses 0–1 | Courses 2–3 | Courses 4–5 | Rest |
//! |--------------|-------------|-------------|-------------|------|
//! | > 80 ft      | 15 ft       | 10 ft       | 5 ft        | 1 ft |
//! | > 60 ft      | 10 ft       | 5 ft        | 1 ft        | 1 ft |
//! | > 40 ft      | 5 ft        | 1 ft        | 1 ft        | 1 ft |
//! | otherwise    | 1 ft        | 1 ft        | 1 ft        | 1 ft |
//!
//! The schedule is what quick estimates and budget searches build their
//! floors from; neither ever takes a hand-authored floor list.

use serde::{Deserialize, Serialize};

use crate::calculations::cost::{evaluate, CostBreakdown};
use crate::errors::{FortError, FortResult};
use crate::geometry::{courses, Shape};
use crate::materials::{BuildingType, RoofKind, WallMaterial, WallThickness};
use crate::plan::{FloorSegment, Plan, MAX_FLOORS};

/// Height of every synthesized floor
pub const COURSE_HEIGHT_FT: u32 = 10;

/// Tallest structure that can be synthesized (one floor per course)
pub const MAX_TOTAL_HEIGHT_FT: u32 = MAX_FLOORS as u32 * COURSE_HEIGHT_FT;

/// Per-course thickness, ground course first. Always at least one entry.
///
/// # Example
///
/// ```rust
/// use fort_core::calculations::taper::schedule;
///
/// let feet: Vec<u32> = schedule(100).iter().map(|t| t.feet()).collect();
/// assert_eq!(feet, vec![15, 15, 10, 10, 5, 5, 1, 1, 1, 1]);
/// ```
pub fn schedule(total_height_ft: u32) -> Vec<WallThickness> {
    use WallThickness::*;

    let bands: &[WallThickness] = if total_height_ft > 80 {
        &[Fifteen, Fifteen, Ten, Ten, Five, Five]
    } else if total_height_ft > 60 {
        &[Ten, Ten, Five, Five]
    } else if total_height_ft > 40 {
        &[Five, Five]
    } else {
        &[]
    };

    (0..courses(total_height_ft) as usize)
        .map(|course| bands.get(course).copied().unwrap_or(One))
        .collect()
}

/// Reject heights that cannot be scheduled: zero, or above [`MAX_TOTAL_HEIGHT_FT`]
pub fn validate_height(total_height_ft: u32) -> FortResult<()> {
    if total_height_ft == 0 {
        return Err(FortError::invalid_input(
            "height_ft",
            "0",
            "Height must be positive",
        ));
    }
    if total_height_ft > MAX_TOTAL_HEIGHT_FT {
        return Err(FortError::invalid_input(
            "height_ft",
            total_height_ft.to_string(),
            format!("Height cannot exceed {} ft", MAX_TOTAL_HEIGHT_FT),
        ));
    }
    Ok(())
}

/// One 10-ft floor per course, same footprint and material throughout.
///
/// Fails if the material is not offered at a thickness the schedule calls
/// for (e.g. wood above 60 ft), on a zero size or height, or above
/// [`MAX_TOTAL_HEIGHT_FT`].
pub fn synthesize_floors(
    shape: Shape,
    size_ft: u32,
    total_height_ft: u32,
    material: WallMaterial,
) -> FortResult<Vec<FloorSegment>> {
    validate_height(total_height_ft)?;

    schedule(total_height_ft)
        .into_iter()
        .enumerate()
        .map(|(index, thickness)| {
            let floor = FloorSegment {
                shape,
                size_ft,
                height_ft: COURSE_HEIGHT_FT,
                thickness_ft: thickness,
                material,
                entrances: 0,
                windows: 0,
            };
            floor.validate_at(index)?;
            Ok(floor)
        })
        .collect()
}

/// Parameters for a quick, store-free estimate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickEstimateInput {
    pub shape: Shape,
    pub size_ft: u32,
    pub height_ft: u32,
    pub material: WallMaterial,
    #[serde(default)]
    pub building_type: BuildingType,
    #[serde(default = "default_remote")]
    pub remote_multiplier: f64,
    #[serde(default)]
    pub roof: Option<RoofKind>,
    #[serde(default)]
    pub parapet: bool,
}

fn default_remote() -> f64 {
    1.0
}

impl QuickEstimateInput {
    /// Build the tapered plan this estimate prices
    pub fn to_plan(&self, name: &str) -> FortResult<Plan> {
        let mut plan = Plan::new(name, self.building_type);
        plan.floors = synthesize_floors(self.shape, self.size_ft, self.height_ft, self.material)?;
        plan.roof = self.roof;
        plan.parapet = self.parapet;
        plan.set_remote(self.remote_multiplier)?;
        Ok(plan)
    }
}

/// Price a tapered structure from footprint, height and material alone.
pub fn quick_estimate(input: &QuickEstimateInput) -> FortResult<CostBreakdown> {
    evaluate(&input.to_plan("estimate")?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feet(schedule: &[WallThickness]) -> Vec<u32> {
        schedule.iter().map(|t| t.feet()).collect()
    }

    #[test]
    fn test_schedule_100_ft() {
        assert_eq!(feet(&schedule(100)), vec![15, 15, 10, 10, 5, 5, 1, 1, 1, 1]);
    }

    #[test]
    fn test_schedule_bands() {
        assert_eq!(feet(&schedule(70)), vec![10, 10, 5, 5, 1, 1, 1]);
        assert_eq!(feet(&schedule(50)), vec![5, 5, 1, 1, 1]);
        assert_eq!(feet(&schedule(40)), vec![1, 1, 1, 1]);
        assert_eq!(feet(&schedule(80)), vec![10, 10, 5, 5, 1, 1, 1, 1]);
        assert_eq!(feet(&schedule(90)), vec![15, 15, 10, 10, 5, 5, 1, 1, 1]);
    }

    #[test]
    fn test_schedule_has_at_least_one_course() {
        assert_eq!(feet(&schedule(5)), vec![1]);
        assert_eq!(feet(&schedule(0)), vec![1]);
    }

    #[test]
    fn test_synthesized_floors_are_ten_feet_each() {
        let floors = synthesize_floors(Shape::Circle, 40, 60, WallMaterial::Softstone).unwrap();
        assert_eq!(floors.len(), 6);
        assert!(floors.iter().all(|f| f.height_ft == COURSE_HEIGHT_FT && f.shape == Shape::Circle));
        assert_eq!(floors[0].thickness_ft, WallThickness::Five);
    }

    #[test]
    fn test_synthesis_rejects_unavailable_thickness() {
        assert!(synthesize_floors(Shape::Rectangle, 60, 70, WallMaterial::Wood).is_err());
        assert!(synthesize_floors(Shape::Rectangle, 60, 60, WallMaterial::Wood).is_ok());
        assert!(synthesize_floors(Shape::Rectangle, 60, 0, WallMaterial::Wood).is_err());
    }

    #[test]
    fn test_tapered_plans_raise_no_structural_warning() {
        for height in (10..=100).step_by(10) {
            let input = QuickEstimateInput {
                shape: Shape::Rectangle,
                size_ft: 80,
                height_ft: height,
                material: WallMaterial::Hardstone,
                building_type: BuildingType::Castle,
                remote_multiplier: 1.0,
                roof: None,
                parapet: false,
            };
            let cost = quick_estimate(&input).unwrap();
            assert!(!cost.has_structural_warning(), "warning at {} ft: {:?}", height, cost.warnings);
        }
    }

    #[test]
    fn test_quick_estimate_applies_extras() {
        let mut input = QuickEstimateInput {
            shape: Shape::Rectangle,
            size_ft: 40,
            height_ft: 30,
            material: WallMaterial::Brick,
            building_type: BuildingType::Castle,
            remote_multiplier: 1.0,
            roof: None,
            parapet: false,
        };
        let bare = quick_estimate(&input).unwrap();
        input.roof = Some(RoofKind::Wood);
        input.parapet = true;
        input.remote_multiplier = 2.0;
        let dressed = quick_estimate(&input).unwrap();
        assert!(dressed.base_cost > bare.base_cost);
        assert!(dressed.final_cost > 2.0 * bare.final_cost);
    }

    #[test]
    fn test_synthesis_rejects_unbounded_heights() {
        let err = synthesize_floors(Shape::Rectangle, 40, u32::MAX - 5, WallMaterial::Hardstone).unwrap_err();
        assert!(err.is_validation());

        let floors = synthesize_floors(Shape::Rectangle, 40, MAX_TOTAL_HEIGHT_FT, WallMaterial::Hardstone).unwrap();
        assert_eq!(floors.len(), MAX_FLOORS);

        let mut plan = Plan::new("Tall", BuildingType::Castle);
        plan.add_floor(FloorSegment::new(Shape::Rectangle, 40, 10, WallThickness::One, WallMaterial::Brick).unwrap())
            .unwrap();
        assert!(plan.taper(u32::MAX).is_err());
        assert_eq!(plan.floors.len(), 1);
    }
}
