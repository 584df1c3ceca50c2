//! # Cost Pipeline
//!
//! Prices a [`Plan`]: walls and floors per level, a per-floor height
//! surcharge, roof and parapet on the top floor, then the purpose and
//! remoteness multipliers.
//!
//! ## Formulas
//!
//! ```text
//! wall_cost   = sections × rate[material][thickness]
//! floor_cost  = floor_area × rate[wood][1]
//! subtotal    = wall_cost + floor_cost
//! engineered  = round(subtotal × (1 + 0.10 × (height / 10)))     per floor
//! roof_cost   = roof_area × rate[wood][1] × roof_multiplier       top floor height
//! parapet     = perimeter × rate[top material][1] × 0.5           half top floor height
//! final_cost  = round(Σ engineered × type_multiplier × remote_multiplier)
//! ```
//!
//! The surcharge is applied to each floor on its own height; it does not
//! compound up the stack.
//!
//! ## Example
//!
//! ```rust
//! use fort_core::calculations::cost::evaluate;
//! use fort_core::geometry::Shape;
//! use fort_core::materials::{BuildingType, WallMaterial, WallThickness};
//! use fort_core::plan::{FloorSegment, Plan};
//!
//! let mut plan = Plan::new("Keep", BuildingType::Castle);
//! plan.add_floor(FloorSegment::new(Shape::Rectangle, 50, 20, WallThickness::Ten, WallMaterial::Hardstone)?)?;
//!
//! let cost = evaluate(&plan)?;
//! assert_eq!(cost.base_cost, 8410.0);
//! assert_eq!(cost.final_cost, 10092.0);
//! # Ok::<(), fort_core::errors::FortError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::FortResult;
use crate::geometry::{floor_area_in_10ft_squares, inner_size, perimeter_sections, wall_sections};
use crate::materials::{WallThickness, BASE_WOOD_RATE};
use crate::plan::{FloorSegment, Plan};

/// Height surcharge per 10 ft of height
pub const SURCHARGE_PER_COURSE: f64 = 0.10;

/// Parapets cost half the 1-ft rate
pub const PARAPET_COST_FACTOR: f64 = 0.5;

/// Cost detail for one floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorCost {
    /// Position in the stack (0 = ground)
    pub index: usize,
    pub sections: u32,
    pub wall_cost: f64,
    pub inner_size_ft: u32,
    /// Usable area in 10×10-ft squares
    pub floor_area: u32,
    pub floor_material_cost: f64,
    pub subtotal: f64,
    pub engineered_cost: f64,
}

/// Result of pricing a plan.
///
/// ## JSON Example
///
/// ```json
/// {
///   "base_cost": 8410.0,
///   "engineered_cost": 10092.0,
///   "final_cost": 10092.0,
///   "total_floor_area": 9,
///   "roof_area": 0,
///   "roof_cost": 0.0,
///   "parapet_cost": 0.0,
///   "floors": [ ... ],
///   "warnings": [],
///   "structural_warnings": 0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Materials before the height surcharge (walls, floors, roof, parapet)
    pub base_cost: f64,
    /// After the per-floor height surcharge
    pub engineered_cost: f64,
    /// After the purpose and remoteness multipliers
    pub final_cost: f64,
    /// Usable floor area across all floors, in 10×10-ft squares
    pub total_floor_area: u32,
    pub roof_area: u32,
    pub roof_cost: f64,
    pub parapet_cost: f64,
    pub floors: Vec<FloorCost>,
    /// Structural and informational notes; never fatal
    pub warnings: Vec<String>,
    /// How many of `warnings` are walls taller than their thickness allows
    #[serde(default)]
    pub structural_warnings: u32,
}

impl CostBreakdown {
    /// True if any structural warning was raised
    pub fn has_structural_warning(&self) -> bool {
        self.structural_warnings > 0
    }
}

/// Apply the height surcharge: `round(cost × (1 + 0.10 × (height / 10)))`
pub fn height_surcharge(cost: f64, height_ft: u32) -> f64 {
    (cost * (1.0 + SURCHARGE_PER_COURSE * f64::from(height_ft / 10))).round()
}

/// Price one floor (walls plus a wood floor) before any multipliers.
pub fn floor_cost(index: usize, floor: &FloorSegment) -> FortResult<FloorCost> {
    let rate = floor
        .material
        .require_cost(floor.thickness_ft, &format!("floors[{}].thickness_ft", index))?;

    let sections = wall_sections(
        floor.shape,
        floor.size_ft,
        floor.height_ft,
        floor.thickness_ft,
        floor.entrances,
    );
    let wall_cost = f64::from(sections) * f64::from(rate);
    let inner = inner_size(floor.size_ft, floor.thickness_ft);
    let floor_area = floor_area_in_10ft_squares(floor.shape, inner);
    let floor_material_cost = f64::from(floor_area) * f64::from(BASE_WOOD_RATE);
    let subtotal = wall_cost + floor_material_cost;
    let engineered_cost = height_surcharge(subtotal, floor.height_ft);

    Ok(FloorCost {
        index,
        sections,
        wall_cost,
        inner_size_ft: inner,
        floor_area,
        floor_material_cost,
        subtotal,
        engineered_cost,
    })
}

/// Price a plan.
///
/// Returns a zero breakdown with a warning if the plan has no floors.
/// Fails with a validation error naming the floor for any invalid input.
pub fn evaluate(plan: &Plan) -> FortResult<CostBreakdown> {
    let mut result = CostBreakdown::default();

    let top = match plan.top_floor() {
        Some(top) => top,
        None => {
            result.warnings.push(format!("plan '{}' has no floors", plan.name));
            return Ok(result);
        }
    };
    plan.validate()?;

    for (index, floor) in plan.floors.iter().enumerate() {
        let cost = floor_cost(index, floor)?;
        debug!(
            floor = index,
            sections = cost.sections,
            subtotal = cost.subtotal,
            engineered = cost.engineered_cost,
            "floor priced"
        );

        let max_height_ft = floor.thickness_ft.max_height_ft();
        if floor.height_ft > max_height_ft {
            let message = format!(
                "floor {}: {} walls support {} ft but are {} ft tall",
                index, floor.thickness_ft, max_height_ft, floor.height_ft
            );
            warn!(plan = %plan.name, "{}", message);
            result.warnings.push(message);
            result.structural_warnings += 1;
        }

        result.base_cost += cost.subtotal;
        result.engineered_cost += cost.engineered_cost;
        result.total_floor_area += cost.floor_area;
        result.floors.push(cost);
    }

    if let Some(roof) = plan.roof {
        let roof_area = floor_area_in_10ft_squares(top.shape, inner_size(top.size_ft, top.thickness_ft));
        let roof_cost = f64::from(roof_area) * f64::from(BASE_WOOD_RATE) * roof.multiplier();
        result.roof_area = roof_area;
        result.roof_cost = roof_cost;
        result.base_cost += roof_cost;
        result.engineered_cost += height_surcharge(roof_cost, top.height_ft);
    }

    if plan.parapet {
        // Every material is offered at 1 ft
        let rate = top.material.require_cost(WallThickness::One, "parapet")?;
        let parapet_cost =
            f64::from(perimeter_sections(top.shape, top.size_ft)) * f64::from(rate) * PARAPET_COST_FACTOR;
        result.parapet_cost = parapet_cost;
        result.base_cost += parapet_cost;
        result.engineered_cost += height_surcharge(parapet_cost, top.height_ft / 2);
    }

    result.final_cost =
        (result.engineered_cost * plan.building_type.multiplier() * plan.remote_multiplier).round();

    if let Some(note) = plan.building_type.cost_note() {
        result.warnings.push(note.to_string());
    }

    Ok(result)
}
