//! # Budget Optimizer
//!
//! Grid search over footprint × height for the tapered structure with the
//! most usable floor area whose final cost fits a budget.
//!
//! Every footprint in `footprint_min_ft..=footprint_max_ft` (by `step_ft`)
//! is tried at every height from 10 to 100 ft. Candidates the material
//! cannot be built at (wood thicker than 5 ft) are skipped. Ties keep the
//! first candidate found: smallest footprint, then lowest height.
//!
//! The search is deterministic, so raising the budget can only keep or
//! grow the best area found.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calculations::cost::{evaluate, CostBreakdown};
use crate::calculations::taper::synthesize_floors;
use crate::errors::{FortError, FortResult};
use crate::geometry::Shape;
use crate::materials::{BuildingType, RoofKind, WallMaterial};
use crate::plan::{Plan, MAX_SIZE_FT};

/// Heights tried for every footprint
pub const SEARCH_HEIGHTS_FT: [u32; 10] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Budget search parameters.
///
/// ## JSON Example
///
/// ```json
/// {
///   "shape": "rectangle",
///   "material": "hardstone",
///   "building_type": "castle",
///   "remote_multiplier": 1.0,
///   "roof": "slate",
///   "parapet": true,
///   "budget_gp": 50000.0,
///   "footprint_min_ft": 20,
///   "footprint_max_ft": 200,
///   "step_ft": 10
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSearchInput {
    pub shape: Shape,
    pub material: WallMaterial,
    #[serde(default)]
    pub building_type: BuildingType,
    pub remote_multiplier: f64,
    #[serde(default)]
    pub roof: Option<RoofKind>,
    #[serde(default)]
    pub parapet: bool,
    pub budget_gp: f64,
    pub footprint_min_ft: u32,
    pub footprint_max_ft: u32,
    pub step_ft: u32,
}

impl BudgetSearchInput {
    pub fn validate(&self) -> FortResult<()> {
        if !self.budget_gp.is_finite() || self.budget_gp < 0.0 {
            return Err(FortError::invalid_input(
                "budget_gp",
                self.budget_gp.to_string(),
                "Budget must be a finite amount ≥ 0",
            ));
        }
        if self.step_ft == 0 {
            return Err(FortError::invalid_input("step_ft", "0", "Step must be positive"));
        }
        if self.footprint_min_ft == 0 {
            return Err(FortError::invalid_input(
                "footprint_min_ft",
                "0",
                "Footprint must be positive",
            ));
        }
        if self.footprint_min_ft > self.footprint_max_ft {
            return Err(FortError::invalid_input(
                "footprint_max_ft",
                self.footprint_max_ft.to_string(),
                format!("Range is empty (minimum is {})", self.footprint_min_ft),
            ));
        }
        if self.footprint_max_ft > MAX_SIZE_FT {
            return Err(FortError::invalid_input(
                "footprint_max_ft",
                self.footprint_max_ft.to_string(),
                format!("Footprint cannot exceed {} ft", MAX_SIZE_FT),
            ));
        }
        if !self.remote_multiplier.is_finite() || self.remote_multiplier < 0.0 {
            return Err(FortError::invalid_input(
                "remote_multiplier",
                self.remote_multiplier.to_string(),
                "Remoteness multiplier must be a finite number ≥ 0",
            ));
        }
        Ok(())
    }

    fn candidate_plan(&self, footprint_ft: u32, height_ft: u32) -> FortResult<Plan> {
        let mut plan = Plan::new(format!("{}ft x {}ft", footprint_ft, height_ft), self.building_type);
        plan.floors = synthesize_floors(self.shape, footprint_ft, height_ft, self.material)?;
        plan.remote_multiplier = self.remote_multiplier;
        plan.roof = self.roof;
        plan.parapet = self.parapet;
        Ok(plan)
    }
}

/// The best structure found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCandidate {
    pub footprint_ft: u32,
    pub height_ft: u32,
    pub cost: CostBreakdown,
}

/// Search for the largest floor area within budget.
///
/// Returns `Ok(None)` when nothing in the grid fits.
pub fn search(input: &BudgetSearchInput) -> FortResult<Option<BudgetCandidate>> {
    input.validate()?;

    let mut best: Option<BudgetCandidate> = None;
    let mut evaluated = 0usize;

    for footprint_ft in (input.footprint_min_ft..=input.footprint_max_ft).step_by(input.step_ft as usize) {
        for height_ft in SEARCH_HEIGHTS_FT {
            let plan = match input.candidate_plan(footprint_ft, height_ft) {
                Ok(plan) => plan,
                Err(e) => {
                    debug!(footprint_ft, height_ft, error = %e, "candidate skipped");
                    continue;
                }
            };
            let cost = evaluate(&plan)?;
            evaluated += 1;

            if cost.final_cost > input.budget_gp {
                continue;
            }
            let better = best
                .as_ref()
                .map_or(true, |b| cost.total_floor_area > b.cost.total_floor_area);
            if better {
                debug!(footprint_ft, height_ft, area = cost.total_floor_area, final_cost = cost.final_cost, "new best");
                best = Some(BudgetCandidate {
                    footprint_ft,
                    height_ft,
                    cost,
                });
            }
        }
    }

    info!(
        evaluated,
        budget = input.budget_gp,
        found = best.is_some(),
        "budget search finished"
    );
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hardstone_search(budget_gp: f64) -> BudgetSearchInput {
        BudgetSearchInput {
            shape: Shape::Rectangle,
            material: WallMaterial::Hardstone,
            building_type: BuildingType::Castle,
            remote_multiplier: 1.0,
            roof: None,
            parapet: false,
            budget_gp,
            footprint_min_ft: 20,
            footprint_max_ft: 200,
            step_ft: 10,
        }
    }

    #[test]
    fn test_result_fits_budget() {
        let best = search(&hardstone_search(50_000.0)).unwrap().unwrap();
        assert!(best.cost.final_cost <= 50_000.0);
        assert!(best.cost.total_floor_area > 0);
        assert_eq!(best.cost.floors.len() as u32, best.height_ft / 10);
    }

    #[test]
    fn test_nothing_fits_tiny_budget() {
        assert!(search(&hardstone_search(10.0)).unwrap().is_none());
    }

    #[test]
    fn test_bigger_budget_never_shrinks_area() {
        let mut last_area = 0;
        for budget in [2_000.0, 5_000.0, 20_000.0, 50_000.0, 200_000.0, 1_000_000.0] {
            let area = search(&hardstone_search(budget))
                .unwrap()
                .map_or(0, |b| b.cost.total_floor_area);
            assert!(area >= last_area, "area fell from {} to {} at {}", last_area, area, budget);
            last_area = area;
        }
        assert!(last_area > 0);
    }

    #[test]
    fn test_search_is_deterministic() {
        let input = hardstone_search(75_000.0);
        assert_eq!(search(&input).unwrap(), search(&input).unwrap());
    }

    #[test]
    fn test_wood_skips_unbuildable_heights() {
        let mut input = hardstone_search(1_000_000_000.0);
        input.material = WallMaterial::Wood;
        let best = search(&input).unwrap().unwrap();
        assert!(best.height_ft <= 60);
    }

    #[test]
    fn test_invalid_ranges_rejected() {
        let mut input = hardstone_search(1000.0);
        input.step_ft = 0;
        assert!(search(&input).is_err());

        let mut input = hardstone_search(1000.0);
        input.footprint_min_ft = 300;
        assert!(search(&input).is_err());

        let input = hardstone_search(-5.0);
        assert!(search(&input).is_err());

        let mut input = hardstone_search(1000.0);
        input.footprint_max_ft = u32::MAX;
        input.step_ft = 1;
        assert!(search(&input).is_err());
    }
}
