//! # Plan Summary
//!
//! Everything about a plan in one serializable record: the floors as
//! described, their costs, and the plan's finances and siege engines.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calculations::cost::{evaluate, CostBreakdown};
use crate::calculations::roi::{roi, RoiResult};
use crate::errors::FortResult;
use crate::geometry::Shape;
use crate::materials::{BuildingType, RoofKind, WallMaterial, WallThickness};
use crate::plan::Plan;

/// One floor as described, with its material's hardness
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorSummary {
    pub index: usize,
    pub shape: Shape,
    pub size_ft: u32,
    pub height_ft: u32,
    pub thickness_ft: WallThickness,
    pub material: WallMaterial,
    pub hardness: u32,
    pub entrances: u32,
    pub windows: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub name: String,
    pub building_type: BuildingType,
    pub remote_multiplier: f64,
    pub total_height_ft: u32,
    pub roof: Option<RoofKind>,
    pub parapet: bool,
    pub floors: Vec<FloorSummary>,
    pub cost: CostBreakdown,
    pub roi: RoiResult,
    pub siege_engines: BTreeMap<String, u32>,
}

/// Evaluate a plan and gather its description.
pub fn summarize(plan: &Plan) -> FortResult<PlanSummary> {
    let cost = evaluate(plan)?;
    let floors = plan
        .floors
        .iter()
        .enumerate()
        .map(|(index, f)| FloorSummary {
            index,
            shape: f.shape,
            size_ft: f.size_ft,
            height_ft: f.height_ft,
            thickness_ft: f.thickness_ft,
            material: f.material,
            hardness: f.material.hardness(),
            entrances: f.entrances,
            windows: f.windows,
        })
        .collect();

    Ok(PlanSummary {
        name: plan.name.clone(),
        building_type: plan.building_type,
        remote_multiplier: plan.remote_multiplier,
        total_height_ft: plan.total_height_ft(),
        roof: plan.roof,
        parapet: plan.parapet,
        floors,
        roi: roi(plan, &cost),
        cost,
        siege_engines: plan
            .siege_engines
            .iter()
            .map(|(name, engine)| (name.clone(), engine.armor()))
            .collect(),
    })
}
