//! # Logistics
//!
//! Labor and hauling estimates derived from a cost breakdown.
//!
//! ```text
//! worker_days = final_cost                         (1 gp ≡ 1 worker-day)
//! build_days  = max(⌈worker_days / crew⌉, ⌈√worker_days⌉)
//! cargo_tons  = base_cost / 5
//! trips       = ⌈tons / capacity⌉
//! rounds      = ⌈trips / haulers⌉
//! haul_days   = rounds × trip_days
//! ```
//!
//! The square-root floor is the critical path: past `√worker_days`
//! workers, a bigger crew no longer shortens the build.

use serde::{Deserialize, Serialize};

use crate::calculations::cost::CostBreakdown;
use crate::errors::{FortError, FortResult};

/// Gold pieces of bulk material per ton of cargo
pub const GP_PER_TON: f64 = 5.0;

/// Worker-days of labor for a final cost
pub fn worker_days(final_cost: f64) -> f64 {
    final_cost
}

/// Calendar days to build with `crew_size` workers (a crew of 0 counts as 1).
///
/// # Example
///
/// ```rust
/// use fort_core::calculations::logistics::build_days;
///
/// assert_eq!(build_days(10092.0, 100), 101);
/// // Past √10092 ≈ 100.5 workers the critical path governs
/// assert_eq!(build_days(10092.0, 10_000), 101);
/// ```
pub fn build_days(worker_days: f64, crew_size: u32) -> u64 {
    let worker_days = worker_days.max(0.0);
    let by_crew = (worker_days / f64::from(crew_size.max(1))).ceil();
    let critical_path = worker_days.sqrt().ceil();
    by_crew.max(critical_path) as u64
}

/// Tons of bulk material for a base (pre-surcharge) cost
pub fn cargo_tons(base_cost: f64) -> f64 {
    base_cost / GP_PER_TON
}

/// Hauling capacity available to the site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaulingInput {
    /// Tons one hauler carries per trip
    pub capacity_tons: f64,
    /// Haulers working in parallel
    pub haulers: u32,
    /// Days for one round trip
    pub trip_days: f64,
}

impl Default for HaulingInput {
    fn default() -> Self {
        HaulingInput {
            capacity_tons: 10.0,
            haulers: 1,
            trip_days: 1.0,
        }
    }
}

impl HaulingInput {
    pub fn validate(&self) -> FortResult<()> {
        if !self.capacity_tons.is_finite() || self.capacity_tons <= 0.0 {
            return Err(FortError::invalid_input(
                "capacity_tons",
                self.capacity_tons.to_string(),
                "Hauling capacity must be positive",
            ));
        }
        if self.haulers == 0 {
            return Err(FortError::invalid_input("haulers", "0", "At least one hauler is needed"));
        }
        if !self.trip_days.is_finite() || self.trip_days < 0.0 {
            return Err(FortError::invalid_input(
                "trip_days",
                self.trip_days.to_string(),
                "Trip duration cannot be negative",
            ));
        }
        Ok(())
    }
}

/// Trips and days needed to move a cargo
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HaulingPlan {
    pub tons: f64,
    pub trips: u64,
    pub rounds: u64,
    pub days: f64,
}

/// Plan the hauling of `tons` of material.
pub fn hauling(tons: f64, input: &HaulingInput) -> FortResult<HaulingPlan> {
    input.validate()?;
    let trips = (tons.max(0.0) / input.capacity_tons).ceil() as u64;
    let rounds = trips.div_ceil(u64::from(input.haulers));
    Ok(HaulingPlan {
        tons,
        trips,
        rounds,
        days: rounds as f64 * input.trip_days,
    })
}

/// Inputs for a full logistics estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticsInput {
    pub crew_size: u32,
    pub hauling: HaulingInput,
}

impl Default for LogisticsInput {
    fn default() -> Self {
        LogisticsInput {
            crew_size: 100,
            hauling: HaulingInput::default(),
        }
    }
}

/// Labor and hauling for a priced plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticsResult {
    pub worker_days: f64,
    pub crew_size: u32,
    pub build_days: u64,
    pub cargo_tons: f64,
    pub hauling: HaulingPlan,
}

/// Labor and hauling estimate for a priced plan.
pub fn estimate(cost: &CostBreakdown, input: &LogisticsInput) -> FortResult<LogisticsResult> {
    let worker_days = worker_days(cost.final_cost);
    let tons = cargo_tons(cost.base_cost);
    Ok(LogisticsResult {
        worker_days,
        crew_size: input.crew_size,
        build_days: build_days(worker_days, input.crew_size),
        cargo_tons: tons,
        hauling: hauling(tons, &input.hauling)?,
    })
}
