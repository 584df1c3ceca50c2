//! # Return on Investment
//!
//! Weeks until a structure's net weekly income pays back its final cost.

use serde::{Deserialize, Serialize};

use crate::calculations::cost::CostBreakdown;
use crate::plan::Plan;

/// Payback summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub final_cost: f64,
    pub income_label: Option<String>,
    pub weekly_income: f64,
    pub weekly_upkeep: f64,
    pub weekly_net: f64,
    /// `None` when the structure never pays for itself
    pub payback_weeks: Option<u64>,
}

/// Payback for a final cost against weekly income and upkeep
pub fn payback(final_cost: f64, weekly_income: f64, weekly_upkeep: f64) -> Option<u64> {
    let net = weekly_income - weekly_upkeep;
    if net <= 0.0 {
        return None;
    }
    Some((final_cost.max(0.0) / net).ceil() as u64)
}

/// Return on investment for a priced plan.
pub fn roi(plan: &Plan, cost: &CostBreakdown) -> RoiResult {
    let weekly_income = plan.income.as_ref().map_or(0.0, |i| i.gp_per_week);
    let weekly_upkeep = plan.upkeep_gp_per_week;
    RoiResult {
        final_cost: cost.final_cost,
        income_label: plan.income.as_ref().map(|i| i.label.clone()),
        weekly_income,
        weekly_upkeep,
        weekly_net: weekly_income - weekly_upkeep,
        payback_weeks: payback(cost.final_cost, weekly_income, weekly_upkeep),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::BuildingType;

    #[test]
    fn test_payback_rounds_up() {
        assert_eq!(payback(10092.0, 150.0, 50.0), Some(101));
        assert_eq!(payback(10000.0, 150.0, 50.0), Some(100));
    }

    #[test]
    fn test_no_payback_without_profit() {
        assert_eq!(payback(10000.0, 50.0, 50.0), None);
        assert_eq!(payback(10000.0, 0.0, 10.0), None);
    }

    #[test]
    fn test_roi_reads_plan_finances() {
        let mut plan = Plan::new("Toll Tower", BuildingType::Tower);
        plan.set_income("tolls", 300.0).unwrap();
        plan.set_upkeep(100.0).unwrap();
        let cost = CostBreakdown {
            final_cost: 30276.0,
            ..CostBreakdown::default()
        };
        let result = roi(&plan, &cost);
        assert_eq!(result.income_label.as_deref(), Some("tolls"));
        assert_eq!(result.weekly_net, 200.0);
        assert_eq!(result.payback_weeks, Some(152));
    }
}
