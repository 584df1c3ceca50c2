//! # Calculations
//!
//! Everything that turns a plan into numbers. Each calculation follows the
//! pattern:
//!
//! - `*Input` - parameters (JSON-serializable)
//! - `*Result` / breakdown - results (JSON-serializable)
//! - a pure function `fn(&input) -> FortResult<result>`
//!
//! Nothing in here touches the plan store; all of it is safe to share
//! between threads.
//!
//! ## Available Calculations
//!
//! - [`cost`] - Cost pipeline (walls, floors, roof, parapet, multipliers)
//! - [`taper`] - Default thickness per course, quick estimates
//! - [`logistics`] - Worker-days, build duration, cargo and hauling
//! - [`optimizer`] - Largest floor area within a budget
//! - [`roi`] - Payback time from weekly income and upkeep
//! - [`summary`] - A plan's description and costs in one record

pub mod cost;
pub mod logistics;
pub mod optimizer;
pub mod roi;
pub mod summary;
pub mod taper;

// Re-export commonly used types
pub use cost::{evaluate, CostBreakdown, FloorCost};
pub use logistics::{HaulingInput, HaulingPlan, LogisticsInput, LogisticsResult};
pub use optimizer::{BudgetCandidate, BudgetSearchInput};
pub use roi::RoiResult;
pub use summary::{summarize, PlanSummary};
pub use taper::{quick_estimate, QuickEstimateInput};
