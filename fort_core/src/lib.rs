//! # fort_core - Fortification Planning and Cost Engine
//!
//! `fort_core` prices stone, brick and timber strongholds floor by floor,
//! schedules wall thickness by height, estimates labor and hauling, and
//! searches for the biggest structure a budget can buy. Plans live in a
//! store keyed by realm and actor. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Quick Start
//!
//! ```rust
//! use fort_core::calculations::{evaluate, quick_estimate, QuickEstimateInput};
//! use fort_core::geometry::Shape;
//! use fort_core::materials::{BuildingType, WallMaterial, WallThickness};
//! use fort_core::plan::{FloorSegment, Plan};
//!
//! let mut plan = Plan::new("Keep", BuildingType::Castle);
//! plan.add_floor(FloorSegment::new(Shape::Rectangle, 50, 20, WallThickness::Ten, WallMaterial::Hardstone)?)?;
//!
//! let cost = evaluate(&plan)?;
//! assert_eq!(cost.final_cost, 10092.0);
//!
//! let tower = quick_estimate(&QuickEstimateInput {
//!     shape: Shape::Circle,
//!     size_ft: 40,
//!     height_ft: 60,
//!     material: WallMaterial::Softstone,
//!     building_type: BuildingType::Tower,
//!     remote_multiplier: 1.0,
//!     roof: None,
//!     parapet: true,
//! })?;
//! assert!(!tower.has_structural_warning());
//! # Ok::<(), fort_core::errors::FortError>(())
//! ```
//!
//! ## Modules
//!
//! - [`plan`] - Plans and their floor segments
//! - [`calculations`] - Cost, taper, logistics, budget search, ROI, summary
//! - [`materials`] - Wall, roof and building-type catalogs
//! - [`geometry`] - Wall sections and floor areas
//! - [`store`] - Named plans per realm and actor
//! - [`resolver`] - Partial and fuzzy name matching
//! - [`siege`] - Siege-engine armor tracking
//! - [`settings`] - TOML settings
//! - [`errors`] - Structured error types
//! - [`file_io`] - Store persistence with atomic saves and locking

pub mod calculations;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod geometry;
pub mod materials;
pub mod plan;
pub mod resolver;
pub mod settings;
pub mod siege;
pub mod store;

// Re-export commonly used types at crate root for convenience
pub use errors::{FortError, FortResult};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_store, save_store, FileLock};
pub use plan::{FloorSegment, Plan};
pub use settings::FortSettings;
pub use store::{Namespace, PlanStore};
