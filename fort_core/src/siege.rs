//! # Siege Engines
//!
//! Armor tracking for named siege engines attached to a plan. Armor starts
//! at 20 and each hit knocks off one point, never going below 11.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{FortError, FortResult};
use crate::resolver::resolve_name;

/// Armor of a fresh or repaired engine
pub const INITIAL_ARMOR: u32 = 20;

/// Armor never drops below this
pub const MIN_ARMOR: u32 = 11;

/// A single engine's armor value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiegeEngine {
    armor: u32,
}

impl SiegeEngine {
    pub fn new() -> Self {
        SiegeEngine { armor: INITIAL_ARMOR }
    }

    pub fn armor(&self) -> u32 {
        self.armor
    }

    /// Take a hit: one point off, clamped at [`MIN_ARMOR`]
    pub fn hit(&mut self) -> u32 {
        self.armor = self.armor.saturating_sub(1).max(MIN_ARMOR);
        self.armor
    }

    pub fn reset(&mut self) -> u32 {
        self.armor = INITIAL_ARMOR;
        self.armor
    }
}

impl Default for SiegeEngine {
    fn default() -> Self {
        SiegeEngine::new()
    }
}

/// What to do with a named engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineAction {
    /// Create (or recreate) at full armor
    New,
    Hit,
    Reset,
    /// Read-only
    Status,
}

impl FromStr for EngineAction {
    type Err = FortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" | "add" => Ok(EngineAction::New),
            "hit" | "damage" => Ok(EngineAction::Hit),
            "reset" | "repair" => Ok(EngineAction::Reset),
            "status" | "show" => Ok(EngineAction::Status),
            _ => Err(FortError::invalid_input(
                "action",
                s,
                "Unknown engine action (expected new, hit, reset or status)",
            )),
        }
    }
}

/// Engine state after an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReport {
    pub name: String,
    pub action: EngineAction,
    pub armor: u32,
}

/// Apply `action` to the engine called `name`.
///
/// `New` uses the name exactly as given; the other actions resolve it
/// tolerantly against the existing engines.
pub fn apply_action(
    engines: &mut BTreeMap<String, SiegeEngine>,
    name: &str,
    action: EngineAction,
) -> FortResult<EngineReport> {
    let name = match action {
        EngineAction::New => {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(FortError::invalid_input("name", name, "Engine name cannot be empty"));
            }
            engines.insert(trimmed.to_string(), SiegeEngine::new());
            trimmed.to_string()
        }
        _ => {
            let names: Vec<&str> = engines.keys().map(String::as_str).collect();
            resolve_name(&names, name, "siege engine")?
        }
    };

    let engine = engines
        .get_mut(&name)
        .ok_or_else(|| FortError::not_found("siege engine", name.as_str()))?;
    let armor = match action {
        EngineAction::Hit => engine.hit(),
        EngineAction::Reset => engine.reset(),
        EngineAction::New | EngineAction::Status => engine.armor(),
    };
    debug!(engine = %name, ?action, armor, "siege engine updated");

    Ok(EngineReport { name, action, armor })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_hits_floor_at_eleven() {
        let mut engine = SiegeEngine::new();
        for _ in 0..10 {
            engine.hit();
        }
        assert_eq!(engine.armor(), 11);
        assert_eq!(engine.hit(), 11);
    }

    #[test]
    fn test_reset_restores_full_armor() {
        let mut engine = SiegeEngine::new();
        engine.hit();
        engine.hit();
        assert_eq!(engine.reset(), INITIAL_ARMOR);
    }

    #[test]
    fn test_apply_action_resolves_names() {
        let mut engines = BTreeMap::new();
        apply_action(&mut engines, "Heavy Trebuchet", EngineAction::New).unwrap();
        apply_action(&mut engines, "Ram", EngineAction::New).unwrap();

        let report = apply_action(&mut engines, "treb", EngineAction::Hit).unwrap();
        assert_eq!(report.name, "Heavy Trebuchet");
        assert_eq!(report.armor, 19);

        let status = apply_action(&mut engines, "ram", EngineAction::Status).unwrap();
        assert_eq!(status.armor, INITIAL_ARMOR);
    }

    #[test]
    fn test_new_on_existing_engine_resets_it() {
        let mut engines = BTreeMap::new();
        apply_action(&mut engines, "Ram", EngineAction::New).unwrap();
        apply_action(&mut engines, "Ram", EngineAction::Hit).unwrap();
        let report = apply_action(&mut engines, "Ram", EngineAction::New).unwrap();
        assert_eq!(report.armor, INITIAL_ARMOR);
        assert_eq!(engines.len(), 1);
    }

    #[test]
    fn test_unknown_engine() {
        let mut engines = BTreeMap::new();
        let err = apply_action(&mut engines, "catapult", EngineAction::Hit).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_engine_serializes_as_number() {
        let json = serde_json::to_string(&SiegeEngine::new()).unwrap();
        assert_eq!(json, "20");
    }
}
