//! # Plan Store
//!
//! Named plans per owning actor, with a "current plan" pointer.
//!
//! ## Structure
//!
//! ```text
//! PlanStore
//! ├── meta: StoreMetadata (version, timestamps)
//! └── realms: realm → actor → ActorPlans
//!                             ├── current: Option<String>
//!                             └── plans: name → Plan
//! ```
//!
//! Every operation takes the [`Namespace`] it works on; there is no
//! ambient "current actor". The store does no locking of its own: callers
//! must serialize edits to the same namespace (the CLI holds a
//! [`FileLock`](crate::file_io::FileLock) around each load-edit-save).
//!
//! ## Example
//!
//! ```rust
//! use fort_core::materials::BuildingType;
//! use fort_core::plan::Plan;
//! use fort_core::store::{Namespace, PlanStore};
//!
//! let mut store = PlanStore::new();
//! let ns = Namespace::new("westmarch", "aldric");
//!
//! store.create(&ns, Plan::new("North Tower", BuildingType::Tower))?;
//! store.create(&ns, Plan::new("Keep", BuildingType::Castle))?;
//!
//! assert_eq!(store.select(&ns, "north")?, "North Tower");
//! store.edit_current(&ns, |plan| {
//!     plan.set_parapet(true);
//!     Ok(())
//! })?;
//! assert!(store.current(&ns)?.parapet);
//! # Ok::<(), fort_core::errors::FortError>(())
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{FortError, FortResult};
use crate::plan::Plan;
use crate::resolver::resolve_name;

/// Current schema version for store files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Keyword accepted by [`PlanStore::delete`] for the selected plan
pub const CURRENT_KEYWORD: &str = "current";

/// Realm + actor pair that owns a set of plans
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Namespace {
    pub realm: String,
    pub actor: String,
}

impl Namespace {
    pub fn new(realm: impl Into<String>, actor: impl Into<String>) -> Self {
        Namespace {
            realm: realm.into(),
            actor: actor.into(),
        }
    }

    fn no_selection(&self) -> FortError {
        FortError::NoPlanSelected {
            realm: self.realm.clone(),
            actor: self.actor.clone(),
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.realm, self.actor)
    }
}

/// One actor's plans
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorPlans {
    /// Selected plan; always a key of `plans` when set
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub plans: BTreeMap<String, Plan>,
}

impl ActorPlans {
    fn names(&self) -> Vec<&str> {
        self.plans.keys().map(String::as_str).collect()
    }

    fn resolve(&self, query: &str) -> FortResult<String> {
        resolve_name(&self.names(), query, "plan")
    }

    /// Point `current` at a real plan, or clear it.
    fn repair_selection(&mut self) -> bool {
        match &self.current {
            Some(name) if self.plans.contains_key(name) => false,
            None if self.plans.is_empty() => false,
            _ => {
                self.current = self.plans.keys().next().cloned();
                true
            }
        }
    }
}

/// Store file header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Entry returned by [`PlanStore::list`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanListing {
    pub name: String,
    pub current: bool,
    pub floors: usize,
}

/// Root container for all plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStore {
    pub meta: StoreMetadata,
    #[serde(default)]
    pub realms: BTreeMap<String, BTreeMap<String, ActorPlans>>,
}

impl PlanStore {
    pub fn new() -> Self {
        let now = Utc::now();
        PlanStore {
            meta: StoreMetadata {
                version: SCHEMA_VERSION.to_string(),
                created: now,
                modified: now,
            },
            realms: BTreeMap::new(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Plans owned by `ns`, if it has any
    pub fn namespace(&self, ns: &Namespace) -> Option<&ActorPlans> {
        self.realms.get(&ns.realm).and_then(|actors| actors.get(&ns.actor))
    }

    fn namespace_mut(&mut self, ns: &Namespace) -> Option<&mut ActorPlans> {
        self.realms
            .get_mut(&ns.realm)
            .and_then(|actors| actors.get_mut(&ns.actor))
    }

    fn namespace_entry(&mut self, ns: &Namespace) -> &mut ActorPlans {
        self.realms
            .entry(ns.realm.clone())
            .or_default()
            .entry(ns.actor.clone())
            .or_default()
    }

    /// Add a new plan and select it. Fails if the name is taken.
    pub fn create(&mut self, ns: &Namespace, mut plan: Plan) -> FortResult<()> {
        let name = plan.name.trim().to_string();
        if name.is_empty() {
            return Err(FortError::invalid_input("name", &plan.name, "Plan name cannot be empty"));
        }
        if name.eq_ignore_ascii_case(CURRENT_KEYWORD) {
            return Err(FortError::invalid_input("name", &plan.name, "'current' is reserved"));
        }
        plan.validate()?;

        let actor = self.namespace_entry(ns);
        if actor.plans.contains_key(&name) {
            return Err(FortError::already_exists("plan", name));
        }
        plan.name = name.clone();
        actor.plans.insert(name.clone(), plan);
        actor.current = Some(name.clone());
        self.touch();

        info!(namespace = %ns, plan = %name, "plan created");
        Ok(())
    }

    /// Resolve a (possibly partial) plan name without changing anything
    pub fn resolve(&self, ns: &Namespace, query: &str) -> FortResult<String> {
        match self.namespace(ns) {
            Some(actor) => actor.resolve(query),
            None => Err(FortError::not_found("plan", query)),
        }
    }

    /// Make the plan matching `query` current. Returns its full name.
    pub fn select(&mut self, ns: &Namespace, query: &str) -> FortResult<String> {
        let actor = self
            .namespace_mut(ns)
            .ok_or_else(|| FortError::not_found("plan", query))?;
        let name = actor.resolve(query)?;
        actor.current = Some(name.clone());
        self.touch();

        info!(namespace = %ns, plan = %name, "plan selected");
        Ok(name)
    }

    pub fn current_name(&self, ns: &Namespace) -> Option<&str> {
        self.namespace(ns).and_then(|actor| actor.current.as_deref())
    }

    /// The selected plan
    pub fn current(&self, ns: &Namespace) -> FortResult<&Plan> {
        let name = self.current_name(ns).ok_or_else(|| ns.no_selection())?;
        self.namespace(ns)
            .and_then(|actor| actor.plans.get(name))
            .ok_or_else(|| FortError::not_found("plan", name))
    }

    /// The plan matching `query`
    pub fn get(&self, ns: &Namespace, query: &str) -> FortResult<&Plan> {
        let name = self.resolve(ns, query)?;
        self.namespace(ns)
            .and_then(|actor| actor.plans.get(&name))
            .ok_or_else(|| FortError::not_found("plan", query))
    }

    /// Apply `edit` to the selected plan.
    ///
    /// The edit runs on a copy; the stored plan only changes if it
    /// returns `Ok`, so a failed edit leaves nothing half-applied.
    pub fn edit_current<T>(
        &mut self,
        ns: &Namespace,
        edit: impl FnOnce(&mut Plan) -> FortResult<T>,
    ) -> FortResult<T> {
        let actor = self.namespace_mut(ns).ok_or_else(|| ns.no_selection())?;
        let name = actor.current.clone().ok_or_else(|| ns.no_selection())?;
        let stored = actor
            .plans
            .get_mut(&name)
            .ok_or_else(|| FortError::not_found("plan", name.as_str()))?;

        let mut draft = stored.clone();
        let output = edit(&mut draft)?;
        *stored = draft;
        self.touch();

        debug!(namespace = %ns, plan = %name, "plan edited");
        Ok(output)
    }

    /// Remove a plan by (partial) name, or the selected one with `"current"`.
    ///
    /// If the removed plan was selected, selection moves to a remaining
    /// plan or is cleared. Returns the removed plan's name.
    pub fn delete(&mut self, ns: &Namespace, target: &str) -> FortResult<String> {
        let actor = self
            .namespace_mut(ns)
            .ok_or_else(|| FortError::not_found("plan", target))?;

        let name = if target.trim().eq_ignore_ascii_case(CURRENT_KEYWORD) {
            actor.current.clone().ok_or_else(|| ns.no_selection())?
        } else {
            actor.resolve(target)?
        };

        actor.plans.remove(&name);
        if actor.current.as_deref() == Some(name.as_str()) {
            actor.current = None;
        }
        actor.repair_selection();
        let emptied = actor.plans.is_empty();

        if emptied {
            if let Some(actors) = self.realms.get_mut(&ns.realm) {
                actors.remove(&ns.actor);
                if actors.is_empty() {
                    self.realms.remove(&ns.realm);
                }
            }
        }
        self.touch();

        info!(namespace = %ns, plan = %name, "plan deleted");
        Ok(name)
    }

    /// Plans in `ns`, sorted by name
    pub fn list(&self, ns: &Namespace) -> Vec<PlanListing> {
        self.namespace(ns)
            .map(|actor| {
                actor
                    .plans
                    .iter()
                    .map(|(name, plan)| PlanListing {
                        name: name.clone(),
                        current: actor.current.as_deref() == Some(name.as_str()),
                        floors: plan.floors.len(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Fix selection pointers that name missing plans (e.g. after a
    /// hand-edited file). Returns how many namespaces were repaired.
    pub fn repair_selections(&mut self) -> usize {
        let mut repaired = 0;
        for (realm, actors) in self.realms.iter_mut() {
            for (actor_id, actor) in actors.iter_mut() {
                if actor.repair_selection() {
                    warn!(realm = %realm, actor = %actor_id, "dangling plan selection repaired");
                    repaired += 1;
                }
            }
        }
        repaired
    }
}

impl Default for PlanStore {
    fn default() -> Self {
        PlanStore::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::materials::{BuildingType, RoofKind, WallMaterial, WallThickness};
    use crate::plan::FloorSegment;

    fn ns() -> Namespace {
        Namespace::new("westmarch", "aldric")
    }

    fn store_with(names: &[&str]) -> PlanStore {
        let mut store = PlanStore::new();
        for name in names {
            store.create(&ns(), Plan::new(*name, BuildingType::Castle)).unwrap();
        }
        store
    }

    #[test]
    fn test_create_selects_new_plan() {
        let store = store_with(&["Keep", "Gatehouse"]);
        assert_eq!(store.current_name(&ns()), Some("Gatehouse"));
        assert_eq!(store.list(&ns()).len(), 2);
    }

    #[test]
    fn test_create_rejects_duplicates_and_blank_names() {
        let mut store = store_with(&["Keep"]);
        let err = store.create(&ns(), Plan::new("Keep", BuildingType::Tower)).unwrap_err();
        assert_eq!(err.error_code(), "ALREADY_EXISTS");
        assert!(store.create(&ns(), Plan::new("  ", BuildingType::Tower)).is_err());
        assert!(store.create(&ns(), Plan::new("Current", BuildingType::Tower)).is_err());
    }

    #[test]
    fn test_namespaces_are_isolated() {
        let mut store = store_with(&["Keep"]);
        let other = Namespace::new("westmarch", "brenna");
        store.create(&other, Plan::new("Keep", BuildingType::Temple)).unwrap();
        assert_eq!(store.current(&ns()).unwrap().building_type, BuildingType::Castle);
        assert_eq!(store.current(&other).unwrap().building_type, BuildingType::Temple);
        assert!(store.resolve(&Namespace::new("eastmarch", "aldric"), "Keep").is_err());
    }

    #[test]
    fn test_select_with_partial_name() {
        let mut store = store_with(&["North Tower", "South Tower", "Keep"]);
        assert_eq!(store.select(&ns(), "north").unwrap(), "North Tower");
        assert_eq!(store.current_name(&ns()), Some("North Tower"));

        match store.select(&ns(), "tower").unwrap_err() {
            FortError::Ambiguous { suggestions, .. } => {
                assert_eq!(suggestions, vec!["North Tower", "South Tower"])
            }
            other => panic!("expected ambiguous, got {:?}", other),
        }
        assert_eq!(store.select(&ns(), "zzzzzz").unwrap_err().error_code(), "NOT_FOUND");
        // failed selects leave the selection alone
        assert_eq!(store.current_name(&ns()), Some("North Tower"));
    }

    #[test]
    fn test_edit_without_selection_fails() {
        let mut store = PlanStore::new();
        let err = store
            .edit_current(&ns(), |plan| {
                plan.set_parapet(true);
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err.error_code(), "NO_PLAN_SELECTED");
    }

    #[test]
    fn test_failed_edit_is_not_applied() {
        let mut store = store_with(&["Keep"]);
        let floor = FloorSegment::new(Shape::Rectangle, 50, 20, WallThickness::Ten, WallMaterial::Hardstone).unwrap();
        let result = store.edit_current(&ns(), |plan| {
            plan.add_floor(floor.clone())?;
            plan.set_roof(Some(RoofKind::Slate));
            plan.set_remote(-1.0)
        });
        assert!(result.is_err());
        let plan = store.current(&ns()).unwrap();
        assert!(plan.floors.is_empty());
        assert!(plan.roof.is_none());
    }

    #[test]
    fn test_delete_current_moves_selection_to_remaining_plan() {
        let mut store = store_with(&["Keep", "Gatehouse", "Chapel"]);
        assert_eq!(store.current_name(&ns()), Some("Chapel"));

        assert_eq!(store.delete(&ns(), "current").unwrap(), "Chapel");
        let current = store.current_name(&ns()).unwrap().to_string();
        assert!(current == "Keep" || current == "Gatehouse");
        assert!(store.current(&ns()).is_ok());
    }

    #[test]
    fn test_delete_other_plan_keeps_selection() {
        let mut store = store_with(&["Keep", "Gatehouse"]);
        store.delete(&ns(), "keep").unwrap();
        assert_eq!(store.current_name(&ns()), Some("Gatehouse"));
    }

    #[test]
    fn test_delete_last_plan_clears_selection() {
        let mut store = store_with(&["Keep"]);
        store.delete(&ns(), "Keep").unwrap();
        assert!(store.current_name(&ns()).is_none());
        assert!(store.list(&ns()).is_empty());
        assert_eq!(store.current(&ns()).unwrap_err().error_code(), "NO_PLAN_SELECTED");
        assert!(store.realms.is_empty());
    }

    #[test]
    fn test_repair_dangling_selection() {
        let mut store = store_with(&["Keep", "Gatehouse"]);
        store
            .realms
            .get_mut("westmarch")
            .unwrap()
            .get_mut("aldric")
            .unwrap()
            .current = Some("Ghost".to_string());
        assert_eq!(store.repair_selections(), 1);
        assert_eq!(store.current_name(&ns()), Some("Gatehouse"));
    }

    #[test]
    fn test_store_serialization_layout() {
        let store = store_with(&["Keep"]);
        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"realms\":{\"westmarch\":{\"aldric\":{\"current\":\"Keep\""));
        let roundtrip: PlanStore = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.current_name(&ns()), Some("Keep"));
    }
}
