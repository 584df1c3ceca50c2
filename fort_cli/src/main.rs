//! # fort - Fortification Planner CLI
//!
//! Command-line front end over `fort_core`. Every command prints one JSON
//! document on stdout; errors go to stderr as JSON with a stable `code`.
//! Logs go to stderr too (filter with `RUST_LOG`).
//!
//! ```text
//! fort --actor aldric new "North Tower" --type tower
//! fort --actor aldric add-floor circle 40 20 5 softstone --count 3
//! fort --actor aldric roof slate
//! fort --actor aldric summary
//! fort approx rectangle 60 80 hardstone --parapet
//! fort budget 50000 hardstone --roof wood
//! ```
//!
//! Commands that change the store take the store's file lock for the whole
//! load-edit-save cycle.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use fort_core::calculations::{evaluate, logistics, optimizer, roi, summarize, taper};
use fort_core::calculations::{BudgetSearchInput, QuickEstimateInput};
use fort_core::errors::{FortError, FortResult};
use fort_core::geometry::Shape;
use fort_core::materials::{BuildingType, RoofKind, WallMaterial, WallThickness};
use fort_core::plan::{FloorSegment, Plan};
use fort_core::settings::{FortSettings, DEFAULT_LOG_FILTER, DEFAULT_SETTINGS_FILE};
use fort_core::siege::EngineAction;
use fort_core::store::{Namespace, PlanStore};
use fort_core::file_io::load_store_with_lock_check;
use fort_core::{load_store, save_store, FileLock};

/// Plan fortifications and estimate what they cost to build
#[derive(Parser, Debug)]
#[command(name = "fort", version)]
struct Cli {
    /// Realm the plans belong to
    #[arg(long, global = true, default_value = "default")]
    realm: String,

    /// Actor whose plans to work on (defaults to the lock user)
    #[arg(long, global = true)]
    actor: Option<String>,

    /// Settings file
    #[arg(long, global = true, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Store file (overrides the settings)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a plan and select it
    New {
        name: String,
        #[arg(long = "type", default_value_t = BuildingType::Castle)]
        building_type: BuildingType,
    },
    /// Select a plan by (partial) name
    Select { name: String },
    /// List plans, marking the selected one
    List,
    /// Add floors on top of the selected plan
    AddFloor {
        shape: Shape,
        size_ft: u32,
        height_ft: u32,
        thickness_ft: WallThickness,
        material: WallMaterial,
        #[arg(long, default_value_t = 1)]
        count: u32,
        /// 10-ft sections left open for doorways (rectangles only)
        #[arg(long, default_value_t = 0)]
        entrances: u32,
    },
    /// Set the roof (thatch, wood, slate or none)
    Roof { kind: String },
    /// Turn the parapet on or off
    Parapet {
        #[arg(action = ArgAction::Set, value_parser = parse_switch)]
        state: bool,
    },
    /// Set the number of entrances on a floor
    Gate {
        count: u32,
        #[arg(long, default_value_t = 0)]
        floor: usize,
    },
    /// Set the number of windows on a floor
    Window {
        count: u32,
        #[arg(long, default_value_t = 0)]
        floor: usize,
    },
    /// Set the weekly income
    Income { label: String, gp_per_week: f64 },
    /// Set the weekly upkeep
    Upkeep { gp_per_week: f64 },
    /// Set the remoteness multiplier
    Remote { multiplier: f64 },
    /// Set the building type
    Type { building_type: BuildingType },
    /// Describe and price the selected plan
    Summary,
    /// Price a tapered structure without touching the store
    Approx {
        shape: Shape,
        size_ft: u32,
        height_ft: u32,
        material: WallMaterial,
        #[arg(long = "type", default_value_t = BuildingType::Castle)]
        building_type: BuildingType,
        #[arg(long, default_value_t = 1.0)]
        remote: f64,
        #[arg(long)]
        roof: Option<RoofKind>,
        #[arg(long)]
        parapet: bool,
    },
    /// Find the largest structure a budget can buy
    Budget {
        budget_gp: f64,
        material: WallMaterial,
        #[arg(long, default_value_t = Shape::Rectangle)]
        shape: Shape,
        #[arg(long = "type", default_value_t = BuildingType::Castle)]
        building_type: BuildingType,
        #[arg(long, default_value_t = 1.0)]
        remote: f64,
        #[arg(long)]
        roof: Option<RoofKind>,
        #[arg(long)]
        parapet: bool,
        #[arg(long)]
        min: Option<u32>,
        #[arg(long)]
        max: Option<u32>,
        #[arg(long)]
        step: Option<u32>,
    },
    /// Payback time of the selected plan
    Roi,
    /// Labor and hauling for the selected plan
    Logistics {
        #[arg(long)]
        crew: Option<u32>,
        #[arg(long)]
        haulers: Option<u32>,
        #[arg(long)]
        capacity: Option<f64>,
        #[arg(long)]
        trip_days: Option<f64>,
    },
    /// Show the thickness schedule for a height, or rebuild the selected plan with it
    Taper {
        height_ft: u32,
        #[arg(long)]
        apply: bool,
    },
    /// Track a siege engine on the selected plan (new, hit, reset, status)
    Engine { action: EngineAction, name: String },
    /// Delete a plan (or the selected one with "current")
    Delete {
        #[arg(default_value = "current")]
        target: String,
    },
}

fn parse_switch(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Ok(true),
        "off" | "no" | "false" | "0" => Ok(false),
        _ => Err(format!("expected on or off, got '{}'", s)),
    }
}

fn parse_roof(s: &str) -> FortResult<Option<RoofKind>> {
    if s.trim().eq_ignore_ascii_case("none") {
        Ok(None)
    } else {
        s.parse().map(Some)
    }
}

/// Store access for one namespace
struct Session {
    path: PathBuf,
    lock_user: String,
    ns: Namespace,
}

impl Session {
    /// Reads don't wait on the lock, but say so when a writer holds it.
    fn read(&self) -> FortResult<PlanStore> {
        let (store, lock) = load_store_with_lock_check(&self.path)?;
        if let Some(info) = lock {
            warn!(
                holder = %info.user_id,
                machine = %info.machine,
                locked_at = %info.locked_at,
                "store is locked for writing, reading anyway"
            );
        }
        Ok(store)
    }

    fn current(&self) -> FortResult<Plan> {
        self.read()?.current(&self.ns).cloned()
    }

    /// Load, change and save the store under its file lock.
    fn write<T>(&self, change: impl FnOnce(&mut PlanStore, &Namespace) -> FortResult<T>) -> FortResult<T> {
        let _lock = FileLock::acquire(&self.path, self.lock_user.as_str())?;
        let mut store = load_store(&self.path)?;
        let output = change(&mut store, &self.ns)?;
        save_store(&store, &self.path)?;
        Ok(output)
    }

    /// Edit the selected plan and report its new summary
    fn edit(&self, edit: impl FnOnce(&mut Plan) -> FortResult<()>) -> FortResult<Value> {
        self.write(|store, ns| {
            store.edit_current(ns, edit)?;
            to_json(&summarize(store.current(ns)?)?)
        })
    }
}

fn to_json<T: Serialize>(value: &T) -> FortResult<Value> {
    Ok(serde_json::to_value(value)?)
}

fn run(cli: Cli, settings: &FortSettings) -> FortResult<Value> {
    let session = Session {
        path: cli.store.unwrap_or_else(|| settings.store_path.clone()),
        lock_user: settings.lock_user.clone(),
        ns: Namespace::new(cli.realm, cli.actor.unwrap_or_else(|| settings.lock_user.clone())),
    };
    debug!(namespace = %session.ns, store = %session.path.display(), command = ?cli.command, "running");

    match cli.command {
        Command::New { name, building_type } => session.write(|store, ns| {
            store.create(ns, Plan::new(name, building_type))?;
            to_json(&store.list(ns))
        }),
        Command::Select { name } => session.write(|store, ns| {
            let selected = store.select(ns, &name)?;
            Ok(json!({ "selected": selected }))
        }),
        Command::List => to_json(&session.read()?.list(&session.ns)),
        Command::AddFloor {
            shape,
            size_ft,
            height_ft,
            thickness_ft,
            material,
            count,
            entrances,
        } => {
            let mut floor = FloorSegment::new(shape, size_ft, height_ft, thickness_ft, material)?;
            floor.entrances = entrances;
            session.edit(|plan| plan.add_floors(floor, count))
        }
        Command::Roof { kind } => {
            let roof = parse_roof(&kind)?;
            session.edit(|plan| {
                plan.set_roof(roof);
                Ok(())
            })
        }
        Command::Parapet { state } => session.edit(|plan| {
            plan.set_parapet(state);
            Ok(())
        }),
        Command::Gate { count, floor } => session.edit(|plan| plan.set_gates(floor, count)),
        Command::Window { count, floor } => session.edit(|plan| plan.set_windows(floor, count)),
        Command::Income { label, gp_per_week } => session.edit(|plan| plan.set_income(label, gp_per_week)),
        Command::Upkeep { gp_per_week } => session.edit(|plan| plan.set_upkeep(gp_per_week)),
        Command::Remote { multiplier } => session.edit(|plan| plan.set_remote(multiplier)),
        Command::Type { building_type } => session.edit(|plan| {
            plan.set_building_type(building_type);
            Ok(())
        }),
        Command::Summary => to_json(&summarize(&session.current()?)?),
        Command::Approx {
            shape,
            size_ft,
            height_ft,
            material,
            building_type,
            remote,
            roof,
            parapet,
        } => {
            let input = QuickEstimateInput {
                shape,
                size_ft,
                height_ft,
                material,
                building_type,
                remote_multiplier: remote,
                roof,
                parapet,
            };
            to_json(&taper::quick_estimate(&input)?)
        }
        Command::Budget {
            budget_gp,
            material,
            shape,
            building_type,
            remote,
            roof,
            parapet,
            min,
            max,
            step,
        } => {
            let input = BudgetSearchInput {
                shape,
                material,
                building_type,
                remote_multiplier: remote,
                roof,
                parapet,
                budget_gp,
                footprint_min_ft: min.unwrap_or(settings.search.footprint_min),
                footprint_max_ft: max.unwrap_or(settings.search.footprint_max),
                step_ft: step.unwrap_or(settings.search.step),
            };
            Ok(match optimizer::search(&input)? {
                Some(best) => to_json(&best)?,
                None => json!({ "found": false, "budget_gp": budget_gp }),
            })
        }
        Command::Roi => {
            let plan = session.current()?;
            plan.require_floors()?;
            to_json(&roi::roi(&plan, &evaluate(&plan)?))
        }
        Command::Logistics {
            crew,
            haulers,
            capacity,
            trip_days,
        } => {
            let mut input = settings.logistics.logistics_input();
            input.crew_size = crew.unwrap_or(input.crew_size);
            input.hauling.haulers = haulers.unwrap_or(input.hauling.haulers);
            input.hauling.capacity_tons = capacity.unwrap_or(input.hauling.capacity_tons);
            input.hauling.trip_days = trip_days.unwrap_or(input.hauling.trip_days);
            if input.crew_size == 0 {
                return Err(FortError::invalid_input("crew", "0", "Crew size must be positive"));
            }

            let plan = session.current()?;
            plan.require_floors()?;
            to_json(&logistics::estimate(&evaluate(&plan)?, &input)?)
        }
        Command::Taper { height_ft, apply } => {
            if apply {
                session.edit(|plan| plan.taper(height_ft))
            } else {
                taper::validate_height(height_ft)?;
                let feet: Vec<u32> = taper::schedule(height_ft).iter().map(|t| t.feet()).collect();
                Ok(json!({ "height_ft": height_ft, "thickness_ft": feet }))
            }
        }
        Command::Engine { action, name } => {
            if action == EngineAction::Status {
                let mut plan = session.current()?;
                to_json(&plan.engine(&name, action)?)
            } else {
                session.write(|store, ns| {
                    let report = store.edit_current(ns, |plan| plan.engine(&name, action))?;
                    to_json(&report)
                })
            }
        }
        Command::Delete { target } => session.write(|store, ns| {
            let deleted = store.delete(ns, &target)?;
            Ok(json!({
                "deleted": deleted,
                "current": store.current_name(ns),
            }))
        }),
    }
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(error: &FortError) {
    let body = json!({
        "code": error.error_code(),
        "message": error.to_string(),
        "error": error,
    });
    eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_else(|_| error.to_string()));
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match FortSettings::load(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            init_tracing(DEFAULT_LOG_FILTER);
            report(&e);
            return ExitCode::FAILURE;
        }
    };
    init_tracing(&settings.log_filter);

    match run(cli, &settings) {
        Ok(output) => match serde_json::to_string_pretty(&output) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::SUCCESS
            }
            Err(e) => {
                report(&FortError::from(e));
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
