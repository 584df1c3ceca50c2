//! # Settings
//!
//! Per-installation defaults read from a TOML file (`fort.toml` unless told
//! otherwise). Every field has a default, so a missing file or a partial
//! one is fine:
//!
//! ```toml
//! store_path = "/srv/fort/fortifications.json"
//! log_filter = "fort_core=debug"
//!
//! [logistics]
//! crew_size = 250
//! haulers = 4
//!
//! [search]
//! footprint_max = 300
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::logistics::{HaulingInput, LogisticsInput};
use crate::errors::{FortError, FortResult};
use crate::plan::MAX_SIZE_FT;

/// Settings file looked for in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "fort.toml";

/// Store file used when no path is configured
pub const DEFAULT_STORE_FILE: &str = "fortifications.json";

pub const DEFAULT_LOG_FILTER: &str = "fort_core=info,fort=info";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FortSettings {
    pub store_path: PathBuf,
    pub log_filter: String,
    /// Name recorded in lock files
    pub lock_user: String,
    pub logistics: LogisticsSettings,
    pub search: SearchSettings,
}

impl Default for FortSettings {
    fn default() -> Self {
        FortSettings {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            lock_user: default_lock_user(),
            logistics: LogisticsSettings::default(),
            search: SearchSettings::default(),
        }
    }
}

fn default_lock_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "fort".to_string())
}

/// Crew and hauling defaults for logistics estimates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticsSettings {
    pub crew_size: u32,
    pub hauler_capacity_tons: f64,
    pub haulers: u32,
    pub trip_days: f64,
}

impl Default for LogisticsSettings {
    fn default() -> Self {
        let hauling = HaulingInput::default();
        LogisticsSettings {
            crew_size: LogisticsInput::default().crew_size,
            hauler_capacity_tons: hauling.capacity_tons,
            haulers: hauling.haulers,
            trip_days: hauling.trip_days,
        }
    }
}

impl LogisticsSettings {
    pub fn hauling_input(&self) -> HaulingInput {
        HaulingInput {
            capacity_tons: self.hauler_capacity_tons,
            haulers: self.haulers,
            trip_days: self.trip_days,
        }
    }

    pub fn logistics_input(&self) -> LogisticsInput {
        LogisticsInput {
            crew_size: self.crew_size,
            hauling: self.hauling_input(),
        }
    }
}

/// Footprint range walked by the budget optimizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub footprint_min: u32,
    pub footprint_max: u32,
    pub step: u32,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            footprint_min: 20,
            footprint_max: 200,
            step: 10,
        }
    }
}

impl FortSettings {
    /// Load settings from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> FortResult<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(FortError::file_error("read", path.display().to_string(), e.to_string()));
            }
        };
        let settings: FortSettings = toml::from_str(&contents)
            .map_err(|e| FortError::serialization(format!("Invalid settings in {}: {}", path.display(), e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> FortResult<Self> {
        let settings: FortSettings = toml::from_str(toml_str).map_err(|e| FortError::serialization(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> FortResult<()> {
        if self.logistics.crew_size == 0 {
            return Err(FortError::invalid_input(
                "logistics.crew_size",
                "0",
                "Crew size must be positive",
            ));
        }
        self.logistics.hauling_input().validate()?;
        if self.search.step == 0 {
            return Err(FortError::invalid_input("search.step", "0", "Step must be positive"));
        }
        if self.search.footprint_min == 0 || self.search.footprint_min > self.search.footprint_max {
            return Err(FortError::invalid_input(
                "search.footprint_min",
                self.search.footprint_min.to_string(),
                format!("Must be between 1 and footprint_max ({})", self.search.footprint_max),
            ));
        }
        if self.search.footprint_max > MAX_SIZE_FT {
            return Err(FortError::invalid_input(
                "search.footprint_max",
                self.search.footprint_max.to_string(),
                format!("Cannot exceed {} ft", MAX_SIZE_FT),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let settings = FortSettings::from_toml("").unwrap();
        assert_eq!(settings.store_path, PathBuf::from("fortifications.json"));
        assert_eq!(settings.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(settings.logistics.crew_size, 100);
        assert_eq!(settings.logistics.hauler_capacity_tons, 10.0);
        assert_eq!(settings.search, SearchSettings::default());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let settings = FortSettings::from_toml(
            r#"
            store_path = "/srv/fort/plans.json"

            [logistics]
            crew_size = 250

            [search]
            footprint_max = 300
            "#,
        )
        .unwrap();
        assert_eq!(settings.store_path, PathBuf::from("/srv/fort/plans.json"));
        assert_eq!(settings.logistics.crew_size, 250);
        assert_eq!(settings.logistics.haulers, 1);
        assert_eq!(settings.search.footprint_min, 20);
        assert_eq!(settings.search.footprint_max, 300);

        let input = settings.logistics.logistics_input();
        assert_eq!(input.crew_size, 250);
        assert_eq!(input.hauling.trip_days, 1.0);
    }

    #[test]
    fn test_malformed_toml_is_serialization_error() {
        let err = FortSettings::from_toml("store_path = ").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(FortSettings::from_toml("[logistics]\ncrew_size = 0").is_err());
        assert!(FortSettings::from_toml("[search]\nstep = 0").is_err());
        assert!(FortSettings::from_toml("[search]\nfootprint_min = 500").is_err());
        assert!(FortSettings::from_toml("[search]\nfootprint_max = 5000").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join(format!("fort_settings_missing_{}.toml", std::process::id()));
        let _ = fs::remove_file(&path);
        assert_eq!(FortSettings::load(&path).unwrap().search, SearchSettings::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("fort_settings_{}.toml", std::process::id()));
        fs::write(&path, "lock_user = \"aldric\"\n").unwrap();
        let settings = FortSettings::load(&path).unwrap();
        assert_eq!(settings.lock_user, "aldric");
        let _ = fs::remove_file(&path);
    }
}
