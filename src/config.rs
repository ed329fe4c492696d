//! TOML-based scenario configuration.
//!
//! All fields have defaults matching the baseline scenario (two residents,
//! January weekday, household totals only). Recoverable problems — an
//! out-of-range month or household size — are clamped with a warning; a
//! malformed file or unknown day type is fatal.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::sim::types::{DayType, MAX_RESIDENTS};

/// Top-level scenario configuration parsed from TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Simulation day parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Output location and granularity.
    #[serde(default)]
    pub output: OutputConfig,
    /// Input table location.
    #[serde(default)]
    pub data: DataConfig,
}

/// Simulation day parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Month of the year to simulate (1-12).
    pub month: i32,
    /// Number of residents in the household (1-5).
    pub residents: i32,
    /// Day category: `"weekday"` or `"weekend"`.
    pub day_type: String,
    /// Random seed; omitted means OS entropy (non-reproducible).
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            month: 1,
            residents: 2,
            day_type: "weekday".to_string(),
            seed: None,
        }
    }
}

/// Output location and granularity.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// `"total"` writes one summed row per engine; `"per_entity"` writes one
    /// row per appliance and bulb.
    pub detail: String,
    /// Directory for the result files.
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            detail: "total".to_string(),
            dir: ".".to_string(),
        }
    }
}

/// Input table location.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Directory holding the CSV tables; omitted means the built-in demo
    /// dataset.
    pub dir: Option<String>,
}

/// A configuration validation failure.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.day_type"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

/// Output granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detail {
    /// One summed household row per engine.
    Total,
    /// One row per appliance and per bulb.
    PerEntity,
}

/// Validated, clamped settings consumed by the runner.
#[derive(Debug, Clone)]
pub struct Settings {
    pub month: u32,
    pub residents: u8,
    pub day_type: DayType,
    pub detail: Detail,
    pub seed: Option<u64>,
}

impl ScenarioConfig {
    /// Returns the baseline scenario: two residents, January weekday,
    /// totals-only output, demo tables.
    pub fn baseline() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            output: OutputConfig::default(),
            data: DataConfig::default(),
        }
    }

    /// Parses a scenario from a TOML string.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Parses a scenario from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "file".to_string(),
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Fatal validation: problems clamping cannot repair.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let day = self.simulation.day_type.as_str();
        if day != "weekday" && day != "weekend" {
            errors.push(ConfigError {
                field: "simulation.day_type".into(),
                message: format!("must be \"weekday\" or \"weekend\", got \"{day}\""),
            });
        }
        let detail = self.output.detail.as_str();
        if detail != "total" && detail != "per_entity" {
            errors.push(ConfigError {
                field: "output.detail".into(),
                message: format!("must be \"total\" or \"per_entity\", got \"{detail}\""),
            });
        }
        errors
    }

    /// Converts to runner settings, clamping recoverable out-of-range values.
    /// Returns the settings together with one warning per clamped field; the
    /// run proceeds.
    ///
    /// Call [`ScenarioConfig::validate`] first; this panics on field values
    /// validation rejects.
    pub fn settings(&self) -> (Settings, Vec<String>) {
        let mut warnings = Vec::new();

        let month = if (1..=12).contains(&self.simulation.month) {
            self.simulation.month as u32
        } else {
            warnings.push(format!(
                "invalid month {} specified, defaulting to 1 (January)",
                self.simulation.month
            ));
            1
        };

        let residents = if (1..=i32::from(MAX_RESIDENTS)).contains(&self.simulation.residents) {
            self.simulation.residents as u8
        } else {
            let clamped = self.simulation.residents.clamp(1, i32::from(MAX_RESIDENTS)) as u8;
            warnings.push(format!(
                "{} residents specified, only 1 to {MAX_RESIDENTS} supported, clamping to {clamped}",
                self.simulation.residents
            ));
            clamped
        };

        let day_type = match self.simulation.day_type.as_str() {
            "weekday" => DayType::Weekday,
            "weekend" => DayType::Weekend,
            other => panic!("unvalidated day type \"{other}\""),
        };

        let detail = match self.output.detail.as_str() {
            "total" => Detail::Total,
            "per_entity" => Detail::PerEntity,
            other => panic!("unvalidated detail \"{other}\""),
        };

        (
            Settings {
                month,
                residents,
                day_type,
                detail,
                seed: self.simulation.seed,
            },
            warnings,
        )
    }
}
