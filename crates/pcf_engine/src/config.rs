use crate::error::PcfError;
use crate::fit::{FitMode, FitModel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Engine defaults, loadable from TOML. Missing keys take their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub evaluation: EvaluationSettings,
    pub dynamics: DynamicsSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    /// Depth used for limits when the caller gives none
    pub depth: u64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self { depth: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsSettings {
    pub depth: u64,
    /// Attempts per metric in `compute_dynamics`
    pub max_iters: u32,
    /// Depth increment between `compute_dynamics` attempts
    pub depth_shift: u64,
    /// Depth increment between delta retries on an infinite result
    pub shift_step: u64,
    pub max_shift: u64,
    pub q_reduced_mode: FitMode,
    pub convergence_model: FitModel,
}

impl Default for DynamicsSettings {
    fn default() -> Self {
        Self {
            depth: 2000,
            max_iters: 5,
            depth_shift: 100,
            shift_step: 5,
            max_shift: 10,
            q_reduced_mode: FitMode::Full,
            convergence_model: FitModel::Full,
        }
    }
}

impl EngineConfig {
    /// Read `path`, falling back to defaults (with a warning) when the file
    /// is missing or malformed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            warn!(path = %path.display(), "config file not found, using defaults");
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, PcfError> {
        toml::from_str(content).map_err(|e| PcfError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, PcfError> {
        toml::to_string_pretty(self).map_err(|e| PcfError::Config(e.to_string()))
    }
}
