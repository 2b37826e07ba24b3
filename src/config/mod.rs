// ABOUTME: Configuration types and parsing for the reconciliation input file.
// ABOUTME: Handles YAML/JSON parsing, file discovery and defaults.

mod blue_green;
mod wait;

pub use blue_green::{BlueGreenConfig, ParameterGroupRef, TargetSpec};
pub use wait::WaitConfig;

use crate::error::{Error, Result};
use crate::types::DbInstanceId;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_INPUT_PATH: &str = "/inputs/input.json";
pub const CONFIG_FILENAME: &str = "rds-bluegreen.yml";
pub const CONFIG_FILENAME_ALT: &str = "rds-bluegreen.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Source DB instance; also used as the Blue/Green deployment name.
    pub identifier: DbInstanceId,

    pub region: String,

    /// Desired deletion protection, as the apply stage will enforce it.
    #[serde(default)]
    pub deletion_protection: Option<bool>,

    #[serde(default)]
    pub tags: BTreeMap<String, String>,

    #[serde(default)]
    pub blue_green_deployment: Option<BlueGreenConfig>,

    #[serde(default)]
    pub wait: WaitConfig,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|source| Error::InputUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_ALT)];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// A missing `blue_green_deployment` section means "not enabled".
    pub fn blue_green(&self) -> BlueGreenConfig {
        self.blue_green_deployment.clone().unwrap_or_default()
    }

    pub fn is_blue_green_enabled(&self) -> bool {
        self.blue_green_deployment
            .as_ref()
            .is_some_and(|bg| bg.enabled)
    }
}
