// ABOUTME: Ordered preconditions checked before any action is planned.
// ABOUTME: Each validator either passes, reports a pending prepare, or fails.

use super::error::DeployError;
use super::state::State;
use crate::config::BlueGreenConfig;
use crate::gateway::{DbInstance, UpgradeTargets};
use crate::types::EngineVersion;
use serde::Serialize;
use std::fmt;

/// Parameter that must be enabled on the source for a postgres major upgrade.
pub const LOGICAL_REPLICATION_PARAMETER: &str = "rds.logical_replication";

/// Oldest minor release per postgres major that supports Blue/Green major
/// upgrades. Majors above the last entry are always supported.
const POSTGRES_MINIMUM_MINOR: [(u32, u32); 6] =
    [(11, 21), (12, 16), (13, 12), (14, 9), (15, 4), (16, 1)];

/// MySQL `major.minor` series that support Blue/Green major upgrades.
const MYSQL_SUPPORTED_SERIES: [(u32, u32); 3] = [(5, 7), (8, 0), (8, 4)];

/// A precondition that a later pipeline stage is expected to satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPrepare {
    /// The target parameter group is declared but not created yet.
    TargetParameterGroup,
    /// Deletion protection is on but the desired configuration turns it off.
    DeletionProtection,
}

impl fmt::Display for PendingPrepare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingPrepare::TargetParameterGroup => f.write_str("target_parameter_group"),
            PendingPrepare::DeletionProtection => f.write_str("deletion_protection"),
        }
    }
}

/// Outcome of a single validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Check {
    Pass,
    Pending(PendingPrepare),
}

/// Everything the validators look at. Immutable while they run.
#[derive(Debug)]
pub(crate) struct Candidate<'a> {
    pub state: State,
    pub config: &'a BlueGreenConfig,
    pub desired_deletion_protection: Option<bool>,
    pub instance: &'a DbInstance,
    pub target_parameter_group_found: bool,
    pub valid_upgrade_targets: &'a UpgradeTargets,
    pub logical_replication: Option<&'a str>,
}

pub(crate) type Validator = fn(&Candidate<'_>) -> Result<Check, DeployError>;

/// Run order matters: the first failure is the one reported.
pub(crate) const VALIDATORS: &[Validator] = &[
    target_parameter_group,
    deletion_protection,
    backup_retention_period,
    target_engine_version,
    major_upgrade_supported,
    parameter_groups_in_sync,
    logical_replication,
];

/// Run every validator in order, stopping at the first failure.
pub(crate) fn run(candidate: &Candidate<'_>) -> Result<Vec<PendingPrepare>, DeployError> {
    let mut pending = Vec::new();
    for validator in VALIDATORS {
        if let Check::Pending(p) = validator(candidate)? {
            pending.push(p);
        }
    }
    Ok(pending)
}

/// The engine version the green environment will run.
pub fn resolved_target_version<'a>(config: &'a BlueGreenConfig, instance: &'a DbInstance) -> &'a str {
    config
        .target
        .as_ref()
        .and_then(|t| t.engine_version.as_deref())
        .unwrap_or(&instance.engine_version)
}

/// True when the resolved target is flagged as a major upgrade.
pub fn is_major_upgrade(
    config: &BlueGreenConfig,
    instance: &DbInstance,
    targets: &UpgradeTargets,
) -> bool {
    targets
        .get(resolved_target_version(config, instance))
        .is_some_and(|t| t.is_major_version_upgrade)
}

/// Whether the logical replication parameter has to be looked up.
pub fn requires_logical_replication(
    config: &BlueGreenConfig,
    instance: &DbInstance,
    targets: &UpgradeTargets,
) -> bool {
    instance.engine == "postgres" && is_major_upgrade(config, instance, targets)
}

fn target_parameter_group(c: &Candidate<'_>) -> Result<Check, DeployError> {
    let Some(group) = c.config.target.as_ref().and_then(|t| t.parameter_group.as_ref()) else {
        return Ok(Check::Pass);
    };
    if c.target_parameter_group_found {
        return Ok(Check::Pass);
    }
    if group.is_managed() && c.state == State::Init {
        return Ok(Check::Pending(PendingPrepare::TargetParameterGroup));
    }
    Err(DeployError::ParameterGroupNotFound(group.name.clone()))
}

fn deletion_protection(c: &Candidate<'_>) -> Result<Check, DeployError> {
    if !c.instance.deletion_protection {
        return Ok(Check::Pass);
    }
    if c.desired_deletion_protection == Some(false) && c.state == State::Init {
        return Ok(Check::Pending(PendingPrepare::DeletionProtection));
    }
    Err(DeployError::precondition("deletion_protection must be disabled"))
}

fn backup_retention_period(c: &Candidate<'_>) -> Result<Check, DeployError> {
    if c.instance.backup_retention_period <= 0 {
        return Err(DeployError::precondition(
            "backup_retention_period must be greater than 0",
        ));
    }
    Ok(Check::Pass)
}

fn target_engine_version(c: &Candidate<'_>) -> Result<Check, DeployError> {
    let target = resolved_target_version(c.config, c.instance);
    if c.valid_upgrade_targets.contains_key(target) {
        return Ok(Check::Pass);
    }
    let valid: Vec<&str> = c.valid_upgrade_targets.keys().map(String::as_str).collect();
    Err(DeployError::precondition(format!(
        "target engine_version {target} is not valid, valid versions: {}",
        valid.join(", ")
    )))
}

fn major_upgrade_supported(c: &Candidate<'_>) -> Result<Check, DeployError> {
    if !is_major_upgrade(c.config, c.instance, c.valid_upgrade_targets) {
        return Ok(Check::Pass);
    }

    let engine = c.instance.engine.as_str();
    let current = c.instance.engine_version.as_str();
    let supported = EngineVersion::parse(current)
        .map(|v| supports_major_upgrade(engine, &v))
        .unwrap_or(false);

    if supported {
        Ok(Check::Pass)
    } else {
        Err(DeployError::precondition(format!(
            "{engine} engine_version {current} is not supported for blue/green deployment"
        )))
    }
}

/// Per-engine rule for the *current* version of a major upgrade source.
pub fn supports_major_upgrade(engine: &str, current: &EngineVersion) -> bool {
    match engine {
        "postgres" => {
            let last_listed = POSTGRES_MINIMUM_MINOR
                .last()
                .map(|(major, _)| *major)
                .unwrap_or(0);
            if current.major() > last_listed {
                return true;
            }
            POSTGRES_MINIMUM_MINOR
                .iter()
                .find(|(major, _)| *major == current.major())
                .is_some_and(|(_, min_minor)| current.minor() >= *min_minor)
        }
        "mysql" => MYSQL_SUPPORTED_SERIES
            .iter()
            .any(|(major, minor)| current.same_minor_series(*major, *minor)),
        _ => false,
    }
}

fn parameter_groups_in_sync(c: &Candidate<'_>) -> Result<Check, DeployError> {
    let out_of_sync: Vec<String> = c
        .instance
        .parameter_groups
        .iter()
        .filter(|pg| !pg.is_in_sync())
        .map(|pg| format!("{} ({})", pg.name, pg.apply_status))
        .collect();

    if out_of_sync.is_empty() {
        Ok(Check::Pass)
    } else {
        Err(DeployError::precondition(format!(
            "Source Parameter Group status is not in-sync: {}",
            out_of_sync.join(", ")
        )))
    }
}

fn logical_replication(c: &Candidate<'_>) -> Result<Check, DeployError> {
    if !requires_logical_replication(c.config, c.instance, c.valid_upgrade_targets) {
        return Ok(Check::Pass);
    }
    if c.logical_replication == Some("1") {
        return Ok(Check::Pass);
    }
    Err(DeployError::precondition(format!(
        "Source Parameter Group {LOGICAL_REPLICATION_PARAMETER} must be 1 for major version upgrade"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version(v: &str) -> EngineVersion {
        EngineVersion::parse(v).unwrap()
    }

    #[test]
    fn postgres_minimums_per_major() {
        for ok in ["17.1", "16.1", "16.2", "15.4", "14.10", "13.12", "12.16", "11.22"] {
            assert!(supports_major_upgrade("postgres", &version(ok)), "{ok}");
        }
        for rejected in ["16.0", "15.3", "14.8", "13.11", "12.15", "11.20", "10.23"] {
            assert!(
                !supports_major_upgrade("postgres", &version(rejected)),
                "{rejected}"
            );
        }
    }

    #[test]
    fn mysql_requires_exact_series() {
        for ok in ["5.7.44", "8.0.32", "8.4.3"] {
            assert!(supports_major_upgrade("mysql", &version(ok)), "{ok}");
        }
        for rejected in ["5.5.1", "5.6.2", "8.1.0"] {
            assert!(!supports_major_upgrade("mysql", &version(rejected)), "{rejected}");
        }
    }

    #[test]
    fn other_engines_are_rejected() {
        assert!(!supports_major_upgrade("mariadb", &version("10.11")));
    }
}
