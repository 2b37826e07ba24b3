// ABOUTME: Lifecycle states of a Blue/Green deployment and RDS status parsing.
// ABOUTME: State is a closed enum; deployment status strings map onto it.

use super::error::DeployError;
use serde::Serialize;
use std::fmt;

/// Where a Blue/Green deployment is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Init,
    NotEnabled,
    NoOp,
    /// Waiting on a prerequisite the pipeline's apply stage will create.
    PendingPrepare,
    Provisioning,
    Available,
    SwitchoverInProgress,
    SwitchoverCompleted,
    DeletingSourceDbInstances,
    SourceDbInstancesDeleted,
    Deleting,
}

impl State {
    #[cfg(test)]
    const ALL: [State; 11] = [
        State::Init,
        State::NotEnabled,
        State::NoOp,
        State::PendingPrepare,
        State::Provisioning,
        State::Available,
        State::SwitchoverInProgress,
        State::SwitchoverCompleted,
        State::DeletingSourceDbInstances,
        State::SourceDbInstancesDeleted,
        State::Deleting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            State::Init => "init",
            State::NotEnabled => "not_enabled",
            State::NoOp => "no_op",
            State::PendingPrepare => "pending_prepare",
            State::Provisioning => "provisioning",
            State::Available => "available",
            State::SwitchoverInProgress => "switchover_in_progress",
            State::SwitchoverCompleted => "switchover_completed",
            State::DeletingSourceDbInstances => "deleting_source_db_instances",
            State::SourceDbInstancesDeleted => "source_db_instances_deleted",
            State::Deleting => "deleting",
        }
    }

    /// True when the rest of the pipeline may run as if no deployment existed.
    pub fn lets_pipeline_continue(self) -> bool {
        matches!(self, State::NotEnabled | State::NoOp | State::PendingPrepare)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status RDS reports for a Blue/Green deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentStatus {
    Provisioning,
    Available,
    SwitchoverInProgress,
    SwitchoverCompleted,
    Deleting,
}

impl DeploymentStatus {
    /// Parse an RDS status string. RDS reports upper-case values; any casing
    /// is accepted. Other statuses (e.g. `SWITCHOVER_FAILED`) are rejected.
    pub fn parse(status: &str) -> Result<Self, DeployError> {
        const KNOWN: [(&str, DeploymentStatus); 5] = [
            ("PROVISIONING", DeploymentStatus::Provisioning),
            ("AVAILABLE", DeploymentStatus::Available),
            ("SWITCHOVER_IN_PROGRESS", DeploymentStatus::SwitchoverInProgress),
            ("SWITCHOVER_COMPLETED", DeploymentStatus::SwitchoverCompleted),
            ("DELETING", DeploymentStatus::Deleting),
        ];

        KNOWN
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(status))
            .map(|(_, parsed)| *parsed)
            .ok_or_else(|| DeployError::UnexpectedStatus(status.to_string()))
    }
}
