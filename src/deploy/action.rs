// ABOUTME: Planned actions produced by the deployment model.
// ABOUTME: Each action names the RDS operation to run and the state it leads to.

use super::state::State;
use crate::gateway::CreateDeploymentRequest;
use serde::Serialize;
use serde::ser::SerializeStruct;
use std::fmt;

/// What an action does. Only `Create` carries a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionKind {
    NoOp,
    Create(CreateDeploymentRequest),
    WaitForAvailable,
    Switchover,
    WaitForSwitchoverCompleted,
    DeleteSourceDbInstance,
    WaitForSourceDbInstancesDeleted,
    DeleteWithoutSwitchover,
    Delete,
    WaitForDeleted,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::NoOp => "no_op",
            ActionKind::Create(_) => "create",
            ActionKind::WaitForAvailable => "wait_for_available",
            ActionKind::Switchover => "switchover",
            ActionKind::WaitForSwitchoverCompleted => "wait_for_switchover_completed",
            ActionKind::DeleteSourceDbInstance => "delete_source_db_instance",
            ActionKind::WaitForSourceDbInstancesDeleted => "wait_for_source_db_instances_deleted",
            ActionKind::DeleteWithoutSwitchover => "delete_without_switchover",
            ActionKind::Delete => "delete",
            ActionKind::WaitForDeleted => "wait_for_deleted",
        }
    }

    /// Name used in action log lines; mutating kinds use the RDS API name.
    pub fn operation(&self) -> &'static str {
        match self {
            ActionKind::NoOp => "NoOp",
            ActionKind::Create(_) => "CreateBlueGreenDeployment",
            ActionKind::WaitForAvailable => "WaitForAvailable",
            ActionKind::Switchover => "SwitchoverBlueGreenDeployment",
            ActionKind::WaitForSwitchoverCompleted => "WaitForSwitchoverCompleted",
            ActionKind::DeleteSourceDbInstance => "DeleteSourceDBInstance",
            ActionKind::WaitForSourceDbInstancesDeleted => "WaitForSourceDBInstancesDeleted",
            ActionKind::DeleteWithoutSwitchover | ActionKind::Delete => "DeleteBlueGreenDeployment",
            ActionKind::WaitForDeleted => "WaitForDeleted",
        }
    }
}

/// A planned step and the state reached once it has been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub next_state: State,
}

impl Action {
    pub fn new(kind: ActionKind, next_state: State) -> Self {
        Self { kind, next_state }
    }

    pub fn payload(&self) -> Option<&CreateDeploymentRequest> {
        match &self.kind {
            ActionKind::Create(request) => Some(request),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.kind.as_str(), self.next_state)
    }
}

// Serialized as {"type", "next_state", "payload"?} for JSON output.
impl Serialize for Action {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload = self.payload();
        let len = if payload.is_some() { 3 } else { 2 };

        let mut state = serializer.serialize_struct("Action", len)?;
        state.serialize_field("type", self.kind.as_str())?;
        state.serialize_field("next_state", &self.next_state)?;
        if let Some(payload) = payload {
            state.serialize_field("payload", payload)?;
        }
        state.end()
    }
}
