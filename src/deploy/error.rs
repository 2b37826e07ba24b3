// ABOUTME: Error types for Blue/Green reconciliation.
// ABOUTME: Validation, planning, wait and gateway failures with a kind accessor.

use super::state::State;
use crate::gateway::GatewayError;
use crate::rerun::RerunError;
use crate::types::DbInstanceId;
use crate::wait::WaitError;
use std::time::Duration;

/// Errors that abort a reconciliation pass.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("DB Instance not found: {0}")]
    InstanceNotFound(DbInstanceId),

    #[error("Target Parameter Group not found: {0}")]
    ParameterGroupNotFound(String),

    /// The deployment vanished while an action still needed it.
    #[error("Blue/Green Deployment not found: {0}")]
    DeploymentNotFound(String),

    /// A precondition on the source instance or requested target failed.
    #[error("{0}")]
    Precondition(String),

    /// The planner routed to a state its transition table does not allow.
    #[error("Invalid next state: {next} for state: {from}")]
    InvalidTransition { from: State, next: State },

    #[error("Unexpected Blue/Green Deployment status: {0}")]
    UnexpectedStatus(String),

    #[error("Condition not met within the timeout period: {} seconds.", .0.as_secs())]
    Timeout(Duration),

    #[error("reconciliation cancelled by shutdown signal")]
    Cancelled,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Rerun(#[from] RerunError),
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    NotFound,
    Precondition,
    InvalidTransition,
    UnexpectedStatus,
    Timeout,
    Cancelled,
    Cloud,
    Rerun,
}

impl DeployError {
    pub fn precondition(message: impl Into<String>) -> Self {
        DeployError::Precondition(message.into())
    }

    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::InstanceNotFound(_)
            | DeployError::ParameterGroupNotFound(_)
            | DeployError::DeploymentNotFound(_) => DeployErrorKind::NotFound,
            DeployError::Precondition(_) => DeployErrorKind::Precondition,
            DeployError::InvalidTransition { .. } => DeployErrorKind::InvalidTransition,
            DeployError::UnexpectedStatus(_) => DeployErrorKind::UnexpectedStatus,
            DeployError::Timeout(_) => DeployErrorKind::Timeout,
            DeployError::Cancelled => DeployErrorKind::Cancelled,
            DeployError::Gateway(_) => DeployErrorKind::Cloud,
            DeployError::Rerun(_) => DeployErrorKind::Rerun,
        }
    }
}

impl From<WaitError> for DeployError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::Timeout { timeout } => DeployError::Timeout(timeout),
            WaitError::Cancelled => DeployError::Cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_errors_map_to_kinds() {
        let timeout: DeployError = WaitError::Timeout {
            timeout: Duration::from_secs(5),
        }
        .into();
        assert_eq!(timeout.kind(), DeployErrorKind::Timeout);
        assert_eq!(
            timeout.to_string(),
            "Condition not met within the timeout period: 5 seconds."
        );

        let cancelled: DeployError = WaitError::Cancelled.into();
        assert_eq!(cancelled.kind(), DeployErrorKind::Cancelled);
    }

    #[test]
    fn invalid_transition_names_both_states() {
        let err = DeployError::InvalidTransition {
            from: State::Init,
            next: State::Deleting,
        };
        assert_eq!(err.to_string(), "Invalid next state: deleting for state: init");
        assert_eq!(err.kind(), DeployErrorKind::InvalidTransition);
    }
}
