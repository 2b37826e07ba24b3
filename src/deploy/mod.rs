// ABOUTME: Blue/Green deployment state machine, planner and orchestrator.
// ABOUTME: The model derives state from RDS; the manager applies planned actions.

mod action;
mod error;
mod manager;
mod model;
mod plan;
mod state;
mod validate;

pub use action::{Action, ActionKind};
pub use error::{DeployError, DeployErrorKind};
pub use manager::{BlueGreenManager, Outcome};
pub use model::{DeploymentModel, Snapshot, derive_state, is_deployment_available};
pub use plan::allowed_next_states;
pub use state::{DeploymentStatus, State};
pub use validate::{
    LOGICAL_REPLICATION_PARAMETER, PendingPrepare, is_major_upgrade, requires_logical_replication,
    resolved_target_version, supports_major_upgrade,
};
