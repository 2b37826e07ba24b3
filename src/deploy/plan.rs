// ABOUTME: Action planner: routes each lifecycle state to its next action.
// ABOUTME: Exhaustive over State; every routed transition is checked against the allowed set.

use super::action::{Action, ActionKind};
use super::error::DeployError;
use super::model::DeploymentModel;
use super::state::State;
use crate::gateway::CreateDeploymentRequest;

/// States each state may route to. Empty means the state never routes.
pub fn allowed_next_states(state: State) -> &'static [State] {
    match state {
        State::Init => &[State::NoOp, State::Provisioning],
        State::Provisioning => &[State::Available],
        State::Available => &[State::SwitchoverInProgress, State::Deleting],
        State::SwitchoverInProgress => &[State::SwitchoverCompleted],
        State::SwitchoverCompleted => &[State::DeletingSourceDbInstances],
        State::DeletingSourceDbInstances => &[State::SourceDbInstancesDeleted],
        State::SourceDbInstancesDeleted => &[State::Deleting],
        State::Deleting => &[State::NoOp],
        State::NotEnabled | State::NoOp | State::PendingPrepare => &[],
    }
}

impl DeploymentModel {
    /// Plan the actions that take the deployment from its current state to
    /// the next terminal or blocking point. No-op actions are not returned.
    pub fn plan_actions(&self) -> Result<Vec<Action>, DeployError> {
        self.plan_with(|state| self.route(state))
    }

    pub(crate) fn plan_with<R>(&self, mut router: R) -> Result<Vec<Action>, DeployError>
    where
        R: FnMut(State) -> Option<Action>,
    {
        let mut state = self.state();
        let mut actions = Vec::new();

        while state != State::NoOp {
            let Some(action) = router(state) else {
                break;
            };
            if !allowed_next_states(state).contains(&action.next_state) {
                return Err(DeployError::InvalidTransition {
                    from: state,
                    next: action.next_state,
                });
            }
            state = action.next_state;
            if action.kind != ActionKind::NoOp {
                actions.push(action);
            }
        }

        Ok(actions)
    }

    /// The action leaving `state`, or `None` when the pass should stop there.
    pub fn route(&self, state: State) -> Option<Action> {
        let config = self.config();
        match state {
            State::Init => {
                if self.is_cleanup_only() {
                    Some(Action::new(ActionKind::NoOp, State::NoOp))
                } else {
                    Some(Action::new(
                        ActionKind::Create(self.create_request()),
                        State::Provisioning,
                    ))
                }
            }
            State::Provisioning => Some(Action::new(ActionKind::WaitForAvailable, State::Available)),
            State::Available => {
                if config.switchover {
                    Some(Action::new(ActionKind::Switchover, State::SwitchoverInProgress))
                } else if config.delete {
                    Some(Action::new(ActionKind::DeleteWithoutSwitchover, State::Deleting))
                } else {
                    None
                }
            }
            State::SwitchoverInProgress => Some(Action::new(
                ActionKind::WaitForSwitchoverCompleted,
                State::SwitchoverCompleted,
            )),
            State::SwitchoverCompleted => config.delete.then(|| {
                Action::new(
                    ActionKind::DeleteSourceDbInstance,
                    State::DeletingSourceDbInstances,
                )
            }),
            State::DeletingSourceDbInstances => Some(Action::new(
                ActionKind::WaitForSourceDbInstancesDeleted,
                State::SourceDbInstancesDeleted,
            )),
            State::SourceDbInstancesDeleted => Some(Action::new(ActionKind::Delete, State::Deleting)),
            State::Deleting => Some(Action::new(ActionKind::WaitForDeleted, State::NoOp)),
            State::NotEnabled | State::NoOp | State::PendingPrepare => None,
        }
    }

    /// Sparse create request: only explicitly set target fields are sent.
    pub fn create_request(&self) -> CreateDeploymentRequest {
        let mut request =
            CreateDeploymentRequest::new(self.identifier().as_str(), &self.instance().arn)
                .with_tags(self.tags());

        if let Some(target) = self.config().target.as_ref() {
            request.allocated_storage = target.allocated_storage;
            request.engine_version = target.engine_version.clone();
            request.instance_class = target.instance_class.clone();
            request.iops = target.iops;
            request.parameter_group_name = target.parameter_group_name().map(str::to_string);
            request.storage_throughput = target.storage_throughput;
            request.storage_type = target.storage_type.clone();
        }
        request
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::deploy::model::Snapshot;
    use crate::gateway::{DbInstance, ParameterGroupStatus, UpgradeTarget, UpgradeTargets};
    use crate::types::DbInstanceId;

    fn model() -> DeploymentModel {
        let config = Config::from_yaml(
            "identifier: test-rds\nregion: us-east-1\nblue_green_deployment:\n  enabled: true\n",
        )
        .unwrap();
        let instance = DbInstance {
            identifier: DbInstanceId::new("test-rds"),
            arn: "some-arn".to_string(),
            status: "available".to_string(),
            deletion_protection: false,
            backup_retention_period: 7,
            engine: "postgres".to_string(),
            engine_version: "15.7".to_string(),
            instance_class: "db.t4g.micro".to_string(),
            storage_type: Some("gp3".to_string()),
            storage_throughput: Some(125),
            allocated_storage: Some(20),
            iops: Some(3000),
            parameter_groups: vec![ParameterGroupStatus {
                name: "test-rds-pg15".to_string(),
                apply_status: "in-sync".to_string(),
            }],
        };
        let targets = UpgradeTargets::from([(
            "15.7".to_string(),
            UpgradeTarget {
                is_major_version_upgrade: false,
            },
        )]);
        DeploymentModel::new(
            &config,
            Snapshot {
                instance: Some(instance),
                valid_upgrade_targets: targets,
                ..Snapshot::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn router_outside_allowed_set_is_rejected() {
        let model = model();
        let err = model
            .plan_with(|_| Some(Action::new(ActionKind::Delete, State::Deleting)))
            .unwrap_err();

        assert!(matches!(
            err,
            DeployError::InvalidTransition {
                from: State::Init,
                next: State::Deleting
            }
        ));
    }

    #[test]
    fn planner_stops_at_no_op_without_emitting_it() {
        let model = model();
        let actions = model
            .plan_with(|_| Some(Action::new(ActionKind::NoOp, State::NoOp)))
            .unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn settled_states_never_route() {
        let model = model();
        for state in [State::NotEnabled, State::NoOp, State::PendingPrepare] {
            assert!(model.route(state).is_none());
            assert!(allowed_next_states(state).is_empty());
        }
    }
}
