// ABOUTME: In-memory RdsOps implementation for orchestrator tests.
// ABOUTME: Scripted describe responses and recorded calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use rds_bluegreen::gateway::{
    BlueGreenDeployment, CreateDeploymentRequest, DbInstance, DbParameterGroup, GatewayError,
    RdsOps, UpgradeTargets,
};
use rds_bluegreen::types::{DbInstanceId, DeploymentId};
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// A call made against the mock, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    DescribeInstance(String),
    DescribeDeployment(String),
    DescribeParameterGroup(String),
    DescribeUpgradeTargets(String, String),
    DescribeParameter(String, String),
    Create(CreateDeploymentRequest),
    Switchover(String, Option<Duration>),
    DeleteDeployment(String, Option<bool>),
    DeleteInstance(String),
}

impl Call {
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Call::Create(_)
                | Call::Switchover(..)
                | Call::DeleteDeployment(..)
                | Call::DeleteInstance(_)
        )
    }
}

/// Responses returned in order; the last one repeats forever.
#[derive(Debug, Default)]
struct Script<T>(VecDeque<T>);

impl<T: Clone> Script<T> {
    fn new(items: Vec<T>) -> Self {
        Self(items.into())
    }

    fn next(&mut self) -> Option<T> {
        if self.0.len() > 1 {
            self.0.pop_front()
        } else {
            self.0.front().cloned()
        }
    }
}

#[derive(Debug, Default)]
pub struct MockRds {
    instances: Mutex<HashMap<String, Script<Option<DbInstance>>>>,
    deployment: Mutex<Script<Option<BlueGreenDeployment>>>,
    parameter_groups: Mutex<HashMap<String, DbParameterGroup>>,
    upgrade_targets: Mutex<UpgradeTargets>,
    parameters: Mutex<HashMap<(String, String), String>>,
    failing_operation: Mutex<Option<&'static str>>,
    calls: Mutex<Vec<Call>>,
}

impl MockRds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instance under both its identifier and its ARN.
    pub fn with_instance(self, instance: DbInstance) -> Self {
        {
            let mut instances = self.instances.lock();
            instances.insert(
                instance.identifier.as_str().to_string(),
                Script::new(vec![Some(instance.clone())]),
            );
            instances.insert(instance.arn.clone(), Script::new(vec![Some(instance)]));
        }
        self
    }

    /// Successive describe results for one identifier or ARN.
    pub fn with_instance_sequence(self, key: &str, responses: Vec<Option<DbInstance>>) -> Self {
        self.instances
            .lock()
            .insert(key.to_string(), Script::new(responses));
        self
    }

    pub fn with_deployment(self, deployment: BlueGreenDeployment) -> Self {
        self.with_deployment_sequence(vec![Some(deployment)])
    }

    /// Successive describe results for the deployment.
    pub fn with_deployment_sequence(self, responses: Vec<Option<BlueGreenDeployment>>) -> Self {
        *self.deployment.lock() = Script::new(responses);
        self
    }

    pub fn with_parameter_group(self, group: DbParameterGroup) -> Self {
        self.parameter_groups
            .lock()
            .insert(group.name.clone(), group);
        self
    }

    pub fn with_upgrade_targets(self, targets: UpgradeTargets) -> Self {
        *self.upgrade_targets.lock() = targets;
        self
    }

    pub fn with_parameter(self, group: &str, name: &str, value: &str) -> Self {
        self.parameters
            .lock()
            .insert((group.to_string(), name.to_string()), value.to_string());
        self
    }

    /// Make every call to `operation` fail with an API error.
    pub fn failing(self, operation: &'static str) -> Self {
        *self.failing_operation.lock() = Some(operation);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn mutating_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutating).collect()
    }

    fn record(&self, operation: &'static str, call: Call) -> Result<(), GatewayError> {
        self.calls.lock().push(call);
        if *self.failing_operation.lock() == Some(operation) {
            return Err(GatewayError::Api {
                operation,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RdsOps for MockRds {
    async fn describe_db_instance(&self, id: &str) -> Result<Option<DbInstance>, GatewayError> {
        self.record("DescribeDBInstances", Call::DescribeInstance(id.to_string()))?;
        Ok(self
            .instances
            .lock()
            .get_mut(id)
            .and_then(|script| script.next())
            .flatten())
    }

    async fn describe_blue_green_deployment(
        &self,
        name: &str,
    ) -> Result<Option<BlueGreenDeployment>, GatewayError> {
        self.record(
            "DescribeBlueGreenDeployments",
            Call::DescribeDeployment(name.to_string()),
        )?;
        Ok(self.deployment.lock().next().flatten())
    }

    async fn describe_db_parameter_group(
        &self,
        name: &str,
    ) -> Result<Option<DbParameterGroup>, GatewayError> {
        self.record(
            "DescribeDBParameterGroups",
            Call::DescribeParameterGroup(name.to_string()),
        )?;
        Ok(self.parameter_groups.lock().get(name).cloned())
    }

    async fn describe_valid_upgrade_targets(
        &self,
        engine: &str,
        engine_version: &str,
    ) -> Result<UpgradeTargets, GatewayError> {
        self.record(
            "DescribeDBEngineVersions",
            Call::DescribeUpgradeTargets(engine.to_string(), engine_version.to_string()),
        )?;
        Ok(self.upgrade_targets.lock().clone())
    }

    async fn describe_db_parameter(
        &self,
        group: &str,
        parameter: &str,
    ) -> Result<Option<String>, GatewayError> {
        self.record(
            "DescribeDBParameters",
            Call::DescribeParameter(group.to_string(), parameter.to_string()),
        )?;
        Ok(self
            .parameters
            .lock()
            .get(&(group.to_string(), parameter.to_string()))
            .cloned())
    }

    async fn create_blue_green_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<DeploymentId, GatewayError> {
        self.record("CreateBlueGreenDeployment", Call::Create(request.clone()))?;
        Ok(DeploymentId::new("bgd-created"))
    }

    async fn switchover_blue_green_deployment(
        &self,
        id: &DeploymentId,
        timeout: Option<Duration>,
    ) -> Result<(), GatewayError> {
        self.record(
            "SwitchoverBlueGreenDeployment",
            Call::Switchover(id.as_str().to_string(), timeout),
        )
    }

    async fn delete_blue_green_deployment(
        &self,
        id: &DeploymentId,
        delete_target: Option<bool>,
    ) -> Result<(), GatewayError> {
        self.record(
            "DeleteBlueGreenDeployment",
            Call::DeleteDeployment(id.as_str().to_string(), delete_target),
        )
    }

    async fn delete_db_instance(&self, id: &DbInstanceId) -> Result<(), GatewayError> {
        self.record("DeleteDBInstance", Call::DeleteInstance(id.as_str().to_string()))
    }
}
