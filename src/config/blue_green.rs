// ABOUTME: Blue/Green deployment request settings from the input file.
// ABOUTME: TargetSpec is a sparse patch: unset fields keep the instance's current value.

use serde::Deserialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BlueGreenConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Promote the green environment once it is available.
    #[serde(default)]
    pub switchover: bool,

    /// Tear the deployment down (after switchover, or instead of it).
    #[serde(default)]
    pub delete: bool,

    #[serde(default)]
    pub target: Option<TargetSpec>,
}

/// Overrides applied to the green environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TargetSpec {
    #[serde(default)]
    pub engine_version: Option<String>,

    #[serde(default)]
    pub instance_class: Option<String>,

    #[serde(default)]
    pub iops: Option<i32>,

    #[serde(default)]
    pub parameter_group: Option<ParameterGroupRef>,

    #[serde(default)]
    pub storage_type: Option<String>,

    #[serde(default)]
    pub storage_throughput: Option<i32>,

    #[serde(default)]
    pub allocated_storage: Option<i32>,
}

impl TargetSpec {
    pub fn parameter_group_name(&self) -> Option<&str> {
        self.parameter_group.as_ref().map(|pg| pg.name.as_str())
    }
}

/// Reference to the parameter group the green environment should use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ParameterGroupRef {
    pub name: String,

    /// Set when the group is declared alongside the instance, so a later
    /// pipeline stage creates it if it does not exist yet.
    #[serde(default)]
    pub family: Option<String>,
}

impl ParameterGroupRef {
    pub fn is_managed(&self) -> bool {
        self.family.is_some()
    }
}
