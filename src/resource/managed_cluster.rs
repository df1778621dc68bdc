//! Managed Kubernetes cluster and its credential query

use anyhow::{Result, bail};
use declarative::{DeclarationKind, Input, Inputs, Resource};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentPoolMode {
    System,
    User,
}

impl AgentPoolMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "System",
            Self::User => "User",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OsType {
    Linux,
    Windows,
}

impl OsType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "Linux",
            Self::Windows => "Windows",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentPoolType {
    VirtualMachineScaleSets,
    AvailabilitySet,
}

impl AgentPoolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VirtualMachineScaleSets => "VirtualMachineScaleSets",
            Self::AvailabilitySet => "AvailabilitySet",
        }
    }
}

/// Node pool specification
///
/// Every field is known at declaration time, so the whole profile is sent as
/// one literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPoolProfile {
    pub name: String,
    pub count: u32,
    pub min_count: u32,
    pub max_count: u32,
    pub max_pods: u32,
    pub enable_auto_scaling: bool,
    pub mode: AgentPoolMode,
    #[serde(default)]
    pub node_labels: BTreeMap<String, String>,
    #[serde(rename = "osDiskSizeGB")]
    pub os_disk_size_gb: u32,
    pub os_type: OsType,
    #[serde(rename = "type")]
    pub pool_type: AgentPoolType,
    pub vm_size: String,
}

impl AgentPoolProfile {
    /// Wire form of the profile, the same shape serde produces
    pub fn to_value(&self) -> Value {
        let labels: Map<String, Value> = self
            .node_labels
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v.as_str())))
            .collect();
        let fields = [
            ("name", Value::from(self.name.as_str())),
            ("count", Value::from(self.count)),
            ("minCount", Value::from(self.min_count)),
            ("maxCount", Value::from(self.max_count)),
            ("maxPods", Value::from(self.max_pods)),
            ("enableAutoScaling", Value::from(self.enable_auto_scaling)),
            ("mode", Value::from(self.mode.as_str())),
            ("nodeLabels", Value::Object(labels)),
            ("osDiskSizeGB", Value::from(self.os_disk_size_gb)),
            ("osType", Value::from(self.os_type.as_str())),
            ("type", Value::from(self.pool_type.as_str())),
            ("vmSize", Value::from(self.vm_size.as_str())),
        ];
        Value::Object(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    /// `min_count <= count <= max_count`
    pub fn check_bounds(&self) -> Result<()> {
        if self.min_count > self.max_count {
            bail!(
                "agent pool '{}': minCount {} exceeds maxCount {}",
                self.name,
                self.min_count,
                self.max_count
            );
        }
        if !(self.min_count..=self.max_count).contains(&self.count) {
            bail!(
                "agent pool '{}': count {} outside [{}, {}]",
                self.name,
                self.count,
                self.min_count,
                self.max_count
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct LinuxProfile {
    pub admin_username: String,
    pub ssh_public_keys: Vec<Input>,
}

impl LinuxProfile {
    fn to_input(&self) -> Input {
        let keys = self
            .ssh_public_keys
            .iter()
            .map(|key| Input::object([("keyData", key.clone())]));
        Input::object([
            ("adminUsername", self.admin_username.as_str().into()),
            (
                "ssh",
                Input::object([("publicKeys", Input::list(keys))]),
            ),
        ])
    }
}

/// Cluster autoscaler knobs; the API takes these flags as strings
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoScalerProfile {
    pub skip_nodes_with_local_storage: bool,
    pub skip_nodes_with_system_pods: bool,
}

impl AutoScalerProfile {
    fn to_input(self) -> Input {
        Input::object([
            (
                "skipNodesWithLocalStorage",
                self.skip_nodes_with_local_storage.to_string().into(),
            ),
            (
                "skipNodesWithSystemPods",
                self.skip_nodes_with_system_pods.to_string().into(),
            ),
        ])
    }
}

#[derive(Debug, Clone)]
pub struct ServicePrincipalProfile {
    pub client_id: Input,
    pub secret: Input,
}

#[derive(Debug, Clone)]
pub struct ManagedCluster {
    pub name: String,
    pub resource_group_name: Input,
    pub agent_pool_profiles: Vec<AgentPoolProfile>,
    pub enable_rbac: bool,
    pub kubernetes_version: String,
    pub linux_profile: LinuxProfile,
    pub auto_scaler_profile: AutoScalerProfile,
    pub dns_prefix: Input,
    pub service_principal_profile: ServicePrincipalProfile,
    pub node_resource_group: String,
}

impl ManagedCluster {
    pub const TYPE: &'static str = "azure-native:containerservice:ManagedCluster";
}

impl Resource for ManagedCluster {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        let pools: Vec<Value> = self
            .agent_pool_profiles
            .iter()
            .map(AgentPoolProfile::to_value)
            .collect();
        Inputs::from([
            (
                "resourceGroupName".to_string(),
                self.resource_group_name.clone(),
            ),
            ("agentPoolProfiles".to_string(), Input::literal(pools)),
            ("enableRBAC".to_string(), self.enable_rbac.into()),
            (
                "kubernetesVersion".to_string(),
                self.kubernetes_version.as_str().into(),
            ),
            ("linuxProfile".to_string(), self.linux_profile.to_input()),
            (
                "autoScalerProfile".to_string(),
                self.auto_scaler_profile.to_input(),
            ),
            ("dnsPrefix".to_string(), self.dns_prefix.clone()),
            (
                "servicePrincipalProfile".to_string(),
                Input::object([
                    ("clientId", self.service_principal_profile.client_id.clone()),
                    ("secret", self.service_principal_profile.secret.clone()),
                ]),
            ),
            (
                "nodeResourceGroup".to_string(),
                self.node_resource_group.as_str().into(),
            ),
        ])
    }
}

/// Read-only query for a cluster's user kubeconfigs
///
/// The result's `kubeconfigs[*].value` entries are base64 encoded.
#[derive(Debug, Clone)]
pub struct ListManagedClusterUserCredentials {
    pub name: String,
    pub resource_group_name: Input,
    pub resource_name: Input,
}

impl ListManagedClusterUserCredentials {
    pub const TYPE: &'static str =
        "azure-native:containerservice:listManagedClusterUserCredentials";
}

impl Resource for ListManagedClusterUserCredentials {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn kind(&self) -> DeclarationKind {
        DeclarationKind::Invoke
    }

    fn inputs(&self) -> Inputs {
        Inputs::from([
            (
                "resourceGroupName".to_string(),
                self.resource_group_name.clone(),
            ),
            ("resourceName".to_string(), self.resource_name.clone()),
        ])
    }

    fn secret_outputs(&self) -> &'static [&'static str] {
        &["kubeconfigs"]
    }
}

/// Parse the agent pools back out of a cluster's declared inputs
pub fn agent_pools(inputs: &Inputs) -> Result<Vec<AgentPoolProfile>> {
    let Some(value) = inputs.get("agentPoolProfiles").and_then(Input::as_literal) else {
        return Ok(Vec::new());
    };
    Ok(serde_json::from_value(value.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(count: u32, min_count: u32, max_count: u32) -> AgentPoolProfile {
        AgentPoolProfile {
            name: "default".into(),
            count,
            min_count,
            max_count,
            max_pods: 110,
            enable_auto_scaling: true,
            mode: AgentPoolMode::System,
            node_labels: BTreeMap::new(),
            os_disk_size_gb: 30,
            os_type: OsType::Linux,
            pool_type: AgentPoolType::VirtualMachineScaleSets,
            vm_size: "Standard_B2s".into(),
        }
    }

    #[test]
    fn test_check_bounds() {
        assert!(pool(1, 1, 3).check_bounds().is_ok());
        assert!(pool(3, 1, 3).check_bounds().is_ok());
        assert!(pool(0, 1, 3).check_bounds().is_err());
        assert!(pool(4, 1, 3).check_bounds().is_err());
        assert!(pool(2, 3, 1).check_bounds().is_err());
    }

    #[test]
    fn test_agent_pool_wire_names() {
        let value = serde_json::to_value(pool(1, 1, 3)).unwrap();
        assert_eq!(value["osDiskSizeGB"], 30);
        assert_eq!(value["type"], "VirtualMachineScaleSets");
        assert_eq!(value["enableAutoScaling"], true);
        assert_eq!(value["mode"], "System");
        assert_eq!(value["minCount"], 1);
    }

    #[test]
    fn test_to_value_matches_serde_form() {
        let mut labeled = pool(2, 1, 3);
        labeled.node_labels.insert("tier".into(), "system".into());
        labeled.mode = AgentPoolMode::User;
        for p in [pool(1, 1, 3), labeled] {
            assert_eq!(p.to_value(), serde_json::to_value(&p).unwrap());
        }
    }

    #[test]
    fn test_cluster_declares_pools_it_can_read_back() {
        let cluster = ManagedCluster {
            name: "aks".into(),
            resource_group_name: Input::output("k8s", "name"),
            agent_pool_profiles: vec![pool(1, 1, 3)],
            enable_rbac: true,
            kubernetes_version: "1.28.3".into(),
            linux_profile: LinuxProfile {
                admin_username: "testuser".into(),
                ssh_public_keys: vec![Input::output("ssh-key", "publicKeyOpenssh")],
            },
            auto_scaler_profile: AutoScalerProfile::default(),
            dns_prefix: Input::output("k8s", "name"),
            service_principal_profile: ServicePrincipalProfile {
                client_id: Input::output("aks", "clientId"),
                secret: Input::output("aksSpPassword", "value"),
            },
            node_resource_group: "MC_rg_aks_westus".into(),
        };
        let inputs = cluster.inputs();
        assert!(inputs["agentPoolProfiles"].as_literal().is_some_and(Value::is_array));
        assert_eq!(agent_pools(&inputs).unwrap(), vec![pool(1, 1, 3)]);
    }

    #[test]
    fn test_agent_pools_round_trip_through_inputs() {
        let inputs = Inputs::from([(
            "agentPoolProfiles".to_string(),
            Input::literal(serde_json::to_value(vec![pool(1, 1, 3)]).unwrap()),
        )]);
        assert_eq!(agent_pools(&inputs).unwrap(), vec![pool(1, 1, 3)]);
        assert!(agent_pools(&Inputs::new()).unwrap().is_empty());
    }

    #[test]
    fn test_autoscaler_flags_are_strings() {
        let input = AutoScalerProfile::default().to_input();
        assert_eq!(
            input.to_string(),
            "{skipNodesWithLocalStorage: false, skipNodesWithSystemPods: false}"
        );
        let Input::Object { fields } = input else {
            panic!("expected object");
        };
        assert_eq!(fields["skipNodesWithLocalStorage"], Input::literal("false"));
    }
}
