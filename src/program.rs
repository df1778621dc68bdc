//! The stack itself: an AKS cluster, its identity chain, an automation
//! account with a stop-cluster runbook, and the exported kubeconfig.
//!
//! Declaration order matters only in that a resource can reference outputs
//! of resources declared before it.

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use declarative::{StackGraph, Transform};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use crate::config::StackConfig;
use crate::resource::role_assignment::{
    OWNER_ROLE_ID, resource_group_scope, role_definition_id, subscription_scope,
};
use crate::resource::{
    AgentPoolMode, AgentPoolProfile, AgentPoolType, Application, AutoScalerProfile,
    AutomationAccount, GetClientConfig, IdentityType, LinuxProfile,
    ListManagedClusterUserCredentials, ManagedCluster, OsType, PrincipalType, PrivateKey,
    RandomPassword, RandomUuid, ResourceGroup, RoleAssignment, Runbook, RunbookType,
    ServicePrincipal, ServicePrincipalPassword, ServicePrincipalProfile, SkuName,
};

/// Logical names of every declaration in the stack
pub mod names {
    pub const RESOURCE_GROUP: &str = "k8s";
    pub const CLIENT_CONFIG: &str = "client-config";
    pub const SSH_KEY: &str = "ssh-key";
    pub const APPLICATION: &str = "aks";
    pub const SERVICE_PRINCIPAL: &str = "aksSp";
    pub const PASSWORD: &str = "password";
    pub const SP_PASSWORD: &str = "aksSpPassword";
    pub const CREDENTIALS: &str = "creds";
    pub const AUTOMATION_ACCOUNT: &str = "automationAccount";
    pub const ROLE_ASSIGNMENT_UUID: &str = "testRandomUuid";
    pub const ROLE_ASSIGNMENT: &str = "roleAssignment";
    pub const ROLE_ASSIGNMENT_RG_UUID: &str = "testRandomUuid2";
    pub const ROLE_ASSIGNMENT_RG: &str = "roleAssignment2";
    pub const RUNBOOK: &str = "runbook";
}

/// Name of the exported, decoded kubeconfig
pub const KUBECONFIG_EXPORT: &str = "kubeconfig";

/// Script uploaded as the runbook body, relative to `paths.module`
pub const RUNBOOK_SCRIPT: &str = "stop-cluster.ps1";

pub const KUBERNETES_VERSION: &str = "1.28.3";
pub const ADMIN_USERNAME: &str = "testuser";
pub const AUTOMATION_ACCOUNT_NAME: &str = "myAutomationAccount9";
pub const RUNBOOK_NAME: &str = "stop-k8s-cluster";

/// Node resource group as provisioned: the `azure-native-go` and `westus`
/// segments are fixed literals, only the cluster name is substituted.
pub fn node_resource_group(managed_cluster_name: &str) -> String {
    format!("MC_azure-native-go_{managed_cluster_name}_westus")
}

/// The single system node pool
pub fn default_agent_pool() -> AgentPoolProfile {
    AgentPoolProfile {
        name: "default".into(),
        count: 1,
        min_count: 1,
        max_count: 3,
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

pub fn runbook_script_path(config: &StackConfig) -> PathBuf {
    config.module_dir().join(RUNBOOK_SCRIPT)
}

/// Build the full declaration graph
pub fn declare(config: &StackConfig) -> Result<StackGraph> {
    let mut graph = StackGraph::new();

    // ========================================================================
    // Foundation
    // ========================================================================

    let resource_group = graph.declare(
        &ResourceGroup::new(names::RESOURCE_GROUP).with_location(config.location.clone()),
    )?;
    let client_config = graph.declare(&GetClientConfig::new(names::CLIENT_CONFIG))?;
    let subscription = client_config.output("subscriptionId");

    let ssh_key = graph.declare(&PrivateKey::rsa(names::SSH_KEY, 4096))?;

    // ========================================================================
    // Identity chain
    // ========================================================================

    let app = graph.declare(&Application {
        name: names::APPLICATION.into(),
        display_name: "aks".into(),
    })?;
    let sp = graph.declare(&ServicePrincipal {
        name: names::SERVICE_PRINCIPAL.into(),
        client_id: app.output("clientId"),
    })?;
    let password = graph.declare(&RandomPassword {
        name: names::PASSWORD.into(),
        length: 20,
        special: true,
    })?;

    // The credential's own generated `value` feeds the cluster unless the
    // random password is explicitly bound.
    let sp_password = graph.declare(&ServicePrincipalPassword {
        name: names::SP_PASSWORD.into(),
        service_principal_id: sp.output("id"),
        value: config
            .bind_generated_password
            .then(|| password.output("result")),
        end_date: Utc
            .with_ymd_and_hms(2099, 1, 1, 0, 0, 0)
            .single()
            .context("Invalid credential end date")?,
    })?;

    // ========================================================================
    // Cluster
    // ========================================================================

    let cluster_name = config.managed_cluster_name();
    log::info!("Declaring managed cluster '{cluster_name}'");

    let cluster = graph.declare(&ManagedCluster {
        name: cluster_name.to_string(),
        resource_group_name: resource_group.output("name"),
        agent_pool_profiles: vec![default_agent_pool()],
        enable_rbac: true,
        kubernetes_version: KUBERNETES_VERSION.into(),
        linux_profile: LinuxProfile {
            admin_username: ADMIN_USERNAME.into(),
            ssh_public_keys: vec![ssh_key.output("publicKeyOpenssh")],
        },
        auto_scaler_profile: AutoScalerProfile {
            skip_nodes_with_local_storage: false,
            skip_nodes_with_system_pods: false,
        },
        dns_prefix: resource_group.output("name"),
        service_principal_profile: ServicePrincipalProfile {
            client_id: app.output("clientId"),
            secret: sp_password.output("value"),
        },
        node_resource_group: node_resource_group(cluster_name),
    })?;

    let creds = graph.declare(&ListManagedClusterUserCredentials {
        name: names::CREDENTIALS.into(),
        resource_group_name: resource_group.output("name"),
        resource_name: cluster.output("name"),
    })?;

    // ========================================================================
    // Automation
    // ========================================================================

    let account = graph.declare(&AutomationAccount {
        name: names::AUTOMATION_ACCOUNT.into(),
        account_name: AUTOMATION_ACCOUNT_NAME.into(),
        resource_group_name: resource_group.output("name"),
        sku: SkuName::Free,
        identity: IdentityType::SystemAssigned,
    })?;
    let principal_id = account.output("identity.principalId");
    let owner = role_definition_id(&subscription, OWNER_ROLE_ID);

    let uuid = graph.declare(&RandomUuid::new(names::ROLE_ASSIGNMENT_UUID))?;
    graph.declare(&RoleAssignment {
        name: names::ROLE_ASSIGNMENT.into(),
        scope: subscription_scope(&subscription),
        role_assignment_name: uuid.output("result"),
        principal_type: PrincipalType::ServicePrincipal,
        principal_id: principal_id.clone(),
        role_definition_id: owner.clone(),
    })?;

    let uuid = graph.declare(&RandomUuid::new(names::ROLE_ASSIGNMENT_RG_UUID))?;
    graph.declare(&RoleAssignment {
        name: names::ROLE_ASSIGNMENT_RG.into(),
        scope: resource_group_scope(&subscription, &resource_group.output("name")),
        role_assignment_name: uuid.output("result"),
        principal_type: PrincipalType::ServicePrincipal,
        principal_id,
        role_definition_id: owner,
    })?;

    let script_path = runbook_script_path(config);
    let content = fs::read_to_string(&script_path)
        .with_context(|| format!("Could not read runbook script: {}", script_path.display()))?;

    graph.declare(&Runbook {
        name: names::RUNBOOK.into(),
        runbook_name: RUNBOOK_NAME.into(),
        automation_account_name: account.output("name"),
        resource_group_name: resource_group.output("name"),
        location: resource_group.output("location"),
        description: "Description of the Runbook".into(),
        runbook_type: RunbookType::PowerShell,
        log_activity_trace: 1,
        log_progress: true,
        log_verbose: false,
        content,
    })?;

    // ========================================================================
    // Exports
    // ========================================================================

    let kubeconfig = creds
        .output("kubeconfigs[0].value")
        .apply(Transform::Base64Decode);
    graph.export(KUBECONFIG_EXPORT, kubeconfig, false)?;

    log::info!("Declared {} resources", graph.len());
    Ok(graph)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use declarative::{DeclarationKind, Input, ResolvedOutputs};
    use serde_json::json;
    use tempfile::TempDir;

    /// Config whose module dir holds a runbook script
    pub(crate) fn fixture() -> (TempDir, StackConfig) {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(RUNBOOK_SCRIPT),
            "Stop-AzAksCluster -Name $ClusterName\n",
        )
        .unwrap();
        let config = StackConfig {
            paths: crate::config::PathMap {
                module: dir.path().display().to_string(),
            },
            ..StackConfig::default()
        };
        (dir, config)
    }

    #[test]
    fn test_every_reference_points_backwards() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();

        for decl in graph.declarations() {
            let at = graph.position(&decl.name).unwrap();
            for dep in decl.dependencies() {
                let dep_at = graph
                    .position(dep)
                    .unwrap_or_else(|| panic!("{} references missing {dep}", decl.name));
                assert!(dep_at < at, "{} references later {dep}", decl.name);
            }
        }
        assert_eq!(graph.len(), 15);
    }

    #[test]
    fn test_plan_orders_cluster_before_credentials() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();
        let plan = graph.plan().unwrap();

        let wave = |name: &str| plan.wave_of(name).unwrap();
        assert_eq!(wave(names::RESOURCE_GROUP), 0);
        assert_eq!(wave(names::SSH_KEY), 0);
        assert!(wave(names::SP_PASSWORD) < wave("azure-native-aks"));
        assert!(wave("azure-native-aks") < wave(names::CREDENTIALS));
        assert!(wave(names::AUTOMATION_ACCOUNT) < wave(names::RUNBOOK));
        assert_eq!(plan.total(), graph.len());
    }

    #[test]
    fn test_teardown_of_resource_group_removes_consumers_first() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();
        let plan = graph
            .plan()
            .unwrap()
            .filter_for_teardown(&graph, Some(names::RESOURCE_GROUP))
            .unwrap();
        let order = plan.teardown_order();

        assert_eq!(order.last(), Some(&names::RESOURCE_GROUP));
        for name in ["azure-native-aks", names::CREDENTIALS, names::RUNBOOK, names::ROLE_ASSIGNMENT_RG] {
            assert!(order.contains(&name), "{name} missing from teardown");
        }
        assert!(!order.contains(&names::SSH_KEY));
        assert!(!order.contains(&names::CLIENT_CONFIG));
    }

    #[test]
    fn test_default_cluster_name_used() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();
        let cluster = graph.get("azure-native-aks").unwrap();
        assert_eq!(
            cluster.input("nodeResourceGroup"),
            Some(&Input::literal("MC_azure-native-go_azure-native-aks_westus"))
        );
    }

    #[test]
    fn test_configured_cluster_name_used() {
        let (_dir, mut config) = fixture();
        config.managed_cluster_name = Some("prod-aks".into());
        let graph = declare(&config).unwrap();
        assert!(graph.get("prod-aks").is_some());
        assert!(graph.get("azure-native-aks").is_none());
        assert_eq!(
            graph.get(names::CREDENTIALS).unwrap().input("resourceName"),
            Some(&Input::output("prod-aks", "name"))
        );
    }

    #[test]
    fn test_agent_pool_bounds_hold() {
        let pool = default_agent_pool();
        assert!(pool.min_count <= pool.count && pool.count <= pool.max_count);
        assert_eq!((pool.min_count, pool.count, pool.max_count), (1, 1, 3));
        pool.check_bounds().unwrap();
    }

    #[test]
    fn test_role_assignments_differ_only_in_scope() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();
        let sub = graph.get(names::ROLE_ASSIGNMENT).unwrap();
        let rg = graph.get(names::ROLE_ASSIGNMENT_RG).unwrap();

        assert_eq!(sub.input("principalId"), rg.input("principalId"));
        assert_eq!(
            sub.input("principalId"),
            Some(&Input::output(names::AUTOMATION_ACCOUNT, "identity.principalId"))
        );
        assert_eq!(sub.input("roleDefinitionId"), rg.input("roleDefinitionId"));
        assert!(
            sub.input("roleDefinitionId")
                .unwrap()
                .to_string()
                .ends_with(OWNER_ROLE_ID)
        );
        assert_ne!(sub.input("scope"), rg.input("scope"));
        assert_ne!(
            sub.input("roleAssignmentName"),
            rg.input("roleAssignmentName")
        );
    }

    #[test]
    fn test_password_result_unbound_by_default() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();
        assert!(!graph.is_consumed(names::PASSWORD));
        assert!(graph.get(names::SP_PASSWORD).unwrap().input("value").is_none());

        let cluster = graph.get("azure-native-aks").unwrap();
        let profile = cluster.input("servicePrincipalProfile").unwrap();
        assert!(
            profile
                .references()
                .iter()
                .any(|r| r.resource == names::SP_PASSWORD && r.path == "value")
        );
    }

    #[test]
    fn test_password_result_bound_when_configured() {
        let (_dir, mut config) = fixture();
        config.bind_generated_password = true;
        let graph = declare(&config).unwrap();
        assert_eq!(
            graph.get(names::SP_PASSWORD).unwrap().input("value"),
            Some(&Input::output(names::PASSWORD, "result"))
        );
    }

    #[test]
    fn test_runbook_content_read_verbatim() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();
        let runbook = graph.get(names::RUNBOOK).unwrap();
        assert_eq!(
            runbook.input("content"),
            Some(&Input::literal("Stop-AzAksCluster -Name $ClusterName\n"))
        );
        assert_eq!(runbook.input("runbookType"), Some(&Input::literal("PowerShell")));
    }

    #[test]
    fn test_missing_runbook_script_fails() {
        let dir = TempDir::new().unwrap();
        let config = StackConfig {
            paths: crate::config::PathMap {
                module: dir.path().display().to_string(),
            },
            ..StackConfig::default()
        };
        let err = declare(&config).unwrap_err();
        assert!(format!("{err:#}").contains(RUNBOOK_SCRIPT));
    }

    #[test]
    fn test_queries_are_invokes() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();
        assert_eq!(graph.get(names::CREDENTIALS).unwrap().kind, DeclarationKind::Invoke);
        assert_eq!(graph.get(names::CLIENT_CONFIG).unwrap().kind, DeclarationKind::Invoke);
        assert_eq!(graph.get(names::RUNBOOK).unwrap().kind, DeclarationKind::Resource);
    }

    #[test]
    fn test_kubeconfig_export_decodes_first_credential() {
        let (_dir, config) = fixture();
        let graph = declare(&config).unwrap();
        let export = &graph.exports()[KUBECONFIG_EXPORT];
        assert_eq!(
            export.value,
            Input::output(names::CREDENTIALS, "kubeconfigs[0].value").apply(Transform::Base64Decode)
        );
        assert!(!export.secret);

        let kubeconfig = "apiVersion: v1\nkind: Config\n";
        let mut resolved = ResolvedOutputs::new();
        resolved.insert(
            names::CREDENTIALS,
            json!({"kubeconfigs": [
                {"name": "clusterUser", "value": "YXBpVmVyc2lvbjogdjEKa2luZDogQ29uZmlnCg=="},
                {"name": "other", "value": "aWdub3JlZA=="}
            ]}),
        );

        let exports = graph.evaluate_exports(&resolved).unwrap();
        assert_eq!(exports[KUBECONFIG_EXPORT], json!(kubeconfig));
    }
}
