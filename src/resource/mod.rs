//! Typed Azure declarations
//!
//! Every object in the stack is modeled as a [`declarative::Resource`] with:
//! - A provider type token (what the engine provisions)
//! - Property inputs, literal or deferred on other outputs
//! - The outputs the engine must keep secret

pub mod automation;
pub mod client_config;
pub mod identity;
pub mod managed_cluster;
pub mod random;
pub mod resource_group;
pub mod role_assignment;
pub mod tls;

pub use automation::{AutomationAccount, IdentityType, Runbook, RunbookType, SkuName};
pub use client_config::GetClientConfig;
pub use identity::{Application, ServicePrincipal, ServicePrincipalPassword};
pub use managed_cluster::{
    AgentPoolMode, AgentPoolProfile, AgentPoolType, AutoScalerProfile,
    ListManagedClusterUserCredentials, LinuxProfile, ManagedCluster, OsType,
    ServicePrincipalProfile,
};
pub use random::{RandomPassword, RandomUuid};
pub use resource_group::ResourceGroup;
pub use role_assignment::{PrincipalType, RoleAssignment};
pub use tls::PrivateKey;
