//! Static checks over a declared stack
//!
//! Nothing here talks to the cloud. Every check reads declarations and the
//! edges between them, so findings are the same before and after apply.

use declarative::{Declaration, Input, StackGraph};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::resource::managed_cluster;
use crate::resource::role_assignment::OWNER_ROLE_ID;
use crate::resource::{ManagedCluster, PrivateKey, RandomPassword, RandomUuid, RoleAssignment};

/// `MC_{resource group}_{cluster}_{region}`
static NODE_RESOURCE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^MC_([^_]+)_(.+)_([^_]+)$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub code: &'static str,
    pub severity: Severity,
    /// Declaration (or export) the finding is about
    pub resource: String,
    pub message: String,
    pub fix: Option<String>,
}

impl Finding {
    fn warning(code: &'static str, resource: &str, message: String) -> Self {
        Self {
            code,
            severity: Severity::Warning,
            resource: resource.to_string(),
            message,
            fix: None,
        }
    }

    fn with_fix(mut self, fix: impl Into<String>) -> Self {
        self.fix = Some(fix.into());
        self
    }
}

/// Run every check, in declaration order per check
pub fn run(graph: &StackGraph) -> Vec<Finding> {
    let mut findings = Vec::new();
    unreferenced_generated_values(graph, &mut findings);
    agent_pool_bounds(graph, &mut findings);
    redundant_role_assignments(graph, &mut findings);
    privileged_roles(graph, &mut findings);
    plaintext_secret_exports(graph, &mut findings);
    node_resource_group_drift(graph, &mut findings);
    log::debug!("Lint produced {} findings", findings.len());
    findings
}

fn unreferenced_generated_values(graph: &StackGraph, findings: &mut Vec<Finding>) {
    let generated = [RandomPassword::TYPE, RandomUuid::TYPE, PrivateKey::TYPE];
    for decl in graph.declarations() {
        if !generated.contains(&decl.type_token.as_str()) || graph.is_consumed(&decl.name) {
            continue;
        }
        let mut finding = Finding::warning(
            "unreferenced-generated-value",
            &decl.name,
            format!(
                "{} is generated but none of its outputs are referenced",
                decl.name
            ),
        );
        if decl.type_token == RandomPassword::TYPE {
            finding = finding.with_fix("set bindGeneratedPassword = true to use it as the credential value");
        }
        findings.push(finding);
    }
}

fn agent_pool_bounds(graph: &StackGraph, findings: &mut Vec<Finding>) {
    for cluster in graph.of_type(ManagedCluster::TYPE) {
        let result = managed_cluster::agent_pools(&cluster.inputs).and_then(|pools| {
            pools.iter().try_for_each(|pool| pool.check_bounds())
        });
        if let Err(e) = result {
            findings.push(Finding {
                code: "agent-pool-bounds",
                severity: Severity::Error,
                resource: cluster.name.clone(),
                message: e.to_string(),
                fix: None,
            });
        }
    }
}

/// Symbolic text of an input, empty when absent
fn symbolic(decl: &Declaration, property: &str) -> String {
    decl.input(property).map(Input::to_string).unwrap_or_default()
}

/// Whether `outer` covers `inner` as a path prefix
fn scope_contains(outer: &str, inner: &str) -> bool {
    inner.len() > outer.len()
        && inner.starts_with(outer)
        && inner[outer.len()..].starts_with('/')
}

fn redundant_role_assignments(graph: &StackGraph, findings: &mut Vec<Finding>) {
    let assignments: Vec<&Declaration> = graph.of_type(RoleAssignment::TYPE).collect();
    for narrow in &assignments {
        let broader = assignments.iter().find(|wide| {
            wide.name != narrow.name
                && symbolic(wide, "principalId") == symbolic(narrow, "principalId")
                && symbolic(wide, "roleDefinitionId") == symbolic(narrow, "roleDefinitionId")
                && scope_contains(&symbolic(wide, "scope"), &symbolic(narrow, "scope"))
        });
        if let Some(wide) = broader {
            findings.push(
                Finding::warning(
                    "redundant-role-assignment",
                    &narrow.name,
                    format!(
                        "{} grants the same role to the same principal as {}, whose scope {} already covers {}",
                        narrow.name,
                        wide.name,
                        symbolic(wide, "scope"),
                        symbolic(narrow, "scope")
                    ),
                )
                .with_fix(format!("drop {} or narrow {}", narrow.name, wide.name)),
            );
        }
    }
}

fn privileged_roles(graph: &StackGraph, findings: &mut Vec<Finding>) {
    for assignment in graph.of_type(RoleAssignment::TYPE) {
        if symbolic(assignment, "roleDefinitionId").ends_with(OWNER_ROLE_ID) {
            findings.push(Finding::warning(
                "privileged-role",
                &assignment.name,
                format!(
                    "{} grants Owner at {}",
                    assignment.name,
                    symbolic(assignment, "scope")
                ),
            ));
        }
    }
}

fn plaintext_secret_exports(graph: &StackGraph, findings: &mut Vec<Finding>) {
    for (name, export) in graph.exports() {
        if !export.secret && graph.derives_from_secret(&export.value) {
            findings.push(
                Finding::warning(
                    "plaintext-secret-export",
                    name,
                    format!("export '{name}' reads secret output {} but is not marked secret", export.value),
                )
                .with_fix("mark the export secret"),
            );
        }
    }
}

fn node_resource_group_drift(graph: &StackGraph, findings: &mut Vec<Finding>) {
    for cluster in graph.of_type(ManagedCluster::TYPE) {
        let Some(node_group) = cluster
            .input("nodeResourceGroup")
            .and_then(Input::as_literal)
            .and_then(|v| v.as_str())
        else {
            continue;
        };
        let Some(caps) = NODE_RESOURCE_GROUP.captures(node_group) else {
            continue;
        };

        let mut drift = Vec::new();

        let group = symbolic(cluster, "resourceGroupName");
        if caps[1] != group {
            drift.push(format!("resource group '{}' is not {group}", &caps[1]));
        }
        if caps[2] != cluster.name {
            drift.push(format!("cluster '{}' is not {}", &caps[2], cluster.name));
        }

        let location = cluster
            .input("resourceGroupName")
            .and_then(|input| input.references().first().map(|r| r.resource.clone()))
            .and_then(|rg| graph.get(&rg).map(|d| symbolic(d, "location")))
            .unwrap_or_default();
        if caps[3] != location {
            let actual = if location.is_empty() {
                "the provider default".to_string()
            } else {
                location
            };
            drift.push(format!("region '{}' is not {actual}", &caps[3]));
        }

        if !drift.is_empty() {
            findings.push(
                Finding::warning(
                    "node-resource-group-drift",
                    &cluster.name,
                    format!("nodeResourceGroup {node_group} is fixed: {}", drift.join("; ")),
                )
                .with_fix("derive nodeResourceGroup or leave it to the provider"),
            );
        }
    }
}
