//! Resource trait for declarative infrastructure
//!
//! A Resource describes the desired state of one object owned by an external
//! engine. It never talks to the cloud itself: it only names its provider
//! type and lists property inputs, some of which may be outputs of other
//! resources.

use crate::types::{Input, Inputs, OutputRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// How the engine treats a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// A managed object with a lifecycle (create, update, delete)
    #[default]
    Resource,
    /// A read-only query, re-evaluated on every run and never persisted
    Invoke,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resource => write!(f, "resource"),
            Self::Invoke => write!(f, "invoke"),
        }
    }
}

/// Core trait for declared resources
///
/// # Example
///
/// ```ignore
/// use declarative::{Input, Inputs, Resource};
///
/// #[derive(Debug)]
/// struct ResourceGroup {
///     name: String,
/// }
///
/// impl Resource for ResourceGroup {
///     fn name(&self) -> &str {
///         &self.name
///     }
///
///     fn type_token(&self) -> &'static str {
///         "azure-native:resources:ResourceGroup"
///     }
///
///     fn inputs(&self) -> Inputs {
///         Inputs::new()
///     }
/// }
/// ```
pub trait Resource: fmt::Debug {
    /// Logical name, unique within a stack
    fn name(&self) -> &str;

    /// Provider type token, e.g. `azure-native:resources:ResourceGroup`
    fn type_token(&self) -> &'static str;

    /// Whether this is a managed resource or a read-only query
    fn kind(&self) -> DeclarationKind {
        DeclarationKind::Resource
    }

    /// Property inputs sent to the provider
    fn inputs(&self) -> Inputs;

    /// Outputs the engine must treat as secret
    fn secret_outputs(&self) -> &'static [&'static str] {
        &[]
    }

    /// Human-readable description
    fn description(&self) -> String {
        format!("{} ({})", self.name(), self.type_token())
    }
}

/// A type-erased, serializable declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub name: String,
    #[serde(rename = "type")]
    pub type_token: String,
    #[serde(default)]
    pub kind: DeclarationKind,
    #[serde(default)]
    pub inputs: Inputs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secret_outputs: Vec<String>,
}

impl Declaration {
    pub fn from_resource(resource: &dyn Resource) -> Self {
        Self {
            name: resource.name().to_string(),
            type_token: resource.type_token().to_string(),
            kind: resource.kind(),
            inputs: resource.inputs(),
            secret_outputs: resource
                .secret_outputs()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    /// Every output reference held by any input
    pub fn references(&self) -> Vec<&OutputRef> {
        self.inputs.values().flat_map(Input::references).collect()
    }

    /// Names of the declarations this one depends on
    pub fn dependencies(&self) -> BTreeSet<&str> {
        self.references()
            .into_iter()
            .map(|r| r.resource.as_str())
            .collect()
    }

    pub fn input(&self, property: &str) -> Option<&Input> {
        self.inputs.get(property)
    }

    pub fn is_secret_output(&self, property: &str) -> bool {
        self.secret_outputs.iter().any(|s| s == property)
    }

    /// Short type name, e.g. `ResourceGroup` for `azure-native:resources:ResourceGroup`
    pub fn short_type(&self) -> &str {
        self.type_token
            .rsplit(':')
            .next()
            .unwrap_or(self.type_token.as_str())
    }
}
